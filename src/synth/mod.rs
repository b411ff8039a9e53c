//! Synthesis primitives and the chord voice
//!
//! Contains the oscillator, tone filter, automation timeline and
//! [`ChordVoice`].

mod filter;
mod oscillator;
mod param;
mod voice;

pub use filter::ToneFilter;
pub use oscillator::{DetuneRng, Oscillator, Waveform};
pub use param::{Automation, Param};
pub use voice::{ChordVoice, VoicePhase, SLOT_COUNT};
