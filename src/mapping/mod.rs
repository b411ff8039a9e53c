//! Chord shape mapping
//!
//! Turns a chord quality and a position on the modulation surface into the
//! semitone offsets a voice should sound.

mod intervals;
mod quality;
pub mod zone;

pub use intervals::{intervals, shape, transpose, IntervalSet, MAX_INTERVALS};
pub use quality::ChordQuality;
pub use zone::{Band, Zone};
