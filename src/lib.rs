//! vectorchord - chord synthesizer steered across a 2D surface
//!
//! Trigger keys start sustained chords. An XY controller reshapes every
//! sounding chord's intervals in real time: triads become sevenths,
//! suspensions or added ninths depending on the zone under the controller.

pub mod config;
pub mod control;
pub mod engine;
pub mod mapping;
pub mod synth;
pub mod viz;

pub use config::SynthConfig;
pub use engine::Engine;
