//! Continuous modulation input
//!
//! A controller produces a [`ModulationVector`] at frame rate and pushes it
//! through a [`ModulationPort`]. The engine is the only port in the crate.

mod vector;
mod xy;

pub use vector::ModulationVector;
pub use xy::{Direction, XyController};

/// Receiver of modulation updates.
///
/// Repeated identical vectors must be cheap for the receiver.
pub trait ModulationPort {
    fn push_modulation(&mut self, vector: ModulationVector);
}
