//! Two-dimensional modulation value

use std::fmt;

use crate::mapping::Zone;

/// Position on the modulation surface, each axis in [-1, 1]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ModulationVector {
    x: f64,
    y: f64,
}

impl ModulationVector {
    pub const CENTER: ModulationVector = ModulationVector { x: 0.0, y: 0.0 };

    /// Clamp both axes into [-1, 1]; non-finite input reads as zero
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x: clamp_axis(x),
            y: clamp_axis(y),
        }
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    /// Zone under this position, `None` on a threshold line
    pub fn zone(&self) -> Option<Zone> {
        Zone::classify(self.x, self.y)
    }
}

impl From<(f64, f64)> for ModulationVector {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

impl fmt::Display for ModulationVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "X:{:+.2} Y:{:+.2}", self.x, self.y)
    }
}

fn clamp_axis(v: f64) -> f64 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(-1.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamps_axes() {
        let v = ModulationVector::new(3.0, -7.5);
        assert_eq!(v.x(), 1.0);
        assert_eq!(v.y(), -1.0);
    }

    #[test]
    fn test_non_finite_input() {
        let v = ModulationVector::new(f64::NAN, f64::INFINITY);
        assert_eq!(v.x(), 0.0);
        assert_eq!(v.y(), 1.0);
    }

    #[test]
    fn test_zone() {
        assert_eq!(ModulationVector::CENTER.zone(), Some(Zone::Center));
        assert_eq!(ModulationVector::new(0.9, 0.9).zone(), Some(Zone::UpRight));
        assert_eq!(ModulationVector::new(0.35, 0.0).zone(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(ModulationVector::new(0.5, -1.0).to_string(), "X:+0.50 Y:-1.00");
    }
}
