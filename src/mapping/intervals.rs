//! Interval mapper
//!
//! Maps a chord quality and a position on the modulation surface to the
//! semitone offsets of the chord shape to sound.

use super::{ChordQuality, Zone};
use std::fmt;

/// Maximum number of notes in a chord shape
pub const MAX_INTERVALS: usize = 4;

const M2: u8 = 2;
const MIN3: u8 = 3;
const MAJ3: u8 = 4;
const P4: u8 = 5;
const D5: u8 = 6;
const P5: u8 = 7;
const A5: u8 = 8;
const DIM7: u8 = 9;
const MIN7: u8 = 10;
const MAJ7: u8 = 11;
const MAJ9: u8 = 14;

const MAJOR: &[u8] = &[0, MAJ3, P5];
const MINOR: &[u8] = &[0, MIN3, P5];
const DIMINISHED: &[u8] = &[0, MIN3, D5];
const SUS4: &[u8] = &[0, P4, P5];
const SUS2: &[u8] = &[0, M2, P5];
const AUGMENTED: &[u8] = &[0, MAJ3, A5];
const MAJOR7: &[u8] = &[0, MAJ3, P5, MAJ7];
const MINOR7: &[u8] = &[0, MIN3, P5, MIN7];
const HALF_DIMINISHED7: &[u8] = &[0, MIN3, D5, MIN7];
const DIMINISHED7: &[u8] = &[0, MIN3, D5, DIM7];
const DOMINANT7: &[u8] = &[0, MAJ3, P5, MIN7];
const MAJOR_ADD9: &[u8] = &[0, MAJ3, P5, MAJ9];
const MINOR_ADD9: &[u8] = &[0, MIN3, P5, MAJ9];
const DIMINISHED_ADD9: &[u8] = &[0, MIN3, D5, MAJ9];

/// Ordered semitone offsets from a chord root
///
/// Offset `i` drives oscillator slot `i` of a voice.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct IntervalSet(&'static [u8]);

impl IntervalSet {
    /// Offsets in slot order
    pub fn as_slice(&self) -> &'static [u8] {
        self.0
    }

    /// Number of sounding notes
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Offset for a slot, if the slot sounds in this shape
    pub fn get(&self, slot: usize) -> Option<u8> {
        self.0.get(slot).copied()
    }

    /// Frequency of a slot given the root frequency
    pub fn frequency(&self, slot: usize, root: f64) -> Option<f64> {
        self.get(slot).map(|semitones| transpose(root, semitones))
    }
}

impl fmt::Debug for IntervalSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.0.iter()).finish()
    }
}

/// Frequency `semitones` above `root` in equal temperament
pub fn transpose(root: f64, semitones: u8) -> f64 {
    root * 2f64.powf(semitones as f64 / 12.0)
}

/// Shape of a zone for a given base quality
pub fn shape(quality: ChordQuality, zone: Zone) -> IntervalSet {
    use ChordQuality::*;

    let offsets = match (zone, quality) {
        (Zone::Center, Major) => MAJOR,
        (Zone::Center, Minor) => MINOR,
        (Zone::Center, Diminished) => DIMINISHED,

        // Up flips major and minor; diminished resolves to minor
        (Zone::Up, Major) => MINOR,
        (Zone::Up, Minor) => MAJOR,
        (Zone::Up, Diminished) => MINOR,

        (Zone::Down, _) => SUS4,

        (Zone::Right, Major) => MAJOR7,
        (Zone::Right, Minor) => MINOR7,
        (Zone::Right, Diminished) => HALF_DIMINISHED7,

        (Zone::Left, _) => DIMINISHED7,
        (Zone::UpRight, _) => DOMINANT7,
        (Zone::UpLeft, _) => AUGMENTED,

        (Zone::DownRight, Major) => MAJOR_ADD9,
        (Zone::DownRight, Minor) => MINOR_ADD9,
        (Zone::DownRight, Diminished) => DIMINISHED_ADD9,

        (Zone::DownLeft, _) => SUS2,
    };

    IntervalSet(offsets)
}

/// Intervals to sound for `quality` at surface position `(x, y)`.
///
/// Points that fall in no zone get the center shape of the quality.
pub fn intervals(quality: ChordQuality, x: f64, y: f64) -> IntervalSet {
    let zone = Zone::classify(x, y).unwrap_or(Zone::Center);
    shape(quality, zone)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::zone::THRESHOLD;

    #[test]
    fn test_center_shapes() {
        for &(x, y) in &[(0.0, 0.0), (0.34, -0.34), (-0.2, 0.1)] {
            assert_eq!(intervals(ChordQuality::Major, x, y).as_slice(), &[0, 4, 7]);
            assert_eq!(intervals(ChordQuality::Minor, x, y).as_slice(), &[0, 3, 7]);
            assert_eq!(intervals(ChordQuality::Diminished, x, y).as_slice(), &[0, 3, 6]);
        }
    }

    #[test]
    fn test_down_ignores_quality() {
        for quality in ChordQuality::ALL {
            for &x in &[-0.3, 0.0, 0.3] {
                assert_eq!(intervals(quality, x, -0.8).as_slice(), &[0, 5, 7]);
            }
        }
    }

    #[test]
    fn test_up_toggles_third() {
        assert_eq!(intervals(ChordQuality::Major, 0.0, 1.0).as_slice(), &[0, 3, 7]);
        assert_eq!(intervals(ChordQuality::Minor, 0.0, 1.0).as_slice(), &[0, 4, 7]);
        assert_eq!(intervals(ChordQuality::Diminished, 0.0, 1.0).as_slice(), &[0, 3, 7]);
    }

    #[test]
    fn test_sevenths() {
        assert_eq!(intervals(ChordQuality::Major, 1.0, 0.0).as_slice(), &[0, 4, 7, 11]);
        assert_eq!(intervals(ChordQuality::Minor, 1.0, 0.0).as_slice(), &[0, 3, 7, 10]);
        assert_eq!(intervals(ChordQuality::Diminished, 1.0, 0.0).as_slice(), &[0, 3, 6, 10]);

        for quality in ChordQuality::ALL {
            assert_eq!(intervals(quality, -1.0, 0.0).as_slice(), &[0, 3, 6, 9]);
            assert_eq!(intervals(quality, 0.9, 0.9).as_slice(), &[0, 4, 7, 10]);
        }
    }

    #[test]
    fn test_corner_shapes() {
        for quality in ChordQuality::ALL {
            assert_eq!(intervals(quality, -0.9, 0.9).as_slice(), &[0, 4, 8]);
            assert_eq!(intervals(quality, -0.9, -0.9).as_slice(), &[0, 2, 7]);
        }
        assert_eq!(intervals(ChordQuality::Major, 0.9, -0.9).as_slice(), &[0, 4, 7, 14]);
        assert_eq!(intervals(ChordQuality::Minor, 0.9, -0.9).as_slice(), &[0, 3, 7, 14]);
        assert_eq!(intervals(ChordQuality::Diminished, 0.9, -0.9).as_slice(), &[0, 3, 6, 14]);
    }

    #[test]
    fn test_gap_falls_back_to_center_of_quality() {
        assert_eq!(intervals(ChordQuality::Minor, THRESHOLD, 0.0).as_slice(), &[0, 3, 7]);
        assert_eq!(
            intervals(ChordQuality::Diminished, f64::NAN, 0.5).as_slice(),
            &[0, 3, 6]
        );
    }

    #[test]
    fn test_total_and_bounded() {
        for quality in ChordQuality::ALL {
            for i in -10..=10 {
                for j in -10..=10 {
                    let set = intervals(quality, i as f64 / 10.0, j as f64 / 10.0);
                    assert!(!set.is_empty());
                    assert!(set.len() <= MAX_INTERVALS);
                    assert_eq!(set.get(0), Some(0));
                }
            }
        }
    }

    #[test]
    fn test_transpose() {
        assert!((transpose(261.63, 4) - 329.63).abs() < 0.01);
        assert!((transpose(261.63, 7) - 392.00).abs() < 0.01);
        assert!((transpose(440.0, 12) - 880.0).abs() < 1e-9);
        let dom7 = shape(ChordQuality::Major, Zone::UpRight);
        assert!((dom7.frequency(3, 261.63).unwrap() - 466.16).abs() < 0.02);
        assert_eq!(dom7.frequency(4, 261.63), None);
    }
}
