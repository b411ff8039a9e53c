//! Zone classifier for the modulation surface
//!
//! The surface is split into a 3x3 grid by a deadzone threshold on each
//! axis. Each axis is banded independently and the pair of bands is looked
//! up in a fixed table, so no point can ever land in two zones.

/// Deadzone threshold on each axis
pub const THRESHOLD: f64 = 0.35;

/// Position of one axis value relative to the deadzone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Band {
    /// Beyond the threshold on the negative side
    Negative,
    /// Strictly inside the deadzone
    Neutral,
    /// Beyond the threshold on the positive side
    Positive,
}

impl Band {
    /// Band an axis value.
    ///
    /// Returns `None` for values exactly on the threshold and for NaN; those
    /// points belong to no zone.
    pub fn of(value: f64) -> Option<Band> {
        if value > THRESHOLD {
            Some(Band::Positive)
        } else if value < -THRESHOLD {
            Some(Band::Negative)
        } else if value.abs() < THRESHOLD {
            Some(Band::Neutral)
        } else {
            None
        }
    }

    fn index(self) -> usize {
        match self {
            Band::Negative => 0,
            Band::Neutral => 1,
            Band::Positive => 2,
        }
    }
}

/// One of the nine regions of the modulation surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Zone {
    Center,
    Up,
    Down,
    Left,
    Right,
    UpRight,
    UpLeft,
    DownRight,
    DownLeft,
}

/// Zone lookup indexed by `[y band][x band]`
const ZONE_TABLE: [[Zone; 3]; 3] = [
    // y negative
    [Zone::DownLeft, Zone::Down, Zone::DownRight],
    // y neutral
    [Zone::Left, Zone::Center, Zone::Right],
    // y positive
    [Zone::UpLeft, Zone::Up, Zone::UpRight],
];

impl Zone {
    /// All zones in grid order, top row first
    pub const GRID: [[Zone; 3]; 3] = [
        [Zone::UpLeft, Zone::Up, Zone::UpRight],
        [Zone::Left, Zone::Center, Zone::Right],
        [Zone::DownLeft, Zone::Down, Zone::DownRight],
    ];

    /// Classify a point on the surface
    pub fn classify(x: f64, y: f64) -> Option<Zone> {
        let bx = Band::of(x)?;
        let by = Band::of(y)?;
        Some(Self::from_bands(bx, by))
    }

    /// Zone for a pair of axis bands
    pub fn from_bands(x: Band, y: Band) -> Zone {
        ZONE_TABLE[y.index()][x.index()]
    }

    /// Panel label for this zone
    pub fn label(self) -> &'static str {
        match self {
            Zone::Center => "BASE",
            Zone::Up => "MAJ/MIN",
            Zone::Down => "SUS4",
            Zone::Left => "DIM",
            Zone::Right => "MAJ7/m7",
            Zone::UpRight => "DOM 7",
            Zone::UpLeft => "AUG",
            Zone::DownRight => "ADD 9",
            Zone::DownLeft => "SUS2",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_points() -> Vec<(f64, f64)> {
        let steps: Vec<f64> = (-20..=20).map(|i| i as f64 / 20.0).collect();
        let mut points = Vec::new();
        for &x in &steps {
            for &y in &steps {
                points.push((x, y));
            }
        }
        points
    }

    #[test]
    fn test_band_edges() {
        assert_eq!(Band::of(0.0), Some(Band::Neutral));
        assert_eq!(Band::of(0.34), Some(Band::Neutral));
        assert_eq!(Band::of(0.36), Some(Band::Positive));
        assert_eq!(Band::of(-0.9), Some(Band::Negative));
        assert_eq!(Band::of(THRESHOLD), None);
        assert_eq!(Band::of(-THRESHOLD), None);
        assert_eq!(Band::of(f64::NAN), None);
    }

    #[test]
    fn test_cardinal_and_diagonal_zones() {
        assert_eq!(Zone::classify(0.0, 0.0), Some(Zone::Center));
        assert_eq!(Zone::classify(0.0, 0.9), Some(Zone::Up));
        assert_eq!(Zone::classify(0.1, -0.9), Some(Zone::Down));
        assert_eq!(Zone::classify(-0.9, 0.2), Some(Zone::Left));
        assert_eq!(Zone::classify(0.5, 0.1), Some(Zone::Right));
        assert_eq!(Zone::classify(0.9, 0.9), Some(Zone::UpRight));
        assert_eq!(Zone::classify(-0.9, 0.9), Some(Zone::UpLeft));
        assert_eq!(Zone::classify(0.9, -0.9), Some(Zone::DownRight));
        assert_eq!(Zone::classify(-0.9, -0.9), Some(Zone::DownLeft));
    }

    #[test]
    fn test_threshold_lines_are_uncovered() {
        assert_eq!(Zone::classify(THRESHOLD, 0.0), None);
        assert_eq!(Zone::classify(0.0, -THRESHOLD), None);
        assert_eq!(Zone::classify(f64::NAN, 0.0), None);
    }

    #[test]
    fn test_zones_are_mutually_exclusive() {
        // Independent predicate per zone; at most one may hold for any point.
        let predicates: [(Zone, fn(f64, f64) -> bool); 9] = [
            (Zone::Center, |x, y| x.abs() < THRESHOLD && y.abs() < THRESHOLD),
            (Zone::Up, |x, y| y > THRESHOLD && x.abs() < THRESHOLD),
            (Zone::Down, |x, y| y < -THRESHOLD && x.abs() < THRESHOLD),
            (Zone::Right, |x, y| x > THRESHOLD && y.abs() < THRESHOLD),
            (Zone::Left, |x, y| x < -THRESHOLD && y.abs() < THRESHOLD),
            (Zone::UpRight, |x, y| x > THRESHOLD && y > THRESHOLD),
            (Zone::UpLeft, |x, y| x < -THRESHOLD && y > THRESHOLD),
            (Zone::DownRight, |x, y| x > THRESHOLD && y < -THRESHOLD),
            (Zone::DownLeft, |x, y| x < -THRESHOLD && y < -THRESHOLD),
        ];

        for (x, y) in grid_points() {
            let matching: Vec<Zone> = predicates
                .iter()
                .filter(|(_, p)| p(x, y))
                .map(|(z, _)| *z)
                .collect();
            assert!(matching.len() <= 1, "({}, {}) matched {:?}", x, y, matching);
            assert_eq!(Zone::classify(x, y), matching.first().copied());
        }
    }

    #[test]
    fn test_grid_covers_every_zone_once() {
        let mut seen: Vec<Zone> = Zone::GRID.iter().flatten().copied().collect();
        seen.sort_by_key(|z| *z as u8);
        seen.dedup();
        assert_eq!(seen.len(), 9);
    }
}
