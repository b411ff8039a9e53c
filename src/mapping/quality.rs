//! Chord quality of a trigger key

use serde::{Deserialize, Serialize};
use std::fmt;

/// Base quality of a chord, fixed for the lifetime of a voice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChordQuality {
    Major,
    Minor,
    Diminished,
}

impl ChordQuality {
    /// All qualities, in table order
    pub const ALL: [ChordQuality; 3] = [
        ChordQuality::Major,
        ChordQuality::Minor,
        ChordQuality::Diminished,
    ];
}

impl fmt::Display for ChordQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ChordQuality::Major => "Major",
            ChordQuality::Minor => "Minor",
            ChordQuality::Diminished => "Diminished",
        };
        f.write_str(name)
    }
}
