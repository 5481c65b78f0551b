use std::fmt;

use serde::{Deserialize, Serialize};

/// The four principal palm lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PalmLine {
    Heart,
    Head,
    Life,
    Fate,
}

impl PalmLine {
    pub const ALL: [PalmLine; 4] = [PalmLine::Heart, PalmLine::Head, PalmLine::Life, PalmLine::Fate];

    /// Classifies a segment by its angle in degrees.
    ///
    /// Band edges (±30°, ±60°) are exclusive, so a segment lying exactly on
    /// one falls through to fate.
    pub fn from_angle(degrees: f32) -> Self {
        if degrees > -30.0 && degrees < 30.0 {
            PalmLine::Life
        } else if degrees > 30.0 && degrees < 60.0 {
            PalmLine::Head
        } else if degrees > -60.0 && degrees < -30.0 {
            PalmLine::Heart
        } else {
            PalmLine::Fate
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PalmLine::Heart => "heart",
            PalmLine::Head => "head",
            PalmLine::Life => "life",
            PalmLine::Fate => "fate",
        }
    }
}

impl fmt::Display for PalmLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineRecord {
    pub category: PalmLine,
}

impl From<PalmLine> for LineRecord {
    fn from(category: PalmLine) -> Self {
        Self { category }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn angle_bands() {
        assert_eq!(PalmLine::from_angle(0.0), PalmLine::Life);
        assert_eq!(PalmLine::from_angle(-29.9), PalmLine::Life);
        assert_eq!(PalmLine::from_angle(45.0), PalmLine::Head);
        assert_eq!(PalmLine::from_angle(-45.0), PalmLine::Heart);
        assert_eq!(PalmLine::from_angle(90.0), PalmLine::Fate);
        assert_eq!(PalmLine::from_angle(-120.0), PalmLine::Fate);
        assert_eq!(PalmLine::from_angle(170.0), PalmLine::Fate);
    }

    #[test]
    fn band_edges_fall_to_fate() {
        for edge in [30.0, -30.0, 60.0, -60.0] {
            assert_eq!(PalmLine::from_angle(edge), PalmLine::Fate, "{edge}");
        }
    }
}
