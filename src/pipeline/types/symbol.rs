use serde::{Deserialize, Serialize};

/// Shape class of a residue contour, from its circularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeType {
    Round,
    Elongated,
    Mixed,
    Undetermined,
}

impl ShapeType {
    pub const ALL: [ShapeType; 4] = [
        ShapeType::Round,
        ShapeType::Elongated,
        ShapeType::Mixed,
        ShapeType::Undetermined,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ShapeType::Round => "round",
            ShapeType::Elongated => "elongated",
            ShapeType::Mixed => "mixed",
            ShapeType::Undetermined => "undetermined",
        }
    }
}

/// Life area a symbol speaks to, fixed by where it sits in the cup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolCategory {
    Career,
    Love,
    Health,
}

impl SymbolCategory {
    pub const ALL: [SymbolCategory; 3] = [
        SymbolCategory::Career,
        SymbolCategory::Love,
        SymbolCategory::Health,
    ];

    /// Top third is career, middle third love, bottom third health.
    pub fn from_vertical_position(ratio: f32) -> Self {
        if ratio < 1.0 / 3.0 {
            SymbolCategory::Career
        } else if ratio < 2.0 / 3.0 {
            SymbolCategory::Love
        } else {
            SymbolCategory::Health
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SymbolCategory::Career => "career",
            SymbolCategory::Love => "love",
            SymbolCategory::Health => "health",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub x: u32,
    pub y: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

/// One classified residue shape. Position and size are in source image pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolRecord {
    pub shape_type: ShapeType,
    pub category: SymbolCategory,
    pub position: Position,
    pub size: Size,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertical_thirds_map_to_categories() {
        assert_eq!(SymbolCategory::from_vertical_position(0.1), SymbolCategory::Career);
        assert_eq!(SymbolCategory::from_vertical_position(0.5), SymbolCategory::Love);
        assert_eq!(SymbolCategory::from_vertical_position(0.9), SymbolCategory::Health);
        assert_eq!(SymbolCategory::from_vertical_position(1.0), SymbolCategory::Health);
    }

    #[test]
    fn record_serializes_in_snake_case() {
        let record = SymbolRecord {
            shape_type: ShapeType::Elongated,
            category: SymbolCategory::Love,
            position: Position { x: 3, y: 4 },
            size: Size {
                width: 10,
                height: 2,
            },
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["shape_type"], "elongated");
        assert_eq!(json["category"], "love");
        assert_eq!(json["size"]["width"], 10);
    }
}
