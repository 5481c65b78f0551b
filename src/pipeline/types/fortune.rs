use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{LineRecord, SymbolRecord, ValidationResult};

/// Records a reading was built from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "items", rename_all = "snake_case")]
pub enum Readings {
    Symbols(Vec<SymbolRecord>),
    Lines(Vec<LineRecord>),
}

impl Readings {
    pub fn len(&self) -> usize {
        match self {
            Readings::Symbols(items) => items.len(),
            Readings::Lines(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A finished reading, handed to the caller for persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FortuneResult {
    pub id: Uuid,
    pub narrative: String,
    pub records: Readings,
    pub timestamp: DateTime<Utc>,
}

impl FortuneResult {
    pub fn new(narrative: String, records: Readings) -> Self {
        Self {
            id: Uuid::new_v4(),
            narrative,
            records,
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Reading {
    Completed(FortuneResult),
    Rejected(ValidationResult),
}

impl Reading {
    pub fn fortune(&self) -> Option<&FortuneResult> {
        match self {
            Reading::Completed(result) => Some(result),
            Reading::Rejected(_) => None,
        }
    }

    pub fn rejection(&self) -> Option<&ValidationResult> {
        match self {
            Reading::Completed(_) => None,
            Reading::Rejected(result) => Some(result),
        }
    }
}
