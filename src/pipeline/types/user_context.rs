use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaritalStatus {
    Single,
    Married,
    #[serde(other)]
    Other,
}

impl FromStr for MaritalStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "single" => Ok(MaritalStatus::Single),
            "married" => Ok(MaritalStatus::Married),
            "" => Err("marital status must not be empty".to_string()),
            _ => Ok(MaritalStatus::Other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    Happy,
    Sad,
    Stressed,
}

/// Profile fields the caller knows about the person asking.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub occupation: Option<String>,
    pub marital_status: Option<MaritalStatus>,
    pub age: Option<u32>,
}

impl UserProfile {
    pub fn is_empty(&self) -> bool {
        self.occupation.is_none() && self.marital_status.is_none() && self.age.is_none()
    }
}

/// Read-only context for a coffee reading.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserContext {
    pub profile: Option<UserProfile>,
    pub mood: Option<Mood>,
}

impl UserContext {
    pub fn new(profile: Option<UserProfile>, mood: Option<Mood>) -> Self {
        Self { profile, mood }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mood_values_match_wire_names() {
        for mood in Mood::value_variants() {
            let name = mood.to_possible_value().unwrap().get_name().to_string();
            assert_eq!(serde_json::to_value(mood).unwrap(), name.as_str());
        }
        assert_eq!(Mood::from_str("stressed", false), Ok(Mood::Stressed));
        assert!(Mood::from_str("bored", true).is_err());
    }

    #[test]
    fn unknown_marital_status_is_other() {
        assert_eq!("divorced".parse::<MaritalStatus>(), Ok(MaritalStatus::Other));
        let status: MaritalStatus = serde_json::from_str("\"widowed\"").unwrap();
        assert_eq!(status, MaritalStatus::Other);
    }

    #[test]
    fn context_deserializes_with_missing_fields() {
        let context: UserContext = serde_json::from_str(r#"{"mood":"happy"}"#).unwrap();
        assert_eq!(context.mood, Some(Mood::Happy));
        assert!(context.profile.is_none());
    }
}
