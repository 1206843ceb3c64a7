use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum JourneyStatus {
    Active,
    Completed,
    Paused,
    Abandoned,
}

impl JourneyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JourneyStatus::Active => "active",
            JourneyStatus::Completed => "completed",
            JourneyStatus::Paused => "paused",
            JourneyStatus::Abandoned => "abandoned",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(JourneyStatus::Active),
            "completed" => Some(JourneyStatus::Completed),
            "paused" => Some(JourneyStatus::Paused),
            "abandoned" => Some(JourneyStatus::Abandoned),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JourneyRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub status: String,
    /// Percentage, 0–100.
    pub progress: Option<f64>,
    pub focus_area: Option<String>,
}

impl JourneyRow {
    pub fn status(&self) -> Option<JourneyStatus> {
        JourneyStatus::parse(&self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trips_through_str() {
        for status in [
            JourneyStatus::Active,
            JourneyStatus::Completed,
            JourneyStatus::Paused,
            JourneyStatus::Abandoned,
        ] {
            assert_eq!(JourneyStatus::parse(status.as_str()), Some(status));
        }
    }

    #[test]
    fn test_unknown_status_is_none() {
        assert_eq!(JourneyStatus::parse("archived"), None);
    }
}
