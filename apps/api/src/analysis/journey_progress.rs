use serde::{Deserialize, Serialize};

use crate::models::journey::{JourneyRow, JourneyStatus};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JourneySummary {
    /// Completed journeys over all journeys, 0.0–1.0.
    pub completion_rate: f64,
    /// Mean progress percentage over active journeys only.
    pub average_progress: f64,
    pub focus_areas: Vec<String>,
}

pub fn summarize_journeys(journeys: &[JourneyRow]) -> JourneySummary {
    if journeys.is_empty() {
        return JourneySummary::default();
    }

    let completed = journeys
        .iter()
        .filter(|j| j.status() == Some(JourneyStatus::Completed))
        .count();

    let active: Vec<&JourneyRow> = journeys
        .iter()
        .filter(|j| j.status() == Some(JourneyStatus::Active))
        .collect();

    let average_progress = if active.is_empty() {
        0.0
    } else {
        active.iter().map(|j| j.progress.unwrap_or(0.0)).sum::<f64>() / active.len() as f64
    };

    let focus_areas = active
        .iter()
        .filter_map(|j| j.focus_area.clone())
        .collect();

    JourneySummary {
        completion_rate: completed as f64 / journeys.len() as f64,
        average_progress,
        focus_areas,
    }
}
