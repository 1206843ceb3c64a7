//! Value objects produced by the insight pipeline.
//!
//! Everything here is derived and transient: built per request, serialized as JSON,
//! never written back to the database.

use serde::{Deserialize, Serialize};

/// Minimum occurrence count before a recurring topic or trigger becomes a `Pattern`.
pub const PATTERN_THRESHOLD: u32 = 3;

/// Confidence ceiling for any sample-count based confidence.
pub const MAX_CONFIDENCE: u32 = 90;

/// Confidence grows by 10 per sample and caps at 90.
pub fn confidence_for_samples(samples: usize) -> u32 {
    (samples.min(u32::MAX as usize) as u32)
        .saturating_mul(10)
        .min(MAX_CONFIDENCE)
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PatternType {
    RecurringTopic,
    RecurringTrigger,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Impact {
    Positive,
    Negative,
    Neutral,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Improving,
    Declining,
    Stable,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BreakthroughType {
    MoodImprovement,
}

/// Coarse time-of-day bucket for when a conversation started.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TimeSlot {
    Morning,
    Afternoon,
    Evening,
    LateNight,
}

impl TimeSlot {
    /// morning 05–11, afternoon 12–16, evening 17–21, late_night 22–04.
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            5..=11 => TimeSlot::Morning,
            12..=16 => TimeSlot::Afternoon,
            17..=21 => TimeSlot::Evening,
            _ => TimeSlot::LateNight,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Pattern {
    pub id: String,
    #[serde(rename = "type")]
    pub pattern_type: PatternType,
    pub name: String,
    pub description: String,
    /// Number of occurrences that produced this pattern.
    pub frequency: u32,
    pub impact: Impact,
    pub confidence: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub id: String,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub category: String,
    pub actions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_pattern: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Breakthrough {
    #[serde(rename = "type")]
    pub breakthrough_type: BreakthroughType,
    pub title: String,
    pub description: String,
    pub impact_score: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Trend {
    pub metric: String,
    pub direction: TrendDirection,
    /// Percent change of the recent window against the older window.
    pub change_rate: f64,
    pub confidence: u32,
    pub timeframe: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RiskFactor {
    pub factor: String,
    pub severity: Severity,
    pub description: String,
    pub mitigation: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Strength {
    pub area: String,
    pub description: String,
    pub evidence: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NextStep {
    pub action: String,
    pub priority: Priority,
    pub timeframe: String,
}

/// Full synthesized report returned by `GET /api/v1/insights`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PatternAnalysis {
    pub patterns: Vec<Pattern>,
    pub recommendations: Vec<Recommendation>,
    pub breakthroughs: Vec<Breakthrough>,
    pub trends: Vec<Trend>,
    pub risks: Vec<RiskFactor>,
    pub strengths: Vec<Strength>,
    pub next_steps: Vec<NextStep>,
}
