//! Check-in Trend Analyzer: mood direction and recurring self-reported triggers.
//!
//! Input is expected newest-first. The first five mood scores form the recent
//! window; everything after is the older window.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::analysis::types::{
    confidence_for_samples, Impact, Pattern, PatternType, Trend, TrendDirection,
    PATTERN_THRESHOLD,
};
use crate::models::checkin::CheckInRow;

pub const MOOD_METRIC: &str = "Mood";

const RECENT_WINDOW: usize = 5;
/// Percent change beyond which the mood direction is no longer `stable`.
const DIRECTION_THRESHOLD: f64 = 5.0;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckInAnalysis {
    pub trends: Vec<Trend>,
    pub patterns: Vec<Pattern>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub triggers: BTreeMap<String, u32>,
}

/// `improving` above +5%, `declining` below −5%, `stable` otherwise (boundaries included).
pub fn classify_direction(change_percent: f64) -> TrendDirection {
    if change_percent > DIRECTION_THRESHOLD {
        TrendDirection::Improving
    } else if change_percent < -DIRECTION_THRESHOLD {
        TrendDirection::Declining
    } else {
        TrendDirection::Stable
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Percent change of the recent average against the older average.
/// Zero when either window is empty or the older average is zero.
pub fn window_change_percent(scores: &[f64]) -> f64 {
    let split = scores.len().min(RECENT_WINDOW);
    let (recent, older) = scores.split_at(split);

    match (mean(recent), mean(older)) {
        (Some(recent_avg), Some(older_avg)) if older_avg != 0.0 => {
            (recent_avg - older_avg) / older_avg * 100.0
        }
        _ => 0.0,
    }
}

/// Builds the mood trend from newest-first scores.
pub fn compute_mood_trend(scores: &[f64]) -> Trend {
    if scores.len() < 2 {
        return Trend {
            metric: MOOD_METRIC.to_string(),
            direction: TrendDirection::Stable,
            change_rate: 0.0,
            confidence: 0,
            timeframe: format!("last {} check-ins", scores.len()),
        };
    }

    let change_rate = window_change_percent(scores);

    Trend {
        metric: MOOD_METRIC.to_string(),
        direction: classify_direction(change_rate),
        change_rate,
        confidence: confidence_for_samples(scores.len()),
        timeframe: format!("last {} check-ins", scores.len()),
    }
}

/// Analyzes newest-first check-ins. Empty input yields an empty analysis.
pub fn analyze_checkins(checkins: &[CheckInRow]) -> CheckInAnalysis {
    if checkins.is_empty() {
        return CheckInAnalysis::default();
    }

    let scores: Vec<f64> = checkins
        .iter()
        .filter_map(|c| c.mood_score)
        .filter(|s| s.is_finite())
        .collect();

    let mut triggers: BTreeMap<String, u32> = BTreeMap::new();
    for trigger in checkins
        .iter()
        .filter_map(|c| c.triggers_today.as_ref())
        .flatten()
    {
        let key = trigger.trim().to_lowercase();
        if key.is_empty() {
            continue;
        }
        *triggers.entry(key).or_insert(0) += 1;
    }

    let mut patterns: Vec<Pattern> = triggers
        .iter()
        .filter(|(_, &count)| count >= PATTERN_THRESHOLD)
        .map(|(trigger, &count)| Pattern {
            id: format!("trigger-{trigger}"),
            pattern_type: PatternType::RecurringTrigger,
            name: trigger.clone(),
            description: format!("'{trigger}' was reported as a trigger on {count} check-ins"),
            frequency: count,
            impact: Impact::Negative,
            confidence: confidence_for_samples(count as usize),
        })
        .collect();

    patterns.sort_by(|a, b| b.frequency.cmp(&a.frequency).then_with(|| a.name.cmp(&b.name)));

    CheckInAnalysis {
        trends: vec![compute_mood_trend(&scores)],
        patterns,
        triggers,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn make_checkin(mood: Option<f64>, triggers: &[&str]) -> CheckInRow {
        CheckInRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            created_at: Utc::now(),
            mood_score: mood,
            triggers_today: if triggers.is_empty() {
                None
            } else {
                Some(triggers.iter().map(|t| t.to_string()).collect())
            },
        }
    }

    #[test]
    fn test_improving_mood_scenario() {
        let checkins: Vec<_> = [8.0, 8.0, 7.0, 9.0, 8.0, 5.0, 5.0, 4.0]
            .iter()
            .map(|&m| make_checkin(Some(m), &[]))
            .collect();

        let analysis = analyze_checkins(&checkins);
        let trend = &analysis.trends[0];

        assert_eq!(trend.metric, "Mood");
        assert_eq!(trend.direction, TrendDirection::Improving);
        // recent avg 8.0, older avg 14/3 → +71.43%
        assert!((trend.change_rate - 71.428).abs() < 0.01, "was {}", trend.change_rate);
        assert_eq!(trend.confidence, 80);
    }

    #[test]
    fn test_empty_checkins_serialize_to_empty_arrays() {
        let analysis = analyze_checkins(&[]);
        assert!(analysis.trends.is_empty());
        assert!(analysis.patterns.is_empty());
        assert_eq!(
            serde_json::to_value(&analysis).unwrap(),
            serde_json::json!({ "trends": [], "patterns": [] })
        );
    }

    #[test]
    fn test_single_score_is_stable_with_zero_confidence() {
        let analysis = analyze_checkins(&[make_checkin(Some(6.0), &[])]);
        let trend = &analysis.trends[0];
        assert_eq!(trend.direction, TrendDirection::Stable);
        assert_eq!(trend.change_rate, 0.0);
        assert_eq!(trend.confidence, 0);
    }

    #[test]
    fn test_null_scores_are_skipped() {
        let checkins = vec![make_checkin(None, &[]), make_checkin(None, &[])];
        let trend = &analyze_checkins(&checkins).trends[0];
        assert_eq!(trend.confidence, 0);
    }

    #[test]
    fn test_direction_boundaries_are_stable() {
        assert_eq!(classify_direction(5.0), TrendDirection::Stable);
        assert_eq!(classify_direction(-5.0), TrendDirection::Stable);
        assert_eq!(classify_direction(5.0001), TrendDirection::Improving);
        assert_eq!(classify_direction(-5.0001), TrendDirection::Declining);
        assert_eq!(classify_direction(0.0), TrendDirection::Stable);
    }

    #[test]
    fn test_declining_mood() {
        let scores = [3.0, 3.0, 3.0, 3.0, 3.0, 6.0, 6.0];
        let trend = compute_mood_trend(&scores);
        assert_eq!(trend.direction, TrendDirection::Declining);
        assert!((trend.change_rate + 50.0).abs() < 1e-9);
        assert_eq!(trend.confidence, 70);
    }

    #[test]
    fn test_no_older_window_is_stable() {
        let trend = compute_mood_trend(&[9.0, 2.0, 5.0]);
        assert_eq!(trend.direction, TrendDirection::Stable);
        assert_eq!(trend.change_rate, 0.0);
        assert_eq!(trend.confidence, 30);
    }

    #[test]
    fn test_confidence_caps_at_90() {
        let scores = vec![5.0; 40];
        assert_eq!(compute_mood_trend(&scores).confidence, 90);
    }

    #[test]
    fn test_trigger_threshold() {
        let checkins = vec![
            make_checkin(Some(5.0), &["work", "sleep"]),
            make_checkin(Some(5.0), &["Work ", "sleep"]),
            make_checkin(Some(5.0), &["work"]),
        ];
        let analysis = analyze_checkins(&checkins);

        assert_eq!(analysis.triggers.get("work"), Some(&3));
        assert_eq!(analysis.triggers.get("sleep"), Some(&2));
        assert_eq!(analysis.patterns.len(), 1);

        let work = &analysis.patterns[0];
        assert_eq!(work.name, "work");
        assert_eq!(work.pattern_type, PatternType::RecurringTrigger);
        assert_eq!(work.frequency, 3);
        assert_eq!(work.impact, Impact::Negative);
    }
}
