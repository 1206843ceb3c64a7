//! Insight Synthesizer: merges the three analyzer outputs into a `PatternAnalysis`.
//!
//! Pure and rule-based. Same inputs always produce the same report.

use tracing::debug;

use crate::analysis::checkin_trends::{CheckInAnalysis, MOOD_METRIC};
use crate::analysis::conversation_patterns::ConversationAnalysis;
use crate::analysis::journey_progress::JourneySummary;
use crate::analysis::types::{
    Breakthrough, BreakthroughType, Impact, NextStep, Pattern, PatternAnalysis, PatternType,
    Priority, Recommendation, RiskFactor, Severity, Strength, Trend, TrendDirection,
};

pub const MAX_NEXT_STEPS: usize = 5;

/// Negative patterns above this frequency become high-priority recommendations and risks.
const HIGH_FREQUENCY: u32 = 5;
/// Risks above this frequency are high severity.
const SEVERE_FREQUENCY: u32 = 10;
/// Mood change (percent) that counts as a breakthrough.
const BREAKTHROUGH_CHANGE: f64 = 20.0;
const BREAKTHROUGH_IMPACT_SCORE: u32 = 8;
const GOAL_ACHIEVEMENT_PROGRESS: f64 = 50.0;
const LOW_PROGRESS: f64 = 30.0;

const PATTERN_ACTIONS: [&str; 3] = [
    "Practice a daily grounding or mindfulness exercise",
    "Track when this pattern shows up and what happened just before",
    "Bring this pattern to your next coaching session",
];

const MOOD_SUPPORT_ACTIONS: [&str; 3] = [
    "Reach out to someone you trust today",
    "Schedule small, restorative activities into each day",
    "Consider speaking with a licensed mental health professional",
];

const RISK_MITIGATIONS: [&str; 3] = [
    "Build a consistent daily coping routine",
    "Learn your early warning signs and write them down",
    "Keep your support network and professional resources close",
];

const FOCUS_JOURNEY_STEP: &str = "Focus on completing the next step of your current journey";

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn is_declining_mood(trend: &Trend) -> bool {
    trend.metric == MOOD_METRIC && trend.direction == TrendDirection::Declining
}

fn pattern_recommendation(pattern: &Pattern) -> Recommendation {
    let priority = if pattern.frequency > HIGH_FREQUENCY {
        Priority::High
    } else {
        Priority::Medium
    };

    let (title, category) = match pattern.pattern_type {
        PatternType::RecurringTopic => (format!("Work through recurring {}", pattern.name), "topic"),
        PatternType::RecurringTrigger => (format!("Manage the '{}' trigger", pattern.name), "trigger"),
    };

    Recommendation {
        id: format!("rec-{}", pattern.id),
        title,
        description: format!(
            "{} This has shown up {} times recently.",
            pattern.description, pattern.frequency
        ),
        priority,
        category: category.to_string(),
        actions: owned(&PATTERN_ACTIONS),
        related_pattern: Some(pattern.id.clone()),
    }
}

fn mood_support_recommendation(trend: &Trend) -> Recommendation {
    Recommendation {
        id: "rec-mood-support".to_string(),
        title: "Mood Support Needed".to_string(),
        description: format!(
            "Your mood has dropped {:.0}% over the {}.",
            trend.change_rate.abs(),
            trend.timeframe
        ),
        priority: Priority::High,
        category: "mood".to_string(),
        actions: owned(&MOOD_SUPPORT_ACTIONS),
        related_pattern: None,
    }
}

fn build_recommendations(patterns: &[Pattern], trends: &[Trend]) -> Vec<Recommendation> {
    let mut recommendations: Vec<Recommendation> = patterns
        .iter()
        .filter(|p| p.impact == Impact::Negative)
        .map(pattern_recommendation)
        .collect();

    recommendations.extend(
        trends
            .iter()
            .filter(|t| is_declining_mood(t))
            .map(mood_support_recommendation),
    );

    recommendations
}

fn build_breakthroughs(trends: &[Trend]) -> Vec<Breakthrough> {
    trends
        .iter()
        .find(|t| {
            t.metric == MOOD_METRIC
                && t.direction == TrendDirection::Improving
                && t.change_rate > BREAKTHROUGH_CHANGE
        })
        .map(|t| Breakthrough {
            breakthrough_type: BreakthroughType::MoodImprovement,
            title: "Mood Improvement".to_string(),
            description: format!(
                "Your mood improved {:.0}% over the {}.",
                t.change_rate, t.timeframe
            ),
            impact_score: BREAKTHROUGH_IMPACT_SCORE,
        })
        .into_iter()
        .collect()
}

fn build_risks(patterns: &[Pattern]) -> Vec<RiskFactor> {
    patterns
        .iter()
        .filter(|p| p.impact == Impact::Negative && p.frequency > HIGH_FREQUENCY)
        .map(|p| RiskFactor {
            factor: p.name.clone(),
            severity: if p.frequency > SEVERE_FREQUENCY {
                Severity::High
            } else {
                Severity::Medium
            },
            description: format!("'{}' has recurred {} times", p.name, p.frequency),
            mitigation: owned(&RISK_MITIGATIONS),
        })
        .collect()
}

fn build_strengths(conversation: &ConversationAnalysis, journeys: &JourneySummary) -> Vec<Strength> {
    let mut strengths = Vec::new();

    if !conversation.patterns.is_empty() {
        strengths.push(Strength {
            area: "Engagement".to_string(),
            description: "You keep coming back to explore what matters to you".to_string(),
            evidence: format!(
                "{} recurring themes across your conversations",
                conversation.patterns.len()
            ),
        });
    }

    if journeys.average_progress > GOAL_ACHIEVEMENT_PROGRESS {
        strengths.push(Strength {
            area: "Goal Achievement".to_string(),
            description: "You are following through on your active journeys".to_string(),
            evidence: format!("Average journey progress {:.0}%", journeys.average_progress),
        });
    }

    strengths
}

fn build_next_steps(recommendations: &[Recommendation], journeys: &JourneySummary) -> Vec<NextStep> {
    let mut steps: Vec<NextStep> = recommendations
        .iter()
        .filter(|r| r.priority == Priority::High)
        .filter_map(|r| r.actions.first())
        .map(|action| NextStep {
            action: action.clone(),
            priority: Priority::High,
            timeframe: "this week".to_string(),
        })
        .collect();

    if journeys.average_progress < LOW_PROGRESS {
        steps.push(NextStep {
            action: FOCUS_JOURNEY_STEP.to_string(),
            priority: Priority::Medium,
            timeframe: "this week".to_string(),
        });
    }

    steps.truncate(MAX_NEXT_STEPS);
    steps
}

/// Merges analyzer outputs into the final report.
pub fn synthesize(
    conversation: &ConversationAnalysis,
    checkins: &CheckInAnalysis,
    journeys: &JourneySummary,
) -> PatternAnalysis {
    let patterns: Vec<Pattern> = conversation
        .patterns
        .iter()
        .chain(checkins.patterns.iter())
        .cloned()
        .collect();
    let trends = checkins.trends.clone();

    let recommendations = build_recommendations(&patterns, &trends);
    let breakthroughs = build_breakthroughs(&trends);
    let risks = build_risks(&patterns);
    let strengths = build_strengths(conversation, journeys);
    let next_steps = build_next_steps(&recommendations, journeys);

    debug!(
        patterns = patterns.len(),
        recommendations = recommendations.len(),
        risks = risks.len(),
        "Synthesized pattern analysis"
    );

    PatternAnalysis {
        patterns,
        recommendations,
        breakthroughs,
        trends,
        risks,
        strengths,
        next_steps,
    }
}
