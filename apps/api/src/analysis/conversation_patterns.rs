//! Conversation Pattern Extractor: recurring topics, modes and time-of-day usage.
//!
//! Topics come from two places: a static mode→topics table and the longer words of
//! a conversation's title. A topic counts at most once per conversation.

use std::collections::{BTreeMap, BTreeSet};

use chrono::Timelike;
use serde::{Deserialize, Serialize};

use crate::analysis::types::{
    confidence_for_samples, Impact, Pattern, PatternType, TimeSlot, PATTERN_THRESHOLD,
};
use crate::models::conversation::ConversationRow;

/// Title words shorter than this are ignored as topics.
const MIN_TITLE_WORD_LEN: usize = 5;

const MODE_TOPICS: &[(&str, &[&str])] = &[
    ("anxiety", &["anxiety", "worry", "stress"]),
    ("depression", &["depression", "sadness", "loneliness"]),
    ("trauma", &["trauma", "healing", "safety"]),
    ("addiction", &["addiction", "cravings", "recovery"]),
    ("relationship", &["relationships", "communication", "boundaries"]),
    ("recovery", &["recovery", "healing", "progress"]),
    ("vent", &["frustration", "stress"]),
    ("night", &["sleep", "rumination"]),
    ("advice", &["decisions", "growth"]),
    ("analysis", &["self-reflection", "growth"]),
    ("talk", &["connection"]),
    ("general", &[]),
];

pub const NEGATIVE_TOPICS: &[&str] = &["anxiety", "stress", "trauma", "depression", "addiction"];
pub const POSITIVE_TOPICS: &[&str] = &["growth", "healing", "recovery", "progress", "achievement"];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationAnalysis {
    pub patterns: Vec<Pattern>,
    pub topics: BTreeMap<String, u32>,
    /// Conversation counts keyed by mode tag.
    pub emotions: BTreeMap<String, u32>,
    pub time_patterns: BTreeMap<TimeSlot, u32>,
    /// Tags from message `patterns_detected` metadata. Reported only, never promoted to patterns.
    pub message_patterns: BTreeMap<String, u32>,
}

/// Classifies a topic against the static polarity tables.
pub fn topic_impact(topic: &str) -> Impact {
    if NEGATIVE_TOPICS.contains(&topic) {
        Impact::Negative
    } else if POSITIVE_TOPICS.contains(&topic) {
        Impact::Positive
    } else {
        Impact::Neutral
    }
}

fn mode_topics(mode: &str) -> &'static [&'static str] {
    MODE_TOPICS
        .iter()
        .find(|(m, _)| *m == mode)
        .map(|(_, topics)| *topics)
        .unwrap_or(&[])
}

fn title_words(title: &str) -> impl Iterator<Item = String> + '_ {
    title
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() >= MIN_TITLE_WORD_LEN)
        .map(|w| w.to_lowercase())
}

/// Topic set for one conversation: mode topics ∪ long title words.
pub fn conversation_topics(conversation: &ConversationRow) -> BTreeSet<String> {
    let mut topics = BTreeSet::new();

    if let Some(mode) = normalized_mode(conversation) {
        topics.extend(mode_topics(&mode).iter().map(|t| t.to_string()));
    }
    if let Some(title) = conversation.title.as_deref() {
        topics.extend(title_words(title));
    }

    topics
}

fn normalized_mode(conversation: &ConversationRow) -> Option<String> {
    conversation
        .mode
        .as_deref()
        .map(|m| m.trim().to_lowercase())
        .filter(|m| !m.is_empty())
}

/// Scans conversations for recurring topics, mode usage and time-of-day distribution.
pub fn extract_conversation_patterns(conversations: &[ConversationRow]) -> ConversationAnalysis {
    let mut topics: BTreeMap<String, u32> = BTreeMap::new();
    let mut emotions: BTreeMap<String, u32> = BTreeMap::new();
    let mut time_patterns: BTreeMap<TimeSlot, u32> = BTreeMap::new();
    let mut message_patterns: BTreeMap<String, u32> = BTreeMap::new();

    for conversation in conversations {
        for topic in conversation_topics(conversation) {
            *topics.entry(topic).or_insert(0) += 1;
        }

        if let Some(mode) = normalized_mode(conversation) {
            *emotions.entry(mode).or_insert(0) += 1;
        }

        let slot = TimeSlot::from_hour(conversation.created_at.hour());
        *time_patterns.entry(slot).or_insert(0) += 1;

        for tag in conversation.messages.iter().flat_map(|m| m.patterns_detected()) {
            *message_patterns.entry(tag.to_string()).or_insert(0) += 1;
        }
    }

    let mut patterns: Vec<Pattern> = topics
        .iter()
        .filter(|(_, &count)| count >= PATTERN_THRESHOLD)
        .map(|(topic, &count)| Pattern {
            id: format!("topic-{topic}"),
            pattern_type: PatternType::RecurringTopic,
            name: topic.clone(),
            description: format!("'{topic}' came up in {count} conversations"),
            frequency: count,
            impact: topic_impact(topic),
            confidence: confidence_for_samples(count as usize),
        })
        .collect();

    patterns.sort_by(|a, b| b.frequency.cmp(&a.frequency).then_with(|| a.name.cmp(&b.name)));

    ConversationAnalysis {
        patterns,
        topics,
        emotions,
        time_patterns,
        message_patterns,
    }
}

/// Impact keywords present in free text, matched on word prefixes ("stressful" → "stress").
/// Used to tag coaching messages with `patterns_detected` metadata.
pub fn impact_keywords_in(text: &str) -> Vec<String> {
    let words: Vec<String> = text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| w.to_lowercase())
        .collect();

    NEGATIVE_TOPICS
        .iter()
        .chain(POSITIVE_TOPICS.iter())
        .filter(|kw| words.iter().any(|w| w.starts_with(*kw)))
        .map(|kw| kw.to_string())
        .collect()
}
