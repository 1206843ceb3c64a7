use serde::{Deserialize, Serialize};
use tracing::warn;

/// Subscription tier as stored in `users.tier`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Free,
    Premium,
    Pro,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TierLimits {
    /// `None` means unlimited.
    pub daily_coach_messages: Option<u32>,
    pub pattern_insights: bool,
}

impl Tier {
    /// Unknown tier strings fall back to `Free`.
    pub fn from_db(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "free" => Tier::Free,
            "premium" => Tier::Premium,
            "pro" => Tier::Pro,
            other => {
                warn!("Unknown tier '{other}', treating as free");
                Tier::Free
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Free => "free",
            Tier::Premium => "premium",
            Tier::Pro => "pro",
        }
    }

    pub fn limits(&self) -> TierLimits {
        match self {
            Tier::Free => TierLimits {
                daily_coach_messages: Some(10),
                pattern_insights: false,
            },
            Tier::Premium => TierLimits {
                daily_coach_messages: Some(100),
                pattern_insights: true,
            },
            Tier::Pro => TierLimits {
                daily_coach_messages: None,
                pattern_insights: true,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct UsageCheck {
    pub allowed: bool,
    pub used: u32,
    pub limit: Option<u32>,
    pub remaining: Option<u32>,
}

/// Whether one more unit fits under `limit` given `used` so far.
pub fn check_usage(limit: Option<u32>, used: u32) -> UsageCheck {
    match limit {
        Some(limit) => UsageCheck {
            allowed: used < limit,
            used,
            limit: Some(limit),
            remaining: Some(limit.saturating_sub(used)),
        },
        None => UsageCheck {
            allowed: true,
            used,
            limit: None,
            remaining: None,
        },
    }
}
