use serde::{Deserialize, Serialize};

use crate::llm_client::prompts::{SAFETY_INSTRUCTION, STYLE_INSTRUCTION};

/// Coaching mode selected for a conversation.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CoachMode {
    Analysis,
    Talk,
    Advice,
    Vent,
    Night,
    Relationship,
    Recovery,
    #[default]
    General,
}

impl CoachMode {
    /// Unknown or missing modes fall back to `General`.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(|r| r.trim().to_lowercase()).as_deref() {
            Some("analysis") => CoachMode::Analysis,
            Some("talk") => CoachMode::Talk,
            Some("advice") => CoachMode::Advice,
            Some("vent") => CoachMode::Vent,
            Some("night") => CoachMode::Night,
            Some("relationship") => CoachMode::Relationship,
            Some("recovery") => CoachMode::Recovery,
            _ => CoachMode::General,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CoachMode::Analysis => "analysis",
            CoachMode::Talk => "talk",
            CoachMode::Advice => "advice",
            CoachMode::Vent => "vent",
            CoachMode::Night => "night",
            CoachMode::Relationship => "relationship",
            CoachMode::Recovery => "recovery",
            CoachMode::General => "general",
        }
    }
}

pub const COACH_BASE: &str = r#"You are Beneathy, a warm and grounded mental-wellness coach.
You help people notice their patterns, name what they feel and take small, realistic next steps."#;

fn mode_guidance(mode: CoachMode) -> &'static str {
    match mode {
        CoachMode::Analysis => {
            "MODE: analysis. Help the user look at the pattern behind what happened: \
             triggers, thoughts, feelings, reactions. Ask about specifics before drawing conclusions."
        }
        CoachMode::Talk => {
            "MODE: talk. Be a companion. Follow the user's lead and keep advice to a minimum."
        }
        CoachMode::Advice => {
            "MODE: advice. Offer two or three concrete, small options and help the user pick one."
        }
        CoachMode::Vent => {
            "MODE: vent. Listen and validate. Do not problem-solve unless the user asks."
        }
        CoachMode::Night => {
            "MODE: night. The user is awake late. Keep replies calm and brief, \
             and gently steer towards rest and grounding."
        }
        CoachMode::Relationship => {
            "MODE: relationship. Explore the dynamic from the user's side, \
             including needs, boundaries and how to communicate them. Never take sides against absent people."
        }
        CoachMode::Recovery => {
            "MODE: recovery. Support the user's recovery goals without judgement. \
             Celebrate progress, treat setbacks as information, and point to their support network."
        }
        CoachMode::General => {
            "MODE: general. Check in on how the user is doing and adapt to what they bring."
        }
    }
}

/// Full system prompt for a coaching reply in `mode`.
pub fn coach_system_prompt(mode: CoachMode) -> String {
    format!(
        "{COACH_BASE}\n\n{}\n{SAFETY_INSTRUCTION}{STYLE_INSTRUCTION}",
        mode_guidance(mode)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_and_unknown_modes() {
        assert_eq!(CoachMode::parse(Some("Vent")), CoachMode::Vent);
        assert_eq!(CoachMode::parse(Some("night ")), CoachMode::Night);
        assert_eq!(CoachMode::parse(Some("anxiety")), CoachMode::General);
        assert_eq!(CoachMode::parse(None), CoachMode::General);
    }

    #[test]
    fn test_system_prompt_always_has_safety_rules() {
        for mode in [CoachMode::Vent, CoachMode::Night, CoachMode::General] {
            let prompt = coach_system_prompt(mode);
            assert!(prompt.contains("SAFETY RULES"));
            assert!(prompt.contains(mode.as_str()));
        }
    }
}
