//! Coaching responder: crisis short-circuit, then a mode-specific model reply.

use async_trait::async_trait;
use serde::Serialize;
use tracing::{info, warn};

use crate::analysis::conversation_patterns::impact_keywords_in;
use crate::coaching::crisis::{detect_crisis, CRISIS_RESPONSE};
use crate::coaching::prompts::{coach_system_prompt, CoachMode};
use crate::errors::AppError;
use crate::llm_client::{ChatTurn, LlmClient, LlmError};
use crate::models::conversation::MessageRow;

/// Anything that can produce a coaching reply. `LlmClient` in production.
#[async_trait]
pub trait CoachModel: Send + Sync {
    async fn reply(&self, system: &str, turns: &[ChatTurn]) -> Result<String, LlmError>;
}

#[async_trait]
impl CoachModel for LlmClient {
    async fn reply(&self, system: &str, turns: &[ChatTurn]) -> Result<String, LlmError> {
        self.call_text(system, turns).await
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CoachReply {
    pub reply: String,
    pub crisis_detected: bool,
    pub patterns_detected: Vec<String>,
}

/// Converts stored messages into model turns. Unknown roles are dropped.
pub fn history_to_turns(history: &[MessageRow]) -> Vec<ChatTurn> {
    history
        .iter()
        .filter_map(|m| match m.role.as_str() {
            "user" => Some(ChatTurn::user(m.content.clone())),
            "coach" | "assistant" => Some(ChatTurn::assistant(m.content.clone())),
            _ => None,
        })
        .collect()
}

/// Produces the coach's reply to `content`.
///
/// Crisis language never reaches the model; the fixed crisis message is returned instead.
pub async fn respond(
    model: &dyn CoachModel,
    mode: CoachMode,
    history: &[MessageRow],
    content: &str,
) -> Result<CoachReply, AppError> {
    let patterns_detected = impact_keywords_in(content);

    if detect_crisis(content) {
        warn!("Crisis language detected; returning crisis resources");
        return Ok(CoachReply {
            reply: CRISIS_RESPONSE.to_string(),
            crisis_detected: true,
            patterns_detected,
        });
    }

    let mut turns = history_to_turns(history);
    turns.push(ChatTurn::user(content));

    let system = coach_system_prompt(mode);
    let reply = model
        .reply(&system, &turns)
        .await
        .map_err(|e| AppError::Llm(format!("Coach reply failed: {e}")))?;

    info!(
        "Coach replied in {} mode ({} history turns)",
        mode.as_str(),
        turns.len() - 1
    );

    Ok(CoachReply {
        reply,
        crisis_detected: false,
        patterns_detected,
    })
}

#[cfg(test)]
pub mod test_support {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    /// Returns a canned reply and counts how often it was asked.
    pub struct ScriptedCoach {
        pub reply: String,
        pub calls: AtomicUsize,
    }

    impl ScriptedCoach {
        pub fn new(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                calls: AtomicUsize::new(0),
            }
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CoachModel for ScriptedCoach {
        async fn reply(&self, _system: &str, _turns: &[ChatTurn]) -> Result<String, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.reply.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::ScriptedCoach;
    use super::*;
    use chrono::Utc;
    use serde_json::json;
    use uuid::Uuid;

    struct FailingCoach;

    #[async_trait]
    impl CoachModel for FailingCoach {
        async fn reply(&self, _system: &str, _turns: &[ChatTurn]) -> Result<String, LlmError> {
            Err(LlmError::EmptyContent)
        }
    }

    fn make_message(role: &str, content: &str) -> MessageRow {
        MessageRow {
            id: Uuid::new_v4(),
            conversation_id: Uuid::new_v4(),
            role: role.to_string(),
            content: content.to_string(),
            created_at: Utc::now(),
            metadata: json!({}),
        }
    }

    #[tokio::test]
    async fn test_crisis_text_never_reaches_model() {
        let coach = ScriptedCoach::new("should not be used");
        let reply = respond(&coach, CoachMode::Vent, &[], "I want to end my life")
            .await
            .unwrap();

        assert!(reply.crisis_detected);
        assert_eq!(reply.reply, CRISIS_RESPONSE);
        assert_eq!(coach.call_count(), 0);
    }

    #[tokio::test]
    async fn test_normal_text_gets_model_reply() {
        let coach = ScriptedCoach::new("That sounds like a lot.");
        let reply = respond(&coach, CoachMode::Talk, &[], "I had a stressful day")
            .await
            .unwrap();

        assert!(!reply.crisis_detected);
        assert_eq!(reply.reply, "That sounds like a lot.");
        assert_eq!(reply.patterns_detected, vec!["stress".to_string()]);
        assert_eq!(coach.call_count(), 1);
    }

    #[tokio::test]
    async fn test_model_failure_is_llm_error() {
        let result = respond(&FailingCoach, CoachMode::General, &[], "hello").await;
        assert!(matches!(result, Err(AppError::Llm(_))));
    }

    #[test]
    fn test_history_maps_roles() {
        let history = vec![
            make_message("user", "hi"),
            make_message("coach", "hello"),
            make_message("system", "ignored"),
        ];
        let turns = history_to_turns(&history);
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].role, "user");
        assert_eq!(turns[1].role, "assistant");
    }
}
