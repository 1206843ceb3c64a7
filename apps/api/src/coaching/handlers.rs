//! Axum route handlers for coaching and the standalone crisis check.

use axum::{extract::State, Json};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::warn;
use uuid::Uuid;

use crate::auth::find_user;
use crate::coaching::conversations::{
    create_conversation, find_conversation, recent_messages, save_exchange, NewMessage,
};
use crate::coaching::crisis::{detect_crisis, CRISIS_RESPONSE};
use crate::coaching::prompts::CoachMode;
use crate::coaching::responder::{respond, CoachReply};
use crate::errors::AppError;
use crate::state::AppState;
use crate::tiers::limits::{Tier, UsageCheck};
use crate::tiers::usage::{reserve_quota, UsageMetric, UsageStore};

const MAX_MESSAGE_CHARS: usize = 4000;
const HISTORY_LIMIT: i64 = 20;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub user_id: Uuid,
    pub conversation_id: Option<Uuid>,
    pub mode: Option<String>,
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct SendMessageResponse {
    pub conversation_id: Uuid,
    pub reply: String,
    pub crisis_detected: bool,
    pub patterns_detected: Vec<String>,
    /// Absent when the message did not count against the quota.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<UsageCheck>,
}

#[derive(Debug, Deserialize)]
pub struct CrisisCheckRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct CrisisCheckResponse {
    pub crisis_detected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

fn validate_content(content: &str) -> Result<&str, AppError> {
    let content = content.trim();
    if content.is_empty() {
        return Err(AppError::Validation("content cannot be empty".to_string()));
    }
    if content.chars().count() > MAX_MESSAGE_CHARS {
        return Err(AppError::Validation(format!(
            "content must be at most {MAX_MESSAGE_CHARS} characters"
        )));
    }
    Ok(content)
}

/// Decides whether a message may be sent and takes its slot in the daily quota.
///
/// Crisis messages always pass and are never counted; they return `None`.
pub async fn gate_message(
    usage: &dyn UsageStore,
    user_id: Uuid,
    tier: Tier,
    in_crisis: bool,
    day: NaiveDate,
) -> Result<Option<UsageCheck>, AppError> {
    if in_crisis {
        return Ok(None);
    }
    reserve_quota(usage, user_id, tier, UsageMetric::CoachMessages, day)
        .await
        .map(Some)
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/coach/messages
///
/// Crisis messages are always answered and never count against the daily quota.
pub async fn handle_send_message(
    State(state): State<AppState>,
    Json(request): Json<SendMessageRequest>,
) -> Result<Json<SendMessageResponse>, AppError> {
    let content = validate_content(&request.content)?;

    let user = find_user(&state.db, request.user_id).await?;
    let tier = Tier::from_db(&user.tier);
    let today = Utc::now().date_naive();
    let in_crisis = detect_crisis(content);

    let usage = gate_message(state.usage.as_ref(), user.id, tier, in_crisis, today).await?;

    let (conversation_id, reply) = match exchange(&state, &request, user.id, content).await {
        Ok(outcome) => outcome,
        Err(e) => {
            if usage.is_some() {
                if let Err(release_err) = state
                    .usage
                    .release(user.id, UsageMetric::CoachMessages, today)
                    .await
                {
                    warn!("Could not release usage for {}: {release_err}", user.id);
                }
            }
            return Err(e);
        }
    };

    Ok(Json(SendMessageResponse {
        conversation_id,
        reply: reply.reply,
        crisis_detected: reply.crisis_detected,
        patterns_detected: reply.patterns_detected,
        usage,
    }))
}

/// Resolves the conversation, produces the coach reply and stores both sides.
async fn exchange(
    state: &AppState,
    request: &SendMessageRequest,
    user_id: Uuid,
    content: &str,
) -> Result<(Uuid, CoachReply), AppError> {
    let conversation = match request.conversation_id {
        Some(id) => find_conversation(&state.db, id, user_id).await?,
        None => create_conversation(&state.db, user_id, request.mode.as_deref(), content).await?,
    };

    let mode = CoachMode::parse(request.mode.as_deref().or(conversation.mode.as_deref()));
    let history = recent_messages(&state.db, conversation.id, HISTORY_LIMIT).await?;
    let reply = respond(state.coach.as_ref(), mode, &history, content).await?;

    save_exchange(
        &state.db,
        conversation.id,
        NewMessage {
            role: "user",
            content,
            metadata: json!({ "patterns_detected": reply.patterns_detected }),
        },
        NewMessage {
            role: "coach",
            content: &reply.reply,
            metadata: json!({ "crisis_detected": reply.crisis_detected }),
        },
    )
    .await?;

    Ok((conversation.id, reply))
}

/// POST /api/v1/safety/crisis-check
pub async fn handle_crisis_check(
    Json(request): Json<CrisisCheckRequest>,
) -> Json<CrisisCheckResponse> {
    let crisis_detected = detect_crisis(&request.text);
    Json(CrisisCheckResponse {
        crisis_detected,
        message: crisis_detected.then(|| CRISIS_RESPONSE.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tiers::usage::test_support::InMemoryUsageStore;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn exhausted_free_store(user_id: Uuid) -> InMemoryUsageStore {
        InMemoryUsageStore::with_count(user_id, UsageMetric::CoachMessages, day(), 10)
    }

    async fn used(store: &InMemoryUsageStore, user_id: Uuid) -> u32 {
        store
            .current(user_id, UsageMetric::CoachMessages, day())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_crisis_message_passes_exhausted_quota_uncounted() {
        let user_id = Uuid::new_v4();
        let store = exhausted_free_store(user_id);

        let gate = gate_message(&store, user_id, Tier::Free, true, day()).await;

        assert!(matches!(gate, Ok(None)));
        assert_eq!(used(&store, user_id).await, 10);
    }

    #[tokio::test]
    async fn test_regular_message_blocked_by_exhausted_quota() {
        let user_id = Uuid::new_v4();
        let store = exhausted_free_store(user_id);

        let gate = gate_message(&store, user_id, Tier::Free, false, day()).await;

        assert!(matches!(gate, Err(AppError::QuotaExceeded(_))));
        assert_eq!(used(&store, user_id).await, 10);
    }

    #[tokio::test]
    async fn test_regular_message_takes_a_slot() {
        let user_id = Uuid::new_v4();
        let store = InMemoryUsageStore::with_count(user_id, UsageMetric::CoachMessages, day(), 9);

        let check = gate_message(&store, user_id, Tier::Free, false, day())
            .await
            .unwrap()
            .expect("non-crisis messages are counted");

        assert_eq!(check.used, 10);
        assert_eq!(check.remaining, Some(0));
        assert!(gate_message(&store, user_id, Tier::Free, false, day())
            .await
            .is_err());
    }

    #[test]
    fn test_validate_content_rejects_blank() {
        assert!(matches!(
            validate_content("   "),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_validate_content_rejects_too_long() {
        let long = "x".repeat(MAX_MESSAGE_CHARS + 1);
        assert!(validate_content(&long).is_err());
    }

    #[test]
    fn test_validate_content_trims() {
        assert_eq!(validate_content("  hi there ").unwrap(), "hi there");
    }

    #[tokio::test]
    async fn test_crisis_check_handler() {
        let Json(resp) = handle_crisis_check(Json(CrisisCheckRequest {
            text: "I want to end my life".to_string(),
        }))
        .await;
        assert!(resp.crisis_detected);
        assert!(resp.message.is_some());

        let Json(resp) = handle_crisis_check(Json(CrisisCheckRequest {
            text: "I had a stressful day".to_string(),
        }))
        .await;
        assert!(!resp.crisis_detected);
        assert!(resp.message.is_none());
    }
}
