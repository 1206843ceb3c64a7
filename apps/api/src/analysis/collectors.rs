//! Data Collectors: read-only queries feeding the insight pipeline.

use std::collections::HashMap;

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::checkin::CheckInRow;
use crate::models::conversation::{ConversationRow, MessageRow};
use crate::models::journey::JourneyRow;

/// Returns a user's most recent conversations, newest first, with their messages attached.
pub async fn fetch_conversations(
    pool: &PgPool,
    user_id: Uuid,
    limit: i64,
) -> Result<Vec<ConversationRow>, sqlx::Error> {
    let mut conversations = sqlx::query_as::<_, ConversationRow>(
        r#"
        SELECT id, user_id, created_at, title, mode, insights_generated
        FROM conversations
        WHERE user_id = $1
        ORDER BY created_at DESC
        LIMIT $2
        "#,
    )
    .bind(user_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    if conversations.is_empty() {
        return Ok(conversations);
    }

    let ids: Vec<Uuid> = conversations.iter().map(|c| c.id).collect();
    let messages = sqlx::query_as::<_, MessageRow>(
        r#"
        SELECT id, conversation_id, role, content, created_at, metadata
        FROM messages
        WHERE conversation_id = ANY($1)
        ORDER BY created_at ASC
        "#,
    )
    .bind(&ids)
    .fetch_all(pool)
    .await?;

    attach_messages(&mut conversations, messages);
    Ok(conversations)
}

fn attach_messages(conversations: &mut [ConversationRow], messages: Vec<MessageRow>) {
    let mut by_conversation: HashMap<Uuid, Vec<MessageRow>> = HashMap::new();
    for message in messages {
        by_conversation
            .entry(message.conversation_id)
            .or_default()
            .push(message);
    }
    for conversation in conversations.iter_mut() {
        conversation.messages = by_conversation.remove(&conversation.id).unwrap_or_default();
    }
}

/// Returns a user's check-ins, newest first.
pub async fn fetch_checkins(
    pool: &PgPool,
    user_id: Uuid,
    limit: i64,
) -> Result<Vec<CheckInRow>, sqlx::Error> {
    sqlx::query_as::<_, CheckInRow>(
        r#"
        SELECT id, user_id, created_at, mood_score, triggers_today
        FROM check_ins
        WHERE user_id = $1
        ORDER BY created_at DESC
        LIMIT $2
        "#,
    )
    .bind(user_id)
    .bind(limit)
    .fetch_all(pool)
    .await
}

/// Returns all of a user's journeys; completion rate needs every status.
pub async fn fetch_journeys(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Vec<JourneyRow>, sqlx::Error> {
    sqlx::query_as::<_, JourneyRow>(
        "SELECT id, user_id, status, progress, focus_area FROM user_journeys WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn make_conversation() -> ConversationRow {
        ConversationRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            created_at: Utc::now(),
            title: None,
            mode: None,
            insights_generated: None,
            messages: vec![],
        }
    }

    fn make_message(conversation_id: Uuid) -> MessageRow {
        MessageRow {
            id: Uuid::new_v4(),
            conversation_id,
            role: "user".to_string(),
            content: "hi".to_string(),
            created_at: Utc::now(),
            metadata: json!({}),
        }
    }

    #[test]
    fn test_attach_messages_groups_by_conversation() {
        let mut conversations = vec![make_conversation(), make_conversation()];
        let first = conversations[0].id;
        let messages = vec![
            make_message(first),
            make_message(first),
            make_message(Uuid::new_v4()),
        ];

        attach_messages(&mut conversations, messages);

        assert_eq!(conversations[0].messages.len(), 2);
        assert!(conversations[1].messages.is_empty());
    }
}
