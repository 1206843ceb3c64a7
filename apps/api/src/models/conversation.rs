use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ConversationRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub title: Option<String>,
    pub mode: Option<String>,
    /// Pattern tags computed by an earlier pass, stored as a JSON array.
    pub insights_generated: Option<Value>,
    /// Populated by the collector from the `messages` table.
    #[sqlx(skip)]
    #[serde(default)]
    pub messages: Vec<MessageRow>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MessageRow {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub role: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub metadata: Value,
}

impl MessageRow {
    /// Returns the `patterns_detected` list from metadata, or an empty list.
    pub fn patterns_detected(&self) -> Vec<&str> {
        self.metadata
            .get("patterns_detected")
            .and_then(|v| v.as_array())
            .map(|arr| arr.iter().filter_map(|p| p.as_str()).collect())
            .unwrap_or_default()
    }
}
