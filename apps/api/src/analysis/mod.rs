// Insight pipeline: collectors → three independent analyzers → synthesizer.
// Analyzers never fail; only the collectors touch the database.

pub mod checkin_trends;
pub mod collectors;
pub mod conversation_patterns;
pub mod handlers;
pub mod journey_progress;
pub mod synthesizer;
pub mod types;

use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::analysis::checkin_trends::analyze_checkins;
use crate::analysis::collectors::{fetch_checkins, fetch_conversations, fetch_journeys};
use crate::analysis::conversation_patterns::extract_conversation_patterns;
use crate::analysis::journey_progress::summarize_journeys;
use crate::analysis::synthesizer::synthesize;
use crate::analysis::types::PatternAnalysis;
use crate::errors::AppError;
use crate::models::checkin::CheckInRow;
use crate::models::conversation::ConversationRow;
use crate::models::journey::JourneyRow;

/// Upstream row limits for one analysis run.
#[derive(Debug, Clone, Copy)]
pub struct CollectionLimits {
    pub conversations: i64,
    pub checkins: i64,
}

/// Runs the three analyzers and synthesizes their outputs.
pub fn analyze(
    conversations: &[ConversationRow],
    checkins: &[CheckInRow],
    journeys: &[JourneyRow],
) -> PatternAnalysis {
    let conversation_analysis = extract_conversation_patterns(conversations);
    let checkin_analysis = analyze_checkins(checkins);
    let journey_summary = summarize_journeys(journeys);
    synthesize(&conversation_analysis, &checkin_analysis, &journey_summary)
}

/// Fetches a user's records concurrently and returns a freshly computed analysis.
///
/// A failed fetch is an error; an empty history is a valid, mostly-empty report.
pub async fn run_user_analysis(
    pool: &PgPool,
    user_id: Uuid,
    limits: CollectionLimits,
) -> Result<PatternAnalysis, AppError> {
    let (conversations, checkins, journeys) = tokio::try_join!(
        fetch_conversations(pool, user_id, limits.conversations),
        fetch_checkins(pool, user_id, limits.checkins),
        fetch_journeys(pool, user_id),
    )?;

    info!(
        "Analyzing user {user_id}: {} conversations, {} check-ins, {} journeys",
        conversations.len(),
        checkins.len(),
        journeys.len()
    );

    Ok(analyze(&conversations, &checkins, &journeys))
}
