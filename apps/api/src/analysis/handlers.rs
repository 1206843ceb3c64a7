use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::analysis::types::PatternAnalysis;
use crate::analysis::{run_user_analysis, CollectionLimits};
use crate::auth::find_user;
use crate::errors::AppError;
use crate::state::AppState;
use crate::tiers::limits::Tier;

#[derive(Deserialize)]
pub struct UserIdQuery {
    pub user_id: Uuid,
}

/// GET /api/v1/insights
///
/// Recomputes the user's pattern analysis from their latest records.
/// Requires a tier with pattern insights.
pub async fn handle_get_insights(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<PatternAnalysis>, AppError> {
    let user = find_user(&state.db, params.user_id).await?;
    let tier = Tier::from_db(&user.tier);
    if !tier.limits().pattern_insights {
        info!("Insights requested on {} tier by {}", tier.as_str(), user.id);
        return Err(AppError::Forbidden);
    }

    let limits = CollectionLimits {
        conversations: state.config.analysis_conversation_limit,
        checkins: state.config.analysis_checkin_limit,
    };
    let analysis = run_user_analysis(&state.db, user.id, limits).await?;
    Ok(Json(analysis))
}
