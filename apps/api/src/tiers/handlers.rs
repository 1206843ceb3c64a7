use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;
use serde::Serialize;

use crate::analysis::handlers::UserIdQuery;
use crate::auth::find_user;
use crate::errors::AppError;
use crate::state::AppState;
use crate::tiers::limits::{check_usage, Tier, TierLimits, UsageCheck};
use crate::tiers::usage::UsageMetric;

#[derive(Debug, Serialize)]
pub struct UsageResponse {
    pub tier: Tier,
    pub limits: TierLimits,
    pub coach_messages: UsageCheck,
}

/// GET /api/v1/usage
pub async fn handle_get_usage(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<UsageResponse>, AppError> {
    let user = find_user(&state.db, params.user_id).await?;
    let tier = Tier::from_db(&user.tier);
    let limits = tier.limits();

    let used = state
        .usage
        .current(user.id, UsageMetric::CoachMessages, Utc::now().date_naive())
        .await?;

    Ok(Json(UsageResponse {
        tier,
        limits,
        coach_messages: check_usage(limits.daily_coach_messages, used),
    }))
}
