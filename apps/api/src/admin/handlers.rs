//! Admin dashboard endpoints. Every handler checks a capability before touching data.

use std::collections::BTreeMap;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::analysis::handlers::UserIdQuery;
use crate::auth::{require_capability, Capability};
use crate::errors::AppError;
use crate::models::journey::JourneyStatus;
use crate::state::AppState;
use crate::tiers::limits::Tier;

#[derive(Debug, Serialize)]
pub struct AdminOverview {
    pub total_users: i64,
    pub users_by_tier: BTreeMap<String, i64>,
    pub total_conversations: i64,
    pub checkins_last_7_days: i64,
    pub active_journeys: i64,
}

#[derive(Debug, Deserialize)]
pub struct SetTierRequest {
    /// The admin performing the change.
    pub user_id: Uuid,
    pub tier: Tier,
}

async fn count(pool: &PgPool, sql: &'static str) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(sql).fetch_one(pool).await
}

async fn journeys_with_status(
    pool: &PgPool,
    status: JourneyStatus,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM user_journeys WHERE status = $1")
        .bind(status.as_str())
        .fetch_one(pool)
        .await
}

async fn users_by_tier(pool: &PgPool) -> Result<Vec<(String, i64)>, sqlx::Error> {
    sqlx::query_as::<_, (String, i64)>("SELECT tier, COUNT(*) FROM users GROUP BY tier")
        .fetch_all(pool)
        .await
}

/// GET /api/v1/admin/overview
pub async fn handle_admin_overview(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<AdminOverview>, AppError> {
    require_capability(
        state.authorizer.as_ref(),
        params.user_id,
        Capability::ViewAdminDashboard,
    )
    .await?;

    let (tiers, total_conversations, checkins_last_7_days, active_journeys) = tokio::try_join!(
        users_by_tier(&state.db),
        count(&state.db, "SELECT COUNT(*) FROM conversations"),
        count(
            &state.db,
            "SELECT COUNT(*) FROM check_ins WHERE created_at > NOW() - INTERVAL '7 days'"
        ),
        journeys_with_status(&state.db, JourneyStatus::Active),
    )?;

    let users_by_tier: BTreeMap<String, i64> = tiers.into_iter().collect();

    Ok(Json(AdminOverview {
        total_users: users_by_tier.values().sum(),
        users_by_tier,
        total_conversations,
        checkins_last_7_days,
        active_journeys,
    }))
}

/// PATCH /api/v1/admin/users/:id/tier
pub async fn handle_set_user_tier(
    State(state): State<AppState>,
    Path(target_id): Path<Uuid>,
    Json(request): Json<SetTierRequest>,
) -> Result<StatusCode, AppError> {
    require_capability(
        state.authorizer.as_ref(),
        request.user_id,
        Capability::ManageUsers,
    )
    .await?;

    let result = sqlx::query("UPDATE users SET tier = $1 WHERE id = $2")
        .bind(request.tier.as_str())
        .bind(target_id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("User {target_id} not found")));
    }

    info!(
        "User {} set tier of {target_id} to {}",
        request.user_id,
        request.tier.as_str()
    );
    Ok(StatusCode::NO_CONTENT)
}
