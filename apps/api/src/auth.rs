//! Capability lookup for privileged endpoints.
//!
//! Access is resolved from `user_roles`, never from a user's email address.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::user::User;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    ViewAdminDashboard,
    ManageUsers,
}

/// Capabilities granted by each known role. `admin` holds everything.
const ROLE_CAPABILITIES: &[(&str, &[Capability])] = &[
    (
        "admin",
        &[Capability::ViewAdminDashboard, Capability::ManageUsers],
    ),
    ("support", &[Capability::ViewAdminDashboard]),
];

/// True when any of `roles` grants `capability`. Unknown roles grant nothing.
pub fn roles_grant<S: AsRef<str>>(roles: &[S], capability: Capability) -> bool {
    roles.iter().any(|role| {
        ROLE_CAPABILITIES
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(role.as_ref().trim()))
            .map(|(_, caps)| caps.contains(&capability))
            .unwrap_or(false)
    })
}

#[async_trait]
pub trait Authorizer: Send + Sync {
    async fn has_capability(&self, user_id: Uuid, capability: Capability)
        -> Result<bool, AppError>;
}

/// Resolves capabilities from the `user_roles` table.
pub struct DbAuthorizer {
    pool: PgPool,
}

impl DbAuthorizer {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Authorizer for DbAuthorizer {
    async fn has_capability(
        &self,
        user_id: Uuid,
        capability: Capability,
    ) -> Result<bool, AppError> {
        let roles: Vec<String> =
            sqlx::query_scalar("SELECT role FROM user_roles WHERE user_id = $1")
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?;
        Ok(roles_grant(&roles, capability))
    }
}

/// Fails with `Forbidden` unless the user holds `capability`.
pub async fn require_capability(
    authorizer: &dyn Authorizer,
    user_id: Uuid,
    capability: Capability,
) -> Result<(), AppError> {
    if authorizer.has_capability(user_id, capability).await? {
        Ok(())
    } else {
        tracing::warn!("User {user_id} denied {capability:?}");
        Err(AppError::Forbidden)
    }
}

pub async fn find_user(pool: &PgPool, user_id: Uuid) -> Result<User, AppError> {
    sqlx::query_as::<_, User>(
        "SELECT id, external_id, email, tier, created_at FROM users WHERE id = $1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("User {user_id} not found")))
}
