use std::sync::Arc;

use sqlx::PgPool;

use crate::auth::Authorizer;
use crate::coaching::responder::CoachModel;
use crate::config::Config;
use crate::tiers::usage::UsageStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
    /// Produces coaching replies. Default: `LlmClient`.
    pub coach: Arc<dyn CoachModel>,
    /// Daily usage counters. Default: `RedisUsageStore`.
    pub usage: Arc<dyn UsageStore>,
    /// Capability lookup for admin endpoints. Default: `DbAuthorizer`.
    pub authorizer: Arc<dyn Authorizer>,
}
