//! Daily usage counters. Redis-backed in production; swappable through `UsageStore`.

use async_trait::async_trait;
use chrono::NaiveDate;
use redis::aio::MultiplexedConnection;
use redis::Client as RedisClient;
use tracing::debug;
use uuid::Uuid;

use crate::errors::AppError;
use crate::tiers::limits::{check_usage, Tier, UsageCheck};

/// Counters outlive their day by a day so late reads still see them.
const USAGE_TTL_SECS: i64 = 48 * 3600;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UsageMetric {
    CoachMessages,
}

impl UsageMetric {
    pub fn as_str(&self) -> &'static str {
        match self {
            UsageMetric::CoachMessages => "coach_messages",
        }
    }
}

pub fn usage_key(user_id: Uuid, metric: UsageMetric, day: NaiveDate) -> String {
    format!("usage:{}:{}:{}", user_id, day.format("%Y-%m-%d"), metric.as_str())
}

#[async_trait]
pub trait UsageStore: Send + Sync {
    async fn current(&self, user_id: Uuid, metric: UsageMetric, day: NaiveDate)
        -> Result<u32, AppError>;

    /// Increments the counter and returns the new value.
    async fn increment(
        &self,
        user_id: Uuid,
        metric: UsageMetric,
        day: NaiveDate,
    ) -> Result<u32, AppError>;

    /// Gives back one unit taken by a preceding `increment` on the same key.
    async fn release(&self, user_id: Uuid, metric: UsageMetric, day: NaiveDate)
        -> Result<(), AppError>;
}

/// Holds one multiplexed connection; clones share the underlying socket.
pub struct RedisUsageStore {
    conn: MultiplexedConnection,
}

impl RedisUsageStore {
    pub async fn connect(client: &RedisClient) -> Result<Self, redis::RedisError> {
        let conn = client.get_multiplexed_async_connection().await?;
        Ok(Self { conn })
    }
}

#[async_trait]
impl UsageStore for RedisUsageStore {
    async fn current(
        &self,
        user_id: Uuid,
        metric: UsageMetric,
        day: NaiveDate,
    ) -> Result<u32, AppError> {
        let mut conn = self.conn.clone();
        let value: Option<u32> = redis::cmd("GET")
            .arg(usage_key(user_id, metric, day))
            .query_async(&mut conn)
            .await?;
        Ok(value.unwrap_or(0))
    }

    async fn increment(
        &self,
        user_id: Uuid,
        metric: UsageMetric,
        day: NaiveDate,
    ) -> Result<u32, AppError> {
        let key = usage_key(user_id, metric, day);
        let mut conn = self.conn.clone();
        let (count,): (u32,) = redis::pipe()
            .atomic()
            .cmd("INCR")
            .arg(&key)
            .cmd("EXPIRE")
            .arg(&key)
            .arg(USAGE_TTL_SECS)
            .ignore()
            .query_async(&mut conn)
            .await?;
        debug!("Usage {key} is now {count}");
        Ok(count)
    }

    async fn release(
        &self,
        user_id: Uuid,
        metric: UsageMetric,
        day: NaiveDate,
    ) -> Result<(), AppError> {
        let key = usage_key(user_id, metric, day);
        let mut conn = self.conn.clone();
        // Only called after `increment` on the same key, so the key exists.
        let count: i64 = redis::cmd("DECR").arg(&key).query_async(&mut conn).await?;
        debug!("Released usage {key}, now {count}");
        Ok(())
    }
}

fn metric_limit(tier: Tier, metric: UsageMetric) -> Option<u32> {
    match metric {
        UsageMetric::CoachMessages => tier.limits().daily_coach_messages,
    }
}

/// Reserves one unit of `metric` for today, failing with `QuotaExceeded` when the
/// tier's allowance is used up.
///
/// The counter is incremented before the check so concurrent callers can never both
/// take the last unit; a rejected reservation is released again. Callers must
/// `release` a successful reservation if the work it paid for fails.
pub async fn reserve_quota(
    store: &dyn UsageStore,
    user_id: Uuid,
    tier: Tier,
    metric: UsageMetric,
    day: NaiveDate,
) -> Result<UsageCheck, AppError> {
    let limit = metric_limit(tier, metric);
    let used = store.increment(user_id, metric, day).await?;

    if limit.is_some_and(|limit| used > limit) {
        store.release(user_id, metric, day).await?;
        return Err(AppError::QuotaExceeded(format!(
            "Daily {} limit of {} reached for the {} tier",
            metric.as_str(),
            limit.unwrap_or_default(),
            tier.as_str()
        )));
    }

    Ok(check_usage(limit, used))
}
