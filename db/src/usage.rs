use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use common::error::{AppError, Res};
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::models::usage::UsageCounter;

/// Storage for the per-user daily usage counter.
#[async_trait]
pub trait UsageStore: Send + Sync {
    /// Current persisted counter, `None` when the user has no profile row.
    async fn counter(&self, user_id: Uuid) -> Res<Option<UsageCounter>>;

    /// Records one action on `today` if the user is below `limit`.
    ///
    /// Check and write happen as one atomic operation. Returns the new
    /// counter, or `None` when the limit was already reached (nothing written).
    async fn try_consume(
        &self,
        user_id: Uuid,
        today: NaiveDate,
        limit: u32,
    ) -> Res<Option<UsageCounter>>;
}

pub async fn get_usage_counter<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    user_id: Uuid,
) -> Res<Option<UsageCounter>> {
    sqlx::query_as::<_, UsageCounter>(
        "SELECT daily_usage_count, last_usage_date FROM profiles WHERE id = $1",
    )
    .bind(user_id)
    .fetch_optional(executor)
    .await
    .map_err(AppError::from)
}

/// Increment-with-ceiling in a single statement.
///
/// The conflict branch holds the row lock, so concurrent callers are
/// serialized and each re-evaluates the `WHERE` against the latest count.
pub async fn consume_daily_usage<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    user_id: Uuid,
    today: NaiveDate,
    limit: u32,
) -> Res<Option<UsageCounter>> {
    let limit = i32::try_from(limit).unwrap_or(i32::MAX);
    sqlx::query_as::<_, UsageCounter>(
        r#"
        INSERT INTO profiles (id, daily_usage_count, last_usage_date)
        VALUES ($1, 1, $2)
        ON CONFLICT (id) DO UPDATE SET
            daily_usage_count = CASE
                WHEN profiles.last_usage_date = EXCLUDED.last_usage_date
                    THEN profiles.daily_usage_count + 1
                ELSE 1
            END,
            last_usage_date = EXCLUDED.last_usage_date,
            updated_at = now()
        WHERE profiles.last_usage_date IS DISTINCT FROM EXCLUDED.last_usage_date
           OR profiles.daily_usage_count < $3
        RETURNING daily_usage_count, last_usage_date
        "#,
    )
    .bind(user_id)
    .bind(today)
    .bind(limit)
    .fetch_optional(executor)
    .await
    .map_err(AppError::from)
}

pub struct PgUsageStore {
    pool: Arc<PgPool>,
}

impl PgUsageStore {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UsageStore for PgUsageStore {
    async fn counter(&self, user_id: Uuid) -> Res<Option<UsageCounter>> {
        get_usage_counter(&*self.pool, user_id).await
    }

    async fn try_consume(
        &self,
        user_id: Uuid,
        today: NaiveDate,
        limit: u32,
    ) -> Res<Option<UsageCounter>> {
        consume_daily_usage(&*self.pool, user_id, today, limit).await
    }
}
