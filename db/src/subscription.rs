use std::sync::Arc;

use async_trait::async_trait;
use common::error::{AppError, Res};
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{dtos::subscription::SubscriptionActivation, models::subscription::Subscription};

#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    async fn find_by_user(&self, user_id: Uuid) -> Res<Option<Subscription>>;

    /// Insert-or-replace keyed by `user_id`. Replaying the same activation
    /// leaves one row in the same state.
    async fn upsert_active(&self, activation: SubscriptionActivation) -> Res<Subscription>;
}

pub async fn get_subscription_by_user_id<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    user_id: Uuid,
) -> Res<Option<Subscription>> {
    sqlx::query_as::<_, Subscription>("SELECT * FROM subscriptions WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(executor)
        .await
        .map_err(AppError::from)
}

pub async fn upsert_active_subscription<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    data: SubscriptionActivation,
) -> Res<Subscription> {
    sqlx::query_as::<_, Subscription>(
        r#"
        INSERT INTO subscriptions (
            user_id, plan, status, amount, currency,
            razorpay_order_id, razorpay_payment_id, razorpay_signature,
            started_at, expires_at
        )
        VALUES ($1, $2, 'active', $3, $4, $5, $6, $7, $8, $9)
        ON CONFLICT (user_id) DO UPDATE SET
            plan = EXCLUDED.plan,
            status = EXCLUDED.status,
            amount = EXCLUDED.amount,
            currency = EXCLUDED.currency,
            razorpay_order_id = EXCLUDED.razorpay_order_id,
            razorpay_payment_id = EXCLUDED.razorpay_payment_id,
            razorpay_signature = EXCLUDED.razorpay_signature,
            started_at = EXCLUDED.started_at,
            expires_at = EXCLUDED.expires_at,
            updated_at = now()
        RETURNING *
        "#,
    )
    .bind(data.user_id)
    .bind(data.plan.as_str())
    .bind(data.amount)
    .bind(data.currency)
    .bind(data.razorpay_order_id)
    .bind(data.razorpay_payment_id)
    .bind(data.razorpay_signature)
    .bind(data.started_at)
    .bind(data.expires_at)
    .fetch_one(executor)
    .await
    .map_err(AppError::from)
}

pub struct PgSubscriptionStore {
    pool: Arc<PgPool>,
}

impl PgSubscriptionStore {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubscriptionStore for PgSubscriptionStore {
    async fn find_by_user(&self, user_id: Uuid) -> Res<Option<Subscription>> {
        get_subscription_by_user_id(&*self.pool, user_id).await
    }

    async fn upsert_active(&self, activation: SubscriptionActivation) -> Res<Subscription> {
        upsert_active_subscription(&*self.pool, activation).await
    }
}
