use chrono::{DateTime, Utc};
use db::models::subscription::{Plan, Subscription, SubscriptionStatus};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct CurrentSubscriptionResponse {
    pub subscription: Option<SubscriptionView>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionView {
    pub id: Uuid,
    pub plan: Plan,
    /// Stored status, may lag behind `expires_at`.
    pub status: SubscriptionStatus,
    pub effective_status: SubscriptionStatus,
    pub amount: Option<i64>,
    pub currency: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl SubscriptionView {
    pub fn at(subscription: Subscription, now: DateTime<Utc>) -> Self {
        SubscriptionView {
            id: subscription.id,
            plan: subscription.plan,
            status: subscription.status,
            effective_status: subscription.effective_status(now),
            amount: subscription.amount,
            currency: subscription.currency,
            started_at: subscription.started_at,
            expires_at: subscription.expires_at,
        }
    }
}
