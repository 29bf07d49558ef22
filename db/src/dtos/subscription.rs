use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::subscription::Plan;

/// Everything written when a verified payment activates or renews a plan.
#[derive(Debug, Clone)]
pub struct SubscriptionActivation {
    pub user_id: Uuid,
    pub plan: Plan,
    pub amount: i64,
    pub currency: String,
    pub razorpay_order_id: String,
    pub razorpay_payment_id: String,
    pub razorpay_signature: String,
    pub started_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}
