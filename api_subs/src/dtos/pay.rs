use chrono::{DateTime, Utc};
use db::models::subscription::{Plan, SubscriptionStatus};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Order request from the checkout page. `amount` is in major units (rupees).
#[derive(Debug, Default, Deserialize)]
pub struct CreateOrderRequest {
    pub amount: Option<i64>,
    pub currency: Option<String>,
    pub receipt: Option<String>,
    pub notes: Option<Map<String, Value>>,
}

/// Body sent to the gateway's order endpoint. `amount` is in minor units.
#[derive(Debug, Serialize, Deserialize)]
pub struct GatewayOrderRequest {
    pub amount: i64,
    pub currency: String,
    pub receipt: String,
    pub notes: Map<String, Value>,
}

/// The part of the gateway's order object we use.
#[derive(Debug, Deserialize)]
pub struct GatewayOrder {
    pub id: String,
    pub amount: i64,
    pub currency: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub order_id: String,
    pub amount: i64,
    pub currency: String,
    pub key_id: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct VerifyPaymentRequest {
    pub razorpay_order_id: Option<String>,
    pub razorpay_payment_id: Option<String>,
    pub razorpay_signature: Option<String>,
    pub amount: Option<i64>,
    pub plan: Option<Plan>,
}

#[derive(Debug, Serialize)]
pub struct VerifyPaymentResponse {
    pub success: bool,
    pub subscription: ActivatedSubscription,
}

#[derive(Debug, Serialize)]
pub struct ActivatedSubscription {
    pub id: Uuid,
    pub plan: Plan,
    pub status: SubscriptionStatus,
    pub expires_at: Option<DateTime<Utc>>,
}
