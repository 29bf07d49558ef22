use std::sync::Arc;

use actix_web::{Responder, post, web};
use chrono::Utc;
use common::{env_config::Config, error::Res, http::Success, jwt::AuthUser};
use db::subscription::SubscriptionStore;

use crate::{
    dtos::pay::{CreateOrderRequest, VerifyPaymentRequest},
    services::{self, gateway::RazorpayClient},
};

/// Creates a Razorpay order for the checkout widget.
///
/// # Input
/// - `amount`: price in rupees (major units)
/// - `currency`: (Optional) defaults to "INR"
/// - `receipt`: (Optional) defaults to `receipt_<unix millis>`
/// - `notes`: (Optional) free-form object, `user_id` is always set by the server
///
/// # Output
/// - Success: `{ orderId, amount, currency, keyId }` where `amount` is in paise
/// - Error: 400 without an amount, 500 when the gateway is not configured,
///   502 when the gateway refuses the order
///
/// # Frontend Example
/// ```javascript
/// const res = await fetch('/api/dashboard/pay/create-order', {
///   method: 'POST',
///   headers: {
///     'Content-Type': 'application/json',
///     'Authorization': `Bearer ${session.access_token}`
///   },
///   body: JSON.stringify({ amount: 999, notes: { plan: 'business_pro' } })
/// });
/// const { orderId, amount, currency, keyId } = await res.json();
/// new Razorpay({ key: keyId, order_id: orderId, amount, currency, handler: verify }).open();
/// ```
#[post("/create-order")]
pub async fn post_create_order(
    user: AuthUser,
    req: web::Json<CreateOrderRequest>,
    config: web::Data<Arc<Config>>,
    http: web::Data<reqwest::Client>,
) -> Res<impl Responder> {
    let client = RazorpayClient::from_config(http.get_ref().clone(), &config)?;
    let order = services::pay::create_order(&client, &user, req.into_inner(), Utc::now()).await?;
    Success::ok(order)
}

/// Verifies a completed checkout and activates the caller's subscription.
///
/// # Input
/// - `razorpay_order_id`, `razorpay_payment_id`, `razorpay_signature`: from the
///   checkout widget's success handler
/// - `amount`: (Optional) rupees, defaults to 999
/// - `plan`: (Optional) "starter" or "business_pro", defaults to "business_pro"
///
/// # Output
/// - Success: `{ success: true, subscription: { id, plan, status, expires_at } }`
/// - Error: 400 "Payment verification failed" when the signature does not match
#[post("/verify")]
pub async fn post_verify(
    user: AuthUser,
    req: web::Json<VerifyPaymentRequest>,
    config: web::Data<Arc<Config>>,
    store: web::Data<Arc<dyn SubscriptionStore>>,
) -> Res<impl Responder> {
    let secret = config.razorpay.as_ref().map(|c| c.key_secret.as_str());
    let res = services::pay::verify_payment(
        store.get_ref().as_ref(),
        secret,
        &user,
        req.into_inner(),
        Utc::now(),
    )
    .await?;
    Success::ok(res)
}
