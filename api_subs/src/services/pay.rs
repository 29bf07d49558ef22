use chrono::{DateTime, Months, Utc};
use common::{
    error::{AppError, Res},
    jwt::AuthUser,
};
use db::{
    dtos::subscription::SubscriptionActivation, models::subscription::Plan,
    subscription::SubscriptionStore,
};
use hmac::{Hmac, Mac};
use serde_json::Value;
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::{
    dtos::pay::{
        ActivatedSubscription, CreateOrderRequest, GatewayOrderRequest, OrderResponse,
        VerifyPaymentRequest, VerifyPaymentResponse,
    },
    services::gateway::RazorpayClient,
};

type HmacSha256 = Hmac<Sha256>;

pub const DEFAULT_CURRENCY: &str = "INR";
pub const DEFAULT_PLAN: Plan = Plan::BusinessPro;
pub const DEFAULT_AMOUNT: i64 = 999;

/// Builds the gateway order body: defaults filled in, amount in paise and the
/// caller recorded in the notes.
pub fn build_order(
    user: &AuthUser,
    req: CreateOrderRequest,
    now: DateTime<Utc>,
) -> Res<GatewayOrderRequest> {
    let amount = req
        .amount
        .filter(|amount| *amount > 0)
        .ok_or_else(|| AppError::BadRequest("Amount is required".to_string()))?;
    let minor_amount = amount
        .checked_mul(100)
        .ok_or_else(|| AppError::BadRequest("Amount is too large".to_string()))?;

    let mut notes = req.notes.unwrap_or_default();
    notes.insert("user_id".to_string(), Value::String(user.id.to_string()));

    Ok(GatewayOrderRequest {
        amount: minor_amount,
        currency: req.currency.unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
        receipt: req
            .receipt
            .unwrap_or_else(|| format!("receipt_{}", now.timestamp_millis())),
        notes,
    })
}

pub async fn create_order(
    client: &RazorpayClient,
    user: &AuthUser,
    req: CreateOrderRequest,
    now: DateTime<Utc>,
) -> Res<OrderResponse> {
    let order = build_order(user, req, now)?;
    log::info!(
        "Creating order for user {}: {} {} ({})",
        user.id,
        order.amount,
        order.currency,
        order.receipt
    );

    let created = client.create_order(&order).await?;
    log::info!("Order {} created for user {}", created.id, user.id);

    Ok(OrderResponse {
        order_id: created.id,
        amount: created.amount,
        currency: created.currency,
        key_id: client.key_id().to_string(),
    })
}

/// Hex encoded HMAC-SHA256 of `order_id|payment_id`.
pub fn expected_signature(secret: &str, order_id: &str, payment_id: &str) -> Res<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| AppError::Internal(format!("Invalid HMAC key: {}", e)))?;
    mac.update(order_id.as_bytes());
    mac.update(b"|");
    mac.update(payment_id.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Constant-time check of a client-supplied signature.
pub fn verify_signature(
    secret: &str,
    order_id: &str,
    payment_id: &str,
    signature: &str,
) -> Res<bool> {
    let expected = expected_signature(secret, order_id, payment_id)?;
    Ok(expected.as_bytes().ct_eq(signature.as_bytes()).into())
}

fn required(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Checks the payment signature and, when it holds, activates the caller's
/// subscription for one calendar month from `now`.
pub async fn verify_payment(
    store: &dyn SubscriptionStore,
    secret: Option<&str>,
    user: &AuthUser,
    req: VerifyPaymentRequest,
    now: DateTime<Utc>,
) -> Res<VerifyPaymentResponse> {
    let secret = secret.ok_or_else(|| {
        AppError::Configuration("Razorpay key secret not configured".to_string())
    })?;

    let (order_id, payment_id, signature) = match (
        required(req.razorpay_order_id),
        required(req.razorpay_payment_id),
        required(req.razorpay_signature),
    ) {
        (Some(order_id), Some(payment_id), Some(signature)) => (order_id, payment_id, signature),
        _ => return Err(AppError::BadRequest("Missing payment details".to_string())),
    };

    log::info!(
        "Verifying payment {} for order {} (user {})",
        payment_id,
        order_id,
        user.id
    );

    if !verify_signature(secret, &order_id, &payment_id, &signature)? {
        log::warn!("Invalid payment signature for order {} (user {})", order_id, user.id);
        return Err(AppError::VerificationFailed);
    }

    let expires_at = now
        .checked_add_months(Months::new(1))
        .ok_or_else(|| AppError::Internal("Subscription expiry out of range".to_string()))?;

    let activation = SubscriptionActivation {
        user_id: user.id,
        plan: req.plan.unwrap_or(DEFAULT_PLAN),
        amount: req.amount.filter(|a| *a > 0).unwrap_or(DEFAULT_AMOUNT),
        currency: DEFAULT_CURRENCY.to_string(),
        razorpay_order_id: order_id,
        razorpay_payment_id: payment_id,
        razorpay_signature: signature,
        started_at: now,
        expires_at,
    };

    let subscription = store.upsert_active(activation).await.map_err(|e| {
        log::error!("Failed to activate subscription for user {}: {}", user.id, e);
        AppError::Store("Failed to update subscription".to_string())
    })?;

    log::info!(
        "Subscription {} active for user {} until {}",
        subscription.id,
        user.id,
        expires_at
    );

    Ok(VerifyPaymentResponse {
        success: true,
        subscription: ActivatedSubscription {
            id: subscription.id,
            plan: subscription.plan,
            status: subscription.status,
            expires_at: subscription.expires_at,
        },
    })
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use uuid::Uuid;

    use super::*;

    fn user() -> AuthUser {
        AuthUser {
            id: Uuid::new_v4(),
            email: None,
        }
    }

    #[test]
    fn signature_matches_the_gateway_recipe() {
        let sig = expected_signature("secret", "order_1", "pay_1").unwrap();
        assert_eq!(
            sig,
            "52115a0d3400de9e86aade1f1b6eba9e8974604f4e267a9e9a16633a4c8dd2cb"
        );
        assert!(verify_signature("secret", "order_1", "pay_1", &sig).unwrap());
        assert!(!verify_signature("other", "order_1", "pay_1", &sig).unwrap());
        assert!(!verify_signature("secret", "order_1|pay", "_1", &sig).unwrap());
    }

    #[test]
    fn truncated_signature_is_rejected() {
        let sig = expected_signature("secret", "order_1", "pay_1").unwrap();
        assert!(!verify_signature("secret", "order_1", "pay_1", &sig[..63]).unwrap());
        assert!(!verify_signature("secret", "order_1", "pay_1", "").unwrap());
    }

    #[test]
    fn order_defaults_and_minor_units() {
        let caller = user();
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap();
        let order = build_order(
            &caller,
            CreateOrderRequest {
                amount: Some(999),
                ..Default::default()
            },
            now,
        )
        .unwrap();

        assert_eq!(order.amount, 99_900);
        assert_eq!(order.currency, "INR");
        assert_eq!(order.receipt, format!("receipt_{}", now.timestamp_millis()));
        assert_eq!(order.notes["user_id"], caller.id.to_string());
    }

    #[test]
    fn order_keeps_client_notes_but_owns_user_id() {
        let caller = user();
        let mut notes = serde_json::Map::new();
        notes.insert("plan".to_string(), "starter".into());
        notes.insert("user_id".to_string(), "someone-else".into());

        let order = build_order(
            &caller,
            CreateOrderRequest {
                amount: Some(499),
                currency: Some("USD".to_string()),
                receipt: Some("rcpt_7".to_string()),
                notes: Some(notes),
            },
            Utc::now(),
        )
        .unwrap();

        assert_eq!(order.currency, "USD");
        assert_eq!(order.receipt, "rcpt_7");
        assert_eq!(order.notes["plan"], "starter");
        assert_eq!(order.notes["user_id"], caller.id.to_string());
    }

    #[test]
    fn order_without_amount_is_rejected() {
        for amount in [None, Some(0), Some(-5)] {
            let err = build_order(
                &user(),
                CreateOrderRequest {
                    amount,
                    ..Default::default()
                },
                Utc::now(),
            )
            .unwrap_err();
            assert!(matches!(err, AppError::BadRequest(ref m) if m == "Amount is required"));
        }
    }

    #[test]
    fn order_amount_overflow_is_rejected() {
        let err = build_order(
            &user(),
            CreateOrderRequest {
                amount: Some(i64::MAX),
                ..Default::default()
            },
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
