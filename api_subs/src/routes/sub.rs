use std::sync::Arc;

use actix_web::{Responder, get, web};
use chrono::Utc;
use common::{error::Res, http::Success, jwt::AuthUser};
use db::subscription::SubscriptionStore;

use crate::services;

/// Returns the caller's subscription, or `{ subscription: null }`.
///
/// `effectiveStatus` is what the UI should gate on: an `active` row whose
/// `expiresAt` has passed is reported as `expired`.
#[get("/current")]
pub async fn get_current(
    user: AuthUser,
    store: web::Data<Arc<dyn SubscriptionStore>>,
) -> Res<impl Responder> {
    let res =
        services::sub::current_subscription(store.get_ref().as_ref(), &user, Utc::now()).await?;
    Success::ok(res)
}
