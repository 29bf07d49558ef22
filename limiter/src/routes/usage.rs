use std::sync::Arc;

use actix_web::{Responder, get, web};
use chrono::Utc;
use common::{error::Res, http::Success, jwt::AuthUser};

use crate::usage::DailyUsageLimiter;

/// Today's usage for the caller. Does not consume anything.
///
/// # Output
/// - Success: `{ count, limit, remaining, resets_at }`
/// - Error: 401 without a valid token
#[get("")]
pub async fn get_usage(
    user: AuthUser,
    limiter: web::Data<Arc<DailyUsageLimiter>>,
) -> Res<impl Responder> {
    let status = limiter.status(&user, Utc::now()).await?;
    Success::ok(status)
}
