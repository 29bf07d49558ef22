use std::sync::Arc;

use actix_web::{Responder, get, put, web};
use common::{error::Res, http::Success, jwt::AuthUser};
use db::dtos::profile::ProfileUpdateRequest;
use sqlx::PgPool;

use crate::services;

/// Returns the caller's company profile.
///
/// # Output
/// - Success: the profile row, including today's raw usage columns
/// - Error: 401 without a valid token, 404 when no profile exists yet
#[get("")]
pub async fn get_profile(user: AuthUser, pool: web::Data<Arc<PgPool>>) -> Res<impl Responder> {
    let profile = services::profile::get_profile(&pool, user.id).await?;
    Success::ok(profile)
}

/// Creates or replaces the caller's company profile.
///
/// `company_name` and `legal_status` are required; everything else is optional.
///
/// # Frontend Example
/// ```javascript
/// await fetch('/api/dashboard/profile', {
///   method: 'PUT',
///   headers: {
///     'Content-Type': 'application/json',
///     'Authorization': `Bearer ${session.access_token}`
///   },
///   body: JSON.stringify({
///     company_name: "ACME Infra",
///     legal_status: "Private Limited",
///     has_gst: true,
///     gst_number: "27AAPFU0939F1ZV",
///     turnover_2324: 12500000
///   })
/// });
/// ```
#[put("")]
pub async fn put_profile(
    user: AuthUser,
    pool: web::Data<Arc<PgPool>>,
    req: web::Json<ProfileUpdateRequest>,
) -> Res<impl Responder> {
    let profile = services::profile::update_profile(&pool, user.id, req.into_inner()).await?;
    log::info!("Profile updated for user {}", user.id);
    Success::ok(profile)
}
