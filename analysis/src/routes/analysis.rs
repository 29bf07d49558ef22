use std::sync::Arc;

use actix_multipart::Multipart;
use actix_web::{Responder, post, web};
use chrono::Utc;
use common::{
    env_config::Config,
    error::{AppError, Res},
    http::Success,
    jwt::AuthUser,
};
use limiter::usage::{DailyUsageLimiter, usage_day};
use serde_json::Value;
use sqlx::PgPool;

use crate::services::{client::AnalysisClient, upload};

/// Submits tender PDFs for eligibility analysis against the caller's profile.
///
/// Counts towards the daily usage limit only once the upload has been
/// accepted. A rejected upload costs nothing.
///
/// # Input
/// - multipart form with 1 to 5 `files` parts, PDF only, up to 20 MB each
///
/// # Output
/// - Success: the analysis service's JSON response
/// - Error: 400 for an invalid upload, 429 when the daily limit is reached or
///   the analysis queue is full, 502 when the analysis service fails
///
/// # Frontend Example
/// ```javascript
/// const form = new FormData();
/// selectedFiles.forEach(file => form.append('files', file));
/// const res = await fetch('/api/dashboard/analysis', {
///   method: 'POST',
///   headers: { 'Authorization': `Bearer ${session.access_token}` },
///   body: form
/// });
/// ```
#[post("")]
pub async fn post_analysis(
    user: AuthUser,
    payload: Multipart,
    pool: web::Data<Arc<PgPool>>,
    limiter: web::Data<Arc<DailyUsageLimiter>>,
    config: web::Data<Arc<Config>>,
    http: web::Data<reqwest::Client>,
) -> Res<impl Responder> {
    let client = AnalysisClient::from_config(http.get_ref().clone(), &config)?;
    let files = upload::collect_pdfs(payload).await?;

    let counter = limiter
        .check_and_increment(Some(&user), usage_day(Utc::now()))
        .await?;

    let profile = match db::profile::get_profile_by_id(&***pool, user.id).await? {
        Some(profile) => serde_json::to_value(profile)
            .map_err(|e| AppError::Internal(format!("Failed to serialize profile: {}", e)))?,
        None => Value::Null,
    };

    log::info!(
        "Submitting {} document(s) for analysis for user {} ({}/{} today)",
        files.len(),
        user.id,
        counter.count,
        limiter.limit()
    );
    let report = client.submit(user.id, &profile, files).await?;
    Success::ok(report)
}
