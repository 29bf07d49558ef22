use common::error::{AppError, Res};
use db::{dtos::profile::ProfileUpdateRequest, models::profile::Profile};
use sqlx::PgPool;
use uuid::Uuid;

pub async fn get_profile(pool: &PgPool, user_id: Uuid) -> Res<Profile> {
    db::profile::get_profile_by_id(pool, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))
}

/// Validates and stores the editable profile fields.
pub async fn update_profile(
    pool: &PgPool,
    user_id: Uuid,
    data: ProfileUpdateRequest,
) -> Res<Profile> {
    validate_profile(&data)?;
    db::profile::upsert_profile(pool, user_id, data).await
}

fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}

pub(crate) fn validate_profile(data: &ProfileUpdateRequest) -> Res<()> {
    if is_blank(data.company_name.as_deref()) {
        return Err(AppError::BadRequest("Company name is required".to_string()));
    }
    if is_blank(data.legal_status.as_deref()) {
        return Err(AppError::BadRequest("Legal status is required".to_string()));
    }

    let amounts = [
        ("turnover_2223", data.turnover_2223),
        ("turnover_2324", data.turnover_2324),
        ("turnover_2425", data.turnover_2425),
        ("net_worth", data.net_worth),
        ("solvency_cert_value", data.solvency_cert_value),
    ];
    for (field, value) in amounts {
        if let Some(v) = value {
            if !v.is_finite() || (field != "net_worth" && v < 0.0) {
                return Err(AppError::BadRequest(format!("{} is not a valid amount", field)));
            }
        }
    }

    if let Some(pan) = data.pan_number.as_deref().filter(|p| !p.is_empty()) {
        if pan.len() != 10 || !pan.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(AppError::BadRequest("pan_number must be 10 alphanumeric characters".to_string()));
        }
    }

    if let Some(gst) = data.gst_number.as_deref().filter(|g| !g.is_empty()) {
        if gst.len() != 15 || !gst.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(AppError::BadRequest("gst_number must be 15 alphanumeric characters".to_string()));
        }
    }

    if let Some(work_orders) = &data.work_orders {
        if !work_orders.is_array() {
            return Err(AppError::BadRequest("work_orders must be a list".to_string()));
        }
    }

    Ok(())
}
