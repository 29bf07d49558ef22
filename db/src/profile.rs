use common::error::{AppError, Res};
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{dtos::profile::ProfileUpdateRequest, models::profile::Profile};

pub async fn get_profile_by_id<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    user_id: Uuid,
) -> Res<Option<Profile>> {
    sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE id = $1")
        .bind(user_id)
        .fetch_optional(executor)
        .await
        .map_err(AppError::from)
}

/// Creates or overwrites the editable profile fields.
/// Usage counter columns are left untouched.
pub async fn upsert_profile<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    user_id: Uuid,
    data: ProfileUpdateRequest,
) -> Res<Profile> {
    sqlx::query_as::<_, Profile>(
        r#"
        INSERT INTO profiles (
            id, full_name, company_name, legal_status, incorporation_date, startup_reg_no, msme_udyam_no,
            turnover_2223, turnover_2324, turnover_2425, net_worth, solvency_cert_value, work_orders,
            has_gst, gst_number, has_udyam, udyam_number, has_startup_india, startup_india_number,
            has_epf, epf_number, has_esic, esic_number, has_psara, psara_number,
            has_iso, iso_number, has_pan, pan_number
        )
        VALUES (
            $1, $2, $3, $4, $5, $6, $7, $8, $9, $10,
            $11, $12, $13, $14, $15, $16, $17, $18, $19, $20,
            $21, $22, $23, $24, $25, $26, $27, $28, $29
        )
        ON CONFLICT (id) DO UPDATE SET
            full_name = EXCLUDED.full_name,
            company_name = EXCLUDED.company_name,
            legal_status = EXCLUDED.legal_status,
            incorporation_date = EXCLUDED.incorporation_date,
            startup_reg_no = EXCLUDED.startup_reg_no,
            msme_udyam_no = EXCLUDED.msme_udyam_no,
            turnover_2223 = EXCLUDED.turnover_2223,
            turnover_2324 = EXCLUDED.turnover_2324,
            turnover_2425 = EXCLUDED.turnover_2425,
            net_worth = EXCLUDED.net_worth,
            solvency_cert_value = EXCLUDED.solvency_cert_value,
            work_orders = EXCLUDED.work_orders,
            has_gst = EXCLUDED.has_gst,
            gst_number = EXCLUDED.gst_number,
            has_udyam = EXCLUDED.has_udyam,
            udyam_number = EXCLUDED.udyam_number,
            has_startup_india = EXCLUDED.has_startup_india,
            startup_india_number = EXCLUDED.startup_india_number,
            has_epf = EXCLUDED.has_epf,
            epf_number = EXCLUDED.epf_number,
            has_esic = EXCLUDED.has_esic,
            esic_number = EXCLUDED.esic_number,
            has_psara = EXCLUDED.has_psara,
            psara_number = EXCLUDED.psara_number,
            has_iso = EXCLUDED.has_iso,
            iso_number = EXCLUDED.iso_number,
            has_pan = EXCLUDED.has_pan,
            pan_number = EXCLUDED.pan_number,
            updated_at = now()
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(data.full_name)
    .bind(data.company_name)
    .bind(data.legal_status)
    .bind(data.incorporation_date)
    .bind(data.startup_reg_no)
    .bind(data.msme_udyam_no)
    .bind(data.turnover_2223)
    .bind(data.turnover_2324)
    .bind(data.turnover_2425)
    .bind(data.net_worth)
    .bind(data.solvency_cert_value)
    .bind(data.work_orders)
    .bind(data.has_gst)
    .bind(data.gst_number)
    .bind(data.has_udyam)
    .bind(data.udyam_number)
    .bind(data.has_startup_india)
    .bind(data.startup_india_number)
    .bind(data.has_epf)
    .bind(data.epf_number)
    .bind(data.has_esic)
    .bind(data.esic_number)
    .bind(data.has_psara)
    .bind(data.psara_number)
    .bind(data.has_iso)
    .bind(data.iso_number)
    .bind(data.has_pan)
    .bind(data.pan_number)
    .fetch_one(executor)
    .await
    .map_err(AppError::from)
}
