use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::JsonValue;
use uuid::Uuid;

/// Company profile the tender eligibility is scored against.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub full_name: Option<String>,
    pub company_name: Option<String>,
    pub legal_status: Option<String>,
    pub incorporation_date: Option<NaiveDate>,
    pub startup_reg_no: Option<String>,
    pub msme_udyam_no: Option<String>,
    pub turnover_2223: Option<f64>,
    pub turnover_2324: Option<f64>,
    pub turnover_2425: Option<f64>,
    pub net_worth: Option<f64>,
    pub solvency_cert_value: Option<f64>,
    pub work_orders: Option<JsonValue>,

    // statutory registrations
    pub has_gst: Option<bool>,
    pub gst_number: Option<String>,
    pub has_udyam: Option<bool>,
    pub udyam_number: Option<String>,
    pub has_startup_india: Option<bool>,
    pub startup_india_number: Option<String>,
    pub has_epf: Option<bool>,
    pub epf_number: Option<String>,
    pub has_esic: Option<bool>,
    pub esic_number: Option<String>,
    pub has_psara: Option<bool>,
    pub psara_number: Option<String>,
    pub has_iso: Option<bool>,
    pub iso_number: Option<String>,
    pub has_pan: Option<bool>,
    pub pan_number: Option<String>,

    pub daily_usage_count: i32,
    pub last_usage_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
