use common::{
    env_config::Config,
    error::{AppError, Res},
};
use reqwest::{
    StatusCode,
    multipart::{Form, Part},
};
use serde_json::Value;
use uuid::Uuid;

use super::upload::PdfUpload;

/// Client for the external tender analysis service.
pub struct AnalysisClient {
    http: reqwest::Client,
    base_url: String,
}

impl AnalysisClient {
    pub fn new(http: reqwest::Client, base_url: &str) -> Self {
        AnalysisClient {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(http: reqwest::Client, config: &Config) -> Res<Self> {
        let base_url = config.analysis_service_url.as_deref().ok_or_else(|| {
            AppError::Configuration("ANALYSIS_SERVICE_URL not configured".to_string())
        })?;
        Ok(Self::new(http, base_url))
    }

    /// Submits documents with the bidder's profile. No retries: a full queue
    /// is reported back to the caller as-is.
    pub async fn submit(&self, user_id: Uuid, profile: &Value, files: Vec<PdfUpload>) -> Res<Value> {
        let mut form = Form::new()
            .text("user_id", user_id.to_string())
            .text("profile", profile.to_string());
        for file in files {
            let part = Part::bytes(file.bytes)
                .file_name(file.file_name)
                .mime_str("application/pdf")?;
            form = form.part("files", part);
        }

        let response = self
            .http
            .post(format!("{}/analyze", self.base_url))
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                log::error!("Analysis service unreachable: {}", e);
                AppError::Upstream("Analysis service is unavailable".to_string())
            })?;

        match response.status() {
            StatusCode::TOO_MANY_REQUESTS => {
                log::warn!("Analysis queue full for user {}", user_id);
                Err(AppError::TooManyRequests(
                    "Analysis queue is full. Please try again later.".to_string(),
                ))
            }
            status if !status.is_success() => {
                let body = response.text().await.unwrap_or_default();
                log::error!("Analysis service failed with {}: {}", status, body);
                Err(AppError::Upstream("Analysis failed. Please try again.".to_string()))
            }
            _ => response.json::<Value>().await.map_err(|e| {
                log::error!("Unreadable analysis response: {}", e);
                AppError::Upstream("Analysis failed. Please try again.".to_string())
            }),
        }
    }
}
