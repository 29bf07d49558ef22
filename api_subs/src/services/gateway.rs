use common::{
    env_config::{Config, GatewayCredentials},
    error::{AppError, Res},
};

use crate::dtos::pay::{GatewayOrder, GatewayOrderRequest};

/// Thin client for the Razorpay Orders API.
pub struct RazorpayClient {
    http: reqwest::Client,
    base_url: String,
    credentials: GatewayCredentials,
}

impl RazorpayClient {
    pub fn new(http: reqwest::Client, base_url: &str, credentials: GatewayCredentials) -> Self {
        RazorpayClient {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
        }
    }

    /// Fails with a configuration error when the key pair is not set.
    pub fn from_config(http: reqwest::Client, config: &Config) -> Res<Self> {
        let credentials = config.razorpay.clone().ok_or_else(|| {
            AppError::Configuration("Razorpay credentials not configured".to_string())
        })?;
        Ok(Self::new(http, &config.razorpay_api_url, credentials))
    }

    /// Public key id, handed to the checkout widget.
    pub fn key_id(&self) -> &str {
        &self.credentials.key_id
    }

    pub async fn create_order(&self, order: &GatewayOrderRequest) -> Res<GatewayOrder> {
        let response = self
            .http
            .post(format!("{}/orders", self.base_url))
            .basic_auth(&self.credentials.key_id, Some(&self.credentials.key_secret))
            .json(order)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::error!("Razorpay order creation failed with {}: {}", status, body);
            return Err(AppError::Upstream("Failed to create order".to_string()));
        }

        response.json::<GatewayOrder>().await.map_err(|e| {
            log::error!("Unreadable Razorpay order response: {}", e);
            AppError::Upstream("Failed to create order".to_string())
        })
    }
}
