use std::{env, num::NonZeroU32, sync::Arc};

use crate::error::{AppError, Res};

#[derive(Clone)]
/// Configuration struct for the server.
///
/// This struct holds all the necessary configuration parameters
/// required to initialize and run the server.
/// It includes database connection details, bearer token validation,
/// server host and port, number of worker threads, CORS settings,
/// logging preferences, usage limits, and the payment gateway and
/// analysis service endpoints.
pub struct Config {
    // environment
    pub environment: String, // development or production
    /// The URL of the database to connect to.
    pub database_url: String,
    /// Configuration for validating bearer tokens issued by the auth provider.
    pub jwt_config: JwtConfig,
    /// The hostname or IP address the server will bind to.
    pub server_host: String,
    /// The port number the server will listen on.
    pub server_port: u16,
    /// The number of worker threads to spawn for handling requests.
    pub num_workers: usize,
    /// The allowed origin for CORS (Cross-Origin Resource Sharing).
    pub cors_allowed_origin: String,
    /// A boolean indicating whether console logging is enabled.
    pub console_logging_enabled: bool,
    /// Analysis actions a user may perform per UTC calendar day.
    pub daily_usage_limit: NonZeroU32,
    /// Razorpay credentials. `None` when either half is missing.
    pub razorpay: Option<GatewayCredentials>,
    /// Base URL of the Razorpay REST API.
    pub razorpay_api_url: String,
    /// Base URL of the external analysis service.
    pub analysis_service_url: Option<String>,
}

#[derive(Clone)]
/// Configuration for validating JSON Web Tokens issued by the managed auth provider.
///
/// Tokens are HS256 signed with the project's JWT secret and carry
/// the user id in `sub`.
pub struct JwtConfig {
    /// The secret key used to verify JWTs.
    pub secret: String,
    /// Expected `aud` claim.
    pub audience: String,
}

#[derive(Clone)]
/// Server-held payment gateway credentials.
pub struct GatewayCredentials {
    pub key_id: String,
    pub key_secret: String,
}

impl std::fmt::Debug for GatewayCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayCredentials")
            .field("key_id", &self.key_id)
            .field("key_secret", &"***")
            .finish()
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("environment", &self.environment)
            .field("database_url", &"***")
            .field("jwt_config", &self.jwt_config)
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .field("num_workers", &self.num_workers)
            .field("cors_allowed_origin", &self.cors_allowed_origin)
            .field("console_logging_enabled", &self.console_logging_enabled)
            .field("daily_usage_limit", &self.daily_usage_limit)
            .field("razorpay", &self.razorpay)
            .field("razorpay_api_url", &self.razorpay_api_url)
            .field("analysis_service_url", &self.analysis_service_url)
            .finish()
    }
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"***")
            .field("audience", &self.audience)
            .finish()
    }
}

impl Config {
    /// Creates a new `Config` instance from environment variables.
    ///
    /// Loads `.env` first if present, then reads the process environment.
    ///
    /// # Environment Variables
    ///
    /// Required:
    /// - `ENVIRONMENT`: `development` or `production`
    /// - `DATABASE_URL`: Connection string for the database
    /// - `JWT_SECRET`: Secret used by the auth provider to sign tokens
    ///
    /// Optional (with defaults):
    /// - `JWT_AUDIENCE`: Expected token audience (default: "authenticated")
    /// - `IP`: Server host (default: "127.0.0.1")
    /// - `PORT`: Server port (default: 8080)
    /// - `WORKERS`: Number of worker threads (default: 4)
    /// - `CORS_ALLOWED_ORIGIN`: Allowed CORS origin (default: "http://localhost:5173")
    /// - `ENABLE_CONSOLE_LOGGING`: Whether to enable console logging (default: true)
    /// - `DAILY_USAGE_LIMIT`: Analyses per user per day (default: 50)
    /// - `RAZORPAY_KEY_ID`, `RAZORPAY_KEY_SECRET`: Gateway credentials (no default)
    /// - `RAZORPAY_API_URL`: Gateway base URL (default: "https://api.razorpay.com/v1")
    /// - `ANALYSIS_SERVICE_URL`: Analysis service base URL (no default)
    ///
    /// # Panics
    ///
    /// This function will panic if required environment variables are missing or if
    /// numeric values cannot be parsed correctly.
    pub fn from_env() -> Arc<Self> {
        dotenvy::dotenv().ok();

        match Self::from_lookup(|key| env::var(key).ok()) {
            Ok(config) => Arc::new(config),
            Err(e) => panic!("{}", e),
        }
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Res<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| AppError::Configuration(format!("{} must be set", key)))
        };
        let optional = |key: &str| lookup(key).filter(|v| !v.is_empty());
        let non_zero = |key: &str, default: u32| -> Res<NonZeroU32> {
            match optional(key) {
                Some(raw) => raw.parse::<NonZeroU32>().map_err(|_| {
                    AppError::Configuration(format!("{} must be a positive number", key))
                }),
                None => Ok(NonZeroU32::new(default).unwrap_or(NonZeroU32::MIN)),
            }
        };

        let razorpay = match (optional("RAZORPAY_KEY_ID"), optional("RAZORPAY_KEY_SECRET")) {
            (Some(key_id), Some(key_secret)) => Some(GatewayCredentials { key_id, key_secret }),
            _ => None,
        };

        Ok(Config {
            environment: required("ENVIRONMENT")?,
            database_url: required("DATABASE_URL")?,
            jwt_config: JwtConfig {
                secret: required("JWT_SECRET")?,
                audience: optional("JWT_AUDIENCE").unwrap_or_else(|| "authenticated".to_string()),
            },
            server_host: optional("IP").unwrap_or_else(|| "127.0.0.1".to_string()),
            server_port: optional("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            num_workers: optional("WORKERS")
                .and_then(|w| w.parse().ok())
                .unwrap_or(4),
            cors_allowed_origin: optional("CORS_ALLOWED_ORIGIN")
                .unwrap_or_else(|| "http://localhost:5173".to_string()),
            console_logging_enabled: optional("ENABLE_CONSOLE_LOGGING")
                .map(|v| v.to_lowercase() == "true")
                .unwrap_or(true),
            daily_usage_limit: non_zero("DAILY_USAGE_LIMIT", 50)?,
            razorpay,
            razorpay_api_url: optional("RAZORPAY_API_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or_else(|| "https://api.razorpay.com/v1".to_string()),
            analysis_service_url: optional("ANALYSIS_SERVICE_URL")
                .map(|u| u.trim_end_matches('/').to_string()),
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}
