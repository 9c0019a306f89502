//! API configuration

use serde::Deserialize;

/// API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// JWT signing secret
    pub jwt_secret: String,
    /// Access token validity in seconds
    pub access_token_secs: u64,
    /// Refresh token validity in seconds
    pub refresh_token_secs: u64,
    /// Database URL
    pub database_url: String,
    /// Stripe webhook signing secret
    pub stripe_webhook_secret: String,
    /// Razorpay webhook signing secret
    pub razorpay_webhook_secret: String,
    /// Directory of static front-end assets
    pub static_dir: String,
    /// Log level
    pub log_level: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            jwt_secret: "change-me-in-production".to_string(),
            access_token_secs: 3600,
            refresh_token_secs: 7 * 24 * 3600,
            database_url: "postgres://localhost/coverline".to_string(),
            stripe_webhook_secret: "whsec_dev".to_string(),
            razorpay_webhook_secret: "rzp_dev".to_string(),
            static_dir: "static".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl ApiConfig {
    /// Loads configuration from environment variables with the `API_` prefix
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Environment::with_prefix("API"))
            .build()?
            .try_deserialize()
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
