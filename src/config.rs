use std::{env, net::SocketAddr, str::FromStr};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid environment variable format for {0}: {1}")]
    InvalidVar(String, String),
}

#[derive(Clone, Debug)] // Clone needed if passed around, Debug for logging
pub struct Config {
    pub bind_address: SocketAddr,
    /// Imgflip credentials forwarded on every caption_image call.
    pub imgflip_username: String,
    pub imgflip_password: String,
    /// Base URL of the Imgflip-style API; overridable for testing.
    pub imgflip_api_url: String,
    pub gemini_api_key: String,
    /// Base URL of the generative-text API; overridable for testing.
    pub gemini_api_url: String,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (ignores errors, relies on env vars otherwise)
        dotenvy::dotenv().ok();

        let bind_address_str =
            env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let bind_address = SocketAddr::from_str(&bind_address_str)
            .map_err(|e| ConfigError::InvalidVar("BIND_ADDRESS".into(), e.to_string()))?;

        let imgflip_username =
            env::var("IMGFLIP_USERNAME").unwrap_or_else(|_| "testuser".to_string());
        let imgflip_password =
            env::var("IMGFLIP_PASSWORD").unwrap_or_else(|_| "testpass".to_string());
        let imgflip_api_url =
            env::var("IMGFLIP_API_URL").unwrap_or_else(|_| "https://api.imgflip.com".to_string());

        // An empty key is passed through; the upstream rejects the call and
        // the error surfaces through the normal 500 path.
        let gemini_api_key = env::var("GEMINI_API_KEY").unwrap_or_default();
        let gemini_api_url = env::var("GEMINI_API_URL")
            .unwrap_or_else(|_| "https://generativelanguage.googleapis.com".to_string());

        Ok(Config {
            bind_address,
            imgflip_username,
            imgflip_password,
            imgflip_api_url,
            gemini_api_key,
            gemini_api_url,
        })
    }
}
