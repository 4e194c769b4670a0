use anyhow::{Context, Result};
use std::env;

use crate::auth::types::AuthConfig;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub auth: AuthConfig,
    /// Base URL of the upstream auth backend the login relay forwards to
    pub auth_backend_url: Option<String>,
    pub frontend_dir: String,
    pub cors_allowed_origins: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        Ok(Self {
            port: lookup("PORT")
                .unwrap_or_else(|| "3000".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            auth: AuthConfig::from_lookup(&lookup)?,
            auth_backend_url: lookup("AUTH_BACKEND_URL")
                .map(|url| url.trim().trim_end_matches('/').to_string())
                .filter(|url| !url.is_empty()),
            frontend_dir: lookup("FRONTEND_DIR").unwrap_or_else(|| "frontend/dist".to_string()),
            cors_allowed_origins: lookup("CORS_ALLOWED_ORIGINS"),
        })
    }
}
