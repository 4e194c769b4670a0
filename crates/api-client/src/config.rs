use std::time::Duration;

use reqwest::Url;

use crate::error::{ClientError, ClientResult};

/// Fixed per-call timeout unless `API_TIMEOUT_SECS` says otherwise.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Fallback base URL when no browser origin is available
    pub base_url: Option<String>,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> ClientResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ClientResult<Self> {
        let timeout = match lookup("API_TIMEOUT_SECS") {
            Some(secs) => secs.trim().parse::<u64>().map_err(|_| {
                ClientError::Configuration(format!("API_TIMEOUT_SECS must be a number, got {:?}", secs))
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            base_url: lookup("API_BASE_URL").filter(|url| !url.trim().is_empty()),
            timeout: Duration::from_secs(timeout),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }
}

/// Origin of the page the client runs in, if any.
#[cfg(target_arch = "wasm32")]
pub fn browser_origin() -> Option<String> {
    web_sys::window()?.location().origin().ok()
}

/// Origin of the page the client runs in, if any.
#[cfg(not(target_arch = "wasm32"))]
pub fn browser_origin() -> Option<String> {
    None
}

/// Pick the API base URL: the browser origin first, then the configured URL.
///
/// Having neither is a configuration error. The returned URL always ends in
/// `/` so relative API paths join beneath it.
pub fn resolve_base_url(browser_origin: Option<&str>, configured: Option<&str>) -> ClientResult<Url> {
    let candidate = browser_origin
        .map(str::trim)
        .filter(|origin| !origin.is_empty() && *origin != "null")
        .or_else(|| configured.map(str::trim).filter(|url| !url.is_empty()))
        .ok_or_else(|| {
            ClientError::Configuration(
                "no browser origin available and API_BASE_URL is not set".to_string(),
            )
        })?;

    let mut url =
        Url::parse(candidate).map_err(|e| ClientError::InvalidUrl(format!("{}: {}", candidate, e)))?;

    if url.cannot_be_a_base() {
        return Err(ClientError::InvalidUrl(format!("{}: not a base URL", candidate)));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url)
}
