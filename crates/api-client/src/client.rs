//! API client used by the console UI and CLI.

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use shared_types::SessionInfo;

use crate::config::{browser_origin, resolve_base_url, ClientConfig};
use crate::credentials::CredentialStore;
use crate::error::{ClientError, ClientResult};

/// API client for the agent console backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone, Debug)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
    timeout: Duration,
    credentials: CredentialStore,
}

impl ApiClient {
    /// Create a client against the browser origin, or the configured base URL
    /// outside a browser.
    pub fn new(config: &ClientConfig, credentials: CredentialStore) -> ClientResult<Self> {
        let base_url = resolve_base_url(browser_origin().as_deref(), config.base_url.as_deref())?;

        let builder = Client::builder();
        // Gate redirects are surfaced to the caller, not followed
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.redirect(reqwest::redirect::Policy::none());

        Ok(Self {
            http: builder.build()?,
            base_url,
            timeout: config.timeout,
            credentials,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Resolve an API path against the base URL.
    ///
    /// Paths resolving outside the base URL's origin are rejected.
    pub fn url(&self, path: &str) -> ClientResult<Url> {
        let url = self
            .base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {}", path, e)))?;

        if url.origin() != self.base_url.origin() {
            return Err(ClientError::InvalidUrl(format!(
                "{}: outside {}",
                path,
                self.base_url.origin().ascii_serialization()
            )));
        }

        Ok(url)
    }

    /// Start a request, with `Authorization: Bearer <token>` when signed in.
    ///
    /// Every request carries the configured timeout.
    pub async fn request(&self, method: Method, path: &str) -> ClientResult<RequestBuilder> {
        let url = self.url(path)?;
        let mut builder = self.http.request(method, url).timeout(self.timeout);

        if let Some(token) = self.credentials.current().await {
            builder = builder.bearer_auth(token);
        }

        Ok(builder)
    }

    /// Send a request once.
    ///
    /// A non-2xx response is logged and handed back as-is.
    pub async fn send(&self, builder: RequestBuilder) -> ClientResult<Response> {
        let request = builder.build()?;
        let method = request.method().clone();
        let url = request.url().clone();

        let response = self.http.execute(request).await?;

        if !response.status().is_success() {
            tracing::warn!(%method, %url, status = %response.status(), "API request failed");
        }

        Ok(response)
    }

    /// GET a JSON resource; non-2xx responses become `ClientError::Upstream`.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let response = self.send(self.request(Method::GET, path).await?).await?;
        Self::json(response).await
    }

    /// POST a JSON body and decode the JSON reply.
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> ClientResult<T>
    where
        B: serde::Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let builder = self.request(Method::POST, path).await?.json(body);
        let response = self.send(builder).await?;
        Self::json(response).await
    }

    /// Session the backend associates with the stored token.
    pub async fn current_session(&self) -> ClientResult<SessionInfo> {
        self.get_json("/api/v1/session").await
    }

    async fn json<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::upstream(status, &body));
        }

        Ok(response.json().await?)
    }
}
