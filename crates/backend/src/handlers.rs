use axum::{
    extract::{Json, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Extension,
};
use chrono::{TimeZone, Utc};
use shared_types::SessionInfo;

use crate::auth::types::{RefreshCookie, SessionToken};
use crate::auth::{relay_cookies, upstream_set_cookies};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

pub async fn health_check() -> StatusCode {
    StatusCode::OK
}

/// Current session, as established by the gate.
pub async fn session_info(
    token: Option<Extension<SessionToken>>,
    refresh: Option<Extension<RefreshCookie>>,
) -> ApiResult<Json<SessionInfo>> {
    let Extension(token) =
        token.ok_or_else(|| ApiError::Unauthorized("Missing authentication".to_string()))?;

    let expires_at = Utc
        .timestamp_opt(token.claims.exp, 0)
        .single()
        .ok_or_else(|| {
            ApiError::Internal(anyhow::anyhow!(
                "Session expiry {} out of range",
                token.claims.exp
            ))
        })?;

    Ok(Json(SessionInfo {
        subject: token.claims.sub,
        name: token.claims.name,
        expires_at,
        refresh_available: refresh.is_some(),
    }))
}

/// Forward a login request to the auth backend and relay its cookies.
///
/// The upstream status and body are passed back unchanged; every
/// `Set-Cookie` it returned goes through the cookie relay.
pub async fn relay_login(
    State(state): State<AppState>,
    Json(payload): Json<serde_json::Value>,
) -> ApiResult<Response> {
    let base_url = state
        .config
        .auth_backend_url
        .as_deref()
        .ok_or_else(|| ApiError::missing_env("AUTH_BACKEND_URL"))?;

    let upstream = state
        .http
        .post(format!("{}/auth/login", base_url))
        .json(&payload)
        .send()
        .await
        .map_err(|e| ApiError::Upstream(format!("Login request failed: {}", e)))?;

    let status = upstream.status();
    let content_type = upstream.headers().get(header::CONTENT_TYPE).cloned();
    let raw_cookies = upstream_set_cookies(upstream.headers());

    let body = upstream
        .bytes()
        .await
        .map_err(|e| ApiError::Upstream(format!("Failed to read login response: {}", e)))?;

    let mut response = (status, body).into_response();
    if let Some(content_type) = content_type {
        response.headers_mut().insert(header::CONTENT_TYPE, content_type);
    }

    let report = relay_cookies(raw_cookies, response.headers_mut());

    if status.is_success() {
        tracing::info!(
            relayed = report.relayed.len(),
            rejected = report.rejected.len(),
            "Relayed auth backend login response"
        );
    } else {
        tracing::warn!("Auth backend rejected login: {}", status);
    }

    Ok(response)
}
