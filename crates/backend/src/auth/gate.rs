//! Session gate middleware.
//!
//! Runs in front of every route. Each request is classified against the
//! [`RouteTable`], its session token is verified, and the request is either
//! redirected or passed through. On protected paths the `refresh_token`
//! cookie is forwarded to the handler: the request keeps its own cookies,
//! `refresh_token=<value>` is guaranteed among them, and the value is also
//! available as a [`RefreshCookie`] extension.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, HeaderValue, Request},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use super::extract::read_cookie;
use super::routes::{RouteClass, RouteTable};
use super::types::{RefreshCookie, REFRESH_COOKIE};
use super::verifier::TokenVerifier;

/// Where authenticated visitors land when they hit a public-only page.
pub const DASHBOARD_PATH: &str = "/dashboard";

/// Where unauthenticated visitors land when they hit a protected path.
pub const ENTRY_PATH: &str = "/";

/// Terminal outcome for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Redirect(&'static str),
    Allow { forwarded_cookie: Option<String> },
}

/// Pure access decision.
pub fn decide(class: RouteClass, authenticated: bool, refresh: Option<&str>) -> GateDecision {
    match class {
        RouteClass::PublicOnly if authenticated => GateDecision::Redirect(DASHBOARD_PATH),
        RouteClass::Protected if !authenticated => GateDecision::Redirect(ENTRY_PATH),
        RouteClass::Protected => GateDecision::Allow {
            forwarded_cookie: refresh.map(|value| format!("{}={}", REFRESH_COOKIE, value)),
        },
        RouteClass::PublicOnly | RouteClass::Unclassified => {
            GateDecision::Allow { forwarded_cookie: None }
        }
    }
}

/// Gate state: the verification capability plus the route policy.
#[derive(Clone)]
pub struct SessionGate {
    verifier: Arc<dyn TokenVerifier>,
    routes: Arc<RouteTable>,
}

impl SessionGate {
    pub fn new(verifier: Arc<dyn TokenVerifier>, routes: RouteTable) -> Self {
        Self {
            verifier,
            routes: Arc::new(routes),
        }
    }
}

/// Middleware function enforcing the session policy.
///
/// Use with `axum::middleware::from_fn_with_state`.
pub async fn session_gate(
    State(gate): State<SessionGate>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let token = gate.verifier.verify(request.headers()).await;
    let refresh = read_cookie(request.headers(), REFRESH_COOKIE);

    let class = gate.routes.classify(request.uri().path());

    let decision = decide(class, token.is_some(), refresh.as_deref());

    match decision {
        GateDecision::Redirect(target) => {
            tracing::debug!(
                path = request.uri().path(),
                ?class,
                redirect_to = target,
                "Session gate redirect"
            );
            Redirect::temporary(target).into_response()
        }
        GateDecision::Allow { forwarded_cookie } => {
            if let Some(pair) = forwarded_cookie {
                ensure_cookie_pair(request.headers_mut(), &pair);
                if let Some(refresh) = refresh {
                    request.extensions_mut().insert(RefreshCookie(refresh));
                }
            }

            if let Some(token) = token {
                request.extensions_mut().insert(token);
            }

            next.run(request).await
        }
    }
}

/// Make `pair` visible in the request's cookies without dropping the others.
fn ensure_cookie_pair(headers: &mut HeaderMap, pair: &str) {
    let present = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .any(|p| p.trim() == pair);
    if present {
        return;
    }

    match HeaderValue::from_str(pair) {
        Ok(value) => {
            headers.append(header::COOKIE, value);
        }
        Err(e) => tracing::warn!("Refresh cookie not forwardable: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::types::{Claims, SessionToken};
    use async_trait::async_trait;
    use axum::{
        http::{HeaderMap, StatusCode},
        middleware,
        routing::get,
        Extension, Router,
    };
    use tower::ServiceExt;

    /// Verifier with a fixed answer, independent of the request.
    struct StaticVerifier(Option<SessionToken>);

    #[async_trait]
    impl TokenVerifier for StaticVerifier {
        async fn verify(&self, _headers: &HeaderMap) -> Option<SessionToken> {
            self.0.clone()
        }
    }

    fn signed_in() -> StaticVerifier {
        StaticVerifier(Some(SessionToken {
            claims: Claims {
                sub: "operator-1".to_string(),
                name: None,
                iat: 0,
                exp: i64::MAX,
            },
        }))
    }

    fn signed_out() -> StaticVerifier {
        StaticVerifier(None)
    }

    /// Echoes the `Cookie` header the handler received.
    async fn echo_cookie(request: Request<Body>) -> String {
        request
            .headers()
            .get(header::COOKIE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string()
    }

    async fn echo_refresh(refresh: Option<Extension<RefreshCookie>>) -> String {
        refresh.map(|Extension(r)| r.0).unwrap_or_default()
    }

    fn app(verifier: StaticVerifier) -> Router {
        let gate = SessionGate::new(Arc::new(verifier), RouteTable::default());
        Router::new()
            .route("/", get(echo_cookie))
            .route("/signup", get(echo_cookie))
            .route("/about", get(echo_cookie))
            .route("/dashboard", get(echo_cookie))
            .route("/dashboard/agents", get(echo_cookie))
            .route("/api/v1/agents", get(echo_cookie))
            .route("/api/v1/refresh", get(echo_refresh))
            .layer(middleware::from_fn_with_state(gate, session_gate))
    }

    async fn call(app: Router, path: &str, cookie: Option<&str>) -> Response {
        let mut builder = Request::builder().uri(path);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        app.oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn location(response: &Response) -> &str {
        response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
    }

    #[test]
    fn test_decide_table() {
        use RouteClass::*;

        assert_eq!(decide(PublicOnly, true, None), GateDecision::Redirect("/dashboard"));
        assert_eq!(
            decide(PublicOnly, false, Some("r")),
            GateDecision::Allow { forwarded_cookie: None }
        );
        assert_eq!(decide(Protected, false, Some("r")), GateDecision::Redirect("/"));
        assert_eq!(
            decide(Protected, true, Some("r-1")),
            GateDecision::Allow {
                forwarded_cookie: Some("refresh_token=r-1".to_string())
            }
        );
        assert_eq!(
            decide(Protected, true, None),
            GateDecision::Allow { forwarded_cookie: None }
        );
        for authenticated in [true, false] {
            assert_eq!(
                decide(Unclassified, authenticated, Some("r")),
                GateDecision::Allow { forwarded_cookie: None }
            );
        }
    }

    #[tokio::test]
    async fn test_authenticated_visitor_redirected_from_public_pages() {
        for path in ["/", "/signup"] {
            let response = call(app(signed_in()), path, None).await;
            assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
            assert_eq!(location(&response), "/dashboard");
        }
    }

    #[tokio::test]
    async fn test_anonymous_visitor_sees_public_pages() {
        for path in ["/", "/signup"] {
            let response = call(app(signed_out()), path, None).await;
            assert_eq!(response.status(), StatusCode::OK);
            assert!(response.headers().get(header::LOCATION).is_none());
        }
    }

    #[tokio::test]
    async fn test_anonymous_visitor_redirected_from_protected_paths() {
        for path in ["/dashboard", "/dashboard/agents", "/api/v1/agents"] {
            let response = call(app(signed_out()), path, Some("refresh_token=r-1")).await;
            assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT, "{}", path);
            assert_eq!(location(&response), "/");
        }
    }

    #[tokio::test]
    async fn test_refresh_cookie_forwarded_on_protected_paths() {
        let response = call(
            app(signed_in()),
            "/api/v1/agents",
            Some("session_token=abc; refresh_token=r-original; theme=dark"),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_text(response).await,
            "session_token=abc; refresh_token=r-original; theme=dark"
        );

        let response = call(app(signed_in()), "/api/v1/refresh", Some("refresh_token=r-2")).await;
        assert_eq!(body_text(response).await, "r-2");
    }

    #[tokio::test]
    async fn test_protected_path_without_refresh_cookie_still_proceeds() {
        let response = call(app(signed_in()), "/dashboard/agents", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "");

        let response = call(app(signed_in()), "/dashboard", Some("session_token=abc")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "session_token=abc");
    }

    #[tokio::test]
    async fn test_other_cookies_survive_with_or_without_refresh() {
        let response = call(
            app(signed_in()),
            "/api/v1/agents",
            Some("session_token=abc; csrf=k"),
        )
        .await;
        assert_eq!(body_text(response).await, "session_token=abc; csrf=k");

        let response = call(
            app(signed_in()),
            "/api/v1/agents",
            Some("session_token=abc; csrf=k; refresh_token=r1"),
        )
        .await;
        assert_eq!(
            body_text(response).await,
            "session_token=abc; csrf=k; refresh_token=r1"
        );
    }

    #[test]
    fn test_ensure_cookie_pair() {
        let mut headers = HeaderMap::new();
        headers.append(header::COOKIE, HeaderValue::from_static("csrf=k"));
        headers.append(header::COOKIE, HeaderValue::from_static("refresh_token=r1"));

        ensure_cookie_pair(&mut headers, "refresh_token=r1");
        assert_eq!(headers.get_all(header::COOKIE).iter().count(), 2);

        ensure_cookie_pair(&mut headers, "refresh_token=r2");
        let cookies: Vec<_> = headers.get_all(header::COOKIE).iter().collect();
        assert_eq!(cookies.len(), 3);
        assert_eq!(cookies[2], "refresh_token=r2");
    }

    #[tokio::test]
    async fn test_refresh_cookie_not_forwarded_on_public_pages() {
        let response = call(app(signed_out()), "/signup", Some("refresh_token=r-1; theme=dark")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "refresh_token=r-1; theme=dark");
    }

    #[tokio::test]
    async fn test_unclassified_paths_pass_through() {
        for verifier in [signed_in(), signed_out()] {
            let response = call(app(verifier), "/about", Some("theme=dark")).await;
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(body_text(response).await, "theme=dark");
        }
    }
}
