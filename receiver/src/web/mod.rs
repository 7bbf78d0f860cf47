//! Web server module for receiving GitHub webhooks.
//!
//! This module provides a thin web server that:
//! - Serves exactly one `POST` route, at the configured hook path
//! - Verifies the delivery's HMAC-SHA256 signature
//! - Logs the accepted payload and answers `200 OK`, or `403` otherwise

pub mod handlers;
pub mod signature;

use axum::{extract::DefaultBodyLimit, routing::post, Router};
use tower_http::trace::TraceLayer;

pub use handlers::{github_webhook, receive, AppState, IncomingWebhookRequest, WebhookError};
pub use signature::{
    compute_signature, format_signature_header, parse_signature_header, verify_signature,
    MalformedSignature, SignatureError, Verified, SIGNATURE_HEADER, SIGNATURE_PREFIX,
};

/// Build the router: the webhook route plus body limit and request tracing.
pub fn build_router(state: AppState) -> Router {
    let hook_path = state.config.hook_path.clone();
    let max_body_bytes = state.config.max_body_bytes;

    Router::new()
        .route(&hook_path, post(github_webhook))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ServerConfig, DEFAULT_MAX_BODY_BYTES};
    use axum::body::{to_bytes, Body};
    use axum::http::{HeaderValue, Request, StatusCode};
    use axum::response::Response;
    use tower::ServiceExt;

    const HOOK_PATH: &str = "/github/webhook";
    const HOOKSHOT_UA: &str = "GitHub-Hookshot/044aadd";

    fn test_router(secret: &str) -> Router {
        test_router_with_limit(secret, DEFAULT_MAX_BODY_BYTES)
    }

    fn test_router_with_limit(secret: &str, max_body_bytes: usize) -> Router {
        build_router(AppState::new(ServerConfig {
            secret: secret.to_string(),
            hook_path: HOOK_PATH.to_string(),
            port: 8080,
            max_body_bytes,
        }))
    }

    fn signed_request(secret: &str, user_agent: &str, body: &'static [u8]) -> Request<Body> {
        let header = format_signature_header(&compute_signature(body, secret.as_bytes()));
        Request::builder()
            .method("POST")
            .uri(HOOK_PATH)
            .header("user-agent", user_agent)
            .header("x-github-event", "ping")
            .header("x-github-delivery", "72d3162e-cc78-11e3-81ab-4c9367dc0958")
            .header(SIGNATURE_HEADER, header)
            .body(Body::from(body))
            .unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn valid_signature_returns_ok() {
        let app = test_router("abc");
        let response = app
            .oneshot(signed_request("abc", HOOKSHOT_UA, b"{}"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "OK");
    }

    #[tokio::test]
    async fn modified_body_returns_forbidden() {
        let app = test_router("abc");
        let mut request = signed_request("abc", HOOKSHOT_UA, b"{}");
        *request.body_mut() = Body::from(&b"{ }"[..]);

        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(body_text(response).await, "invalid signature");
    }

    #[tokio::test]
    async fn wrong_secret_returns_forbidden() {
        let app = test_router("correct-secret");
        let response = app
            .oneshot(signed_request("wrong-secret", HOOKSHOT_UA, b"{\"zen\":\"hi\"}"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(body_text(response).await, "invalid signature");
    }

    #[tokio::test]
    async fn non_github_user_agent_rejected_even_with_valid_signature() {
        let app = test_router("abc");
        let response = app
            .oneshot(signed_request("abc", "curl/7.64", b"{}"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(body_text(response).await, "invalid user agent");
    }

    #[tokio::test]
    async fn missing_user_agent_rejected() {
        let app = test_router("");
        let request = Request::builder()
            .method("POST")
            .uri(HOOK_PATH)
            .body(Body::from("{}"))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(body_text(response).await, "invalid user agent");
    }

    #[tokio::test]
    async fn unreadable_header_returns_bind_failure() {
        let app = test_router("abc");
        let request = Request::builder()
            .method("POST")
            .uri(HOOK_PATH)
            .header("user-agent", HeaderValue::from_bytes(b"GitHub-Hookshot/\xff").unwrap())
            .body(Body::from("{}"))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(body_text(response).await, "could not bind header: user-agent");
    }

    #[tokio::test]
    async fn missing_signature_header_returns_forbidden() {
        let app = test_router("abc");
        let request = Request::builder()
            .method("POST")
            .uri(HOOK_PATH)
            .header("user-agent", HOOKSHOT_UA)
            .body(Body::from("{}"))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(body_text(response).await, "missing signature header");
    }

    #[tokio::test]
    async fn legacy_sha1_header_returns_forbidden() {
        let app = test_router("abc");
        let request = Request::builder()
            .method("POST")
            .uri(HOOK_PATH)
            .header("user-agent", HOOKSHOT_UA)
            .header(SIGNATURE_HEADER, "sha1=7d38cdd689735b008b3c702edd92eea23791c5f6")
            .body(Body::from("{}"))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            body_text(response).await,
            "malformed signature header: missing sha256= prefix"
        );
    }

    #[tokio::test]
    async fn empty_secret_accepts_unsigned_delivery() {
        let app = test_router("");
        let request = Request::builder()
            .method("POST")
            .uri(HOOK_PATH)
            .header("user-agent", HOOKSHOT_UA)
            .header(SIGNATURE_HEADER, "not-a-signature")
            .body(Body::from("{}"))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "OK");
    }

    #[tokio::test]
    async fn empty_body_with_valid_signature_returns_ok() {
        let app = test_router("abc");
        let response = app
            .oneshot(signed_request("abc", HOOKSHOT_UA, b""))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn oversized_body_returns_body_read_failure() {
        let app = test_router_with_limit("abc", 16);
        let response = app
            .oneshot(signed_request(
                "abc",
                HOOKSHOT_UA,
                b"{\"zen\":\"Design for failure. Design for failure.\"}",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(body_text(response).await, "could not read request body");
    }

    #[tokio::test]
    async fn invalid_user_agent_wins_over_oversized_body() {
        let app = test_router_with_limit("abc", 16);
        let response = app
            .oneshot(signed_request(
                "abc",
                "curl/7.64",
                b"{\"zen\":\"Design for failure. Design for failure.\"}",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(body_text(response).await, "invalid user agent");
    }

    #[tokio::test]
    async fn other_paths_are_not_served() {
        let app = test_router("");
        let mut request = signed_request("", HOOKSHOT_UA, b"{}");
        *request.uri_mut() = "/elsewhere".parse().unwrap();

        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
