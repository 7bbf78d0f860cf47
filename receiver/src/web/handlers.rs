//! Webhook endpoint handler.
//!
//! The handler only:
//! 1. Binds the headers it needs
//! 2. Checks the delivery comes from GitHub's hook sender
//! 3. Verifies the signature over the raw body
//! 4. Logs the accepted payload and answers `200 OK`
//!
//! Every failure is answered with `403 Forbidden` and a short diagnostic.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::error::ErrorKind;
use crate::util::{is_github_hookshot, pretty_payload};
use crate::web::signature::{verify_signature, SignatureError, Verified, SIGNATURE_HEADER};

/// Header identifying the sender.
const HEADER_USER_AGENT: &str = "user-agent";
/// Header name for GitHub event type.
const HEADER_EVENT: &str = "x-github-event";
/// Header name for GitHub delivery ID.
const HEADER_DELIVERY: &str = "x-github-delivery";

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }
}

/// Reasons a delivery is rejected. Each maps to `403 Forbidden`.
#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("could not bind header: {0}")]
    HeaderBind(&'static str),

    #[error("invalid user agent")]
    InvalidUserAgent,

    #[error("could not read request body")]
    BodyRead { detail: String },

    #[error(transparent)]
    Signature(#[from] SignatureError),
}

impl WebhookError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            WebhookError::HeaderBind(_) => ErrorKind::HeaderBindFailure,
            WebhookError::InvalidUserAgent => ErrorKind::InvalidUserAgent,
            WebhookError::BodyRead { .. } => ErrorKind::BodyReadFailure,
            WebhookError::Signature(e) => e.kind(),
        }
    }
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        (StatusCode::FORBIDDEN, self.to_string()).into_response()
    }
}

/// A single delivery, as bound from the request. The body is kept exactly as
/// received.
#[derive(Debug)]
pub struct IncomingWebhookRequest {
    pub user_agent: String,
    pub signature_header: Option<String>,
    pub event: Option<String>,
    pub delivery: Option<String>,
    pub raw_body: Bytes,
}

impl IncomingWebhookRequest {
    /// Bind headers, check the user agent, then take the body.
    ///
    /// The user agent is checked before the body or signature are looked at.
    pub fn bind(
        headers: &HeaderMap,
        body: Result<Bytes, BytesRejection>,
    ) -> Result<Self, WebhookError> {
        let user_agent = header_str(headers, HEADER_USER_AGENT)?.unwrap_or_default();
        let signature_header = header_str(headers, SIGNATURE_HEADER)?;

        if !is_github_hookshot(&user_agent) {
            return Err(WebhookError::InvalidUserAgent);
        }

        let raw_body = body.map_err(|e| WebhookError::BodyRead {
            detail: e.body_text(),
        })?;

        Ok(Self {
            user_agent,
            signature_header,
            event: lenient_header(headers, HEADER_EVENT),
            delivery: lenient_header(headers, HEADER_DELIVERY),
            raw_body,
        })
    }
}

/// GitHub webhook endpoint.
///
/// # Response
///
/// - 200 `OK`: signature verified (or checking disabled); payload logged
/// - 403 with a diagnostic: anything else
pub async fn github_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<&'static str, WebhookError> {
    match receive(&state.config, &headers, body) {
        Ok((request, verified)) => {
            log_acceptance(&request, verified);
            Ok("OK")
        }
        Err(e) => {
            log_rejection(&headers, &e);
            Err(e)
        }
    }
}

/// Bind and verify a delivery. Returns the bound request and how it was
/// verified; logging is left to the caller.
pub fn receive(
    config: &ServerConfig,
    headers: &HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<(IncomingWebhookRequest, Verified), WebhookError> {
    let request = IncomingWebhookRequest::bind(headers, body)?;
    let verified = verify_signature(
        &config.secret,
        &request.raw_body,
        request.signature_header.as_deref(),
    )?;
    Ok((request, verified))
}

fn log_acceptance(request: &IncomingWebhookRequest, verified: Verified) {
    // Rendered from the already-verified bytes; nothing flows back.
    info!(
        user_agent = %request.user_agent,
        event = request.event.as_deref().unwrap_or(""),
        delivery = request.delivery.as_deref().unwrap_or(""),
        signed = verified == Verified::Signed,
        body_length = request.raw_body.len(),
        payload = %pretty_payload(&request.raw_body),
        "webhook_accepted"
    );
}

fn log_rejection(headers: &HeaderMap, error: &WebhookError) {
    let detail = match error {
        WebhookError::BodyRead { detail } => detail.as_str(),
        _ => "",
    };
    let user_agent = lenient_header(headers, HEADER_USER_AGENT).unwrap_or_default();
    let delivery = lenient_header(headers, HEADER_DELIVERY).unwrap_or_default();
    warn!(
        kind = %error.kind(),
        error = %error,
        detail,
        user_agent = %user_agent,
        delivery = %delivery,
        "webhook_rejected"
    );
}

/// Read a header as a string. Absent is `Ok(None)`; present but not visible
/// ASCII is a bind failure.
fn header_str(
    headers: &HeaderMap,
    name: &'static str,
) -> Result<Option<String>, WebhookError> {
    headers
        .get(name)
        .map(|v| {
            v.to_str()
                .map(str::to_owned)
                .map_err(|_| WebhookError::HeaderBind(name))
        })
        .transpose()
}

fn lenient_header(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
}
