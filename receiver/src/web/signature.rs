//! GitHub webhook signature verification.
//!
//! GitHub signs webhook deliveries using HMAC-SHA256 keyed with the shared
//! secret configured on the hook. The digest is sent in the
//! `X-Hub-Signature-256` header as `sha256=<hex>`.
//! Reference: https://docs.github.com/en/webhooks/using-webhooks/validating-webhook-deliveries
//!
//! Everything in this module is a pure function of its inputs: no I/O and
//! no logging. The handler decides what to log.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

use crate::error::ErrorKind;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the HMAC-SHA256 signature.
pub const SIGNATURE_HEADER: &str = "x-hub-signature-256";

/// Scheme prefix of the signature header value.
pub const SIGNATURE_PREFIX: &str = "sha256=";

/// Outcome of a successful verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verified {
    /// The received digest matched the expected one.
    Signed,
    /// No secret is configured, so the signature was not checked.
    Unchecked,
}

/// Why a signature header could not be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MalformedSignature {
    /// Shorter than, or not starting with, `sha256=`.
    #[error("missing sha256= prefix")]
    MissingPrefix,

    /// The digest after the prefix is not valid hex.
    #[error("could not decode hex string")]
    InvalidHex,
}

/// Signature verification failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SignatureError {
    #[error("missing signature header")]
    MissingHeader,

    #[error("malformed signature header: {0}")]
    Malformed(#[from] MalformedSignature),

    #[error("invalid signature")]
    Mismatch,
}

impl SignatureError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SignatureError::MissingHeader | SignatureError::Malformed(_) => {
                ErrorKind::MalformedSignatureHeader
            }
            SignatureError::Mismatch => ErrorKind::SignatureMismatch,
        }
    }
}

/// Parse a signature header value (e.g. `sha256=abc123...`) into raw digest bytes.
///
/// Never panics: short or prefixless headers and bad hex are reported as
/// [`MalformedSignature`].
///
/// # Examples
///
/// ```
/// use hookshot::web::signature::{parse_signature_header, MalformedSignature};
///
/// assert_eq!(parse_signature_header("sha256=1234abcd"), Ok(vec![0x12, 0x34, 0xab, 0xcd]));
/// assert_eq!(parse_signature_header("sha1=1234abcd"), Err(MalformedSignature::MissingPrefix));
/// assert_eq!(parse_signature_header("sha256=xyz"), Err(MalformedSignature::InvalidHex));
/// ```
pub fn parse_signature_header(header: &str) -> Result<Vec<u8>, MalformedSignature> {
    let hex_sig = header
        .strip_prefix(SIGNATURE_PREFIX)
        .ok_or(MalformedSignature::MissingPrefix)?;

    hex::decode(hex_sig).map_err(|_| MalformedSignature::InvalidHex)
}

/// Compute the HMAC-SHA256 digest of `payload` keyed with `secret`.
pub fn compute_signature(payload: &[u8], secret: &[u8]) -> Vec<u8> {
    new_mac(secret).chain_update(payload).finalize().into_bytes().to_vec()
}

/// Format raw digest bytes as a header value: `sha256=<lowercase hex>`.
pub fn format_signature_header(signature: &[u8]) -> String {
    format!("{}{}", SIGNATURE_PREFIX, hex::encode(signature))
}

/// Verify a webhook delivery against the shared secret.
///
/// # Arguments
///
/// * `secret` - The configured shared secret. Empty disables checking.
/// * `body` - The raw request body, exactly as received
/// * `signature_header` - The `X-Hub-Signature-256` value, if the header was sent
///
/// # Returns
///
/// `Ok(Verified::Unchecked)` when `secret` is empty, whatever the header
/// holds. Otherwise `Ok(Verified::Signed)` if the digest matches, or the
/// reason for rejecting. The digest comparison is constant-time; a wrong
/// length and a wrong byte both come back as [`SignatureError::Mismatch`].
pub fn verify_signature(
    secret: &str,
    body: &[u8],
    signature_header: Option<&str>,
) -> Result<Verified, SignatureError> {
    if secret.is_empty() {
        return Ok(Verified::Unchecked);
    }

    let header = signature_header.ok_or(SignatureError::MissingHeader)?;
    let received = parse_signature_header(header)?;

    new_mac(secret.as_bytes())
        .chain_update(body)
        .verify_slice(&received)
        .map(|()| Verified::Signed)
        .map_err(|_| SignatureError::Mismatch)
}

fn new_mac(secret: &[u8]) -> HmacSha256 {
    HmacSha256::new_from_slice(secret).expect("HMAC can take key of any size")
}
