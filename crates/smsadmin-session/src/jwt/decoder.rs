//! Unverified JWT payload decoding.
//!
//! The console never holds the gateway's signing secret, so it cannot (and
//! must not pretend to) verify signatures. It splits the token, base64url-
//! decodes the payload segment, and parses the claims. Any failure along
//! that path yields an error value — a malformed token is a permanent
//! failure that degrades to "unauthenticated", never a panic and never a
//! retry.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use tracing::warn;

use smsadmin_core::error::AppError;

use super::claims::SessionClaims;

/// Decode the claims payload of a gateway bearer token.
///
/// Fails with an [`ErrorKind::Authentication`](smsadmin_core::error::ErrorKind)
/// error if the token does not have exactly three dot-delimited segments,
/// if the payload segment is not valid base64url, or if the decoded bytes
/// are not a valid claims JSON object.
pub fn decode_claims(token: &str) -> Result<SessionClaims, AppError> {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 {
        return Err(AppError::authentication(format!(
            "Malformed token: expected 3 segments, got {}",
            segments.len()
        )));
    }

    // Tokens in the wild arrive both padded and unpadded.
    let payload = segments[1].trim_end_matches('=');
    let bytes = URL_SAFE_NO_PAD.decode(payload).map_err(|e| {
        AppError::with_source(
            smsadmin_core::error::ErrorKind::Authentication,
            "Malformed token: payload is not base64url",
            e,
        )
    })?;

    serde_json::from_slice(&bytes).map_err(|e| {
        AppError::with_source(
            smsadmin_core::error::ErrorKind::Authentication,
            "Malformed token: payload is not a claims object",
            e,
        )
    })
}

/// Decode-or-`None`, logging the failure.
///
/// Callers must treat `None` as "not authenticated", never as a crash.
pub fn try_decode(token: &str) -> Option<SessionClaims> {
    match decode_claims(token) {
        Ok(claims) => Some(claims),
        Err(e) => {
            warn!(error = %e, "Failed to decode bearer token");
            None
        }
    }
}

/// Whether the token is expired, failing closed: an undecodable token is
/// treated as expired.
pub fn is_token_expired(token: &str) -> bool {
    match try_decode(token) {
        Some(claims) => claims.is_expired(),
        None => true,
    }
}
