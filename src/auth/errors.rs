//! Authentication error types.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::jwt::JwtError;

/// Why a request failed authentication.
///
/// Every kind maps to a 401; the distinction exists for call sites and
/// logs, not for the HTTP caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthErrorKind {
    /// No bearer credential in the request
    MissingCredential,
    /// Signature mismatch or malformed payload
    InvalidToken,
    /// Structurally valid token past its expiry
    ExpiredToken,
}

/// Rejection type for the auth extractor. Always a 401 JSON body.
#[derive(Debug)]
pub struct ApiAuthError {
    pub kind: AuthErrorKind,
}

impl ApiAuthError {
    pub fn new(kind: AuthErrorKind) -> Self {
        Self { kind }
    }

    fn message(&self) -> &'static str {
        // Expired and tampered tokens get the same message; callers
        // must not be able to tell them apart.
        match self.kind {
            AuthErrorKind::MissingCredential => "Not authenticated",
            AuthErrorKind::InvalidToken | AuthErrorKind::ExpiredToken => {
                "Invalid or expired token"
            }
        }
    }
}

impl From<JwtError> for ApiAuthError {
    fn from(e: JwtError) -> Self {
        match e {
            JwtError::Expired => Self::new(AuthErrorKind::ExpiredToken),
            _ => Self::new(AuthErrorKind::InvalidToken),
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: &'static str,
}

impl IntoResponse for ApiAuthError {
    fn into_response(self) -> Response {
        (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse {
                error: self.message(),
            }),
        )
            .into_response()
    }
}
