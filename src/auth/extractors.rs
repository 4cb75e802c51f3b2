//! Axum extractor for bearer-token authentication.

use axum::{extract::FromRequestParts, http::request::Parts};

use super::bearer::bearer_token;
use super::errors::{ApiAuthError, AuthErrorKind};
use super::state::HasAuthState;
use crate::jwt::Claims;

/// Extractor for endpoints that require a valid access token.
///
/// Verifies signature and expiry only. The claims are trusted as-is:
/// there is no lookup against the live user record, so freshness is
/// bounded by the access token TTL. Verification never yields partial
/// claims - any failure rejects the request with a 401.
pub struct ApiAuth(pub Claims);

impl<S> FromRequestParts<S> for ApiAuth
where
    S: HasAuthState + Send + Sync,
{
    type Rejection = ApiAuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)
            .ok_or_else(|| ApiAuthError::new(AuthErrorKind::MissingCredential))?;

        let claims = state.jwt().verify(token).map_err(ApiAuthError::from)?;

        Ok(ApiAuth(claims))
    }
}
