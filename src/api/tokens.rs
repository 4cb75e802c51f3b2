//! Token refresh API endpoint.
//!
//! - POST `/refresh` - Exchange a refresh token for a new access token

use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::post};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;

use super::error::ApiError;
use crate::jwt::{JwtConfig, JwtError};

#[derive(Clone)]
pub struct TokensState {
    pub jwt: Arc<JwtConfig>,
}

pub fn router(state: TokensState) -> Router {
    Router::new()
        .route("/refresh", post(refresh))
        .with_state(state)
}

#[derive(Deserialize)]
struct RefreshRequest {
    #[serde(default)]
    refresh_token: Option<String>,
}

#[derive(Serialize)]
struct RefreshResponse {
    access_token: String,
    expires_in: u64,
}

/// Exchange a valid refresh token for a new access token.
///
/// Purely stateless: the new access token copies `sub` and `email` from
/// the refresh token's claims. The refresh token is not rotated, so the
/// same token can be exchanged again until its own expiry.
async fn refresh(
    State(state): State<TokensState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let refresh_token = payload.refresh_token.unwrap_or_default();
    if refresh_token.is_empty() {
        return Err(ApiError::bad_request("Refresh token is required"));
    }

    let issued = state
        .jwt
        .refresh_access_token(&refresh_token)
        .map_err(|e| match e {
            JwtError::Expired | JwtError::Invalid(_) => {
                ApiError::unauthorized("Invalid or expired refresh token")
            }
            other => {
                error!("Failed to refresh access token: {}", other);
                ApiError::internal("Failed to generate token")
            }
        })?;

    Ok((
        StatusCode::OK,
        Json(RefreshResponse {
            access_token: issued.access_token,
            expires_in: issued.expires_in,
        }),
    ))
}
