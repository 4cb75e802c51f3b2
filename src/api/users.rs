//! User account API endpoints.
//!
//! - POST `/register` - Create an account from email + password
//! - POST `/login` - Exchange credentials for an access/refresh token pair
//! - GET `/profile` - Return the authenticated user's record

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;

use super::error::{ApiError, ResultExt};
use crate::auth::ApiAuth;
use crate::db::Database;
use crate::impl_has_auth_state;
use crate::jwt::JwtConfig;
use crate::password;
use crate::rate_limit::{RateLimitConfig, rate_limit_login, rate_limit_register};

const MAX_EMAIL_LENGTH: usize = 254;
const MAX_PASSWORD_LENGTH: usize = 128;

#[derive(Clone)]
pub struct UsersState {
    pub db: Database,
    pub jwt: Arc<JwtConfig>,
    pub rate_limits: Arc<RateLimitConfig>,
}

impl_has_auth_state!(UsersState);

pub fn router(state: UsersState) -> Router {
    let register_router = Router::new()
        .route("/register", post(register))
        .with_state(state.clone())
        .layer(middleware::from_fn_with_state(
            state.rate_limits.clone(),
            rate_limit_register,
        ));

    let login_router = Router::new()
        .route("/login", post(login))
        .with_state(state.clone())
        .layer(middleware::from_fn_with_state(
            state.rate_limits.clone(),
            rate_limit_login,
        ));

    let profile_router = Router::new()
        .route("/profile", get(profile))
        .with_state(state);

    Router::new()
        .merge(register_router)
        .merge(login_router)
        .merge(profile_router)
}

/// Request body shared by register and login. Fields are optional so
/// that a missing field becomes a 400 instead of a deserialization
/// rejection, and is reported before any credential or token logic runs.
#[derive(Deserialize)]
struct CredentialsRequest {
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    password: Option<String>,
}

impl CredentialsRequest {
    /// Validate presence and basic shape, returning `(email, password)`.
    fn into_fields(self) -> Result<(String, String), ApiError> {
        let email = self.email.unwrap_or_default().trim().to_string();
        let password = self.password.unwrap_or_default();

        if email.is_empty() || password.is_empty() {
            return Err(ApiError::bad_request("Email and password are required"));
        }

        if email.len() > MAX_EMAIL_LENGTH {
            return Err(ApiError::bad_request("Email is too long"));
        }

        // Light sanity check only; delivery is what proves an address
        let valid_shape = email
            .find('@')
            .is_some_and(|at| at > 0 && at < email.len() - 1);
        if !valid_shape {
            return Err(ApiError::bad_request("Invalid email address"));
        }

        if password.len() > MAX_PASSWORD_LENGTH {
            return Err(ApiError::bad_request("Password is too long"));
        }

        Ok((email, password))
    }
}

#[derive(Serialize)]
struct RegisterResponse {
    id: String,
    email: String,
    #[serde(rename = "createdAt")]
    created_at: String,
    message: &'static str,
}

async fn register(
    State(state): State<UsersState>,
    Json(payload): Json<CredentialsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (email, password) = payload.into_fields()?;

    let existing = state
        .db
        .users()
        .get_by_email(&email)
        .await
        .db_err("Failed to check email availability")?;

    if existing.is_some() {
        return Err(ApiError::conflict("Email already registered"));
    }

    let password_hash = password::hash_password(&password).map_err(|e| {
        error!("Failed to hash password: {}", e);
        ApiError::internal("Failed to register user")
    })?;

    let uuid = uuid::Uuid::new_v4().to_string();
    state
        .db
        .users()
        .create(&uuid, &email, &password_hash)
        .await
        .db_err("Failed to create user")?;

    let user = state
        .db
        .users()
        .get_by_uuid(&uuid)
        .await
        .db_err("Failed to load created user")?
        .ok_or_else(|| ApiError::internal("Failed to register user"))?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            id: user.uuid,
            email: user.email,
            created_at: user.created_at,
            message: "User registered successfully",
        }),
    ))
}

#[derive(Serialize)]
struct LoginResponse {
    id: String,
    email: String,
    #[serde(rename = "createdAt")]
    created_at: String,
    message: &'static str,
    access_token: String,
    refresh_token: String,
    expires_in: u64,
}

async fn login(
    State(state): State<UsersState>,
    Json(payload): Json<CredentialsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (email, password) = payload.into_fields()?;

    // Unknown email and wrong password collapse to one message so the
    // endpoint cannot be used to enumerate accounts.
    let user = state
        .db
        .users()
        .get_by_email(&email)
        .await
        .db_err("Failed to look up user")?
        .ok_or_else(|| ApiError::unauthorized("Invalid email or password"))?;

    if !password::verify_password(&user.password_hash, &password) {
        return Err(ApiError::unauthorized("Invalid email or password"));
    }

    let pair = state
        .jwt
        .issue_token_pair(&user.uuid, &user.email)
        .map_err(|e| {
            error!("Failed to issue token pair: {}", e);
            ApiError::internal("Failed to generate tokens")
        })?;

    Ok((
        StatusCode::OK,
        Json(LoginResponse {
            id: user.uuid,
            email: user.email,
            created_at: user.created_at,
            message: "Login successful",
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            expires_in: pair.expires_in,
        }),
    ))
}

#[derive(Serialize)]
struct ProfileResponse {
    id: String,
    email: String,
    #[serde(rename = "createdAt")]
    created_at: String,
}

async fn profile(
    State(state): State<UsersState>,
    ApiAuth(claims): ApiAuth,
) -> Result<impl IntoResponse, ApiError> {
    // Token verification does not consult the user record; the lookup
    // here is the endpoint's own, so a deleted account yields 404 while
    // the token itself still verifies.
    let user = state
        .db
        .users()
        .get_by_uuid(&claims.sub)
        .await
        .db_err("Failed to load user")?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok((
        StatusCode::OK,
        Json(ProfileResponse {
            id: user.uuid,
            email: user.email,
            created_at: user.created_at,
        }),
    ))
}
