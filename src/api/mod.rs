mod error;
mod tokens;
mod users;

use axum::Router;
use std::sync::Arc;

use crate::db::Database;
use crate::jwt::JwtConfig;
use crate::rate_limit::RateLimitConfig;

pub use users::UsersState;

/// Create the API router.
pub fn create_api_router(db: Database, jwt: Arc<JwtConfig>) -> Router {
    let rate_limits = Arc::new(RateLimitConfig::new());

    let users_state = users::UsersState {
        db,
        jwt: jwt.clone(),
        rate_limits,
    };

    let tokens_state = tokens::TokensState { jwt };

    Router::new()
        .merge(users::router(users_state))
        .merge(tokens::router(tokens_state))
}
