//! Bearer-token authentication for protected endpoints.
//!
//! Access tokens arrive as `Authorization: Bearer <token>` and are
//! checked statelessly: signature and expiry only, no user-record
//! lookup. Silent renewal lives on the client side (see `crate::client`);
//! the server's answer to a stale token is always a plain 401.

mod bearer;
mod errors;
mod extractors;
mod state;

pub use bearer::bearer_token;
pub use errors::{ApiAuthError, AuthErrorKind};
pub use extractors::ApiAuth;
pub use state::HasAuthState;
