//! Programmatic client for the accounts API.
//!
//! `SessionClient` owns a [`SessionState`] (volatile access token plus a
//! durable refresh-token store) and performs the silent-renewal
//! protocol: every request carries the access token as a bearer
//! credential, and a 401 triggers at most one refresh-and-retry before
//! the failure is surfaced.

mod errors;
mod http;
mod session;
mod store;

pub use errors::ClientError;
pub use http::{Profile, SessionClient};
pub use session::SessionState;
pub use store::{FileTokenStore, MemoryTokenStore, RefreshTokenStore};
