//! Client-side session state.

use std::sync::{Arc, Mutex};

use super::store::RefreshTokenStore;

/// The client's view of its session.
///
/// The access token lives only in process memory and is gone after a
/// restart; the refresh token goes through the injected durable store.
/// The state is an explicit object owned by the application root and
/// handed to the HTTP layer - nothing here is process-global.
pub struct SessionState {
    access_token: Mutex<Option<String>>,
    store: Arc<dyn RefreshTokenStore>,
}

impl SessionState {
    pub fn new(store: Arc<dyn RefreshTokenStore>) -> Self {
        Self {
            access_token: Mutex::new(None),
            store,
        }
    }

    /// Current in-memory access token, if any.
    pub fn access_token(&self) -> Option<String> {
        self.access_token.lock().unwrap().clone()
    }

    /// Replace the in-memory access token.
    pub fn set_access_token(&self, token: Option<String>) {
        *self.access_token.lock().unwrap() = token;
    }

    /// Stored refresh token, if any.
    pub fn refresh_token(&self) -> Option<String> {
        self.store.load()
    }

    /// Record a fresh login: cache the access token and persist the
    /// refresh token.
    pub fn establish(&self, access_token: &str, refresh_token: &str) -> std::io::Result<()> {
        self.store.save(refresh_token)?;
        self.set_access_token(Some(access_token.to_string()));
        Ok(())
    }

    /// Drop both tokens. Used by logout and by terminal refresh
    /// failures; stateless tokens mean there is nothing to revoke
    /// server-side.
    pub fn clear(&self) {
        self.set_access_token(None);
        if let Err(e) = self.store.clear() {
            tracing::warn!("Failed to clear stored refresh token: {}", e);
        }
    }

    /// Whether the session holds any credential at all.
    pub fn is_authenticated(&self) -> bool {
        self.access_token().is_some() || self.refresh_token().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::store::MemoryTokenStore;

    #[test]
    fn test_establish_and_clear() {
        let state = SessionState::new(Arc::new(MemoryTokenStore::new()));
        assert!(!state.is_authenticated());

        state.establish("access-1", "refresh-1").unwrap();
        assert_eq!(state.access_token(), Some("access-1".to_string()));
        assert_eq!(state.refresh_token(), Some("refresh-1".to_string()));
        assert!(state.is_authenticated());

        state.clear();
        assert_eq!(state.access_token(), None);
        assert_eq!(state.refresh_token(), None);
        assert!(!state.is_authenticated());
    }

    #[test]
    fn test_refresh_token_outlives_access_token() {
        let store = Arc::new(MemoryTokenStore::new());
        let state = SessionState::new(store.clone());
        state.establish("access-1", "refresh-1").unwrap();

        // A new state over the same store models a process restart:
        // the access token is gone, the refresh token is not.
        let restarted = SessionState::new(store);
        assert_eq!(restarted.access_token(), None);
        assert_eq!(restarted.refresh_token(), Some("refresh-1".to_string()));
    }
}
