//! Durable storage for the refresh token.

use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

/// Where the refresh token lives between processes.
///
/// The access token is never stored here - it stays in process memory
/// and is re-obtained through the refresh flow after a restart.
pub trait RefreshTokenStore: Send + Sync {
    /// Read the stored refresh token, if any. Read failures count as absent.
    fn load(&self) -> Option<String>;
    /// Persist the refresh token.
    fn save(&self, token: &str) -> io::Result<()>;
    /// Remove the stored refresh token. Removing an absent token is not an error.
    fn clear(&self) -> io::Result<()>;
}

/// File-backed store; the refresh token survives process restarts.
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RefreshTokenStore for FileTokenStore {
    fn load(&self) -> Option<String> {
        let contents = std::fs::read_to_string(&self.path).ok()?;
        let token = contents.trim();
        if token.is_empty() {
            None
        } else {
            Some(token.to_string())
        }
    }

    fn save(&self, token: &str) -> io::Result<()> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(&self.path, token)
    }

    fn clear(&self) -> io::Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

/// In-memory store for tests and throwaway sessions.
#[derive(Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RefreshTokenStore for MemoryTokenStore {
    fn load(&self) -> Option<String> {
        self.token.lock().unwrap().clone()
    }

    fn save(&self, token: &str) -> io::Result<()> {
        *self.token.lock().unwrap() = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> io::Result<()> {
        *self.token.lock().unwrap() = None;
        Ok(())
    }
}
