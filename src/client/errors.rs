//! Client error types.

/// Errors surfaced by `SessionClient`.
#[derive(Debug)]
pub enum ClientError {
    /// The configured base URL does not parse
    InvalidBaseUrl(url::ParseError),
    /// Network or protocol failure on the original request
    Transport(reqwest::Error),
    /// Persisting the refresh token failed
    Storage(std::io::Error),
    /// The request was rejected with a 401 and no silent recovery was
    /// possible (no refresh token stored, or the retry failed again)
    Unauthorized,
    /// The refresh attempt itself failed; the session has been cleared
    /// and the caller must authenticate again
    SessionExpired(String),
    /// Any other non-success response from the server
    Api { status: u16, message: String },
}

impl std::fmt::Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClientError::InvalidBaseUrl(e) => write!(f, "Invalid base URL: {}", e),
            ClientError::Transport(e) => write!(f, "Request failed: {}", e),
            ClientError::Storage(e) => write!(f, "Failed to persist session: {}", e),
            ClientError::Unauthorized => write!(f, "Not authenticated"),
            ClientError::SessionExpired(reason) => write!(f, "Session expired: {}", reason),
            ClientError::Api { status, message } => {
                write!(f, "Server returned {}: {}", status, message)
            }
        }
    }
}

impl std::error::Error for ClientError {}
