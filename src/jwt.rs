//! JWT token issuance and verification.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Identity claims embedded in every token.
///
/// Access and refresh tokens share this payload shape; they differ only
/// in `exp`. All fields are required - a token missing any of them
/// fails verification instead of yielding partial claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user UUID), immutable once issued
    pub sub: String,
    /// Email at issuance time (not re-checked against the user record)
    pub email: String,
    /// Issued at (Unix timestamp)
    pub iat: u64,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
}

/// Default access token lifetime: 15 minutes.
pub const DEFAULT_ACCESS_TTL: Duration = Duration::from_secs(15 * 60);

/// Default refresh token lifetime: 7 days.
pub const DEFAULT_REFRESH_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Signing configuration plus the two configured token lifetimes.
#[derive(Clone)]
pub struct JwtConfig {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

/// An access/refresh pair minted from a single claim set.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds, echoed to clients
    pub expires_in: u64,
}

/// A single freshly issued access token.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub access_token: String,
    pub expires_in: u64,
}

impl JwtConfig {
    /// Create a new JWT configuration with the given secret and lifetimes.
    pub fn new(secret: &[u8], access_ttl: Duration, refresh_ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            access_ttl,
            refresh_ttl,
        }
    }

    /// Create a configuration with the default 15m/7d lifetimes.
    pub fn with_default_ttls(secret: &[u8]) -> Self {
        Self::new(secret, DEFAULT_ACCESS_TTL, DEFAULT_REFRESH_TTL)
    }

    /// Access token lifetime in seconds.
    pub fn access_ttl_secs(&self) -> u64 {
        self.access_ttl.as_secs()
    }

    /// Issue an access/refresh token pair for a user.
    ///
    /// Both tokens carry the same `{sub, email, iat}` claim set and are
    /// signed independently; only the expiry differs. Issuance touches
    /// no shared state beyond the signing key and the clock.
    pub fn issue_token_pair(&self, sub: &str, email: &str) -> Result<TokenPair, JwtError> {
        let now = unix_now()?;

        let access_claims = Claims {
            sub: sub.to_string(),
            email: email.to_string(),
            iat: now,
            exp: now + self.access_ttl.as_secs(),
        };
        let refresh_claims = Claims {
            exp: now + self.refresh_ttl.as_secs(),
            ..access_claims.clone()
        };

        let access_token =
            jsonwebtoken::encode(&Header::default(), &access_claims, &self.encoding_key)
                .map_err(JwtError::Encoding)?;
        let refresh_token =
            jsonwebtoken::encode(&Header::default(), &refresh_claims, &self.encoding_key)
                .map_err(JwtError::Encoding)?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            expires_in: self.access_ttl.as_secs(),
        })
    }

    /// Exchange a valid refresh token for a new access token.
    ///
    /// `sub` and `email` are copied from the refresh token's claims, not
    /// re-fetched from storage. The refresh token itself is not rotated
    /// and remains valid until its own expiry.
    pub fn refresh_access_token(&self, refresh_token: &str) -> Result<IssuedToken, JwtError> {
        let claims = self.verify(refresh_token)?;

        let now = unix_now()?;
        let access_claims = Claims {
            sub: claims.sub,
            email: claims.email,
            iat: now,
            exp: now + self.access_ttl.as_secs(),
        };

        let access_token =
            jsonwebtoken::encode(&Header::default(), &access_claims, &self.encoding_key)
                .map_err(JwtError::Encoding)?;

        Ok(IssuedToken {
            access_token,
            expires_in: self.access_ttl.as_secs(),
        })
    }

    /// Validate a token's signature and expiry, returning its claims.
    ///
    /// A token is valid at time T iff the signature verifies against the
    /// configured secret and T < `exp`. No other state participates.
    pub fn verify(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let token_data = jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
                _ => JwtError::Invalid(e),
            })?;

        Ok(token_data.claims)
    }
}

fn unix_now() -> Result<u64, JwtError> {
    Ok(SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|_| JwtError::TimeError)?
        .as_secs())
}

/// Errors that can occur during JWT operations.
#[derive(Debug)]
pub enum JwtError {
    /// Error encoding the token
    Encoding(jsonwebtoken::errors::Error),
    /// Structurally valid token past its expiry
    Expired,
    /// Signature mismatch or malformed payload
    Invalid(jsonwebtoken::errors::Error),
    /// System time error
    TimeError,
}

impl std::fmt::Display for JwtError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JwtError::Encoding(e) => write!(f, "Failed to encode token: {}", e),
            JwtError::Expired => write!(f, "Token has expired"),
            JwtError::Invalid(e) => write!(f, "Invalid token: {}", e),
            JwtError::TimeError => write!(f, "System time error"),
        }
    }
}

impl std::error::Error for JwtError {}
