//! HTTP client with transparent token attachment and renewal.

use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::sync::Arc;
use tracing::debug;
use url::Url;

use super::errors::ClientError;
use super::session::SessionState;
use super::store::RefreshTokenStore;

/// A user record as returned by the login and profile endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct Profile {
    pub id: String,
    pub email: String,
    #[serde(rename = "createdAt")]
    pub created_at: String,
}

#[derive(Deserialize)]
struct LoginBody {
    id: String,
    email: String,
    #[serde(rename = "createdAt")]
    created_at: String,
    access_token: String,
    refresh_token: String,
}

#[derive(Deserialize)]
struct RefreshBody {
    access_token: String,
}

/// Client for the accounts API.
///
/// Owns the session state and applies the renewal protocol to every
/// authorized request: attach the in-memory access token as a bearer
/// credential; on a 401, perform at most one refresh-and-retry; any
/// further failure is surfaced to the caller with the session cleared
/// where the protocol demands it.
pub struct SessionClient {
    http: reqwest::Client,
    base_url: Url,
    session: SessionState,
}

impl SessionClient {
    /// Create a client for the given base URL with an injected
    /// refresh-token store.
    pub fn new(
        base_url: &str,
        store: Arc<dyn RefreshTokenStore>,
    ) -> Result<Self, ClientError> {
        let mut base = Url::parse(base_url).map_err(ClientError::InvalidBaseUrl)?;
        // Guarantee a trailing slash so Url::join keeps the full path
        if !base.path().ends_with('/') {
            base.set_path(&format!("{}/", base.path()));
        }

        Ok(Self {
            http: reqwest::Client::new(),
            base_url: base,
            session: SessionState::new(store),
        })
    }

    /// The session owned by this client.
    pub fn session(&self) -> &SessionState {
        &self.session
    }

    fn endpoint(&self, path: &str) -> Url {
        self.base_url
            .join(path.trim_start_matches('/'))
            .expect("endpoint path must be a valid URL segment")
    }

    /// Register a new account. Does not log in.
    pub async fn register(&self, email: &str, password: &str) -> Result<Profile, ClientError> {
        let response = self
            .http
            .post(self.endpoint("register"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(ClientError::Transport)?;

        if response.status() != StatusCode::CREATED {
            return Err(api_error(response).await);
        }

        response.json().await.map_err(ClientError::Transport)
    }

    /// Exchange credentials for a token pair. Both tokens are cached
    /// (access in memory, refresh in the durable store) before control
    /// returns to the caller.
    pub async fn login(&self, email: &str, password: &str) -> Result<Profile, ClientError> {
        let response = self
            .http
            .post(self.endpoint("login"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(ClientError::Transport)?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let body: LoginBody = response.json().await.map_err(ClientError::Transport)?;

        self.session
            .establish(&body.access_token, &body.refresh_token)
            .map_err(ClientError::Storage)?;

        Ok(Profile {
            id: body.id,
            email: body.email,
            created_at: body.created_at,
        })
    }

    /// Drop both tokens. Purely local - stateless tokens leave nothing
    /// to revoke server-side.
    pub fn logout(&self) {
        self.session.clear();
    }

    /// Fetch the authenticated user's profile.
    pub async fn profile(&self) -> Result<Profile, ClientError> {
        self.get_json("profile").await
    }

    /// Authorized GET returning a decoded JSON body.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let response = self.send_authorized(Method::GET, path, None).await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(ClientError::Unauthorized);
        }
        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        response.json().await.map_err(ClientError::Transport)
    }

    /// Authorized POST with a JSON body, returning a decoded JSON body.
    pub async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<T, ClientError> {
        let response = self.send_authorized(Method::POST, path, Some(body)).await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(ClientError::Unauthorized);
        }
        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        response.json().await.map_err(ClientError::Transport)
    }

    /// Send a request with the current access token attached, retrying
    /// exactly once after a successful silent refresh.
    ///
    /// The retry rebuilds the request and re-reads the session, so it
    /// always carries the freshly issued token, never the one that was
    /// just rejected.
    async fn send_authorized(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<reqwest::Response, ClientError> {
        let url = self.endpoint(path);
        let mut retried = false;

        loop {
            let mut request = self.http.request(method.clone(), url.clone());
            if let Some(token) = self.session.access_token() {
                request = request.bearer_auth(token);
            }
            if let Some(ref json_body) = body {
                request = request.json(json_body);
            }

            let response = request.send().await.map_err(ClientError::Transport)?;

            if response.status() != StatusCode::UNAUTHORIZED || retried {
                return Ok(response);
            }

            debug!(path = %path, "Request rejected with 401, attempting token refresh");
            self.refresh_access_token().await?;
            retried = true;
        }
    }

    /// Exchange the stored refresh token for a new access token.
    ///
    /// No refresh token stored: the session is cleared and the original
    /// 401 is surfaced as `Unauthorized` without any network call.
    /// Refresh rejected or unreachable: the session is cleared and the
    /// refresh failure masks the original 401 as `SessionExpired`.
    async fn refresh_access_token(&self) -> Result<(), ClientError> {
        let Some(refresh_token) = self.session.refresh_token() else {
            self.session.clear();
            return Err(ClientError::Unauthorized);
        };

        let result = self
            .http
            .post(self.endpoint("refresh"))
            .json(&json!({ "refresh_token": refresh_token }))
            .send()
            .await;

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                self.session.clear();
                return Err(ClientError::SessionExpired(format!(
                    "refresh request failed: {}",
                    e
                )));
            }
        };

        if !response.status().is_success() {
            let status = response.status();
            self.session.clear();
            return Err(ClientError::SessionExpired(format!(
                "refresh rejected with status {}",
                status
            )));
        }

        let body: RefreshBody = match response.json().await {
            Ok(body) => body,
            Err(e) => {
                self.session.clear();
                return Err(ClientError::SessionExpired(format!(
                    "refresh response unreadable: {}",
                    e
                )));
            }
        };

        self.session.set_access_token(Some(body.access_token));
        debug!("Access token refreshed");
        Ok(())
    }
}

/// Turn a non-success response into a `ClientError::Api`, pulling the
/// message from the server's `{"error": ...}` body when present.
async fn api_error(response: reqwest::Response) -> ClientError {
    let status = response.status().as_u16();
    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<serde_json::Value>(&text)
        .ok()
        .and_then(|v| v.get("error").and_then(|m| m.as_str()).map(String::from))
        .unwrap_or(text);

    ClientError::Api { status, message }
}
