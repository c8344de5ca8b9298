//! # Authentication Session
//!
//! Bearer-token session shared by every request of a client.
//!
//! ## Authentication Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Session Lifecycle                               │
//! │                                                                         │
//! │  ┌────────────────┐                      ┌─────────────────┐            │
//! │  │   dashboard    │                      │    Backend      │            │
//! │  └───────┬────────┘                      └────────┬────────┘            │
//! │          │  1. POST auth/login {email, password}  │                     │
//! │          │───────────────────────────────────────►│                     │
//! │          │  2. { token | access_token, user? }    │                     │
//! │          │◄───────────────────────────────────────│                     │
//! │          │                                        │                     │
//! │          │  3. Authorization: Bearer <token>      │                     │
//! │          │───────────────────────────────────────►│  (every request)    │
//! │          │                                        │                     │
//! │          │  4. POST auth/logout (best effort)     │                     │
//! │          │───────────────────────────────────────►│                     │
//! │          │     token dropped locally either way   │                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! There is no refresh: a 401 surfaces as [`ApiError::Unauthorized`] and the
//! user logs in again.
//!
//! [`ApiError::Unauthorized`]: crate::error::ApiError::Unauthorized

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{ApiError, ApiResult};

/// Login form.
#[derive(Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Credentials {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

/// The user returned by the login endpoint, when the backend sends one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    #[serde(default, deserialize_with = "stockflow_core::types::de_id")]
    pub id: String,

    #[serde(default)]
    pub email: String,

    #[serde(default)]
    pub name: String,
}

/// Body of a successful login.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct LoginResponse {
    #[serde(alias = "access_token", alias = "accessToken")]
    pub token: String,

    #[serde(default)]
    pub user: Option<SessionUser>,
}

impl LoginResponse {
    /// Reads a login body, bare or wrapped in `{ "data": ... }`.
    pub fn parse(body: &str) -> ApiResult<Self> {
        let parsed: crate::http::Envelope<LoginResponse> = serde_json::from_str(body)
            .map_err(|e| ApiError::InvalidResponse(format!("login response without token: {}", e)))?;
        let response = parsed.into_inner();

        if response.token.trim().is_empty() {
            return Err(ApiError::InvalidResponse("login returned an empty token".into()));
        }
        Ok(response)
    }
}

/// An authenticated session.
#[derive(Clone)]
pub struct Session {
    pub token: String,
    pub user: Option<SessionUser>,
    pub logged_in_at: DateTime<Utc>,
}

impl Session {
    pub fn new(token: impl Into<String>, user: Option<SessionUser>) -> Self {
        Session {
            token: token.into(),
            user,
            logged_in_at: Utc::now(),
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("user", &self.user)
            .field("logged_in_at", &self.logged_in_at)
            .finish_non_exhaustive()
    }
}

/// Shared slot holding the current session.
///
/// Clones share the same slot, so a logout seen by one clone is seen by
/// every request made through the others.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<Option<Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set(&self, session: Session) {
        *self.inner.write().await = Some(session);
    }

    /// Drops the session, returning it.
    pub async fn clear(&self) -> Option<Session> {
        self.inner.write().await.take()
    }

    pub async fn token(&self) -> Option<String> {
        self.inner.read().await.as_ref().map(|s| s.token.clone())
    }

    pub async fn current(&self) -> Option<Session> {
        self.inner.read().await.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.inner.read().await.is_some()
    }

    /// `Authorization` header value for the current session.
    pub async fn bearer(&self) -> Option<String> {
        self.token().await.map(|t| format!("Bearer {}", t))
    }
}
