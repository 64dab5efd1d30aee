//! Client-wide error types.

use std::sync::Arc;

use reqwest::StatusCode;
use thiserror::Error;

use crate::credentials::StoreError;

/// Client-wide result type.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Outcome of a failed credential refresh.
///
/// One refresh outcome is delivered to every queued request, so this type is
/// cheap to clone.
#[derive(Debug, Clone, Error)]
pub enum RefreshError {
    /// No refresh token in the store.
    #[error("Missing refresh token - re-login required")]
    MissingRefreshToken,

    /// The refresh endpoint answered with a non-success status.
    #[error("Refresh rejected with status {status}: {body}")]
    Rejected { status: StatusCode, body: String },

    /// The refresh call never produced a response.
    #[error("Refresh request failed: {0}")]
    Transport(#[source] Arc<reqwest::Error>),

    /// The refresh endpoint answered 2xx with an unusable body.
    #[error("Invalid refresh response: {0}")]
    InvalidResponse(String),

    /// The refreshed pair could not be written to the credential store.
    #[error("Failed to persist refreshed credentials: {0}")]
    Store(String),

    /// The session was closed (logout) while the refresh was in flight.
    #[error("Session closed while a token refresh was in progress")]
    SessionClosed,

    /// The task driving the refresh was dropped before it finished.
    #[error("Token refresh was interrupted")]
    Interrupted,
}

impl RefreshError {
    /// Check if this error requires a fresh login.
    pub fn requires_relogin(&self) -> bool {
        matches!(
            self,
            Self::MissingRefreshToken | Self::Rejected { .. } | Self::InvalidResponse(_)
        )
    }
}

impl From<reqwest::Error> for RefreshError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(Arc::new(err))
    }
}

/// Errors returned by [`ApiClient`](crate::ApiClient) and everything built on it.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network, DNS, TLS or timeout failure from the HTTP transport.
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    /// 401 that could not be repaired by a refresh.
    #[error("Unauthorized: {body}")]
    Unauthorized { body: String },

    /// Any other non-success status.
    #[error("Request failed with status {status}: {body}")]
    Status { status: StatusCode, body: String },

    /// The credential refresh failed.
    #[error("Token refresh failed: {0}")]
    Refresh(#[from] RefreshError),

    /// Credential store failure.
    #[error("Credential store error: {0}")]
    Store(#[from] StoreError),

    /// JSON encode/decode failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Input rejected before any request was made.
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    /// An operation needs a signed-in user and there is none.
    #[error("Not authenticated")]
    NotAuthenticated,
}

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// HTTP status carried by this error, if any.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Unauthorized { .. } => Some(StatusCode::UNAUTHORIZED),
            Self::Status { status, .. } => Some(*status),
            Self::Transport(e) => e.status(),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }

    /// Check if the session is gone and the user has to log in again.
    pub fn requires_relogin(&self) -> bool {
        match self {
            Self::Unauthorized { .. } | Self::NotAuthenticated => true,
            Self::Refresh(e) => e.requires_relogin(),
            _ => false,
        }
    }
}
