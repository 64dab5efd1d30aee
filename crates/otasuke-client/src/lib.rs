//! HTTP client for the おたすけくん contractor matching API.
//!
//! ## Core Types
//!
//! - [`ApiClient`] - Request pipeline that attaches the bearer credential and
//!   repairs expired sessions with a single shared refresh
//! - [`RefreshCoordinator`] - Single-flight refresh state with a FIFO queue of
//!   parked requests
//! - [`TokenStore`] - Typed access to a [`CredentialStore`] backend
//! - [`Navigator`] - Receives the login redirect when a session cannot be repaired
//!
//! ## Session
//!
//! - [`AuthSession`] - Login, registration, logout and session restore
//! - [`guard::evaluate`] - Page access decisions by role and company state
//!
//! ## Resources
//!
//! Typed wrappers for every Backend endpoint hang off [`ApiClient`], for
//! example `client.projects()` or `client.direct_orders()`. See [`api`].
//!
//! ## License
//!
//! This project is licensed under the MIT or Apache-2.0 license. You can
//! choose between one of them if you use this work.
//!
//! `SPDX-License-Identifier: MIT OR Apache-2.0`

pub mod api;
pub mod client;
pub mod config;
pub mod credentials;
pub mod error;
pub mod guard;
pub mod models;
pub mod navigation;
pub mod refresh;
pub mod session;
pub mod validation;

pub use client::{ApiClient, ApiClientBuilder, ApiRequest, REFRESH_PATH};
pub use config::ClientConfig;
pub use credentials::{
    CredentialStore, FileCredentialStore, MemoryCredentialStore, StoreError, TokenKey, TokenPair,
    TokenStore,
};
pub use error::{ApiError, RefreshError, Result};
pub use guard::{GuardContext, GuardDecision};
pub use navigation::{LoggingNavigator, Navigator};
pub use refresh::RefreshCoordinator;
pub use session::AuthSession;
pub use validation::{RegisterForm, Validate};
