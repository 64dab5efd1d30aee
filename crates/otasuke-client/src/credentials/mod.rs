//! Credential storage.
//!
//! - [`CredentialStore`]: key-value persistence for the two bearer tokens
//! - [`MemoryCredentialStore`] / [`FileCredentialStore`]: concrete stores
//! - [`TokenStore`]: the typed adapter the request pipeline uses

mod error;
mod file;
mod store;

pub use error::StoreError;
pub use file::{APP_DIR_NAME, CREDENTIALS_FILE_NAME, FileCredentialStore};
pub use store::{CredentialStore, MemoryCredentialStore, TokenKey, TokenPair, TokenStore};
