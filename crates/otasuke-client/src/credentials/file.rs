//! File-backed credential store.
//!
//! Credentials are kept in a small JSON document so a session survives
//! process restarts. The document is cached in memory and written through on
//! every change.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tempfile::NamedTempFile;
use tracing::debug;

use super::error::StoreError;
use super::store::{CredentialStore, TokenKey};

/// Default file name inside the application config directory.
pub const CREDENTIALS_FILE_NAME: &str = "credentials.json";

/// Application directory name under the platform config directory.
pub const APP_DIR_NAME: &str = "otasuke";

type Document = BTreeMap<TokenKey, String>;

/// Persistent credential store backed by a JSON file.
#[derive(Debug)]
pub struct FileCredentialStore {
    path: PathBuf,
    cache: Mutex<Document>,
}

impl FileCredentialStore {
    /// Open (or lazily create) a credential file at `path`.
    ///
    /// A missing file is treated as an empty store. A corrupt file is an error.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let cache = match std::fs::read(&path) {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Document::new(),
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "Credential file not found, starting empty");
                Document::new()
            }
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            path,
            cache: Mutex::new(cache),
        })
    }

    /// Open the store at the platform default location.
    pub fn open_default() -> Result<Self, StoreError> {
        Self::open(Self::default_path()?)
    }

    /// `<config dir>/otasuke/credentials.json`
    pub fn default_path() -> Result<PathBuf, StoreError> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR_NAME).join(CREDENTIALS_FILE_NAME))
            .ok_or(StoreError::NoDirectory)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, document: &Document) -> Result<(), StoreError> {
        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(parent)?;

        if document.is_empty() {
            return match std::fs::remove_file(&self.path) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(e.into()),
            };
        }

        // The sibling temp file is created owner-only (0600 on Unix), and the
        // rename means readers never see a half-written document.
        let mut tmp = NamedTempFile::new_in(parent)?;
        tmp.write_all(&serde_json::to_vec_pretty(document)?)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        debug!(path = %self.path.display(), "Credentials written");
        Ok(())
    }
}

impl CredentialStore for FileCredentialStore {
    fn get(&self, key: TokenKey) -> Result<Option<String>, StoreError> {
        Ok(self.cache.lock().get(&key).cloned())
    }

    fn set(&self, key: TokenKey, value: &str) -> Result<(), StoreError> {
        let mut cache = self.cache.lock();
        cache.insert(key, value.to_string());
        self.persist(&cache)
    }

    fn remove(&self, key: TokenKey) -> Result<(), StoreError> {
        let mut cache = self.cache.lock();
        if cache.remove(&key).is_none() {
            return Ok(());
        }
        self.persist(&cache)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::{TokenPair, TokenStore};
    use std::sync::Arc;

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::open(dir.path().join("creds.json")).unwrap();
        assert_eq!(store.get(TokenKey::AccessToken).unwrap(), None);
    }

    #[test]
    fn test_tokens_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("creds.json");

        let tokens = TokenStore::new(Arc::new(FileCredentialStore::open(&path).unwrap()));
        tokens.set_tokens(&TokenPair::new("a1", "r1")).unwrap();

        let reopened = FileCredentialStore::open(&path).unwrap();
        assert_eq!(
            reopened.get(TokenKey::AccessToken).unwrap().as_deref(),
            Some("a1")
        );
        assert_eq!(
            reopened.get(TokenKey::RefreshToken).unwrap().as_deref(),
            Some("r1")
        );
    }

    #[test]
    fn test_clear_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("creds.json");

        let tokens = TokenStore::new(Arc::new(FileCredentialStore::open(&path).unwrap()));
        tokens.set_tokens(&TokenPair::new("a1", "r1")).unwrap();
        assert!(path.exists());

        tokens.clear().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_corrupt_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("creds.json");
        std::fs::write(&path, b"{ not json").unwrap();

        let err = FileCredentialStore::open(&path).unwrap_err();
        assert!(matches!(err, StoreError::Corrupt(_)));
    }

    #[cfg(unix)]
    #[test]
    fn test_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("creds.json");
        let store = FileCredentialStore::open(&path).unwrap();
        store.set(TokenKey::AccessToken, "a1").unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_rewrites_leave_only_the_credential_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("creds.json");

        let tokens = TokenStore::new(Arc::new(FileCredentialStore::open(&path).unwrap()));
        tokens.set_tokens(&TokenPair::new("a1", "r1")).unwrap();
        tokens.set_tokens(&TokenPair::new("a2", "r2")).unwrap();

        let entries: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("creds.json")]);

        let reopened = FileCredentialStore::open(&path).unwrap();
        assert_eq!(
            reopened.get(TokenKey::RefreshToken).unwrap().as_deref(),
            Some("r2")
        );
    }
}
