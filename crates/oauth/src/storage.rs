use std::{
    ffi::OsString,
    fs::OpenOptions,
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};

use tracing::debug;

use crate::{error::StoreError, types::OAuthTokens};

/// Receives every token the client obtains, before the token is used.
pub trait TokenPersister: Send + Sync {
    fn persist(&self, tokens: &OAuthTokens) -> Result<(), StoreError>;
}

/// File-based token storage, by default at `~/.NIBE_Uplink_API_Token.json`.
///
/// Saves replace the file with write-then-rename under an exclusive lock on
/// a sidecar `<file>.lock`, so the only copy of the refresh token is never
/// left half-written and two processes refreshing at once do not interleave.
/// The sidecar stays next to the token until [`TokenStore::delete`].
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn default_path() -> PathBuf {
        crate::defaults::default_token_path()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    pub fn load(&self) -> Result<OAuthTokens, StoreError> {
        let data = match std::fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StoreError::NotFound {
                    path: self.path.clone(),
                });
            },
            Err(source) => return Err(self.io_error(source)),
        };
        serde_json::from_str(&data).map_err(|source| StoreError::Malformed {
            path: self.path.clone(),
            source,
        })
    }

    pub fn save(&self, tokens: &OAuthTokens) -> Result<(), StoreError> {
        let data = serde_json::to_string_pretty(tokens).map_err(StoreError::Serialize)?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir).map_err(|e| self.io_error(e))?;

        let lock_file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.lock_path())
            .map_err(|e| self.io_error(e))?;
        let mut lock = fd_lock::RwLock::new(lock_file);
        let _guard = lock.write().map_err(|e| self.io_error(e))?;

        let mut tmp = tempfile::NamedTempFile::new_in(&dir).map_err(|e| self.io_error(e))?;
        tmp.write_all(data.as_bytes())
            .and_then(|()| tmp.as_file().sync_all())
            .map_err(|e| self.io_error(e))?;

        // Set file permissions to 0600 on Unix
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(tmp.path(), std::fs::Permissions::from_mode(0o600))
                .map_err(|e| self.io_error(e))?;
        }

        tmp.persist(&self.path)
            .map_err(|e| self.io_error(e.error))?;
        debug!(path = %self.path.display(), "saved oauth tokens");
        Ok(())
    }

    /// Remove the stored token and its lock file. Missing files are not an error.
    pub fn delete(&self) -> Result<(), StoreError> {
        for path in [self.path.clone(), self.lock_path()] {
            match std::fs::remove_file(&path) {
                Ok(()) => {},
                Err(e) if e.kind() == ErrorKind::NotFound => {},
                Err(e) => return Err(self.io_error(e)),
            }
        }
        Ok(())
    }

    fn lock_path(&self) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(".lock");
        PathBuf::from(name)
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl TokenPersister for TokenStore {
    fn persist(&self, tokens: &OAuthTokens) -> Result<(), StoreError> {
        self.save(tokens)
    }
}
