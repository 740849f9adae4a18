//! Token persistence.

use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::{Mutex, PoisonError},
};

use mockall::automock;
use tracing::debug;
use zeroize::Zeroize;

use super::{AuthToken, SessionError};

/// Where the bearer token lives between runs.
#[automock]
pub trait TokenStore: Send + Sync {
    /// Read the stored token. `None` means anonymous.
    fn load(&self) -> Result<Option<AuthToken>, SessionError>;

    /// Replace the stored token.
    fn save(&self, token: &AuthToken) -> Result<(), SessionError>;

    /// Forget the stored token. Clearing an empty store is not an error.
    fn clear(&self) -> Result<(), SessionError>;
}

/// Stores the token as a single-line file.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    /// Store the token at `path`. Parent directories are created on save.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The token file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> SessionError {
        SessionError::Storage {
            path: self.path.clone(),
            source,
        }
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<AuthToken>, SessionError> {
        let mut raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(error) => return Err(self.io_error(error)),
        };

        let token = AuthToken::new(raw.as_str()).ok();

        raw.zeroize();

        Ok(token)
    }

    fn save(&self, token: &AuthToken) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|error| self.io_error(error))?;
        }

        fs::write(&self.path, token.expose()).map_err(|error| self.io_error(error))?;

        debug!(path = %self.path.display(), "stored session token");

        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                debug!(path = %self.path.display(), "cleared session token");

                Ok(())
            }
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(self.io_error(error)),
        }
    }
}

/// Keeps the token in memory for the life of the process.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<AuthToken>>,
}

impl MemoryTokenStore {
    /// Start with `token` stored.
    #[must_use]
    pub fn with_token(token: AuthToken) -> Self {
        Self {
            token: Mutex::new(Some(token)),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<AuthToken>, SessionError> {
        Ok(self
            .token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn save(&self, token: &AuthToken) -> Result<(), SessionError> {
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = Some(token.clone());

        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = None;

        Ok(())
    }
}
