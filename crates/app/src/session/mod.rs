//! Session
//!
//! The session owns the bearer token's lifecycle: set from the login
//! redirect, read before every authenticated call, cleared on logout or when
//! the backend rejects it. Components receive a [`Session`] explicitly rather
//! than reading ambient storage.

use std::{io, path::PathBuf, sync::Arc};

use thiserror::Error;
use tracing::{info, warn};

use crate::api::ApiError;

mod store;
mod token;

pub use store::{FileTokenStore, MemoryTokenStore, MockTokenStore, TokenStore};
pub use token::{AuthToken, REDIRECT_TOKEN_PARAM, token_from_redirect};

/// Token handling failures.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("token is empty")]
    EmptyToken,

    #[error("login redirect carries no token")]
    MissingToken,

    #[error("login redirect is not a valid URL: {0}")]
    InvalidRedirect(String),

    #[error("token storage error at {path}")]
    Storage {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Explicit handle on the stored bearer token.
#[derive(Clone)]
pub struct Session {
    store: Arc<dyn TokenStore>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session").finish_non_exhaustive()
    }
}

impl Session {
    /// Create a session over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        Self { store }
    }

    /// The current token. A missing token is the anonymous state, not an
    /// error; an unreadable store is logged and treated as anonymous.
    #[must_use]
    pub fn token(&self) -> Option<AuthToken> {
        match self.store.load() {
            Ok(token) => token,
            Err(error) => {
                warn!(%error, "failed to read session token");

                None
            }
        }
    }

    /// Whether a token is present.
    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.token().is_some()
    }

    /// Store the token carried by a login redirect.
    ///
    /// # Errors
    ///
    /// Returns an error when the redirect has no token or it cannot be
    /// stored.
    pub fn login_from_redirect(&self, redirect: &str) -> Result<AuthToken, SessionError> {
        let token = token_from_redirect(redirect)?;

        self.store.save(&token)?;

        info!("logged in from redirect");

        Ok(token)
    }

    /// Forget the token.
    ///
    /// # Errors
    ///
    /// Returns an error when the store cannot be cleared.
    pub fn logout(&self) -> Result<(), SessionError> {
        self.store.clear()?;

        info!("logged out");

        Ok(())
    }

    /// Drop the token when `error` shows the backend no longer accepts it.
    pub fn invalidate_on(&self, error: &ApiError) {
        if !error.is_unauthorized() {
            return;
        }

        warn!("backend rejected session token, clearing it");

        if let Err(clear_error) = self.store.clear() {
            warn!(error = %clear_error, "failed to clear rejected session token");
        }
    }
}

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn unreadable_store_is_anonymous() {
        let mut store = MockTokenStore::new();

        store.expect_load().once().returning(|| {
            Err(SessionError::Storage {
                path: PathBuf::from("/nope/token"),
                source: io::Error::from(io::ErrorKind::PermissionDenied),
            })
        });

        let session = Session::new(Arc::new(store));

        assert!(session.token().is_none());
    }

    #[test]
    fn login_from_redirect_saves_token() -> TestResult {
        let mut store = MockTokenStore::new();

        store
            .expect_save()
            .once()
            .withf(|token| token.expose() == "abc")
            .returning(|_| Ok(()));
        store.expect_clear().never();

        let session = Session::new(Arc::new(store));
        let token = session.login_from_redirect("https://shop.example/?token=abc")?;

        assert_eq!(token.expose(), "abc");

        Ok(())
    }

    #[test]
    fn unauthorized_errors_clear_the_token() -> TestResult {
        let store = Arc::new(MemoryTokenStore::with_token(AuthToken::new("abc")?));
        let session = Session::new(store);

        session.invalidate_on(&ApiError::from_response(StatusCode::BAD_REQUEST, ""));

        assert!(session.is_logged_in());

        session.invalidate_on(&ApiError::from_response(StatusCode::UNAUTHORIZED, ""));

        assert!(!session.is_logged_in());

        Ok(())
    }
}
