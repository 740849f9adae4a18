//! Bearer token handling.

use std::fmt;

use reqwest::Url;
use zeroize::Zeroize;

use super::SessionError;

/// Query parameter the login redirect carries the token in.
pub const REDIRECT_TOKEN_PARAM: &str = "token";

/// A bearer token issued by the storefront backend.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken {
    value: String,
}

impl AuthToken {
    /// Wrap a raw token, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::EmptyToken`] for blank input.
    pub fn new(value: impl Into<String>) -> Result<Self, SessionError> {
        let mut value = value.into();
        let trimmed = value.trim();

        if trimmed.is_empty() {
            value.zeroize();

            return Err(SessionError::EmptyToken);
        }

        let token = Self {
            value: trimmed.to_string(),
        };

        value.zeroize();

        Ok(token)
    }

    /// The raw token, for the `Authorization` header and the token store.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.value
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(**redacted**)")?;
        Ok(())
    }
}

impl Drop for AuthToken {
    fn drop(&mut self) {
        self.value.zeroize();
    }
}

/// Extract the token from a login callback URL such as
/// `https://shop.example/?token=...`.
///
/// # Errors
///
/// Returns [`SessionError::InvalidRedirect`] when the URL does not parse and
/// [`SessionError::MissingToken`] when it carries no usable token.
pub fn token_from_redirect(redirect: &str) -> Result<AuthToken, SessionError> {
    let url = Url::parse(redirect.trim())
        .map_err(|error| SessionError::InvalidRedirect(error.to_string()))?;

    let token = url
        .query_pairs()
        .find(|(key, _)| key == REDIRECT_TOKEN_PARAM)
        .map(|(_, value)| value.into_owned())
        .ok_or(SessionError::MissingToken)?;

    AuthToken::new(token).map_err(|error| match error {
        SessionError::EmptyToken => SessionError::MissingToken,
        other => other,
    })
}
