//! REST API errors.

use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Body keys checked, in order, for a readable backend error message.
const MESSAGE_KEYS: [&str; 3] = ["detail", "message", "error"];

#[derive(Debug, Error)]
pub enum ApiError {
    /// No bearer token is available for an authenticated call.
    #[error("not logged in")]
    NotAuthenticated,

    /// The backend rejected the bearer token (HTTP 401 or 403).
    #[error("{message}")]
    Unauthorized { status: StatusCode, message: String },

    /// Any other non-success response.
    #[error("{message}")]
    Status { status: StatusCode, message: String },

    /// A success response that carried a refusal message instead of a record.
    #[error("{0}")]
    Rejected(String),

    /// The request never produced a response.
    #[error("request failed")]
    Transport(#[source] reqwest::Error),

    /// The response body was not the JSON we expected.
    #[error("invalid response body")]
    Decode(#[source] serde_json::Error),

    /// The configured base URL cannot carry endpoint paths.
    #[error("invalid API base URL: {0}")]
    InvalidBaseUrl(String),
}

impl ApiError {
    /// Classify a non-success response.
    #[must_use]
    pub fn from_response(status: StatusCode, body: &str) -> Self {
        let message = extract_message(body).unwrap_or_else(|| {
            status
                .canonical_reason()
                .map_or_else(|| format!("HTTP {}", status.as_u16()), str::to_string)
        });

        if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            Self::Unauthorized { status, message }
        } else {
            Self::Status { status, message }
        }
    }

    /// Whether the stored token should be discarded.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    /// The message the backend sent, when there was one.
    #[must_use]
    pub fn backend_message(&self) -> Option<&str> {
        match self {
            Self::Unauthorized { message, .. }
            | Self::Status { message, .. }
            | Self::Rejected(message) => Some(message),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(error: reqwest::Error) -> Self {
        Self::Transport(error)
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(error: serde_json::Error) -> Self {
        Self::Decode(error)
    }
}

/// Pull a readable message out of an error body: a `detail` / `message` /
/// `error` string, the first validation `msg`, or the raw text.
fn extract_message(body: &str) -> Option<String> {
    let text = body.trim();

    if text.is_empty() {
        return None;
    }

    let Ok(value) = serde_json::from_str::<Value>(text) else {
        return Some(text.to_string());
    };

    MESSAGE_KEYS
        .iter()
        .filter_map(|key| value.get(key))
        .find_map(|candidate| match candidate {
            Value::String(message) if !message.trim().is_empty() => Some(message.clone()),
            Value::Array(details) => details
                .iter()
                .find_map(|detail| detail.get("msg").and_then(Value::as_str))
                .map(str::to_string),
            _ => None,
        })
        .or_else(|| value.as_str().map(str::to_string))
        .or_else(|| Some(text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_string_is_preferred() {
        let error = ApiError::from_response(
            StatusCode::NOT_FOUND,
            r#"{"detail":"Product not found","message":"ignored"}"#,
        );

        assert_eq!(error.backend_message(), Some("Product not found"));
        assert!(!error.is_unauthorized());
    }

    #[test]
    fn validation_details_use_first_msg() {
        let error = ApiError::from_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            r#"{"detail":[{"loc":["body","pro_id"],"msg":"field required"}]}"#,
        );

        assert_eq!(error.to_string(), "field required");
    }

    #[test]
    fn plain_text_bodies_are_kept() {
        let error = ApiError::from_response(StatusCode::BAD_GATEWAY, "upstream timeout");

        assert_eq!(error.backend_message(), Some("upstream timeout"));
    }

    #[test]
    fn empty_bodies_fall_back_to_reason_phrase() {
        let error = ApiError::from_response(StatusCode::INTERNAL_SERVER_ERROR, "  ");

        assert_eq!(error.to_string(), "Internal Server Error");
    }

    #[test]
    fn forbidden_is_unauthorized() {
        let error = ApiError::from_response(StatusCode::FORBIDDEN, r#"{"detail":"Invalid token"}"#);

        assert!(error.is_unauthorized());
        assert_eq!(error.backend_message(), Some("Invalid token"));
    }
}
