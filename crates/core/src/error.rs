//! Client error model.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type used across the client crates.
pub type ClientResult<T> = Result<T, ClientError>;

/// Shown when the server gave no usable message.
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong. Please try again.";

const NETWORK_FAILURE_MESSAGE: &str =
    "Unable to reach the server. Check your connection and try again.";

/// Failure of a remote collection call.
///
/// The variants follow what the caller has to do about the failure, not the
/// exact status code: re-authenticate, fix the form, refresh, or retry.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// The request never reached the server or no response came back.
    #[error("network error: {0}")]
    Network(String),

    /// 401/403, or a protected call made without a session.
    #[error("not authorized ({status}): {message}")]
    Auth { status: u16, message: String },

    /// The server rejected the payload (400/409/422).
    #[error("validation failed: {message}")]
    Validation { message: String, fields: FieldErrors },

    /// The addressed record does not exist server-side.
    #[error("not found: {message}")]
    NotFound { message: String },

    /// 5xx, any other status, or a response body of unexpected shape.
    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },
}

impl ClientError {
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    pub fn server(status: u16, msg: impl Into<String>) -> Self {
        Self::Server {
            status,
            message: msg.into(),
        }
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound {
            message: msg.into(),
        }
    }

    /// A 2xx response whose body could not be read as the expected record(s).
    pub fn unexpected_shape(status: u16, detail: impl Into<String>) -> Self {
        Self::Server {
            status,
            message: format!("unexpected response shape: {}", detail.into()),
        }
    }

    /// Classify a non-success response.
    ///
    /// `message` is the `message` field of the error envelope when present;
    /// `fields` carries per-field messages for validation failures.
    pub fn from_status(status: u16, message: Option<String>, fields: FieldErrors) -> Self {
        let message = message.unwrap_or_default();
        match status {
            401 | 403 => Self::Auth { status, message },
            404 => Self::NotFound { message },
            400 | 409 | 422 => Self::Validation { message, fields },
            _ => Self::Server { status, message },
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth { .. })
    }

    /// Per-field messages reported by the server, if any.
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            Self::Validation { fields, .. } if !fields.is_empty() => Some(fields),
            _ => None,
        }
    }

    /// Text to show the user: the server's message verbatim when there is one.
    pub fn user_message(&self) -> String {
        let message = match self {
            Self::Network(_) => return NETWORK_FAILURE_MESSAGE.to_string(),
            Self::Auth { message, .. }
            | Self::Validation { message, .. }
            | Self::NotFound { message }
            | Self::Server { message, .. } => message,
        };

        if message.trim().is_empty() {
            GENERIC_FAILURE_MESSAGE.to_string()
        } else {
            message.clone()
        }
    }
}

/// Field name → message, one message per field.
///
/// Used both for client-side form validation and for field-level messages
/// returned by the server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message for `field`. The first message for a field is kept.
    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn remove(&mut self, field: &str) -> Option<String> {
        self.0.remove(field)
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn merge(&mut self, other: FieldErrors) {
        for (field, message) in other.0 {
            self.insert(field, message);
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FieldErrors {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut errors = Self::new();
        for (field, message) in iter {
            errors.insert(field, message);
        }
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_classification() {
        assert!(ClientError::from_status(401, None, FieldErrors::new()).is_auth());
        assert!(ClientError::from_status(403, None, FieldErrors::new()).is_auth());
        assert!(ClientError::from_status(404, None, FieldErrors::new()).is_not_found());
        assert!(matches!(
            ClientError::from_status(422, Some("bad".into()), FieldErrors::new()),
            ClientError::Validation { .. }
        ));
        assert!(matches!(
            ClientError::from_status(503, None, FieldErrors::new()),
            ClientError::Server { status: 503, .. }
        ));
    }

    #[test]
    fn user_message_is_verbatim_or_fallback() {
        let err = ClientError::from_status(
            422,
            Some("Coupon code already exists".into()),
            FieldErrors::new(),
        );
        assert_eq!(err.user_message(), "Coupon code already exists");

        let err = ClientError::server(500, "   ");
        assert_eq!(err.user_message(), GENERIC_FAILURE_MESSAGE);

        let err = ClientError::network("connection refused");
        assert!(err.user_message().contains("Unable to reach the server"));
    }

    #[test]
    fn field_errors_keep_first_message_per_field() {
        let mut errors = FieldErrors::new();
        errors.insert("name", "Name is required");
        errors.insert("name", "Name is too short");
        errors.insert("image", "Image is required");

        assert_eq!(errors.len(), 2);
        assert_eq!(errors.get("name"), Some("Name is required"));
        assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["image", "name"]);
    }

    #[test]
    fn field_errors_deserialize_from_server_map() {
        let errors: FieldErrors =
            serde_json::from_value(serde_json::json!({ "code": "must be unique" })).unwrap();
        assert_eq!(errors.get("code"), Some("must be unique"));
    }
}
