use std::collections::BTreeMap;

use reqwest::StatusCode;
use serde_json::Value;

/// Fallback shown when the server gives us nothing usable.
pub const GENERIC_ERROR_MESSAGE: &str = "Some error occurred";

/// Per-field validation messages, keyed by field name.
pub type FieldErrors = BTreeMap<String, String>;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Unauthorized: {0}")]
    Auth(String),

    #[error("Validation failed: {message}")]
    Validation {
        message: String,
        fields: FieldErrors,
    },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("No user is logged in")]
    NoSession,

    #[error("{0}")]
    Unknown(String),
}

impl ApiError {
    pub fn validation(message: impl Into<String>, fields: FieldErrors) -> Self {
        ApiError::Validation {
            message: message.into(),
            fields,
        }
    }

    /// Maps a non-success HTTP status and its body onto the error taxonomy.
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let (message, fields) = extract_message(body);
        let message = message.unwrap_or_else(|| GENERIC_ERROR_MESSAGE.to_string());

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ApiError::Auth(message),
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                ApiError::Validation { message, fields }
            }
            StatusCode::NOT_FOUND => ApiError::NotFound(message),
            _ => ApiError::Unknown(message),
        }
    }

    /// True when the view should fall back to the logged-out state.
    pub fn is_auth(&self) -> bool {
        matches!(self, ApiError::Auth(_) | ApiError::NoSession)
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ApiError::Unknown(format!("Failed to parse response: {e}"))
        } else {
            ApiError::Network(e.to_string())
        }
    }
}

/// Pulls a human-readable message (and any field detail) out of an error body.
///
/// Looks at `message`, then `error`, then an express-validator style `errors`
/// array, and finally the raw text when it is not JSON at all.
fn extract_message(body: &str) -> (Option<String>, FieldErrors) {
    let mut fields = FieldErrors::new();
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return (None, fields);
    }

    let json: Value = match serde_json::from_str(trimmed) {
        Ok(v) => v,
        Err(_) => return (Some(trimmed.to_string()), fields),
    };

    if let Some(errors) = json.get("errors").and_then(Value::as_array) {
        for entry in errors {
            let msg = entry
                .get("msg")
                .or_else(|| entry.get("message"))
                .and_then(Value::as_str);
            let field = entry
                .get("param")
                .or_else(|| entry.get("path"))
                .and_then(Value::as_str);
            if let (Some(field), Some(msg)) = (field, msg) {
                fields.insert(field.to_string(), msg.to_string());
            }
        }
    }

    let message = match &json {
        Value::String(s) => Some(s.clone()),
        _ => json
            .get("message")
            .and_then(Value::as_str)
            .or_else(|| json.get("error").and_then(Value::as_str))
            .map(str::to_string)
            .or_else(|| fields.values().next().cloned()),
    };

    (message, fields)
}

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Session file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Session file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;
