use crate::natal::ValidationIssue;
use crate::upstream::UpstreamError;
use serde_json::{json, Value};
use thiserror::Error;

/// Errors surfaced to the browser-facing boundary.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    #[error("Invalid input: {message}")]
    InvalidInput {
        message: String,
        issues: Vec<ValidationIssue>,
    },
    #[error("Missing configuration: {0}")]
    MissingConfig(String),
    #[error("Upstream returned HTTP {status}")]
    UpstreamHttp { status: u16, body: String },
    #[error("Upstream response did not match the expected shape")]
    UpstreamSchema(String),
    #[error("Upstream request timed out")]
    UpstreamTimeout,
    #[error("Upstream service could not be reached")]
    UpstreamNetwork(String),
}

impl ApiError {
    pub fn invalid(issues: Vec<ValidationIssue>) -> Self {
        let message = match issues.first() {
            Some(first) if issues.len() == 1 => format!("{}: {}", first.field, first.message),
            Some(_) => format!("{} fields are invalid", issues.len()),
            None => "request is invalid".to_string(),
        };
        ApiError::InvalidInput { message, issues }
    }

    pub fn status(&self) -> u16 {
        match self {
            ApiError::InvalidInput { .. } => 400,
            ApiError::MissingConfig(_) => 500,
            ApiError::UpstreamHttp { status, .. } => *status,
            ApiError::UpstreamSchema(_) => 502,
            ApiError::UpstreamTimeout => 504,
            ApiError::UpstreamNetwork(_) => 502,
        }
    }

    pub fn code(&self) -> String {
        match self {
            ApiError::InvalidInput { .. } => "INVALID_INPUT".to_string(),
            ApiError::MissingConfig(_) => "MISSING_CONFIG".to_string(),
            ApiError::UpstreamHttp { status, .. } => format!("UPSTREAM_{}", status),
            ApiError::UpstreamSchema(_) => "UPSTREAM_SCHEMA_MISMATCH".to_string(),
            ApiError::UpstreamTimeout => "UPSTREAM_TIMEOUT".to_string(),
            ApiError::UpstreamNetwork(_) => "UPSTREAM_NETWORK_ERROR".to_string(),
        }
    }

    /// Whether retrying the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::UpstreamTimeout | ApiError::UpstreamNetwork(_) => true,
            ApiError::UpstreamHttp { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// `{error: {code, message, details}}`. Upstream detail only travels in
    /// `details`.
    pub fn to_body(&self) -> Value {
        let details = match self {
            ApiError::InvalidInput { issues, .. } => json!(issues),
            ApiError::UpstreamHttp { body, .. } => {
                serde_json::from_str::<Value>(body).unwrap_or_else(|_| Value::String(body.clone()))
            }
            ApiError::UpstreamSchema(detail) | ApiError::UpstreamNetwork(detail) => json!(detail),
            _ => Value::Null,
        };
        json!({
            "error": {
                "code": self.code(),
                "message": self.to_string(),
                "details": details,
            }
        })
    }
}

impl From<UpstreamError> for ApiError {
    fn from(err: UpstreamError) -> Self {
        match err {
            UpstreamError::Http { status, body } => ApiError::UpstreamHttp { status, body },
            UpstreamError::SchemaMismatch(detail) => ApiError::UpstreamSchema(detail),
            UpstreamError::Timeout => ApiError::UpstreamTimeout,
            UpstreamError::Network(detail) => ApiError::UpstreamNetwork(detail),
            UpstreamError::MissingConfig(what) => ApiError::MissingConfig(what),
        }
    }
}

impl From<Vec<ValidationIssue>> for ApiError {
    fn from(issues: Vec<ValidationIssue>) -> Self {
        ApiError::invalid(issues)
    }
}
