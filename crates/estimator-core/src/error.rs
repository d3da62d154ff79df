//! Error types for the print estimator client.

use thiserror::Error;

/// Main error type for estimator operations.
///
/// Callers never branch on the variant for behaviour; every variant collapses to a
/// single display string through [`EstimatorError::user_message`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EstimatorError {
    /// The draft has neither text nor an attachment.
    #[error("Enter text or upload a file to submit")]
    EmptyDraft,

    /// Network unreachable, connection reset, DNS failure and friends.
    #[error("Transport error: {message}")]
    Transport { message: String },

    /// The request did not settle within the configured timeout.
    #[error("Operation timed out after {duration_ms}ms: {message}")]
    Timeout { duration_ms: u64, message: String },

    /// Non-2xx response, optionally carrying the server's `detail` field.
    #[error("Server returned {status}: {}", .detail.as_deref().unwrap_or("no detail"))]
    Server {
        status: u16,
        detail: Option<String>,
        message: String,
    },

    /// 2xx response whose body is not what the contract promises.
    #[error("Malformed response from {endpoint}: {message}")]
    MalformedResponse { endpoint: String, message: String },

    /// Client configuration could not be used.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl EstimatorError {
    /// Build a server error from a status code and the raw response body.
    ///
    /// The `detail` field is extracted when the body is a JSON object carrying a
    /// string `detail`; anything else falls back to the status line.
    pub fn from_response_body(status: u16, body: &str) -> Self {
        let detail = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|value| {
                value
                    .get("detail")
                    .and_then(|d| d.as_str())
                    .map(str::to_string)
            })
            .filter(|d| !d.trim().is_empty());

        EstimatorError::Server {
            status,
            detail,
            message: format!("Request failed with status code {}", status),
        }
    }

    /// The single human-readable message shown inline to the user.
    pub fn user_message(&self) -> String {
        match self {
            EstimatorError::Server {
                detail: Some(detail),
                ..
            } => detail.clone(),
            EstimatorError::Server { message, .. } => message.clone(),
            EstimatorError::Transport { message } => message.clone(),
            EstimatorError::Timeout { message, .. } => message.clone(),
            EstimatorError::EmptyDraft
            | EstimatorError::MalformedResponse { .. }
            | EstimatorError::Config(_) => self.to_string(),
        }
    }

    /// Returns true if resubmitting the same draft might succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            EstimatorError::Transport { .. } | EstimatorError::Timeout { .. } => true,
            EstimatorError::Server { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// Convenience Result type for estimator operations.
pub type Result<T> = std::result::Result<T, EstimatorError>;

impl From<serde_json::Error> for EstimatorError {
    fn from(err: serde_json::Error) -> Self {
        EstimatorError::MalformedResponse {
            endpoint: "json".to_string(),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_is_preferred() {
        let err = EstimatorError::from_response_body(400, r#"{"detail":"file too large"}"#);
        assert_eq!(err.user_message(), "file too large");
    }

    #[test]
    fn test_missing_detail_falls_back_to_status() {
        let err = EstimatorError::from_response_body(502, "<html>bad gateway</html>");
        assert_eq!(err.user_message(), "Request failed with status code 502");

        let err = EstimatorError::from_response_body(422, r#"{"detail":[{"loc":["body"]}]}"#);
        assert_eq!(err.user_message(), "Request failed with status code 422");
    }

    #[test]
    fn test_transport_message_passes_through() {
        let err = EstimatorError::Transport {
            message: "connection refused".to_string(),
        };
        assert_eq!(err.user_message(), "connection refused");
        assert!(err.is_transient());
    }

    #[test]
    fn test_transient_classification() {
        assert!(EstimatorError::from_response_body(503, "").is_transient());
        assert!(!EstimatorError::from_response_body(404, "").is_transient());
        assert!(!EstimatorError::EmptyDraft.is_transient());
    }
}
