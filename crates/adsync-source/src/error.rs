//! Report-source error types.

/// Errors from an ad-platform capability call.
///
/// Every variant names the endpoint that failed so the orchestrator can log
/// it next to the account it was fetching.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// HTTP transport error (after transport retries are exhausted).
    #[error("HTTP error calling {endpoint}: {source}")]
    Http {
        endpoint: String,
        source: reqwest::Error,
    },
    /// The platform returned a non-2xx status.
    #[error("{endpoint} returned {status}: {body}")]
    Api {
        endpoint: String,
        status: u16,
        body: String,
    },
    /// The platform returned 2xx with an error code in its envelope.
    #[error("{endpoint} returned platform error {code}: {message}")]
    Platform {
        endpoint: String,
        code: i64,
        message: String,
    },
    /// The response did not have the expected shape.
    #[error("malformed response from {endpoint}: {reason}")]
    Malformed { endpoint: String, reason: String },
    /// Client construction failed on bad configuration.
    #[error("configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

impl SourceError {
    pub(crate) fn malformed(endpoint: &str, reason: impl Into<String>) -> Self {
        Self::Malformed {
            endpoint: endpoint.to_string(),
            reason: reason.into(),
        }
    }
}
