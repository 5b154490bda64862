//! Provider error types.
//!
//! Error definitions with transient/permanent classification for retry logic.

use thiserror::Error;

/// Error that can occur while talking to the data provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    // Transport errors (transient)
    /// Network error during communication.
    #[error("network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Request timed out.
    #[error("request timeout: {message}")]
    Timeout { message: String },

    /// Provider asked us to slow down.
    #[error("rate limited: {message}")]
    RateLimited { message: String },

    /// The financial institution behind the item is temporarily unavailable.
    #[error("institution unavailable: {message}")]
    InstitutionUnavailable { message: String },

    /// Provider-side failure (5xx).
    #[error("provider unavailable: {message}")]
    ProviderUnavailable { message: String },

    // Caller errors (permanent)
    /// Credentials (client id/secret or access token) were rejected.
    #[error("invalid credentials: {message}")]
    InvalidCredentials { message: String },

    /// The provider rejected the request as malformed.
    #[error("invalid request: {message}")]
    InvalidRequest { message: String },

    /// The provider returned a body we could not interpret.
    #[error("malformed response: {message}")]
    MalformedResponse { message: String },
}

impl ProviderError {
    /// Check if this error is transient and the enclosing operation should
    /// be retried.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ProviderError::Network { .. }
                | ProviderError::Timeout { .. }
                | ProviderError::RateLimited { .. }
                | ProviderError::InstitutionUnavailable { .. }
                | ProviderError::ProviderUnavailable { .. }
        )
    }

    /// Check if this error is permanent and retry won't help.
    #[must_use]
    pub fn is_permanent(&self) -> bool {
        !self.is_transient()
    }

    /// Get an error code for log classification.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            ProviderError::Network { .. } => "NETWORK_ERROR",
            ProviderError::Timeout { .. } => "TIMEOUT",
            ProviderError::RateLimited { .. } => "RATE_LIMITED",
            ProviderError::InstitutionUnavailable { .. } => "INSTITUTION_UNAVAILABLE",
            ProviderError::ProviderUnavailable { .. } => "PROVIDER_UNAVAILABLE",
            ProviderError::InvalidCredentials { .. } => "INVALID_CREDENTIALS",
            ProviderError::InvalidRequest { .. } => "INVALID_REQUEST",
            ProviderError::MalformedResponse { .. } => "MALFORMED_RESPONSE",
        }
    }

    // Convenience constructors

    /// Create a network error.
    pub fn network(message: impl Into<String>) -> Self {
        ProviderError::Network {
            message: message.into(),
            source: None,
        }
    }

    /// Create a network error with source.
    pub fn network_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        ProviderError::Network {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an invalid request error.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        ProviderError::InvalidRequest {
            message: message.into(),
        }
    }

    /// Create a malformed response error.
    pub fn malformed(message: impl Into<String>) -> Self {
        ProviderError::MalformedResponse {
            message: message.into(),
        }
    }
}

/// Result type for provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_errors() {
        let transient = vec![
            ProviderError::network("connection reset"),
            ProviderError::Timeout {
                message: "30s elapsed".to_string(),
            },
            ProviderError::RateLimited {
                message: "slow down".to_string(),
            },
            ProviderError::InstitutionUnavailable {
                message: "bank down".to_string(),
            },
            ProviderError::ProviderUnavailable {
                message: "502".to_string(),
            },
        ];

        for err in transient {
            assert!(
                err.is_transient(),
                "expected {} to be transient",
                err.error_code()
            );
            assert!(!err.is_permanent());
        }
    }

    #[test]
    fn test_permanent_errors() {
        let permanent = vec![
            ProviderError::InvalidCredentials {
                message: "bad secret".to_string(),
            },
            ProviderError::invalid_request("missing public_token"),
            ProviderError::malformed("no access_token in body"),
        ];

        for err in permanent {
            assert!(
                err.is_permanent(),
                "expected {} to be permanent",
                err.error_code()
            );
            assert!(!err.is_transient());
        }
    }

    #[test]
    fn test_error_codes_and_display() {
        let err = ProviderError::RateLimited {
            message: "too many requests".to_string(),
        };
        assert_eq!(err.error_code(), "RATE_LIMITED");
        assert_eq!(err.to_string(), "rate limited: too many requests");
    }

    #[test]
    fn test_error_with_source() {
        let source = std::io::Error::new(std::io::ErrorKind::Other, "boom");
        let err = ProviderError::network_with_source("request failed", source);
        assert!(err.is_transient());
        if let ProviderError::Network { source, .. } = &err {
            assert!(source.is_some());
        } else {
            panic!("expected Network variant");
        }
    }
}
