//! Error types for the HTTP service

use axum::http::StatusCode;
use git_slacker_core::{
    AuthenticationError, ConfigurationError, ErrorCategory, RelayError, RoutingError,
};

/// Generic message returned for failures the caller cannot act on
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal Application Error";

/// Request handling errors with HTTP status code mapping
///
/// - `400 Bad Request`: malformed bodies, unsupported methods and
///   [`AuthenticationError::InvalidRequestFormat`]
/// - `401 Unauthorized`: every other authentication failure
/// - `404 Not Found`: unknown providers and unknown routes
/// - `500 Internal Server Error`: everything else, rendered with a generic
///   message; the full error chain is logged server-side
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Failure raised while relaying the request
    #[error(transparent)]
    Relay(#[from] RelayError),

    /// The body could not be parsed as JSON or form data
    #[error("Invalid request format")]
    MalformedBody { reason: String },

    /// The path exists but not for this method
    #[error("Whoopsies! Method not allowed for this route!")]
    MethodNotAllowed { method: String },
}

impl ApiError {
    /// HTTP status code the error is rendered with
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Relay(RelayError::Authentication(AuthenticationError::InvalidRequestFormat)) => {
                StatusCode::BAD_REQUEST
            }
            Self::Relay(RelayError::Authentication(_)) => StatusCode::UNAUTHORIZED,
            Self::Relay(RelayError::Routing(
                RoutingError::UnknownProvider { .. } | RoutingError::RouteNotFound { .. },
            )) => StatusCode::NOT_FOUND,
            Self::Relay(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::MalformedBody { .. } | Self::MethodNotAllowed { .. } => StatusCode::BAD_REQUEST,
        }
    }

    /// Whether the caller receives the error's own message.
    ///
    /// Unexpected errors are logged and replaced by [`INTERNAL_ERROR_MESSAGE`].
    pub fn is_expected(&self) -> bool {
        match self {
            Self::Relay(error) => match error.error_category() {
                ErrorCategory::Security => true,
                ErrorCategory::Routing => self.status_code() == StatusCode::NOT_FOUND,
                ErrorCategory::Configuration | ErrorCategory::Unexpected => false,
            },
            Self::MalformedBody { .. } | Self::MethodNotAllowed { .. } => true,
        }
    }

    /// Error message followed by every underlying cause
    pub fn chain(&self) -> Vec<String> {
        match self {
            Self::Relay(error) => error.chain(),
            Self::MalformedBody { reason } => vec![self.to_string(), reason.clone()],
            Self::MethodNotAllowed { method } => vec![self.to_string(), method.clone()],
        }
    }
}

impl From<ConfigurationError> for ApiError {
    fn from(error: ConfigurationError) -> Self {
        Self::Relay(error.into())
    }
}

impl From<RoutingError> for ApiError {
    fn from(error: RoutingError) -> Self {
        Self::Relay(error.into())
    }
}

impl From<AuthenticationError> for ApiError {
    fn from(error: AuthenticationError) -> Self {
        Self::Relay(error.into())
    }
}

/// Service-level errors
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Failed to bind to address {address}: {message}")]
    BindFailed { address: String, message: String },

    #[error("Server failed: {message}")]
    ServerFailed { message: String },

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    #[error("Missing required configuration: {key}")]
    Missing { key: String },
}

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;
