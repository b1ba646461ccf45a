// Error types for provider dispatch

use thiserror::Error;

/// Failures raised by a strategy while talking to the identity provider.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UpstreamError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid grant: {0}")]
    InvalidGrant(String),

    #[error("Authorization code missing from callback")]
    MissingAuthorizationCode,

    #[error("State parameter mismatch")]
    StateMismatch,

    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),

    #[error("Invalid provider configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Exchange cancelled")]
    Cancelled,
}

impl UpstreamError {
    pub fn status_code(&self) -> u16 {
        match self {
            UpstreamError::InvalidGrant(_)
            | UpstreamError::MissingAuthorizationCode
            | UpstreamError::StateMismatch => 401,
            UpstreamError::Network(_) | UpstreamError::InvalidResponse(_) => 502,
            UpstreamError::InvalidConfiguration(_) => 500,
            UpstreamError::Cancelled => 503,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Provider not specified")]
    MissingProvider,

    /// Covers both "no strategy" and "incomplete configuration".
    #[error("Provider {0} is not supported")]
    UnsupportedProvider(String),

    #[error(transparent)]
    UpstreamExchangeFailure(#[from] UpstreamError),

    #[error("Authentication failed")]
    AuthenticationFailed,
}

impl AuthError {
    pub fn status_code(&self) -> u16 {
        match self {
            AuthError::MissingProvider | AuthError::UnsupportedProvider(_) => 400,
            AuthError::UpstreamExchangeFailure(upstream) => upstream.status_code(),
            AuthError::AuthenticationFailed => 401,
        }
    }

    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code())
    }
}

impl From<AuthError> for gatehouse_core::Error {
    fn from(err: AuthError) -> Self {
        use gatehouse_core::Error;

        match err {
            AuthError::MissingProvider | AuthError::UnsupportedProvider(_) => {
                Error::BadRequest(err.to_string())
            }
            AuthError::AuthenticationFailed => Error::Unauthorized(err.to_string()),
            AuthError::UpstreamExchangeFailure(upstream) => match upstream {
                UpstreamError::InvalidGrant(_)
                | UpstreamError::MissingAuthorizationCode
                | UpstreamError::StateMismatch => Error::Unauthorized(upstream.to_string()),
                UpstreamError::Network(_) | UpstreamError::InvalidResponse(_) => {
                    Error::BadGateway(upstream.to_string())
                }
                // Details stay in the server log
                UpstreamError::InvalidConfiguration(_) => {
                    Error::Internal("Provider configuration is invalid".to_string())
                }
                UpstreamError::Cancelled => Error::ServiceUnavailable(upstream.to_string()),
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, AuthError>;
