//! Authentication error types.

use crate::validation::ValidationError;

/// Errors returned by a [`SessionProvider`](super::SessionProvider).
#[derive(Debug, Clone, PartialEq)]
pub enum AuthError {
    /// Email or password rejected locally
    Validation(ValidationError),
    /// Sign up for an email that already has an account
    AlreadyRegistered,
    /// Wrong email/password pair
    InvalidCredentials,
    /// The auth service could not be reached
    Network(String),
    /// Any other refusal from the auth service
    Rejected {
        status: u16,
        code: Option<String>,
        message: String,
    },
    /// The local session file could not be read or written
    Storage(String),
}

impl AuthError {
    /// True when the service may accept the same request later: it could
    /// not be reached, or answered 5xx, 408 or 429.
    pub fn is_transient(&self) -> bool {
        match self {
            AuthError::Network(_) => true,
            AuthError::Rejected { status, .. } => {
                *status >= 500 || *status == 408 || *status == 429
            }
            _ => false,
        }
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::Validation(e) => write!(f, "{}", e),
            AuthError::AlreadyRegistered => write!(f, "User already registered"),
            AuthError::InvalidCredentials => write!(f, "Invalid login credentials"),
            AuthError::Network(e) => write!(f, "Network error: {}", e),
            AuthError::Rejected { message, .. } => write!(f, "{}", message),
            AuthError::Storage(e) => write!(f, "Session storage error: {}", e),
        }
    }
}

impl std::error::Error for AuthError {}

impl From<ValidationError> for AuthError {
    fn from(e: ValidationError) -> Self {
        AuthError::Validation(e)
    }
}

impl From<super::StorageError> for AuthError {
    fn from(e: super::StorageError) -> Self {
        AuthError::Storage(e.to_string())
    }
}
