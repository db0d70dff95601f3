//! Remote store error types.

/// Errors returned by a [`RemoteStore`](super::RemoteStore).
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteError {
    /// The request never got a response (connection, DNS, timeout)
    Transport(String),
    /// The store answered with an error status
    Rejected {
        status: u16,
        code: Option<String>,
        message: String,
    },
    /// The response body did not have the expected shape
    Decode(String),
    /// A filtered update matched no row
    NotFound(String),
    /// An update or delete was attempted without any filter
    Unfiltered(&'static str),
}

impl RemoteError {
    /// True when repeating the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            RemoteError::Transport(_) => true,
            RemoteError::Rejected { status, .. } => {
                *status >= 500 || *status == 408 || *status == 429
            }
            _ => false,
        }
    }
}

impl std::fmt::Display for RemoteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RemoteError::Transport(e) => write!(f, "Connection error: {}", e),
            RemoteError::Rejected {
                status,
                code: Some(code),
                message,
            } => write!(f, "Store rejected request ({} {}): {}", status, code, message),
            RemoteError::Rejected {
                status, message, ..
            } => write!(f, "Store rejected request ({}): {}", status, message),
            RemoteError::Decode(e) => write!(f, "Unexpected response from store: {}", e),
            RemoteError::NotFound(what) => write!(f, "Not found: {}", what),
            RemoteError::Unfiltered(op) => write!(f, "Refusing {} without a filter", op),
        }
    }
}

impl std::error::Error for RemoteError {}
