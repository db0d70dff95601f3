mod item_repo;
mod list_repo;

pub use item_repo::ItemRepository;
pub use list_repo::ListRepository;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::store::RemoteError;
use crate::validation::ValidationError;

/// Errors from repository writes that validate their input.
#[derive(Debug, Clone, PartialEq)]
pub enum RepoError {
    /// Rejected locally; nothing was sent
    Validation(ValidationError),
    /// The store call failed
    Remote(RemoteError),
}

impl std::fmt::Display for RepoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RepoError::Validation(e) => write!(f, "{}", e),
            RepoError::Remote(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for RepoError {}

impl From<ValidationError> for RepoError {
    fn from(e: ValidationError) -> Self {
        RepoError::Validation(e)
    }
}

impl From<RemoteError> for RepoError {
    fn from(e: RemoteError) -> Self {
        RepoError::Remote(e)
    }
}

fn decode<T: DeserializeOwned>(row: Value) -> Result<T, RemoteError> {
    serde_json::from_value(row).map_err(|e| RemoteError::Decode(e.to_string()))
}

fn decode_all<T: DeserializeOwned>(rows: Vec<Value>) -> Result<Vec<T>, RemoteError> {
    rows.into_iter().map(decode).collect()
}
