//! Session persistence on disk.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use super::Session;

/// Storage for the signed-in session.
///
/// The session lives in a single JSON file, the CLI counterpart of a
/// browser's local storage.
#[derive(Clone)]
pub struct SessionStorage {
    path: PathBuf,
}

impl SessionStorage {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Loads the stored session.
    ///
    /// Returns `Ok(None)` if the file doesn't exist.
    pub fn load(&self) -> Result<Option<Session>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => {
                let session = serde_json::from_str(&contents)
                    .map_err(|e| StorageError::ParseError(self.path.clone(), e.to_string()))?;
                Ok(Some(session))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::IoError(self.path.clone(), e)),
        }
    }

    /// Saves the session, creating the parent directory if needed.
    pub fn save(&self, session: &Session) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| StorageError::IoError(parent.to_path_buf(), e))?;
        }

        let json = serde_json::to_string_pretty(session)
            .map_err(|e| StorageError::ParseError(self.path.clone(), e.to_string()))?;
        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options
            .open(&self.path)
            .map_err(|e| StorageError::IoError(self.path.clone(), e))?;

        // a file left by an older version may still be group/world readable
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(fs::Permissions::from_mode(0o600))
                .map_err(|e| StorageError::IoError(self.path.clone(), e))?;
        }

        file.write_all(json.as_bytes())
            .map_err(|e| StorageError::IoError(self.path.clone(), e))?;
        Ok(())
    }

    /// Removes the stored session. Missing files are not an error.
    pub fn clear(&self) -> Result<(), StorageError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::IoError(self.path.clone(), e)),
        }
    }
}

/// Errors that can occur while reading or writing the session file.
#[derive(Debug)]
pub enum StorageError {
    IoError(PathBuf, io::Error),
    ParseError(PathBuf, String),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::IoError(path, e) => {
                write!(f, "I/O error for {}: {}", path.display(), e)
            }
            StorageError::ParseError(path, e) => {
                write!(f, "Invalid session file {}: {}", path.display(), e)
            }
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::IoError(_, e) => Some(e),
            StorageError::ParseError(_, _) => None,
        }
    }
}
