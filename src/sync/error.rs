//! Failure taxonomy for sync operations.

use crate::db::StoreError;

/// Errors a sync operation can surface to the caller.
///
/// Every coordinator method collapses transport, server, and local
/// storage failures into these variants so the command layer can react
/// uniformly (re-login on `SessionExpired`, offline messaging on
/// `NoConnectivity`, and so on).
#[derive(Debug)]
pub enum SyncError {
    /// Login rejected: unknown identifier or wrong password
    InvalidCredentials,
    /// Registration rejected: username or email already taken. Carries
    /// the message saying which.
    DuplicateUser(String),
    /// The server could not be reached at all
    NoConnectivity,
    /// No usable session, locally or remotely
    SessionExpired,
    /// Input rejected before anything was sent or stored
    Validation { field: String, reason: String },
    /// The local database or session file failed
    StorageUnavailable(String),
    /// The server answered and said no; carries its message
    Rejected(String),
}

impl SyncError {
    pub fn validation(field: &str, reason: impl Into<String>) -> Self {
        SyncError::Validation {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for SyncError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncError::InvalidCredentials => write!(f, "Invalid username or password"),
            SyncError::DuplicateUser(message) => write!(f, "{}", message),
            SyncError::NoConnectivity => write!(
                f,
                "No internet connection. Please check your network and try again."
            ),
            SyncError::SessionExpired => write!(f, "Invalid or expired session"),
            SyncError::Validation { field, reason } => write!(f, "{}: {}", field, reason),
            SyncError::StorageUnavailable(e) => write!(f, "Local storage error: {}", e),
            SyncError::Rejected(message) => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for SyncError {}

impl From<StoreError> for SyncError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::DuplicateKey(detail) => SyncError::DuplicateUser(detail),
            StoreError::NotFound => SyncError::SessionExpired,
            StoreError::Unavailable(detail) => SyncError::StorageUnavailable(detail),
        }
    }
}

impl From<std::io::Error> for SyncError {
    fn from(e: std::io::Error) -> Self {
        SyncError::StorageUnavailable(e.to_string())
    }
}
