//! RecoveryAction enum: what a caller should do when an engine operation fails.
//!
//! The engine never retries on its own; this is advisory for the store client.

use std::fmt;

use super::PermissionError;

/// Recommended recovery action for a failed operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryAction {
    /// Retry the whole operation (transient failure like SQLITE_BUSY).
    Retry,
    /// Surface to the caller. The request itself is invalid for the current state.
    Escalate,
}

impl RecoveryAction {
    /// Determine the recommended recovery action for a PermissionError.
    pub fn for_error(error: &PermissionError) -> Self {
        match error {
            PermissionError::Storage(e) if is_busy_error(e) => Self::Retry,

            // Validation and state errors
            PermissionError::InvalidPermissionGrantee { .. }
            | PermissionError::PermissionNotFound { .. }
            | PermissionError::CircularPermission { .. }
            | PermissionError::SelfInheritancePermission { .. }
            | PermissionError::InvalidPermissionLevel { .. }
            | PermissionError::PageNotFound { .. }
            | PermissionError::CircularPageParent { .. }
            | PermissionError::CannotInheritOutsideTree { .. } => Self::Escalate,

            PermissionError::Config(_) => Self::Escalate,
            PermissionError::Storage(_) => Self::Escalate,
            PermissionError::Serialization(_) => Self::Escalate,
        }
    }
}

impl fmt::Display for RecoveryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Retry => write!(f, "Retry"),
            Self::Escalate => write!(f, "Escalate"),
        }
    }
}

/// Check if a rusqlite error is SQLITE_BUSY or SQLITE_LOCKED (lock contention).
fn is_busy_error(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error {
                code: rusqlite::ffi::ErrorCode::DatabaseBusy
                    | rusqlite::ffi::ErrorCode::DatabaseLocked,
                ..
            },
            _,
        )
    )
}
