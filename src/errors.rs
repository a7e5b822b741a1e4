//! Permission engine error types (thiserror).

mod recovery;

pub use recovery::RecoveryAction;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PermissionError {
    #[error("Invalid permission grantee: {reason}")]
    InvalidPermissionGrantee { reason: String },

    #[error("Permission not found: {permission_id}")]
    PermissionNotFound { permission_id: String },

    #[error(
        "Circular permission: source {source_permission_id} already inherits from a permission on page {page_id}"
    )]
    CircularPermission {
        page_id: String,
        source_permission_id: String,
    },

    #[error(
        "Page {page_id} cannot inherit from its own permission {source_permission_id}"
    )]
    SelfInheritancePermission {
        page_id: String,
        source_permission_id: String,
    },

    #[error("Invalid permission level: {level}")]
    InvalidPermissionLevel { level: String },

    #[error("Page not found: {page_id}")]
    PageNotFound { page_id: String },

    #[error("Page {page_id} cannot move under {parent_id}, which is itself or one of its descendants")]
    CircularPageParent { page_id: String, parent_id: String },

    #[error("Page {target_page_id} is not below page {source_page_id}, cannot inherit outside the tree")]
    CannotInheritOutsideTree {
        source_page_id: String,
        target_page_id: String,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl PermissionError {
    pub(crate) fn permission_not_found(id: &str) -> Self {
        Self::PermissionNotFound {
            permission_id: id.to_string(),
        }
    }

    pub(crate) fn page_not_found(id: &str) -> Self {
        Self::PageNotFound {
            page_id: id.to_string(),
        }
    }
}

pub type PermissionResult<T> = Result<T, PermissionError>;
