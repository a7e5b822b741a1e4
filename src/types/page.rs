//! Page: the tree node this engine reads. Owned by the page-management collaborator.

use serde::{Deserialize, Serialize};

use super::PermissionWithSource;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub id: String,
    /// `None` for a root page.
    pub parent_id: Option<String>,
    pub space_id: String,
}

impl Page {
    pub fn root(id: impl Into<String>, space_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            parent_id: None,
            space_id: space_id.into(),
        }
    }

    pub fn child(
        id: impl Into<String>,
        parent_id: impl Into<String>,
        space_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            parent_id: Some(parent_id.into()),
            space_id: space_id.into(),
        }
    }
}

/// A page together with its permission rows, each joined with its source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageWithPermissions {
    #[serde(flatten)]
    pub page: Page,
    pub permissions: Vec<PermissionWithSource>,
}
