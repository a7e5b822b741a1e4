//! Permission rows and write inputs.

use serde::{Deserialize, Serialize};

use super::{Grantee, GranteeInput, PermissionLevel};

/// One stored grant. `inherited_from_permission = None` marks a Local row;
/// otherwise the row mirrors its source and must stay synchronized with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagePermission {
    pub id: String,
    pub page_id: String,
    pub grantee: Grantee,
    pub permission_level: PermissionLevel,
    pub inherited_from_permission: Option<String>,
}

impl PagePermission {
    pub fn is_local(&self) -> bool {
        self.inherited_from_permission.is_none()
    }

    pub fn is_inherited(&self) -> bool {
        self.inherited_from_permission.is_some()
    }

    /// The permission at the root of this row's lineage.
    pub fn lineage_root(&self) -> &str {
        self.inherited_from_permission.as_deref().unwrap_or(&self.id)
    }
}

/// A permission joined with the row it inherits from, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionWithSource {
    #[serde(flatten)]
    pub permission: PagePermission,
    pub source_permission: Option<PagePermission>,
}

impl std::ops::Deref for PermissionWithSource {
    type Target = PagePermission;

    fn deref(&self) -> &PagePermission {
        &self.permission
    }
}

/// Fields of a freshly granted permission, unvalidated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreshPermission {
    pub page_id: String,
    #[serde(flatten)]
    pub grantee: GranteeInput,
    pub permission_level: String,
    #[serde(default)]
    pub custom_capabilities: Vec<String>,
}

/// Input of `create_permission`: a fresh grant or a copy of an existing one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PermissionInput {
    Inherited {
        page_id: String,
        inherited_from_permission: String,
    },
    Fresh(FreshPermission),
}

impl PermissionInput {
    /// Fresh grant of a named level.
    pub fn fresh(
        page_id: impl Into<String>,
        grantee: GranteeInput,
        permission_level: impl Into<String>,
    ) -> Self {
        Self::Fresh(FreshPermission {
            page_id: page_id.into(),
            grantee,
            permission_level: permission_level.into(),
            custom_capabilities: Vec::new(),
        })
    }

    /// Fresh grant of an explicit capability set.
    pub fn custom<I, S>(page_id: impl Into<String>, grantee: GranteeInput, capabilities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Fresh(FreshPermission {
            page_id: page_id.into(),
            grantee,
            permission_level: PermissionLevel::CUSTOM.to_string(),
            custom_capabilities: capabilities.into_iter().map(Into::into).collect(),
        })
    }

    /// Copy of an existing permission onto `page_id`.
    pub fn inherited(page_id: impl Into<String>, source_permission_id: impl Into<String>) -> Self {
        Self::Inherited {
            page_id: page_id.into(),
            inherited_from_permission: source_permission_id.into(),
        }
    }

    pub fn page_id(&self) -> &str {
        match self {
            Self::Inherited { page_id, .. } => page_id,
            Self::Fresh(fresh) => &fresh.page_id,
        }
    }
}
