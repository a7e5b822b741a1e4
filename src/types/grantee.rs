//! Grantee: the user, role or whole space a permission applies to.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{PermissionError, PermissionResult};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Grantee {
    User(String),
    Role(String),
    Space(String),
}

impl Grantee {
    /// Column values `(user_id, role_id, space_id)`; exactly one is set.
    pub fn columns(&self) -> (Option<&str>, Option<&str>, Option<&str>) {
        match self {
            Self::User(id) => (Some(id.as_str()), None, None),
            Self::Role(id) => (None, Some(id.as_str()), None),
            Self::Space(id) => (None, None, Some(id.as_str())),
        }
    }

    /// Rebuild a grantee from row columns.
    pub fn from_columns(
        user_id: Option<String>,
        role_id: Option<String>,
        space_id: Option<String>,
    ) -> PermissionResult<Self> {
        GranteeInput {
            user_id,
            role_id,
            space_id,
        }
        .into_grantee()
    }
}

impl fmt::Display for Grantee {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User(id) => write!(f, "user:{id}"),
            Self::Role(id) => write!(f, "role:{id}"),
            Self::Space(id) => write!(f, "space:{id}"),
        }
    }
}

/// Raw grantee fields as they arrive from callers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GranteeInput {
    pub user_id: Option<String>,
    pub role_id: Option<String>,
    pub space_id: Option<String>,
}

impl GranteeInput {
    pub fn user(id: impl Into<String>) -> Self {
        Self {
            user_id: Some(id.into()),
            ..Self::default()
        }
    }

    pub fn role(id: impl Into<String>) -> Self {
        Self {
            role_id: Some(id.into()),
            ..Self::default()
        }
    }

    pub fn space(id: impl Into<String>) -> Self {
        Self {
            space_id: Some(id.into()),
            ..Self::default()
        }
    }

    /// Validate that exactly one grantee field is present.
    pub fn into_grantee(self) -> PermissionResult<Grantee> {
        match (self.user_id, self.role_id, self.space_id) {
            (Some(id), None, None) => Ok(Grantee::User(id)),
            (None, Some(id), None) => Ok(Grantee::Role(id)),
            (None, None, Some(id)) => Ok(Grantee::Space(id)),
            (None, None, None) => Err(PermissionError::InvalidPermissionGrantee {
                reason: "no grantee provided".to_string(),
            }),
            _ => Err(PermissionError::InvalidPermissionGrantee {
                reason: "more than one of user_id, role_id, space_id provided".to_string(),
            }),
        }
    }
}

impl From<Grantee> for GranteeInput {
    fn from(grantee: Grantee) -> Self {
        match grantee {
            Grantee::User(id) => Self::user(id),
            Grantee::Role(id) => Self::role(id),
            Grantee::Space(id) => Self::space(id),
        }
    }
}
