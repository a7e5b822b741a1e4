//! Permission levels and the capabilities they grant.
//!
//! A level is either one of the fixed templates or an explicit custom
//! capability set. `capabilities()` is the single resolver for both.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{PermissionError, PermissionResult};

/// A single operation a grantee may perform on a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    Read,
    Comment,
    EditContent,
    EditPosition,
    Delete,
    EditPath,
    GrantPermissions,
}

impl Capability {
    pub const ALL: [Capability; 7] = [
        Capability::Read,
        Capability::Comment,
        Capability::EditContent,
        Capability::EditPosition,
        Capability::Delete,
        Capability::EditPath,
        Capability::GrantPermissions,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Comment => "comment",
            Self::EditContent => "edit_content",
            Self::EditPosition => "edit_position",
            Self::Delete => "delete",
            Self::EditPath => "edit_path",
            Self::GrantPermissions => "grant_permissions",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == name)
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub type CapabilitySet = BTreeSet<Capability>;

/// Named capability templates, in increasing order of access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateLevel {
    View,
    Comment,
    Edit,
    FullAccess,
}

impl TemplateLevel {
    pub const ALL: [TemplateLevel; 4] = [
        TemplateLevel::View,
        TemplateLevel::Comment,
        TemplateLevel::Edit,
        TemplateLevel::FullAccess,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Comment => "comment",
            Self::Edit => "edit",
            Self::FullAccess => "full_access",
        }
    }

    /// Fixed capability template. Each level is a strict superset of the one below it.
    pub fn capabilities(self) -> CapabilitySet {
        use Capability::*;

        let granted: &[Capability] = match self {
            Self::View => &[Read],
            Self::Comment => &[Read, Comment],
            Self::Edit => &[Read, Comment, EditContent, EditPosition, Delete],
            Self::FullAccess => &[
                Read,
                Comment,
                EditContent,
                EditPosition,
                Delete,
                EditPath,
                GrantPermissions,
            ],
        };
        granted.iter().copied().collect()
    }
}

/// Tagged union of template levels and explicit capability sets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionLevel {
    Template(TemplateLevel),
    Custom(CapabilitySet),
}

impl PermissionLevel {
    pub const CUSTOM: &'static str = "custom";

    /// Stored level name: one of the template names or `custom`.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Template(level) => level.as_str(),
            Self::Custom(_) => Self::CUSTOM,
        }
    }

    /// Capabilities granted by this level.
    pub fn capabilities(&self) -> CapabilitySet {
        match self {
            Self::Template(level) => level.capabilities(),
            Self::Custom(capabilities) => capabilities.clone(),
        }
    }

    /// Custom capabilities, empty for template levels.
    pub fn custom_capabilities(&self) -> Option<&CapabilitySet> {
        match self {
            Self::Template(_) => None,
            Self::Custom(capabilities) => Some(capabilities),
        }
    }

    /// Build a level from its stored name and custom capability names.
    ///
    /// Capability names are only read for `custom`; they are ignored for templates.
    pub fn parse<S: AsRef<str>>(name: &str, custom_capabilities: &[S]) -> PermissionResult<Self> {
        if name == Self::CUSTOM {
            let mut capabilities = CapabilitySet::new();
            for raw in custom_capabilities {
                let capability = Capability::parse(raw.as_ref()).ok_or_else(|| {
                    PermissionError::InvalidPermissionLevel {
                        level: format!("custom capability '{}'", raw.as_ref()),
                    }
                })?;
                capabilities.insert(capability);
            }
            return Ok(Self::Custom(capabilities));
        }

        TemplateLevel::ALL
            .into_iter()
            .find(|level| level.as_str() == name)
            .map(Self::Template)
            .ok_or_else(|| PermissionError::InvalidPermissionLevel {
                level: name.to_string(),
            })
    }
}

impl fmt::Display for PermissionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<TemplateLevel> for PermissionLevel {
    fn from(level: TemplateLevel) -> Self {
        Self::Template(level)
    }
}
