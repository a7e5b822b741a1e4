//! Shared data structures: pages, grantees, levels, permission rows.

mod grantee;
mod level;
mod page;
mod permission;

pub use grantee::{Grantee, GranteeInput};
pub use level::{Capability, CapabilitySet, PermissionLevel, TemplateLevel};
pub use page::{Page, PageWithPermissions};
pub use permission::{FreshPermission, PagePermission, PermissionInput, PermissionWithSource};
