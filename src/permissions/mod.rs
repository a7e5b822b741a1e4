//! The inheritance engine proper.
//!
//! - `store`: validated upsert by `(page_id, grantee)`, cascading delete
//! - `validation`: two-hop inheritance link check
//! - `comparator`: capability sets and permission-set coverage
//! - `cascade`: planned dependent-row changes, applied as one batch
//! - `propagation`: `create` plus its re-sourcing and value cascades
//! - `break_inheritance`: localize a page, re-root the pages below
//! - `copier`: copy a page's permissions onto a page or subtree below it
//!
//! Every function takes the connection it runs on; callers wrap write
//! operations in one transaction.

pub mod break_inheritance;
pub mod cascade;
pub mod comparator;
pub mod copier;
pub mod propagation;
pub mod store;
pub mod validation;

pub use break_inheritance::{break_inheritance, BrokenInheritance, Relocalized};
pub use comparator::{can_inherit_from_parent, capabilities_of, has_full_set_of_base_permissions};
pub use copier::{inherit_across_subtree, inherit_from, setup_after_page_created, CopyStats};
pub use propagation::{create_permission, Propagated};
