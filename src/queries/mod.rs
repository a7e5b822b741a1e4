//! Query modules: plain functions over a `&Connection`, composable inside one transaction.

pub mod event_ops;
pub mod page_ops;
pub mod permission_ops;

pub use event_ops::PermissionEventRow;
