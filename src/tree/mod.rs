//! Page tree resolution.

pub mod resolver;

pub use resolver::{is_ancestor, resolve_ancestors, resolve_descendants};
