//! SQLite storage: connection pool, PRAGMAs, schema, migrations.

pub mod migrations;
pub mod pool;
pub mod pragmas;
pub mod schema;

pub use migrations::migrate;
pub use pool::ConnectionPool;
pub use pragmas::{configure_connection, configure_readonly_connection};
pub use schema::PERMISSION_TABLE_NAMES;
