//! Schema SQL constants used by migrations.rs.

/// V1 schema: mirrored page tree, permission rows, audit log.
///
/// The `(page_id, grantee)` unique key is split across three partial indexes,
/// one per grantee column; the CHECK guarantees exactly one column is set.
pub const PERMISSION_TABLES_V1: &str = "
    CREATE TABLE IF NOT EXISTS pages (
        id TEXT PRIMARY KEY NOT NULL,
        parent_id TEXT REFERENCES pages(id) ON DELETE CASCADE,
        space_id TEXT NOT NULL
    ) STRICT;

    CREATE TABLE IF NOT EXISTS page_permissions (
        id TEXT PRIMARY KEY NOT NULL,
        page_id TEXT NOT NULL REFERENCES pages(id) ON DELETE CASCADE,
        user_id TEXT,
        role_id TEXT,
        space_id TEXT,
        permission_level TEXT NOT NULL,
        custom_capabilities TEXT NOT NULL DEFAULT '[]',
        inherited_from_permission TEXT REFERENCES page_permissions(id) ON DELETE CASCADE,
        CHECK ((user_id IS NOT NULL) + (role_id IS NOT NULL) + (space_id IS NOT NULL) = 1)
    ) STRICT;

    CREATE TABLE IF NOT EXISTS permission_events (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        kind TEXT NOT NULL,
        page_id TEXT NOT NULL,
        permission_id TEXT,
        affected_rows INTEGER NOT NULL DEFAULT 0,
        recorded_at TEXT NOT NULL
    ) STRICT;

    CREATE INDEX IF NOT EXISTS idx_pages_parent ON pages(parent_id);
    CREATE INDEX IF NOT EXISTS idx_pages_space ON pages(space_id);
    CREATE INDEX IF NOT EXISTS idx_permissions_page ON page_permissions(page_id);
    CREATE INDEX IF NOT EXISTS idx_permissions_source ON page_permissions(inherited_from_permission);
    CREATE UNIQUE INDEX IF NOT EXISTS uq_permissions_page_user
        ON page_permissions(page_id, user_id) WHERE user_id IS NOT NULL;
    CREATE UNIQUE INDEX IF NOT EXISTS uq_permissions_page_role
        ON page_permissions(page_id, role_id) WHERE role_id IS NOT NULL;
    CREATE UNIQUE INDEX IF NOT EXISTS uq_permissions_page_space
        ON page_permissions(page_id, space_id) WHERE space_id IS NOT NULL;
    CREATE INDEX IF NOT EXISTS idx_events_page ON permission_events(page_id);
";

/// All engine table names.
pub const PERMISSION_TABLE_NAMES: [&str; 3] = ["pages", "page_permissions", "permission_events"];
