use qis_core::ServiceError;
use qis_sql::SQLStore;

/// SQL DDL statements to initialize the inspection database schema.
///
/// Each entity table stores the full JSON document in a `data` TEXT column,
/// with indexed columns extracted for filtering, joins and uniqueness.
/// Association tables (batch_categories, item_levels) carry only the two
/// foreign keys.
const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS hospitals (
        id TEXT PRIMARY KEY,
        data TEXT NOT NULL,
        name TEXT,
        deleted INTEGER NOT NULL DEFAULT 0,
        create_at TEXT,
        update_at TEXT
    )",
    "CREATE TABLE IF NOT EXISTS categories (
        id TEXT PRIMARY KEY,
        data TEXT NOT NULL,
        name TEXT,
        deleted INTEGER NOT NULL DEFAULT 0,
        create_at TEXT,
        update_at TEXT
    )",
    "CREATE TABLE IF NOT EXISTS regions (
        id TEXT PRIMARY KEY,
        data TEXT NOT NULL,
        name TEXT,
        category_id TEXT,
        deleted INTEGER NOT NULL DEFAULT 0,
        create_at TEXT,
        update_at TEXT
    )",
    "CREATE TABLE IF NOT EXISTS items (
        id TEXT PRIMARY KEY,
        data TEXT NOT NULL,
        name TEXT,
        region_id TEXT,
        score INTEGER,
        deleted INTEGER NOT NULL DEFAULT 0,
        create_at TEXT,
        update_at TEXT
    )",
    "CREATE TABLE IF NOT EXISTS score_levels (
        id TEXT PRIMARY KEY,
        data TEXT NOT NULL,
        name TEXT,
        lower_bound INTEGER,
        upper_bound INTEGER,
        deleted INTEGER NOT NULL DEFAULT 0,
        create_at TEXT,
        update_at TEXT
    )",
    "CREATE TABLE IF NOT EXISTS item_levels (
        item_id TEXT NOT NULL,
        level_id TEXT NOT NULL,
        PRIMARY KEY (item_id, level_id)
    )",
    "CREATE TABLE IF NOT EXISTS batches (
        id TEXT PRIMARY KEY,
        data TEXT NOT NULL,
        name TEXT,
        hospital_id TEXT,
        status INTEGER NOT NULL DEFAULT 0,
        deleted INTEGER NOT NULL DEFAULT 0,
        create_at TEXT,
        update_at TEXT
    )",
    "CREATE TABLE IF NOT EXISTS batch_categories (
        batch_id TEXT NOT NULL,
        category_id TEXT NOT NULL,
        PRIMARY KEY (batch_id, category_id)
    )",
    "CREATE TABLE IF NOT EXISTS scores (
        id TEXT PRIMARY KEY,
        data TEXT NOT NULL,
        batch_id TEXT NOT NULL,
        item_id TEXT NOT NULL,
        user_id TEXT,
        value INTEGER,
        deleted INTEGER NOT NULL DEFAULT 0,
        date TEXT,
        update_at TEXT
    )",
    // One live score per (batch, item). The partial index is the final
    // arbiter when concurrent creates race past the application check.
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_scores_batch_item
        ON scores(batch_id, item_id) WHERE deleted = 0",
    // Indexes
    "CREATE INDEX IF NOT EXISTS idx_regions_category ON regions(category_id)",
    "CREATE INDEX IF NOT EXISTS idx_items_region ON items(region_id)",
    "CREATE INDEX IF NOT EXISTS idx_item_levels_item ON item_levels(item_id)",
    "CREATE INDEX IF NOT EXISTS idx_batches_hospital ON batches(hospital_id)",
    "CREATE INDEX IF NOT EXISTS idx_batches_status ON batches(status)",
    "CREATE INDEX IF NOT EXISTS idx_scores_batch ON scores(batch_id)",
    "CREATE INDEX IF NOT EXISTS idx_scores_item ON scores(item_id)",
    "CREATE INDEX IF NOT EXISTS idx_bc_category ON batch_categories(category_id)",
];

pub fn init_schema(sql: &dyn SQLStore) -> Result<(), ServiceError> {
    for stmt in SCHEMA {
        sql.exec(stmt, &[])
            .map_err(|e| ServiceError::Storage(format!("schema init failed: {}", e)))?;
    }
    Ok(())
}
