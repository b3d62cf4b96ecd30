//! SQL DDL for initializing the database schema.
//! SQLite-first design; can be adapted for other RDBMS.

/// Single key-value table. Collections are JSON-serialized whole under
/// fixed keys; every write replaces the value in place.
pub const SQLITE_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS kv_store (
    key TEXT PRIMARY KEY NOT NULL,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL -- RFC3339
);
"#;

/// Fixed storage key for the whole project collection.
pub const PROJECTS_KEY: &str = "promptdock-projects";

/// Fixed storage key for the active project id.
pub const ACTIVE_PROJECT_KEY: &str = "promptdock-active-project";

/// Fixed storage key for the model-configuration collection.
pub const MODEL_CONFIGS_KEY: &str = "promptdock-model-configs";
