use rusqlite::{Connection, Result};
use std::collections::HashMap;

/// Current database schema version
const CURRENT_VERSION: u32 = 4;

/// Migration system for managing database schema versions
pub struct MigrationManager;

impl MigrationManager {
    /// Initialize the database with the current schema
    /// This creates the schema_version table and applies all migrations
    pub fn initialize(conn: &Connection) -> Result<()> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS schema_version (
                version INTEGER PRIMARY KEY
            )",
            [],
        )?;

        let current_version = Self::get_version(conn).unwrap_or(0);

        for version in (current_version + 1)..=CURRENT_VERSION {
            Self::apply_migration(conn, version)?;
        }

        Ok(())
    }

    /// Apply a specific migration by version number
    fn apply_migration(conn: &Connection, version: u32) -> Result<()> {
        let migrations = get_migrations();
        if let Some(migration) = migrations.get(&version) {
            let tx = conn.unchecked_transaction()?;
            migration(&tx)?;
            tx.execute(
                "INSERT INTO schema_version (version) VALUES (?1)",
                [version],
            )?;
            tx.commit()?;
            log::debug!("Applied schema migration v{}", version);
            Ok(())
        } else {
            Err(rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_MISUSE),
                Some(format!("No migration found for version {}", version)),
            ))
        }
    }

    /// Get the current schema version
    pub fn get_version(conn: &Connection) -> Result<u32> {
        conn.query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_version",
            [],
            |row| row.get(0),
        )
    }
}

type Migration = fn(&rusqlite::Transaction) -> Result<(), rusqlite::Error>;

/// Get all migrations indexed by version
fn get_migrations() -> HashMap<u32, Migration> {
    let mut migrations: HashMap<u32, Migration> = HashMap::new();
    migrations.insert(1, migration_v1);
    migrations.insert(2, migration_v2);
    migrations.insert(3, migration_v3);
    migrations.insert(4, migration_v4);
    migrations
}

/// Migration v1: boards, pipelines, stages and deals
fn migration_v1(tx: &rusqlite::Transaction) -> Result<(), rusqlite::Error> {
    tx.execute(
        "CREATE TABLE boards (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            user_id TEXT NULL,
            created_ts INTEGER NOT NULL,
            modified_ts INTEGER NOT NULL
        )",
        [],
    )?;

    // No ON DELETE action: a board that still owns pipelines cannot be removed.
    tx.execute(
        "CREATE TABLE pipelines (
            id TEXT PRIMARY KEY,
            board_id TEXT NOT NULL REFERENCES boards(id),
            name TEXT NOT NULL,
            status TEXT NOT NULL CHECK(status IN ('active','archived')),
            visibility TEXT NOT NULL CHECK(visibility IN ('public','private')),
            bg_color TEXT NULL,
            start_date INTEGER NULL,
            end_date INTEGER NULL,
            metric TEXT NULL,
            hack_scoring_type TEXT NULL,
            is_check_date INTEGER NOT NULL DEFAULT 0,
            is_check_user INTEGER NOT NULL DEFAULT 0,
            is_check_department INTEGER NOT NULL DEFAULT 0,
            number_config TEXT NULL,
            number_size TEXT NULL,
            name_config TEXT NULL,
            sort_order INTEGER NOT NULL DEFAULT 0,
            user_id TEXT NULL,
            created_ts INTEGER NOT NULL,
            modified_ts INTEGER NOT NULL
        )",
        [],
    )?;
    tx.execute(
        "CREATE INDEX idx_pipelines_board_id ON pipelines(board_id)",
        [],
    )?;

    tx.execute(
        "CREATE TABLE stages (
            id TEXT PRIMARY KEY,
            pipeline_id TEXT NOT NULL REFERENCES pipelines(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            probability TEXT NULL,
            status TEXT NOT NULL CHECK(status IN ('active','archived')),
            sort_order INTEGER NOT NULL DEFAULT 0,
            created_ts INTEGER NOT NULL,
            modified_ts INTEGER NOT NULL
        )",
        [],
    )?;
    tx.execute(
        "CREATE INDEX idx_stages_pipeline_id ON stages(pipeline_id)",
        [],
    )?;

    tx.execute(
        "CREATE TABLE deals (
            id TEXT PRIMARY KEY,
            stage_id TEXT NOT NULL REFERENCES stages(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            time_track_status TEXT NULL
                CHECK(time_track_status IN ('started','stopped','paused','completed')),
            time_spent INTEGER NULL,
            time_track_start_ts INTEGER NULL,
            created_ts INTEGER NOT NULL,
            modified_ts INTEGER NOT NULL
        )",
        [],
    )?;
    tx.execute(
        "CREATE INDEX idx_deals_stage_id ON deals(stage_id)",
        [],
    )?;

    Ok(())
}

/// Migration v2: templates and template categories
fn migration_v2(tx: &rusqlite::Transaction) -> Result<(), rusqlite::Error> {
    tx.execute(
        "CREATE TABLE templates (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            content TEXT NOT NULL,
            content_type TEXT NULL,
            plugin_type TEXT NULL,
            description TEXT NULL,
            category TEXT NULL,
            status TEXT NOT NULL DEFAULT 'active' CHECK(status IN ('active','inactive')),
            created_by TEXT NULL,
            updated_by TEXT NULL,
            created_ts INTEGER NOT NULL,
            modified_ts INTEGER NOT NULL
        )",
        [],
    )?;
    tx.execute(
        "CREATE INDEX idx_templates_status_created ON templates(status, created_ts)",
        [],
    )?;
    tx.execute(
        "CREATE INDEX idx_templates_created_by ON templates(created_by, status)",
        [],
    )?;

    tx.execute(
        "CREATE TABLE template_categories (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            code TEXT NOT NULL UNIQUE,
            parent_id TEXT NULL REFERENCES template_categories(id),
            content_type TEXT NOT NULL,
            sort_order TEXT NULL,
            status TEXT NOT NULL DEFAULT 'active' CHECK(status IN ('active','inactive')),
            created_by TEXT NULL,
            updated_by TEXT NULL,
            created_ts INTEGER NOT NULL,
            modified_ts INTEGER NOT NULL
        )",
        [],
    )?;
    tx.execute(
        "CREATE INDEX idx_template_categories_parent ON template_categories(parent_id)",
        [],
    )?;

    Ok(())
}

/// Migration v3: field groups owned by the core service
fn migration_v3(tx: &rusqlite::Transaction) -> Result<(), rusqlite::Error> {
    // board_ids_json / pipeline_ids_json store JSON arrays of identifiers
    tx.execute(
        "CREATE TABLE field_groups (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            board_ids_json TEXT NOT NULL DEFAULT '[]',
            pipeline_ids_json TEXT NOT NULL DEFAULT '[]',
            created_ts INTEGER NOT NULL,
            modified_ts INTEGER NOT NULL
        )",
        [],
    )?;

    Ok(())
}

/// Migration v4: pipeline watchers
fn migration_v4(tx: &rusqlite::Transaction) -> Result<(), rusqlite::Error> {
    tx.execute(
        "ALTER TABLE pipelines ADD COLUMN watched_user_ids_json TEXT NOT NULL DEFAULT '[]'",
        [],
    )?;

    Ok(())
}
