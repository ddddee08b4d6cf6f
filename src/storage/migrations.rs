//! Versioned schema migrations for SqliteStore.
//!
//! The applied version is tracked in the `meta` table under
//! `schema_version`. Each migration runs exactly once.

use rusqlite::Connection;

use crate::error::{Result, StallError};

/// Current schema version. Increment when adding new migrations.
pub const CURRENT_SCHEMA_VERSION: u32 = 2;

type MigrationFn = fn(&Connection) -> Result<()>;

/// All migrations in order. Index + 1 = version number.
const MIGRATIONS: &[MigrationFn] = &[migration_v1_kv_table, migration_v2_updated_at];

/// Runs all pending migrations on the database.
pub fn run_migrations(conn: &Connection) -> Result<()> {
    let current_version = get_schema_version(conn)?;

    if current_version > CURRENT_SCHEMA_VERSION {
        return Err(StallError::Storage(format!(
            "database schema version {} is newer than this binary ({})",
            current_version, CURRENT_SCHEMA_VERSION
        )));
    }

    for (idx, migration) in MIGRATIONS.iter().enumerate() {
        let version = (idx + 1) as u32;
        if version > current_version {
            tracing::debug!("Applying schema migration v{}", version);
            migration(conn)?;
            set_schema_version(conn, version)?;
        }
    }

    Ok(())
}

/// Gets the current schema version, 0 for a fresh database.
pub fn get_schema_version(conn: &Connection) -> Result<u32> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS meta (key TEXT PRIMARY KEY, value TEXT NOT NULL)",
        [],
    )?;

    let version: Option<String> = conn
        .query_row(
            "SELECT value FROM meta WHERE key = 'schema_version'",
            [],
            |row| row.get(0),
        )
        .ok();

    match version {
        Some(v) => v
            .parse()
            .map_err(|_| StallError::Storage(format!("invalid schema_version '{}'", v))),
        None => Ok(0),
    }
}

fn set_schema_version(conn: &Connection, version: u32) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO meta (key, value) VALUES ('schema_version', ?1)",
        [version.to_string()],
    )?;
    Ok(())
}

fn column_exists(conn: &Connection, table: &str, column: &str) -> Result<bool> {
    let count: i64 = conn.query_row(
        &format!(
            "SELECT COUNT(*) FROM pragma_table_info('{}') WHERE name = ?1",
            table
        ),
        [column],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

// ============================================================================
// Migrations
// ============================================================================

/// V1: one row per collection key.
fn migration_v1_kv_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS kv (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

/// V2: last write time per key, unix seconds.
fn migration_v2_updated_at(conn: &Connection) -> Result<()> {
    if !column_exists(conn, "kv", "updated_at")? {
        conn.execute_batch("ALTER TABLE kv ADD COLUMN updated_at INTEGER NOT NULL DEFAULT 0;")?;
    }
    Ok(())
}
