//! Database migration system.
//!
//! Tracks applied migrations in a `_migrations` table and applies pending
//! ones in order. Versions are unique across schemas so a single file may
//! host both the transformations and the history tables.

use std::fmt;

use rusqlite::{params, Connection};

use super::error::DatabaseError;

/// A single migration definition.
struct Migration {
    version: u32,
    description: &'static str,
    sql: &'static str,
}

/// Which set of tables a database file holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schema {
    /// The `transformations` job table.
    Transformations,
    /// The `transformation_history` audit table.
    History,
}

const TRANSFORMATION_MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    description: "create_transformations_table",
    sql: include_str!("sql/001_create_transformations.sql"),
}];

const HISTORY_MIGRATIONS: &[Migration] = &[Migration {
    version: 2,
    description: "create_transformation_history_table",
    sql: include_str!("sql/002_create_transformation_history.sql"),
}];

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Schema::Transformations => f.write_str("transformations"),
            Schema::History => f.write_str("history"),
        }
    }
}

impl Schema {
    fn migrations(self) -> &'static [Migration] {
        match self {
            Schema::Transformations => TRANSFORMATION_MIGRATIONS,
            Schema::History => HISTORY_MIGRATIONS,
        }
    }
}

/// Runs all pending migrations of `schema` on the given connection.
pub fn run_all(conn: &Connection, schema: Schema) -> Result<(), DatabaseError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS _migrations (
            version INTEGER PRIMARY KEY,
            description TEXT NOT NULL,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );",
    )?;

    for migration in schema.migrations() {
        if is_applied(conn, migration.version)? {
            continue;
        }

        log::info!(
            "Running migration v{}: {}",
            migration.version,
            migration.description
        );

        conn.execute_batch(migration.sql)
            .map_err(|e| DatabaseError::Migration {
                version: migration.version,
                reason: e.to_string(),
            })?;

        conn.execute(
            "INSERT INTO _migrations (version, description) VALUES (?1, ?2)",
            params![migration.version, migration.description],
        )?;
    }

    Ok(())
}

fn is_applied(conn: &Connection, version: u32) -> Result<bool, DatabaseError> {
    let count: u32 = conn.query_row(
        "SELECT COUNT(*) FROM _migrations WHERE version = ?1",
        params![version],
        |r| r.get(0),
    )?;
    Ok(count > 0)
}
