//! Errors raised by the transformation and history stores.

use std::path::PathBuf;
use thiserror::Error;

use super::migrations::Schema;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// The directory holding a database file could not be created.
    #[error("Cannot create the {schema} database directory '{path}': {source}")]
    DataDirectory {
        schema: Schema,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Migration failed at version {version}: {reason}")]
    Migration { version: u32, reason: String },

    #[error("Database lock poisoned")]
    LockPoisoned,
}
