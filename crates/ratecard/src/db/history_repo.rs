//! History repository: append-only audit rows in `transformation_history`.

use rusqlite::{params, Row};

use super::{Database, DatabaseError};

/// A raw history row from the database.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryRow {
    pub id: i64,
    pub transformation_id: String,
    pub status: String,
    pub carrier: Option<String>,
    pub trade_lane: Option<String>,
    pub timestamp: String,
    pub details: Option<String>,
    pub file_names: Option<String>,
}

impl HistoryRow {
    fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get("id")?,
            transformation_id: row.get("transformation_id")?,
            status: row.get("status")?,
            carrier: row.get("carrier")?,
            trade_lane: row.get("trade_lane")?,
            timestamp: row.get("timestamp")?,
            details: row.get("details")?,
            file_names: row.get("file_names")?,
        })
    }
}

/// Columns of a new history row; `id` is assigned by SQLite.
#[derive(Debug, Clone)]
pub struct NewHistoryRow<'a> {
    pub transformation_id: &'a str,
    pub status: &'a str,
    pub carrier: Option<&'a str>,
    pub trade_lane: Option<&'a str>,
    pub timestamp: &'a str,
    pub details: Option<&'a str>,
    pub file_names: Option<&'a str>,
}

/// Appends a row and returns its auto-incremented id.
pub fn insert(db: &Database, row: &NewHistoryRow<'_>) -> Result<i64, DatabaseError> {
    db.with_conn(|conn| {
        conn.execute(
            "INSERT INTO transformation_history (transformation_id, status, carrier, trade_lane,
             timestamp, details, file_names)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                row.transformation_id,
                row.status,
                row.carrier,
                row.trade_lane,
                row.timestamp,
                row.details,
                row.file_names,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    })
}

/// All rows for one transformation, oldest first.
pub fn find_by_transformation(
    db: &Database,
    transformation_id: &str,
) -> Result<Vec<HistoryRow>, DatabaseError> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare(
            "SELECT * FROM transformation_history WHERE transformation_id = ?1 ORDER BY id",
        )?;
        let rows = stmt
            .query_map(params![transformation_id], HistoryRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    })
}
