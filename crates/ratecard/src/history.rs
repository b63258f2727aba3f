//! Audit trail of transformation events.
//!
//! The service only depends on the [`HistoryLogger`] trait; failures are
//! logged by the caller and never block job creation.

use chrono::{DateTime, Utc};

use crate::db::history_repo::{self, HistoryRow, NewHistoryRow};
use crate::db::timestamp::{format_timestamp, now};
use crate::db::{Database, DatabaseError};
use crate::model::{FileNames, TransformationStatus};

/// One audit event.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub transformation_id: String,
    pub status: TransformationStatus,
    pub carrier: String,
    pub trade_lane: String,
    pub file_names: FileNames,
    pub created_at: DateTime<Utc>,
}

pub trait HistoryLogger: Send + Sync {
    /// Appends an entry and returns its history id.
    fn log_event(&self, entry: &HistoryEntry) -> Result<i64, DatabaseError>;
}

/// History logger writing to the `transformation_history` table of its own database.
#[derive(Clone)]
pub struct SqliteHistoryLogger {
    db: Database,
}

impl SqliteHistoryLogger {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn entries(&self, transformation_id: &str) -> Result<Vec<HistoryRow>, DatabaseError> {
        history_repo::find_by_transformation(&self.db, transformation_id)
    }
}

impl HistoryLogger for SqliteHistoryLogger {
    fn log_event(&self, entry: &HistoryEntry) -> Result<i64, DatabaseError> {
        let timestamp = format_timestamp(now());
        let details = serde_json::json!({ "created_at": format_timestamp(entry.created_at) })
            .to_string();
        let file_names = serde_json::to_string(&entry.file_names).ok();

        history_repo::insert(
            &self.db,
            &NewHistoryRow {
                transformation_id: &entry.transformation_id,
                status: entry.status.as_str(),
                carrier: Some(&entry.carrier),
                trade_lane: Some(&entry.trade_lane),
                timestamp: &timestamp,
                details: Some(&details),
                file_names: file_names.as_deref(),
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Schema;
    use chrono::TimeZone;

    #[test]
    fn test_log_event_persists_entry() {
        let logger =
            SqliteHistoryLogger::new(Database::open_in_memory(Schema::History).unwrap());
        let entry = HistoryEntry {
            transformation_id: "t-1".into(),
            status: TransformationStatus::SentToDmp,
            carrier: "MSC".into(),
            trade_lane: "EU-US".into(),
            file_names: FileNames {
                xlsx_name: "rates.xlsx".into(),
                docx_name: "sop.docx".into(),
            },
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap(),
        };

        let id = logger.log_event(&entry).unwrap();
        let rows = logger.entries("t-1").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, id);
        assert_eq!(rows[0].status, "SENT_TO_DMP");
        assert_eq!(rows[0].carrier.as_deref(), Some("MSC"));

        let file_names: FileNames =
            serde_json::from_str(rows[0].file_names.as_deref().unwrap()).unwrap();
        assert_eq!(file_names, entry.file_names);

        let details: serde_json::Value =
            serde_json::from_str(rows[0].details.as_deref().unwrap()).unwrap();
        assert_eq!(details["created_at"], "2024-01-01T08:00:00.000000Z");
    }
}
