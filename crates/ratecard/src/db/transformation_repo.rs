//! Transformation repository: persistence and paged queries for the
//! `transformations` table.

use chrono::NaiveDate;
use rusqlite::types::ToSql;
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::timestamp::{end_of_day, normalize_cursor, start_of_day};
use super::{Database, DatabaseError};
use crate::model::{decode_payload, encode_payload, StatusDetails, TransformationInput};
use crate::model::{TransformationStatus, PAYLOAD_SCHEMA_VERSION};

/// A raw transformation row from the database.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformationRow {
    pub id: String,
    pub created_at: String,
    pub updated_at: String,
    pub status: String,
    pub carrier: String,
    pub trade_lane: String,
    pub xlsx_name: String,
    pub docx_name: String,
    pub xlsx_uri: Option<String>,
    pub docx_uri: Option<String>,
    pub payload_version: Option<u32>,
    pub transformation_data: Option<String>,
    pub progress: i64,
    pub message: Option<String>,
    pub upload_complete: bool,
    pub processing: bool,
    pub review: bool,
    pub ready_to_publish: bool,
}

impl TransformationRow {
    fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get("id")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
            status: row.get("status")?,
            carrier: row.get("carrier")?,
            trade_lane: row.get("trade_lane")?,
            xlsx_name: row.get("xlsx_name")?,
            docx_name: row.get("docx_name")?,
            xlsx_uri: row.get("xlsx_uri")?,
            docx_uri: row.get("docx_uri")?,
            payload_version: row.get("payload_version")?,
            transformation_data: row.get("transformation_data")?,
            progress: row.get("progress")?,
            message: row.get("message")?,
            upload_complete: row.get("upload_complete")?,
            processing: row.get("processing")?,
            review: row.get("review")?,
            ready_to_publish: row.get("ready_to_publish")?,
        })
    }

    /// Stores `input` in the versioned payload column.
    pub fn set_transformation_data(
        &mut self,
        input: &TransformationInput,
    ) -> Result<(), serde_json::Error> {
        self.transformation_data = Some(encode_payload(input)?);
        self.payload_version = Some(PAYLOAD_SCHEMA_VERSION);
        Ok(())
    }

    /// Decodes the stored payload; `None` when absent or corrupted.
    pub fn transformation_data(&self) -> Option<TransformationInput> {
        let blob = self.transformation_data.as_deref()?;
        let decoded = decode_payload(blob);
        if decoded.is_none() {
            log::warn!("Transformation {} has an unreadable payload", self.id);
        }
        decoded
    }

    pub fn status_details(&self) -> StatusDetails {
        StatusDetails {
            upload_complete: self.upload_complete,
            processing: self.processing,
            review: self.review,
            ready_to_publish: self.ready_to_publish,
        }
    }

    pub fn set_status_details(&mut self, details: StatusDetails) {
        self.upload_complete = details.upload_complete;
        self.processing = details.processing;
        self.review = details.review;
        self.ready_to_publish = details.ready_to_publish;
    }
}

/// Conjunctive filter for listing. Empty sets impose no constraint.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TransformationFilter {
    pub date_start: Option<NaiveDate>,
    pub date_end: Option<NaiveDate>,
    pub carriers: Vec<String>,
    pub trade_lanes: Vec<String>,
    pub statuses: Vec<TransformationStatus>,
}

/// One page of rows plus the cursor for the next page.
#[derive(Debug, Clone)]
pub struct RowPage {
    pub rows: Vec<TransformationRow>,
    pub next_cursor: Option<String>,
}

/// Inserts a new row inside its own transaction.
pub fn insert(db: &Database, row: &TransformationRow) -> Result<(), DatabaseError> {
    db.with_transaction(|tx| insert_with(tx, row))
}

/// Inserts a new row on an existing connection or transaction.
pub fn insert_with(conn: &Connection, row: &TransformationRow) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO transformations (id, created_at, updated_at, status, carrier, trade_lane,
         xlsx_name, docx_name, xlsx_uri, docx_uri, payload_version, transformation_data,
         progress, message, upload_complete, processing, review, ready_to_publish)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)",
        params![
            row.id,
            row.created_at,
            row.updated_at,
            row.status,
            row.carrier,
            row.trade_lane,
            row.xlsx_name,
            row.docx_name,
            row.xlsx_uri,
            row.docx_uri,
            row.payload_version,
            row.transformation_data,
            row.progress,
            row.message,
            row.upload_complete,
            row.processing,
            row.review,
            row.ready_to_publish,
        ],
    )?;
    Ok(())
}

/// Finds a row by its ID.
pub fn find_by_id(db: &Database, id: &str) -> Result<Option<TransformationRow>, DatabaseError> {
    db.with_conn(|conn| {
        let row = conn
            .query_row(
                "SELECT * FROM transformations WHERE id = ?1",
                params![id],
                TransformationRow::from_row,
            )
            .optional()?;
        Ok(row)
    })
}

/// Fetches one page, newest first.
///
/// `cursor` is an exclusive upper bound on `created_at`; an unparsable
/// cursor is ignored. `limit + 1` rows are read so the presence of a further
/// page is known without a count query.
pub fn query_page(
    db: &Database,
    filter: &TransformationFilter,
    cursor: Option<&str>,
    limit: u32,
) -> Result<RowPage, DatabaseError> {
    let mut conditions = Vec::new();
    let mut param_values: Vec<Box<dyn ToSql>> = Vec::new();

    if let Some(start) = filter.date_start {
        conditions.push(format!("created_at >= ?{}", param_values.len() + 1));
        param_values.push(Box::new(start_of_day(start)));
    }
    if let Some(end) = filter.date_end {
        conditions.push(format!("created_at <= ?{}", param_values.len() + 1));
        param_values.push(Box::new(end_of_day(end)));
    }
    push_in_condition(
        &mut conditions,
        &mut param_values,
        "carrier",
        filter.carriers.iter().cloned(),
    );
    push_in_condition(
        &mut conditions,
        &mut param_values,
        "trade_lane",
        filter.trade_lanes.iter().cloned(),
    );
    push_in_condition(
        &mut conditions,
        &mut param_values,
        "status",
        filter.statuses.iter().map(|s| s.as_str().to_string()),
    );

    if let Some(raw) = cursor {
        match normalize_cursor(raw) {
            Some(bound) => {
                conditions.push(format!("created_at < ?{}", param_values.len() + 1));
                param_values.push(Box::new(bound));
            }
            None => log::debug!("Ignoring unparsable pagination cursor '{}'", raw),
        }
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    param_values.push(Box::new(i64::from(limit) + 1));
    let query_sql = format!(
        "SELECT * FROM transformations {} ORDER BY created_at DESC, id DESC LIMIT ?{}",
        where_clause,
        param_values.len()
    );

    db.with_conn(|conn| {
        let params_ref: Vec<&dyn ToSql> = param_values.iter().map(|p| p.as_ref()).collect();
        let mut stmt = conn.prepare(&query_sql)?;
        let mut rows: Vec<TransformationRow> = stmt
            .query_map(params_ref.as_slice(), TransformationRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        let next_cursor = if rows.len() > limit as usize {
            rows.truncate(limit as usize);
            rows.last().map(|row| row.created_at.clone())
        } else {
            None
        };

        Ok(RowPage { rows, next_cursor })
    })
}

fn push_in_condition(
    conditions: &mut Vec<String>,
    param_values: &mut Vec<Box<dyn ToSql>>,
    column: &str,
    values: impl Iterator<Item = String>,
) {
    let mut placeholders = Vec::new();
    for value in values {
        param_values.push(Box::new(value));
        placeholders.push(format!("?{}", param_values.len()));
    }
    if !placeholders.is_empty() {
        conditions.push(format!("{} IN ({})", column, placeholders.join(", ")));
    }
}

/// Every distinct trade lane, sorted.
pub fn distinct_trade_lanes(db: &Database) -> Result<Vec<String>, DatabaseError> {
    db.with_conn(|conn| {
        let mut stmt =
            conn.prepare("SELECT DISTINCT trade_lane FROM transformations ORDER BY trade_lane")?;
        let lanes = stmt
            .query_map([], |r| r.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(lanes)
    })
}

/// Updates the mutable processing fields. Returns `false` when no row has `id`.
pub fn update_progress(
    db: &Database,
    id: &str,
    status: TransformationStatus,
    progress: u8,
    message: Option<&str>,
    details: StatusDetails,
    updated_at: &str,
) -> Result<bool, DatabaseError> {
    db.with_transaction(|tx| {
        let changed = tx.execute(
            "UPDATE transformations SET status = ?2, progress = ?3, message = ?4,
             upload_complete = ?5, processing = ?6, review = ?7, ready_to_publish = ?8,
             updated_at = ?9
             WHERE id = ?1",
            params![
                id,
                status.as_str(),
                progress.min(100),
                message,
                details.upload_complete,
                details.processing,
                details.review,
                details.ready_to_publish,
                updated_at,
            ],
        )?;
        Ok(changed > 0)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Schema;

    fn test_db() -> Database {
        Database::open_in_memory(Schema::Transformations).expect("Failed to create test database")
    }

    fn sample_row(id: &str, created_at: &str) -> TransformationRow {
        TransformationRow {
            id: id.to_string(),
            created_at: created_at.to_string(),
            updated_at: created_at.to_string(),
            status: "SENT_TO_DMP".to_string(),
            carrier: "MSC".to_string(),
            trade_lane: "EU-US".to_string(),
            xlsx_name: "rates.xlsx".to_string(),
            docx_name: "sop.docx".to_string(),
            xlsx_uri: None,
            docx_uri: None,
            payload_version: None,
            transformation_data: None,
            progress: 0,
            message: None,
            upload_complete: true,
            processing: false,
            review: false,
            ready_to_publish: false,
        }
    }

    fn day(n: u32) -> String {
        format!("2024-01-{:02}T12:00:00.000000Z", n)
    }

    fn ids(page: &RowPage) -> Vec<&str> {
        page.rows.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn test_insert_and_find() {
        let db = test_db();
        insert(&db, &sample_row("t1", &day(1))).unwrap();

        let found = find_by_id(&db, "t1").unwrap().unwrap();
        assert_eq!(found, sample_row("t1", &day(1)));
        assert!(find_by_id(&db, "missing").unwrap().is_none());
    }

    #[test]
    fn test_duplicate_insert_fails_and_leaves_original() {
        let db = test_db();
        insert(&db, &sample_row("dup", &day(1))).unwrap();
        let mut other = sample_row("dup", &day(2));
        other.carrier = "CMA".to_string();
        assert!(insert(&db, &other).is_err());
        assert_eq!(find_by_id(&db, "dup").unwrap().unwrap().carrier, "MSC");
    }

    #[test]
    fn test_query_orders_newest_first() {
        let db = test_db();
        for (id, d) in [("a", 3), ("b", 1), ("c", 2)] {
            insert(&db, &sample_row(id, &day(d))).unwrap();
        }
        let page = query_page(&db, &TransformationFilter::default(), None, 10).unwrap();
        assert_eq!(ids(&page), vec!["a", "c", "b"]);
        assert!(page.next_cursor.is_none());
    }

    #[test]
    fn test_query_ties_break_on_id() {
        let db = test_db();
        for id in ["x1", "x3", "x2"] {
            insert(&db, &sample_row(id, &day(5))).unwrap();
        }
        let page = query_page(&db, &TransformationFilter::default(), None, 10).unwrap();
        assert_eq!(ids(&page), vec!["x3", "x2", "x1"]);
    }

    #[test]
    fn test_query_pagination_walks_all_rows() {
        let db = test_db();
        for i in 1..=5 {
            insert(&db, &sample_row(&format!("p{}", i), &day(i))).unwrap();
        }

        let first = query_page(&db, &TransformationFilter::default(), None, 2).unwrap();
        assert_eq!(ids(&first), vec!["p5", "p4"]);
        assert_eq!(first.next_cursor.as_deref(), Some(day(4).as_str()));

        let second = query_page(
            &db,
            &TransformationFilter::default(),
            first.next_cursor.as_deref(),
            2,
        )
        .unwrap();
        assert_eq!(ids(&second), vec!["p3", "p2"]);

        let third = query_page(
            &db,
            &TransformationFilter::default(),
            second.next_cursor.as_deref(),
            2,
        )
        .unwrap();
        assert_eq!(ids(&third), vec!["p1"]);
        assert!(third.next_cursor.is_none());
    }

    #[test]
    fn test_exact_page_has_no_cursor() {
        let db = test_db();
        for i in 1..=3 {
            insert(&db, &sample_row(&format!("e{}", i), &day(i))).unwrap();
        }
        let page = query_page(&db, &TransformationFilter::default(), None, 3).unwrap();
        assert_eq!(page.rows.len(), 3);
        assert!(page.next_cursor.is_none());
    }

    #[test]
    fn test_unparsable_cursor_is_ignored() {
        let db = test_db();
        for i in 1..=3 {
            insert(&db, &sample_row(&format!("u{}", i), &day(i))).unwrap();
        }
        let page =
            query_page(&db, &TransformationFilter::default(), Some("garbage"), 10).unwrap();
        assert_eq!(page.rows.len(), 3);
    }

    #[test]
    fn test_cursor_with_offset_is_normalized() {
        let db = test_db();
        for i in 1..=3 {
            insert(&db, &sample_row(&format!("o{}", i), &day(i))).unwrap();
        }
        // 2024-01-02T14:00+02:00 == 2024-01-02T12:00Z, so only o1 is strictly older.
        let page = query_page(
            &db,
            &TransformationFilter::default(),
            Some("2024-01-02T14:00:00+02:00"),
            10,
        )
        .unwrap();
        assert_eq!(ids(&page), vec!["o1"]);
    }

    #[test]
    fn test_filters_are_conjunctive() {
        let db = test_db();
        let mut cma = sample_row("cma", &day(2));
        cma.carrier = "CMA".to_string();
        let mut asia = sample_row("asia", &day(3));
        asia.trade_lane = "ASIA-EU".to_string();
        let mut review = sample_row("review", &day(4));
        review.status = "PENDING_FINAL_REVIEW".to_string();
        for row in [sample_row("msc", &day(1)), cma, asia, review] {
            insert(&db, &row).unwrap();
        }

        let filter = TransformationFilter {
            carriers: vec!["MSC".to_string()],
            ..Default::default()
        };
        let page = query_page(&db, &filter, None, 10).unwrap();
        assert_eq!(ids(&page), vec!["review", "asia", "msc"]);

        let filter = TransformationFilter {
            carriers: vec!["MSC".to_string(), "CMA".to_string()],
            trade_lanes: vec!["EU-US".to_string()],
            statuses: vec![TransformationStatus::SentToDmp],
            ..Default::default()
        };
        let page = query_page(&db, &filter, None, 10).unwrap();
        assert_eq!(ids(&page), vec!["cma", "msc"]);
    }

    #[test]
    fn test_date_range_is_inclusive_by_day() {
        let db = test_db();
        insert(&db, &sample_row("before", "2024-01-09T23:59:59.999999Z")).unwrap();
        insert(&db, &sample_row("start", "2024-01-10T00:00:00.000000Z")).unwrap();
        insert(&db, &sample_row("end", "2024-01-11T23:59:59.999999Z")).unwrap();
        insert(&db, &sample_row("after", "2024-01-12T00:00:00.000000Z")).unwrap();

        let filter = TransformationFilter {
            date_start: NaiveDate::from_ymd_opt(2024, 1, 10),
            date_end: NaiveDate::from_ymd_opt(2024, 1, 11),
            ..Default::default()
        };
        let page = query_page(&db, &filter, None, 10).unwrap();
        assert_eq!(ids(&page), vec!["end", "start"]);
    }

    #[test]
    fn test_distinct_trade_lanes() {
        let db = test_db();
        let mut asia = sample_row("a", &day(1));
        asia.trade_lane = "ASIA-EU".to_string();
        insert(&db, &asia).unwrap();
        insert(&db, &sample_row("b", &day(2))).unwrap();
        insert(&db, &sample_row("c", &day(3))).unwrap();

        assert_eq!(
            distinct_trade_lanes(&db).unwrap(),
            vec!["ASIA-EU".to_string(), "EU-US".to_string()]
        );
    }

    #[test]
    fn test_update_progress() {
        let db = test_db();
        insert(&db, &sample_row("up", &day(1))).unwrap();

        let details = StatusDetails {
            upload_complete: true,
            processing: true,
            review: false,
            ready_to_publish: false,
        };
        let found = update_progress(
            &db,
            "up",
            TransformationStatus::InProgress,
            150,
            Some("Parsing sheets"),
            details,
            &day(2),
        )
        .unwrap();
        assert!(found);

        let row = find_by_id(&db, "up").unwrap().unwrap();
        assert_eq!(row.status, "IN_PROGRESS");
        assert_eq!(row.progress, 100);
        assert_eq!(row.message.as_deref(), Some("Parsing sheets"));
        assert_eq!(row.status_details(), details);
        assert_eq!(row.created_at, day(1));
        assert_eq!(row.updated_at, day(2));
    }

    #[test]
    fn test_update_progress_unknown_id() {
        let db = test_db();
        let found = update_progress(
            &db,
            "nope",
            TransformationStatus::InProgress,
            10,
            None,
            StatusDetails::default(),
            &day(1),
        )
        .unwrap();
        assert!(!found);
    }

    #[test]
    fn test_transformation_data_round_trip_and_corruption() {
        let db = test_db();
        let input = TransformationInput::from_json(
            r#"{"carrier": "MSC", "trade_lane": "EU-US",
                "dates": [{"application_date": "2024-01-01", "validity_date": "2024-12-31"}]}"#,
        )
        .unwrap();

        let mut row = sample_row("payload", &day(1));
        row.set_transformation_data(&input).unwrap();
        insert(&db, &row).unwrap();

        let stored = find_by_id(&db, "payload").unwrap().unwrap();
        assert_eq!(stored.payload_version, Some(PAYLOAD_SCHEMA_VERSION));
        assert_eq!(stored.transformation_data(), Some(input));

        let mut corrupted = stored.clone();
        corrupted.transformation_data = Some("{broken".to_string());
        assert_eq!(corrupted.transformation_data(), None);

        let mut empty = stored;
        empty.transformation_data = None;
        assert_eq!(empty.transformation_data(), None);
    }
}
