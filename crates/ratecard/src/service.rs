//! Transformation job service: submission, listing and status tracking.

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::Instrument;
use uuid::Uuid;

use crate::config::{load_config, Config, MAX_PAGE_SIZE};
use crate::db::timestamp::{format_timestamp, now, parse_timestamp};
use crate::db::transformation_repo::{self, TransformationFilter, TransformationRow};
use crate::db::{Database, DatabaseError, Schema};
use crate::error::{TransformationError, ValidationError};
use crate::history::{HistoryEntry, HistoryLogger, SqliteHistoryLogger};
use crate::model::{
    FileKind, FileNames, ProgressUpdate, StatusDetails, Transformation, TransformationInput,
    TransformationList, TransformationStatus, UploadedFile,
};
use crate::sanitize::short_id;
use crate::storage::{FileSystemObjectStorage, ObjectStorage, TransformationLayout};

const DEFAULT_JOBS_ROOT: &str = "rate-cards";
const DEFAULT_PAGE_SIZE: u32 = 20;

/// A validated-on-create submission: the two uploads plus the metadata payload.
#[derive(Debug, Clone)]
pub struct NewTransformation {
    pub excel_file: UploadedFile,
    pub word_file: UploadedFile,
    pub input: TransformationInput,
}

/// Listing request.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformationQuery {
    pub filter: TransformationFilter,
    /// `created_at` of the last item already seen.
    pub cursor: Option<String>,
    pub limit: u32,
}

impl Default for TransformationQuery {
    fn default() -> Self {
        Self {
            filter: TransformationFilter::default(),
            cursor: None,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

pub struct TransformationService {
    db: Database,
    storage: Arc<dyn ObjectStorage>,
    history: Arc<dyn HistoryLogger>,
    jobs_root: String,
    default_page_size: u32,
    max_page_size: u32,
}

impl TransformationService {
    pub fn new(
        db: Database,
        storage: Arc<dyn ObjectStorage>,
        history: Arc<dyn HistoryLogger>,
    ) -> Self {
        Self {
            db,
            storage,
            history,
            jobs_root: DEFAULT_JOBS_ROOT.to_string(),
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
        }
    }

    /// Opens both databases and the filesystem bucket described by `config`.
    pub fn from_config(config: &Config) -> Result<Self, DatabaseError> {
        let db = Database::open(&config.database.transformations_path, Schema::Transformations)?;
        let history_db = Database::open(&config.database.history_path, Schema::History)?;
        let storage =
            FileSystemObjectStorage::new(&config.storage.root_directory, &config.storage.bucket);

        Ok(Self::new(
            db,
            Arc::new(storage),
            Arc::new(SqliteHistoryLogger::new(history_db)),
        )
        .with_jobs_root(&config.storage.jobs_root_path)
        .with_max_page_size(config.api.max_page_size)
        .with_default_page_size(config.api.default_page_size))
    }

    /// Loads and validates the config file at `path`, then opens the service.
    pub fn from_config_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let config = load_config(path)?;
        Ok(Self::from_config(&config)?)
    }

    pub fn with_jobs_root(mut self, jobs_root: &str) -> Self {
        self.jobs_root = jobs_root.to_string();
        self
    }

    pub fn with_max_page_size(mut self, max_page_size: u32) -> Self {
        self.max_page_size = max_page_size.clamp(1, MAX_PAGE_SIZE);
        self
    }

    /// Applied by the API layer when a listing request carries no limit.
    pub fn with_default_page_size(mut self, default_page_size: u32) -> Self {
        self.default_page_size = default_page_size.clamp(1, self.max_page_size);
        self
    }

    pub fn default_page_size(&self) -> u32 {
        self.default_page_size
    }

    pub fn max_page_size(&self) -> u32 {
        self.max_page_size
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Stores the uploads, persists the job and appends the audit entry.
    ///
    /// Returns the new record in a single-item list envelope.
    pub async fn create(
        &self,
        submission: NewTransformation,
    ) -> Result<TransformationList, TransformationError> {
        let span = tracing::info_span!(
            "transformations.create",
            carrier = %submission.input.carrier,
            trade_lane = %submission.input.trade_lane,
        );
        self.create_inner(submission).instrument(span).await
    }

    async fn create_inner(
        &self,
        submission: NewTransformation,
    ) -> Result<TransformationList, TransformationError> {
        let NewTransformation {
            excel_file,
            word_file,
            input,
        } = submission;
        let input = input.normalized();

        let xlsx_ext = FileKind::Spreadsheet.validate_name(excel_file.filename.as_deref())?;
        let docx_ext = FileKind::Document.validate_name(word_file.filename.as_deref())?;
        input.validate()?;

        let id = Uuid::new_v4().to_string();
        let created_at = now();
        let layout = TransformationLayout::new(&self.jobs_root, &id);

        let file_names = FileNames {
            xlsx_name: excel_file.filename.clone().unwrap_or_default(),
            docx_name: word_file.filename.clone().unwrap_or_default(),
        };
        let created_at_text = format_timestamp(created_at);

        let mut row = TransformationRow {
            id: id.clone(),
            created_at: created_at_text.clone(),
            updated_at: created_at_text,
            status: TransformationStatus::SentToDmp.as_str().to_string(),
            carrier: input.carrier.clone(),
            trade_lane: input.trade_lane.clone(),
            xlsx_name: file_names.xlsx_name.clone(),
            docx_name: file_names.docx_name.clone(),
            xlsx_uri: None,
            docx_uri: None,
            payload_version: None,
            transformation_data: None,
            progress: 0,
            message: None,
            upload_complete: false,
            processing: false,
            review: false,
            ready_to_publish: false,
        };
        row.set_status_details(StatusDetails::uploaded());
        row.set_transformation_data(&input)?;
        let comment = serde_json::to_vec_pretty(&input)?;

        let uploads = [
            (
                layout.rate_card(&xlsx_ext),
                excel_file.content.as_slice(),
                content_type(&excel_file, &xlsx_ext),
            ),
            (
                layout.sop(&docx_ext),
                word_file.content.as_slice(),
                content_type(&word_file, &docx_ext),
            ),
            (
                layout.approver_comment(),
                comment.as_slice(),
                "application/json",
            ),
        ];

        let mut written: Vec<&str> = Vec::with_capacity(uploads.len());
        let mut locators = Vec::with_capacity(uploads.len());
        for (destination, content, mime) in &uploads {
            match self.storage.upload(content, destination, mime).await {
                Ok(locator) => {
                    written.push(destination);
                    locators.push(locator);
                }
                Err(e) => {
                    self.discard_objects(&id, &written).await;
                    return Err(e.into());
                }
            }
        }
        let mut locators = locators.into_iter();
        row.xlsx_uri = locators.next();
        row.docx_uri = locators.next();

        if let Err(e) = transformation_repo::insert(&self.db, &row) {
            log::error!("Failed to persist transformation {}: {}", id, e);
            self.discard_objects(&id, &written).await;
            return Err(e.into());
        }

        log::info!(
            "Created transformation {} (carrier={}, trade_lane={})",
            id,
            input.carrier,
            input.trade_lane
        );

        let record = Transformation {
            id,
            created_at,
            status: TransformationStatus::SentToDmp,
            carrier: input.carrier,
            trade_lane: input.trade_lane,
            file_names,
        };
        self.record_history(&record);

        Ok(TransformationList::single(record))
    }

    /// One page of jobs, newest first.
    pub fn list(&self, query: &TransformationQuery) -> Result<TransformationList, TransformationError> {
        let _span = tracing::info_span!("transformations.list", limit = query.limit).entered();

        if query.limit == 0 || query.limit > self.max_page_size {
            return Err(ValidationError::LimitOutOfRange {
                value: query.limit,
                min: 1,
                max: self.max_page_size,
            }
            .into());
        }
        if let (Some(start), Some(end)) = (query.filter.date_start, query.filter.date_end) {
            if start > end {
                return Err(ValidationError::InvertedDateRange { start, end }.into());
            }
        }

        let page = transformation_repo::query_page(
            &self.db,
            &query.filter,
            query.cursor.as_deref(),
            query.limit,
        )?;

        log::debug!(
            "Listed {} transformations (more: {})",
            page.rows.len(),
            page.next_cursor.is_some()
        );

        Ok(TransformationList {
            items: page.rows.iter().map(to_transformation).collect(),
            next_cursor: page.next_cursor,
        })
    }

    pub fn get(&self, id: &str) -> Result<Transformation, TransformationError> {
        self.find(id).map(|row| to_transformation(&row))
    }

    pub fn get_status_details(&self, id: &str) -> Result<StatusDetails, TransformationError> {
        let _span =
            tracing::info_span!("transformations.status_details", id = short_id(id)).entered();
        self.find(id).map(|row| row.status_details())
    }

    pub fn get_trade_lanes(&self) -> Result<Vec<String>, TransformationError> {
        Ok(transformation_repo::distinct_trade_lanes(&self.db)?)
    }

    /// The stored submission payload; `Ok(None)` when it cannot be decoded.
    pub fn get_transformation_data(
        &self,
        id: &str,
    ) -> Result<Option<TransformationInput>, TransformationError> {
        self.find(id).map(|row| row.transformation_data())
    }

    /// Applies a state change reported by the processing pipeline.
    pub fn update_progress(
        &self,
        id: &str,
        update: &ProgressUpdate,
    ) -> Result<(), TransformationError> {
        let _span = tracing::info_span!(
            "transformations.update_progress",
            id = short_id(id),
            status = update.status.as_str()
        )
        .entered();

        let updated = transformation_repo::update_progress(
            &self.db,
            id,
            update.status,
            update.progress,
            update.message.as_deref(),
            update.status_details,
            &format_timestamp(now()),
        )?;
        if !updated {
            return Err(TransformationError::not_found(id));
        }

        log::info!(
            "Transformation {} is now {} ({}%)",
            id,
            update.status,
            update.progress.min(100)
        );

        let record = self.get(id)?;
        self.record_history(&record);
        Ok(())
    }

    fn find(&self, id: &str) -> Result<TransformationRow, TransformationError> {
        transformation_repo::find_by_id(&self.db, id)?
            .ok_or_else(|| TransformationError::not_found(id))
    }

    /// Best-effort removal of the objects of a submission that failed.
    async fn discard_objects(&self, id: &str, destinations: &[&str]) {
        for destination in destinations {
            if let Err(e) = self.storage.delete(destination).await {
                log::warn!(
                    "Failed to remove object {} of failed transformation {}: {}",
                    destination,
                    id,
                    e
                );
            }
        }
    }

    /// Appends to the audit trail; failures are logged and swallowed.
    fn record_history(&self, record: &Transformation) {
        let entry = HistoryEntry {
            transformation_id: record.id.clone(),
            status: record.status,
            carrier: record.carrier.clone(),
            trade_lane: record.trade_lane.clone(),
            file_names: record.file_names.clone(),
            created_at: record.created_at,
        };
        if let Err(e) = self.history.log_event(&entry) {
            log::warn!(
                "Failed to record history for transformation {}: {}",
                record.id,
                e
            );
        }
    }
}

fn content_type<'a>(file: &'a UploadedFile, extension: &str) -> &'a str {
    file.content_type
        .as_deref()
        .filter(|ct| !ct.trim().is_empty())
        .unwrap_or_else(|| FileKind::content_type_for(extension))
}

fn to_transformation(row: &TransformationRow) -> Transformation {
    let status = row.status.parse().unwrap_or_else(|_| {
        log::warn!(
            "Unknown transformation status '{}' for {}, defaulting to SENT_TO_DMP",
            row.status,
            row.id
        );
        TransformationStatus::SentToDmp
    });
    let created_at = parse_timestamp(&row.created_at).unwrap_or_else(|| {
        log::warn!(
            "Unparsable created_at '{}' for transformation {}",
            row.created_at,
            row.id
        );
        DateTime::<Utc>::default()
    });

    Transformation {
        id: row.id.clone(),
        created_at,
        status,
        carrier: row.carrier.clone(),
        trade_lane: row.trade_lane.clone(),
        file_names: FileNames {
            xlsx_name: row.xlsx_name.clone(),
            docx_name: row.docx_name.clone(),
        },
    }
}
