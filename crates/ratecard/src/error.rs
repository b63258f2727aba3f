use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

use crate::db::DatabaseError;

#[derive(Error, Debug)]
pub enum RatecardError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Transformation error: {0}")]
    Transformation(#[from] TransformationError),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },

    #[error("Failed to initialize logging: {0}")]
    Logging(String),
}

/// Client-side input problems. Raised before anything is persisted.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Excel file must be .xlsx or .xls")]
    InvalidExcelFile { filename: Option<String> },

    #[error("Word file must be .docx or .doc")]
    InvalidWordFile { filename: Option<String> },

    #[error("Invalid JSON in data field")]
    InvalidJson { reason: String },

    #[error("Invalid data format: {field}: {reason}")]
    InvalidField { field: String, reason: String },

    #[error("limit must be between {min} and {max}, got {value}")]
    LimitOutOfRange { value: u32, min: u32, max: u32 },

    #[error("Invalid status '{0}'")]
    UnknownStatus(String),

    #[error("Invalid date '{value}' for {field}, expected YYYY-MM-DD")]
    InvalidDate { field: String, value: String },

    #[error("date.start ({start}) is after date.end ({end})")]
    InvertedDateRange { start: NaiveDate, end: NaiveDate },
}

/// Failures of the object-storage collaborator. Never retried.
#[derive(Error, Debug)]
pub enum UploadError {
    #[error("Invalid object destination '{0}'")]
    InvalidDestination(String),

    #[error("Failed to create directory '{path}': {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write object '{destination}': {source}")]
    WriteObject {
        destination: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to delete object '{destination}': {source}")]
    DeleteObject {
        destination: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum TransformationError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Transformation {id} not found")]
    NotFound { id: String },

    #[error("Storage error: {0}")]
    Storage(#[from] DatabaseError),

    #[error("Upload error: {0}")]
    Upload(#[from] UploadError),

    #[error("Failed to serialize transformation data: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl TransformationError {
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    /// HTTP status code for this error category.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::NotFound { .. } => 404,
            Self::Storage(_) | Self::Upload(_) | Self::Serialization(_) => 500,
        }
    }

    /// Message safe to hand to clients. Server-side failures are reduced to
    /// their category; the full error belongs in the log.
    pub fn public_message(&self) -> String {
        match self {
            Self::Validation(e) => e.to_string(),
            Self::NotFound { .. } => self.to_string(),
            Self::Storage(_) => "Storage error: the transformation store is unavailable".to_string(),
            Self::Upload(_) => "Upload error: failed to store uploaded files".to_string(),
            Self::Serialization(_) => "Internal error: failed to encode transformation data".to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RatecardError>;
