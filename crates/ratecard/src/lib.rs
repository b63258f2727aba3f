pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod history;
pub mod logging;
pub mod model;
pub mod sanitize;
pub mod service;
pub mod storage;

pub use api::{ApiResponse, CreateTransformationRequest, ListTransformationsParams};
pub use config::{load_config, load_config_from_str, Config};
pub use db::{Database, DatabaseError};
pub use error::{ConfigError, RatecardError, Result, TransformationError, UploadError, ValidationError};
pub use history::{HistoryEntry, HistoryLogger, SqliteHistoryLogger};
pub use model::{
    FileNames, ProgressUpdate, StatusDetails, Transformation, TransformationInput,
    TransformationList, TransformationStatus, UploadedFile,
};
pub use service::{NewTransformation, TransformationQuery, TransformationService};
pub use storage::{FileSystemObjectStorage, ObjectStorage};
