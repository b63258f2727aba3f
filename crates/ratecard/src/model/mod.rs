//! Domain types for transformation jobs.

pub mod input;
pub mod payload;
pub mod record;
pub mod status;
pub mod upload;

pub use input::{
    DatesItem, SheetFilter, SheetsAndFilters, SurchargeIncluded, SurchargeToBeAdded,
    TransformationInput,
};
pub use payload::{decode_payload, encode_payload, PAYLOAD_SCHEMA_VERSION};
pub use record::{FileNames, ProgressUpdate, Transformation, TransformationList};
pub use status::{StatusDetails, TransformationStatus};
pub use upload::{FileKind, UploadedFile};
