use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Coarse lifecycle state of a transformation job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransformationStatus {
    /// Initial state: files uploaded and handed to the processing pipeline.
    SentToDmp,
    InProgress,
    PendingFinalReview,
    NeedingInput,
}

impl TransformationStatus {
    pub const ALL: [TransformationStatus; 4] = [
        TransformationStatus::SentToDmp,
        TransformationStatus::InProgress,
        TransformationStatus::PendingFinalReview,
        TransformationStatus::NeedingInput,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TransformationStatus::SentToDmp => "SENT_TO_DMP",
            TransformationStatus::InProgress => "IN_PROGRESS",
            TransformationStatus::PendingFinalReview => "PENDING_FINAL_REVIEW",
            TransformationStatus::NeedingInput => "NEEDING_INPUT",
        }
    }
}

impl fmt::Display for TransformationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransformationStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownStatus(s.to_string()))
    }
}

/// Pipeline stage flags, as exposed by the status-details lookup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct StatusDetails {
    pub upload_complete: bool,
    pub processing: bool,
    pub review: bool,
    pub ready_to_publish: bool,
}

impl StatusDetails {
    /// Flags of a freshly persisted job: the upload is complete, nothing else.
    pub fn uploaded() -> Self {
        Self {
            upload_complete: true,
            ..Self::default()
        }
    }
}
