use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::status::{StatusDetails, TransformationStatus};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileNames {
    pub xlsx_name: String,
    pub docx_name: String,
}

/// A transformation job as returned by the listing and submission endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transformation {
    pub id: String,
    /// RFC 3339 creation time; the pagination key.
    pub created_at: DateTime<Utc>,
    pub status: TransformationStatus,
    pub carrier: String,
    pub trade_lane: String,
    pub file_names: FileNames,
}

/// Page envelope shared by listing and submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformationList {
    pub items: Vec<Transformation>,
    /// Pass back as `cursor` to fetch the next page; `null` on the last page.
    pub next_cursor: Option<String>,
}

impl TransformationList {
    pub fn single(item: Transformation) -> Self {
        Self {
            items: vec![item],
            next_cursor: None,
        }
    }
}

/// State pushed by the external processing pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub status: TransformationStatus,
    /// Percentage, clamped to 0..=100 when stored.
    pub progress: u8,
    #[serde(default)]
    pub message: Option<String>,
    pub status_details: StatusDetails,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_single_envelope_has_null_cursor() {
        let item = Transformation {
            id: "abc".into(),
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            status: TransformationStatus::SentToDmp,
            carrier: "MSC".into(),
            trade_lane: "EU-US".into(),
            file_names: FileNames {
                xlsx_name: "rates.xlsx".into(),
                docx_name: "sop.docx".into(),
            },
        };
        let value = serde_json::to_value(TransformationList::single(item)).unwrap();
        assert!(value["next_cursor"].is_null());
        assert_eq!(value["items"][0]["status"], "SENT_TO_DMP");
        assert_eq!(value["items"][0]["file_names"]["docx_name"], "sop.docx");
        assert_eq!(value["items"][0]["created_at"], "2024-01-01T00:00:00Z");
    }
}
