//! Builders for submission requests.

#![allow(dead_code)]

use serde_json::{json, Value};

use ratecard::{CreateTransformationRequest, UploadedFile};

pub struct RequestBuilder {
    excel_name: String,
    word_name: String,
    data: Value,
}

impl RequestBuilder {
    pub fn new(carrier: &str, trade_lane: &str) -> Self {
        Self {
            excel_name: "rates.xlsx".to_string(),
            word_name: "sop.docx".to_string(),
            data: json!({
                "carrier": carrier,
                "trade_lane": trade_lane,
                "dates": [{"application_date": "2024-01-01", "validity_date": "2024-12-31"}],
            }),
        }
    }

    pub fn excel_name(mut self, name: &str) -> Self {
        self.excel_name = name.to_string();
        self
    }

    pub fn word_name(mut self, name: &str) -> Self {
        self.word_name = name.to_string();
        self
    }

    /// Sets a top-level key of the `data` payload.
    pub fn field(mut self, key: &str, value: Value) -> Self {
        self.data[key] = value;
        self
    }

    pub fn build(self) -> CreateTransformationRequest {
        CreateTransformationRequest {
            excel_file: UploadedFile::new(self.excel_name, b"PK\x03\x04 workbook".to_vec()),
            word_file: UploadedFile::new(self.word_name, b"PK\x03\x04 document".to_vec()),
            data: self.data.to_string(),
        }
    }
}
