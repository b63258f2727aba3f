use crate::error::ValidationError;

/// A file received in a multipart submission.
#[derive(Debug, Clone, Default)]
pub struct UploadedFile {
    /// Client-supplied file name; only its suffix is trusted.
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub content: Vec<u8>,
}

impl UploadedFile {
    pub fn new(filename: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: Some(filename.into()),
            content_type: None,
            content: content.into(),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

/// The two upload slots of a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// Rate card workbook.
    Spreadsheet,
    /// SOP document.
    Document,
}

impl FileKind {
    pub fn accepted_extensions(&self) -> &'static [&'static str] {
        match self {
            FileKind::Spreadsheet => &["xlsx", "xls"],
            FileKind::Document => &["docx", "doc"],
        }
    }

    /// Checks the file name suffix and returns the normalized (lowercase)
    /// extension.
    pub fn validate_name(&self, filename: Option<&str>) -> Result<String, ValidationError> {
        let extension = filename
            .and_then(|name| name.rsplit_once('.'))
            .filter(|(stem, _)| !stem.is_empty())
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .filter(|ext| self.accepted_extensions().contains(&ext.as_str()));

        extension.ok_or_else(|| {
            let filename = filename.map(str::to_string);
            match self {
                FileKind::Spreadsheet => ValidationError::InvalidExcelFile { filename },
                FileKind::Document => ValidationError::InvalidWordFile { filename },
            }
        })
    }

    pub fn content_type_for(extension: &str) -> &'static str {
        match extension {
            "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            "xls" => "application/vnd.ms-excel",
            "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
            "doc" => "application/msword",
            _ => "application/octet-stream",
        }
    }
}
