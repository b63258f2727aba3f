//! Object keys of a transformation's files inside the bucket.

/// `<jobs_root>/transformation-<id>/...`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformationLayout {
    root: String,
}

impl TransformationLayout {
    pub fn new(jobs_root: &str, transformation_id: &str) -> Self {
        let jobs_root = jobs_root.trim_matches('/');
        let root = if jobs_root.is_empty() {
            format!("transformation-{}", transformation_id)
        } else {
            format!("{}/transformation-{}", jobs_root, transformation_id)
        };
        Self { root }
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    /// The rate card workbook, keeping its original extension.
    pub fn rate_card(&self, extension: &str) -> String {
        format!("{}/rate-card/rate_card.{}", self.root, extension)
    }

    /// The SOP document, keeping its original extension.
    pub fn sop(&self, extension: &str) -> String {
        format!("{}/sop/sop.{}", self.root, extension)
    }

    /// The submitted metadata payload.
    pub fn approver_comment(&self) -> String {
        format!("{}/approver-comment/approver_comment.json", self.root)
    }
}
