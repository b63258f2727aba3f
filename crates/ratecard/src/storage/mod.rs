//! Object storage for uploaded files.

use async_trait::async_trait;

use crate::error::UploadError;

pub mod filesystem;
pub mod layout;

pub use filesystem::FileSystemObjectStorage;
pub use layout::TransformationLayout;

/// Destination for raw uploaded bytes.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Stores `content` at `destination` (a `/`-separated object key) and
    /// returns a locator for the stored object.
    async fn upload(
        &self,
        content: &[u8],
        destination: &str,
        content_type: &str,
    ) -> Result<String, UploadError>;

    /// Removes the object at `destination`. A missing object is not an error.
    async fn delete(&self, destination: &str) -> Result<(), UploadError>;
}
