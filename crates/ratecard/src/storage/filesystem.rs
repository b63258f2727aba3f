use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;

use super::ObjectStorage;
use crate::error::UploadError;
use crate::sanitize::redact_path;

/// Bucket emulated as a directory: objects live at `<root>/<bucket>/<key>`.
pub struct FileSystemObjectStorage {
    bucket_directory: PathBuf,
}

impl FileSystemObjectStorage {
    pub fn new<P: AsRef<Path>>(root_directory: P, bucket: &str) -> Self {
        Self {
            bucket_directory: root_directory.as_ref().join(bucket),
        }
    }

    pub fn bucket_directory(&self) -> &Path {
        &self.bucket_directory
    }

    /// Resolves an object key to its path, rejecting keys that would escape
    /// the bucket.
    pub fn object_path(&self, destination: &str) -> Result<PathBuf, UploadError> {
        let key = Path::new(destination);
        let is_plain = destination
            .split('/')
            .all(|segment| !segment.is_empty() && segment != "." && segment != "..")
            && key
                .components()
                .all(|component| matches!(component, Component::Normal(_)));
        if !is_plain {
            return Err(UploadError::InvalidDestination(destination.to_string()));
        }
        Ok(self.bucket_directory.join(key))
    }

    async fn ensure_directory(&self, path: &Path) -> Result<(), UploadError> {
        tokio::fs::create_dir_all(path)
            .await
            .map_err(|e| UploadError::CreateDirectory {
                path: path.to_path_buf(),
                source: e,
            })
    }

    /// Removes directories emptied by a delete, up to the bucket directory.
    async fn prune_empty_parents(&self, path: &Path) {
        let mut current = path.parent();
        while let Some(dir) = current {
            if dir == self.bucket_directory || !dir.starts_with(&self.bucket_directory) {
                break;
            }
            if tokio::fs::remove_dir(dir).await.is_err() {
                break;
            }
            current = dir.parent();
        }
    }
}

#[async_trait]
impl ObjectStorage for FileSystemObjectStorage {
    async fn upload(
        &self,
        content: &[u8],
        destination: &str,
        content_type: &str,
    ) -> Result<String, UploadError> {
        let path = self.object_path(destination)?;
        if let Some(parent) = path.parent() {
            self.ensure_directory(parent).await?;
        }

        // Readers never observe a partially written object.
        let partial = path.with_file_name(format!("{}.part", redact_path(&path)));
        let write_error = |source: std::io::Error| UploadError::WriteObject {
            destination: destination.to_string(),
            source,
        };

        tokio::fs::write(&partial, content)
            .await
            .map_err(write_error)?;
        if let Err(e) = tokio::fs::rename(&partial, &path).await {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(write_error(e));
        }

        log::debug!(
            "Stored object {} ({} bytes, {})",
            redact_path(&path),
            content.len(),
            content_type
        );

        Ok(format!("file://{}", path.display()))
    }

    async fn delete(&self, destination: &str) -> Result<(), UploadError> {
        let path = self.object_path(destination)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => log::debug!("Deleted object {}", redact_path(&path)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(source) => {
                return Err(UploadError::DeleteObject {
                    destination: destination.to_string(),
                    source,
                })
            }
        }
        self.prune_empty_parents(&path).await;
        Ok(())
    }
}
