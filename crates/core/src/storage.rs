//! Blob storage for uploaded images (movie posters, actor photos).
//!
//! Handlers talk to a [`FileStore`] trait object; [`LocalFileStore`] is the
//! disk-backed implementation used by the server and the test suite.
//! Stored blobs are addressed by an opaque reference string (a public URL)
//! which is what gets persisted on the entity.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Container for movie posters.
pub const CONTAINER_MOVIES: &str = "movies";

/// Container for actor photos.
pub const CONTAINER_ACTORS: &str = "actors";

/// Content types accepted for image uploads.
pub const ALLOWED_IMAGE_TYPES: &[&str] = &["image/jpeg", "image/png", "image/gif", "image/webp"];

/// Default upload size limit (4 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 4 * 1024 * 1024;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid storage reference: {0}")]
    InvalidReference(String),
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Stores binary payloads and hands back a retrievable reference.
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Store `bytes` in `container` and return its reference.
    ///
    /// `extension` includes the leading dot (or is empty).
    async fn store(
        &self,
        bytes: &[u8],
        extension: &str,
        container: &str,
        content_type: &str,
    ) -> Result<String, StorageError>;

    /// Remove the blob behind `reference`. Missing blobs are not an error.
    async fn delete(&self, reference: &str, container: &str) -> Result<(), StorageError>;

    /// Store `bytes` and then remove `previous` (if any). A failed store
    /// leaves `previous` untouched.
    async fn replace(
        &self,
        bytes: &[u8],
        extension: &str,
        container: &str,
        previous: Option<&str>,
        content_type: &str,
    ) -> Result<String, StorageError> {
        let reference = self.store(bytes, extension, container, content_type).await?;
        if let Some(previous) = previous {
            self.delete(previous, container).await?;
        }
        Ok(reference)
    }
}

// ---------------------------------------------------------------------------
// Local disk implementation
// ---------------------------------------------------------------------------

/// Writes blobs under `root/{container}/` and references them as
/// `{public_url}/{container}/{file}`.
#[derive(Debug, Clone)]
pub struct LocalFileStore {
    root: PathBuf,
    public_url: String,
}

impl LocalFileStore {
    pub fn new(root: impl Into<PathBuf>, public_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_url: public_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a reference produced by this store back to a file path.
    fn path_for(&self, reference: &str, container: &str) -> Result<PathBuf, StorageError> {
        let file_name = reference
            .rsplit('/')
            .next()
            .filter(|name| !name.is_empty() && *name != "." && *name != "..")
            .ok_or_else(|| StorageError::InvalidReference(reference.to_string()))?;
        Ok(self.root.join(container).join(file_name))
    }
}

#[async_trait]
impl FileStore for LocalFileStore {
    async fn store(
        &self,
        bytes: &[u8],
        extension: &str,
        container: &str,
        _content_type: &str,
    ) -> Result<String, StorageError> {
        let dir = self.root.join(container);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|source| StorageError::Io {
                path: dir.clone(),
                source,
            })?;

        let file_name = format!("{}{extension}", uuid::Uuid::new_v4());
        let path = dir.join(&file_name);
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|source| StorageError::Io {
                path: path.clone(),
                source,
            })?;

        tracing::debug!(path = %path.display(), size = bytes.len(), "Stored blob");
        Ok(format!("{}/{container}/{file_name}", self.public_url))
    }

    async fn delete(&self, reference: &str, container: &str) -> Result<(), StorageError> {
        let path = self.path_for(reference, container)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                tracing::debug!(path = %path.display(), "Deleted blob");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Io { path, source }),
        }
    }
}

// ---------------------------------------------------------------------------
// Upload helpers
// ---------------------------------------------------------------------------

/// Derive the extension (with leading dot, lower-cased) from an uploaded
/// filename. Returns an empty string when the name has no extension.
pub fn file_extension(file_name: &str) -> String {
    let base = file_name.rsplit(['/', '\\']).next().unwrap_or(file_name);
    match base.rfind('.') {
        Some(pos) if pos + 1 < base.len() => base[pos..].to_lowercase(),
        _ => String::new(),
    }
}

/// Check an image upload's content type and size before it is stored.
pub fn validate_image_upload(
    content_type: &str,
    size: usize,
    max_bytes: usize,
) -> Result<(), CoreError> {
    if !ALLOWED_IMAGE_TYPES.contains(&content_type) {
        return Err(CoreError::Validation(format!(
            "Unsupported image type '{content_type}'. Must be one of: {ALLOWED_IMAGE_TYPES:?}"
        )));
    }
    if size > max_bytes {
        return Err(CoreError::Validation(format!(
            "Image is {size} bytes, exceeding the {max_bytes} byte limit"
        )));
    }
    Ok(())
}
