//! Customer avatar uploads.
//!
//! Files are validated (size and content type), then stored under the
//! configured directory as:
//! ```text
//! {dir}/
//!   customers/
//!     {uuid}.{ext}
//! ```
//! and served at `{public_prefix}/customers/{uuid}.{ext}`.

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, warn};

use crate::config::UploadConfig;

/// Result type for upload operations.
pub type Result<T> = std::result::Result<T, UploadError>;

/// Errors that can occur while accepting an upload.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("File size exceeds {limit_mb}MB limit")]
    TooLarge { limit_mb: usize },

    #[error("Only JPEG, PNG, and WebP images are allowed")]
    UnsupportedType(String),

    #[error("Failed to upload file: {0}")]
    Io(#[from] std::io::Error),
}

/// A file taken from a multipart form.
#[derive(Debug, Clone, Default)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    /// An empty file part means no file was chosen.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Extension taken from the file name, or the content type when the
    /// name has none.
    fn extension(&self) -> String {
        let from_name = Path::new(&self.file_name)
            .extension()
            .and_then(|e| e.to_str())
            .filter(|e| !e.is_empty() && e.len() <= 5 && e.chars().all(|c| c.is_ascii_alphanumeric()))
            .map(|e| e.to_ascii_lowercase());

        from_name.unwrap_or_else(|| match self.content_type.as_str() {
            "image/png" => "png".to_string(),
            "image/webp" => "webp".to_string(),
            _ => "jpg".to_string(),
        })
    }
}

/// Filesystem-backed avatar store.
pub struct UploadStore {
    base_path: PathBuf,
    public_prefix: String,
    max_bytes: usize,
    allowed_types: Vec<String>,
}

impl UploadStore {
    pub fn new(config: &UploadConfig) -> Self {
        Self {
            base_path: PathBuf::from(&config.dir),
            public_prefix: config.public_prefix.trim_end_matches('/').to_string(),
            max_bytes: config.max_bytes,
            allowed_types: config.allowed_types.clone(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    pub fn public_prefix(&self) -> &str {
        &self.public_prefix
    }

    /// Check size and type without writing anything.
    pub fn validate(&self, file: &UploadedFile) -> Result<()> {
        if file.bytes.len() > self.max_bytes {
            return Err(UploadError::TooLarge {
                limit_mb: self.max_bytes / (1024 * 1024),
            });
        }
        if !self.allowed_types.iter().any(|t| t == &file.content_type) {
            return Err(UploadError::UnsupportedType(file.content_type.clone()));
        }
        Ok(())
    }

    /// Validate and store `file`, returning its public URL.
    ///
    /// `None` or an empty file means no upload and yields `Ok(None)`.
    pub async fn save(&self, file: Option<&UploadedFile>) -> Result<Option<String>> {
        let file = match file {
            Some(f) if !f.is_empty() => f,
            _ => return Ok(None),
        };
        self.validate(file)?;

        let relative = format!("customers/{}.{}", uuid::Uuid::new_v4(), file.extension());
        let path = self.base_path.join(&relative);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        // Write atomically using temp file + rename
        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, &file.bytes).await?;
        fs::rename(&temp_path, &path).await?;

        debug!(path = %path.display(), size = file.bytes.len(), "Stored upload");

        Ok(Some(format!("{}/{}", self.public_prefix, relative)))
    }

    /// Delete a file previously returned by [`save`](Self::save).
    ///
    /// URLs outside `{public_prefix}/customers/` are ignored, as is a file
    /// that is already gone.
    pub async fn remove(&self, url: &str) -> Result<()> {
        let Some(name) = url
            .strip_prefix(self.public_prefix.as_str())
            .and_then(|rest| rest.strip_prefix("/customers/"))
            .filter(|name| !name.is_empty() && !name.contains(['/', '\\']) && *name != "..")
        else {
            debug!(url, "Not a stored upload, nothing to remove");
            return Ok(());
        };

        let path = self.base_path.join("customers").join(name);
        match fs::remove_file(&path).await {
            Ok(()) => {
                debug!(path = %path.display(), "Removed upload");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Best-effort [`remove`](Self::remove) for cleaning up after a
    /// failed write.
    pub async fn discard(&self, url: Option<&str>) {
        let Some(url) = url else { return };
        if let Err(e) = self.remove(url).await {
            warn!(url, error = %e, "Failed to remove orphaned upload");
        }
    }
}
