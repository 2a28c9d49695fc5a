//! Avatar upload configuration.

use serde::Deserialize;

use super::ConfigError;

/// Upload configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Directory uploaded files are written under.
    pub dir: String,
    /// URL prefix the directory is served from.
    pub public_prefix: String,
    /// Largest accepted file, in bytes.
    pub max_bytes: usize,
    /// Accepted `Content-Type` values.
    pub allowed_types: Vec<String>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            dir: "data/uploads".to_string(),
            public_prefix: "/uploads".to_string(),
            max_bytes: 5 * 1024 * 1024,
            allowed_types: ["image/jpeg", "image/jpg", "image/png", "image/webp"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl UploadConfig {
    pub(super) fn validate(&self) -> Result<(), ConfigError> {
        if !self.public_prefix.starts_with('/') {
            return Err(ConfigError::Invalid(
                "upload.public_prefix must start with '/'".into(),
            ));
        }
        if self.max_bytes == 0 {
            return Err(ConfigError::Invalid("upload.max_bytes must be positive".into()));
        }
        Ok(())
    }
}
