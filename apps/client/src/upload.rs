//! Local file checks that run before any upload request is sent.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::ClientError;

const BYTES_PER_MB: u64 = 1024 * 1024;

/// Allowed extensions and size ceiling for CV uploads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadPolicy {
    pub allowed_extensions: Vec<String>,
    pub max_file_size_mb: u64,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self::new(vec!["pdf".to_string(), "docx".to_string()], 10)
    }
}

impl UploadPolicy {
    pub fn new(allowed_extensions: Vec<String>, max_file_size_mb: u64) -> Self {
        Self {
            allowed_extensions,
            max_file_size_mb,
        }
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_file_size_mb.saturating_mul(BYTES_PER_MB)
    }

    /// Rejects files with a disallowed extension or above the size ceiling.
    /// The extension is whatever follows the last `.`, compared case-insensitively.
    pub fn validate(&self, file_name: &str, size_bytes: u64) -> Result<(), ClientError> {
        let extension = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_lowercase())
            .unwrap_or_default();

        if !self.allowed_extensions.iter().any(|e| *e == extension) {
            return Err(ClientError::Validation(format!(
                "Invalid file type. Allowed types: {}",
                self.allowed_extensions.join(", ")
            )));
        }

        if size_bytes > self.max_bytes() {
            return Err(ClientError::Validation(format!(
                "File too large. Maximum size is {}MB",
                self.max_file_size_mb
            )));
        }

        Ok(())
    }
}

/// A file the user picked and that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedFile {
    pub path: PathBuf,
    pub file_name: String,
    pub size_bytes: u64,
}

impl SelectedFile {
    /// Reads the file's metadata and validates it against `policy`.
    pub fn inspect(path: &Path, policy: &UploadPolicy) -> Result<Self, ClientError> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| ClientError::Validation("File name is not valid UTF-8".to_string()))?
            .to_string();

        let metadata = std::fs::metadata(path).map_err(|e| {
            ClientError::Validation(format!("Cannot read {}: {e}", path.display()))
        })?;

        policy.validate(&file_name, metadata.len())?;

        Ok(Self {
            path: path.to_path_buf(),
            file_name,
            size_bytes: metadata.len(),
        })
    }
}
