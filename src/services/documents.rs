//! Uploaded document storage under the media root

use std::path::{Path, PathBuf};
use tracing::debug;
use crate::config::StorageConfig;
use crate::utils::errors::{HostelError, Result};
use crate::utils::helpers::{generate_uuid, sanitize_filename};

const MESS_PLAN_DIR: &str = "mess_plans";

/// Filesystem store for mess plan PDFs
#[derive(Clone, Debug)]
pub struct DocumentStore {
    root: PathBuf,
    max_upload_bytes: u64,
}

impl DocumentStore {
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            root: PathBuf::from(&config.media_root),
            max_upload_bytes: config.max_upload_bytes,
        }
    }

    pub fn max_upload_bytes(&self) -> u64 {
        self.max_upload_bytes
    }

    /// Write a mess plan and return its path relative to the media root
    pub async fn save_mess_plan(&self, file_name: &str, content: &[u8]) -> Result<String> {
        let dir = self.root.join(MESS_PLAN_DIR);
        tokio::fs::create_dir_all(&dir).await?;

        let stored_name = format!("{}_{}", generate_uuid(), sanitize_filename(file_name));
        tokio::fs::write(dir.join(&stored_name), content).await?;

        let relative = format!("{}/{}", MESS_PLAN_DIR, stored_name);
        debug!(path = %relative, bytes = content.len(), "Mess plan stored");
        Ok(relative)
    }

    /// Absolute location of a stored document
    pub fn resolve(&self, relative: &str) -> Result<PathBuf> {
        let path = Path::new(relative);
        if path.is_absolute() || path.components().any(|c| matches!(c, std::path::Component::ParentDir)) {
            return Err(HostelError::PermissionDenied(format!("Invalid document path: {}", relative)));
        }
        Ok(self.root.join(path))
    }

    /// Remove a stored document; missing files are ignored
    pub async fn remove(&self, relative: &str) -> Result<()> {
        match tokio::fs::remove_file(self.resolve(relative)?).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
