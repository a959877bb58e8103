//! Filesystem-backed attachment storage.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use supportdesk_core::tickets::ports::AttachmentStore as AttachmentStorePort;
use supportdesk_domain::{Result, SupportDeskError};
use tokio::task;

use crate::errors::InfraError;

/// Stores attachment blobs as plain files under a root directory and hands
/// back `file://` URLs.
pub struct FsAttachmentStore {
    root_dir: PathBuf,
}

impl FsAttachmentStore {
    /// Create a new store rooted at `root_dir`. The directory is created
    /// lazily on first upload.
    pub fn new<P: AsRef<Path>>(root_dir: P) -> Self {
        Self { root_dir: root_dir.as_ref().to_path_buf() }
    }

    /// Root directory blobs are written under.
    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }
}

#[async_trait]
impl AttachmentStorePort for FsAttachmentStore {
    async fn upload(&self, name: &str, bytes: &[u8]) -> Result<String> {
        let root = self.root_dir.clone();
        let name = name.to_string();
        let bytes = bytes.to_vec();

        task::spawn_blocking(move || write_blob(&root, &name, &bytes))
            .await
            .map_err(map_join_error)?
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Write one blob and return its retrieval URL.
fn write_blob(root: &Path, name: &str, bytes: &[u8]) -> Result<String> {
    let relative = sanitize_name(name)?;
    let target = root.join(relative);

    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent).map_err(map_io_error)?;
    }
    std::fs::write(&target, bytes).map_err(map_io_error)?;

    let absolute = std::fs::canonicalize(&target).map_err(map_io_error)?;
    Ok(format!("file://{}", absolute.display()))
}

/// Keep uploads inside the storage root: only plain path segments are
/// allowed, so `..`, absolute paths, and drive prefixes are all rejected.
fn sanitize_name(name: &str) -> Result<PathBuf> {
    let mut clean = PathBuf::new();
    for component in Path::new(name).components() {
        match component {
            Component::Normal(part) => clean.push(part),
            _ => {
                return Err(SupportDeskError::Validation(format!(
                    "attachment name escapes the storage root: {name}"
                )))
            }
        }
    }

    if clean.as_os_str().is_empty() {
        return Err(SupportDeskError::Validation("attachment name is empty".into()));
    }
    Ok(clean)
}

// =============================================================================
// Error Mapping
// =============================================================================

fn map_io_error(err: std::io::Error) -> SupportDeskError {
    SupportDeskError::from(InfraError::from(err))
}

fn map_join_error(err: task::JoinError) -> SupportDeskError {
    SupportDeskError::from(InfraError::from(err))
}

// =============================================================================
// Tests
// =============================================================================
