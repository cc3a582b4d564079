//! Local disk storage for uploaded files.
//!
//! Files are written as `<root>/<directory>/<uuid>.<ext>`. Only the path
//! relative to the root is persisted on the owning row.

use std::io;
use std::path::{Path, PathBuf};

use uuid::Uuid;

/// Uploaded-file store rooted at a single directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write `bytes` under `directory` with a fresh name, returning the
    /// relative path to persist.
    pub async fn store(&self, directory: &str, ext: &str, bytes: &[u8]) -> io::Result<String> {
        let dir = self.root.join(directory);
        tokio::fs::create_dir_all(&dir).await?;

        let file_name = match sanitize_extension(ext) {
            Some(ext) => format!("{}.{ext}", Uuid::new_v4()),
            None => Uuid::new_v4().to_string(),
        };
        tokio::fs::write(dir.join(&file_name), bytes).await?;

        let relative = format!("{directory}/{file_name}");
        tracing::debug!(path = %relative, size = bytes.len(), "Stored upload");
        Ok(relative)
    }

    /// Absolute location of a stored relative path.
    pub fn resolve(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    /// Delete a stored file. A file that is already gone is not an error.
    pub async fn remove(&self, relative: &str) -> io::Result<()> {
        match tokio::fs::remove_file(self.resolve(relative)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Delete a stored file, logging instead of failing. Used once the owning
    /// row has already changed and the request must still succeed.
    pub async fn remove_quietly(&self, relative: &str) {
        if let Err(e) = self.remove(relative).await {
            tracing::warn!(path = %relative, error = %e, "Failed to remove stored file");
        }
    }

    /// [`remove_quietly`](Self::remove_quietly) for every path.
    pub async fn remove_all_quietly(&self, paths: &[String]) {
        for path in paths {
            self.remove_quietly(path).await;
        }
    }
}

/// Keep only plain alphanumeric extensions so a client-supplied file name can
/// never steer the stored path.
fn sanitize_extension(ext: &str) -> Option<&str> {
    let valid = !ext.is_empty() && ext.len() <= 16 && ext.chars().all(|c| c.is_ascii_alphanumeric());
    valid.then_some(ext)
}
