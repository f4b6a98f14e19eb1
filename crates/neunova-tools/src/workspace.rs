//! Per-job scratch directory.
//!
//! Every temporary path a job creates lives inside one randomly named
//! directory. Dropping the [`JobWorkspace`] removes the directory and all of
//! its contents, whichever way the job ended.

use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{debug, warn};
use uuid::Uuid;

#[derive(Debug)]
pub struct JobWorkspace {
    dir: Option<TempDir>,
}

impl JobWorkspace {
    /// Create a fresh scratch directory under `root`, named after `label`.
    pub fn create(root: &Path, label: &str) -> io::Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix(&format!("neunova-{}-", label))
            .tempdir_in(root)?;
        debug!(path = %dir.path().display(), "created job workspace");
        Ok(Self { dir: Some(dir) })
    }

    pub fn path(&self) -> &Path {
        match &self.dir {
            Some(dir) => dir.path(),
            None => Path::new(""),
        }
    }

    /// A unique, not-yet-existing file path `<prefix>_<uuid>.<extension>`.
    pub fn unique_path(&self, prefix: &str, extension: &str) -> PathBuf {
        self.path()
            .join(format!("{}_{}.{}", prefix, Uuid::new_v4().simple(), extension))
    }

    /// Write `bytes` to a fresh unique path and return it.
    pub async fn materialize(
        &self,
        bytes: &[u8],
        prefix: &str,
        extension: &str,
    ) -> io::Result<PathBuf> {
        let path = self.unique_path(prefix, extension);
        tokio::fs::write(&path, bytes).await?;
        debug!(path = %path.display(), bytes = bytes.len(), "materialized job input");
        Ok(path)
    }

    /// Create (if needed) and return a subdirectory.
    pub async fn subdir(&self, name: &str) -> io::Result<PathBuf> {
        let path = self.path().join(name);
        tokio::fs::create_dir_all(&path).await?;
        Ok(path)
    }
}

impl Drop for JobWorkspace {
    fn drop(&mut self) {
        let Some(dir) = self.dir.take() else {
            return;
        };
        let path = dir.path().to_path_buf();
        match dir.close() {
            Ok(()) => debug!(path = %path.display(), "removed job workspace"),
            Err(e) => warn!(path = %path.display(), error = %e, "failed to remove job workspace"),
        }
    }
}
