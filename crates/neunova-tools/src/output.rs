//! Finding what a tool produced.
//!
//! Most tools take an explicit output path. LibreOffice does not: it writes
//! `<input stem>.<target extension>` into `--outdir`, so its output has to be
//! discovered by scanning.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::ToolError;

/// Where to look for a tool's output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputLocation {
    /// The tool was told to write exactly here.
    Exact(PathBuf),
    /// The tool names its own output inside `dir`.
    Scan {
        dir: PathBuf,
        stem: String,
        suffix: String,
    },
}

impl OutputLocation {
    /// Resolve to a concrete path and read it.
    pub async fn read(&self) -> Result<(PathBuf, Vec<u8>), ToolError> {
        let path = match self {
            OutputLocation::Exact(path) => path.clone(),
            OutputLocation::Scan { dir, stem, suffix } => {
                find_output(dir, stem, suffix).await?
            }
        };

        match tokio::fs::read(&path).await {
            Ok(bytes) => {
                debug!(path = %path.display(), bytes = bytes.len(), "read tool output");
                Ok((path, bytes))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(ToolError::NoOutput {
                expected: path.display().to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }
}

/// First regular file in `dir` (by name) whose name contains `stem` and ends
/// with `suffix`.
pub async fn find_output(dir: &Path, stem: &str, suffix: &str) -> Result<PathBuf, ToolError> {
    let no_output = || ToolError::NoOutput {
        expected: format!("{}/*{}*{}", dir.display(), stem, suffix),
    };

    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(no_output()),
        Err(e) => return Err(e.into()),
    };

    let mut candidates = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        if !entry.file_type().await?.is_file() {
            continue;
        }
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name.contains(stem) && name.ends_with(suffix) {
            candidates.push(entry.path());
        }
    }

    candidates.sort();
    candidates.into_iter().next().ok_or_else(no_output)
}
