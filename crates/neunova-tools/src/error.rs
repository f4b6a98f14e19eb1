use std::io;

use neunova_core::PdfError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ToolError {
    #[error("failed to prepare job workspace: {0}")]
    Workspace(#[source] io::Error),

    #[error("failed to launch {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("{program} exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: String,
        stderr: String,
    },

    #[error("{program} timed out after {seconds}s")]
    Timeout { program: String, seconds: u64 },

    #[error("conversion did not produce output (expected {expected})")]
    NoOutput { expected: String },

    #[error("failed to read tool output: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Pdf(#[from] PdfError),
}
