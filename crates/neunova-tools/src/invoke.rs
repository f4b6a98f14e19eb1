//! The tool-invocation contract.
//!
//! materialize input -> run tool -> locate output -> read it -> clean up
//!
//! Cleanup is carried by [`JobWorkspace`]'s `Drop`, so it runs on success,
//! tool failure, timeout and early returns alike.

use std::path::Path;

use neunova_core::ArchiveBuilder;
use tracing::{debug, info};

use crate::config::ToolConfig;
use crate::error::ToolError;
use crate::job::ToolJob;
use crate::workspace::JobWorkspace;

/// Bytes produced by a tool plus how to label them in a response.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
    pub filename: String,
}

/// Run `job` once on `input`.
pub async fn invoke(
    input: &[u8],
    job: &ToolJob,
    config: &ToolConfig,
) -> Result<ToolOutput, ToolError> {
    let workspace =
        JobWorkspace::create(&config.temp_dir, job.name()).map_err(ToolError::Workspace)?;
    let input_path = workspace
        .materialize(input, job.input_prefix(), job.input_extension())
        .await
        .map_err(ToolError::Workspace)?;

    let output = run_in(&workspace, &input_path, job, config).await?;

    info!(
        job = job.name(),
        input_bytes = input.len(),
        output_bytes = output.bytes.len(),
        "tool invocation finished"
    );
    Ok(output)
}

/// Render every page of a PDF to JPEG and bundle them as `page-<n>.jpg`.
///
/// Each page is its own `pdftoppm` run against one shared copy of the
/// input. The first failing page fails the batch; no partial archive is
/// returned.
pub async fn render_pages_archive(
    input: &[u8],
    page_count: u32,
    config: &ToolConfig,
) -> Result<Vec<u8>, ToolError> {
    let workspace =
        JobWorkspace::create(&config.temp_dir, "pdf2jpg").map_err(ToolError::Workspace)?;
    let input_path = workspace
        .materialize(input, "inpdf", "pdf")
        .await
        .map_err(ToolError::Workspace)?;

    let mut archive = ArchiveBuilder::new();
    for page in 1..=page_count {
        let job = ToolJob::RenderPage { page };
        let output = run_in(&workspace, &input_path, &job, config).await?;
        archive.append(&output.filename, &output.bytes)?;
    }

    info!(pages = page_count, "rendered page archive");
    Ok(archive.finish()?)
}

/// Steps 2-3 of the contract against an already materialized input.
async fn run_in(
    workspace: &JobWorkspace,
    input_path: &Path,
    job: &ToolJob,
    config: &ToolConfig,
) -> Result<ToolOutput, ToolError> {
    let binary = config.paths.binary(job.tool());
    let prepared = job
        .prepare(binary, input_path, workspace)
        .await
        .map_err(ToolError::Workspace)?;

    prepared.command.run(config.timeout).await?;

    let (path, bytes) = prepared.output.read().await?;
    debug!(job = job.name(), path = %path.display(), "located tool output");

    // The workspace goes away with the job; removing large outputs early
    // keeps batch jobs from holding every page on disk at once.
    if let Err(e) = tokio::fs::remove_file(&path).await {
        debug!(path = %path.display(), error = %e, "could not remove output early");
    }

    Ok(ToolOutput {
        bytes,
        content_type: job.content_type(),
        filename: job.download_name(),
    })
}
