//! HTTP handlers for the Neunova API
//!
//! Every conversion endpoint takes `multipart/form-data` and answers with the
//! converted bytes as an attachment:
//! - In-process PDF work (merge, split, extract, jpg2pdf) via `neunova-core`
//! - External tools (compress, pdf2jpg, office conversions, protect, unlock)
//!   via `neunova-tools`

use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use neunova_core::{
    extract_selection, get_page_count, images_to_pdf, merge_documents, split_to_archive,
};
use neunova_tools::{
    invoke, render_pages_archive, CompressionLevel, OfficeFormat, Tool, ToolError, ToolJob,
    ToolOutput,
};
use serde::Serialize;
use tracing::info;

use crate::config::ServiceConfig;
use crate::error::ApiError;
use crate::upload::UploadForm;

type SharedConfig = Arc<ServiceConfig>;

const PDF: &str = "application/pdf";
const ZIP: &str = "application/zip";

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    /// External tools this instance can run.
    pub tools: Vec<String>,
}

pub async fn health(State(config): State<SharedConfig>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: "neunova-api",
        version: env!("CARGO_PKG_VERSION"),
        tools: config.capabilities.iter().map(|t| t.to_string()).collect(),
    })
}

/// Raw bytes with download headers.
fn attachment(content_type: &str, filename: &str, bytes: Vec<u8>) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={}", filename),
            ),
        ],
        bytes,
    )
        .into_response()
}

fn tool_response(output: ToolOutput) -> Response {
    attachment(output.content_type, &output.filename, output.bytes)
}

/// Run CPU-bound PDF work off the async executor.
async fn blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("worker task failed: {}", e)))?
}

fn require_tool(
    config: &ServiceConfig,
    operation: &'static str,
    tool: Tool,
) -> Result<(), ApiError> {
    if config.capabilities.is_available(tool) {
        Ok(())
    } else {
        Err(ApiError::Unsupported { operation, tool })
    }
}

pub async fn merge(multipart: Multipart) -> Result<Response, ApiError> {
    let form = UploadForm::read(multipart).await?;
    let documents: Vec<Vec<u8>> = form
        .parts("files")
        .into_iter()
        .map(|p| p.bytes.to_vec())
        .collect();
    if documents.is_empty() {
        return Err(ApiError::MissingFile("No files uploaded"));
    }

    let count = documents.len();
    let merged = blocking(move || Ok(merge_documents(documents)?)).await?;
    info!(operation = "merge", files = count, bytes = merged.len(), "merged documents");
    Ok(attachment(PDF, "merged.pdf", merged))
}

pub async fn split(multipart: Multipart) -> Result<Response, ApiError> {
    let form = UploadForm::read(multipart).await?;
    let file = form.require_file()?.bytes.clone();
    let pages = form.text("pages").unwrap_or_default();

    let archive = blocking(move || Ok(split_to_archive(&file, &pages)?)).await?;
    info!(operation = "split", bytes = archive.len(), "split document");
    Ok(attachment(ZIP, "split.zip", archive))
}

pub async fn extract(multipart: Multipart) -> Result<Response, ApiError> {
    let form = UploadForm::read(multipart).await?;
    let file = form.require_file()?.bytes.clone();
    let pages = form.text("pages").unwrap_or_default();

    let extracted = blocking(move || Ok(extract_selection(&file, &pages)?)).await?;
    info!(operation = "extract", bytes = extracted.len(), "extracted pages");
    Ok(attachment(PDF, "extracted.pdf", extracted))
}

pub async fn compress(
    State(config): State<SharedConfig>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    const OPERATION: &str = "Compression";

    let form = UploadForm::read(multipart).await?;
    let file = form.require_file()?;
    let level = form.raw_text("level");
    let level = CompressionLevel::from_param(level.as_deref().unwrap_or("medium"));
    require_tool(&config, OPERATION, Tool::Ghostscript)?;

    let output = invoke(&file.bytes, &ToolJob::Compress { level }, &config.tools)
        .await
        .map_err(ApiError::tool(OPERATION))?;
    Ok(tool_response(output))
}

pub async fn pdf2jpg(
    State(config): State<SharedConfig>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    const OPERATION: &str = "pdf2jpg";

    let form = UploadForm::read(multipart).await?;
    let file = form.require_file()?.bytes.clone();
    require_tool(&config, OPERATION, Tool::Pdftoppm)?;

    let counted = file.clone();
    let page_count = blocking(move || {
        get_page_count(&counted).map_err(|e| ApiError::tool(OPERATION)(ToolError::Pdf(e)))
    })
    .await?;

    let archive = render_pages_archive(&file, page_count, &config.tools)
        .await
        .map_err(ApiError::tool(OPERATION))?;
    Ok(attachment(ZIP, "pages.zip", archive))
}

pub async fn jpg2pdf(multipart: Multipart) -> Result<Response, ApiError> {
    let form = UploadForm::read(multipart).await?;
    let images = form.images();
    if images.is_empty() {
        return Err(ApiError::MissingFile("No images uploaded"));
    }

    let count = images.len();
    let pdf = blocking(move || Ok(images_to_pdf(&images)?)).await?;
    info!(operation = "jpg2pdf", images = count, bytes = pdf.len(), "converted images");
    Ok(attachment(PDF, "converted.pdf", pdf))
}

/// Shared body of the LibreOffice endpoints.
///
/// Office-to-PDF keeps the uploaded file's extension so LibreOffice picks the
/// right import filter; `fallback_extension` covers uploads without one.
async fn office_convert(
    config: &ServiceConfig,
    multipart: Multipart,
    operation: &'static str,
    target: OfficeFormat,
    fallback_extension: &str,
) -> Result<Response, ApiError> {
    let form = UploadForm::read(multipart).await?;
    let file = form.require_file()?;
    require_tool(config, operation, Tool::LibreOffice)?;

    let input_extension = match target {
        OfficeFormat::Pdf => file
            .extension()
            .unwrap_or_else(|| fallback_extension.to_string()),
        _ => "pdf".to_string(),
    };
    let job = ToolJob::OfficeConvert {
        target,
        input_extension,
    };
    let output = invoke(&file.bytes, &job, &config.tools)
        .await
        .map_err(ApiError::tool(operation))?;
    Ok(tool_response(output))
}

pub async fn word2pdf(
    State(config): State<SharedConfig>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    office_convert(&config, multipart, "word2pdf", OfficeFormat::Pdf, "docx").await
}

pub async fn excel2pdf(
    State(config): State<SharedConfig>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    office_convert(&config, multipart, "excel2pdf", OfficeFormat::Pdf, "xlsx").await
}

pub async fn ppt2pdf(
    State(config): State<SharedConfig>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    office_convert(&config, multipart, "ppt2pdf", OfficeFormat::Pdf, "pptx").await
}

pub async fn pdf2word(
    State(config): State<SharedConfig>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    office_convert(&config, multipart, "pdf2word", OfficeFormat::Docx, "pdf").await
}

pub async fn pdf2excel(
    State(config): State<SharedConfig>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    office_convert(&config, multipart, "pdf2excel", OfficeFormat::Xlsx, "pdf").await
}

pub async fn pdf2ppt(
    State(config): State<SharedConfig>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    office_convert(&config, multipart, "pdf2ppt", OfficeFormat::Pptx, "pdf").await
}

pub async fn protect(
    State(config): State<SharedConfig>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    const OPERATION: &str = "protect";

    let form = UploadForm::read(multipart).await?;
    let file = form.require_file()?;
    let password = form.require_password()?;
    require_tool(&config, OPERATION, Tool::Qpdf)?;

    let output = invoke(&file.bytes, &ToolJob::Protect { password }, &config.tools)
        .await
        .map_err(ApiError::tool(OPERATION))?;
    Ok(tool_response(output))
}

pub async fn unlock(
    State(config): State<SharedConfig>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    const OPERATION: &str = "unlock";

    let form = UploadForm::read(multipart).await?;
    let file = form.require_file()?;
    let password = form.require_password()?;
    require_tool(&config, OPERATION, Tool::Qpdf)?;

    let output = invoke(&file.bytes, &ToolJob::Unlock { password }, &config.tools)
        .await
        .map_err(ApiError::tool(OPERATION))?;
    Ok(tool_response(output))
}
