//! Error types for the Neunova API

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use neunova_core::PdfError;
use neunova_tools::{Tool, ToolError};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// A required upload part (`file`, `files`, `images`) is absent.
    #[error("{0}")]
    MissingFile(&'static str),

    /// A required text field is absent or empty.
    #[error("{0}")]
    MissingField(&'static str),

    #[error("Upload error: {0}")]
    Upload(#[from] MultipartError),

    #[error("{0}")]
    Pdf(#[from] PdfError),

    #[error("{operation} failed: {source}")]
    Tool {
        operation: &'static str,
        #[source]
        source: ToolError,
    },

    #[error("{operation} is not available: {tool} is not installed on this server")]
    Unsupported { operation: &'static str, tool: Tool },

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn tool(operation: &'static str) -> impl FnOnce(ToolError) -> ApiError {
        move |source| ApiError::Tool { operation, source }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingFile(_) | ApiError::MissingField(_) => StatusCode::BAD_REQUEST,
            ApiError::Upload(e) => e.status(),
            ApiError::Unsupported { .. } => StatusCode::NOT_IMPLEMENTED,
            ApiError::Pdf(_) | ApiError::Tool { .. } | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ApiError::Upload(e) => e.body_text(),
            ApiError::Internal(e) => {
                tracing::error!("Internal error: {:#}", e);
                "Internal error".to_string()
            }
            other => other.to_string(),
        };

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %message, "request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %message, "request rejected");
        }

        (status, Json(json!({ "error": message }))).into_response()
    }
}
