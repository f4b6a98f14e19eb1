//! Neunova document conversion API
//!
//! A stateless HTTP service wrapping PDF page operations (merge, split,
//! extract, images to PDF) and the external converters the host provides
//! (ghostscript, qpdf, LibreOffice, pdftoppm).
//!
//! The router is built here rather than in `main` so tests can drive it
//! directly with `tower::ServiceExt::oneshot`.

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod config;
pub mod error;
pub mod handlers;
pub mod upload;

pub use config::ServiceConfig;
pub use error::ApiError;

/// Build the application router.
pub fn router(config: Arc<ServiceConfig>) -> Router {
    // CORS configuration for browser clients
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(handlers::health))
        // Page operations
        .route("/api/merge", post(handlers::merge))
        .route("/api/split", post(handlers::split))
        .route("/api/extract", post(handlers::extract))
        .route("/api/jpg2pdf", post(handlers::jpg2pdf))
        // External tools
        .route("/api/compress", post(handlers::compress))
        .route("/api/pdf2jpg", post(handlers::pdf2jpg))
        .route("/api/word2pdf", post(handlers::word2pdf))
        .route("/api/excel2pdf", post(handlers::excel2pdf))
        .route("/api/ppt2pdf", post(handlers::ppt2pdf))
        .route("/api/pdf2word", post(handlers::pdf2word))
        .route("/api/pdf2excel", post(handlers::pdf2excel))
        .route("/api/pdf2ppt", post(handlers::pdf2ppt))
        .route("/api/protect", post(handlers::protect))
        .route("/api/unlock", post(handlers::unlock))
        // Add middleware
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(config)
}
