//! Neunova API server
//!
//! Configuration comes from flags, environment variables or a `.env` file,
//! in that order of precedence.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use neunova_api::{router, ServiceConfig};
use neunova_tools::{Capabilities, ToolConfig, ToolPaths};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Command-line arguments for the Neunova API server
#[derive(Parser, Debug)]
#[command(name = "neunova-api")]
#[command(about = "Document conversion HTTP API")]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value = "3000")]
    port: u16,

    /// Host address to bind to
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    /// Maximum request body size in MiB
    #[arg(long, env = "MAX_UPLOAD_MB", default_value = "200")]
    max_upload_mb: usize,

    /// Parent directory for per-job scratch directories (defaults to the OS temp dir)
    #[arg(long, env = "NEUNOVA_TEMP_DIR")]
    temp_dir: Option<PathBuf>,

    /// Upper bound on a single external tool run, in seconds
    #[arg(long, env = "TOOL_TIMEOUT_SECS", default_value = "120")]
    tool_timeout_secs: u64,

    /// Ghostscript binary
    #[arg(long, env = "GS_BIN", default_value = "gs")]
    gs_bin: PathBuf,

    /// qpdf binary
    #[arg(long, env = "QPDF_BIN", default_value = "qpdf")]
    qpdf_bin: PathBuf,

    /// LibreOffice binary
    #[arg(long, env = "SOFFICE_BIN", default_value = "soffice")]
    soffice_bin: PathBuf,

    /// pdftoppm binary
    #[arg(long, env = "PDFTOPPM_BIN", default_value = "pdftoppm")]
    pdftoppm_bin: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present, before clap reads the environment
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            EnvFilter::from_default_env()
                .add_directive(format!("neunova_api={}", level).parse()?)
                .add_directive(format!("neunova_tools={}", level).parse()?)
                .add_directive("tower_http=debug".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let tools = ToolConfig {
        paths: ToolPaths {
            ghostscript: args.gs_bin,
            qpdf: args.qpdf_bin,
            libreoffice: args.soffice_bin,
            pdftoppm: args.pdftoppm_bin,
        },
        temp_dir: args.temp_dir.unwrap_or_else(std::env::temp_dir),
        timeout: Duration::from_secs(args.tool_timeout_secs),
    };
    std::fs::create_dir_all(&tools.temp_dir)?;

    let capabilities = Capabilities::detect(&tools.paths);
    if capabilities.iter().next().is_none() {
        warn!("no external tools found, only in-process operations are available");
    }

    let config = ServiceConfig::new(tools, capabilities).with_max_upload_mb(args.max_upload_mb);
    info!("Temp dir: {}", config.tools.temp_dir.display());
    info!("Tool timeout: {}s", args.tool_timeout_secs);
    info!("Upload limit: {} MiB", args.max_upload_mb);

    let app = router(Arc::new(config));

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Neunova API listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
