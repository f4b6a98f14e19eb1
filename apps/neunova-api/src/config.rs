//! Service configuration shared by every handler.

use neunova_tools::{Capabilities, ToolConfig};

/// Default request body limit, in MiB.
pub const DEFAULT_MAX_UPLOAD_MB: usize = 200;

/// Everything the router needs, built once in `main` and shared behind an
/// `Arc`.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Upper bound on a whole multipart request body.
    pub max_upload_bytes: usize,
    pub tools: ToolConfig,
    /// Tools found at startup. Endpoints needing anything else answer 501.
    pub capabilities: Capabilities,
}

impl ServiceConfig {
    pub fn new(tools: ToolConfig, capabilities: Capabilities) -> Self {
        Self {
            max_upload_bytes: DEFAULT_MAX_UPLOAD_MB * 1024 * 1024,
            tools,
            capabilities,
        }
    }

    pub fn with_max_upload_mb(mut self, megabytes: usize) -> Self {
        self.max_upload_bytes = megabytes.saturating_mul(1024 * 1024);
        self
    }
}
