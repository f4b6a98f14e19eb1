//! Tool locations, timeout and the capability set derived from them.

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{info, warn};

/// An external binary the service can delegate to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tool {
    Ghostscript,
    Qpdf,
    LibreOffice,
    Pdftoppm,
}

impl Tool {
    pub const ALL: [Tool; 4] = [
        Tool::Ghostscript,
        Tool::Qpdf,
        Tool::LibreOffice,
        Tool::Pdftoppm,
    ];

    /// Conventional binary name.
    pub fn default_binary(self) -> &'static str {
        match self {
            Tool::Ghostscript => "gs",
            Tool::Qpdf => "qpdf",
            Tool::LibreOffice => "soffice",
            Tool::Pdftoppm => "pdftoppm",
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tool::Ghostscript => write!(f, "ghostscript"),
            Tool::Qpdf => write!(f, "qpdf"),
            Tool::LibreOffice => write!(f, "libreoffice"),
            Tool::Pdftoppm => write!(f, "pdftoppm"),
        }
    }
}

/// Binary path (or bare name looked up on `PATH`) for each tool.
#[derive(Debug, Clone)]
pub struct ToolPaths {
    pub ghostscript: PathBuf,
    pub qpdf: PathBuf,
    pub libreoffice: PathBuf,
    pub pdftoppm: PathBuf,
}

impl ToolPaths {
    pub fn binary(&self, tool: Tool) -> &Path {
        match tool {
            Tool::Ghostscript => &self.ghostscript,
            Tool::Qpdf => &self.qpdf,
            Tool::LibreOffice => &self.libreoffice,
            Tool::Pdftoppm => &self.pdftoppm,
        }
    }
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            ghostscript: Tool::Ghostscript.default_binary().into(),
            qpdf: Tool::Qpdf.default_binary().into(),
            libreoffice: Tool::LibreOffice.default_binary().into(),
            pdftoppm: Tool::Pdftoppm.default_binary().into(),
        }
    }
}

/// Everything an invocation needs besides its input.
#[derive(Debug, Clone)]
pub struct ToolConfig {
    pub paths: ToolPaths,
    /// Parent directory for per-job scratch directories.
    pub temp_dir: PathBuf,
    /// Upper bound on a single external process run.
    pub timeout: Duration,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            paths: ToolPaths::default(),
            temp_dir: std::env::temp_dir(),
            timeout: Duration::from_secs(120),
        }
    }
}

/// Which tools this deployment can actually run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Capabilities {
    available: BTreeSet<Tool>,
}

impl Capabilities {
    /// Look up every configured binary with `which`.
    pub fn detect(paths: &ToolPaths) -> Self {
        let mut available = BTreeSet::new();
        for tool in Tool::ALL {
            let binary = paths.binary(tool);
            match which::which(binary) {
                Ok(resolved) => {
                    info!(%tool, path = %resolved.display(), "external tool available");
                    available.insert(tool);
                }
                Err(e) => {
                    warn!(%tool, binary = %binary.display(), error = %e, "external tool not found, dependent endpoints will answer 501");
                }
            }
        }
        Self { available }
    }

    pub fn all() -> Self {
        Self::with(Tool::ALL)
    }

    pub fn none() -> Self {
        Self::default()
    }

    pub fn with(tools: impl IntoIterator<Item = Tool>) -> Self {
        Self {
            available: tools.into_iter().collect(),
        }
    }

    pub fn is_available(&self, tool: Tool) -> bool {
        self.available.contains(&tool)
    }

    pub fn iter(&self) -> impl Iterator<Item = Tool> + '_ {
        self.available.iter().copied()
    }
}
