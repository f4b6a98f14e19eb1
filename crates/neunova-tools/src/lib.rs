//! External tool invocation for the Neunova service
//!
//! Every conversion that leaves the process follows one contract:
//!
//! 1. materialize the input in a fresh per-job scratch directory
//! 2. run the tool with arguments derived from the [`ToolJob`], under a timeout
//! 3. read the output from an explicit path, or scan for it when the tool
//!    picks its own name (LibreOffice)
//! 4. remove the scratch directory, whatever happened
//!
//! Which tools exist is a deployment property, detected once at startup into
//! [`Capabilities`].

pub mod config;
pub mod error;
pub mod invoke;
pub mod job;
pub mod output;
pub mod process;
pub mod workspace;

pub use config::{Capabilities, Tool, ToolConfig, ToolPaths};
pub use error::ToolError;
pub use invoke::{invoke, render_pages_archive, ToolOutput};
pub use job::{CompressionLevel, OfficeFormat, ToolJob};
pub use workspace::JobWorkspace;
