//! What to run for each conversion, and how to read the result back.

use std::ffi::OsString;
use std::path::Path;

use crate::config::Tool;
use crate::output::OutputLocation;
use crate::process::ToolCommand;
use crate::workspace::JobWorkspace;

pub const PDF_CONTENT_TYPE: &str = "application/pdf";
pub const JPEG_CONTENT_TYPE: &str = "image/jpeg";

/// Ghostscript quality tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompressionLevel {
    Low,
    #[default]
    Medium,
    High,
}

impl CompressionLevel {
    /// Parse a form value. Matching is exact; anything else means medium.
    pub fn from_param(value: &str) -> Self {
        match value {
            "low" => CompressionLevel::Low,
            "high" => CompressionLevel::High,
            _ => CompressionLevel::Medium,
        }
    }

    /// `-dPDFSETTINGS` value.
    pub fn pdf_settings(self) -> &'static str {
        match self {
            CompressionLevel::Low => "/screen",
            CompressionLevel::Medium => "/ebook",
            CompressionLevel::High => "/prepress",
        }
    }
}

/// Target of a LibreOffice conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfficeFormat {
    Pdf,
    Docx,
    Xlsx,
    Pptx,
}

impl OfficeFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OfficeFormat::Pdf => "pdf",
            OfficeFormat::Docx => "docx",
            OfficeFormat::Xlsx => "xlsx",
            OfficeFormat::Pptx => "pptx",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            OfficeFormat::Pdf => PDF_CONTENT_TYPE,
            OfficeFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            OfficeFormat::Xlsx => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            OfficeFormat::Pptx => {
                "application/vnd.openxmlformats-officedocument.presentationml.presentation"
            }
        }
    }

    /// LibreOffice opens PDFs in Draw unless told otherwise, and Draw cannot
    /// export to Writer or Impress formats.
    fn pdf_import_filter(self) -> Option<&'static str> {
        match self {
            OfficeFormat::Docx => Some("writer_pdf_import"),
            OfficeFormat::Pptx => Some("impress_pdf_import"),
            OfficeFormat::Pdf | OfficeFormat::Xlsx => None,
        }
    }
}

/// One external conversion step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolJob {
    Compress {
        level: CompressionLevel,
    },
    Protect {
        password: String,
    },
    Unlock {
        password: String,
    },
    OfficeConvert {
        target: OfficeFormat,
        /// Extension given to the materialized input; LibreOffice uses it
        /// to pick an import filter.
        input_extension: String,
    },
    RenderPage {
        /// 1-based page number.
        page: u32,
    },
}

/// A built command and where its output will appear.
#[derive(Debug, Clone)]
pub struct PreparedJob {
    pub command: ToolCommand,
    pub output: OutputLocation,
}

impl ToolJob {
    pub fn tool(&self) -> Tool {
        match self {
            ToolJob::Compress { .. } => Tool::Ghostscript,
            ToolJob::Protect { .. } | ToolJob::Unlock { .. } => Tool::Qpdf,
            ToolJob::OfficeConvert { .. } => Tool::LibreOffice,
            ToolJob::RenderPage { .. } => Tool::Pdftoppm,
        }
    }

    /// Short name used for workspace prefixes and log fields.
    pub fn name(&self) -> &'static str {
        match self {
            ToolJob::Compress { .. } => "compress",
            ToolJob::Protect { .. } => "protect",
            ToolJob::Unlock { .. } => "unlock",
            ToolJob::OfficeConvert { .. } => "office",
            ToolJob::RenderPage { .. } => "render",
        }
    }

    /// Prefix for the materialized input file.
    pub fn input_prefix(&self) -> &'static str {
        match self {
            ToolJob::OfficeConvert { input_extension, .. } => {
                match input_extension.as_str() {
                    "doc" | "docx" | "odt" | "rtf" => "inword",
                    "xls" | "xlsx" | "ods" | "csv" => "inexcel",
                    "ppt" | "pptx" | "odp" => "inppt",
                    _ => "inpdf",
                }
            }
            _ => "inpdf",
        }
    }

    pub fn input_extension(&self) -> &str {
        match self {
            ToolJob::OfficeConvert { input_extension, .. } => input_extension,
            _ => "pdf",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ToolJob::OfficeConvert { target, .. } => target.content_type(),
            ToolJob::RenderPage { .. } => JPEG_CONTENT_TYPE,
            _ => PDF_CONTENT_TYPE,
        }
    }

    pub fn download_name(&self) -> String {
        match self {
            ToolJob::Compress { .. } => "compressed.pdf".to_string(),
            ToolJob::Protect { .. } => "protected.pdf".to_string(),
            ToolJob::Unlock { .. } => "unlocked.pdf".to_string(),
            ToolJob::OfficeConvert { target, .. } => format!("converted.{}", target.extension()),
            ToolJob::RenderPage { page } => format!("page-{}.jpg", page),
        }
    }

    /// Build the argument list for `binary` reading `input`, with any output
    /// placed inside `workspace`.
    pub async fn prepare(
        &self,
        binary: &Path,
        input: &Path,
        workspace: &JobWorkspace,
    ) -> std::io::Result<PreparedJob> {
        let prepared = match self {
            ToolJob::Compress { level } => {
                let out = workspace.unique_path(self.name(), "pdf");
                let command = ToolCommand::new(binary)
                    .args([
                        "-sDEVICE=pdfwrite",
                        "-dCompatibilityLevel=1.4",
                    ])
                    .arg(format!("-dPDFSETTINGS={}", level.pdf_settings()))
                    .args(["-dNOPAUSE", "-dQUIET", "-dBATCH"])
                    .arg(prefixed("-sOutputFile=", &out))
                    .arg(input);
                PreparedJob {
                    command,
                    output: OutputLocation::Exact(out),
                }
            }
            ToolJob::Protect { password } => {
                let out = workspace.unique_path(self.name(), "pdf");
                let command = ToolCommand::new(binary)
                    .args(["--encrypt", password.as_str(), password.as_str(), "256", "--"])
                    .arg(input)
                    .arg(&out);
                PreparedJob {
                    command,
                    output: OutputLocation::Exact(out),
                }
            }
            ToolJob::Unlock { password } => {
                let out = workspace.unique_path(self.name(), "pdf");
                let command = ToolCommand::new(binary)
                    .arg(format!("--password={}", password))
                    .arg("--decrypt")
                    .arg(input)
                    .arg(&out);
                PreparedJob {
                    command,
                    output: OutputLocation::Exact(out),
                }
            }
            ToolJob::OfficeConvert {
                target,
                input_extension,
            } => {
                let out_dir = workspace.subdir("out").await?;
                let profile = workspace.subdir("profile").await?;

                let mut command = ToolCommand::new(binary)
                    .arg("--headless")
                    .arg(prefixed("-env:UserInstallation=file://", &profile));
                if input_extension == "pdf" {
                    if let Some(filter) = target.pdf_import_filter() {
                        command = command.arg(format!("--infilter={}", filter));
                    }
                }
                let command = command
                    .args(["--convert-to", target.extension(), "--outdir"])
                    .arg(&out_dir)
                    .arg(input);

                let stem = input
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default();
                PreparedJob {
                    command,
                    output: OutputLocation::Scan {
                        dir: out_dir,
                        stem,
                        suffix: format!(".{}", target.extension()),
                    },
                }
            }
            ToolJob::RenderPage { page } => {
                let out_prefix = workspace.path().join(format!("page-{}", page));
                let mut out = out_prefix.clone().into_os_string();
                out.push(".jpg");
                let command = ToolCommand::new(binary)
                    .arg("-jpeg")
                    .args(["-f".to_string(), page.to_string()])
                    .args(["-l".to_string(), page.to_string()])
                    .arg("-singlefile")
                    .arg(input)
                    .arg(&out_prefix);
                PreparedJob {
                    command,
                    output: OutputLocation::Exact(out.into()),
                }
            }
        };
        Ok(prepared)
    }
}

fn prefixed(prefix: &str, path: &Path) -> OsString {
    let mut arg = OsString::from(prefix);
    arg.push(path.as_os_str());
    arg
}
