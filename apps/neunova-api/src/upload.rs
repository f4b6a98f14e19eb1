//! Multipart form buffering.
//!
//! Every endpoint takes a small number of parts, so the whole form is read
//! into memory up front and handlers pick what they need by field name. The
//! request body limit bounds the total size.

use axum::body::Bytes;
use axum::extract::Multipart;
use neunova_core::ImageInput;

use crate::error::ApiError;

/// One part of a multipart form.
#[derive(Debug, Clone)]
pub struct UploadPart {
    pub name: String,
    pub file_name: Option<String>,
    pub bytes: Bytes,
}

impl UploadPart {
    /// Lowercased extension of the client-side filename, if it has a
    /// plausible one.
    pub fn extension(&self) -> Option<String> {
        let file_name = self.file_name.as_deref()?;
        let (_, ext) = file_name.rsplit_once('.')?;
        let ext = ext.to_ascii_lowercase();
        let plausible =
            !ext.is_empty() && ext.len() <= 5 && ext.chars().all(|c| c.is_ascii_alphanumeric());
        plausible.then_some(ext)
    }
}

#[derive(Debug, Default)]
pub struct UploadForm {
    parts: Vec<UploadPart>,
}

impl UploadForm {
    pub async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut parts = Vec::new();
        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            let file_name = field.file_name().map(str::to_string);
            let bytes = field.bytes().await?;
            tracing::debug!(field = %name, bytes = bytes.len(), "received form part");
            parts.push(UploadPart {
                name,
                file_name,
                bytes,
            });
        }
        Ok(Self { parts })
    }

    /// The first part named `name`.
    pub fn part(&self, name: &str) -> Option<&UploadPart> {
        self.parts.iter().find(|p| p.name == name)
    }

    /// Every part named `name`, in upload order.
    pub fn parts(&self, name: &str) -> Vec<&UploadPart> {
        self.parts.iter().filter(|p| p.name == name).collect()
    }

    /// A text field, with surrounding whitespace removed. Empty counts as
    /// absent.
    pub fn text(&self, name: &str) -> Option<String> {
        let part = self.part(name)?;
        let text = String::from_utf8_lossy(&part.bytes).trim().to_string();
        (!text.is_empty()).then_some(text)
    }

    /// The single `file` part every one-document endpoint requires.
    pub fn require_file(&self) -> Result<&UploadPart, ApiError> {
        self.part("file")
            .ok_or(ApiError::MissingFile("No file uploaded"))
    }

    /// A text field exactly as sent. Only an empty value counts as absent.
    pub fn raw_text(&self, name: &str) -> Option<String> {
        let part = self.part(name)?;
        let text = String::from_utf8_lossy(&part.bytes).into_owned();
        (!text.is_empty()).then_some(text)
    }

    /// The `password` field required by protect and unlock, passed through
    /// verbatim: surrounding spaces are part of the password.
    pub fn require_password(&self) -> Result<String, ApiError> {
        self.raw_text("password")
            .ok_or(ApiError::MissingField("Password required"))
    }

    /// Every `images` part as library input, named after the client filename.
    pub fn images(&self) -> Vec<ImageInput> {
        self.parts("images")
            .into_iter()
            .enumerate()
            .map(|(i, part)| ImageInput {
                name: part
                    .file_name
                    .clone()
                    .unwrap_or_else(|| format!("image-{}", i + 1)),
                bytes: part.bytes.to_vec(),
            })
            .collect()
    }
}
