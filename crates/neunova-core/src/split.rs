//! PDF Split
//!
//! Every resolved page becomes its own single-page document, and all of them
//! are bundled into one ZIP archive.

use tracing::debug;

use crate::archive::collect_archive;
use crate::error::PdfError;
use crate::extract::{extract_from, load};
use crate::pages;

/// Split `bytes` into single-page documents selected by `spec`.
///
/// Entries are named `extracted_<n>.pdf` where `n` is the 1-based position
/// in the selection, not the page number. If any page fails the whole split
/// fails and no archive is produced.
pub fn split_to_archive(bytes: &[u8], spec: &str) -> Result<Vec<u8>, PdfError> {
    let doc = load(bytes)?;
    let selections = pages::split_selections(spec, doc.get_pages().len());
    debug!(spec, units = selections.len(), "splitting document");

    collect_archive(selections.iter().enumerate(), |(position, selection)| {
        let unit = extract_from(&doc, selection)?;
        Ok((format!("extracted_{}.pdf", position + 1), unit))
    })
}
