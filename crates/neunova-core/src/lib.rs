//! Document operations for the Neunova service
//!
//! Everything here works on in-memory bytes with `lopdf`; nothing touches the
//! filesystem or spawns processes.
//!
//! - [`pages::resolve`]: page-range selection (`"1-3,5"` to zero-based indices)
//! - [`merge_documents`]: concatenate documents in order
//! - [`extract_selection`] / [`extract_pages`]: one document from selected pages
//! - [`split_to_archive`]: one single-page document per selected page, zipped
//! - [`images_to_pdf`]: one page per image
//! - [`ArchiveBuilder`]: all-or-nothing ZIP bundling for batch operations

pub mod archive;
pub mod error;
pub mod extract;
pub mod images;
pub mod merge;
mod page_tree;
pub mod pages;
pub mod split;

#[cfg(test)]
mod test_support;

pub use archive::{collect_archive, ArchiveBuilder};
pub use error::PdfError;
pub use extract::{extract_pages, extract_selection};
pub use images::{images_to_pdf, ImageInput};
pub use merge::merge_documents;
pub use pages::{resolve, split_selections};
pub use split::split_to_archive;

/// Parse PDF bytes and return page count
pub fn get_page_count(bytes: &[u8]) -> Result<u32, PdfError> {
    let doc = lopdf::Document::load_mem(bytes).map_err(|e| PdfError::ParseError(e.to_string()))?;
    Ok(doc.get_pages().len() as u32)
}
