//! Page extraction
//!
//! Builds a new document from a list of zero-based page indices. The list
//! may reorder pages and may name the same page more than once.

use std::collections::HashSet;

use lopdf::{Document, Object};
use tracing::debug;

use crate::error::PdfError;
use crate::page_tree::{flatten_page, page_ids, pages_root_id, save, set_root_kids};
use crate::pages;

/// Load `bytes`, resolve `spec` against its page count and extract.
pub fn extract_selection(bytes: &[u8], spec: &str) -> Result<Vec<u8>, PdfError> {
    let doc = load(bytes)?;
    let indices = pages::resolve(spec, doc.get_pages().len());
    debug!(spec, selected = indices.len(), "resolved page selection");
    extract_from(&doc, &indices)
}

/// Extract the pages at `indices` (0-based) into a new document.
///
/// An index past the end of the document is an error; the resolver never
/// produces one, but callers passing raw indices might.
pub fn extract_pages(bytes: &[u8], indices: &[usize]) -> Result<Vec<u8>, PdfError> {
    let doc = load(bytes)?;
    extract_from(&doc, indices)
}

pub(crate) fn load(bytes: &[u8]) -> Result<Document, PdfError> {
    Document::load_mem(bytes).map_err(|e| PdfError::ParseError(e.to_string()))
}

/// Extraction on an already-parsed document. The source is cloned so the
/// caller can extract from it repeatedly.
pub(crate) fn extract_from(source: &Document, indices: &[usize]) -> Result<Vec<u8>, PdfError> {
    let ids = page_ids(source);

    if let Some(&bad) = indices.iter().find(|&&i| i >= ids.len()) {
        return Err(PdfError::InvalidSelection(format!(
            "Page {} does not exist (document has {} pages)",
            bad + 1,
            ids.len()
        )));
    }

    let mut doc = source.clone();
    let root_id = pages_root_id(&doc)?;

    // The first use of a page keeps its object; repeats get a copy so every
    // page object in the tree has exactly one parent.
    let mut used = HashSet::new();
    let mut kids = Vec::with_capacity(indices.len());

    for &index in indices {
        let source_id = ids[index];
        let mut page = flatten_page(&doc, source_id)?;
        page.set("Parent", Object::Reference(root_id));

        let id = if used.insert(source_id) {
            doc.objects.insert(source_id, Object::Dictionary(page));
            source_id
        } else {
            doc.add_object(page)
        };
        kids.push(id);
    }

    set_root_kids(&mut doc, root_id, kids)?;
    save(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{create_test_pdf, page_labels};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_extract_single_page() {
        let pdf = create_test_pdf(5, "Doc");
        let result = extract_pages(&pdf, &[0]).unwrap();
        assert_eq!(page_labels(&result), vec!["Doc-Page-1"]);
    }

    #[test]
    fn test_extract_keeps_requested_order() {
        let pdf = create_test_pdf(5, "Doc");
        let result = extract_pages(&pdf, &[4, 0, 2]).unwrap();
        assert_eq!(
            page_labels(&result),
            vec!["Doc-Page-5", "Doc-Page-1", "Doc-Page-3"]
        );
    }

    #[test]
    fn test_extract_duplicates_pages() {
        let pdf = create_test_pdf(3, "Doc");
        let result = extract_pages(&pdf, &[0, 0, 1]).unwrap();
        assert_eq!(
            page_labels(&result),
            vec!["Doc-Page-1", "Doc-Page-1", "Doc-Page-2"]
        );
    }

    #[test]
    fn test_extract_out_of_range_fails() {
        let pdf = create_test_pdf(5, "Doc");
        let result = extract_pages(&pdf, &[5]);
        assert!(matches!(result, Err(PdfError::InvalidSelection(_))));
    }

    #[test]
    fn test_extract_nothing_yields_empty_document() {
        let pdf = create_test_pdf(3, "Doc");
        let result = extract_pages(&pdf, &[]).unwrap();
        let doc = Document::load_mem(&result).unwrap();
        assert_eq!(doc.get_pages().len(), 0);
    }

    #[test]
    fn test_extract_selection_uses_spec() {
        let pdf = create_test_pdf(10, "Doc");
        let result = extract_selection(&pdf, "2-4, 9").unwrap();
        assert_eq!(
            page_labels(&result),
            vec!["Doc-Page-2", "Doc-Page-3", "Doc-Page-4", "Doc-Page-9"]
        );
    }

    #[test]
    fn test_extract_selection_empty_spec_keeps_everything() {
        let pdf = create_test_pdf(4, "Doc");
        let result = extract_selection(&pdf, "").unwrap();
        assert_eq!(page_labels(&result).len(), 4);
    }

    #[test]
    fn test_extract_garbage_input_fails_to_parse() {
        let result = extract_selection(b"not a pdf", "1");
        assert!(matches!(result, Err(PdfError::ParseError(_))));
    }

    #[test]
    fn test_extract_keeps_inherited_media_box() {
        let pdf = crate::test_support::create_nested_test_pdf();
        let result = extract_pages(&pdf, &[1]).unwrap();
        let doc = Document::load_mem(&result).unwrap();
        let page_id = *doc.get_pages().values().next().unwrap();
        let page = doc.get_dictionary(page_id).unwrap();
        assert!(page.get(b"MediaBox").is_ok());
    }
}
