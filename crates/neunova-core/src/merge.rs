//! PDF Merge
//!
//! Combines multiple PDFs into a single document, pages in upload order.

use std::collections::BTreeMap;

use lopdf::{Document, Object, ObjectId};
use tracing::debug;

use crate::error::PdfError;
use crate::page_tree::{flatten_page, page_ids, pages_root_id, save, set_root_kids};

/// Merge multiple PDFs into one
///
/// The algorithm:
/// 1. If empty, return error
/// 2. If single document, check it parses and return it as-is
/// 3. Use the first document as the destination
/// 4. For each further source document:
///    a. Offset its object IDs past the destination's highest ID
///    b. Import all objects with remapped references
///    c. Append its pages to the destination page list
/// 5. Re-hang every page directly under the destination's root `/Pages`
/// 6. Prune, compress and return the merged result
pub fn merge_documents(documents: Vec<Vec<u8>>) -> Result<Vec<u8>, PdfError> {
    if documents.is_empty() {
        return Err(PdfError::OperationError("No documents to merge".into()));
    }

    // Load all documents first
    let mut loaded_docs = Vec::with_capacity(documents.len());
    for (i, doc_bytes) in documents.iter().enumerate() {
        let doc = Document::load_mem(doc_bytes).map_err(|e| {
            PdfError::ParseError(format!("Failed to load document {}: {}", i + 1, e))
        })?;
        loaded_docs.push(doc);
    }

    if loaded_docs.len() == 1 {
        return Ok(documents.into_iter().next().unwrap_or_default());
    }

    let mut dest = loaded_docs.remove(0);
    let mut dest_max_id = dest.max_id;
    let mut dest_page_refs = page_ids(&dest);

    for source in loaded_docs.into_iter() {
        let source_pages = page_ids(&source);
        let id_offset = dest_max_id;

        for (old_id, object) in source.objects.into_iter() {
            let new_id = (old_id.0 + id_offset, old_id.1);
            dest.objects.insert(new_id, remap_object_refs(object, id_offset));
        }

        dest_page_refs.extend(
            source_pages
                .into_iter()
                .map(|(number, generation)| (number + id_offset, generation)),
        );

        dest_max_id = (source.max_id + id_offset).max(dest_max_id);
    }
    dest.max_id = dest_max_id;

    debug!(pages = dest_page_refs.len(), "rebuilding merged page tree");
    reparent_pages(&mut dest, dest_page_refs)?;

    save(dest)
}

/// Flatten inherited attributes onto each page and attach it to the root.
fn reparent_pages(doc: &mut Document, page_refs: Vec<ObjectId>) -> Result<(), PdfError> {
    let root_id = pages_root_id(doc)?;

    let mut flattened = BTreeMap::new();
    for &page_id in &page_refs {
        let mut page = flatten_page(doc, page_id)?;
        page.set("Parent", Object::Reference(root_id));
        flattened.insert(page_id, page);
    }
    for (page_id, page) in flattened {
        doc.objects.insert(page_id, Object::Dictionary(page));
    }

    set_root_kids(doc, root_id, page_refs)
}

/// Recursively remap object references in an object
fn remap_object_refs(obj: Object, offset: u32) -> Object {
    match obj {
        Object::Reference(id) => Object::Reference((id.0 + offset, id.1)),
        Object::Array(arr) => Object::Array(
            arr.into_iter()
                .map(|o| remap_object_refs(o, offset))
                .collect(),
        ),
        Object::Dictionary(mut dict) => {
            for (_, value) in dict.iter_mut() {
                *value = remap_object_refs(value.clone(), offset);
            }
            Object::Dictionary(dict)
        }
        Object::Stream(mut stream) => {
            for (_, value) in stream.dict.iter_mut() {
                *value = remap_object_refs(value.clone(), offset);
            }
            Object::Stream(stream)
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{create_nested_test_pdf, create_test_pdf, page_labels};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_merge_empty_fails() {
        let result = merge_documents(vec![]);
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("No documents to merge"));
    }

    #[test]
    fn test_merge_single_document_returns_same() {
        let pdf = create_test_pdf(2, "Single");
        let result = merge_documents(vec![pdf.clone()]).unwrap();
        assert_eq!(result, pdf);
    }

    #[test]
    fn test_merge_single_invalid_document_fails() {
        let result = merge_documents(vec![b"hello".to_vec()]);
        assert!(matches!(result, Err(PdfError::ParseError(_))));
    }

    #[test]
    fn test_merge_two_documents_combines_pages() {
        let doc_a = create_test_pdf(2, "DocA");
        let doc_b = create_test_pdf(3, "DocB");

        let merged = merge_documents(vec![doc_a, doc_b]).unwrap();

        let doc = Document::load_mem(&merged).unwrap();
        assert_eq!(doc.get_pages().len(), 5, "Merged document should have 5 pages");
    }

    #[test]
    fn test_merge_preserves_page_order() {
        let doc1 = create_test_pdf(2, "First");
        let doc2 = create_test_pdf(1, "Second");
        let doc3 = create_test_pdf(2, "Third");

        let merged = merge_documents(vec![doc1, doc2, doc3]).unwrap();

        assert_eq!(
            page_labels(&merged),
            vec![
                "First-Page-1",
                "First-Page-2",
                "Second-Page-1",
                "Third-Page-1",
                "Third-Page-2"
            ]
        );
    }

    #[test]
    fn test_merge_handles_different_sizes() {
        let doc1 = create_test_pdf(10, "Large");
        let doc2 = create_test_pdf(1, "Small");
        let doc3 = create_test_pdf(5, "Medium");

        let merged = merge_documents(vec![doc1, doc2, doc3]).unwrap();

        let doc = Document::load_mem(&merged).unwrap();
        assert_eq!(doc.get_pages().len(), 16, "Merged document should have 16 pages");
    }

    #[test]
    fn test_merged_pages_point_at_root() {
        let merged =
            merge_documents(vec![create_test_pdf(1, "A"), create_nested_test_pdf()]).unwrap();

        let doc = Document::load_mem(&merged).unwrap();
        let root_id = pages_root_id(&doc).unwrap();
        for page_id in doc.get_pages().into_values() {
            let page = doc.get_dictionary(page_id).unwrap();
            assert_eq!(page.get(b"Parent").unwrap().as_reference().unwrap(), root_id);
            assert!(page.get(b"MediaBox").is_ok(), "inherited MediaBox must survive");
        }
    }
}
