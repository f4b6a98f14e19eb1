//! Page tree helpers shared by merge and extract.
//!
//! Both operations end up with a flat list of page objects hung directly off
//! the root `/Pages` node. Attributes a page used to inherit from an
//! intermediate node are copied onto the page first so nothing is lost when
//! the intermediate nodes are pruned.

use std::collections::HashSet;

use lopdf::{Dictionary, Document, Object, ObjectId};

use crate::error::PdfError;

/// Page attributes that may be inherited from ancestor `/Pages` nodes.
const INHERITABLE_KEYS: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Look up the root `/Pages` node through the trailer and catalog.
pub(crate) fn pages_root_id(doc: &Document) -> Result<ObjectId, PdfError> {
    let catalog_id = doc
        .trailer
        .get(b"Root")
        .and_then(Object::as_reference)
        .map_err(|_| PdfError::OperationError("No Root in trailer".into()))?;

    let catalog = doc
        .get_dictionary(catalog_id)
        .map_err(|_| PdfError::OperationError("Catalog not found".into()))?;

    catalog
        .get(b"Pages")
        .and_then(Object::as_reference)
        .map_err(|_| PdfError::OperationError("No Pages in catalog".into()))
}

/// Page object ids in document order.
pub(crate) fn page_ids(doc: &Document) -> Vec<ObjectId> {
    doc.get_pages().into_values().collect()
}

/// Copy of the page dictionary with inherited attributes made explicit.
pub(crate) fn flatten_page(doc: &Document, page_id: ObjectId) -> Result<Dictionary, PdfError> {
    let mut page = doc
        .get_dictionary(page_id)
        .map_err(|e| PdfError::ParseError(format!("Page {:?} is not a dictionary: {}", page_id, e)))?
        .clone();

    let mut visited = HashSet::new();
    let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();

    while let Some(parent_id) = parent {
        if !visited.insert(parent_id) {
            break;
        }
        let Ok(node) = doc.get_dictionary(parent_id) else {
            break;
        };
        for key in INHERITABLE_KEYS {
            if !page.has(key) {
                if let Ok(value) = node.get(key) {
                    page.set(key.to_vec(), value.clone());
                }
            }
        }
        parent = node.get(b"Parent").and_then(Object::as_reference).ok();
    }

    Ok(page)
}

/// Point the root `/Pages` node at `kids`, in order.
pub(crate) fn set_root_kids(
    doc: &mut Document,
    root_id: ObjectId,
    kids: Vec<ObjectId>,
) -> Result<(), PdfError> {
    match doc.objects.get_mut(&root_id) {
        Some(Object::Dictionary(root)) => {
            root.set("Count", Object::Integer(kids.len() as i64));
            root.set(
                "Kids",
                Object::Array(kids.into_iter().map(Object::Reference).collect()),
            );
            root.remove(b"Parent");
            Ok(())
        }
        _ => Err(PdfError::OperationError(
            "Invalid pages dictionary".into(),
        )),
    }
}

/// Serialize after dropping unreachable objects.
pub(crate) fn save(mut doc: Document) -> Result<Vec<u8>, PdfError> {
    doc.prune_objects();
    doc.compress();

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)
        .map_err(|e| PdfError::OperationError(format!("Save failed: {}", e)))?;
    Ok(buffer)
}
