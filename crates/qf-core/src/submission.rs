//! Submission-time validation over a whole document.

use crate::id::ElementId;
use crate::model::Document;
use crate::registry;
use std::collections::HashMap;

/// Check submitted values against every element, on every page and in
/// every column. Returns the ids that failed, in render order.
///
/// A missing value is validated as the empty string.
#[must_use]
pub fn validate_submission(doc: &Document, values: &HashMap<String, String>) -> Vec<ElementId> {
    let mut failed = Vec::new();
    doc.for_each_node(|_, node| {
        let value = values.get(node.id().as_str()).map_or("", String::as_str);
        if !registry::validate(node, value) {
            failed.push(node.id());
        }
    });
    if !failed.is_empty() {
        log::debug!("submission rejected: {} invalid field(s)", failed.len());
    }
    failed
}
