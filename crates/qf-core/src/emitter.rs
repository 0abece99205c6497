//! Emitter: `Document` → persisted JSON.
//!
//! Produces plain data only. Single-page documents emit a list of element
//! records; multi-page documents emit a list of `{elements, config}` page
//! records. Container columns are flattened into the container's
//! `extraAttributes` as `leftColumn` / `rightColumn`.

use crate::model::{Column, Document, ElementNode, NavigationType, Page, PageConfig};
use serde_json::{Value, json};

/// Serialize a document to compact JSON text.
#[must_use]
pub fn serialize(doc: &Document) -> String {
    to_value(doc).to_string()
}

/// Serialize a document to indented JSON text.
#[must_use]
pub fn serialize_pretty(doc: &Document) -> String {
    format!("{:#}", to_value(doc))
}

/// Flatten a document into a JSON value.
#[must_use]
pub fn to_value(doc: &Document) -> Value {
    if doc.is_multi_page() {
        Value::Array(doc.pages().iter().map(page_value).collect())
    } else {
        elements_value(doc.pages()[0].elements())
    }
}

/// Flatten one node (and its columns, for containers).
#[must_use]
pub fn node_value(node: &ElementNode) -> Value {
    let mut attributes = node.attributes().clone();
    if let Some(columns) = node.columns() {
        for column in [Column::Left, Column::Right] {
            attributes.insert(
                column.wire_key().to_string(),
                elements_value(columns.get(column)),
            );
        }
    }
    json!({
        "id": node.id().as_str(),
        "type": node.kind().as_str(),
        "extraAttributes": attributes,
    })
}

fn elements_value(elements: &[ElementNode]) -> Value {
    Value::Array(elements.iter().map(node_value).collect())
}

fn page_value(page: &Page) -> Value {
    json!({
        "elements": elements_value(page.elements()),
        "config": config_value(&page.config),
    })
}

fn config_value(config: &PageConfig) -> Value {
    let navigation_type = match config.navigation_type {
        NavigationType::Tabs => "tabs",
        NavigationType::ProgressBar => "progress-bar",
    };
    json!({
        "navigationType": navigation_type,
        "showPageNumbers": config.show_page_numbers,
    })
}
