//! Parser: persisted JSON → `Document`.
//!
//! Parsing is two-phase. The text is first read as plain JSON, then every
//! record is rebuilt through `registry::construct` for its kind, with the
//! persisted attributes overlaid on the fresh defaults. Column children are
//! rebuilt the same way. Nothing from the stored shape is trusted as-is.
//!
//! Shape errors are reported with a JSON-path-like location, e.g.
//! `$[2].extraAttributes.leftColumn[0]`.

use crate::error::BridgeError;
use crate::id::ElementId;
use crate::model::{Column, Document, ElementKind, ElementNode, Page, PageConfig};
use crate::registry;
use serde_json::Value;
use std::collections::HashSet;

/// Parse stored JSON text into a document.
pub fn deserialize(text: &str) -> Result<Document, BridgeError> {
    let value: Value = serde_json::from_str(text)?;
    from_value(&value)
}

/// Rebuild a document from an already-parsed JSON value.
///
/// A top-level list whose first entry has an `elements` key is read as a
/// multi-page document; any other list is a single page of element records.
pub fn from_value(value: &Value) -> Result<Document, BridgeError> {
    let Value::Array(items) = value else {
        return Err(BridgeError::malformed("$", "top level must be an array"));
    };

    let mut seen = HashSet::new();
    if items.first().is_some_and(is_page_record) {
        let pages = items
            .iter()
            .enumerate()
            .map(|(i, item)| parse_page(item, &format!("$[{i}]"), &mut seen))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Document::from_pages(pages))
    } else {
        let elements = parse_sequence(items, "$", false, &mut seen)?;
        Ok(Document::from_elements(elements))
    }
}

fn is_page_record(value: &Value) -> bool {
    value
        .as_object()
        .is_some_and(|obj| obj.contains_key("elements") && !obj.contains_key("type"))
}

fn parse_page(
    value: &Value,
    path: &str,
    seen: &mut HashSet<ElementId>,
) -> Result<Page, BridgeError> {
    let Some(obj) = value.as_object() else {
        return Err(BridgeError::malformed(path, "expected a page record"));
    };

    let elements = match obj.get("elements") {
        Some(Value::Array(items)) => {
            parse_sequence(items, &format!("{path}.elements"), false, seen)?
        }
        Some(_) => return Err(BridgeError::malformed(path, "`elements` must be an array")),
        None => return Err(BridgeError::malformed(path, "missing `elements`")),
    };

    let config = match obj.get("config") {
        None | Some(Value::Null) => PageConfig::default(),
        Some(config) => serde_json::from_value(config.clone()).map_err(|e| {
            BridgeError::malformed(&format!("{path}.config"), e.to_string())
        })?,
    };

    Ok(Page { elements, config })
}

fn parse_sequence(
    items: &[Value],
    path: &str,
    in_column: bool,
    seen: &mut HashSet<ElementId>,
) -> Result<Vec<ElementNode>, BridgeError> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| parse_node(item, &format!("{path}[{i}]"), in_column, seen))
        .collect()
}

fn parse_node(
    value: &Value,
    path: &str,
    in_column: bool,
    seen: &mut HashSet<ElementId>,
) -> Result<ElementNode, BridgeError> {
    let Some(obj) = value.as_object() else {
        return Err(BridgeError::malformed(path, "expected an element record"));
    };

    let id = match obj.get("id") {
        Some(Value::String(s)) if !s.is_empty() => ElementId::intern(s),
        Some(_) => return Err(BridgeError::malformed(path, "`id` must be a non-empty string")),
        None => return Err(BridgeError::malformed(path, "missing `id`")),
    };

    let kind: ElementKind = match obj.get("type") {
        Some(Value::String(name)) => name.parse().map_err(|_| BridgeError::UnknownKind {
            path: path.to_string(),
            kind: name.clone(),
        })?,
        Some(_) => return Err(BridgeError::malformed(path, "`type` must be a string")),
        None => return Err(BridgeError::malformed(path, "missing `type`")),
    };

    if !seen.insert(id) {
        return Err(BridgeError::malformed(
            path,
            format!("duplicate element id `{id}`"),
        ));
    }
    if in_column && kind.is_container() {
        return Err(BridgeError::malformed(
            path,
            "layout containers cannot be placed inside a column",
        ));
    }

    let extra = match obj.get("extraAttributes") {
        None | Some(Value::Null) => None,
        Some(Value::Object(map)) => Some(map),
        Some(_) => {
            return Err(BridgeError::malformed(
                path,
                "`extraAttributes` must be an object",
            ));
        }
    };

    // Fresh defaults for the kind, then the persisted properties on top.
    let mut node = registry::construct(kind, id);
    let Some(extra) = extra else {
        return Ok(node);
    };
    for (key, value) in extra {
        node.set_attribute(key.clone(), value.clone());
    }

    if kind.is_container() {
        for column in [Column::Left, Column::Right] {
            let key = column.wire_key();
            let children = match extra.get(key) {
                None | Some(Value::Null) => Vec::new(),
                Some(Value::Array(items)) => {
                    parse_sequence(items, &format!("{path}.extraAttributes.{key}"), true, seen)?
                }
                Some(_) => {
                    return Err(BridgeError::malformed(
                        path,
                        format!("`{key}` must be an array"),
                    ));
                }
            };
            if let Some(columns) = node.columns_mut() {
                *columns.get_mut(column) = children;
            }
        }
    }

    Ok(node)
}
