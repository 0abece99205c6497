//! Structural audit for documents.
//!
//! Reports broken tree invariants without modifying the document. The
//! mutation API checks a clean audit after every applied edit in debug
//! builds; hosts can run it over loaded data as a health check.

use crate::id::ElementId;
use crate::model::{Document, is_column_key};
use std::collections::HashSet;

/// A single broken invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditFinding {
    /// The element this finding refers to, if any.
    pub element_id: Option<ElementId>,
    /// Human-readable message.
    pub message: String,
    /// Short rule identifier (e.g. "duplicate-id", "nested-container").
    pub rule: &'static str,
}

// ─── Public API ───────────────────────────────────────────────────────────

/// Run every audit rule and return the findings. Empty means healthy.
#[must_use]
pub fn audit_document(doc: &Document) -> Vec<AuditFinding> {
    let mut findings = Vec::new();
    audit_pages(doc, &mut findings);
    audit_duplicate_ids(doc, &mut findings);
    audit_nested_containers(doc, &mut findings);
    audit_column_attributes(doc, &mut findings);
    findings
}

// ─── Rules ────────────────────────────────────────────────────────────────

fn audit_pages(doc: &Document, findings: &mut Vec<AuditFinding>) {
    if doc.pages.is_empty() {
        findings.push(AuditFinding {
            element_id: None,
            message: "document has no pages".into(),
            rule: "no-pages",
        });
    } else if doc.active >= doc.pages.len() {
        findings.push(AuditFinding {
            element_id: None,
            message: format!(
                "active page {} is out of range ({} pages)",
                doc.active,
                doc.pages.len()
            ),
            rule: "active-page-range",
        });
    }
    if !doc.multi_page && doc.pages.len() > 1 {
        findings.push(AuditFinding {
            element_id: None,
            message: format!("single-page document holds {} pages", doc.pages.len()),
            rule: "single-page-count",
        });
    }
}

/// Two nodes sharing an id. Also catches one node reachable from two places.
fn audit_duplicate_ids(doc: &Document, findings: &mut Vec<AuditFinding>) {
    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    doc.for_each_node(|_, node| {
        let id = node.id();
        if !seen.insert(id) && reported.insert(id) {
            findings.push(AuditFinding {
                element_id: Some(id),
                message: format!("id `{id}` occurs more than once"),
                rule: "duplicate-id",
            });
        }
    });
}

fn audit_nested_containers(doc: &Document, findings: &mut Vec<AuditFinding>) {
    doc.for_each_node(|loc, node| {
        if loc.seq.is_column() && node.is_container() {
            findings.push(AuditFinding {
                element_id: Some(node.id()),
                message: format!("layout container `{}` sits inside {}", node.id(), loc.seq),
                rule: "nested-container",
            });
        }
    });
}

/// Column contents belong in the columns, never in the attribute bag.
fn audit_column_attributes(doc: &Document, findings: &mut Vec<AuditFinding>) {
    doc.for_each_node(|_, node| {
        if node.is_container() && node.attributes().keys().any(|k| is_column_key(k)) {
            findings.push(AuditFinding {
                element_id: Some(node.id()),
                message: format!("container `{}` carries column data in its attributes", node.id()),
                rule: "stray-column-attributes",
            });
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Column, ElementKind, ElementNode, Page, PageConfig};
    use crate::registry::construct;

    fn node(kind: ElementKind, id: &str) -> ElementNode {
        construct(kind, ElementId::intern(id))
    }

    fn rules(doc: &Document) -> Vec<&'static str> {
        audit_document(doc).into_iter().map(|f| f.rule).collect()
    }

    #[test]
    fn audit_clean_document_no_findings() {
        let layout = node(ElementKind::TwoColumnLayoutField, "au_layout")
            .with_child(Column::Left, node(ElementKind::TextField, "au_name"));
        let doc = Document::from_elements(vec![node(ElementKind::TitleField, "au_title"), layout]);
        assert!(audit_document(&doc).is_empty());
    }

    #[test]
    fn audit_duplicate_across_columns() {
        let layout = node(ElementKind::TwoColumnLayoutField, "au_layout2")
            .with_child(Column::Left, node(ElementKind::TextField, "au_dup"))
            .with_child(Column::Right, node(ElementKind::TextField, "au_dup"));
        let doc = Document::from_elements(vec![layout]);
        let findings = audit_document(&doc);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].rule, "duplicate-id");
        assert_eq!(findings[0].element_id, Some(ElementId::intern("au_dup")));
    }

    #[test]
    fn audit_nested_layout() {
        let inner = node(ElementKind::TwoColumnLayoutField, "au_inner");
        let outer = node(ElementKind::TwoColumnLayoutField, "au_outer").with_child(Column::Right, inner);
        assert_eq!(rules(&Document::from_elements(vec![outer])), ["nested-container"]);
    }

    #[test]
    fn audit_page_bookkeeping() {
        let doc = Document {
            pages: vec![Page::new(PageConfig::default()), Page::default()],
            active: 5,
            multi_page: false,
        };
        assert_eq!(rules(&doc), ["active-page-range", "single-page-count"]);
    }
}
