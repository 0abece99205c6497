//! Integration tests: tree invariants under sequences of edits.
//!
//! Every id stays unique, no node is reachable from two places, and the
//! audit stays clean no matter which mix of inserts, moves, and removals
//! runs against the document.

use qf_core::model::*;
use qf_core::registry::construct;
use qf_core::{ElementId, Mutation, TreeError, audit_document};

fn id(s: &str) -> ElementId {
    ElementId::intern(s)
}

fn node(kind: ElementKind, name: &str) -> ElementNode {
    construct(kind, id(name))
}

fn assert_healthy(doc: &Document) {
    let findings = audit_document(doc);
    assert!(findings.is_empty(), "audit findings: {findings:?}");
}

fn seeded() -> Document {
    Document::from_elements(vec![
        node(ElementKind::TitleField, "inv_title"),
        node(ElementKind::TwoColumnLayoutField, "inv_row_a")
            .with_child(Column::Left, node(ElementKind::TextField, "inv_first"))
            .with_child(Column::Right, node(ElementKind::TextField, "inv_last")),
        node(ElementKind::TwoColumnLayoutField, "inv_row_b"),
        node(ElementKind::CheckboxField, "inv_terms"),
    ])
}

// ─── Scripted edits ──────────────────────────────────────────────────────

#[test]
fn node_count_is_stable_across_moves() {
    let mut doc = seeded();
    let count = doc.node_count();

    let script = [
        Mutation::MoveInto {
            id: id("inv_first"),
            container: id("inv_row_b"),
            column: Column::Right,
        },
        Mutation::MoveInto {
            id: id("inv_last"),
            container: id("inv_row_a"),
            column: Column::Left,
        },
        Mutation::MoveBeside {
            id: id("inv_terms"),
            anchor: id("inv_first"),
            half: Half::Top,
        },
        Mutation::MoveBeside {
            id: id("inv_row_a"),
            anchor: id("inv_title"),
            half: Half::Top,
        },
        Mutation::MoveTo {
            id: id("inv_first"),
            seq: SeqPath::root(0),
            index: 0,
        },
    ];
    for mutation in script {
        doc.apply(mutation).unwrap();
        assert_healthy(&doc);
        assert_eq!(doc.node_count(), count);
    }

    let root: Vec<_> = doc.root().iter().map(|n| n.id().as_str()).collect();
    assert_eq!(root, ["inv_first", "inv_row_a", "inv_title", "inv_row_b"]);
    let row_b = doc.get(id("inv_row_b")).unwrap();
    assert_eq!(row_b.column(Column::Right).unwrap()[0].id(), id("inv_terms"));
}

#[test]
fn failed_edits_leave_no_trace() {
    let mut doc = seeded();
    let before = doc.clone();

    let failures = [
        (
            Mutation::MoveInto {
                id: id("inv_row_a"),
                container: id("inv_row_b"),
                column: Column::Left,
            },
            TreeError::NestedContainer(id("inv_row_a")),
        ),
        (
            Mutation::MoveInto {
                id: id("inv_first"),
                container: id("inv_terms"),
                column: Column::Left,
            },
            TreeError::NotAContainer(id("inv_terms")),
        ),
        (
            Mutation::MoveBeside {
                id: id("inv_title"),
                anchor: id("inv_missing"),
                half: Half::Bottom,
            },
            TreeError::NotFound(id("inv_missing")),
        ),
        (
            Mutation::Insert {
                seq: SeqPath::root(0),
                index: 0,
                node: Box::new(node(ElementKind::TextField, "inv_last")),
            },
            TreeError::DuplicateId(id("inv_last")),
        ),
        (
            Mutation::MoveTo {
                id: id("inv_title"),
                seq: SeqPath::root(4),
                index: 0,
            },
            TreeError::PageOutOfRange(4),
        ),
    ];
    for (mutation, expected) in failures {
        assert_eq!(doc.apply(mutation), Err(expected));
        assert_eq!(doc, before);
    }
}

#[test]
fn new_container_cannot_carry_nested_layout() {
    let mut doc = seeded();
    let carrier = node(ElementKind::TwoColumnLayoutField, "inv_carrier")
        .with_child(Column::Left, node(ElementKind::TwoColumnLayoutField, "inv_smuggled"));
    assert_eq!(
        doc.append(&SeqPath::root(0), carrier),
        Err(TreeError::NestedContainer(id("inv_smuggled")))
    );
    assert_healthy(&doc);
}

#[test]
fn moves_cross_pages() {
    let mut doc = seeded();
    doc.enable_multi_page();
    let second = doc.add_page().unwrap();
    doc.move_to(id("inv_row_a"), &SeqPath::root(second), 0).unwrap();
    assert_healthy(&doc);

    let loc = doc.locate(id("inv_first")).unwrap();
    assert_eq!(loc.seq, SeqPath::column(second, id("inv_row_a"), Column::Left));
    assert_eq!(doc.pages()[0].elements().len(), 3);
}

#[test]
fn fresh_ids_never_collide_with_loaded_ones() {
    let mut doc = seeded();
    for _ in 0..20 {
        let fresh = doc.fresh_id();
        doc.append(&doc.active_root(), construct(ElementKind::SpacerField, fresh))
            .unwrap();
    }
    assert_eq!(doc.node_count(), 26);
    assert_healthy(&doc);
}
