//! Lookup and traversal over the element tree.
//!
//! Every id lookup searches the whole document (all pages, all columns),
//! because ids live in one namespace and a node must never become
//! unreachable from a remove or a move.

use crate::id::{DEFAULT_ID_PREFIX, ElementId};
use crate::model::{Column, Document, ElementNode, Location, Scope, SeqPath};

impl Document {
    /// Resolve a sequence address.
    pub fn sequence(&self, seq: &SeqPath) -> Option<&[ElementNode]> {
        let page = self.pages.get(seq.page)?;
        match seq.scope {
            Scope::Root => Some(&page.elements),
            Scope::Column { container, column } => page
                .elements
                .iter()
                .find(|n| n.id() == container)
                .and_then(|n| n.column(column)),
        }
    }

    pub(crate) fn sequence_mut(&mut self, seq: &SeqPath) -> Option<&mut Vec<ElementNode>> {
        let page = self.pages.get_mut(seq.page)?;
        match seq.scope {
            Scope::Root => Some(&mut page.elements),
            Scope::Column { container, column } => page
                .elements
                .iter_mut()
                .find(|n| n.id() == container)
                .and_then(|n| n.columns_mut())
                .map(|c| c.get_mut(column)),
        }
    }

    /// Find the sequence and index holding `id`.
    pub fn locate(&self, id: ElementId) -> Option<Location> {
        for (page_idx, page) in self.pages.iter().enumerate() {
            for (index, node) in page.elements.iter().enumerate() {
                if node.id() == id {
                    return Some(Location {
                        seq: SeqPath::root(page_idx),
                        index,
                    });
                }
                if let Some(found) = locate_in_columns(page_idx, node, id) {
                    return Some(found);
                }
            }
        }
        None
    }

    /// Look up a node anywhere in the document.
    pub fn get(&self, id: ElementId) -> Option<&ElementNode> {
        let loc = self.locate(id)?;
        self.sequence(&loc.seq)?.get(loc.index)
    }

    pub(crate) fn get_mut(&mut self, id: ElementId) -> Option<&mut ElementNode> {
        let loc = self.locate(id)?;
        self.sequence_mut(&loc.seq)?.get_mut(loc.index)
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.locate(id).is_some()
    }

    /// The layout container owning the sequence at `seq`, if it is a column.
    pub fn owner_of(&self, seq: &SeqPath) -> Option<&ElementNode> {
        match seq.scope {
            Scope::Root => None,
            Scope::Column { container, .. } => self.get(container),
        }
    }

    /// Visit every node in render order: pages in order, each root node
    /// followed by its left then right column children.
    pub fn for_each_node(&self, mut f: impl FnMut(Location, &ElementNode)) {
        for (page_idx, page) in self.pages.iter().enumerate() {
            for (index, node) in page.elements.iter().enumerate() {
                f(
                    Location {
                        seq: SeqPath::root(page_idx),
                        index,
                    },
                    node,
                );
                if let Some(columns) = node.columns() {
                    for column in [Column::Left, Column::Right] {
                        let seq = SeqPath::column(page_idx, node.id(), column);
                        for (index, child) in columns.get(column).iter().enumerate() {
                            f(Location { seq, index }, child);
                        }
                    }
                }
            }
        }
    }

    /// Every id in the document, in render order.
    pub fn ids(&self) -> Vec<ElementId> {
        let mut ids = Vec::new();
        self.for_each_node(|_, node| ids.push(node.id()));
        ids
    }

    /// Generate an id that does not occur anywhere in the document.
    pub fn fresh_id(&self) -> ElementId {
        self.fresh_id_with_prefix(DEFAULT_ID_PREFIX)
    }

    pub fn fresh_id_with_prefix(&self, prefix: &str) -> ElementId {
        loop {
            let id = ElementId::with_prefix(prefix);
            if !self.contains(id) {
                return id;
            }
            log::debug!("generated id {id} collides with a loaded element, drawing again");
        }
    }
}

fn locate_in_columns(page: usize, node: &ElementNode, id: ElementId) -> Option<Location> {
    let columns = node.columns()?;
    for column in [Column::Left, Column::Right] {
        if let Some(index) = columns.get(column).iter().position(|c| c.id() == id) {
            return Some(Location {
                seq: SeqPath::column(page, node.id(), column),
                index,
            });
        }
    }
    None
}
