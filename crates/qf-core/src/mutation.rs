//! Mutation API: the only way the element tree changes shape.
//!
//! Every operation is atomic: lookups and placement policy are checked
//! before the tree is touched, so an `Err` always leaves the document as
//! it was. Moves detach the node from wherever it lives (root, any page,
//! either column) before attaching it, so a node can never end up under
//! two parents.

use crate::error::TreeError;
use crate::id::ElementId;
use crate::model::{Attributes, Column, Document, ElementNode, Half, Location, Scope, SeqPath};
use std::collections::HashSet;

/// A structural edit, applied with [`Document::apply`].
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    /// Insert a new node at `index` (clamped) of `seq`.
    Insert {
        seq: SeqPath,
        index: usize,
        node: Box<ElementNode>,
    },
    /// Insert a new node above or below `anchor`, in the anchor's sequence.
    InsertBeside {
        anchor: ElementId,
        half: Half,
        node: Box<ElementNode>,
    },
    /// Move an existing node to `index` of `seq`; the index is read after
    /// the node has been detached.
    MoveTo {
        id: ElementId,
        seq: SeqPath,
        index: usize,
    },
    /// Move an existing node to the end of a container's column.
    MoveInto {
        id: ElementId,
        container: ElementId,
        column: Column,
    },
    /// Move an existing node above or below `anchor`.
    MoveBeside {
        id: ElementId,
        anchor: ElementId,
        half: Half,
    },
    /// Remove a node (and its column children). Missing ids are a no-op.
    Remove { id: ElementId },
    /// Replace a node's attribute bag, keeping id and kind.
    Replace {
        id: ElementId,
        attributes: Attributes,
    },
}

/// Where a relocated node should land.
#[derive(Debug, Clone, Copy)]
enum Destination {
    At(SeqPath, usize),
    Append(SeqPath),
    Beside(ElementId, Half),
}

impl Document {
    /// Apply one mutation.
    pub fn apply(&mut self, mutation: Mutation) -> Result<(), TreeError> {
        let result = match mutation {
            Mutation::Insert { seq, index, node } => self.insert_at(&seq, index, *node).map(drop),
            Mutation::InsertBeside { anchor, half, node } => {
                self.insert_beside(anchor, half, *node).map(drop)
            }
            Mutation::MoveTo { id, seq, index } => self.move_to(id, &seq, index).map(drop),
            Mutation::MoveInto {
                id,
                container,
                column,
            } => self.move_into(id, container, column).map(drop),
            Mutation::MoveBeside { id, anchor, half } => {
                self.move_beside(id, anchor, half).map(drop)
            }
            Mutation::Remove { id } => {
                self.remove_by_id(id);
                Ok(())
            }
            Mutation::Replace { id, attributes } => self.replace_by_id(id, attributes),
        };
        debug_assert!(
            crate::audit::audit_document(self).is_empty(),
            "mutation left the document inconsistent: {:?}",
            crate::audit::audit_document(self)
        );
        result
    }

    /// Insert `node` at `index` of `seq`, shifting later entries right.
    /// The index is clamped to `[0, len]`. Returns the index used.
    pub fn insert_at(
        &mut self,
        seq: &SeqPath,
        index: usize,
        node: ElementNode,
    ) -> Result<usize, TreeError> {
        self.check_fresh(&node)?;
        self.check_sequence(seq)?;
        check_placement(seq, &node)?;

        let Some(target) = self.sequence_mut(seq) else {
            return Err(TreeError::PageOutOfRange(seq.page));
        };
        let index = index.min(target.len());
        target.insert(index, node);
        Ok(index)
    }

    /// Append `node` to the end of `seq`.
    pub fn append(&mut self, seq: &SeqPath, node: ElementNode) -> Result<usize, TreeError> {
        self.insert_at(seq, usize::MAX, node)
    }

    /// Insert `node` directly above (`Top`) or below (`Bottom`) `anchor`, in
    /// whichever sequence the anchor lives.
    pub fn insert_beside(
        &mut self,
        anchor: ElementId,
        half: Half,
        node: ElementNode,
    ) -> Result<Location, TreeError> {
        self.check_fresh(&node)?;
        let loc = self.locate(anchor).ok_or(TreeError::NotFound(anchor))?;
        check_placement(&loc.seq, &node)?;
        let index = self.insert_at(&loc.seq, loc.index + half.offset(), node)?;
        Ok(Location {
            seq: loc.seq,
            index,
        })
    }

    /// Remove the node with `id` from whichever sequence holds it. A
    /// container takes its column children with it. Returns the removed
    /// node, or `None` (not an error) if the id is unknown.
    pub fn remove_by_id(&mut self, id: ElementId) -> Option<ElementNode> {
        let Some(loc) = self.locate(id) else {
            log::debug!("remove: element {id} not in document, ignoring");
            return None;
        };
        self.detach(loc)
    }

    /// Replace a node's attributes in place, preserving id and kind.
    pub fn replace_by_id(&mut self, id: ElementId, attributes: Attributes) -> Result<(), TreeError> {
        let node = self.get_mut(id).ok_or(TreeError::NotFound(id))?;
        node.set_attributes(attributes);
        Ok(())
    }

    /// Move `id` to the end of `column` of `container`, detaching it first
    /// from wherever it lives, including the container's other column.
    pub fn move_into(
        &mut self,
        id: ElementId,
        container: ElementId,
        column: Column,
    ) -> Result<Location, TreeError> {
        let owner = self.locate(container).ok_or(TreeError::NotFound(container))?;
        if !self.get(container).is_some_and(ElementNode::is_container) {
            return Err(TreeError::NotAContainer(container));
        }
        let seq = SeqPath::column(owner.seq.page, container, column);
        self.relocate(id, Destination::Append(seq))
    }

    /// Move `id` directly above or below `anchor`. Dropping a node beside
    /// itself is a no-op.
    pub fn move_beside(
        &mut self,
        id: ElementId,
        anchor: ElementId,
        half: Half,
    ) -> Result<Location, TreeError> {
        self.relocate(id, Destination::Beside(anchor, half))
    }

    /// Move `id` to `index` of `seq`. The index refers to the sequence
    /// after `id` has been detached, and is clamped.
    pub fn move_to(
        &mut self,
        id: ElementId,
        seq: &SeqPath,
        index: usize,
    ) -> Result<Location, TreeError> {
        self.relocate(id, Destination::At(*seq, index))
    }

    // ─── Internals ───────────────────────────────────────────────────────

    /// Detach-then-attach, validated up front.
    fn relocate(&mut self, id: ElementId, dest: Destination) -> Result<Location, TreeError> {
        let from = self.locate(id).ok_or(TreeError::NotFound(id))?;

        let target_seq = match dest {
            Destination::At(seq, _) | Destination::Append(seq) => {
                self.check_sequence(&seq)?;
                seq
            }
            Destination::Beside(anchor, _) => {
                if anchor == id {
                    return Ok(from);
                }
                self.locate(anchor).ok_or(TreeError::NotFound(anchor))?.seq
            }
        };

        let moving_container = self.get(id).is_some_and(ElementNode::is_container);
        if moving_container && let Scope::Column { container, .. } = target_seq.scope {
            return Err(if container == id {
                TreeError::IntoItself(id)
            } else {
                TreeError::NestedContainer(id)
            });
        }

        let Some(node) = self.detach(from) else {
            return Err(TreeError::NotFound(id));
        };

        let index = match (dest, self.sequence(&target_seq)) {
            (_, None) => None,
            (Destination::At(_, index), Some(seq)) => Some(index.min(seq.len())),
            (Destination::Append(_), Some(seq)) => Some(seq.len()),
            (Destination::Beside(anchor, half), Some(seq)) => seq
                .iter()
                .position(|n| n.id() == anchor)
                .map(|pos| pos + half.offset()),
        };
        let Some(index) = index else {
            self.restore(from, node);
            return Err(TreeError::NotFound(id));
        };
        let Some(target) = self.sequence_mut(&target_seq) else {
            self.restore(from, node);
            return Err(TreeError::PageOutOfRange(target_seq.page));
        };
        target.insert(index, node);

        Ok(Location {
            seq: target_seq,
            index,
        })
    }

    fn detach(&mut self, loc: Location) -> Option<ElementNode> {
        let seq = self.sequence_mut(&loc.seq)?;
        (loc.index < seq.len()).then(|| seq.remove(loc.index))
    }

    fn restore(&mut self, loc: Location, node: ElementNode) {
        if let Some(seq) = self.sequence_mut(&loc.seq) {
            let index = loc.index.min(seq.len());
            seq.insert(index, node);
        }
    }

    /// Explain why `seq` cannot be resolved, or `Ok` if it can.
    fn check_sequence(&self, seq: &SeqPath) -> Result<(), TreeError> {
        if seq.page >= self.pages.len() {
            return Err(TreeError::PageOutOfRange(seq.page));
        }
        if let Scope::Column { container, .. } = seq.scope {
            match self.locate(container) {
                None => return Err(TreeError::NotFound(container)),
                Some(loc) if loc.seq.page != seq.page || loc.seq.is_column() => {
                    return Err(TreeError::NotFound(container));
                }
                Some(_) => {
                    if !self.get(container).is_some_and(ElementNode::is_container) {
                        return Err(TreeError::NotAContainer(container));
                    }
                }
            }
        }
        Ok(())
    }

    /// Reject a new node whose id (or any column child's id) is taken.
    fn check_fresh(&self, node: &ElementNode) -> Result<(), TreeError> {
        let mut seen = HashSet::new();
        for id in node.subtree_ids() {
            if !seen.insert(id) || self.contains(id) {
                return Err(TreeError::DuplicateId(id));
            }
        }
        Ok(())
    }
}

/// Layout containers never go inside a column, including one carried in
/// by a new container's own columns.
fn check_placement(seq: &SeqPath, node: &ElementNode) -> Result<(), TreeError> {
    if let Some(columns) = node.columns()
        && let Some(nested) = columns.left.iter().chain(&columns.right).find(|c| c.is_container())
    {
        return Err(TreeError::NestedContainer(nested.id()));
    }
    match seq.scope {
        Scope::Column { container, .. } if node.is_container() => Err(if container == node.id() {
            TreeError::IntoItself(node.id())
        } else {
            TreeError::NestedContainer(node.id())
        }),
        _ => Ok(()),
    }
}
