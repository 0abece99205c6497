//! Drag/drop reconciler.
//!
//! Turns one `(DragSource, DropTarget)` pair into a plan of `Mutation`s
//! against the current document. Each drop is resolved on its own; there
//! is no state carried between gestures. Rules, first match wins:
//!
//! | source  | target                  | plan |
//! |---------|-------------------------|------|
//! | palette | empty canvas / canvas   | append a new node to the active page |
//! | any     | column area             | new node into the column, or move it there |
//! | palette | element half            | insert a new node beside the target |
//! | canvas  | element half            | move beside the target (self-drop: nothing) |
//! | canvas  | empty canvas / canvas   | move to the end of the active page |

use crate::gesture::{DragSource, DropTarget};
use qf_core::registry::construct;
use qf_core::{Document, ElementId, Mutation, SeqPath, TreeError};
use smallvec::SmallVec;
use thiserror::Error;

/// Mutations for one gesture, applied in order. Empty means "nothing to do".
pub type Plan = SmallVec<[Mutation; 2]>;

/// Why a gesture was aborted. Never user-facing: the session logs it and
/// leaves the tree as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DropError {
    #[error("dragged element `{0}` is no longer in the document")]
    StaleSource(ElementId),

    #[error("drop target `{0}` is no longer in the document")]
    StaleTarget(ElementId),

    #[error(transparent)]
    Tree(#[from] TreeError),
}

/// Plans and applies drops. Holds only the prefix for ids of new elements.
#[derive(Debug, Clone)]
pub struct Reconciler {
    id_prefix: String,
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new(qf_core::id::DEFAULT_ID_PREFIX)
    }
}

impl Reconciler {
    pub fn new(id_prefix: impl Into<String>) -> Self {
        Self {
            id_prefix: id_prefix.into(),
        }
    }

    /// Resolve a drop into mutations without touching the document.
    pub fn plan(
        &self,
        doc: &Document,
        source: DragSource,
        target: DropTarget,
    ) -> Result<Plan, DropError> {
        if let Some(id) = source.existing_id()
            && !doc.contains(id)
        {
            return Err(DropError::StaleSource(id));
        }

        let mut plan = Plan::new();
        match (source, target) {
            // Palette onto the page area: append to the active page.
            (DragSource::Palette { kind }, DropTarget::EmptyCanvas | DropTarget::Canvas) => {
                plan.push(Mutation::Insert {
                    seq: doc.active_root(),
                    index: usize::MAX,
                    node: Box::new(construct(kind, self.fresh_id(doc))),
                });
            }

            // Anything onto a column.
            (source, DropTarget::ColumnArea { container, column }) => {
                let owner = doc
                    .locate(container)
                    .ok_or(DropError::StaleTarget(container))?;
                match source {
                    DragSource::Palette { kind } => plan.push(Mutation::Insert {
                        seq: SeqPath::column(owner.seq.page, container, column),
                        index: usize::MAX,
                        node: Box::new(construct(kind, self.fresh_id(doc))),
                    }),
                    DragSource::Canvas { id } => plan.push(Mutation::MoveInto {
                        id,
                        container,
                        column,
                    }),
                }
            }

            // Palette onto an element: insert beside it, in its sequence.
            (DragSource::Palette { kind }, DropTarget::ElementHalf { target, half }) => {
                if !doc.contains(target) {
                    return Err(DropError::StaleTarget(target));
                }
                plan.push(Mutation::InsertBeside {
                    anchor: target,
                    half,
                    node: Box::new(construct(kind, self.fresh_id(doc))),
                });
            }

            // Reorder, within or across sequences.
            (DragSource::Canvas { id }, DropTarget::ElementHalf { target, half }) => {
                if id == target {
                    return Ok(plan);
                }
                if !doc.contains(target) {
                    return Err(DropError::StaleTarget(target));
                }
                plan.push(Mutation::MoveBeside {
                    id,
                    anchor: target,
                    half,
                });
            }

            (DragSource::Canvas { id }, DropTarget::EmptyCanvas | DropTarget::Canvas) => {
                plan.push(Mutation::MoveTo {
                    id,
                    seq: doc.active_root(),
                    index: usize::MAX,
                });
            }
        }
        Ok(plan)
    }

    /// Apply a plan. All or nothing: on error the document is restored to
    /// its state before the first mutation.
    pub fn apply(&self, doc: &mut Document, plan: Plan) -> Result<(), DropError> {
        if plan.len() > 1 {
            let backup = doc.clone();
            for mutation in plan {
                if let Err(err) = doc.apply(mutation) {
                    *doc = backup;
                    return Err(err.into());
                }
            }
            return Ok(());
        }
        for mutation in plan {
            doc.apply(mutation)?;
        }
        Ok(())
    }

    /// Plan and apply in one step. Returns whether the document changed
    /// shape (a self-drop returns `Ok(false)`).
    pub fn reconcile(
        &self,
        doc: &mut Document,
        source: DragSource,
        target: DropTarget,
    ) -> Result<bool, DropError> {
        let plan = self.plan(doc, source, target)?;
        if plan.is_empty() {
            return Ok(false);
        }
        self.apply(doc, plan)?;
        Ok(true)
    }

    fn fresh_id(&self, doc: &Document) -> ElementId {
        doc.fresh_id_with_prefix(&self.id_prefix)
    }
}
