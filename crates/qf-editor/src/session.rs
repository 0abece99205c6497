//! Designer session: the single owner of a form being edited.
//!
//! UI callbacks never touch the document directly. They go through the
//! session, which applies the edit, records one undo step per successful
//! edit, and keeps the selection honest.

use crate::commands::{CommandStack, capture_or_log};
use crate::gesture::{DragSource, DropTarget};
use crate::reconcile::Reconciler;
use crate::store::SaveRequest;
use qf_core::id::DEFAULT_ID_PREFIX;
use qf_core::{
    Attributes, Document, ElementId, ElementNode, NavigationType, PageError, TreeError, serialize,
};
use serde::{Deserialize, Serialize};

/// Session settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SessionConfig {
    /// Maximum number of undo steps kept.
    pub undo_depth: usize,
    /// Prefix for ids of elements created from the palette.
    pub id_prefix: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            undo_depth: 100,
            id_prefix: DEFAULT_ID_PREFIX.to_string(),
        }
    }
}

pub struct DesignerSession {
    document: Document,
    /// Weak reference: resolved through the tree on every read.
    selected: Option<ElementId>,
    theme: String,
    history: CommandStack,
    reconciler: Reconciler,
    /// Store revision this session was loaded from or last saved as.
    revision: u64,
}

impl Default for DesignerSession {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl DesignerSession {
    /// Start with an empty single-page form.
    pub fn new(config: SessionConfig) -> Self {
        Self::from_document(Document::new(), config)
    }

    pub fn from_document(document: Document, config: SessionConfig) -> Self {
        Self {
            document,
            selected: None,
            theme: String::new(),
            history: CommandStack::new(config.undo_depth),
            reconciler: Reconciler::new(config.id_prefix),
            revision: 0,
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    // ─── Selection ───────────────────────────────────────────────────────

    /// The selected element, if it still exists.
    pub fn selected(&self) -> Option<&ElementNode> {
        self.selected.and_then(|id| self.document.get(id))
    }

    /// Select an element. Unknown ids clear the selection.
    pub fn select(&mut self, id: ElementId) -> bool {
        let exists = self.document.contains(id);
        self.selected = exists.then_some(id);
        exists
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    // ─── Gestures and edits ──────────────────────────────────────────────

    /// Apply a completed drag. Returns whether the document changed.
    ///
    /// Failures (stale ids, placement rules) abort the whole gesture and
    /// leave the document untouched; they are logged, not surfaced.
    pub fn handle_drop(&mut self, source: DragSource, target: DropTarget) -> bool {
        let plan = match self.reconciler.plan(&self.document, source, target) {
            Ok(plan) if plan.is_empty() => return false,
            Ok(plan) => plan,
            Err(err) => {
                log::debug!("drop {source:?} -> {target:?} aborted: {err}");
                return false;
            }
        };
        let description = match source {
            DragSource::Palette { kind } => format!("add {}", qf_core::registry::label(kind)),
            DragSource::Canvas { .. } => "move element".to_string(),
        };
        let reconciler = self.reconciler.clone();
        match self.edit(&description, |doc| reconciler.apply(doc, plan)) {
            Ok(()) => true,
            Err(err) => {
                log::debug!("drop {source:?} -> {target:?} aborted: {err}");
                false
            }
        }
    }

    /// Property-panel edit: replace an element's attributes.
    pub fn update_attributes(
        &mut self,
        id: ElementId,
        attributes: Attributes,
    ) -> Result<(), TreeError> {
        self.edit("edit properties", |doc| doc.replace_by_id(id, attributes))
    }

    /// Delete an element (and its column children). Unknown ids are ignored.
    pub fn remove(&mut self, id: ElementId) -> bool {
        self.edit("delete element", |doc| {
            Ok::<_, TreeError>(doc.remove_by_id(id).is_some())
        })
        .unwrap_or(false)
    }

    /// Group subsequent edits into one undo step until `end_batch`.
    pub fn begin_batch(&mut self) {
        self.history.begin_batch(&self.document);
    }

    pub fn end_batch(&mut self) {
        self.history.end_batch(&self.document);
    }

    // ─── Pages ───────────────────────────────────────────────────────────

    pub fn enable_multi_page(&mut self) {
        let _ = self.edit("enable pages", |doc| {
            doc.enable_multi_page();
            Ok::<_, PageError>(())
        });
    }

    pub fn disable_multi_page(&mut self) -> Result<(), PageError> {
        self.edit("disable pages", Document::disable_multi_page)
    }

    pub fn add_page(&mut self) -> Result<usize, PageError> {
        self.edit("add page", Document::add_page)
    }

    pub fn remove_page(&mut self, index: usize) -> Result<(), PageError> {
        self.edit("remove page", |doc| doc.remove_page(index).map(drop))
    }

    /// Switch the page that drops and inserts address. Not an undo step.
    pub fn set_active_page(&mut self, index: usize) -> Result<(), PageError> {
        self.document.set_active_page(index)
    }

    pub fn set_navigation_type(&mut self, navigation_type: NavigationType) -> Result<(), PageError> {
        self.edit("page navigation", |doc| doc.set_navigation_type(navigation_type))
    }

    pub fn set_show_page_numbers(&mut self, show: bool) -> Result<(), PageError> {
        self.edit("page numbers", |doc| doc.set_show_page_numbers(show))
    }

    // ─── History ─────────────────────────────────────────────────────────

    pub fn undo(&mut self) -> Option<String> {
        let desc = self.history.undo(&mut self.document);
        self.prune_selection();
        desc
    }

    pub fn redo(&mut self) -> Option<String> {
        let desc = self.history.redo(&mut self.document);
        self.prune_selection();
        desc
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // ─── Theme and persistence ───────────────────────────────────────────

    pub fn theme(&self) -> &str {
        &self.theme
    }

    pub fn set_theme(&mut self, theme: impl Into<String>) {
        self.theme = theme.into();
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Record the revision the store now holds for this form.
    pub fn mark_saved(&mut self, revision: u64) {
        self.revision = revision;
    }

    /// Serialize everything a save needs, right now. The request owns its
    /// data, so edits made while a save is in flight cannot leak into it.
    pub fn save_request(&self) -> SaveRequest {
        SaveRequest {
            content: serialize(&self.document),
            theme: self.theme.clone(),
            revision: self.revision,
        }
    }

    // ─── Internals ───────────────────────────────────────────────────────

    /// Run an edit and record it as one undo step if it succeeds.
    fn edit<T, E>(
        &mut self,
        description: &str,
        f: impl FnOnce(&mut Document) -> Result<T, E>,
    ) -> Result<T, E> {
        let before = capture_or_log(&self.document);
        let result = f(&mut self.document)?;
        if let Some(before) = before {
            self.history.record(before, &self.document, description);
        }
        self.prune_selection();
        Ok(result)
    }

    fn prune_selection(&mut self) {
        if let Some(id) = self.selected
            && !self.document.contains(id)
        {
            self.selected = None;
        }
    }
}
