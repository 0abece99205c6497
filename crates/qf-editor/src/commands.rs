//! Undo/Redo command stack.
//!
//! Every edit is recorded as a pair of document snapshots (before and
//! after), encoded compactly with MessagePack. Undo restores the "before"
//! snapshot, redo the "after" one, so there is no inverse-mutation chain
//! to keep correct.
//!
//! Edits that belong together (e.g. a burst of property changes while a
//! panel is open) can be grouped with `begin_batch` / `end_batch` into a
//! single undo step.

use qf_core::Document;

/// A compact, immutable copy of a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot(Vec<u8>);

impl Snapshot {
    /// Encode the document. Fails only if serialization itself fails.
    pub fn capture(doc: &Document) -> Result<Self, rmp_serde::encode::Error> {
        rmp_serde::to_vec(doc).map(Snapshot)
    }

    /// Decode back into a document.
    pub fn restore(&self) -> Result<Document, rmp_serde::decode::Error> {
        rmp_serde::from_slice(&self.0)
    }

    /// Encoded size in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// One undoable step.
#[derive(Debug, Clone)]
pub struct Command {
    before: Snapshot,
    after: Snapshot,
    description: String,
}

impl Command {
    pub fn description(&self) -> &str {
        &self.description
    }
}

/// Manages undo/redo stacks with batch grouping.
pub struct CommandStack {
    undo_stack: Vec<Command>,
    redo_stack: Vec<Command>,
    /// Maximum undo depth.
    max_depth: usize,
    /// Batch nesting depth (0 = not batching).
    batch_depth: usize,
    /// Snapshot captured when the outermost batch opened.
    batch_snapshot: Option<Snapshot>,
    /// Description of the first edit recorded inside the batch.
    batch_description: Option<String>,
}

impl CommandStack {
    pub fn new(max_depth: usize) -> Self {
        Self {
            undo_stack: Vec::with_capacity(max_depth.min(64)),
            redo_stack: Vec::new(),
            max_depth,
            batch_depth: 0,
            batch_snapshot: None,
            batch_description: None,
        }
    }

    /// Start a batch group. Edits recorded until the matching `end_batch`
    /// collapse into one undo step.
    pub fn begin_batch(&mut self, doc: &Document) {
        if self.batch_depth == 0 {
            self.batch_snapshot = capture_or_log(doc);
            self.batch_description = None;
        }
        self.batch_depth += 1;
    }

    /// End a batch group. When the outermost batch closes and the document
    /// changed, one command is pushed.
    pub fn end_batch(&mut self, doc: &Document) {
        if self.batch_depth == 0 {
            return;
        }
        self.batch_depth -= 1;
        if self.batch_depth > 0 {
            return;
        }
        let before = self.batch_snapshot.take();
        let description = self.batch_description.take();
        if let (Some(before), Some(description)) = (before, description) {
            self.push(before, doc, description);
        }
    }

    pub fn is_batching(&self) -> bool {
        self.batch_depth > 0
    }

    /// Record a finished edit. `before` is the snapshot taken just before
    /// the edit; `doc` is the document after it.
    pub fn record(&mut self, before: Snapshot, doc: &Document, description: &str) {
        if self.batch_depth > 0 {
            // The batch snapshot already covers this edit.
            self.batch_description
                .get_or_insert_with(|| description.to_string());
            return;
        }
        self.push(before, doc, description.to_string());
    }

    fn push(&mut self, before: Snapshot, doc: &Document, description: String) {
        let Some(after) = capture_or_log(doc) else {
            return;
        };
        // Only push if the document actually changed
        if before == after {
            return;
        }
        self.undo_stack.push(Command {
            before,
            after,
            description,
        });
        if self.undo_stack.len() > self.max_depth {
            self.undo_stack.remove(0);
        }
        // Clear redo stack on new action
        self.redo_stack.clear();
    }

    /// Undo the last command. Returns its description.
    pub fn undo(&mut self, doc: &mut Document) -> Option<String> {
        let cmd = self.undo_stack.pop()?;
        match cmd.before.restore() {
            Ok(restored) => *doc = restored,
            Err(err) => {
                log::warn!("undo snapshot for '{}' is unreadable: {err}", cmd.description);
                self.undo_stack.push(cmd);
                return None;
            }
        }
        let desc = cmd.description.clone();
        self.redo_stack.push(cmd);
        Some(desc)
    }

    /// Redo the last undone command. Returns its description.
    pub fn redo(&mut self, doc: &mut Document) -> Option<String> {
        let cmd = self.redo_stack.pop()?;
        match cmd.after.restore() {
            Ok(restored) => *doc = restored,
            Err(err) => {
                log::warn!("redo snapshot for '{}' is unreadable: {err}", cmd.description);
                self.redo_stack.push(cmd);
                return None;
            }
        }
        let desc = cmd.description.clone();
        self.undo_stack.push(cmd);
        Some(desc)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Description of the step `undo` would revert.
    pub fn peek_undo(&self) -> Option<&str> {
        self.undo_stack.last().map(Command::description)
    }

    /// Forget all history (e.g. after loading a different form).
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.batch_depth = 0;
        self.batch_snapshot = None;
        self.batch_description = None;
    }
}

/// Capture a snapshot; a failure only costs the undo step, so it is logged
/// rather than propagated.
pub(crate) fn capture_or_log(doc: &Document) -> Option<Snapshot> {
    match Snapshot::capture(doc) {
        Ok(snapshot) => Some(snapshot),
        Err(err) => {
            log::warn!("could not snapshot document for undo: {err}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use qf_core::registry::construct;
    use qf_core::{Column, ElementId, ElementKind, SeqPath};

    fn id(s: &str) -> ElementId {
        ElementId::intern(s)
    }

    fn edit(stack: &mut CommandStack, doc: &mut Document, name: &str) {
        let before = Snapshot::capture(doc).unwrap();
        doc.append(&SeqPath::root(0), construct(ElementKind::TextField, id(name)))
            .unwrap();
        stack.record(before, doc, &format!("add {name}"));
    }

    #[test]
    fn snapshot_roundtrip_keeps_columns() {
        let layout = construct(ElementKind::TwoColumnLayoutField, id("cmd_row"))
            .with_child(Column::Left, construct(ElementKind::RatingScaleField, id("cmd_rate")));
        let mut doc = Document::from_elements(vec![layout]);
        doc.enable_multi_page();
        let snapshot = Snapshot::capture(&doc).unwrap();
        assert!(!snapshot.is_empty());
        assert_eq!(snapshot.restore().unwrap(), doc);
    }

    #[test]
    fn undo_redo_edit() {
        let mut doc = Document::new();
        let mut stack = CommandStack::new(100);
        edit(&mut stack, &mut doc, "cmd_a");
        assert_eq!(doc.node_count(), 1);

        assert_eq!(stack.undo(&mut doc), Some("add cmd_a".to_string()));
        assert_eq!(doc.node_count(), 0);
        assert_eq!(stack.redo(&mut doc), Some("add cmd_a".to_string()));
        assert!(doc.contains(id("cmd_a")));
        assert!(stack.redo(&mut doc).is_none());
    }

    #[test]
    fn redo_clears_on_new_action() {
        let mut doc = Document::new();
        let mut stack = CommandStack::new(100);
        edit(&mut stack, &mut doc, "cmd_b");
        stack.undo(&mut doc);
        assert!(stack.can_redo());
        edit(&mut stack, &mut doc, "cmd_c");
        assert!(!stack.can_redo());
    }

    #[test]
    fn unchanged_edit_is_not_recorded() {
        let mut doc = Document::new();
        let mut stack = CommandStack::new(100);
        let before = Snapshot::capture(&doc).unwrap();
        stack.record(before, &doc, "nothing");
        assert!(!stack.can_undo());
    }

    #[test]
    fn depth_is_bounded() {
        let mut doc = Document::new();
        let mut stack = CommandStack::new(2);
        for name in ["cmd_d1", "cmd_d2", "cmd_d3"] {
            edit(&mut stack, &mut doc, name);
        }
        assert!(stack.undo(&mut doc).is_some());
        assert!(stack.undo(&mut doc).is_some());
        assert!(stack.undo(&mut doc).is_none());
        assert_eq!(doc.node_count(), 1);
    }

    #[test]
    fn batch_collapses_to_one_step() {
        let mut doc = Document::new();
        let mut stack = CommandStack::new(100);
        stack.begin_batch(&doc);
        edit(&mut stack, &mut doc, "cmd_e1");
        stack.begin_batch(&doc);
        edit(&mut stack, &mut doc, "cmd_e2");
        stack.end_batch(&doc);
        assert!(!stack.can_undo());
        stack.end_batch(&doc);

        assert_eq!(stack.peek_undo(), Some("add cmd_e1"));
        stack.undo(&mut doc);
        assert_eq!(doc.node_count(), 0);
        assert!(!stack.can_undo());
    }

    #[test]
    fn empty_batch_records_nothing() {
        let doc = Document::new();
        let mut stack = CommandStack::new(100);
        stack.begin_batch(&doc);
        stack.end_batch(&doc);
        stack.end_batch(&doc);
        assert!(!stack.can_undo());
        assert!(!stack.is_batching());
    }
}
