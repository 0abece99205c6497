//! WASM bridge for Quick Form. Exposes the designer session and the
//! read-only embed loader to JavaScript.
//!
//! Compiled via `wasm-pack build --target web`. Everything crosses the
//! boundary as JSON strings: documents in their persisted shape, drag
//! descriptors as tagged objects (see `qf_editor::gesture`).

use qf_core::emitter::{node_value, to_value};
use qf_core::registry::palette;
use qf_core::{Attributes, ElementId, NavigationType, deserialize, serialize, serialize_pretty};
use qf_editor::{DesignerSession, DragSource, DropTarget, SessionConfig};
use serde::Serialize;
use serde_json::{Value, json};
use std::collections::HashMap;
use wasm_bindgen::prelude::*;

/// The WASM-facing designer controller.
///
/// Owns one designer session. All interaction from the builder page goes
/// through this struct.
#[wasm_bindgen]
pub struct FormDesigner {
    session: DesignerSession,
    config: SessionConfig,
}

#[wasm_bindgen]
impl FormDesigner {
    /// Create a designer over an empty form. `config_json` may be empty
    /// or a partial `{"undoDepth": .., "idPrefix": ..}` object.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str) -> Self {
        console_error_panic_hook_setup();

        let config = if config_json.trim().is_empty() {
            SessionConfig::default()
        } else {
            serde_json::from_str(config_json).unwrap_or_else(|e| {
                log::warn!("ignoring designer config: {e}");
                SessionConfig::default()
            })
        };
        Self {
            session: DesignerSession::new(config.clone()),
            config,
        }
    }

    /// Replace the form with a stored one: its JSON, theme and store
    /// revision. History and selection reset.
    /// Returns `false` (and keeps the current form) on malformed input.
    pub fn load(&mut self, json: &str, theme: &str, revision: u64) -> bool {
        match deserialize(json) {
            Ok(document) => {
                self.session = DesignerSession::from_document(document, self.config.clone());
                self.session.set_theme(theme);
                self.session.mark_saved(revision);
                true
            }
            Err(e) => {
                log::warn!("form not loaded: {e}");
                false
            }
        }
    }

    /// Current form in its persisted JSON shape.
    pub fn to_json(&self) -> String {
        serialize(self.session.document())
    }

    pub fn to_json_pretty(&self) -> String {
        serialize_pretty(self.session.document())
    }

    // ─── Gestures ────────────────────────────────────────────────────────

    /// Apply a finished drag. Both arguments are JSON descriptors.
    /// Returns `true` if the form changed.
    pub fn handle_drop(&mut self, source_json: &str, target_json: &str) -> bool {
        let source: DragSource = match serde_json::from_str(source_json) {
            Ok(source) => source,
            Err(e) => {
                log::debug!("bad drag source {source_json}: {e}");
                return false;
            }
        };
        let target: DropTarget = match serde_json::from_str(target_json) {
            Ok(target) => target,
            Err(e) => {
                log::debug!("bad drop target {target_json}: {e}");
                return false;
            }
        };
        self.session.handle_drop(source, target)
    }

    // ─── Selection ───────────────────────────────────────────────────────

    /// Select an element by id; an empty id clears the selection.
    pub fn select_by_id(&mut self, element_id: &str) -> bool {
        if element_id.is_empty() {
            self.session.clear_selection();
            return true;
        }
        self.session.select(ElementId::intern(element_id))
    }

    /// Selected element id, or empty string if none.
    pub fn get_selected_id(&self) -> String {
        self.session
            .selected()
            .map(|node| node.id().to_string())
            .unwrap_or_default()
    }

    /// Selected element record (persisted shape), or `null`.
    pub fn get_selected_json(&self) -> String {
        self.session
            .selected()
            .map(node_value)
            .unwrap_or(Value::Null)
            .to_string()
    }

    /// Replace an element's attributes with a JSON object.
    pub fn update_attributes(&mut self, element_id: &str, attributes_json: &str) -> bool {
        let attributes: Attributes = match serde_json::from_str(attributes_json) {
            Ok(attributes) => attributes,
            Err(e) => {
                log::debug!("bad attributes for {element_id}: {e}");
                return false;
            }
        };
        self.session
            .update_attributes(ElementId::intern(element_id), attributes)
            .is_ok()
    }

    pub fn remove(&mut self, element_id: &str) -> bool {
        self.session.remove(ElementId::intern(element_id))
    }

    pub fn delete_selected(&mut self) -> bool {
        match self.session.selected().map(|node| node.id()) {
            Some(id) => self.session.remove(id),
            None => false,
        }
    }

    /// Group edits made while a property panel is open into one undo step.
    pub fn begin_edit(&mut self) {
        self.session.begin_batch();
    }

    pub fn end_edit(&mut self) {
        self.session.end_batch();
    }

    // ─── History ─────────────────────────────────────────────────────────

    pub fn undo(&mut self) -> bool {
        self.session.undo().is_some()
    }

    pub fn redo(&mut self) -> bool {
        self.session.redo().is_some()
    }

    pub fn can_undo(&self) -> bool {
        self.session.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.session.can_redo()
    }

    // ─── Pages ───────────────────────────────────────────────────────────

    pub fn enable_multi_page(&mut self) {
        self.session.enable_multi_page();
    }

    /// Fails (returns `false`) while more than one page exists.
    pub fn disable_multi_page(&mut self) -> bool {
        self.session.disable_multi_page().is_ok()
    }

    /// Index of the new page, or -1 outside multi-page mode.
    pub fn add_page(&mut self) -> i32 {
        self.session
            .add_page()
            .ok()
            .and_then(|index| i32::try_from(index).ok())
            .unwrap_or(-1)
    }

    pub fn remove_page(&mut self, index: usize) -> bool {
        self.session.remove_page(index).is_ok()
    }

    pub fn set_active_page(&mut self, index: usize) -> bool {
        self.session.set_active_page(index).is_ok()
    }

    pub fn active_page(&self) -> usize {
        self.session.document().active_page()
    }

    pub fn page_count(&self) -> usize {
        self.session.document().page_count()
    }

    pub fn is_multi_page(&self) -> bool {
        self.session.document().is_multi_page()
    }

    /// `"tabs"` or `"progress-bar"`. Fails outside multi-page mode.
    pub fn set_navigation_type(&mut self, name: &str) -> bool {
        let navigation_type = match name {
            "tabs" => NavigationType::Tabs,
            "progress-bar" => NavigationType::ProgressBar,
            _ => return false,
        };
        self.session.set_navigation_type(navigation_type).is_ok()
    }

    /// Fails outside multi-page mode.
    pub fn set_show_page_numbers(&mut self, show: bool) -> bool {
        self.session.set_show_page_numbers(show).is_ok()
    }

    // ─── Theme & saving ──────────────────────────────────────────────────

    pub fn set_theme(&mut self, theme: &str) {
        self.session.set_theme(theme);
    }

    pub fn get_theme(&self) -> String {
        self.session.theme().to_string()
    }

    /// Snapshot for the host's save call:
    /// `{"content": "...", "theme": "...", "revision": n}`.
    pub fn save_request_json(&self) -> String {
        let request = self.session.save_request();
        json!({
            "content": request.content,
            "theme": request.theme,
            "revision": request.revision,
        })
        .to_string()
    }

    /// Tell the designer which revision the store accepted.
    pub fn mark_saved(&mut self, revision: u64) {
        self.session.mark_saved(revision);
    }
}

/// Set up panic hook for better error messages in the browser console.
fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("Quick Form WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}

// ─── Standalone functions (no designer needed) ───────────────────────────

#[derive(Serialize)]
struct PaletteEntry {
    kind: &'static str,
    label: &'static str,
    container: bool,
}

/// The element catalog for the sidebar, as a JSON array.
#[wasm_bindgen]
pub fn palette_json() -> String {
    let entries: Vec<PaletteEntry> = palette()
        .into_iter()
        .map(|info| PaletteEntry {
            kind: info.kind.as_str(),
            label: info.label,
            container: info.kind.is_container(),
        })
        .collect();
    serde_json::to_string(&entries).unwrap_or_else(|_| "[]".to_string())
}

/// Embed loader: validate stored form JSON and return it normalised.
/// Returns `{"ok":true,"form":[...]}` or `{"ok":false,"error":"..."}`.
#[wasm_bindgen]
pub fn load_form(json: &str) -> String {
    console_error_panic_hook_setup();
    match deserialize(json) {
        Ok(document) => json!({"ok": true, "form": to_value(&document)}).to_string(),
        Err(e) => error_json(&e.to_string()),
    }
}

/// Check a submission. `values_json` maps element id to submitted value.
/// Returns `{"ok":true,"failed":[ids...]}` or `{"ok":false,"error":"..."}`.
#[wasm_bindgen]
pub fn validate_submission_json(form_json: &str, values_json: &str) -> String {
    let document = match deserialize(form_json) {
        Ok(document) => document,
        Err(e) => return error_json(&e.to_string()),
    };
    let values: HashMap<String, String> = match serde_json::from_str(values_json) {
        Ok(values) => values,
        Err(e) => return error_json(&format!("submission values: {e}")),
    };
    let failed: Vec<String> = qf_core::validate_submission(&document, &values)
        .into_iter()
        .map(|id| id.to_string())
        .collect();
    json!({"ok": true, "failed": failed}).to_string()
}

fn error_json(message: &str) -> String {
    json!({"ok": false, "error": message}).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const FORM: &str = r#"[
        {"id": "w_title", "type": "TitleField"},
        {"id": "w_row", "type": "TwoColumnLayoutField", "extraAttributes": {
            "leftColumn": [{"id": "w_email", "type": "TextField",
                            "extraAttributes": {"required": true}}]}}
    ]"#;

    fn parse(text: &str) -> Value {
        serde_json::from_str(text).unwrap()
    }

    #[test]
    fn designer_drop_and_undo() {
        let mut designer = FormDesigner::new(r#"{"idPrefix": "w"}"#);
        assert!(designer.handle_drop(
            r#"{"type": "palette", "kind": "ParagraphField"}"#,
            r#"{"type": "emptyCanvas"}"#,
        ));
        let form = parse(&designer.to_json());
        assert_eq!(form[0]["type"], "ParagraphField");
        assert!(form[0]["id"].as_str().unwrap().starts_with("w_"));

        assert!(designer.undo());
        assert_eq!(designer.to_json(), "[]");
        assert!(designer.can_redo());
    }

    #[test]
    fn designer_rejects_bad_descriptors() {
        let mut designer = FormDesigner::new("");
        assert!(!designer.handle_drop("{}", r#"{"type": "canvas"}"#));
        assert!(!designer.handle_drop(
            r#"{"type": "palette", "kind": "TextField"}"#,
            r#"{"type": "trash"}"#,
        ));
        assert!(!designer.load("not json", "", 0));
        assert_eq!(designer.to_json(), "[]");
    }

    #[test]
    fn designer_selection_and_properties() {
        let mut designer = FormDesigner::new("");
        assert!(designer.load(FORM, "", 1));
        assert!(designer.select_by_id("w_email"));
        assert_eq!(designer.get_selected_id(), "w_email");
        assert_eq!(parse(&designer.get_selected_json())["type"], "TextField");

        assert!(designer.update_attributes("w_email", r#"{"label": "Email", "required": true}"#));
        assert!(!designer.update_attributes("w_email", "[1, 2]"));
        assert!(designer.delete_selected());
        assert_eq!(designer.get_selected_id(), "");
        assert_eq!(designer.get_selected_json(), "null");
        assert!(!designer.delete_selected());
    }

    #[test]
    fn designer_pages() {
        let mut designer = FormDesigner::new("");
        assert_eq!(designer.add_page(), -1);
        assert!(!designer.set_show_page_numbers(false));
        designer.enable_multi_page();
        assert_eq!(designer.add_page(), 1);
        assert!(designer.set_navigation_type("progress-bar"));
        assert!(!designer.set_navigation_type("carousel"));
        assert!(!designer.disable_multi_page());
        assert!(designer.remove_page(1));
        assert!(designer.disable_multi_page());
        assert_eq!(designer.page_count(), 1);
    }

    #[test]
    fn save_request_shape() {
        let mut designer = FormDesigner::new("");
        designer.load(FORM, "", 1);
        designer.set_theme("slate");
        designer.mark_saved(4);
        let request = parse(&designer.save_request_json());
        assert_eq!(request["theme"], "slate");
        assert_eq!(request["revision"], 4);
        let content = parse(request["content"].as_str().unwrap());
        assert_eq!(content.as_array().unwrap().len(), 2);
    }

    #[test]
    fn loading_another_form_takes_its_metadata() {
        let mut designer = FormDesigner::new("");
        designer.load(FORM, "slate", 7);
        designer.mark_saved(8);
        assert!(designer.load("[]", "", 2));
        assert_eq!(designer.get_theme(), "");
        let request = parse(&designer.save_request_json());
        assert_eq!(request["revision"], 2);
        assert_eq!(request["theme"], "");
    }

    #[test]
    fn palette_lists_every_kind() {
        let entries = parse(&palette_json());
        let entries = entries.as_array().unwrap();
        assert_eq!(entries.len(), 18);
        assert_eq!(entries[0], json!({"kind": "TextField", "label": "Text Field", "container": false}));
        assert!(entries.iter().any(|e| e["container"] == true));
    }

    #[test]
    fn embed_loader_normalises() {
        let loaded = parse(&load_form(FORM));
        assert_eq!(loaded["ok"], true);
        assert_eq!(loaded["form"][0]["extraAttributes"]["title"], "Title");
        assert_eq!(
            loaded["form"][1]["extraAttributes"]["rightColumn"],
            json!([])
        );

        let failed = parse(&load_form(r#"[{"id": "x"}]"#));
        assert_eq!(failed["ok"], false);
        assert!(failed["error"].as_str().unwrap().contains("missing `type`"));
    }

    #[test]
    fn submission_check() {
        let result = parse(&validate_submission_json(FORM, "{}"));
        assert_eq!(result, json!({"ok": true, "failed": ["w_email"]}));
        let result = parse(&validate_submission_json(FORM, r#"{"w_email": "a@b.c"}"#));
        assert_eq!(result["failed"], json!([]));
        assert_eq!(parse(&validate_submission_json(FORM, "[]"))["ok"], false);
    }
}
