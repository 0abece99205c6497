//! Drag gesture descriptors.
//!
//! A completed drag is one source plus one drop target. The UI layer owns
//! pointer capture and hit-testing; it only hands these two values over
//! when the pointer is released.
//!
//! Both serialize as tagged JSON objects for the WASM bridge:
//!
//! ```json
//! {"type": "palette", "kind": "TextField"}
//! {"type": "elementHalf", "target": "el_3", "half": "bottom"}
//! ```

use qf_core::{Column, ElementId, ElementKind, Half};
use serde::{Deserialize, Serialize};

/// What is being dragged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum DragSource {
    /// A new element dragged out of the sidebar catalog.
    Palette { kind: ElementKind },
    /// An element already on the canvas.
    Canvas { id: ElementId },
}

impl DragSource {
    /// Id of the dragged element, for canvas sources.
    pub fn existing_id(&self) -> Option<ElementId> {
        match self {
            DragSource::Canvas { id } => Some(*id),
            DragSource::Palette { .. } => None,
        }
    }
}

/// Where it was released.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum DropTarget {
    /// The page drop area while it holds no elements.
    EmptyCanvas,
    /// The page drop area outside any element, while elements exist.
    Canvas,
    /// The upper or lower half of an element's bounds.
    ElementHalf { target: ElementId, half: Half },
    /// One column of a layout container.
    ColumnArea { container: ElementId, column: Column },
}
