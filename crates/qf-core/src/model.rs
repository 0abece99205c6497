//! Core document model for Quick Form designs.
//!
//! A document is a list of pages; each page owns an ordered root sequence
//! of `ElementNode`s. Array order is render order. The tree is flat except
//! for one kind, the two-column layout container, whose left and right
//! columns are themselves ordered sequences. Layout containers never nest:
//! a column holds regular elements only.
//!
//! Single-page documents are stored as exactly one page whose config is
//! not persisted, so every operation can address "the active page's root"
//! without special-casing the mode.

use crate::error::{KindError, RecordError};
use crate::id::ElementId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Kind-specific, loosely-typed property bag (label text, min/max values,
/// base64 image payloads, ...). Opaque to the tree and mutation layers.
pub type Attributes = Map<String, Value>;

// ─── Element kinds ───────────────────────────────────────────────────────

/// The closed set of element kinds. Variant names are the persisted
/// `type` strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementKind {
    TextField,
    TitleField,
    SubTitleField,
    ParagraphField,
    SeparatorField,
    SpacerField,
    NumberField,
    TextAreaField,
    DateField,
    SelectField,
    CheckboxField,
    ImageElement,
    ImageUploadField,
    BulletedListField,
    RatingScaleField,
    DualImageUpload,
    PictureSelectField,
    /// The layout container: owns a left and a right column.
    TwoColumnLayoutField,
}

impl ElementKind {
    /// Every kind, in palette order.
    pub const ALL: [ElementKind; 18] = [
        ElementKind::TextField,
        ElementKind::TitleField,
        ElementKind::SubTitleField,
        ElementKind::ParagraphField,
        ElementKind::SeparatorField,
        ElementKind::SpacerField,
        ElementKind::NumberField,
        ElementKind::TextAreaField,
        ElementKind::DateField,
        ElementKind::SelectField,
        ElementKind::CheckboxField,
        ElementKind::ImageElement,
        ElementKind::ImageUploadField,
        ElementKind::BulletedListField,
        ElementKind::RatingScaleField,
        ElementKind::DualImageUpload,
        ElementKind::PictureSelectField,
        ElementKind::TwoColumnLayoutField,
    ];

    /// The persisted `type` string.
    pub const fn as_str(self) -> &'static str {
        match self {
            ElementKind::TextField => "TextField",
            ElementKind::TitleField => "TitleField",
            ElementKind::SubTitleField => "SubTitleField",
            ElementKind::ParagraphField => "ParagraphField",
            ElementKind::SeparatorField => "SeparatorField",
            ElementKind::SpacerField => "SpacerField",
            ElementKind::NumberField => "NumberField",
            ElementKind::TextAreaField => "TextAreaField",
            ElementKind::DateField => "DateField",
            ElementKind::SelectField => "SelectField",
            ElementKind::CheckboxField => "CheckboxField",
            ElementKind::ImageElement => "ImageElement",
            ElementKind::ImageUploadField => "ImageUploadField",
            ElementKind::BulletedListField => "BulletedListField",
            ElementKind::RatingScaleField => "RatingScaleField",
            ElementKind::DualImageUpload => "DualImageUpload",
            ElementKind::PictureSelectField => "PictureSelectField",
            ElementKind::TwoColumnLayoutField => "TwoColumnLayoutField",
        }
    }

    /// Whether this kind owns child columns.
    pub const fn is_container(self) -> bool {
        matches!(self, ElementKind::TwoColumnLayoutField)
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ElementKind {
    type Err = KindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ElementKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| KindError::Unknown(s.to_string()))
    }
}

// ─── Columns ─────────────────────────────────────────────────────────────

/// One of the two named child sequences of a layout container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Column {
    Left,
    Right,
}

impl Column {
    pub const fn other(self) -> Self {
        match self {
            Column::Left => Column::Right,
            Column::Right => Column::Left,
        }
    }

    /// Key under which this column is persisted inside `extraAttributes`.
    pub const fn wire_key(self) -> &'static str {
        match self {
            Column::Left => "leftColumn",
            Column::Right => "rightColumn",
        }
    }
}

/// Which half of an element's visual bounds a drop landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Half {
    Top,
    Bottom,
}

impl Half {
    /// Index offset relative to the anchor element.
    pub const fn offset(self) -> usize {
        match self {
            Half::Top => 0,
            Half::Bottom => 1,
        }
    }
}

/// The two child sequences of a layout container.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Columns {
    pub left: Vec<ElementNode>,
    pub right: Vec<ElementNode>,
}

impl Columns {
    pub fn get(&self, column: Column) -> &Vec<ElementNode> {
        match column {
            Column::Left => &self.left,
            Column::Right => &self.right,
        }
    }

    pub fn get_mut(&mut self, column: Column) -> &mut Vec<ElementNode> {
        match column {
            Column::Left => &mut self.left,
            Column::Right => &mut self.right,
        }
    }
}

// ─── Element nodes ───────────────────────────────────────────────────────

/// One addressable unit of the form: a field, a heading, an image, or a
/// layout container.
///
/// `columns` is `Some` exactly when `kind` is a container. Nodes are only
/// created through `registry::construct` (fresh defaults) or by the JSON
/// bridge, which re-runs `construct` and overlays persisted attributes.
/// The serde path (undo snapshots) also rebuilds through `construct`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "NodeRecord")]
pub struct ElementNode {
    id: ElementId,
    kind: ElementKind,
    attributes: Attributes,
    columns: Option<Box<Columns>>,
}

impl ElementNode {
    pub(crate) fn new(id: ElementId, kind: ElementKind, attributes: Attributes) -> Self {
        // Fresh column vectors per instance, never shared.
        let columns = kind.is_container().then(Box::<Columns>::default);
        Self {
            id,
            kind,
            attributes,
            columns,
        }
    }

    pub fn id(&self) -> ElementId {
        self.id
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Look up a single attribute.
    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    pub fn is_container(&self) -> bool {
        self.columns.is_some()
    }

    pub fn columns(&self) -> Option<&Columns> {
        self.columns.as_deref()
    }

    pub(crate) fn columns_mut(&mut self) -> Option<&mut Columns> {
        self.columns.as_deref_mut()
    }

    /// Children of one column, or `None` for non-container kinds.
    pub fn column(&self, column: Column) -> Option<&[ElementNode]> {
        self.columns().map(|c| c.get(column).as_slice())
    }

    /// Builder-style attribute override, used when overlaying persisted
    /// properties onto fresh defaults.
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: Value) -> Self {
        self.set_attribute(key.into(), value);
        self
    }

    /// Builder-style child append for containers. Ignored for other kinds.
    #[must_use]
    pub fn with_child(mut self, column: Column, child: ElementNode) -> Self {
        if let Some(columns) = self.columns_mut() {
            columns.get_mut(column).push(child);
        }
        self
    }

    pub(crate) fn set_attribute(&mut self, key: String, value: Value) {
        if self.is_container() && is_column_key(&key) {
            return;
        }
        self.attributes.insert(key, value);
    }

    /// Replace the whole attribute bag. Column keys never enter a
    /// container's bag; its structure only changes through moves.
    pub(crate) fn set_attributes(&mut self, mut attributes: Attributes) {
        if self.is_container() {
            attributes.retain(|key, _| !is_column_key(key));
        }
        self.attributes = attributes;
    }

    /// This node's id plus the ids of every column child.
    pub fn subtree_ids(&self) -> Vec<ElementId> {
        let mut ids = vec![self.id];
        if let Some(columns) = self.columns() {
            ids.extend(columns.left.iter().map(ElementNode::id));
            ids.extend(columns.right.iter().map(ElementNode::id));
        }
        ids
    }
}

/// Field-for-field mirror of `ElementNode`, decoded before the node is
/// rebuilt.
#[derive(Deserialize)]
struct NodeRecord {
    id: ElementId,
    kind: ElementKind,
    attributes: Attributes,
    columns: Option<Box<Columns>>,
}

impl TryFrom<NodeRecord> for ElementNode {
    type Error = RecordError;

    fn try_from(record: NodeRecord) -> Result<Self, Self::Error> {
        let NodeRecord {
            id,
            kind,
            attributes,
            columns,
        } = record;
        let mut node = crate::registry::construct(kind, id);
        node.set_attributes(attributes);
        match (node.columns_mut(), columns) {
            (Some(slot), Some(columns)) => {
                if let Some(nested) = columns
                    .left
                    .iter()
                    .chain(&columns.right)
                    .find(|c| c.is_container())
                {
                    return Err(RecordError::NestedContainer(nested.id()));
                }
                *slot = *columns;
            }
            (Some(_), None) => return Err(RecordError::MissingColumns(id)),
            (None, Some(_)) => return Err(RecordError::UnexpectedColumns(id)),
            (None, None) => {}
        }
        Ok(node)
    }
}

pub(crate) fn is_column_key(key: &str) -> bool {
    key == Column::Left.wire_key() || key == Column::Right.wire_key()
}

// ─── Pages ───────────────────────────────────────────────────────────────

/// Navigation chrome for multi-page forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NavigationType {
    #[default]
    #[serde(rename = "tabs")]
    Tabs,
    #[serde(rename = "progress-bar")]
    ProgressBar,
}

/// Page-level presentation settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageConfig {
    #[serde(default)]
    pub navigation_type: NavigationType,
    #[serde(default = "default_show_page_numbers")]
    pub show_page_numbers: bool,
}

fn default_show_page_numbers() -> bool {
    true
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            navigation_type: NavigationType::Tabs,
            show_page_numbers: true,
        }
    }
}

/// One page: its own root sequence plus presentation config.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub(crate) elements: Vec<ElementNode>,
    pub config: PageConfig,
}

impl Page {
    pub fn new(config: PageConfig) -> Self {
        Self {
            elements: Vec::new(),
            config,
        }
    }

    pub fn elements(&self) -> &[ElementNode] {
        &self.elements
    }
}

// ─── Addressing ──────────────────────────────────────────────────────────

/// Which sequence within a page: the page root, or one column of one
/// layout container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    Root,
    Column {
        container: ElementId,
        column: Column,
    },
}

/// Fully-qualified address of an ordered sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SeqPath {
    pub page: usize,
    pub scope: Scope,
}

impl SeqPath {
    pub const fn root(page: usize) -> Self {
        Self {
            page,
            scope: Scope::Root,
        }
    }

    pub const fn column(page: usize, container: ElementId, column: Column) -> Self {
        Self {
            page,
            scope: Scope::Column { container, column },
        }
    }

    pub fn is_column(&self) -> bool {
        matches!(self.scope, Scope::Column { .. })
    }
}

impl fmt::Display for SeqPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.scope {
            Scope::Root => write!(f, "page[{}]", self.page),
            Scope::Column { container, column } => {
                write!(f, "page[{}]/{container}/{}", self.page, column.wire_key())
            }
        }
    }
}

/// Where a node currently lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub seq: SeqPath,
    pub index: usize,
}

// ─── Document ────────────────────────────────────────────────────────────

/// The complete form design.
///
/// Owns every node exactly once. All structural edits go through the
/// mutation API in `crate::mutation`; page management lives in
/// `crate::pages`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "DocumentRecord")]
pub struct Document {
    /// Never empty. Single-page mode holds exactly one page.
    pub(crate) pages: Vec<Page>,
    pub(crate) active: usize,
    pub(crate) multi_page: bool,
}

impl Document {
    /// Create an empty single-page document.
    #[must_use]
    pub fn new() -> Self {
        Self {
            pages: vec![Page::default()],
            active: 0,
            multi_page: false,
        }
    }

    /// Build a single-page document from a root sequence.
    pub fn from_elements(elements: Vec<ElementNode>) -> Self {
        Self {
            pages: vec![Page {
                elements,
                config: PageConfig::default(),
            }],
            active: 0,
            multi_page: false,
        }
    }

    pub fn is_multi_page(&self) -> bool {
        self.multi_page
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn active_page(&self) -> usize {
        self.active
    }

    /// Root sequence of the active page.
    pub fn root(&self) -> &[ElementNode] {
        &self.pages[self.active].elements
    }

    /// Address of the active page's root sequence.
    pub fn active_root(&self) -> SeqPath {
        SeqPath::root(self.active)
    }

    /// Total number of nodes, including column children, across all pages.
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        self.for_each_node(|_, _| count += 1);
        count
    }
}

/// Field-for-field mirror of `Document`. Decoded documents must pass the
/// audit before they are handed out.
#[derive(Deserialize)]
struct DocumentRecord {
    pages: Vec<Page>,
    active: usize,
    multi_page: bool,
}

impl TryFrom<DocumentRecord> for Document {
    type Error = RecordError;

    fn try_from(record: DocumentRecord) -> Result<Self, Self::Error> {
        let doc = Document {
            pages: record.pages,
            active: record.active,
            multi_page: record.multi_page,
        };
        match crate::audit::audit_document(&doc).into_iter().next() {
            Some(finding) => Err(RecordError::Invalid {
                rule: finding.rule,
                message: finding.message,
            }),
            None => Ok(doc),
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
