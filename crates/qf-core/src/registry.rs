//! Element registry: the single dispatch table over the closed kind set.
//!
//! Each kind exposes default construction and a submission-time `validate`
//! predicate. Presentation (designer widgets, property editors, form
//! renderers) belongs to the host application.

use crate::id::ElementId;
use crate::model::{Attributes, ElementKind, ElementNode};
use serde_json::{Value, json};

/// Palette metadata for one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindInfo {
    pub kind: ElementKind,
    pub label: &'static str,
}

/// Construct a node of `kind` with its default attributes.
///
/// A layout container gets two freshly allocated, empty columns.
#[must_use]
pub fn construct(kind: ElementKind, id: ElementId) -> ElementNode {
    ElementNode::new(id, kind, default_attributes(kind))
}

/// Palette label for a kind.
pub fn label(kind: ElementKind) -> &'static str {
    match kind {
        ElementKind::TextField => "Text Field",
        ElementKind::TitleField => "Title",
        ElementKind::SubTitleField => "Subtitle",
        ElementKind::ParagraphField => "Paragraph",
        ElementKind::SeparatorField => "Separator",
        ElementKind::SpacerField => "Spacer",
        ElementKind::NumberField => "Number Field",
        ElementKind::TextAreaField => "Text Area",
        ElementKind::DateField => "Date Field",
        ElementKind::SelectField => "Select Field",
        ElementKind::CheckboxField => "Checkbox",
        ElementKind::ImageElement => "Image",
        ElementKind::ImageUploadField => "Image Upload",
        ElementKind::BulletedListField => "Bulleted List",
        ElementKind::RatingScaleField => "Rating Scale",
        ElementKind::DualImageUpload => "Dual Image Upload",
        ElementKind::PictureSelectField => "Picture Select",
        ElementKind::TwoColumnLayoutField => "Two Column Layout",
    }
}

/// Every kind with its palette label, in palette order.
pub fn palette() -> Vec<KindInfo> {
    ElementKind::ALL
        .into_iter()
        .map(|kind| KindInfo {
            kind,
            label: label(kind),
        })
        .collect()
}

/// Validate a submitted value against a node's rules.
pub fn validate(node: &ElementNode, value: &str) -> bool {
    let required = node
        .attribute("required")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    if !required {
        return true;
    }

    match node.kind() {
        ElementKind::TextField
        | ElementKind::NumberField
        | ElementKind::TextAreaField
        | ElementKind::DateField
        | ElementKind::SelectField
        | ElementKind::PictureSelectField
        | ElementKind::RatingScaleField => !value.is_empty(),
        ElementKind::CheckboxField => value == "true",
        ElementKind::DualImageUpload => is_image_pair(value),
        _ => true,
    }
}

/// A JSON array of exactly two non-empty strings.
fn is_image_pair(value: &str) -> bool {
    match serde_json::from_str::<Value>(value) {
        Ok(Value::Array(items)) => {
            items.len() == 2
                && items
                    .iter()
                    .all(|item| item.as_str().is_some_and(|s| !s.is_empty()))
        }
        _ => false,
    }
}

fn default_attributes(kind: ElementKind) -> Attributes {
    let value = match kind {
        ElementKind::TextField => json!({
            "label": "Text field",
            "helperText": "Helper text",
            "required": false,
            "placeHolder": "Value here...",
        }),
        ElementKind::TitleField => json!({
            "title": "Title",
            "fontSize": "h1",
            "alignment": "center",
        }),
        ElementKind::SubTitleField => json!({
            "subTitle": "Subtitle",
            "fontSize": "h2",
            "alignment": "center",
        }),
        ElementKind::ParagraphField => json!({
            "text": "Text here",
        }),
        ElementKind::SeparatorField => json!({}),
        ElementKind::SpacerField => json!({
            "height": 20,
        }),
        ElementKind::NumberField => json!({
            "label": "Number field",
            "helperText": "Helper text",
            "required": false,
            "placeHolder": "0",
        }),
        ElementKind::TextAreaField => json!({
            "label": "Text area",
            "helperText": "Helper text",
            "required": false,
            "placeHolder": "Value here...",
            "rows": 3,
        }),
        ElementKind::DateField => json!({
            "label": "Date field",
            "helperText": "Pick a date",
            "required": false,
        }),
        ElementKind::SelectField => json!({
            "label": "Select field",
            "helperText": "Helper text",
            "required": false,
            "placeHolder": "Value here...",
            "options": [],
        }),
        ElementKind::CheckboxField => json!({
            "label": "Checkbox field",
            "helperText": "Helper text",
            "required": false,
        }),
        ElementKind::ImageElement => json!({
            "base64Image": "",
            "height": 200,
            "width": 200,
            "maintainAspectRatio": true,
            "alignment": "center",
            "marginTop": 0,
            "marginBottom": 0,
            "marginLeft": 0,
            "marginRight": 0,
            "maxDimension": 800,
        }),
        ElementKind::ImageUploadField => json!({
            "label": "Image Upload",
            "helperText": "Upload an image file",
            "required": false,
            "prompt": "Upload an image",
            "buttonText": "Choose File",
            "width": "w-96",
            "height": "h-64",
            "maxDimension": 800,
        }),
        ElementKind::BulletedListField => json!({
            "items": "Item 1\nItem 2\nItem 3",
            "bulletStyle": "disc",
            "fontSize": "h3",
        }),
        ElementKind::RatingScaleField => json!({
            "label": "Rating Scale",
            "helperText": "Select a value",
            "required": false,
            "question": "Rate your experience",
            "minLabel": "Poor",
            "midLabel": "Average",
            "maxLabel": "Excellent",
            "minValue": 1,
            "maxValue": 10,
            "colorScheme": "blue",
            "gradientScheme": null,
        }),
        ElementKind::DualImageUpload => json!({
            "label": "Dual Image Upload",
            "helperText": "Upload two image files",
            "required": false,
            "prompt": "Upload two images",
            "buttonText": "Choose Files",
            "width": "w-64",
            "height": "h-48",
            "maxDimension": 800,
        }),
        ElementKind::PictureSelectField => json!({
            "label": "Picture select",
            "helperText": "Pick a picture",
            "required": false,
            "options": [],
        }),
        ElementKind::TwoColumnLayoutField => json!({
            "gap": "4",
        }),
    };

    match value {
        Value::Object(map) => map,
        _ => Attributes::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Column;

    fn required(kind: ElementKind) -> ElementNode {
        construct(kind, ElementId::generate()).with_attribute("required", Value::Bool(true))
    }

    #[test]
    fn construct_assigns_id_and_defaults() {
        let id = ElementId::intern("title_1");
        let node = construct(ElementKind::TitleField, id);
        assert_eq!(node.id(), id);
        assert_eq!(node.kind(), ElementKind::TitleField);
        assert_eq!(node.attribute("title"), Some(&json!("Title")));
        assert!(!node.is_container());
    }

    #[test]
    fn layout_container_starts_with_empty_columns() {
        let node = construct(ElementKind::TwoColumnLayoutField, ElementId::generate());
        assert!(node.is_container());
        assert!(node.column(Column::Left).unwrap().is_empty());
        assert!(node.column(Column::Right).unwrap().is_empty());
        assert_eq!(node.attribute("gap"), Some(&json!("4")));
    }

    #[test]
    fn palette_covers_every_kind() {
        let palette = palette();
        assert_eq!(palette.len(), ElementKind::ALL.len());
        assert_eq!(palette[0].label, "Text Field");
    }

    #[test]
    fn optional_fields_always_validate() {
        let node = construct(ElementKind::TextField, ElementId::generate());
        assert!(validate(&node, ""));
    }

    #[test]
    fn required_input_rejects_empty() {
        let node = required(ElementKind::RatingScaleField);
        assert!(!validate(&node, ""));
        assert!(validate(&node, "7"));
    }

    #[test]
    fn required_checkbox_needs_true() {
        let node = required(ElementKind::CheckboxField);
        assert!(!validate(&node, "false"));
        assert!(validate(&node, "true"));
    }

    #[test]
    fn required_dual_upload_needs_two_images() {
        let node = required(ElementKind::DualImageUpload);
        assert!(!validate(&node, "not json"));
        assert!(!validate(&node, r#"["data:a"]"#));
        assert!(!validate(&node, r#"["data:a", ""]"#));
        assert!(validate(&node, r#"["data:a", "data:b"]"#));
    }

    #[test]
    fn static_kinds_ignore_required() {
        let node = required(ElementKind::ImageUploadField);
        assert!(validate(&node, ""));
    }
}
