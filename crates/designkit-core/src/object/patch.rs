//! Sparse attribute updates for canvas objects.

use super::{CanvasObject, CropRect, ObjectKind, ShapeKind};
use serde::{Deserialize, Serialize};

/// Partial attribute set for an object update. Only present fields are applied.
///
/// Variant-specific fields are ignored when the target object is of a
/// different variant, so an update can never give a shape text attributes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ObjectPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,

    // Shape
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shape_type: Option<ShapeKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<f64>,

    // Text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_style: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    // Image
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crop: Option<CropRect>,
}

impl ObjectPatch {
    /// A patch that moves an object.
    pub fn position(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Self::default()
        }
    }

    /// A patch carrying the terminal state of a resize/rotate gesture.
    pub fn transform(x: f64, y: f64, width: f64, height: f64, rotation: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            width: Some(width),
            height: Some(height),
            rotation: Some(rotation),
            ..Self::default()
        }
    }

    /// A patch that replaces the content of a text object.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            text: Some(content.into()),
            ..Self::default()
        }
    }

    /// Check whether the patch carries no fields at all.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub(super) fn apply_to(&self, object: &mut CanvasObject) -> bool {
        let mut changed = false;
        changed |= merge(&mut object.x, &self.x);
        changed |= merge(&mut object.y, &self.y);
        changed |= merge_opt(&mut object.rotation, &self.rotation);
        changed |= merge_opt(&mut object.width, &self.width);
        changed |= merge_opt(&mut object.height, &self.height);

        match &mut object.kind {
            ObjectKind::Shape(props) => {
                changed |= merge(&mut props.shape_type, &self.shape_type);
                changed |= merge_opt(&mut props.fill_color, &self.fill_color);
                changed |= merge_opt(&mut props.stroke_color, &self.stroke_color);
                changed |= merge_opt(&mut props.stroke_width, &self.stroke_width);
            }
            ObjectKind::Text(props) => {
                changed |= merge_opt(&mut props.text, &self.text);
                changed |= merge_opt(&mut props.font_size, &self.font_size);
                changed |= merge_opt(&mut props.font_style, &self.font_style);
                changed |= merge_opt(&mut props.font_weight, &self.font_weight);
                changed |= merge_opt(&mut props.color, &self.color);
            }
            ObjectKind::Image(props) => {
                changed |= merge(&mut props.src, &self.src);
                let opacity = self
                    .opacity
                    .filter(|o| o.is_finite())
                    .map(|o| o.clamp(0.0, 1.0));
                changed |= merge_opt(&mut props.opacity, &opacity);
                changed |= merge_opt(&mut props.crop, &self.crop);
            }
        }

        changed
    }
}

fn merge<T: PartialEq + Clone>(slot: &mut T, value: &Option<T>) -> bool {
    match value {
        Some(v) if slot != v => {
            *slot = v.clone();
            true
        }
        _ => false,
    }
}

fn merge_opt<T: PartialEq + Clone>(slot: &mut Option<T>, value: &Option<T>) -> bool {
    match value {
        Some(v) if slot.as_ref() != Some(v) => {
            *slot = Some(v.clone());
            true
        }
        _ => false,
    }
}
