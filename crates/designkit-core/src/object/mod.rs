//! Object model for everything that can be placed on the canvas.
//!
//! A [`CanvasObject`] carries the fields common to every placeable entity
//! (identity, position, optional size and rotation) and an [`ObjectKind`]
//! payload for the variant-specific attributes. The serialized form is the
//! flat JSON shape stored inside design records:
//!
//! ```json
//! { "id": "a", "type": "shape", "shapeType": "rectangle", "x": 100, "y": 100 }
//! ```

mod color;
mod patch;

pub use color::parse_hex_color;
pub use patch::ObjectPatch;

use kurbo::Point;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Unique identifier for canvas objects. Generated client-side.
pub type ObjectId = String;

/// Generate a fresh object identifier.
pub fn new_object_id() -> ObjectId {
    Uuid::new_v4().to_string()
}

/// Values substituted at render/edit time for attributes that are absent.
pub mod defaults {
    pub const FILL_COLOR: &str = "#ffffff";
    pub const STROKE_COLOR: &str = "#000000";
    /// Arrow heads are filled with the stroke color unless told otherwise.
    pub const ARROW_FILL_COLOR: &str = "#000000";
    pub const STROKE_WIDTH: f64 = 2.0;
    /// Width and height of shapes that do not carry an explicit size.
    pub const SHAPE_SIZE: f64 = 100.0;
    pub const CIRCLE_RADIUS: f64 = 50.0;
    pub const FONT_SIZE: f64 = 20.0;
    pub const FONT_COLOR: &str = "#000000";
    pub const TEXT: &str = "Sample Text";
    pub const OPACITY: f64 = 1.0;
    pub const ROTATION: f64 = 0.0;
}

/// The `type` discriminators understood by this build.
pub const KNOWN_TYPES: [&str; 3] = ["shape", "text", "image"];

/// Object model errors.
#[derive(Debug, Error)]
pub enum ObjectError {
    #[error("Missing object type")]
    MissingType,
    #[error("Unknown object type: {0}")]
    UnknownType(String),
    #[error("Opacity {0} is outside [0, 1]")]
    OpacityOutOfRange(f64),
    #[error("Malformed object: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// The kind of geometric shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Rectangle,
    Circle,
    Triangle,
    Line,
    Arrow,
    /// A shape kind this build does not know how to draw.
    #[default]
    #[serde(other)]
    Unknown,
}

impl ShapeKind {
    /// All drawable shape kinds, in toolbar order.
    pub fn all() -> &'static [ShapeKind] {
        &[
            ShapeKind::Rectangle,
            ShapeKind::Circle,
            ShapeKind::Triangle,
            ShapeKind::Arrow,
            ShapeKind::Line,
        ]
    }

    /// Whether the shape is open (stroke only, no fill).
    pub fn is_open(self) -> bool {
        matches!(self, ShapeKind::Line | ShapeKind::Arrow)
    }
}

/// Crop rectangle in source-image pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Attributes of a geometric shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeProps {
    #[serde(default)]
    pub shape_type: ShapeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<f64>,
}

impl ShapeProps {
    pub fn new(shape_type: ShapeKind) -> Self {
        Self {
            shape_type,
            ..Self::default()
        }
    }

    /// Fill color, falling back to the per-kind default.
    pub fn fill_color_or_default(&self) -> &str {
        match (&self.fill_color, self.shape_type) {
            (Some(color), _) => color,
            (None, ShapeKind::Arrow) => defaults::ARROW_FILL_COLOR,
            (None, _) => defaults::FILL_COLOR,
        }
    }

    pub fn stroke_color_or_default(&self) -> &str {
        self.stroke_color.as_deref().unwrap_or(defaults::STROKE_COLOR)
    }

    pub fn stroke_width_or_default(&self) -> f64 {
        self.stroke_width.unwrap_or(defaults::STROKE_WIDTH)
    }
}

/// Attributes of a text run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextProps {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<u16>,
    /// Font color.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl TextProps {
    pub fn text_or_default(&self) -> &str {
        self.text.as_deref().unwrap_or(defaults::TEXT)
    }

    pub fn font_size_or_default(&self) -> f64 {
        self.font_size.unwrap_or(defaults::FONT_SIZE)
    }

    pub fn color_or_default(&self) -> &str {
        self.color.as_deref().unwrap_or(defaults::FONT_COLOR)
    }
}

/// Attributes of an embedded raster image.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageProps {
    /// Data URI or URL of the image.
    #[serde(default)]
    pub src: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crop: Option<CropRect>,
}

impl ImageProps {
    pub fn opacity_or_default(&self) -> f64 {
        self.opacity.unwrap_or(defaults::OPACITY)
    }
}

/// Variant-specific payload of a canvas object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ObjectKind {
    Shape(ShapeProps),
    Text(TextProps),
    Image(ImageProps),
}

impl ObjectKind {
    /// The wire discriminator for this variant.
    pub fn type_name(&self) -> &'static str {
        match self {
            ObjectKind::Shape(_) => "shape",
            ObjectKind::Text(_) => "text",
            ObjectKind::Image(_) => "image",
        }
    }
}

/// A single placeable entity on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasObject {
    pub id: ObjectId,
    /// Left edge in canvas coordinates (origin top-left).
    pub x: f64,
    /// Top edge in canvas coordinates.
    pub y: f64,
    /// Rotation in degrees.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(flatten)]
    pub kind: ObjectKind,
}

impl CanvasObject {
    /// Create an object with the given payload at a position.
    pub fn new(id: impl Into<ObjectId>, x: f64, y: f64, kind: ObjectKind) -> Self {
        Self {
            id: id.into(),
            x,
            y,
            rotation: None,
            width: None,
            height: None,
            kind,
        }
    }

    /// Create a shape with default styling.
    pub fn shape(id: impl Into<ObjectId>, shape_type: ShapeKind, x: f64, y: f64) -> Self {
        Self::new(id, x, y, ObjectKind::Shape(ShapeProps::new(shape_type)))
    }

    /// Create a text object.
    pub fn text(id: impl Into<ObjectId>, content: impl Into<String>, x: f64, y: f64) -> Self {
        let props = TextProps {
            text: Some(content.into()),
            ..TextProps::default()
        };
        Self::new(id, x, y, ObjectKind::Text(props))
    }

    /// Create an image object from a data URI or URL.
    pub fn image(id: impl Into<ObjectId>, src: impl Into<String>, x: f64, y: f64) -> Self {
        let props = ImageProps {
            src: src.into(),
            ..ImageProps::default()
        };
        Self::new(id, x, y, ObjectKind::Image(props))
    }

    /// Set the display size.
    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    /// Set the rotation in degrees.
    pub fn with_rotation(mut self, degrees: f64) -> Self {
        self.rotation = Some(degrees);
        self
    }

    /// Parse an object from JSON text, rejecting unknown variants.
    pub fn from_json(json: &str) -> Result<Self, ObjectError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    /// Parse an object from a JSON value, rejecting unknown variants.
    pub fn from_value(value: serde_json::Value) -> Result<Self, ObjectError> {
        let type_name = value
            .get("type")
            .and_then(|t| t.as_str())
            .ok_or(ObjectError::MissingType)?;
        if !KNOWN_TYPES.contains(&type_name) {
            return Err(ObjectError::UnknownType(type_name.to_string()));
        }
        let object: Self = serde_json::from_value(value)?;
        object.validate()?;
        Ok(object)
    }

    /// Check structural constraints not expressed by the type system.
    pub fn validate(&self) -> Result<(), ObjectError> {
        if let ObjectKind::Image(props) = &self.kind {
            if let Some(opacity) = props.opacity {
                if !(0.0..=1.0).contains(&opacity) {
                    return Err(ObjectError::OpacityOutOfRange(opacity));
                }
            }
        }
        Ok(())
    }

    /// Position as a point.
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn rotation_or_default(&self) -> f64 {
        self.rotation.unwrap_or(defaults::ROTATION)
    }

    pub fn width_or(&self, fallback: f64) -> f64 {
        self.width.unwrap_or(fallback)
    }

    pub fn height_or(&self, fallback: f64) -> f64 {
        self.height.unwrap_or(fallback)
    }

    pub fn is_text(&self) -> bool {
        matches!(self.kind, ObjectKind::Text(_))
    }

    pub fn as_shape(&self) -> Option<&ShapeProps> {
        match &self.kind {
            ObjectKind::Shape(props) => Some(props),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&TextProps> {
        match &self.kind {
            ObjectKind::Text(props) => Some(props),
            _ => None,
        }
    }

    pub fn as_image(&self) -> Option<&ImageProps> {
        match &self.kind {
            ObjectKind::Image(props) => Some(props),
            _ => None,
        }
    }

    /// Shallow-merge a patch into this object.
    /// Returns true if any attribute changed.
    pub fn apply_patch(&mut self, patch: &ObjectPatch) -> bool {
        patch.apply_to(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_flat_shape() {
        let obj = CanvasObject::from_value(json!({
            "id": "a",
            "type": "shape",
            "shapeType": "rectangle",
            "x": 100,
            "y": 100
        }))
        .unwrap();

        assert_eq!(obj.id, "a");
        assert_eq!(obj.x, 100.0);
        let props = obj.as_shape().unwrap();
        assert_eq!(props.shape_type, ShapeKind::Rectangle);
        assert_eq!(props.fill_color_or_default(), "#ffffff");
        assert_eq!(props.stroke_width_or_default(), 2.0);
        assert_eq!(obj.rotation_or_default(), 0.0);
    }

    #[test]
    fn test_serialize_is_flat_and_camel_case() {
        let obj = CanvasObject::text("t1", "Hello", 10.0, 20.0).with_rotation(45.0);
        let value = serde_json::to_value(&obj).unwrap();

        assert_eq!(value["type"], "text");
        assert_eq!(value["text"], "Hello");
        assert_eq!(value["rotation"], 45.0);
        assert!(value.get("width").is_none());
        assert!(value.get("kind").is_none());
    }

    #[test]
    fn test_unknown_type_rejected() {
        let result = CanvasObject::from_value(json!({
            "id": "x", "type": "video", "x": 0, "y": 0
        }));
        assert!(matches!(result, Err(ObjectError::UnknownType(t)) if t == "video"));

        let result = CanvasObject::from_value(json!({ "id": "x", "x": 0, "y": 0 }));
        assert!(matches!(result, Err(ObjectError::MissingType)));
    }

    #[test]
    fn test_unknown_shape_kind_still_loads() {
        let obj = CanvasObject::from_json(
            r#"{"id":"s","type":"shape","shapeType":"hexagon","x":1,"y":2}"#,
        )
        .unwrap();
        assert_eq!(obj.as_shape().unwrap().shape_type, ShapeKind::Unknown);
    }

    #[test]
    fn test_opacity_range_validated() {
        let result = CanvasObject::from_value(json!({
            "id": "i", "type": "image", "src": "data:,", "opacity": 1.5, "x": 0, "y": 0
        }));
        assert!(matches!(result, Err(ObjectError::OpacityOutOfRange(_))));
    }

    #[test]
    fn test_text_defaults() {
        let obj = CanvasObject::new("t", 0.0, 0.0, ObjectKind::Text(TextProps::default()));
        let props = obj.as_text().unwrap();
        assert_eq!(props.text_or_default(), "Sample Text");
        assert_eq!(props.font_size_or_default(), 20.0);
        assert_eq!(props.color_or_default(), "#000000");
    }

    #[test]
    fn test_arrow_fill_default() {
        let props = ShapeProps::new(ShapeKind::Arrow);
        assert_eq!(props.fill_color_or_default(), "#000000");
    }

    #[test]
    fn test_generated_ids_unique() {
        assert_ne!(new_object_id(), new_object_id());
    }
}
