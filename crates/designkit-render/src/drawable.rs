//! Resolution of canvas objects into drawable primitives.
//!
//! Every drawable lives in a local coordinate space whose origin is the
//! object's (x, y) and which is rotated by the object's rotation about that
//! origin. Rectangles, triangles, lines, arrows, text and images extend to the
//! right and down from the origin; circles are centred on it.

use crate::images::ImageCache;
use designkit_core::object::{
    CanvasObject, ImageProps, ObjectId, ObjectKind, ShapeKind, ShapeProps, TextProps, defaults,
};
use designkit_core::parse_hex_color;
use image::RgbaImage;
use kurbo::{Affine, BezPath, Circle, Line, ParamCurveNearest, PathEl, Point, Rect, Shape, Size, Vec2};
use peniko::Color;
use std::sync::Arc;

/// Arrow head length along the shaft.
pub const ARROW_POINTER_LENGTH: f64 = 10.0;
/// Arrow head width across the shaft.
pub const ARROW_POINTER_WIDTH: f64 = 10.0;
/// Images are scaled down to fit this box; never scaled up.
pub const IMAGE_MAX_SIZE: f64 = 300.0;
/// Approximate advance of one character, as a fraction of the font size.
const CHAR_WIDTH_RATIO: f64 = 0.6;
/// Tolerance used when flattening curves for hit testing and rasterizing.
pub(crate) const FLATTEN_TOLERANCE: f64 = 0.25;

/// Stroke paint.
#[derive(Debug, Clone, Copy)]
pub struct StrokeStyle {
    pub color: Color,
    pub width: f64,
}

/// A filled and/or stroked path.
#[derive(Debug, Clone)]
pub struct PathPrimitive {
    pub path: BezPath,
    pub fill: Option<Color>,
    pub stroke: Option<StrokeStyle>,
}

impl PathPrimitive {
    /// Painted bounds in local coordinates, including stroke.
    pub fn bounds(&self) -> Rect {
        let half = self.stroke.map(|s| s.width / 2.0).unwrap_or(0.0);
        self.path.bounding_box().inflate(half, half)
    }
}

/// A single-style run of text anchored at the local origin.
#[derive(Debug, Clone)]
pub struct TextRun {
    pub content: String,
    pub font_size: f64,
    pub color: Color,
    pub italic: bool,
    pub weight: u16,
    /// Estimated layout size, used for hit testing and handles.
    pub size: Size,
}

/// A decoded raster image drawn at the local origin.
#[derive(Debug, Clone)]
pub struct Bitmap {
    pub image: Arc<RgbaImage>,
    pub size: Size,
    pub opacity: f64,
    /// Source rectangle in image pixels.
    pub crop: Option<Rect>,
}

/// One paintable part of a drawable.
#[derive(Debug, Clone)]
pub enum Primitive {
    Path(PathPrimitive),
    Text(TextRun),
    Bitmap(Bitmap),
}

impl Primitive {
    /// Painted bounds in local coordinates, including stroke.
    pub fn bounds(&self) -> Rect {
        match self {
            Primitive::Path(p) => p.bounds(),
            Primitive::Text(t) => Rect::from_origin_size(Point::ZERO, t.size),
            Primitive::Bitmap(b) => Rect::from_origin_size(Point::ZERO, b.size),
        }
    }

    /// Whether a local point lies on the painted area, with some slack for strokes.
    pub fn contains(&self, local: Point, tolerance: f64) -> bool {
        match self {
            Primitive::Path(p) => {
                if p.fill.is_some() && p.path.contains(local) {
                    return true;
                }
                let reach = p.stroke.map(|s| s.width / 2.0).unwrap_or(0.0) + tolerance;
                point_to_polyline_dist(local, &flatten_segments(&p.path)) <= reach
            }
            Primitive::Text(_) | Primitive::Bitmap(_) => self.bounds().contains(local),
        }
    }
}

/// A resolved object ready to be painted.
#[derive(Debug, Clone)]
pub struct Drawable {
    pub id: ObjectId,
    /// Canvas position of the local origin.
    pub origin: Point,
    /// Rotation in degrees about the origin.
    pub rotation: f64,
    /// Logical frame in local coordinates. Resize handles attach to it.
    pub frame: Rect,
    pub parts: Vec<Primitive>,
}

impl Drawable {
    /// Local-to-canvas transform.
    pub fn transform(&self) -> Affine {
        frame_transform(self.origin, self.rotation)
    }

    /// Painted bounds in local coordinates.
    pub fn bounds(&self) -> Rect {
        self.parts
            .iter()
            .map(Primitive::bounds)
            .fold(self.frame, |acc, r| acc.union(r))
    }

    /// Axis-aligned painted bounds in canvas coordinates.
    pub fn world_bounds(&self) -> Rect {
        self.transform().transform_rect_bbox(self.bounds())
    }

    /// Whether this drawable is a text run (editable in place).
    pub fn is_text(&self) -> bool {
        matches!(self.parts.as_slice(), [Primitive::Text(_)])
    }

    /// Whether a canvas point hits this drawable.
    pub fn contains(&self, point: Point, tolerance: f64) -> bool {
        let local = self.transform().inverse() * point;
        self.parts.iter().any(|p| p.contains(local, tolerance))
    }
}

/// Translate to `origin`, then rotate by `rotation` degrees about it.
pub fn frame_transform(origin: Point, rotation: f64) -> Affine {
    Affine::translate(origin.to_vec2()) * Affine::rotate(rotation.to_radians())
}

/// Map an object to its drawable form.
///
/// Returns None for objects that cannot be drawn (yet): shapes of an unknown
/// kind and images whose source has not been decoded.
pub fn resolve(object: &CanvasObject, images: &ImageCache) -> Option<Drawable> {
    let (frame, parts) = match &object.kind {
        ObjectKind::Shape(props) => resolve_shape(object, props)?,
        ObjectKind::Text(props) => resolve_text(props),
        ObjectKind::Image(props) => resolve_image(props, images)?,
    };
    Some(Drawable {
        id: object.id.clone(),
        origin: object.position(),
        rotation: object.rotation_or_default(),
        frame,
        parts,
    })
}

fn resolve_shape(object: &CanvasObject, props: &ShapeProps) -> Option<(Rect, Vec<Primitive>)> {
    let width = object.width_or(defaults::SHAPE_SIZE);
    let height = object.height_or(defaults::SHAPE_SIZE);
    let fill = Some(parse_hex_color(props.fill_color_or_default()));
    let stroke = stroke_style(props);

    let resolved = match props.shape_type {
        ShapeKind::Rectangle => {
            let frame = Rect::new(0.0, 0.0, width, height);
            (frame, vec![path(frame.to_path(FLATTEN_TOLERANCE), fill, stroke)])
        }
        ShapeKind::Circle => {
            let radius = object.width.map(|w| w / 2.0).unwrap_or(defaults::CIRCLE_RADIUS);
            let circle = Circle::new(Point::ZERO, radius);
            (circle.bounding_box(), vec![path(circle.to_path(FLATTEN_TOLERANCE), fill, stroke)])
        }
        ShapeKind::Triangle => {
            let mut triangle = BezPath::new();
            triangle.move_to((0.0, height));
            triangle.line_to((width / 2.0, 0.0));
            triangle.line_to((width, height));
            triangle.close_path();
            (Rect::new(0.0, 0.0, width, height), vec![path(triangle, fill, stroke)])
        }
        ShapeKind::Line | ShapeKind::Arrow => {
            // Open shapes run from the origin to (width, height), where a
            // missing height means horizontal.
            let end = Point::new(width, object.height.unwrap_or(0.0));
            let mut shaft = BezPath::new();
            shaft.move_to(Point::ZERO);
            shaft.line_to(end);
            let frame = Rect::from_points(Point::ZERO, end);
            let mut parts = vec![path(shaft, None, stroke)];
            if props.shape_type == ShapeKind::Arrow {
                if let Some(head) = arrow_head(Point::ZERO, end) {
                    parts.push(path(head, fill, stroke));
                }
            }
            (frame, parts)
        }
        ShapeKind::Unknown => {
            log::debug!("Skipping object {} with unknown shape kind", object.id);
            return None;
        }
    };
    Some(resolved)
}

fn stroke_style(props: &ShapeProps) -> Option<StrokeStyle> {
    let width = props.stroke_width_or_default();
    (width > 0.0).then(|| StrokeStyle {
        color: parse_hex_color(props.stroke_color_or_default()),
        width,
    })
}

fn path(path: BezPath, fill: Option<Color>, stroke: Option<StrokeStyle>) -> Primitive {
    Primitive::Path(PathPrimitive { path, fill, stroke })
}

/// Closed triangular head pointing at `end`.
fn arrow_head(start: Point, end: Point) -> Option<BezPath> {
    let direction = end - start;
    let length = direction.hypot();
    if length < f64::EPSILON {
        return None;
    }
    let unit = direction / length;
    let normal = Vec2::new(-unit.y, unit.x) * (ARROW_POINTER_WIDTH / 2.0);
    let base = end - unit * ARROW_POINTER_LENGTH;

    let mut head = BezPath::new();
    head.move_to(end);
    head.line_to(base + normal);
    head.line_to(base - normal);
    head.close_path();
    Some(head)
}

fn resolve_text(props: &TextProps) -> (Rect, Vec<Primitive>) {
    let content = props.text_or_default().to_string();
    let font_size = props.font_size_or_default();
    let size = estimate_text_size(&content, font_size);
    let run = TextRun {
        italic: props.font_style.as_deref().is_some_and(|s| s.contains("italic")),
        weight: props.font_weight.unwrap_or(400),
        color: parse_hex_color(props.color_or_default()),
        content,
        font_size,
        size,
    };
    (Rect::from_origin_size(Point::ZERO, size), vec![Primitive::Text(run)])
}

/// Rough layout size of a text block: one line per `\n`, fixed advance per char.
pub fn estimate_text_size(content: &str, font_size: f64) -> Size {
    let lines: Vec<&str> = content.split('\n').collect();
    let longest = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    Size::new(
        longest as f64 * font_size * CHAR_WIDTH_RATIO,
        lines.len() as f64 * font_size,
    )
}

fn resolve_image(props: &ImageProps, images: &ImageCache) -> Option<(Rect, Vec<Primitive>)> {
    let Some(image) = images.get(&props.src) else {
        log::debug!("Image source not ready, skipping");
        return None;
    };
    let size = fit_within(image.width() as f64, image.height() as f64, IMAGE_MAX_SIZE);
    let crop = props
        .crop
        .map(|c| Rect::new(c.x, c.y, c.x + c.width, c.y + c.height));
    let bitmap = Bitmap {
        image,
        size,
        opacity: props.opacity_or_default().clamp(0.0, 1.0),
        crop,
    };
    Some((Rect::from_origin_size(Point::ZERO, size), vec![Primitive::Bitmap(bitmap)]))
}

/// Scale a size down (never up) so both sides fit within `max`.
pub fn fit_within(width: f64, height: f64, max: f64) -> Size {
    if width <= 0.0 || height <= 0.0 {
        return Size::ZERO;
    }
    let scale = (max / width).min(max / height).min(1.0);
    Size::new(width * scale, height * scale)
}

/// Flatten a path into straight segments.
pub(crate) fn flatten_segments(path: &BezPath) -> Vec<Line> {
    let mut segments = Vec::new();
    let mut start = Point::ZERO;
    let mut last = Point::ZERO;
    kurbo::flatten(path.iter(), FLATTEN_TOLERANCE, |el| match el {
        PathEl::MoveTo(p) => {
            start = p;
            last = p;
        }
        PathEl::LineTo(p) => {
            segments.push(Line::new(last, p));
            last = p;
        }
        PathEl::ClosePath => {
            if last != start {
                segments.push(Line::new(last, start));
            }
            last = start;
        }
        _ => {}
    });
    segments
}

/// Shortest distance from a point to any of the segments.
pub(crate) fn point_to_polyline_dist(point: Point, segments: &[Line]) -> f64 {
    segments
        .iter()
        .map(|seg| seg.nearest(point, 1e-6).distance_sq.sqrt())
        .fold(f64::INFINITY, f64::min)
}
