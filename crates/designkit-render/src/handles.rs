//! Selection frame, resize/rotate handles and the geometry of dragging them.

use crate::drawable::{Drawable, frame_transform};
use designkit_core::Transform;
use designkit_core::object::ObjectId;
use kurbo::{Affine, BezPath, Point, Rect, Shape};

/// Handle size in pixels.
pub const HANDLE_SIZE: f64 = 10.0;
/// Handle hit tolerance in pixels.
pub const HANDLE_HIT_TOLERANCE: f64 = 8.0;
/// Distance from the top edge to the rotation handle.
pub const ROTATE_HANDLE_OFFSET: f64 = 25.0;
/// Smallest frame side a resize can produce.
pub const MIN_FRAME_SIZE: f64 = 5.0;

/// Corner positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// Edge midpoint positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edge {
    Top,
    Right,
    Bottom,
    Left,
}

/// Type of selection handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandleKind {
    Corner(Corner),
    Edge(Edge),
    /// Rotation handle (above the top edge).
    Rotate,
}

/// A selection handle with its position and type.
#[derive(Debug, Clone, Copy)]
pub struct Handle {
    /// Position in canvas coordinates.
    pub position: Point,
    pub kind: HandleKind,
}

impl Handle {
    pub fn new(position: Point, kind: HandleKind) -> Self {
        Self { position, kind }
    }

    /// Check if a point hits this handle.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        (point - self.position).hypot2() <= tolerance * tolerance
    }

    /// Square outline of the handle, in canvas coordinates.
    pub fn outline(&self) -> Rect {
        Rect::from_center_size(self.position, (HANDLE_SIZE, HANDLE_SIZE))
    }
}

/// The transformer attached to the selected object.
#[derive(Debug, Clone)]
pub struct SelectionOverlay {
    pub id: ObjectId,
    pub origin: Point,
    /// Rotation in degrees.
    pub rotation: f64,
    /// Logical frame in local coordinates.
    pub frame: Rect,
    /// Eight resize anchors and the rotate anchor.
    pub handles: Vec<Handle>,
}

impl SelectionOverlay {
    /// Attach an overlay to a drawable.
    pub fn new(drawable: &Drawable) -> Self {
        let transform = drawable.transform();
        Self {
            id: drawable.id.clone(),
            origin: drawable.origin,
            rotation: drawable.rotation,
            frame: drawable.frame,
            handles: frame_handles(drawable.frame, transform),
        }
    }

    pub fn transform(&self) -> Affine {
        frame_transform(self.origin, self.rotation)
    }

    /// The (possibly rotated) frame outline in canvas coordinates.
    pub fn outline(&self) -> BezPath {
        self.transform() * self.frame.to_path(0.1)
    }

    /// Find which handle (if any) is hit at the given point.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> Option<HandleKind> {
        self.handles
            .iter()
            .find(|h| h.hit_test(point, tolerance))
            .map(|h| h.kind)
    }

    /// The terminal geometry after dragging `handle` to `pointer`.
    pub fn drag_handle(&self, handle: HandleKind, pointer: Point) -> Transform {
        match handle {
            HandleKind::Rotate => self.rotate_to(pointer),
            _ => self.resize_to(handle, pointer),
        }
    }

    fn resize_to(&self, handle: HandleKind, pointer: Point) -> Transform {
        let transform = self.transform();
        let local = transform.inverse() * pointer;
        let old = self.frame;
        let new = resize_frame(old, handle, local);

        let sx = if old.width() > f64::EPSILON { new.width() / old.width() } else { 1.0 };
        let sy = if old.height() > f64::EPSILON { new.height() / old.height() } else { 1.0 };
        // The origin scales with the frame, anchored at the opposite side.
        let origin_local = Point::new(new.x0 - old.x0 * sx, new.y0 - old.y0 * sy);
        let origin = transform * origin_local;

        Transform {
            x: origin.x,
            y: origin.y,
            width: old.width() * sx,
            height: old.height() * sy,
            rotation: self.rotation,
        }
    }

    fn rotate_to(&self, pointer: Point) -> Transform {
        let center = self.transform() * self.frame.center();
        let delta = pointer - center;
        // 0 degrees points up from the center
        let rotation = normalize_degrees(delta.y.atan2(delta.x).to_degrees() + 90.0);
        let offset = Affine::rotate(rotation.to_radians()) * self.frame.center();
        let origin = center - offset.to_vec2();

        Transform {
            x: origin.x,
            y: origin.y,
            width: self.frame.width(),
            height: self.frame.height(),
            rotation,
        }
    }
}

/// Generate the 8 resize handles plus the rotation handle for a frame.
pub fn frame_handles(frame: Rect, transform: Affine) -> Vec<Handle> {
    let cx = frame.center().x;
    let cy = frame.center().y;
    let local = [
        (Point::new(frame.x0, frame.y0), HandleKind::Corner(Corner::TopLeft)),
        (Point::new(frame.x1, frame.y0), HandleKind::Corner(Corner::TopRight)),
        (Point::new(frame.x0, frame.y1), HandleKind::Corner(Corner::BottomLeft)),
        (Point::new(frame.x1, frame.y1), HandleKind::Corner(Corner::BottomRight)),
        (Point::new(cx, frame.y0), HandleKind::Edge(Edge::Top)),
        (Point::new(frame.x1, cy), HandleKind::Edge(Edge::Right)),
        (Point::new(cx, frame.y1), HandleKind::Edge(Edge::Bottom)),
        (Point::new(frame.x0, cy), HandleKind::Edge(Edge::Left)),
        (Point::new(cx, frame.y0 - ROTATE_HANDLE_OFFSET), HandleKind::Rotate),
    ];
    local
        .into_iter()
        .map(|(p, kind)| Handle::new(transform * p, kind))
        .collect()
}

/// Move the sides of `frame` that `handle` controls to the local pointer.
/// Sides never cross; degenerate (zero-extent) axes stay put.
pub fn resize_frame(frame: Rect, handle: HandleKind, local: Point) -> Rect {
    let (left, top, right, bottom) = match handle {
        HandleKind::Corner(Corner::TopLeft) => (true, true, false, false),
        HandleKind::Corner(Corner::TopRight) => (false, true, true, false),
        HandleKind::Corner(Corner::BottomLeft) => (true, false, false, true),
        HandleKind::Corner(Corner::BottomRight) => (false, false, true, true),
        HandleKind::Edge(Edge::Top) => (false, true, false, false),
        HandleKind::Edge(Edge::Right) => (false, false, true, false),
        HandleKind::Edge(Edge::Bottom) => (false, false, false, true),
        HandleKind::Edge(Edge::Left) => (true, false, false, false),
        HandleKind::Rotate => return frame,
    };

    let mut out = frame;
    if frame.width() > f64::EPSILON {
        if left {
            out.x0 = local.x.min(frame.x1 - MIN_FRAME_SIZE);
        }
        if right {
            out.x1 = local.x.max(frame.x0 + MIN_FRAME_SIZE);
        }
    }
    if frame.height() > f64::EPSILON {
        if top {
            out.y0 = local.y.min(frame.y1 - MIN_FRAME_SIZE);
        }
        if bottom {
            out.y1 = local.y.max(frame.y0 + MIN_FRAME_SIZE);
        }
    }
    out
}

fn normalize_degrees(degrees: f64) -> f64 {
    let d = degrees.rem_euclid(360.0);
    if d > 180.0 { d - 360.0 } else { d }
}
