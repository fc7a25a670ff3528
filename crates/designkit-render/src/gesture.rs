//! Pointer gesture recognition.
//!
//! Pointer events go in, [`Intent`]s come out. Only the terminal state of a
//! gesture is reported: a drag yields one `DragEnd` on release, a resize or
//! rotate one `TransformEnd`. Nothing is emitted while the pointer moves.

use crate::handles::{HANDLE_HIT_TOLERANCE, HandleKind, SelectionOverlay};
use crate::scene::Scene;
use designkit_core::Intent;
use designkit_core::object::ObjectId;
use kurbo::Point;

/// Pointer travel before a press becomes a drag, in pixels.
pub const DRAG_THRESHOLD: f64 = 3.0;

#[derive(Debug, Clone, Default)]
enum Gesture {
    #[default]
    Idle,
    /// Button down, not yet moved far enough to drag.
    Pressed {
        target: Option<(ObjectId, Point)>,
        start: Point,
    },
    /// Moving an object; `origin` is its position when the drag began.
    Dragging {
        id: ObjectId,
        start: Point,
        origin: Point,
    },
    /// Dragging a resize or rotate handle of the selected object.
    Handle {
        overlay: SelectionOverlay,
        handle: HandleKind,
        moved: bool,
    },
}

/// Turns raw pointer input on the canvas into intents.
#[derive(Debug, Clone, Default)]
pub struct GestureRecognizer {
    state: Gesture,
}

impl GestureRecognizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a gesture is in progress.
    pub fn is_active(&self) -> bool {
        !matches!(self.state, Gesture::Idle)
    }

    /// Primary button pressed. Handles of the selected object take
    /// precedence over the objects beneath them.
    pub fn pointer_down(&mut self, scene: &Scene, selection: Option<&str>, point: Point) {
        if let Some(overlay) = scene.selection_overlay(selection) {
            if let Some(handle) = overlay.hit_test(point, HANDLE_HIT_TOLERANCE) {
                self.state = Gesture::Handle {
                    overlay,
                    handle,
                    moved: false,
                };
                return;
            }
        }

        let target = scene.hit_test(point).map(|d| (d.id.clone(), d.origin));
        self.state = Gesture::Pressed {
            target,
            start: point,
        };
    }

    /// Pointer moved. Never produces an intent.
    pub fn pointer_move(&mut self, point: Point) {
        match &mut self.state {
            Gesture::Pressed {
                target: Some((id, origin)),
                start,
            } if (point - *start).hypot() > DRAG_THRESHOLD => {
                self.state = Gesture::Dragging {
                    id: id.clone(),
                    start: *start,
                    origin: *origin,
                };
            }
            Gesture::Handle { moved, .. } => *moved = true,
            _ => {}
        }
    }

    /// Primary button released.
    pub fn pointer_up(&mut self, point: Point) -> Option<Intent> {
        match std::mem::take(&mut self.state) {
            Gesture::Idle => None,
            Gesture::Pressed { target, .. } => Some(Intent::Click {
                id: target.map(|(id, _)| id),
            }),
            Gesture::Dragging { id, start, origin } => {
                let end = origin + (point - start);
                Some(Intent::DragEnd {
                    id,
                    x: end.x,
                    y: end.y,
                })
            }
            Gesture::Handle { moved: false, .. } => None,
            Gesture::Handle {
                overlay, handle, ..
            } => Some(Intent::TransformEnd {
                transform: overlay.drag_handle(handle, point),
                id: overlay.id,
            }),
        }
    }

    /// Double click. Only text objects respond.
    pub fn double_click(&mut self, scene: &Scene, point: Point) -> Option<Intent> {
        self.state = Gesture::Idle;
        scene
            .hit_test(point)
            .filter(|d| d.is_text())
            .map(|d| Intent::DoubleClick { id: d.id.clone() })
    }

    /// Abandon the current gesture without reporting it.
    pub fn cancel(&mut self) {
        self.state = Gesture::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::images::ImageCache;
    use designkit_core::CanvasStore;
    use designkit_core::object::{CanvasObject, ShapeKind};

    fn scene_and_store() -> (Scene, CanvasStore) {
        let mut store = CanvasStore::new();
        store.add_object(CanvasObject::shape("r", ShapeKind::Rectangle, 100.0, 100.0));
        store.add_object(CanvasObject::text("t", "Hello", 400.0, 400.0));
        (Scene::build(&store, &ImageCache::new()), store)
    }

    #[test]
    fn test_click_selects_and_empty_click_deselects() {
        let (scene, _) = scene_and_store();
        let mut gestures = GestureRecognizer::new();

        gestures.pointer_down(&scene, None, Point::new(150.0, 150.0));
        assert_eq!(
            gestures.pointer_up(Point::new(150.0, 150.0)),
            Some(Intent::Click { id: Some("r".to_string()) })
        );

        gestures.pointer_down(&scene, None, Point::new(10.0, 10.0));
        assert_eq!(gestures.pointer_up(Point::new(10.0, 10.0)), Some(Intent::Click { id: None }));
    }

    #[test]
    fn test_drag_emits_only_terminal_position() {
        let (scene, _) = scene_and_store();
        let mut gestures = GestureRecognizer::new();

        gestures.pointer_down(&scene, None, Point::new(150.0, 150.0));
        gestures.pointer_move(Point::new(160.0, 150.0));
        gestures.pointer_move(Point::new(180.0, 170.0));
        assert!(gestures.is_active());

        let intent = gestures.pointer_up(Point::new(200.0, 190.0));
        assert_eq!(
            intent,
            Some(Intent::DragEnd {
                id: "r".to_string(),
                x: 150.0,
                y: 140.0,
            })
        );
        assert!(!gestures.is_active());
    }

    #[test]
    fn test_small_jitter_is_still_a_click() {
        let (scene, _) = scene_and_store();
        let mut gestures = GestureRecognizer::new();
        gestures.pointer_down(&scene, None, Point::new(150.0, 150.0));
        gestures.pointer_move(Point::new(151.0, 151.0));
        assert!(matches!(
            gestures.pointer_up(Point::new(151.0, 151.0)),
            Some(Intent::Click { .. })
        ));
    }

    #[test]
    fn test_handle_drag_emits_transform_end() {
        let (scene, mut store) = scene_and_store();
        store.select(Some("r".to_string()));
        let mut gestures = GestureRecognizer::new();

        // Bottom-right corner of the 100x100 rectangle at (100, 100)
        gestures.pointer_down(&scene, store.selection(), Point::new(200.0, 200.0));
        gestures.pointer_move(Point::new(250.0, 230.0));
        let intent = gestures.pointer_up(Point::new(300.0, 260.0)).unwrap();

        match intent {
            Intent::TransformEnd { id, transform } => {
                assert_eq!(id, "r");
                assert_eq!((transform.width, transform.height), (200.0, 160.0));
                assert_eq!((transform.x, transform.y), (100.0, 100.0));
            }
            other => panic!("expected TransformEnd, got {other:?}"),
        }

        store.apply_intent(Intent::Click { id: None });
        assert_eq!(store.selection(), None);
    }

    #[test]
    fn test_handle_press_without_move_is_silent() {
        let (scene, mut store) = scene_and_store();
        store.select(Some("r".to_string()));
        let mut gestures = GestureRecognizer::new();
        gestures.pointer_down(&scene, store.selection(), Point::new(200.0, 200.0));
        assert_eq!(gestures.pointer_up(Point::new(200.0, 200.0)), None);
    }

    #[test]
    fn test_double_click_only_on_text() {
        let (scene, _) = scene_and_store();
        let mut gestures = GestureRecognizer::new();

        assert_eq!(
            gestures.double_click(&scene, Point::new(410.0, 410.0)),
            Some(Intent::DoubleClick { id: "t".to_string() })
        );
        assert_eq!(gestures.double_click(&scene, Point::new(150.0, 150.0)), None);
    }
}
