//! Terminal gestures reported by the render adapter.
//!
//! The renderer never mutates the store; it reports what the user finished
//! doing and the store turns that into a [`Command`].

use crate::object::{ObjectId, ObjectPatch};
use crate::store::Command;
use serde::{Deserialize, Serialize};

/// Final geometry of a resize/rotate gesture, with scale already folded into size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Rotation in degrees.
    pub rotation: f64,
}

/// A user interaction on the drawing surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "intent", rename_all = "snake_case")]
pub enum Intent {
    /// Click on an object, or on empty canvas (`None`).
    Click { id: Option<ObjectId> },
    /// End of a move.
    DragEnd { id: ObjectId, x: f64, y: f64 },
    /// End of a resize or rotate.
    TransformEnd { id: ObjectId, transform: Transform },
    /// Request to edit a text object in place.
    DoubleClick { id: ObjectId },
    /// In-place text editing finished with new content.
    TextCommit { text: String },
}

impl Intent {
    /// The store command this gesture maps to.
    pub fn into_command(self) -> Command {
        match self {
            Intent::Click { id } => Command::Select { id },
            Intent::DragEnd { id, x, y } => Command::UpdateObject {
                id,
                changes: ObjectPatch::position(x, y),
            },
            Intent::TransformEnd { id, transform: t } => Command::UpdateObject {
                id,
                changes: ObjectPatch::transform(t.x, t.y, t.width, t.height, t.rotation),
            },
            Intent::DoubleClick { id } => Command::BeginTextEdit { id },
            Intent::TextCommit { text } => Command::CommitTextEdit { text },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{CanvasObject, ShapeKind};
    use crate::store::CanvasStore;

    #[test]
    fn test_drag_end_moves_object() {
        let mut store = CanvasStore::new();
        store.add_object(CanvasObject::shape("a", ShapeKind::Rectangle, 0.0, 0.0));

        store.apply_intent(Intent::DragEnd {
            id: "a".to_string(),
            x: 40.0,
            y: 50.0,
        });

        assert_eq!(store.object("a").unwrap().position(), kurbo::Point::new(40.0, 50.0));
        assert_eq!(store.history().undo_depth(), 2);
    }

    #[test]
    fn test_transform_end_writes_size_and_rotation() {
        let mut store = CanvasStore::new();
        store.add_object(CanvasObject::shape("a", ShapeKind::Circle, 0.0, 0.0));

        store.apply_intent(Intent::TransformEnd {
            id: "a".to_string(),
            transform: Transform {
                x: 5.0,
                y: 6.0,
                width: 200.0,
                height: 80.0,
                rotation: 30.0,
            },
        });

        let obj = store.object("a").unwrap();
        assert_eq!(obj.width, Some(200.0));
        assert_eq!(obj.height, Some(80.0));
        assert_eq!(obj.rotation, Some(30.0));
    }

    #[test]
    fn test_click_on_empty_canvas_deselects() {
        let mut store = CanvasStore::new();
        store.apply_intent(Intent::Click {
            id: Some("a".to_string()),
        });
        assert_eq!(store.selection(), Some("a"));

        store.apply_intent(Intent::Click { id: None });
        assert_eq!(store.selection(), None);
    }

    #[test]
    fn test_double_click_then_commit() {
        let mut store = CanvasStore::new();
        store.add_object(CanvasObject::text("t", "Old", 0.0, 0.0));

        store.apply_intent(Intent::DoubleClick { id: "t".to_string() });
        store.apply_intent(Intent::TextCommit {
            text: "New".to_string(),
        });

        let text = store.object("t").unwrap().as_text().unwrap();
        assert_eq!(text.text.as_deref(), Some("New"));
    }
}
