//! designkit Core Library
//!
//! Platform-agnostic data structures and state for the designkit canvas editor:
//! the object model, bounded undo/redo history, the canvas state store and the
//! persistence gateway for design records.

pub mod history;
pub mod intent;
pub mod object;
pub mod storage;
pub mod store;

pub use history::{History, MAX_HISTORY_DEPTH};
pub use intent::{Intent, Transform};
pub use object::{
    CanvasObject, CropRect, ImageProps, ObjectError, ObjectId, ObjectKind, ObjectPatch, ShapeKind,
    ShapeProps, TextProps, new_object_id, parse_hex_color,
};
pub use storage::{
    AuthProvider, DesignDraft, DesignGateway, DesignRecord, GatewayError, GatewayResult,
    MemoryGateway, RestGateway, StaticToken,
};
pub use store::{
    CanvasStore, Command, DesignIdentity, ReorderDirection, RequestStatus, SnapshotPolicy,
    StoreChange,
};
