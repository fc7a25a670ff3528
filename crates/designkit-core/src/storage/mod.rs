//! Persistence gateway for design records.

mod memory;
mod rest;

pub use memory::MemoryGateway;
pub use rest::RestGateway;

use crate::object::CanvasObject;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Gateway errors.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("User not authenticated!")]
    MissingToken,
    #[error("Design not found: {0}")]
    NotFound(String),
    #[error("{message}")]
    Remote { status: u16, message: String },
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Gateway is offline")]
    Offline,
    #[error("Gateway error: {0}")]
    Other(String),
}

/// Result type for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Boxed future for async operations (compatible with WASM).
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// A persisted, named canvas collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignRecord {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default)]
    pub collaborators: Vec<String>,
    #[serde(default)]
    pub data: Vec<CanvasObject>,
}

/// Body of a create or update request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignDraft {
    pub title: String,
    pub data: Vec<CanvasObject>,
}

impl DesignDraft {
    pub fn new(title: impl Into<String>, data: Vec<CanvasObject>) -> Self {
        Self {
            title: title.into(),
            data,
        }
    }
}

/// Remote store of design records.
///
/// Every call takes the caller's bearer token. Implementations do not
/// retry; failures are reported to the caller once.
#[cfg(not(target_arch = "wasm32"))]
pub trait DesignGateway: Send + Sync {
    /// List the designs visible to the caller.
    fn list(&self, token: &str) -> BoxFuture<'_, GatewayResult<Vec<DesignRecord>>>;

    /// Create a new design.
    fn create(&self, token: &str, draft: &DesignDraft) -> BoxFuture<'_, GatewayResult<DesignRecord>>;

    /// Overwrite an existing design.
    fn update(
        &self,
        token: &str,
        id: &str,
        draft: &DesignDraft,
    ) -> BoxFuture<'_, GatewayResult<DesignRecord>>;

    /// Grant another user access to a design.
    fn add_collaborator(
        &self,
        token: &str,
        id: &str,
        email: &str,
    ) -> BoxFuture<'_, GatewayResult<DesignRecord>>;
}

/// Remote store of design records (WASM version without Send + Sync).
#[cfg(target_arch = "wasm32")]
pub trait DesignGateway {
    fn list(&self, token: &str) -> BoxFuture<'_, GatewayResult<Vec<DesignRecord>>>;

    fn create(&self, token: &str, draft: &DesignDraft) -> BoxFuture<'_, GatewayResult<DesignRecord>>;

    fn update(
        &self,
        token: &str,
        id: &str,
        draft: &DesignDraft,
    ) -> BoxFuture<'_, GatewayResult<DesignRecord>>;

    fn add_collaborator(
        &self,
        token: &str,
        id: &str,
        email: &str,
    ) -> BoxFuture<'_, GatewayResult<DesignRecord>>;
}

/// Source of bearer tokens for gateway calls.
pub trait AuthProvider {
    /// The current token, or None when the user is signed out.
    fn token(&self) -> Option<String>;
}

/// A fixed token, typically read from configuration.
#[derive(Debug, Clone, Default)]
pub struct StaticToken(pub Option<String>);

impl AuthProvider for StaticToken {
    fn token(&self) -> Option<String> {
        self.0.clone().filter(|t| !t.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::ShapeKind;

    #[test]
    fn test_record_wire_format() {
        let record: DesignRecord = serde_json::from_str(
            r#"{
                "_id": "d1",
                "title": "Poster",
                "userId": "user_1",
                "data": [{"id": "a", "type": "shape", "shapeType": "rectangle", "x": 100, "y": 100}]
            }"#,
        )
        .unwrap();

        assert_eq!(record.id, "d1");
        assert_eq!(record.user_id.as_deref(), Some("user_1"));
        assert!(record.collaborators.is_empty());
        assert_eq!(record.data[0].as_shape().unwrap().shape_type, ShapeKind::Rectangle);

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["_id"], "d1");
        assert!(value.get("id").is_none());
    }

    #[test]
    fn test_static_token_treats_empty_as_missing() {
        assert_eq!(StaticToken(Some(String::new())).token(), None);
        assert_eq!(StaticToken(None).token(), None);
        assert_eq!(StaticToken(Some("t".into())).token().as_deref(), Some("t"));
    }
}
