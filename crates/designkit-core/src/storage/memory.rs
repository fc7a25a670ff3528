//! In-memory gateway implementation.

use super::{BoxFuture, DesignDraft, DesignGateway, DesignRecord, GatewayError, GatewayResult};
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use uuid::Uuid;

/// In-memory design store for testing and offline sessions.
///
/// The bearer token doubles as the owning user's identifier.
#[derive(Default)]
pub struct MemoryGateway {
    designs: RwLock<Vec<DesignRecord>>,
    offline: AtomicBool,
}

impl MemoryGateway {
    /// Create a new empty gateway.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a gateway pre-populated with records.
    pub fn with_records(records: Vec<DesignRecord>) -> Self {
        Self {
            designs: RwLock::new(records),
            offline: AtomicBool::new(false),
        }
    }

    /// Make every subsequent call fail with [`GatewayError::Offline`].
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of stored records across all users.
    pub fn len(&self) -> usize {
        self.designs.read().map(|d| d.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check(&self, token: &str) -> GatewayResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(GatewayError::Offline);
        }
        if token.is_empty() {
            return Err(GatewayError::MissingToken);
        }
        Ok(())
    }
}

fn visible_to(record: &DesignRecord, user: &str) -> bool {
    record.user_id.as_deref() == Some(user) || record.collaborators.iter().any(|c| c == user)
}

fn lock_error(e: impl std::fmt::Display) -> GatewayError {
    GatewayError::Other(format!("Lock error: {}", e))
}

impl DesignGateway for MemoryGateway {
    fn list(&self, token: &str) -> BoxFuture<'_, GatewayResult<Vec<DesignRecord>>> {
        let user = token.to_string();
        Box::pin(async move {
            self.check(&user)?;
            let designs = self.designs.read().map_err(lock_error)?;
            Ok(designs.iter().filter(|d| visible_to(d, &user)).cloned().collect())
        })
    }

    fn create(&self, token: &str, draft: &DesignDraft) -> BoxFuture<'_, GatewayResult<DesignRecord>> {
        let user = token.to_string();
        let draft = draft.clone();
        Box::pin(async move {
            self.check(&user)?;
            let record = DesignRecord {
                id: Uuid::new_v4().to_string(),
                title: draft.title,
                user_id: Some(user),
                collaborators: Vec::new(),
                data: draft.data,
            };
            let mut designs = self.designs.write().map_err(lock_error)?;
            designs.push(record.clone());
            Ok(record)
        })
    }

    fn update(
        &self,
        token: &str,
        id: &str,
        draft: &DesignDraft,
    ) -> BoxFuture<'_, GatewayResult<DesignRecord>> {
        let user = token.to_string();
        let id = id.to_string();
        let draft = draft.clone();
        Box::pin(async move {
            self.check(&user)?;
            let mut designs = self.designs.write().map_err(lock_error)?;
            let record = designs
                .iter_mut()
                .find(|d| d.id == id && visible_to(d, &user))
                .ok_or_else(|| GatewayError::NotFound(id.clone()))?;
            record.title = draft.title;
            record.data = draft.data;
            Ok(record.clone())
        })
    }

    fn add_collaborator(
        &self,
        token: &str,
        id: &str,
        email: &str,
    ) -> BoxFuture<'_, GatewayResult<DesignRecord>> {
        let user = token.to_string();
        let id = id.to_string();
        let email = email.trim().to_string();
        Box::pin(async move {
            self.check(&user)?;
            if email.is_empty() {
                return Err(GatewayError::Remote {
                    status: 400,
                    message: "Email is required".to_string(),
                });
            }
            let mut designs = self.designs.write().map_err(lock_error)?;
            let record = designs
                .iter_mut()
                .find(|d| d.id == id && d.user_id.as_deref() == Some(user.as_str()))
                .ok_or_else(|| GatewayError::NotFound(id.clone()))?;
            if record.collaborators.contains(&email) {
                return Err(GatewayError::Remote {
                    status: 400,
                    message: "User is already a collaborator".to_string(),
                });
            }
            record.collaborators.push(email);
            Ok(record.clone())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{CanvasObject, ShapeKind};
    use pollster::block_on;

    fn draft(title: &str) -> DesignDraft {
        DesignDraft::new(title, vec![CanvasObject::shape("a", ShapeKind::Circle, 1.0, 2.0)])
    }

    #[test]
    fn test_create_and_list() {
        let gateway = MemoryGateway::new();
        let created = block_on(gateway.create("alice", &draft("One"))).unwrap();

        assert_eq!(created.user_id.as_deref(), Some("alice"));
        assert_eq!(created.data.len(), 1);

        let listed = block_on(gateway.list("alice")).unwrap();
        assert_eq!(listed, vec![created]);
        assert!(block_on(gateway.list("bob")).unwrap().is_empty());
    }

    #[test]
    fn test_update_overwrites() {
        let gateway = MemoryGateway::new();
        let created = block_on(gateway.create("alice", &draft("One"))).unwrap();

        let updated =
            block_on(gateway.update("alice", &created.id, &DesignDraft::new("Two", vec![]))).unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.title, "Two");
        assert!(updated.data.is_empty());
        assert_eq!(gateway.len(), 1);
    }

    #[test]
    fn test_update_unknown_is_not_found() {
        let gateway = MemoryGateway::new();
        let result = block_on(gateway.update("alice", "missing", &draft("x")));
        assert!(matches!(result, Err(GatewayError::NotFound(id)) if id == "missing"));
    }

    #[test]
    fn test_collaborators() {
        let gateway = MemoryGateway::new();
        let created = block_on(gateway.create("alice", &draft("One"))).unwrap();

        let shared = block_on(gateway.add_collaborator("alice", &created.id, "bob")).unwrap();
        assert_eq!(shared.collaborators, vec!["bob".to_string()]);
        assert_eq!(block_on(gateway.list("bob")).unwrap().len(), 1);

        let again = block_on(gateway.add_collaborator("alice", &created.id, "bob"));
        assert!(matches!(again, Err(GatewayError::Remote { status: 400, .. })));

        let empty = block_on(gateway.add_collaborator("alice", &created.id, "  "));
        assert!(matches!(empty, Err(GatewayError::Remote { message, .. }) if message == "Email is required"));
    }

    #[test]
    fn test_offline_and_missing_token() {
        let gateway = MemoryGateway::new();
        assert!(matches!(block_on(gateway.list("")), Err(GatewayError::MissingToken)));

        gateway.set_offline(true);
        assert!(matches!(block_on(gateway.create("alice", &draft("x"))), Err(GatewayError::Offline)));
        assert!(gateway.is_empty());
    }
}
