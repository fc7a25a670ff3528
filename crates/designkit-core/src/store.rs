//! Canvas state store: the single owner of the editing session's state.
//!
//! Every mutation goes through [`CanvasStore::dispatch`] (or the method of the
//! same name), which snapshots the collection into [`History`] before applying
//! the change and then notifies subscribers. UI surfaces and the render
//! adapter only ever read from the store.

use crate::history::History;
use crate::intent::Intent;
use crate::object::{CanvasObject, ObjectId, ObjectPatch};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction for a one-step z-order change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReorderDirection {
    /// One step towards the front (later in paint order).
    Forward,
    /// One step towards the back (earlier in paint order).
    Backward,
}

/// When mutations that might not change anything push a history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotPolicy {
    /// Snapshot before every update/remove/reorder, even when the target
    /// identifier is absent.
    #[default]
    Always,
    /// Snapshot only when the operation changes the collection.
    OnChange,
}

/// Which persisted design, if any, this session represents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesignIdentity {
    pub id: Option<String>,
    pub title: Option<String>,
}

impl DesignIdentity {
    /// Whether saving should update an existing record rather than create one.
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }
}

/// Progress of the most recent persistence request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestStatus {
    pub loading: bool,
    pub error: Option<String>,
}

/// What part of the store a notification refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreChange {
    Objects,
    Selection,
    Design,
    Status,
}

/// A store mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Command {
    AddObject { object: CanvasObject },
    UpdateObject { id: ObjectId, changes: ObjectPatch },
    RemoveObject { id: ObjectId },
    Select { id: Option<ObjectId> },
    Reorder { id: ObjectId, direction: ReorderDirection },
    Undo,
    Redo,
    LoadDesign { objects: Vec<CanvasObject> },
    NewDesign,
    SetCurrentDesign { id: Option<String>, title: Option<String> },
    BeginTextEdit { id: ObjectId },
    CommitTextEdit { text: String },
    CancelTextEdit,
}

type Listener = Box<dyn FnMut(StoreChange) + Send>;

/// Single source of truth for the canvas.
pub struct CanvasStore {
    /// Objects in paint order (back to front).
    objects: Vec<CanvasObject>,
    /// Selected object identifier. Not validated; may dangle.
    selection: Option<ObjectId>,
    /// Text object currently being edited in place.
    editing_text: Option<ObjectId>,
    history: History,
    policy: SnapshotPolicy,
    design: DesignIdentity,
    status: RequestStatus,
    /// Bumped on every change; lets readers cache derived views.
    revision: u64,
    listeners: Vec<Listener>,
}

impl Default for CanvasStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CanvasStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CanvasStore")
            .field("objects", &self.objects.len())
            .field("selection", &self.selection)
            .field("editing_text", &self.editing_text)
            .field("undo_depth", &self.history.undo_depth())
            .field("redo_depth", &self.history.redo_depth())
            .field("policy", &self.policy)
            .field("design", &self.design)
            .field("status", &self.status)
            .field("revision", &self.revision)
            .finish()
    }
}

impl CanvasStore {
    /// Create an empty store with default history depth and policy.
    pub fn new() -> Self {
        Self::with_options(History::new(), SnapshotPolicy::default())
    }

    /// Create an empty store with the given history and snapshot policy.
    pub fn with_options(history: History, policy: SnapshotPolicy) -> Self {
        Self {
            objects: Vec::new(),
            selection: None,
            editing_text: None,
            history,
            policy,
            design: DesignIdentity::default(),
            status: RequestStatus::default(),
            revision: 0,
            listeners: Vec::new(),
        }
    }

    /// Register a change listener.
    pub fn subscribe(&mut self, listener: impl FnMut(StoreChange) + Send + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Apply a command.
    pub fn dispatch(&mut self, command: Command) {
        match command {
            Command::AddObject { object } => self.add_object(object),
            Command::UpdateObject { id, changes } => self.update_object(&id, &changes),
            Command::RemoveObject { id } => self.remove_object(&id),
            Command::Select { id } => self.select(id),
            Command::Reorder { id, direction } => self.reorder(&id, direction),
            Command::Undo => self.undo(),
            Command::Redo => self.redo(),
            Command::LoadDesign { objects } => self.load_design(objects),
            Command::NewDesign => self.new_design(),
            Command::SetCurrentDesign { id, title } => self.set_current_design(id, title),
            Command::BeginTextEdit { id } => self.begin_text_edit(&id),
            Command::CommitTextEdit { text } => self.commit_text_edit(text),
            Command::CancelTextEdit => self.cancel_text_edit(),
        }
    }

    /// Apply a gesture reported by the render adapter.
    pub fn apply_intent(&mut self, intent: Intent) {
        self.dispatch(intent.into_command());
    }

    // --- Mutations ---

    /// Append an object on top of the z-order.
    /// The identifier is the caller's responsibility; duplicates are not checked.
    pub fn add_object(&mut self, object: CanvasObject) {
        self.history.snapshot(&self.objects);
        log::debug!("Adding {} object {}", object.kind.type_name(), object.id);
        self.objects.push(object);
        self.notify(StoreChange::Objects);
    }

    /// Shallow-merge changes into the object with the given identifier.
    pub fn update_object(&mut self, id: &str, changes: &ObjectPatch) {
        let index = self.index_of(id);
        match self.policy {
            SnapshotPolicy::Always => {
                self.history.snapshot(&self.objects);
                let changed = index.is_some_and(|i| self.objects[i].apply_patch(changes));
                if changed {
                    self.notify(StoreChange::Objects);
                }
            }
            SnapshotPolicy::OnChange => {
                let Some(i) = index else { return };
                let mut updated = self.objects[i].clone();
                if updated.apply_patch(changes) {
                    self.history.snapshot(&self.objects);
                    self.objects[i] = updated;
                    self.notify(StoreChange::Objects);
                }
            }
        }
        if index.is_none() {
            log::debug!("Update for unknown object {id} ignored");
        }
    }

    /// Remove an object, clearing the selection if it pointed at it.
    pub fn remove_object(&mut self, id: &str) {
        let found = self.index_of(id).is_some();
        if found || self.policy == SnapshotPolicy::Always {
            self.history.snapshot(&self.objects);
        }
        if found {
            self.objects.retain(|o| o.id != id);
            self.notify(StoreChange::Objects);
        }
        if self.editing_text.as_deref() == Some(id) {
            self.editing_text = None;
        }
        if self.selection.as_deref() == Some(id) {
            self.selection = None;
            self.notify(StoreChange::Selection);
        }
    }

    /// Set (or clear) the selection. The identifier is not validated.
    pub fn select(&mut self, id: Option<ObjectId>) {
        if self.selection != id {
            self.selection = id;
            self.notify(StoreChange::Selection);
        }
    }

    /// Swap an object with its neighbour in the given direction.
    pub fn reorder(&mut self, id: &str, direction: ReorderDirection) {
        let neighbour = self.index_of(id).and_then(|i| match direction {
            ReorderDirection::Forward if i + 1 < self.objects.len() => Some((i, i + 1)),
            ReorderDirection::Backward if i > 0 => Some((i, i - 1)),
            _ => None,
        });
        if neighbour.is_some() || self.policy == SnapshotPolicy::Always {
            self.history.snapshot(&self.objects);
        }
        if let Some((a, b)) = neighbour {
            self.objects.swap(a, b);
            self.notify(StoreChange::Objects);
        }
    }

    /// Restore the previous collection. Clears the selection when something was restored.
    pub fn undo(&mut self) {
        if let Some(previous) = self.history.undo(&self.objects) {
            self.restore(previous);
        }
    }

    /// Re-apply the last undone collection. Clears the selection when something was restored.
    pub fn redo(&mut self) {
        if let Some(next) = self.history.redo(&self.objects) {
            self.restore(next);
        }
    }

    /// Replace the collection with a loaded design. Starts a fresh history baseline.
    pub fn load_design(&mut self, objects: Vec<CanvasObject>) {
        log::debug!("Loading design with {} objects", objects.len());
        self.objects = objects;
        self.history.clear();
        self.editing_text = None;
        self.selection = None;
        self.notify(StoreChange::Objects);
        self.notify(StoreChange::Selection);
    }

    /// Start a blank design, forgetting which record was open.
    pub fn new_design(&mut self) {
        self.objects.clear();
        self.history.clear();
        self.editing_text = None;
        self.selection = None;
        self.design = DesignIdentity::default();
        self.notify(StoreChange::Objects);
        self.notify(StoreChange::Selection);
        self.notify(StoreChange::Design);
    }

    /// Record which persisted design this session represents.
    pub fn set_current_design(&mut self, id: Option<String>, title: Option<String>) {
        self.design = DesignIdentity { id, title };
        self.notify(StoreChange::Design);
    }

    /// Enter in-place editing for a text object. Ignored for other objects.
    pub fn begin_text_edit(&mut self, id: &str) {
        if self.object(id).is_some_and(CanvasObject::is_text) {
            self.editing_text = Some(id.to_string());
            self.notify(StoreChange::Selection);
        }
    }

    /// Finish in-place editing, writing the new content through `update_object`.
    pub fn commit_text_edit(&mut self, text: String) {
        if let Some(id) = self.editing_text.take() {
            self.update_object(&id, &ObjectPatch::text(text));
            self.notify(StoreChange::Selection);
        }
    }

    /// Leave in-place editing without changing the object.
    pub fn cancel_text_edit(&mut self) {
        if self.editing_text.take().is_some() {
            self.notify(StoreChange::Selection);
        }
    }

    /// Mark a persistence request as in flight.
    pub fn begin_request(&mut self) {
        self.status.loading = true;
        self.notify(StoreChange::Status);
    }

    /// Record the outcome of a persistence request.
    /// Never touches the collection or history.
    pub fn finish_request(&mut self, result: Result<(), String>) {
        self.status.loading = false;
        self.status.error = result.err();
        self.notify(StoreChange::Status);
    }

    // --- Reads ---

    /// Objects in paint order (back to front).
    pub fn objects(&self) -> &[CanvasObject] {
        &self.objects
    }

    pub fn object(&self, id: &str) -> Option<&CanvasObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    /// The raw selected identifier, which may no longer exist.
    pub fn selection(&self) -> Option<&str> {
        self.selection.as_deref()
    }

    /// The selected object, or None if nothing (or a removed object) is selected.
    pub fn selected_object(&self) -> Option<&CanvasObject> {
        self.selection.as_deref().and_then(|id| self.object(id))
    }

    pub fn editing_text(&self) -> Option<&str> {
        self.editing_text.as_deref()
    }

    pub fn current_design(&self) -> &DesignIdentity {
        &self.design
    }

    pub fn status(&self) -> &RequestStatus {
        &self.status
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn snapshot_policy(&self) -> SnapshotPolicy {
        self.policy
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    fn index_of(&self, id: &str) -> Option<usize> {
        self.objects.iter().position(|o| o.id == id)
    }

    fn restore(&mut self, objects: Vec<CanvasObject>) {
        self.objects = objects;
        self.editing_text = None;
        self.selection = None;
        self.notify(StoreChange::Objects);
        self.notify(StoreChange::Selection);
    }

    fn notify(&mut self, change: StoreChange) {
        self.revision += 1;
        for listener in &mut self.listeners {
            listener(change);
        }
    }
}
