//! Headless editor session.
//!
//! Wires the canvas store to a design gateway, an image cache and a raster
//! renderer, and exposes the operations of the editor's toolbar, property
//! panel, save bar and design sidebar. User-facing outcomes are queued as
//! [`Notification`]s for the host to show.

use crate::config::AppConfig;
use designkit_core::{
    AuthProvider, CanvasObject, CanvasStore, DesignDraft, DesignGateway, DesignRecord,
    GatewayError, History, ObjectKind, ObjectPatch, ReorderDirection, ShapeKind, ShapeProps,
    TextProps, new_object_id,
};
use designkit_render::{
    GestureRecognizer, ImageCache, RasterRenderer, RenderContext, Renderer, RendererError, Scene,
    encode_png, export_png_data_url,
};
use image::RgbaImage;
use kurbo::{Point, Size};
use peniko::Color;
use std::collections::VecDeque;
use thiserror::Error;

pub const SAVE_SUCCESS: &str = "Design saved successfully!";
pub const SAVE_FAILED: &str = "Failed to save design.";

/// Editor errors.
#[derive(Debug, Error)]
pub enum EditorError {
    #[error("Canvas is empty!")]
    EmptyCanvas,
    #[error("Please enter a name for your design")]
    MissingTitle,
    #[error("User not authenticated!")]
    NotAuthenticated,
    #[error("Save the design before sharing it")]
    NotSaved,
    #[error("Unknown design: {0}")]
    UnknownDesign(String),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error(transparent)]
    Render(#[from] RendererError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Error,
}

/// A message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
        }
    }
}

/// An editing session bound to a design gateway.
pub struct Editor<G: DesignGateway> {
    store: CanvasStore,
    images: ImageCache,
    gateway: G,
    auth: Box<dyn AuthProvider>,
    renderer: RasterRenderer,
    gestures: GestureRecognizer,
    /// Designs from the last successful listing, for the sidebar.
    designs: Vec<DesignRecord>,
    notifications: VecDeque<Notification>,
    export_size: Size,
    background: Color,
}

impl<G: DesignGateway> Editor<G> {
    pub fn new(gateway: G, auth: impl AuthProvider + 'static, config: &AppConfig) -> Self {
        let history = History::with_capacity(config.history_depth);
        let mut renderer = RasterRenderer::new(config.export_width, config.export_height);
        if let Some(path) = &config.font_path {
            match RasterRenderer::load_font(path) {
                Ok(font) => renderer = renderer.with_font(font),
                Err(e) => log::warn!("Text will not be rendered: {}", e),
            }
        }

        Self {
            store: CanvasStore::with_options(history, config.snapshot_policy),
            images: ImageCache::new(),
            gateway,
            auth: Box::new(auth),
            renderer,
            gestures: GestureRecognizer::new(),
            designs: Vec::new(),
            notifications: VecDeque::new(),
            export_size: Size::new(config.export_width as f64, config.export_height as f64),
            background: config.background(),
        }
    }

    pub fn store(&self) -> &CanvasStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut CanvasStore {
        &mut self.store
    }

    pub fn images(&self) -> &ImageCache {
        &self.images
    }

    pub fn images_mut(&mut self) -> &mut ImageCache {
        &mut self.images
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Designs from the last listing.
    pub fn designs(&self) -> &[DesignRecord] {
        &self.designs
    }

    /// Drain queued notifications, oldest first.
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        self.notifications.drain(..).collect()
    }

    fn notify(&mut self, notification: Notification) {
        self.notifications.push_back(notification);
    }

    // --- Toolbar ---

    /// Add a 100x100 shape at (100, 100) with white fill and a 2px black stroke.
    pub fn add_shape(&mut self, shape_type: ShapeKind) -> String {
        let props = ShapeProps {
            shape_type,
            fill_color: Some("#ffffff".to_string()),
            stroke_color: Some("#000000".to_string()),
            stroke_width: Some(2.0),
        };
        let object = CanvasObject::new(new_object_id(), 100.0, 100.0, ObjectKind::Shape(props))
            .with_size(100.0, 100.0);
        self.add(object)
    }

    /// Add the sample text at (150, 150).
    pub fn add_text(&mut self) -> String {
        let props = TextProps {
            text: Some("Sample Text".to_string()),
            font_size: Some(20.0),
            color: Some("#000000".to_string()),
            ..TextProps::default()
        };
        let object = CanvasObject::new(new_object_id(), 150.0, 150.0, ObjectKind::Text(props));
        self.add(object)
    }

    /// Add an image from a data URI or URL at (100, 100).
    pub fn add_image(&mut self, src: &str) -> String {
        self.images.request(src);
        let object = CanvasObject::image(new_object_id(), src, 100.0, 100.0).with_size(200.0, 200.0);
        self.add(object)
    }

    fn add(&mut self, object: CanvasObject) -> String {
        let id = object.id.clone();
        self.store.add_object(object);
        id
    }

    pub fn delete_selected(&mut self) {
        if let Some(id) = self.store.selection().map(str::to_string) {
            self.store.remove_object(&id);
        }
    }

    pub fn bring_forward(&mut self) {
        self.reorder_selected(ReorderDirection::Forward);
    }

    pub fn send_backward(&mut self) {
        self.reorder_selected(ReorderDirection::Backward);
    }

    fn reorder_selected(&mut self, direction: ReorderDirection) {
        if let Some(id) = self.store.selection().map(str::to_string) {
            self.store.reorder(&id, direction);
        }
    }

    pub fn undo(&mut self) {
        self.store.undo();
    }

    pub fn redo(&mut self) {
        self.store.redo();
    }

    // --- Property panel ---

    /// Apply property edits to the selected object. Ignored when the
    /// selection is empty or no longer resolves.
    pub fn edit_selected(&mut self, patch: &ObjectPatch) {
        if let Some(id) = self.store.selected_object().map(|o| o.id.clone()) {
            if let Some(src) = &patch.src {
                self.images.request(src);
            }
            self.store.update_object(&id, patch);
        }
    }

    // --- Canvas interaction ---

    /// Resolve the current collection for painting and hit testing.
    pub fn scene(&mut self) -> Scene {
        self.images.sync(self.store.objects());
        Scene::build(&self.store, &self.images)
    }

    pub fn pointer_down(&mut self, point: Point) {
        let scene = self.scene();
        self.gestures
            .pointer_down(&scene, self.store.selection(), point);
    }

    pub fn pointer_move(&mut self, point: Point) {
        self.gestures.pointer_move(point);
    }

    pub fn pointer_up(&mut self, point: Point) {
        if let Some(intent) = self.gestures.pointer_up(point) {
            self.store.apply_intent(intent);
        }
    }

    pub fn double_click(&mut self, point: Point) {
        let scene = self.scene();
        if let Some(intent) = self.gestures.double_click(&scene, point) {
            self.store.apply_intent(intent);
        }
    }

    // --- Export ---

    /// Paint the canvas at the export size.
    pub fn render(&mut self, show_overlay: bool) -> Result<&RgbaImage, EditorError> {
        let scene = self.scene();
        let ctx = RenderContext::new(&scene, self.export_size)
            .with_background(self.background)
            .with_selection(self.store.selection())
            .with_overlay(show_overlay);
        self.renderer.build_scene(&ctx)?;
        Ok(self.renderer.image())
    }

    /// Export the canvas as a `data:image/png;base64,...` URL.
    pub fn export_png(&mut self) -> Result<String, EditorError> {
        let image = self.render(false)?;
        Ok(export_png_data_url(image)?)
    }

    /// Export the canvas as PNG bytes.
    pub fn export_png_bytes(&mut self) -> Result<Vec<u8>, EditorError> {
        let image = self.render(false)?;
        Ok(encode_png(image)?)
    }

    // --- Persistence ---

    fn token(&self) -> Result<String, EditorError> {
        self.auth.token().ok_or(EditorError::NotAuthenticated)
    }

    /// Report a failed precondition to the user before handing it back.
    fn reject(&mut self, action: &str, error: EditorError) -> EditorError {
        log::warn!("{} rejected: {}", action, error);
        self.notify(Notification::error(error.to_string()));
        error
    }

    /// Save the canvas: create a record on first save, update it afterwards.
    ///
    /// An already saved design keeps its recorded title; `title` only names
    /// new designs. Validation failures make no request.
    pub async fn save(&mut self, title: &str) -> Result<DesignRecord, EditorError> {
        let design = self.store.current_design().clone();
        let title = design
            .title
            .filter(|_| design.id.is_some())
            .unwrap_or_else(|| title.to_string());

        let validated = if self.store.is_empty() {
            Err(EditorError::EmptyCanvas)
        } else if title.trim().is_empty() {
            Err(EditorError::MissingTitle)
        } else {
            self.token()
        };
        let token = match validated {
            Ok(token) => token,
            Err(e) => return Err(self.reject("Save", e)),
        };

        let draft = DesignDraft::new(title.clone(), self.store.objects().to_vec());
        self.store.begin_request();
        let result = match &design.id {
            Some(id) => self.gateway.update(&token, id, &draft).await,
            None => self.gateway.create(&token, &draft).await,
        };

        match result {
            Ok(record) => {
                log::info!("Saved design {} ({} objects)", record.id, record.data.len());
                self.store.finish_request(Ok(()));
                self.store
                    .set_current_design(Some(record.id.clone()), Some(title));
                self.remember(record.clone());
                self.notify(Notification::info(SAVE_SUCCESS));
                Ok(record)
            }
            Err(e) => {
                log::error!("Failed to save design: {}", e);
                self.store.finish_request(Err(e.to_string()));
                self.notify(Notification::error(SAVE_FAILED));
                Err(e.into())
            }
        }
    }

    /// Refresh the sidebar listing.
    pub async fn refresh_designs(&mut self) -> Result<&[DesignRecord], EditorError> {
        let token = match self.token() {
            Ok(token) => token,
            Err(e) => return Err(self.reject("Refresh", e)),
        };
        self.store.begin_request();
        match self.gateway.list(&token).await {
            Ok(designs) => {
                log::info!("Fetched {} designs", designs.len());
                self.store.finish_request(Ok(()));
                self.designs = designs;
                Ok(&self.designs)
            }
            Err(e) => {
                log::error!("Failed to fetch designs: {}", e);
                self.store.finish_request(Err(e.to_string()));
                self.notify(Notification::error(e.to_string()));
                Err(e.into())
            }
        }
    }

    /// Open a design from the last listing, replacing the canvas.
    pub fn open_design(&mut self, id: &str) -> Result<(), EditorError> {
        let record = self
            .designs
            .iter()
            .find(|d| d.id == id)
            .cloned()
            .ok_or_else(|| EditorError::UnknownDesign(id.to_string()))?;

        self.store.load_design(record.data);
        self.store
            .set_current_design(Some(record.id), Some(record.title));
        self.images.sync(self.store.objects());
        Ok(())
    }

    /// Start a blank, unsaved design.
    pub fn new_design(&mut self) {
        self.store.new_design();
    }

    /// Share the current design with another user.
    pub async fn add_collaborator(&mut self, email: &str) -> Result<DesignRecord, EditorError> {
        let validated = match self.store.current_design().id.clone() {
            Some(id) => self.token().map(|token| (id, token)),
            None => Err(EditorError::NotSaved),
        };
        let (id, token) = match validated {
            Ok(pair) => pair,
            Err(e) => return Err(self.reject("Sharing", e)),
        };

        self.store.begin_request();
        match self.gateway.add_collaborator(&token, &id, email).await {
            Ok(record) => {
                log::info!("Added collaborator to design {}", record.id);
                self.store.finish_request(Ok(()));
                self.remember(record.clone());
                self.notify(Notification::info(format!("Added {} as a collaborator", email.trim())));
                Ok(record)
            }
            Err(e) => {
                log::error!("Failed to add collaborator: {}", e);
                self.store.finish_request(Err(e.to_string()));
                self.notify(Notification::error(e.to_string()));
                Err(e.into())
            }
        }
    }

    /// Keep the sidebar listing in step with a record the gateway returned.
    fn remember(&mut self, record: DesignRecord) {
        match self.designs.iter_mut().find(|d| d.id == record.id) {
            Some(existing) => *existing = record,
            None => self.designs.push(record),
        }
    }
}
