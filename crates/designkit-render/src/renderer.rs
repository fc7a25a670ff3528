//! Renderer trait abstraction.

use crate::scene::Scene;
use kurbo::Size;
use peniko::Color;
use thiserror::Error;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("Render failed: {0}")]
    RenderFailed(String),
    #[error("Image decode failed: {0}")]
    Decode(String),
    #[error("PNG encode failed: {0}")]
    Encode(String),
    #[error("Font error: {0}")]
    Font(String),
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RendererError>;

/// Context for a single render frame.
pub struct RenderContext<'a> {
    /// The resolved scene to render.
    pub scene: &'a Scene,
    /// Output size in pixels.
    pub viewport_size: Size,
    /// Background color.
    pub background_color: Color,
    /// Selection highlight color.
    pub selection_color: Color,
    /// Selected object, if any. A dangling id draws no overlay.
    pub selection: Option<&'a str>,
    /// Whether to draw the selection frame and handles.
    pub show_overlay: bool,
}

impl<'a> RenderContext<'a> {
    /// Create a new render context.
    pub fn new(scene: &'a Scene, viewport_size: Size) -> Self {
        Self {
            scene,
            viewport_size,
            background_color: Color::WHITE,
            selection_color: Color::from_rgba8(59, 130, 246, 255), // Blue
            selection: None,
            show_overlay: true,
        }
    }

    /// Set the background color.
    pub fn with_background(mut self, color: Color) -> Self {
        self.background_color = color;
        self
    }

    /// Set the selected object.
    pub fn with_selection(mut self, selection: Option<&'a str>) -> Self {
        self.selection = selection;
        self
    }

    /// Toggle the selection overlay (off for exports).
    pub fn with_overlay(mut self, show: bool) -> Self {
        self.show_overlay = show;
        self
    }
}

/// Trait for rendering backends.
pub trait Renderer: Send + Sync {
    /// Paint a frame.
    ///
    /// This method is called once per frame and should prepare all drawing commands.
    fn build_scene(&mut self, ctx: &RenderContext) -> RenderResult<()>;

    /// Get the background color (for clearing).
    fn background_color(&self, ctx: &RenderContext) -> Color {
        ctx.background_color
    }
}
