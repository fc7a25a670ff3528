//! designkit Render Library
//!
//! Render adapter for the designkit canvas. Resolves store objects into
//! drawables, hit tests them, recognizes pointer gestures as intents and
//! paints scenes with a CPU rasterizer.

pub mod drawable;
pub mod export;
pub mod gesture;
pub mod handles;
pub mod images;
mod raster;
mod renderer;
pub mod scene;

pub use drawable::{Drawable, Primitive, resolve};
pub use export::{encode_png, export_png_data_url};
pub use gesture::GestureRecognizer;
pub use handles::{Handle, HandleKind, SelectionOverlay};
pub use images::ImageCache;
pub use raster::RasterRenderer;
pub use renderer::{RenderContext, RenderResult, Renderer, RendererError};
pub use scene::Scene;
