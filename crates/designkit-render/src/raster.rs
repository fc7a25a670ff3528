//! CPU renderer painting a scene into an RGBA bitmap.
//!
//! Each primitive is painted by walking the pixels of its canvas-space
//! bounding box and mapping every pixel centre back into the primitive's local
//! space. Coverage is binary (no anti-aliasing) except for glyphs.

use crate::drawable::{
    Bitmap, Drawable, FLATTEN_TOLERANCE, PathPrimitive, Primitive, StrokeStyle, TextRun,
    flatten_segments, point_to_polyline_dist,
};
use crate::handles::SelectionOverlay;
use crate::renderer::{RenderContext, RenderResult, Renderer, RendererError};
use image::{Rgba, RgbaImage};
use kurbo::{Affine, BezPath, Point, Rect, Shape};
use peniko::Color;
use rusttype::{Font, Scale};
use std::path::Path;

/// Software renderer targeting an [`RgbaImage`].
pub struct RasterRenderer {
    target: RgbaImage,
    /// Font for text runs. Without one, text is not drawn.
    font: Option<Font<'static>>,
}

impl RasterRenderer {
    /// Create a renderer with a surface of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            target: RgbaImage::new(width.max(1), height.max(1)),
            font: None,
        }
    }

    /// Use a TrueType font for text runs.
    pub fn with_font(mut self, font: Font<'static>) -> Self {
        self.font = Some(font);
        self
    }

    /// Load a TrueType/OpenType font file.
    pub fn load_font(path: &Path) -> RenderResult<Font<'static>> {
        let bytes = std::fs::read(path)
            .map_err(|e| RendererError::Font(format!("{}: {}", path.display(), e)))?;
        Font::try_from_vec(bytes)
            .ok_or_else(|| RendererError::Font(format!("{}: not a valid font", path.display())))
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// The painted surface.
    pub fn image(&self) -> &RgbaImage {
        &self.target
    }

    pub fn into_image(self) -> RgbaImage {
        self.target
    }

    fn resize(&mut self, width: u32, height: u32) {
        let (width, height) = (width.max(1), height.max(1));
        if self.target.dimensions() != (width, height) {
            self.target = RgbaImage::new(width, height);
        }
    }

    fn clear(&mut self, color: Color) {
        let fill = Rgba(rgba8(color));
        for pixel in self.target.pixels_mut() {
            *pixel = fill;
        }
    }

    fn paint_drawable(&mut self, drawable: &Drawable) {
        let transform = drawable.transform();
        for part in &drawable.parts {
            match part {
                Primitive::Path(path) => self.paint_path(path, transform),
                Primitive::Bitmap(bitmap) => self.paint_bitmap(bitmap, transform),
                Primitive::Text(run) => self.paint_text(run, transform),
            }
        }
    }

    fn paint_path(&mut self, primitive: &PathPrimitive, transform: Affine) {
        let Some(span) = pixel_span(self.target.dimensions(), transform.transform_rect_bbox(primitive.bounds())) else {
            return;
        };
        let inverse = transform.inverse();
        let mut flat = BezPath::new();
        kurbo::flatten(primitive.path.iter(), FLATTEN_TOLERANCE, |el| flat.push(el));
        let segments = flatten_segments(&flat);
        let fill = primitive.fill.map(rgba8);
        let stroke = primitive.stroke.map(|s: StrokeStyle| (rgba8(s.color), s.width / 2.0));

        for (px, py) in span {
            let local = inverse * pixel_center(px, py);
            let pixel = self.target.get_pixel_mut(px, py);
            if let Some(color) = fill {
                if flat.contains(local) {
                    blend(pixel, color, 1.0);
                }
            }
            if let Some((color, half_width)) = stroke {
                if point_to_polyline_dist(local, &segments) <= half_width {
                    blend(pixel, color, 1.0);
                }
            }
        }
    }

    fn paint_bitmap(&mut self, bitmap: &Bitmap, transform: Affine) {
        let local_bounds = Rect::from_origin_size(Point::ZERO, bitmap.size);
        let Some(span) = pixel_span(self.target.dimensions(), transform.transform_rect_bbox(local_bounds)) else {
            return;
        };
        let inverse = transform.inverse();
        let (iw, ih) = bitmap.image.dimensions();
        let source = bitmap
            .crop
            .unwrap_or_else(|| Rect::new(0.0, 0.0, iw as f64, ih as f64));

        for (px, py) in span {
            let local = inverse * pixel_center(px, py);
            if !local_bounds.contains(local) {
                continue;
            }
            let sx = source.x0 + local.x / bitmap.size.width * source.width();
            let sy = source.y0 + local.y / bitmap.size.height * source.height();
            let sx = (sx.floor().max(0.0) as u32).min(iw.saturating_sub(1));
            let sy = (sy.floor().max(0.0) as u32).min(ih.saturating_sub(1));
            let src = bitmap.image.get_pixel(sx, sy).0;
            blend(self.target.get_pixel_mut(px, py), src, bitmap.opacity);
        }
    }

    fn paint_text(&mut self, run: &TextRun, transform: Affine) {
        let Self { target, font } = self;
        let Some(font) = font.as_ref() else {
            log::debug!("No font configured, skipping text run");
            return;
        };
        let scale = Scale::uniform(run.font_size as f32);
        let ascent = font.v_metrics(scale).ascent;
        let color = rgba8(run.color);
        let (width, height) = target.dimensions();

        for (line_index, line) in run.content.split('\n').enumerate() {
            let baseline = ascent + line_index as f32 * run.font_size as f32;
            for glyph in font.layout(line, scale, rusttype::point(0.0, baseline)) {
                let Some(bb) = glyph.pixel_bounding_box() else {
                    continue;
                };
                glyph.draw(|gx, gy, coverage| {
                    let local = Point::new(
                        (bb.min.x + gx as i32) as f64 + 0.5,
                        (bb.min.y + gy as i32) as f64 + 0.5,
                    );
                    let world = transform * local;
                    if world.x < 0.0 || world.y < 0.0 {
                        return;
                    }
                    let (x, y) = (world.x as u32, world.y as u32);
                    if x < width && y < height {
                        blend(target.get_pixel_mut(x, y), color, coverage as f64);
                    }
                });
            }
        }
    }

    fn paint_overlay(&mut self, overlay: &SelectionOverlay, color: Color) {
        let frame = PathPrimitive {
            path: overlay.outline(),
            fill: None,
            stroke: Some(StrokeStyle { color, width: 1.0 }),
        };
        self.paint_path(&frame, Affine::IDENTITY);

        for handle in &overlay.handles {
            let square = PathPrimitive {
                path: handle.outline().to_path(0.1),
                fill: Some(Color::WHITE),
                stroke: Some(StrokeStyle { color, width: 1.0 }),
            };
            self.paint_path(&square, Affine::IDENTITY);
        }
    }
}

impl Renderer for RasterRenderer {
    fn build_scene(&mut self, ctx: &RenderContext) -> RenderResult<()> {
        let width = ctx.viewport_size.width.round();
        let height = ctx.viewport_size.height.round();
        if !(width.is_finite() && height.is_finite()) || width < 1.0 || height < 1.0 {
            return Err(RendererError::RenderFailed(format!(
                "invalid viewport {}x{}",
                ctx.viewport_size.width, ctx.viewport_size.height
            )));
        }
        self.resize(width as u32, height as u32);
        self.clear(self.background_color(ctx));

        for drawable in ctx.scene.drawables() {
            self.paint_drawable(drawable);
        }

        if ctx.show_overlay {
            if let Some(overlay) = ctx.scene.selection_overlay(ctx.selection) {
                self.paint_overlay(&overlay, ctx.selection_color);
            }
        }
        Ok(())
    }
}

fn rgba8(color: Color) -> [u8; 4] {
    let c = color.to_rgba8();
    [c.r, c.g, c.b, c.a]
}

fn pixel_center(x: u32, y: u32) -> Point {
    Point::new(x as f64 + 0.5, y as f64 + 0.5)
}

/// Pixels of `target` covered by `bounds`, row by row.
fn pixel_span((width, height): (u32, u32), bounds: Rect) -> Option<impl Iterator<Item = (u32, u32)>> {
    let x0 = bounds.x0.floor().max(0.0) as u32;
    let y0 = bounds.y0.floor().max(0.0) as u32;
    let x1 = (bounds.x1.ceil().max(0.0) as u32).min(width);
    let y1 = (bounds.y1.ceil().max(0.0) as u32).min(height);
    if x0 >= x1 || y0 >= y1 {
        return None;
    }
    Some((y0..y1).flat_map(move |y| (x0..x1).map(move |x| (x, y))))
}

/// Source-over blend of a straight-alpha color with extra coverage.
fn blend(pixel: &mut Rgba<u8>, color: [u8; 4], coverage: f64) {
    let src_a = color[3] as f64 / 255.0 * coverage.clamp(0.0, 1.0);
    if src_a <= 0.0 {
        return;
    }
    let dst_a = pixel.0[3] as f64 / 255.0;
    let out_a = src_a + dst_a * (1.0 - src_a);
    for i in 0..3 {
        let src = color[i] as f64;
        let dst = pixel.0[i] as f64;
        let out = (src * src_a + dst * dst_a * (1.0 - src_a)) / out_a;
        pixel.0[i] = out.round().clamp(0.0, 255.0) as u8;
    }
    pixel.0[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
}
