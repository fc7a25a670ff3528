//! Decoded image sources, keyed by their `src` string.

use crate::renderer::{RenderResult, RendererError};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use designkit_core::object::{CanvasObject, ObjectKind};
use image::RgbaImage;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone)]
enum ImageState {
    /// Waiting for the host to supply bytes.
    Loading,
    Ready(Arc<RgbaImage>),
    Failed(String),
}

/// Cache of decoded bitmaps.
///
/// `data:` URIs decode as soon as they are requested. Any other source stays
/// loading until the host fetches it and calls [`ImageCache::insert_bytes`];
/// until then the object is simply not drawn.
#[derive(Debug, Default)]
pub struct ImageCache {
    entries: HashMap<String, ImageState>,
}

impl ImageCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a source. Already known sources are left alone.
    pub fn request(&mut self, src: &str) {
        if self.entries.contains_key(src) {
            return;
        }
        let state = if src.starts_with("data:") {
            match decode_data_uri(src).and_then(|bytes| decode_bitmap(&bytes)) {
                Ok(bitmap) => ImageState::Ready(Arc::new(bitmap)),
                Err(e) => {
                    log::warn!("Failed to decode inline image: {}", e);
                    ImageState::Failed(e.to_string())
                }
            }
        } else {
            ImageState::Loading
        };
        self.entries.insert(src.to_string(), state);
    }

    /// Request every image source referenced by the objects.
    pub fn sync<'a>(&mut self, objects: impl IntoIterator<Item = &'a CanvasObject>) {
        for object in objects {
            if let ObjectKind::Image(props) = &object.kind {
                self.request(&props.src);
            }
        }
    }

    /// Supply fetched bytes for a source.
    pub fn insert_bytes(&mut self, src: &str, bytes: &[u8]) -> RenderResult<()> {
        match decode_bitmap(bytes) {
            Ok(bitmap) => {
                self.entries
                    .insert(src.to_string(), ImageState::Ready(Arc::new(bitmap)));
                Ok(())
            }
            Err(e) => {
                self.entries
                    .insert(src.to_string(), ImageState::Failed(e.to_string()));
                Err(e)
            }
        }
    }

    /// The decoded bitmap, if ready.
    pub fn get(&self, src: &str) -> Option<Arc<RgbaImage>> {
        match self.entries.get(src)? {
            ImageState::Ready(bitmap) => Some(Arc::clone(bitmap)),
            _ => None,
        }
    }

    pub fn is_loading(&self, src: &str) -> bool {
        matches!(self.entries.get(src), Some(ImageState::Loading))
    }

    /// Decode error recorded for a source.
    pub fn error(&self, src: &str) -> Option<&str> {
        match self.entries.get(src)? {
            ImageState::Failed(e) => Some(e),
            _ => None,
        }
    }

    /// Sources waiting for bytes.
    pub fn pending(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|(_, state)| matches!(state, ImageState::Loading))
            .map(|(src, _)| src.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Extract the payload of a base64 `data:` URI.
pub fn decode_data_uri(uri: &str) -> RenderResult<Vec<u8>> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| RendererError::Decode("not a data URI".to_string()))?;
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| RendererError::Decode("data URI has no payload".to_string()))?;
    if !meta.ends_with(";base64") {
        return Err(RendererError::Decode(format!(
            "unsupported data URI encoding: {}",
            meta
        )));
    }
    STANDARD
        .decode(payload.trim())
        .map_err(|e| RendererError::Decode(e.to_string()))
}

fn decode_bitmap(bytes: &[u8]) -> RenderResult<RgbaImage> {
    image::load_from_memory(bytes)
        .map(|decoded| decoded.to_rgba8())
        .map_err(|e| RendererError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::{encode_png, export_png_data_url};
    use designkit_core::object::ShapeKind;
    use image::Rgba;

    fn red_square() -> RgbaImage {
        RgbaImage::from_pixel(4, 4, Rgba([255, 0, 0, 255]))
    }

    #[test]
    fn test_data_uri_decodes_immediately() {
        let uri = export_png_data_url(&red_square()).unwrap();
        let mut cache = ImageCache::new();
        cache.request(&uri);

        let bitmap = cache.get(&uri).unwrap();
        assert_eq!(bitmap.dimensions(), (4, 4));
        assert_eq!(bitmap.get_pixel(0, 0), &Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn test_remote_source_stays_loading_until_bytes_arrive() {
        let src = "https://example.com/cat.png";
        let mut cache = ImageCache::new();
        cache.sync(&[
            CanvasObject::image("i", src, 0.0, 0.0),
            CanvasObject::shape("s", ShapeKind::Circle, 0.0, 0.0),
        ]);

        assert_eq!(cache.len(), 1);
        assert!(cache.is_loading(src));
        assert_eq!(cache.pending().collect::<Vec<_>>(), vec![src]);

        cache.insert_bytes(src, &encode_png(&red_square()).unwrap()).unwrap();
        assert!(cache.get(src).is_some());
        assert_eq!(cache.pending().count(), 0);
    }

    #[test]
    fn test_bad_payload_is_recorded() {
        let mut cache = ImageCache::new();
        cache.request("data:image/png;base64,!!!");
        assert!(cache.get("data:image/png;base64,!!!").is_none());
        assert!(cache.error("data:image/png;base64,!!!").is_some());

        assert!(cache.insert_bytes("x", b"not an image").is_err());
        assert!(cache.error("x").is_some());
    }

    #[test]
    fn test_decode_data_uri_rejects_plain_encoding() {
        assert!(decode_data_uri("data:text/plain,hello").is_err());
        assert!(decode_data_uri("https://example.com").is_err());
        assert_eq!(decode_data_uri("data:;base64,aGk=").unwrap(), b"hi");
    }
}
