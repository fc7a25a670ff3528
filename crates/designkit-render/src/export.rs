//! PNG export of a rendered surface.

use crate::renderer::{RenderResult, RendererError};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::RgbaImage;

const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";

/// Encode RGBA pixels to PNG bytes.
pub fn encode_png(image: &RgbaImage) -> RenderResult<Vec<u8>> {
    let (width, height) = image.dimensions();
    let mut png_data = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut png_data, width, height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);

        let mut writer = encoder
            .write_header()
            .map_err(|e| RendererError::Encode(format!("header: {}", e)))?;
        writer
            .write_image_data(image.as_raw())
            .map_err(|e| RendererError::Encode(format!("data: {}", e)))?;
    }
    Ok(png_data)
}

/// Encode a rendered surface as a `data:image/png;base64,...` URL.
pub fn export_png_data_url(image: &RgbaImage) -> RenderResult<String> {
    let png_data = encode_png(image)?;
    log::info!("PNG export complete: {} bytes", png_data.len());
    Ok(format!("{}{}", PNG_DATA_URL_PREFIX, STANDARD.encode(png_data)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_png_signature() {
        let image = RgbaImage::from_pixel(3, 2, Rgba([0, 0, 255, 255]));
        let png_data = encode_png(&image).unwrap();
        assert_eq!(&png_data[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn test_data_url_decodes_back() {
        let image = RgbaImage::from_pixel(3, 2, Rgba([10, 20, 30, 255]));
        let url = export_png_data_url(&image).unwrap();
        assert!(url.starts_with("data:image/png;base64,"));

        let bytes = STANDARD.decode(&url[PNG_DATA_URL_PREFIX.len()..]).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap().to_rgba8();
        assert_eq!(decoded, image);
    }
}
