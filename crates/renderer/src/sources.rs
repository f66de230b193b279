use std::path::Path;

use anyhow::{Context, Result};
use image::{Rgba, RgbaImage};

/// Colour used when a source image cannot be read.
pub const PLACEHOLDER_TEXEL: [u8; 4] = [255, 255, 255, 255];

/// Decodes an image file into RGBA8, top row first.
pub fn decode_source(path: &Path) -> Result<RgbaImage> {
    let image = image::open(path)
        .with_context(|| format!("failed to decode image at {}", path.display()))?;
    Ok(image.to_rgba8())
}

/// Loads a transition source. A missing or undecodable file is not fatal: it
/// is logged and replaced by a 1×1 placeholder so the transition still runs.
pub fn load_source_or_placeholder(role: &str, path: &Path) -> RgbaImage {
    match decode_source(path) {
        Ok(image) => {
            tracing::debug!(
                role,
                path = %path.display(),
                width = image.width(),
                height = image.height(),
                "loaded source image"
            );
            image
        }
        Err(error) => {
            tracing::warn!(
                role,
                path = %path.display(),
                error = %format!("{error:#}"),
                "failed to load source image; using placeholder"
            );
            placeholder_image()
        }
    }
}

pub fn placeholder_image() -> RgbaImage {
    RgbaImage::from_pixel(1, 1, Rgba(PLACEHOLDER_TEXEL))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_becomes_placeholder() {
        let image = load_source_or_placeholder("from", Path::new("/definitely/not/here.png"));
        assert_eq!(image.dimensions(), (1, 1));
        assert_eq!(image.get_pixel(0, 0).0, PLACEHOLDER_TEXEL);
    }

    #[test]
    fn decode_reports_the_path() {
        let err = decode_source(Path::new("/definitely/not/here.png")).unwrap_err();
        assert!(format!("{err:#}").contains("/definitely/not/here.png"));
    }
}
