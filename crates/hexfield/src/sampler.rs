use glam::{Vec2, Vec4};
use image::imageops::flip_vertical;
use image::RgbaImage;

/// Source of colour for one of the two transition inputs.
pub trait TextureSampler {
    /// Samples at `uv` with a bottom-left origin. Coordinates outside
    /// `[0, 1]²` are the sampler's business; nothing upstream clamps them.
    fn sample(&self, uv: Vec2) -> Vec4;
}

/// A sampler that ignores its coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolidColor(pub Vec4);

impl TextureSampler for SolidColor {
    fn sample(&self, _uv: Vec2) -> Vec4 {
        self.0
    }
}

/// Bilinear, clamp-to-edge sampling of a decoded RGBA image.
///
/// The image is stored bottom row first, the same orientation the GPU upload
/// uses, so `uv.y = 0` addresses the bottom of the picture.
#[derive(Debug, Clone)]
pub struct ImageSampler {
    texels: RgbaImage,
}

impl ImageSampler {
    pub fn new(image: &RgbaImage) -> Self {
        Self {
            texels: flip_vertical(image),
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.texels.dimensions()
    }

    fn texel(&self, x: i64, y: i64) -> Vec4 {
        let (width, height) = self.texels.dimensions();
        let x = x.clamp(0, i64::from(width) - 1) as u32;
        let y = y.clamp(0, i64::from(height) - 1) as u32;
        let [r, g, b, a] = self.texels.get_pixel(x, y).0;
        Vec4::new(r as f32, g as f32, b as f32, a as f32) / 255.0
    }
}

impl TextureSampler for ImageSampler {
    fn sample(&self, uv: Vec2) -> Vec4 {
        let (width, height) = self.texels.dimensions();
        if width == 0 || height == 0 {
            return Vec4::ZERO;
        }
        let uv = uv.clamp(Vec2::ZERO, Vec2::ONE);
        let x = uv.x * width as f32 - 0.5;
        let y = uv.y * height as f32 - 0.5;
        let x0 = x.floor();
        let y0 = y.floor();
        let tx = x - x0;
        let ty = y - y0;
        let (x0, y0) = (x0 as i64, y0 as i64);

        let bottom = self.texel(x0, y0).lerp(self.texel(x0 + 1, y0), tx);
        let top = self.texel(x0, y0 + 1).lerp(self.texel(x0 + 1, y0 + 1), tx);
        bottom.lerp(top, ty)
    }
}
