use glam::{Vec2, Vec4};
use image::{Rgba, RgbaImage};

use crate::fragment::{evaluate_fragment, FrameParams};
use crate::sampler::TextureSampler;

/// Rasterises one frame on the CPU.
///
/// Pixels are sampled at their centres. Image row 0 is the top of the picture,
/// so the row index is flipped into the shader's bottom-left UV space.
pub fn render_still<F, T>(
    width: u32,
    height: u32,
    params: &FrameParams,
    from: &F,
    to: &T,
) -> RgbaImage
where
    F: TextureSampler + ?Sized,
    T: TextureSampler + ?Sized,
{
    let inv = Vec2::new(1.0 / width.max(1) as f32, 1.0 / height.max(1) as f32);
    RgbaImage::from_fn(width, height, |col, row| {
        let uv = Vec2::new(
            (col as f32 + 0.5) * inv.x,
            1.0 - (row as f32 + 0.5) * inv.y,
        );
        to_rgba8(evaluate_fragment(uv, params, from, to))
    })
}

fn to_rgba8(color: Vec4) -> Rgba<u8> {
    let c = (color.clamp(Vec4::ZERO, Vec4::ONE) * 255.0).round();
    Rgba([c.x as u8, c.y as u8, c.z as u8, c.w as u8])
}
