//! CPU reference of the hexagonal-grid transition shader.
//!
//! Every function here has a twin in `renderer/src/shaders/hexwipe.frag`; the
//! Rust side exists so the per-fragment math can be evaluated, inspected, and
//! tested without a GPU. The pipeline composes as:
//!
//! ```text
//!   uv ──▶ scale_uv (aspect) ──▶ scale_uv (radial zoom) ──▶ × HEX_DENSITY
//!                                                              │
//!                      hex_coords ◀── round_hex ◀──────────────┘
//!                          │
//!          ┌───────────────┼────────────────────┐
//!          ▼               ▼                    ▼
//!     hex_distance    perlin2(index)      bounce weight (transition)
//!          │               │                    │
//!          └──── border / bulge / cutoff / merge / hard cut ──▶ blend + highlight
//! ```
//!
//! Nothing is cached between fragments or frames; [`FrameParams`] carries the
//! only values that change from frame to frame.

pub mod fragment;
pub mod hex;
pub mod noise;
pub mod raster;
pub mod sampler;

pub use fragment::{evaluate_fragment, FragmentTerms, FrameParams};
pub use hex::{hex_candidates, hex_coords, hex_distance, round_hex, scale_uv, HexCell};
pub use noise::perlin2;
pub use raster::render_still;
pub use sampler::{ImageSampler, SolidColor, TextureSampler};

use glam::{Vec2, Vec4};

/// √3 as written into the shader source.
pub const SQRT_3: f32 = 1.732_050_8;

/// Skewed-axial lattice basis `(1, √3)`.
pub const HEX_BASIS: Vec2 = Vec2::new(1.0, SQRT_3);

/// Hex cells across the unit square.
pub const HEX_DENSITY: f32 = 20.0;

/// Added to the raw hex distance before border classification.
pub const BORDER_BIAS: f32 = 0.03;

/// Lower edge of the border smooth-threshold.
pub const BORDER_EDGE: f32 = 0.51;

/// Width of the border smooth-threshold.
pub const BORDER_SOFTNESS: f32 = 0.01;

/// Overscan applied to the wipe line so it fully clears both ends.
pub const CUTOFF_MARGIN: f32 = 0.2;

/// Lattice index scale fed to the per-cell noise.
pub const NOISE_FREQUENCY: f32 = 0.6;

/// Warm seam colour added on top of the blend.
pub const HIGHLIGHT_COLOR: Vec4 = Vec4::new(1.0, 0.4, 0.0, 0.0);

/// Per-frame time increment used by the default frame clock.
pub const DEFAULT_TIME_STEP: f32 = 0.01;

/// GLSL `smoothstep`, including its behaviour for reversed edges.
#[inline]
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// GLSL `step(edge, x)`: 1 when `x >= edge`.
#[inline]
pub fn step(edge: f32, x: f32) -> f32 {
    if x >= edge {
        1.0
    } else {
        0.0
    }
}

/// Linear remap without clamping.
#[inline]
pub fn remap(value: f32, in_low: f32, in_high: f32, out_low: f32, out_high: f32) -> f32 {
    out_low + (value - in_low) * (out_high - out_low) / (in_high - in_low)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smoothstep_hits_its_edges() {
        assert_eq!(smoothstep(0.0, 0.5, -1.0), 0.0);
        assert_eq!(smoothstep(0.0, 0.5, 0.5), 1.0);
        assert!((smoothstep(0.0, 1.0, 0.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn step_is_inclusive_at_the_edge() {
        assert_eq!(step(0.0, 0.0), 1.0);
        assert_eq!(step(0.0, -f32::EPSILON), 0.0);
    }

    #[test]
    fn remap_extends_past_the_output_range() {
        assert!((remap(0.0, 0.0, 1.0, -0.2, 1.2) + 0.2).abs() < 1e-6);
        assert!((remap(1.0, 0.0, 1.0, -0.2, 1.2) - 1.2).abs() < 1e-6);
        assert!((remap(0.5, 0.0, 1.0, -0.2, 1.2) - 0.5).abs() < 1e-6);
    }
}
