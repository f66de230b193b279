use glam::{Vec2, Vec4, Vec4Swizzles};

use crate::hex::{hex_coords, hex_distance, scale_uv};
use crate::noise::perlin2;
use crate::sampler::TextureSampler;
use crate::{
    remap, smoothstep, step, BORDER_BIAS, BORDER_EDGE, BORDER_SOFTNESS, CUTOFF_MARGIN,
    HEX_DENSITY, HIGHLIGHT_COLOR, NOISE_FREQUENCY,
};

/// Values that stay constant across every fragment of one frame.
///
/// `transition` is expected in `[0, 1]`; whoever produces it is responsible
/// for clamping. `time` only ever feeds a `sin`, so it may grow without bound.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameParams {
    /// Aspect-correction factor, `(1, width / height)`.
    pub aspect: Vec2,
    pub time: f32,
    pub transition: f32,
}

impl FrameParams {
    /// Parameters for a `width`×`height` viewport at time 0 and no progress.
    pub fn for_viewport(width: u32, height: u32) -> Self {
        Self {
            aspect: aspect_for(width, height),
            time: 0.0,
            transition: 0.0,
        }
    }

    /// Recomputes the aspect vector for a resized viewport and leaves
    /// everything else untouched.
    pub fn with_viewport(self, width: u32, height: u32) -> Self {
        Self {
            aspect: aspect_for(width, height),
            ..self
        }
    }

    pub fn with_time(self, time: f32) -> Self {
        Self { time, ..self }
    }

    pub fn with_transition(self, transition: f32) -> Self {
        Self { transition, ..self }
    }
}

impl Default for FrameParams {
    fn default() -> Self {
        Self {
            aspect: Vec2::ONE,
            time: 0.0,
            transition: 0.0,
        }
    }
}

fn aspect_for(width: u32, height: u32) -> Vec2 {
    Vec2::new(1.0, width.max(1) as f32 / height.max(1) as f32)
}

/// Every intermediate quantity of one fragment evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FragmentTerms {
    /// Aspect-corrected and radially zoomed coordinate.
    pub zoomed_uv: Vec2,
    /// `(offset.xy, lattice index.xy)` of the owning hex cell.
    pub hex: Vec4,
    /// Biased hex distance.
    pub hex_distance: f32,
    /// 0 inside a cell, 1 on its border.
    pub border: f32,
    /// Sharp peak towards the cell border.
    pub bulge: f32,
    /// Per-cell noise.
    pub noise: f32,
    /// Envelope that peaks at mid-transition.
    pub bounce: f32,
    /// Soft, noise-jittered wipe.
    pub cutoff: f32,
    /// Peaks on the wipe seam.
    pub merge: f32,
    /// Binary selector; 0 picks the first source, 1 the second.
    pub cut: f32,
    pub from_uv: Vec2,
    pub to_uv: Vec2,
    /// Weight applied to [`HIGHLIGHT_COLOR`].
    pub highlight: f32,
}

impl FragmentTerms {
    /// Mirrored statement for statement by `main()` in the renderer's
    /// `hexwipe.frag`.
    pub fn compute(uv: Vec2, params: &FrameParams) -> Self {
        let transition = params.transition;

        let corrected = scale_uv(uv, params.aspect);
        let radial = 1.0 + (uv - Vec2::splat(0.5)).length();
        let zoomed_uv = scale_uv(corrected, Vec2::splat(radial));

        let hex = hex_coords(zoomed_uv * HEX_DENSITY);
        let hex_distance = hex_distance(hex.xy()) + BORDER_BIAS;
        let border = smoothstep(BORDER_EDGE, BORDER_EDGE + BORDER_SOFTNESS, hex_distance);
        let bulge = (1.0 - (0.5 - hex_distance).max(0.0)).powi(10) * 1.5;
        let noise = perlin2(hex.zw() * NOISE_FREQUENCY);

        let bounce = 1.0 - smoothstep(0.0, 0.5, (transition - 0.5).abs());

        let wipe = remap(
            transition + noise * 0.08 * bounce,
            0.0,
            1.0,
            -CUTOFF_MARGIN,
            1.0 + CUTOFF_MARGIN,
        );
        let cutoff = smoothstep(uv.y - CUTOFF_MARGIN, uv.y + CUTOFF_MARGIN, wipe);
        let merge = 1.0 - smoothstep(0.0, 0.5, (cutoff - 0.5).abs());

        let cut = step(uv.y, transition + (bulge + noise) * 0.05 * bounce);

        let ripple = bulge * (uv.y * 5.0 - params.time).sin() * merge * 0.025;
        let texture_uv = zoomed_uv + Vec2::splat(ripple);
        let from_uv = scale_uv(
            texture_uv,
            Vec2::splat(1.0 + noise * 0.2 * merge + transition),
        );
        // The second source is not zoomed; only the ripple displaces it.
        let to_uv = texture_uv;

        let highlight = merge * border * bounce * 2.0;

        Self {
            zoomed_uv,
            hex,
            hex_distance,
            border,
            bulge,
            noise,
            bounce,
            cutoff,
            merge,
            cut,
            from_uv,
            to_uv,
            highlight,
        }
    }

    /// Blends the two sampled colours and adds the seam highlight.
    pub fn shade(&self, from: Vec4, to: Vec4) -> Vec4 {
        from * (1.0 - self.cut) + to * self.cut + HIGHLIGHT_COLOR * self.highlight
    }
}

/// Evaluates the full transition for one fragment at `uv` in `[0, 1]²`
/// (bottom-left origin).
pub fn evaluate_fragment<F, T>(uv: Vec2, params: &FrameParams, from: &F, to: &T) -> Vec4
where
    F: TextureSampler + ?Sized,
    T: TextureSampler + ?Sized,
{
    let terms = FragmentTerms::compute(uv, params);
    terms.shade(from.sample(terms.from_uv), to.sample(terms.to_uv))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampler::SolidColor;
    use crate::{hex_distance as raw_distance, HEX_BASIS};

    const FROM: Vec4 = Vec4::new(1.0, 0.0, 0.0, 1.0);
    const TO: Vec4 = Vec4::new(0.0, 0.0, 1.0, 1.0);

    fn grid(steps: usize) -> impl Iterator<Item = Vec2> {
        (1..steps).flat_map(move |i| {
            (1..steps).map(move |j| Vec2::new(i as f32 / steps as f32, j as f32 / steps as f32))
        })
    }

    fn border_for(raw: f32) -> f32 {
        smoothstep(BORDER_EDGE, BORDER_EDGE + BORDER_SOFTNESS, raw + BORDER_BIAS)
    }

    #[test]
    fn border_mask_thresholds() {
        assert_eq!(border_for(0.0), 0.0);
        assert_eq!(border_for(0.47), 0.0);
        assert_eq!(border_for(0.495), 1.0);
        assert_eq!(border_for(0.5), 1.0);
        let mut last = 0.0;
        for i in 0..=100 {
            let value = border_for(0.47 + i as f32 * 0.0003);
            assert!(value >= last);
            last = value;
        }
    }

    #[test]
    fn border_mask_follows_cell_geometry() {
        let params = FrameParams::default();
        for uv in grid(40) {
            let terms = FragmentTerms::compute(uv, &params);
            let raw = raw_distance(terms.hex.xy());
            assert_eq!(terms.border, border_for(raw));
            assert!((0.0..=1.0).contains(&terms.border));
        }
    }

    #[test]
    fn bounce_peaks_at_mid_transition() {
        let bounce = |t: f32| {
            FragmentTerms::compute(Vec2::splat(0.3), &FrameParams::default().with_transition(t))
                .bounce
        };
        assert_eq!(bounce(0.5), 1.0);
        assert_eq!(bounce(0.0), 0.0);
        assert_eq!(bounce(1.0), 0.0);

        let mut last = 1.0;
        for i in 0..=50 {
            let value = bounce(0.5 + i as f32 * 0.01);
            assert!(value <= last + 1e-6);
            last = value;
        }
        let mut last = 1.0;
        for i in 0..=50 {
            let value = bounce(0.5 - i as f32 * 0.01);
            assert!(value <= last + 1e-6);
            last = value;
        }
    }

    #[test]
    fn start_of_transition_shows_first_source() {
        let params = FrameParams::for_viewport(800, 600);
        let from = SolidColor(FROM);
        let to = SolidColor(TO);
        for uv in grid(50) {
            let terms = FragmentTerms::compute(uv, &params);
            assert_eq!(terms.cut, 0.0, "cut at {uv:?}");
            assert_eq!(terms.highlight, 0.0);
            assert_eq!(evaluate_fragment(uv, &params, &from, &to), FROM);
        }
    }

    #[test]
    fn first_source_is_sampled_without_distortion_at_rest() {
        let params = FrameParams::for_viewport(1, 1);
        for uv in grid(20) {
            let terms = FragmentTerms::compute(uv, &params);
            assert_eq!(terms.merge, 0.0);
            assert!((terms.from_uv - terms.zoomed_uv).length() < 1e-6);
        }
    }

    #[test]
    fn second_source_is_sampled_without_zoom_at_rest() {
        let params = FrameParams::for_viewport(1, 1).with_transition(1.0);
        for uv in [Vec2::new(0.1, 0.5)].into_iter().chain(grid(20)) {
            let terms = FragmentTerms::compute(uv, &params);
            assert_eq!(terms.merge, 0.0);
            assert!(
                (terms.to_uv - terms.zoomed_uv).length() < 1e-4,
                "to_uv {:?} drifted from {:?}",
                terms.to_uv,
                terms.zoomed_uv
            );
        }
    }

    #[test]
    fn end_of_transition_shows_second_source() {
        let params = FrameParams::for_viewport(800, 600)
            .with_transition(1.0)
            .with_time(3.7);
        let from = SolidColor(FROM);
        let to = SolidColor(TO);
        for uv in grid(50) {
            let terms = FragmentTerms::compute(uv, &params);
            assert_eq!(terms.cut, 1.0);
            assert_eq!(terms.highlight, 0.0);
            assert_eq!(evaluate_fragment(uv, &params, &from, &to), TO);
        }
    }

    #[test]
    fn seam_glows_at_mid_transition() {
        let params = FrameParams::for_viewport(1, 1).with_transition(0.5);
        let mut strongest = 0.0_f32;
        for row in 0..=40 {
            let y = 0.48 + row as f32 * 0.001;
            for col in 0..=4000 {
                let uv = Vec2::new(col as f32 / 4000.0, y);
                let terms = FragmentTerms::compute(uv, &params);
                strongest = strongest.max(terms.highlight);
            }
        }
        assert!(strongest > 1.2, "seam highlight only reached {strongest}");
        assert!(strongest <= 2.0);
    }

    #[test]
    fn highlight_is_confined_to_the_seam() {
        let params = FrameParams::for_viewport(1, 1).with_transition(0.5);
        for col in 0..200 {
            let uv = Vec2::new(col as f32 / 200.0, 0.98);
            assert!(FragmentTerms::compute(uv, &params).highlight < 0.05);
        }
    }

    #[test]
    fn resize_only_changes_aspect() {
        let square = FrameParams::for_viewport(600, 600)
            .with_transition(0.4)
            .with_time(2.0);
        let wide = square.with_viewport(1200, 600);
        assert_eq!(square.aspect, Vec2::new(1.0, 1.0));
        assert_eq!(wide.aspect, Vec2::new(1.0, 2.0));
        assert_eq!(wide.time, square.time);
        assert_eq!(wide.transition, square.transition);

        // The lattice and distance field are untouched: the same zoomed
        // coordinate resolves to the same cell regardless of viewport.
        let zoomed = Vec2::new(0.37, 0.61);
        let expected = hex_coords(zoomed * HEX_DENSITY);
        assert_eq!(hex_coords(zoomed * 20.0), expected);
        assert_eq!(HEX_BASIS, Vec2::new(1.0, crate::SQRT_3));
    }

    #[test]
    fn aspect_scales_vertical_axis_about_center() {
        let params = FrameParams::for_viewport(1200, 600);
        let at_center = FragmentTerms::compute(Vec2::splat(0.5), &params);
        assert_eq!(at_center.zoomed_uv, Vec2::splat(0.5));
        let above = FragmentTerms::compute(Vec2::new(0.5, 0.75), &params);
        // 0.25 above centre, doubled by aspect and zoomed by 1.25.
        assert!((above.zoomed_uv.y - (0.5 + 0.25 * 2.0 * 1.25)).abs() < 1e-5);
    }
}
