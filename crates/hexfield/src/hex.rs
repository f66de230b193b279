use glam::{Vec2, Vec4, Vec4Swizzles};

use crate::{step, HEX_BASIS};

/// Scales `uv` about `(0.5, 0.5)`.
///
/// Zero or negative factors collapse or mirror the coordinate; nothing is
/// rejected.
#[inline]
pub fn scale_uv(uv: Vec2, factor: Vec2) -> Vec2 {
    (uv - Vec2::splat(0.5)) * factor + Vec2::splat(0.5)
}

/// Rounds every component to the nearest integer with `floor(x + 0.5)`.
///
/// Halves always round up (towards +∞), never to even.
#[inline]
pub fn round_hex(skewed: Vec4) -> Vec4 {
    (skewed + Vec4::splat(0.5)).floor()
}

/// One candidate hex centre for a point: the offset from that centre and the
/// lattice index that identifies it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HexCell {
    pub offset: Vec2,
    pub index: Vec2,
}

impl HexCell {
    fn packed(self) -> Vec4 {
        Vec4::new(self.offset.x, self.offset.y, self.index.x, self.index.y)
    }
}

/// Both candidate centres of the two interleaved rectangular sublattices.
///
/// The first lives on the integer lattice scaled by [`HEX_BASIS`]; the second
/// is the same lattice shifted by half a cell on both axes.
pub fn hex_candidates(uv: Vec2) -> [HexCell; 2] {
    let basis = Vec4::new(HEX_BASIS.x, HEX_BASIS.y, HEX_BASIS.x, HEX_BASIS.y);
    let shifted = uv - Vec2::new(0.5, 1.0);
    let center = round_hex(Vec4::new(uv.x, uv.y, shifted.x, shifted.y) / basis);

    let first = center.xy();
    let second = center.zw();
    [
        HexCell {
            offset: uv - first * HEX_BASIS,
            index: first,
        },
        HexCell {
            offset: uv - (second + Vec2::splat(0.5)) * HEX_BASIS,
            index: second,
        },
    ]
}

/// Resolves `uv` (in lattice units) to `(offset.xy, index.xy)` of the nearest
/// hex centre.
///
/// Selection is arithmetic rather than a branch: the squared-distance
/// difference feeds `step`, and the resulting 0/1 weight mixes the two packed
/// candidates. Ties go to the second candidate.
pub fn hex_coords(uv: Vec2) -> Vec4 {
    let [first, second] = hex_candidates(uv);
    let diff = first.offset.length_squared() - second.offset.length_squared();
    let weight = step(0.0, diff);
    // GLSL mix form, exact for a weight of 0 or 1.
    first.packed() * (1.0 - weight) + second.packed() * weight
}

/// Hexagonal distance from a cell centre: 0 at the centre, 0.5 along the
/// whole cell boundary of a unit-spaced lattice.
#[inline]
pub fn hex_distance(offset: Vec2) -> f32 {
    let p = offset.abs();
    p.dot(HEX_BASIS * 0.5).max(p.x)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_points() -> impl Iterator<Item = Vec2> {
        (0..64).flat_map(|i| {
            (0..64).map(move |j| Vec2::new(i as f32 * 0.731 - 11.3, j as f32 * 0.419 - 7.9))
        })
    }

    #[test]
    fn scale_round_trips_with_reciprocal_factor() {
        let factors = [
            Vec2::new(2.0, 2.0),
            Vec2::new(0.25, 3.0),
            Vec2::new(-1.5, 0.8),
        ];
        for factor in factors {
            for uv in [Vec2::ZERO, Vec2::new(0.3, 0.9), Vec2::new(1.0, 0.1)] {
                let back = scale_uv(scale_uv(uv, factor), Vec2::ONE / factor);
                assert!((back - uv).length() < 1e-5, "{uv:?} via {factor:?} -> {back:?}");
            }
        }
    }

    #[test]
    fn zero_factor_collapses_to_center() {
        assert_eq!(scale_uv(Vec2::new(0.9, 0.1), Vec2::ZERO), Vec2::splat(0.5));
    }

    #[test]
    fn round_hex_rounds_halves_up() {
        let rounded = round_hex(Vec4::new(0.5, -0.5, 1.5, 2.5));
        assert_eq!(rounded, Vec4::new(1.0, 0.0, 2.0, 3.0));
    }

    #[test]
    fn candidate_indices_are_lattice_points() {
        for uv in sample_points() {
            for cell in hex_candidates(uv) {
                let index = Vec4::new(cell.index.x, cell.index.y, 0.0, 0.0);
                assert_eq!(round_hex(index), index, "candidate for {uv:?} is off-lattice");
            }
            let coords = hex_coords(uv);
            let snapped = round_hex(Vec4::new(coords.z, coords.w, 0.0, 0.0));
            assert_eq!(snapped.xy(), coords.zw());
        }
    }

    #[test]
    fn hex_coords_picks_the_nearer_candidate() {
        for uv in sample_points() {
            let [first, second] = hex_candidates(uv);
            let coords = hex_coords(uv);
            let chosen = coords.xy().length_squared();
            assert!(chosen <= first.offset.length_squared());
            assert!(chosen <= second.offset.length_squared());
        }
    }

    #[test]
    fn equidistant_points_resolve_to_second_candidate() {
        // Midway between the first-lattice centre (0, 0) and the second-lattice
        // centre (0.5, √3/2).
        let uv = HEX_BASIS * 0.25;
        let [first, second] = hex_candidates(uv);
        assert_eq!(
            first.offset.length_squared(),
            second.offset.length_squared()
        );
        let coords = hex_coords(uv);
        assert_eq!(coords.zw(), second.index);
    }

    #[test]
    fn hex_distance_is_zero_at_center_and_half_at_edges() {
        assert_eq!(hex_distance(Vec2::ZERO), 0.0);
        assert!((hex_distance(Vec2::new(0.5, 0.0)) - 0.5).abs() < 1e-6);
        assert!((hex_distance(Vec2::new(0.25, SQRT_3_OVER_4)) - 0.5).abs() < 1e-6);
    }

    const SQRT_3_OVER_4: f32 = crate::SQRT_3 / 4.0;

    #[test]
    fn hex_distance_is_even_and_non_negative() {
        for v in sample_points() {
            let d = hex_distance(v);
            assert!(d >= 0.0);
            assert_eq!(d, hex_distance(-v));
        }
    }

    #[test]
    fn resolved_offsets_stay_inside_the_cell() {
        for uv in sample_points() {
            let coords = hex_coords(uv);
            assert!(hex_distance(coords.xy()) <= 0.5 + 1e-4);
        }
    }
}
