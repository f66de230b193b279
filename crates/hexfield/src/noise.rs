//! Two-dimensional gradient noise compatible with the MaterialX `noise2d` node.
//!
//! Integer cells are hashed with Bob Jenkins' `final` mix, pick one of eight
//! gradients, and the four corner contributions are blended with a quintic
//! fade. The output is roughly in `[-1, 1]` and exactly 0 on integer points.
//! The GLSL port in `hexwipe.frag` uses the same constants and operation order.

use glam::Vec2;

const HASH_SEED: u32 = 0xdead_beef_u32.wrapping_add(2 << 2).wrapping_add(13);
const GRADIENT_SCALE: f32 = 0.6616;

#[inline]
fn rotl32(x: u32, k: u32) -> u32 {
    x.rotate_left(k)
}

fn hash_cell(x: i32, y: i32) -> u32 {
    let mut a = HASH_SEED.wrapping_add(x as u32);
    let mut b = HASH_SEED.wrapping_add(y as u32);
    let mut c = HASH_SEED;

    c ^= b;
    c = c.wrapping_sub(rotl32(b, 14));
    a ^= c;
    a = a.wrapping_sub(rotl32(c, 11));
    b ^= a;
    b = b.wrapping_sub(rotl32(a, 25));
    c ^= b;
    c = c.wrapping_sub(rotl32(b, 16));
    a ^= c;
    a = a.wrapping_sub(rotl32(c, 4));
    b ^= a;
    b = b.wrapping_sub(rotl32(a, 14));
    c ^= b;
    c = c.wrapping_sub(rotl32(b, 24));
    c
}

fn gradient(hash: u32, x: f32, y: f32) -> f32 {
    let h = hash & 7;
    let (mut u, mut v) = if h < 4 { (x, 2.0 * y) } else { (y, 2.0 * x) };
    if h & 1 != 0 {
        u = -u;
    }
    if h & 2 != 0 {
        v = -v;
    }
    u + v
}

#[inline]
fn fade(t: f32) -> f32 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

fn bilerp(v0: f32, v1: f32, v2: f32, v3: f32, s: f32, t: f32) -> f32 {
    let s1 = 1.0 - s;
    let t1 = 1.0 - t;
    t1 * (v0 * s1 + v1 * s) + t * (v2 * s1 + v3 * s)
}

/// Samples the noise field at `p`.
pub fn perlin2(p: Vec2) -> f32 {
    let cell = p.floor();
    let x = cell.x as i32;
    let y = cell.y as i32;
    let fx = p.x - x as f32;
    let fy = p.y - y as f32;
    let u = fade(fx);
    let v = fade(fy);

    let result = bilerp(
        gradient(hash_cell(x, y), fx, fy),
        gradient(hash_cell(x.wrapping_add(1), y), fx - 1.0, fy),
        gradient(hash_cell(x, y.wrapping_add(1)), fx, fy - 1.0),
        gradient(hash_cell(x.wrapping_add(1), y.wrapping_add(1)), fx - 1.0, fy - 1.0),
        u,
        v,
    );
    GRADIENT_SCALE * result
}
