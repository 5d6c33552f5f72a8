//! Conversions from the engine's stored axis order to the consumer's.
//!
//! Worlds are stored Y-up; consumers expect Z-up, so the second and third
//! components of every position-like triple trade places.

use glam::{Quat, Vec2, Vec3, Vec4};

/// `(a, b, c) -> (a, c, b)`. Applying it twice gives back the input.
pub fn swap_yz(v: Vec3) -> Vec3 {
    Vec3::new(v.x, v.z, v.y)
}

/// Texture V runs top to bottom in the file.
pub fn flip_v(uv: Vec2) -> Vec2 {
    Vec2::new(uv.x, 1.0 - uv.y)
}

/// Byte colour channels to `0.0..=1.0`.
pub fn normalise_colour(raw: Vec4) -> Vec4 {
    raw / 255.0
}

/// Stored `(x, y, z, w)` to a quaternion in the swapped basis.
///
/// Reverse engineered from placed lights only; treat as provisional.
pub fn swap_quat(raw: Vec4) -> Quat {
    Quat::from_xyzw(raw.x, raw.z, raw.y, raw.w)
}
