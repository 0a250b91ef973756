//! Scalar math kernels shared by the animation and frame-update stages.
//!
//! All functions are pure: take values, return values, no state.

use glam::Vec3;

/// Linear interpolation between `a` and `b`.
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Hermite smoothstep of `x` between `edge0` and `edge1`.
#[inline]
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Rotate `v` around a unit `axis` by `angle` radians (Rodrigues' formula).
#[inline]
pub fn rotate_around_axis(v: Vec3, axis: Vec3, angle: f32) -> Vec3 {
    let (s, c) = angle.sin_cos();
    v * c + axis.cross(v) * s + axis * (axis.dot(v) * (1.0 - c))
}

/// Build a stable orthonormal basis (tangent, bitangent) from a unit normal.
///
/// Prefers world-up alignment so a rect light's width maps to a horizontal
/// axis when possible; falls back to other reference axes when the normal is
/// nearly parallel to the preferred helper.
pub fn orthonormal_basis(normal: Vec3) -> (Vec3, Vec3) {
    let reference = if normal.y.abs() >= 0.999 {
        Vec3::X
    } else {
        Vec3::Y
    };

    let mut tangent = reference.cross(normal);
    if tangent.length() < 1e-6 {
        tangent = Vec3::Z.cross(normal);
    }
    let tangent = if tangent.length() > 0.0 {
        tangent.normalize()
    } else {
        Vec3::X
    };

    let bitangent = normal.cross(tangent).normalize_or_zero();
    (tangent, bitangent)
}
