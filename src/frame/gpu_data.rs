//! GPU-facing output records and the cached view-matrix basis.
//!
//! The output structs are the only artifact the renderer sees. Layouts are
//! bit-exact contracts: each record is a whole number of vec4s so the host
//! can upload the arrays directly as texture rows or a storage buffer.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use static_assertions::const_assert_eq;

use crate::lights::light_data::LodLevel;

/// Packed point light record: two vec4s per light.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct PointLightGpu {
    /// xyz = view-space position, w = radius.
    pub position_radius: [f32; 4],
    /// rgb = color * intensity, w = decay*100 + visible*10 + lod.
    pub color_decay_visible: [f32; 4],
}

/// Packed spot light record: four vec4s per light.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct SpotLightGpu {
    /// xyz = view-space position, w = radius.
    pub position_radius: [f32; 4],
    /// rgb = color, w = intensity.
    pub color_intensity: [f32; 4],
    /// xyz = view-space unit direction.
    pub direction: [f32; 4],
    /// x = cos(angle), y = cos(angle - penumbra), z = decay,
    /// w = visible*10 + lod.
    pub angle_params: [f32; 4],
}

/// Packed rect light record: five vec4s per light.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct RectLightGpu {
    /// xyz = view-space position, w = radius.
    pub position_radius: [f32; 4],
    /// rgb = color, w = intensity.
    pub color_intensity: [f32; 4],
    /// x = width, y = height, z = decay, w = visible*10 + lod.
    pub size_params: [f32; 4],
    /// xyz = view-space unit normal.
    pub normal: [f32; 4],
    /// xyz = view-space unit tangent.
    pub tangent: [f32; 4],
}

const_assert_eq!(std::mem::size_of::<PointLightGpu>(), 32);
const_assert_eq!(std::mem::size_of::<SpotLightGpu>(), 64);
const_assert_eq!(std::mem::size_of::<RectLightGpu>(), 80);

/// Rotation columns and translation of the camera's view matrix, cached once
/// per update so the per-light transform touches twelve scalars.
#[derive(Debug, Clone, Copy)]
pub struct ViewBasis {
    pub col_x: Vec3,
    pub col_y: Vec3,
    pub col_z: Vec3,
    pub translation: Vec3,
}

impl ViewBasis {
    pub fn from_matrix(view: &Mat4) -> Self {
        Self {
            col_x: view.x_axis.truncate(),
            col_y: view.y_axis.truncate(),
            col_z: view.z_axis.truncate(),
            translation: view.w_axis.truncate(),
        }
    }

    /// Affine transform of a world-space point into view space.
    #[inline]
    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        self.col_x * p.x + self.col_y * p.y + self.col_z * p.z + self.translation
    }

    /// Rotate a world-space direction into view space and renormalize.
    #[inline]
    pub fn transform_dir(&self, d: Vec3) -> Vec3 {
        (self.col_x * d.x + self.col_y * d.y + self.col_z * d.z).normalize_or_zero()
    }
}

/// Single packed float carrying decay, visibility and LOD for point lights.
#[inline]
pub fn pack_point_params(decay: f32, visible: bool, lod: LodLevel) -> f32 {
    decay * 100.0 + if visible { 10.0 } else { 0.0 } + lod.as_f32()
}

/// Visibility and LOD packing for spot/rect lights (decay travels unpacked).
#[inline]
pub fn pack_visible_lod(visible: bool, lod: LodLevel) -> f32 {
    (if visible { 10.0 } else { 0.0 }) + lod.as_f32()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packed_params_formula() {
        assert_eq!(pack_point_params(2.0, true, LodLevel::Full), 213.0);
        assert_eq!(pack_point_params(2.0, false, LodLevel::Full), 203.0);
        assert_eq!(pack_point_params(0.0, true, LodLevel::Skip), 10.0);
        assert_eq!(pack_visible_lod(true, LodLevel::Medium), 12.0);
        assert_eq!(pack_visible_lod(false, LodLevel::Simple), 1.0);
    }

    #[test]
    fn basis_matches_matrix_transform() {
        let view = Mat4::from_translation(Vec3::new(1.0, -2.0, 3.0))
            * Mat4::from_rotation_y(0.7)
            * Mat4::from_rotation_x(-0.3);
        let basis = ViewBasis::from_matrix(&view);
        let p = Vec3::new(4.0, 5.0, 6.0);
        let expected = view.transform_point3(p);
        assert!((basis.transform_point(p) - expected).length() < 1e-4);
    }

    #[test]
    fn transformed_directions_are_unit_length() {
        let view = Mat4::from_rotation_y(1.2);
        let basis = ViewBasis::from_matrix(&view);
        let d = basis.transform_dir(Vec3::new(3.0, 0.0, 0.0));
        assert!((d.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn zero_direction_stays_zero() {
        let basis = ViewBasis::from_matrix(&Mat4::IDENTITY);
        assert_eq!(basis.transform_dir(Vec3::ZERO), Vec3::ZERO);
    }
}
