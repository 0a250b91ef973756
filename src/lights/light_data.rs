//! Light record data - plain structs, no update logic.
//!
//! Transformations happen in `store_operations` (mutation), the animation
//! module (per-frame transients) and the frame module (view transform, LOD,
//! packing).

use glam::{Vec3, Vec4};
use serde::{Deserialize, Serialize};

use crate::animation::AnimationParams;
use crate::constants::{defaults, lod};
use crate::spatial::MortonKeyed;

bitflags::bitflags! {
    /// Host-side change tracking, cleared after each successful pack.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct DirtyFlags: u8 {
        const POSITION = 1;
        const COLOR    = 2;
        const PARAMS   = 4;
    }
}

/// Discrete quality tier assigned from view-space distance each frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
#[repr(u8)]
pub enum LodLevel {
    Skip = 0,
    Simple = 1,
    Medium = 2,
    #[default]
    Full = 3,
}

impl LodLevel {
    /// Tier from distance relative to (bias-scaled) radius. Exact threshold
    /// values resolve to the nearer tier: the comparisons are strict.
    #[inline]
    pub fn from_relative_distance(relative: f32) -> Self {
        if relative > lod::SKIP_DISTANCE {
            LodLevel::Skip
        } else if relative > lod::SIMPLE_DISTANCE {
            LodLevel::Simple
        } else if relative > lod::MEDIUM_DISTANCE {
            LodLevel::Medium
        } else {
            LodLevel::Full
        }
    }

    #[inline]
    pub fn from_index(index: u8) -> Self {
        match index {
            0 => LodLevel::Skip,
            1 => LodLevel::Simple,
            2 => LodLevel::Medium,
            _ => LodLevel::Full,
        }
    }

    #[inline]
    pub fn as_f32(self) -> f32 {
        self as u8 as f32
    }
}

/// The three light kinds the engine manages, stored in independent arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum LightKind {
    Point = 0,
    Spot = 1,
    Rect = 2,
}

impl LightKind {
    pub fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(LightKind::Point),
            1 => Some(LightKind::Spot),
            2 => Some(LightKind::Rect),
            _ => None,
        }
    }
}

/// Point light record.
///
/// `base_world_pos` (xyz = authored position, w = authored radius) is the
/// source of the Morton key and is never perturbed by animation; `world_pos`
/// and `view_pos` are recomputed every frame.
#[derive(Debug, Clone, Copy)]
pub struct PointLight {
    pub base_world_pos: Vec4,
    pub anim_offset: Vec4,
    pub world_pos: Vec4,
    /// rgb = color, w = current intensity.
    pub color: Vec4,
    /// xyz = view position, w = current radius.
    pub view_pos: Vec4,
    /// rgb = authored color, w = authored intensity.
    pub base_color: Vec4,
    pub anim: AnimationParams,
    pub decay: f32,
    pub morton: u32,
    pub dirty: DirtyFlags,
    pub visible: bool,
    pub lod_level: LodLevel,
    pub casts_shadow: bool,
    pub shadow_intensity: f32,
}

/// Spot light record. Direction vectors are unit length in world space;
/// `base_dir` anchors the rotation effect.
#[derive(Debug, Clone, Copy)]
pub struct SpotLight {
    pub base_world_pos: Vec4,
    pub anim_offset: Vec4,
    pub world_pos: Vec4,
    pub color: Vec4,
    pub direction: Vec4,
    pub view_pos: Vec4,
    pub view_dir: Vec4,
    pub base_dir: Vec4,
    pub anim: AnimationParams,
    pub decay: f32,
    pub angle: f32,
    pub penumbra: f32,
    pub morton: u32,
    pub dirty: DirtyFlags,
    pub visible: bool,
    pub lod_level: LodLevel,
    pub casts_shadow: bool,
    pub shadow_intensity: f32,
}

/// Rect (area) light record with a full tangent frame.
#[derive(Debug, Clone, Copy)]
pub struct RectLight {
    pub base_world_pos: Vec4,
    pub anim_offset: Vec4,
    pub world_pos: Vec4,
    pub color: Vec4,
    /// x = width, y = height.
    pub size: Vec4,
    pub normal: Vec4,
    pub tangent: Vec4,
    pub bitangent: Vec4,
    pub view_pos: Vec4,
    pub view_normal: Vec4,
    pub view_tangent: Vec4,
    pub base_normal: Vec4,
    pub base_tangent: Vec4,
    pub base_bitangent: Vec4,
    pub anim: AnimationParams,
    pub decay: f32,
    pub morton: u32,
    pub dirty: DirtyFlags,
    pub visible: bool,
    pub lod_level: LodLevel,
    pub casts_shadow: bool,
    pub shadow_intensity: f32,
}

macro_rules! impl_light_defaults {
    ($ty:ty { $($extra:tt)* }) => {
        impl Default for $ty {
            fn default() -> Self {
                Self {
                    base_world_pos: Vec4::ZERO,
                    anim_offset: Vec4::ZERO,
                    world_pos: Vec4::ZERO,
                    color: Vec4::ZERO,
                    view_pos: Vec4::ZERO,
                    anim: AnimationParams::none(),
                    decay: 1.0,
                    morton: 0,
                    dirty: DirtyFlags::empty(),
                    visible: true,
                    lod_level: LodLevel::Full,
                    casts_shadow: false,
                    shadow_intensity: defaults::SHADOW_INTENSITY,
                    $($extra)*
                }
            }
        }
    };
}

impl_light_defaults!(PointLight {
    base_color: Vec4::ZERO,
});

impl_light_defaults!(SpotLight {
    direction: Vec4::ZERO,
    view_dir: Vec4::ZERO,
    base_dir: Vec4::ZERO,
    angle: 0.0,
    penumbra: 0.0,
});

impl_light_defaults!(RectLight {
    size: Vec4::ZERO,
    normal: Vec4::ZERO,
    tangent: Vec4::ZERO,
    bitangent: Vec4::ZERO,
    view_normal: Vec4::ZERO,
    view_tangent: Vec4::ZERO,
    base_normal: Vec4::ZERO,
    base_tangent: Vec4::ZERO,
    base_bitangent: Vec4::ZERO,
});

/// Uniform access to the fields shared by all three light kinds, so mutation
/// and sorting logic is written once instead of per kind.
pub trait LightRecord: Copy + Default + MortonKeyed {
    fn base_world_pos(&self) -> Vec4;
    fn base_world_pos_mut(&mut self) -> &mut Vec4;
    fn world_pos_mut(&mut self) -> &mut Vec4;
    fn color_mut(&mut self) -> &mut Vec4;
    fn set_morton(&mut self, key: u32);
    fn dirty_mut(&mut self) -> &mut DirtyFlags;
    fn set_visible(&mut self, visible: bool);
    fn set_decay(&mut self, decay: f32);
    fn anim_mut(&mut self) -> &mut AnimationParams;
}

macro_rules! impl_light_record {
    ($ty:ty) => {
        impl MortonKeyed for $ty {
            #[inline]
            fn morton_key(&self) -> u32 {
                self.morton
            }
        }

        impl LightRecord for $ty {
            #[inline]
            fn base_world_pos(&self) -> Vec4 {
                self.base_world_pos
            }
            #[inline]
            fn base_world_pos_mut(&mut self) -> &mut Vec4 {
                &mut self.base_world_pos
            }
            #[inline]
            fn world_pos_mut(&mut self) -> &mut Vec4 {
                &mut self.world_pos
            }
            #[inline]
            fn color_mut(&mut self) -> &mut Vec4 {
                &mut self.color
            }
            #[inline]
            fn set_morton(&mut self, key: u32) {
                self.morton = key;
            }
            #[inline]
            fn dirty_mut(&mut self) -> &mut DirtyFlags {
                &mut self.dirty
            }
            #[inline]
            fn set_visible(&mut self, visible: bool) {
                self.visible = visible;
            }
            #[inline]
            fn set_decay(&mut self, decay: f32) {
                self.decay = decay;
            }
            #[inline]
            fn anim_mut(&mut self) -> &mut AnimationParams {
                &mut self.anim
            }
        }
    };
}

impl_light_record!(PointLight);
impl_light_record!(SpotLight);
impl_light_record!(RectLight);

/// Host-facing creation parameters for a point light.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PointLightDesc {
    pub position: Vec3,
    pub radius: f32,
    pub color: Vec3,
    pub intensity: f32,
    pub decay: f32,
}

/// Host-facing creation parameters for a spot light.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SpotLightDesc {
    pub position: Vec3,
    pub radius: f32,
    pub color: Vec3,
    pub intensity: f32,
    pub decay: f32,
    pub direction: Vec3,
    /// Cone half-angle, radians.
    pub angle: f32,
    /// Soft-edge width inside the cone, radians.
    pub penumbra: f32,
}

/// Host-facing creation parameters for a rect light.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RectLightDesc {
    pub position: Vec3,
    pub radius: f32,
    pub color: Vec3,
    pub intensity: f32,
    pub decay: f32,
    pub width: f32,
    pub height: f32,
    pub normal: Vec3,
}
