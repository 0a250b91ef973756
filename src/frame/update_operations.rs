//! Scalar frame update: one light at a time through
//! animate -> transform -> LOD -> cull -> pack.
//!
//! The batched path in `batch_operations` must stay observably equivalent to
//! these functions; shared pieces (LOD, culling, packing) live here so both
//! paths use the same comparisons.

use crate::animation::{animate_point, animate_rect, animate_spot};
use crate::frame::gpu_data::{
    pack_point_params, pack_visible_lod, PointLightGpu, RectLightGpu, SpotLightGpu, ViewBasis,
};
use crate::lights::light_data::{DirtyFlags, LodLevel, PointLight, RectLight, SpotLight};

/// Frame-constant parameters captured once per update call.
#[derive(Debug, Clone, Copy)]
pub struct FrameContext {
    pub basis: ViewBasis,
    pub near: f32,
    pub far: f32,
    pub lod_bias: f32,
}

/// LOD tier from view-space depth. Thresholds are strict comparisons, so a
/// light exactly on a threshold takes the nearer (more detailed) tier; the
/// batched path uses the same comparator and agrees at boundaries.
#[inline]
pub fn compute_lod(view_z: f32, radius: f32, lod_bias: f32) -> LodLevel {
    LodLevel::from_relative_distance(-view_z / (radius * lod_bias))
}

/// A light is culled when its sphere is behind (or engulfing) the near plane
/// or entirely past the far plane. Strict comparisons: a light exactly on
/// either boundary survives.
#[inline]
pub fn is_culled(view_z: f32, radius: f32, near: f32, far: f32) -> bool {
    view_z > radius - near || view_z < -far - radius
}

/// Scalar point light update. Returns true when any animated light was
/// evaluated this frame.
pub fn update_points_scalar(
    lights: &mut [PointLight],
    out: &mut [PointLightGpu],
    ctx: &FrameContext,
    time: f32,
) -> bool {
    let mut animated = false;

    for (light, dst) in lights.iter_mut().zip(out.iter_mut()) {
        if light.anim.is_animated() {
            animate_point(light, time);
            animated = true;
        } else {
            light.world_pos = light.base_world_pos;
        }

        light.view_pos = ctx
            .basis
            .transform_point(light.world_pos.truncate())
            .extend(light.world_pos.w);
        light.lod_level = compute_lod(light.view_pos.z, light.world_pos.w, ctx.lod_bias);

        let culled = is_culled(light.view_pos.z, light.world_pos.w, ctx.near, ctx.far);
        let visible = light.visible && !culled;

        dst.position_radius = light.view_pos.to_array();
        dst.color_decay_visible = [
            light.color.x * light.color.w,
            light.color.y * light.color.w,
            light.color.z * light.color.w,
            pack_point_params(light.decay, visible, light.lod_level),
        ];

        light.dirty = DirtyFlags::empty();
    }

    animated
}

/// Spot light update.
pub fn update_spots(
    lights: &mut [SpotLight],
    out: &mut [SpotLightGpu],
    ctx: &FrameContext,
    time: f32,
) -> bool {
    let mut animated = false;

    for (light, dst) in lights.iter_mut().zip(out.iter_mut()) {
        if light.anim.is_animated() {
            animate_spot(light, time);
            animated = true;
        } else {
            light.world_pos = light.base_world_pos;
        }

        light.view_pos = ctx
            .basis
            .transform_point(light.world_pos.truncate())
            .extend(light.world_pos.w);
        light.view_dir = ctx
            .basis
            .transform_dir(light.direction.truncate())
            .extend(0.0);
        light.lod_level = compute_lod(light.view_pos.z, light.world_pos.w, ctx.lod_bias);

        let culled = is_culled(light.view_pos.z, light.world_pos.w, ctx.near, ctx.far);
        let visible = light.visible && !culled;

        dst.position_radius = light.view_pos.to_array();
        dst.color_intensity = light.color.to_array();
        dst.direction = light.view_dir.to_array();
        dst.angle_params = [
            light.angle.cos(),
            (light.angle - light.penumbra).cos(),
            light.decay,
            pack_visible_lod(visible, light.lod_level),
        ];

        light.dirty = DirtyFlags::empty();
    }

    animated
}

/// Rect light update.
pub fn update_rects(
    lights: &mut [RectLight],
    out: &mut [RectLightGpu],
    ctx: &FrameContext,
    time: f32,
) -> bool {
    let mut animated = false;

    for (light, dst) in lights.iter_mut().zip(out.iter_mut()) {
        if light.anim.is_animated() {
            animate_rect(light, time);
            animated = true;
        } else {
            light.world_pos = light.base_world_pos;
        }

        light.view_pos = ctx
            .basis
            .transform_point(light.world_pos.truncate())
            .extend(light.world_pos.w);
        light.view_normal = ctx
            .basis
            .transform_dir(light.normal.truncate())
            .extend(0.0);
        light.view_tangent = ctx
            .basis
            .transform_dir(light.tangent.truncate())
            .extend(0.0);
        light.lod_level = compute_lod(light.view_pos.z, light.world_pos.w, ctx.lod_bias);

        let culled = is_culled(light.view_pos.z, light.world_pos.w, ctx.near, ctx.far);
        let visible = light.visible && !culled;

        dst.position_radius = light.view_pos.to_array();
        dst.color_intensity = light.color.to_array();
        dst.size_params = [
            light.size.x,
            light.size.y,
            light.decay,
            pack_visible_lod(visible, light.lod_level),
        ];
        dst.normal = light.view_normal.to_array();
        dst.tangent = light.view_tangent.to_array();

        light.dirty = DirtyFlags::empty();
    }

    animated
}
