//! Batched frame update: four lights' arithmetic in lockstep.
//!
//! Lane math over `glam::Vec4` mirrors the scalar path operation for
//! operation (same multiply/add/divide order, same strict comparisons), so
//! both paths produce bit-identical output buffers. The remainder of a
//! non-multiple-of-four array goes through the scalar path.

use glam::Vec4;

use crate::animation::{animate_point, AnimFlags};
use crate::constants::lod;
use crate::frame::gpu_data::{pack_point_params, PointLightGpu, ViewBasis};
use crate::frame::update_operations::{is_culled, update_points_scalar, FrameContext};
use crate::lights::light_data::{DirtyFlags, LodLevel, PointLight};

/// Twelve view-matrix scalars splatted across lanes.
struct BasisLanes {
    e0: Vec4,
    e1: Vec4,
    e2: Vec4,
    e4: Vec4,
    e5: Vec4,
    e6: Vec4,
    e8: Vec4,
    e9: Vec4,
    e10: Vec4,
    e12: Vec4,
    e13: Vec4,
    e14: Vec4,
}

impl BasisLanes {
    fn new(basis: &ViewBasis) -> Self {
        Self {
            e0: Vec4::splat(basis.col_x.x),
            e1: Vec4::splat(basis.col_x.y),
            e2: Vec4::splat(basis.col_x.z),
            e4: Vec4::splat(basis.col_y.x),
            e5: Vec4::splat(basis.col_y.y),
            e6: Vec4::splat(basis.col_y.z),
            e8: Vec4::splat(basis.col_z.x),
            e9: Vec4::splat(basis.col_z.y),
            e10: Vec4::splat(basis.col_z.z),
            e12: Vec4::splat(basis.translation.x),
            e13: Vec4::splat(basis.translation.y),
            e14: Vec4::splat(basis.translation.z),
        }
    }

    /// Transform four world positions at once. Association matches the
    /// scalar `ViewBasis::transform_point`.
    #[inline]
    fn transform(&self, wx: Vec4, wy: Vec4, wz: Vec4) -> (Vec4, Vec4, Vec4) {
        let vx = self.e0 * wx + self.e4 * wy + self.e8 * wz + self.e12;
        let vy = self.e1 * wx + self.e5 * wy + self.e9 * wz + self.e13;
        let vz = self.e2 * wx + self.e6 * wy + self.e10 * wz + self.e14;
        (vx, vy, vz)
    }
}

/// Four LOD tiers at once; same strict-greater comparator as the scalar path.
#[inline]
fn lod_lanes(neg_view_z: Vec4, biased_radius: Vec4) -> [LodLevel; 4] {
    let relative = neg_view_z / biased_radius;

    let mut tiers = Vec4::splat(LodLevel::Full.as_f32());
    tiers = Vec4::select(
        relative.cmpgt(Vec4::splat(lod::MEDIUM_DISTANCE)),
        Vec4::splat(LodLevel::Medium.as_f32()),
        tiers,
    );
    tiers = Vec4::select(
        relative.cmpgt(Vec4::splat(lod::SIMPLE_DISTANCE)),
        Vec4::splat(LodLevel::Simple.as_f32()),
        tiers,
    );
    tiers = Vec4::select(
        relative.cmpgt(Vec4::splat(lod::SKIP_DISTANCE)),
        Vec4::splat(LodLevel::Skip.as_f32()),
        tiers,
    );

    [
        LodLevel::from_index(tiers.x as u8),
        LodLevel::from_index(tiers.y as u8),
        LodLevel::from_index(tiers.z as u8),
        LodLevel::from_index(tiers.w as u8),
    ]
}

/// Batched point light update: full animate/LOD/cull/pack semantics, four
/// lights per iteration.
pub fn update_points_batched(
    lights: &mut [PointLight],
    out: &mut [PointLightGpu],
    ctx: &FrameContext,
    time: f32,
) -> bool {
    let count = lights.len();
    let tail = count - (count % 4);
    let lanes = BasisLanes::new(&ctx.basis);
    let mut animated = false;

    let mut base = 0;
    while base < tail {
        for light in &mut lights[base..base + 4] {
            if light.anim.is_animated() {
                animate_point(light, time);
                animated = true;
            } else {
                light.world_pos = light.base_world_pos;
            }
        }

        let wx = Vec4::new(
            lights[base].world_pos.x,
            lights[base + 1].world_pos.x,
            lights[base + 2].world_pos.x,
            lights[base + 3].world_pos.x,
        );
        let wy = Vec4::new(
            lights[base].world_pos.y,
            lights[base + 1].world_pos.y,
            lights[base + 2].world_pos.y,
            lights[base + 3].world_pos.y,
        );
        let wz = Vec4::new(
            lights[base].world_pos.z,
            lights[base + 1].world_pos.z,
            lights[base + 2].world_pos.z,
            lights[base + 3].world_pos.z,
        );

        let (vx, vy, vz) = lanes.transform(wx, wy, wz);

        let neg_vz = -vz;
        let biased_radius = Vec4::new(
            lights[base].world_pos.w * ctx.lod_bias,
            lights[base + 1].world_pos.w * ctx.lod_bias,
            lights[base + 2].world_pos.w * ctx.lod_bias,
            lights[base + 3].world_pos.w * ctx.lod_bias,
        );
        let tiers = lod_lanes(neg_vz, biased_radius);

        for lane in 0..4 {
            let light = &mut lights[base + lane];
            light.view_pos = Vec4::new(vx[lane], vy[lane], vz[lane], light.world_pos.w);
            light.lod_level = tiers[lane];

            let culled = is_culled(light.view_pos.z, light.world_pos.w, ctx.near, ctx.far);
            let visible = light.visible && !culled;

            let dst = &mut out[base + lane];
            dst.position_radius = light.view_pos.to_array();
            dst.color_decay_visible = [
                light.color.x * light.color.w,
                light.color.y * light.color.w,
                light.color.z * light.color.w,
                pack_point_params(light.decay, visible, light.lod_level),
            ];

            light.dirty = DirtyFlags::empty();
        }

        base += 4;
    }

    animated |= update_points_scalar(&mut lights[tail..], &mut out[tail..count], ctx, time);
    animated
}

/// Positions-only mass update: transforms and packs positions with a constant
/// neutral decay/visibility word, skips LOD and culling, and evaluates only
/// circular motion. For thousands of uniform-intensity lights where the full
/// per-light fidelity is not worth the cost.
pub fn update_points_positions_only(
    lights: &mut [PointLight],
    out: &mut [PointLightGpu],
    basis: &ViewBasis,
    has_animated: bool,
    time: f32,
) {
    let count = lights.len();
    let tail = count - (count % 4);
    let lanes = BasisLanes::new(basis);

    let mut base = 0;
    while base < tail {
        if has_animated {
            for light in &mut lights[base..base + 4] {
                apply_circular_only(light, time);
            }
        }

        let wx = Vec4::new(
            lights[base].world_pos.x,
            lights[base + 1].world_pos.x,
            lights[base + 2].world_pos.x,
            lights[base + 3].world_pos.x,
        );
        let wy = Vec4::new(
            lights[base].world_pos.y,
            lights[base + 1].world_pos.y,
            lights[base + 2].world_pos.y,
            lights[base + 3].world_pos.y,
        );
        let wz = Vec4::new(
            lights[base].world_pos.z,
            lights[base + 1].world_pos.z,
            lights[base + 2].world_pos.z,
            lights[base + 3].world_pos.z,
        );

        let (vx, vy, vz) = lanes.transform(wx, wy, wz);

        for lane in 0..4 {
            let light = &mut lights[base + lane];
            light.view_pos = Vec4::new(vx[lane], vy[lane], vz[lane], light.world_pos.w);

            let dst = &mut out[base + lane];
            dst.position_radius = light.view_pos.to_array();
            dst.color_decay_visible = [
                light.color.x * light.color.w,
                light.color.y * light.color.w,
                light.color.z * light.color.w,
                1.0,
            ];
        }

        base += 4;
    }

    for light in &mut lights[tail..] {
        if has_animated {
            apply_circular_only(light, time);
        }
        let view = basis.transform_point(light.world_pos.truncate());
        light.view_pos = view.extend(light.world_pos.w);
    }
    for (light, dst) in lights[tail..].iter().zip(out[tail..count].iter_mut()) {
        dst.position_radius = light.view_pos.to_array();
        dst.color_decay_visible = [
            light.color.x * light.color.w,
            light.color.y * light.color.w,
            light.color.z * light.color.w,
            1.0,
        ];
    }
}

#[inline]
fn apply_circular_only(light: &mut PointLight, time: f32) {
    if light.anim.flags.contains(AnimFlags::CIRCULAR) {
        let phase = time * light.anim.circular.speed;
        light.world_pos.x = light.base_world_pos.x + phase.sin() * light.anim.circular.radius;
        light.world_pos.z = light.base_world_pos.z + phase.cos() * light.anim.circular.radius;
    } else {
        light.world_pos = light.base_world_pos;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::{AnimationParams, PulseTarget};
    use glam::{Mat4, Vec3};

    fn ctx() -> FrameContext {
        let view = Mat4::from_translation(Vec3::new(0.5, -1.0, -40.0)) * Mat4::from_rotation_y(0.3);
        FrameContext {
            basis: ViewBasis::from_matrix(&view),
            near: 0.1,
            far: 1000.0,
            lod_bias: 1.0,
        }
    }

    fn make_lights() -> Vec<PointLight> {
        let mut lights = Vec::new();
        for i in 0..7 {
            let f = i as f32;
            let mut l = PointLight {
                base_world_pos: Vec4::new(f * 13.0, f, f * 29.0, 2.0 + f),
                base_color: Vec4::new(1.0, 0.5, 0.25, 1.0 + f),
                decay: 1.0 + f * 0.25,
                ..Default::default()
            };
            l.world_pos = l.base_world_pos;
            l.color = l.base_color;
            match i % 3 {
                1 => {
                    l.anim = AnimationParams::none()
                        .with_circular(1.0 + f, 3.0)
                        .with_flicker(7.0, 0.4, f);
                }
                2 => {
                    l.anim = AnimationParams::none().with_pulse(2.0, 0.5, PulseTarget::RADIUS);
                }
                _ => {}
            }
            lights.push(l);
        }
        lights
    }

    #[test]
    fn batched_matches_scalar_bitwise() {
        let ctx = ctx();
        let mut scalar_lights = make_lights();
        let mut batched_lights = make_lights();
        let mut scalar_out = vec![PointLightGpu::default(); scalar_lights.len()];
        let mut batched_out = vec![PointLightGpu::default(); batched_lights.len()];

        let time = 1.734;
        let a = update_points_scalar(&mut scalar_lights, &mut scalar_out, &ctx, time);
        let b = update_points_batched(&mut batched_lights, &mut batched_out, &ctx, time);

        assert_eq!(a, b);
        for (s, q) in scalar_out.iter().zip(batched_out.iter()) {
            assert_eq!(
                bytemuck::bytes_of(s),
                bytemuck::bytes_of(q),
                "batched output diverged from scalar"
            );
        }
        for (s, q) in scalar_lights.iter().zip(batched_lights.iter()) {
            assert_eq!(s.view_pos, q.view_pos);
            assert_eq!(s.lod_level, q.lod_level);
        }
    }

    #[test]
    fn batched_matches_scalar_at_lod_boundaries() {
        // Radius 5 lights placed exactly on and just beyond each threshold.
        let ctx = FrameContext {
            basis: ViewBasis::from_matrix(&Mat4::IDENTITY),
            near: 0.1,
            far: 10_000.0,
            lod_bias: 1.0,
        };
        let depths = [-35.0, -35.001, -75.0, -75.001, -150.0, -150.001, -20.0, -151.0];
        let mut scalar_lights: Vec<PointLight> = depths
            .iter()
            .map(|&z| {
                let mut l = PointLight {
                    base_world_pos: Vec4::new(0.0, 0.0, z, 5.0),
                    base_color: Vec4::ONE,
                    ..Default::default()
                };
                l.world_pos = l.base_world_pos;
                l.color = l.base_color;
                l
            })
            .collect();
        let mut batched_lights = scalar_lights.clone();
        let mut scalar_out = vec![PointLightGpu::default(); depths.len()];
        let mut batched_out = vec![PointLightGpu::default(); depths.len()];

        update_points_scalar(&mut scalar_lights, &mut scalar_out, &ctx, 0.0);
        update_points_batched(&mut batched_lights, &mut batched_out, &ctx, 0.0);

        for i in 0..depths.len() {
            assert_eq!(
                scalar_lights[i].lod_level, batched_lights[i].lod_level,
                "tier mismatch at depth {}",
                depths[i]
            );
            assert_eq!(scalar_out[i], batched_out[i]);
        }
        // Spot-check the documented boundary rule.
        assert_eq!(scalar_lights[0].lod_level, LodLevel::Full);
        assert_eq!(scalar_lights[1].lod_level, LodLevel::Medium);
    }

    #[test]
    fn positions_only_packs_neutral_params() {
        let basis = ViewBasis::from_matrix(&Mat4::from_translation(Vec3::new(0.0, 0.0, -20.0)));
        let mut lights = make_lights();
        let mut out = vec![PointLightGpu::default(); lights.len()];

        update_points_positions_only(&mut lights, &mut out, &basis, true, 0.9);

        for (light, dst) in lights.iter().zip(out.iter()) {
            assert_eq!(dst.color_decay_visible[3], 1.0);
            assert_eq!(dst.position_radius, light.view_pos.to_array());
        }
    }

    #[test]
    fn positions_only_applies_circular_motion() {
        let basis = ViewBasis::from_matrix(&Mat4::IDENTITY);
        let mut lights = vec![PointLight {
            base_world_pos: Vec4::new(10.0, 0.0, 10.0, 1.0),
            world_pos: Vec4::new(10.0, 0.0, 10.0, 1.0),
            base_color: Vec4::ONE,
            color: Vec4::ONE,
            anim: AnimationParams::none().with_circular(1.0, 2.0),
            ..Default::default()
        }];
        let mut out = vec![PointLightGpu::default(); 1];

        update_points_positions_only(&mut lights, &mut out, &basis, true, 0.0);
        // sin(0) = 0, cos(0) = 1: offset lands entirely on z.
        assert_eq!(out[0].position_radius[0], 10.0);
        assert_eq!(out[0].position_radius[2], 12.0);
    }
}
