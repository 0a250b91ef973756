//! Animation evaluation - pure functions of (light, time).
//!
//! Evaluation is driven by absolute time with no internal accumulation, so
//! positional output is idempotent per time value. Order per light: reset
//! transients, sum position offsets (circular + linear + wave), apply the
//! offset, rotate, then property effects (flicker, pulse). Rotation runs
//! after the offset is applied because spot lights rotate their already
//! offset position.

use glam::{Vec3, Vec4};

use crate::animation::animation_data::{
    AnimFlags, AnimationParams, FlickerParams, LinearMode, LinearParams, PulseParams,
    RotationParams,
};
use crate::lights::light_data::{PointLight, RectLight, SpotLight};
use crate::math::{lerp, rotate_around_axis};

/// Summed positional offset from all enabled position effects.
fn position_offset(anim: &AnimationParams, base_pos: Vec3, time: f32) -> Vec3 {
    let mut offset = Vec3::ZERO;

    if anim.flags.contains(AnimFlags::CIRCULAR) {
        let phase = time * anim.circular.speed;
        offset.x = phase.sin() * anim.circular.radius;
        offset.z = phase.cos() * anim.circular.radius;
    }

    if anim.flags.contains(AnimFlags::LINEAR) {
        offset += linear_offset(&anim.linear, base_pos, time);
    }

    if anim.flags.contains(AnimFlags::WAVE) {
        let wave = (time * anim.wave.speed + anim.wave.phase).sin() * anim.wave.amplitude;
        offset += anim.wave.axis * wave;
    }

    offset
}

fn linear_offset(params: &LinearParams, base_pos: Vec3, time: f32) -> Vec3 {
    if time < params.delay {
        return Vec3::ZERO;
    }

    let mut t = (time - params.delay) / params.duration;
    match params.mode {
        LinearMode::Loop => t = t.fract(),
        LinearMode::PingPong => {
            let cycle = t as i32;
            t = t.fract();
            if cycle & 1 == 1 {
                t = 1.0 - t;
            }
        }
        LinearMode::Once => t = t.clamp(0.0, 1.0),
    }

    let span = params.target - base_pos;
    Vec3::new(
        lerp(0.0, span.x, t),
        lerp(0.0, span.y, t),
        lerp(0.0, span.z, t),
    )
}

/// Intensity multiplier in [0.1, 2.0].
fn flicker_factor(params: &FlickerParams, time: f32) -> f32 {
    let factor = 1.0
        + (time * params.speed + params.seed).sin()
            * (time * params.speed * 1.7 + params.seed * 2.3).cos()
            * params.intensity;
    factor.clamp(0.1, 2.0)
}

fn pulse_factor(params: &PulseParams, time: f32) -> f32 {
    1.0 + (time * params.speed).sin() * params.amount
}

/// Current rotation angle; continuous mode wraps modulo 2π to bound
/// floating-point error over long runtimes.
fn rotation_angle(params: &RotationParams, time: f32) -> f32 {
    match params.mode {
        crate::animation::RotateMode::Swing => (time * params.speed).sin() * params.max_angle,
        crate::animation::RotateMode::Continuous => {
            (time * params.speed) % (2.0 * std::f32::consts::PI)
        }
    }
}

/// Evaluate a point light's animation for this frame.
///
/// Property effects scale the authored intensity: color is reset from
/// `base_color` before flicker and pulse apply.
pub fn animate_point(l: &mut PointLight, time: f32) {
    l.anim_offset = Vec4::ZERO;
    l.color = l.base_color;
    l.world_pos.w = l.base_world_pos.w;

    if l.anim.flags.is_empty() {
        l.world_pos = l.base_world_pos;
        return;
    }

    let offset = position_offset(&l.anim, l.base_world_pos.truncate(), time);
    l.anim_offset = offset.extend(0.0);
    let radius = l.world_pos.w;
    l.world_pos = (l.base_world_pos.truncate() + offset).extend(radius);

    if l.anim.flags.contains(AnimFlags::FLICKER) {
        l.color.w = l.base_color.w * flicker_factor(&l.anim.flicker, time);
    }

    if l.anim.flags.contains(AnimFlags::PULSE) {
        let pulse = pulse_factor(&l.anim.pulse, time);
        if l.anim.pulse.target.contains(crate::animation::PulseTarget::INTENSITY) {
            l.color.w *= pulse;
        }
        if l.anim.pulse.target.contains(crate::animation::PulseTarget::RADIUS) {
            l.world_pos.w = l.base_world_pos.w * pulse;
        }
    }
}

/// Evaluate a spot light's animation for this frame.
///
/// Rotation turns both the base direction and the already-offset world
/// position around the effect axis. Flicker and pulse chain onto the current
/// intensity rather than the authored one; see the per-kind intensity note in
/// DESIGN.md.
pub fn animate_spot(l: &mut SpotLight, time: f32) {
    l.anim_offset = Vec4::ZERO;
    l.direction = l.base_dir;
    l.world_pos.w = l.base_world_pos.w;

    if l.anim.flags.is_empty() {
        l.world_pos = l.base_world_pos;
        return;
    }

    let offset = position_offset(&l.anim, l.base_world_pos.truncate(), time);
    l.anim_offset = offset.extend(0.0);
    let radius = l.world_pos.w;
    l.world_pos = (l.base_world_pos.truncate() + offset).extend(radius);

    if l.anim.flags.contains(AnimFlags::ROTATE) {
        let angle = rotation_angle(&l.anim.rotation, time);
        let axis = l.anim.rotation.axis;
        l.direction = rotate_around_axis(l.base_dir.truncate(), axis, angle).extend(0.0);
        let radius = l.world_pos.w;
        l.world_pos = rotate_around_axis(l.world_pos.truncate(), axis, angle).extend(radius);
    }

    if l.anim.flags.contains(AnimFlags::FLICKER) {
        l.color.w *= flicker_factor(&l.anim.flicker, time);
    }

    if l.anim.flags.contains(AnimFlags::PULSE) {
        let pulse = pulse_factor(&l.anim.pulse, time);
        if l.anim.pulse.target.contains(crate::animation::PulseTarget::INTENSITY) {
            l.color.w *= pulse;
        }
        if l.anim.pulse.target.contains(crate::animation::PulseTarget::RADIUS) {
            l.world_pos.w = l.base_world_pos.w * pulse;
        }
    }
}

/// Evaluate a rect light's animation for this frame.
///
/// Rotation turns the whole tangent frame (normal, tangent, bitangent) from
/// its base orientation. Pulse modulates intensity only; rect radius is not
/// pulsed.
pub fn animate_rect(l: &mut RectLight, time: f32) {
    l.anim_offset = Vec4::ZERO;
    l.normal = l.base_normal;
    l.tangent = l.base_tangent;
    l.bitangent = l.base_bitangent;
    l.world_pos.w = l.base_world_pos.w;

    if l.anim.flags.is_empty() {
        l.world_pos = l.base_world_pos;
        return;
    }

    let offset = position_offset(&l.anim, l.base_world_pos.truncate(), time);
    l.anim_offset = offset.extend(0.0);
    let radius = l.world_pos.w;
    l.world_pos = (l.base_world_pos.truncate() + offset).extend(radius);

    if l.anim.flags.contains(AnimFlags::ROTATE) {
        let angle = rotation_angle(&l.anim.rotation, time);
        let axis = l.anim.rotation.axis;
        l.normal = rotate_around_axis(l.base_normal.truncate(), axis, angle).extend(0.0);
        l.tangent = rotate_around_axis(l.base_tangent.truncate(), axis, angle).extend(0.0);
        l.bitangent = rotate_around_axis(l.base_bitangent.truncate(), axis, angle).extend(0.0);
    }

    if l.anim.flags.contains(AnimFlags::FLICKER) {
        l.color.w *= flicker_factor(&l.anim.flicker, time);
    }

    if l.anim.flags.contains(AnimFlags::PULSE) {
        let pulse = pulse_factor(&l.anim.pulse, time);
        if l.anim.pulse.target.contains(crate::animation::PulseTarget::INTENSITY) {
            l.color.w *= pulse;
        }
    }
}
