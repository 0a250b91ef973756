//! Light store mutation operations.
//!
//! Creation initializes every record field; attribute setters are written
//! once, generically over `LightRecord`, and preserve the exact dirty-bit
//! side effects per attribute. Invalid indices are silent no-ops throughout.

use glam::{Vec3, Vec4};

use crate::animation::AnimationParams;
use crate::lights::light_data::{
    DirtyFlags, LightRecord, LodLevel, PointLight, PointLightDesc, RectLight, RectLightDesc,
    SpotLight, SpotLightDesc,
};
use crate::lights::store_data::{LightArray, LightStore};
use crate::math::orthonormal_basis;
use crate::spatial::morton_2d;

/// Degenerate-vector threshold for direction/normal setters.
const MIN_AXIS_LENGTH: f32 = 1e-4;

pub(crate) fn base_point(desc: &PointLightDesc) -> PointLight {
    let base_world_pos = desc.position.extend(desc.radius);
    let base_color = desc.color.extend(desc.intensity);
    PointLight {
        base_world_pos,
        world_pos: base_world_pos,
        base_color,
        color: base_color,
        decay: desc.decay,
        morton: morton_2d(desc.position.x, desc.position.z),
        dirty: DirtyFlags::all(),
        lod_level: LodLevel::Full,
        ..Default::default()
    }
}

/// Create a static point light. `None` means the array is at capacity.
pub fn create_point(store: &mut LightStore, desc: &PointLightDesc) -> Option<usize> {
    let index = store.points.push(base_point(desc));
    if index.is_some() {
        store.ordering_stale = true;
    } else {
        log::debug!("point light capacity {} exhausted", store.points.capacity());
    }
    index
}

/// Create an animated point light.
pub fn create_point_animated(
    store: &mut LightStore,
    desc: &PointLightDesc,
    mut anim: AnimationParams,
) -> Option<usize> {
    anim.sanitize();
    let mut light = base_point(desc);
    light.anim = anim;
    let index = store.points.push(light);
    if index.is_some() {
        store.ordering_stale = true;
        if anim.is_animated() {
            store.has_animated = true;
        }
    }
    index
}

/// Minimal-init creation for mass loads: fixed unit decay, no animation.
pub fn create_point_fast(
    store: &mut LightStore,
    position: Vec3,
    radius: f32,
    color: Vec3,
    intensity: f32,
) -> Option<usize> {
    let desc = PointLightDesc {
        position,
        radius,
        color,
        intensity,
        decay: crate::constants::defaults::FAST_DECAY,
    };
    create_point(store, &desc)
}

pub(crate) fn base_spot(desc: &SpotLightDesc) -> SpotLight {
    let base_world_pos = desc.position.extend(desc.radius);
    let direction = desc.direction.normalize_or_zero().extend(0.0);
    SpotLight {
        base_world_pos,
        world_pos: base_world_pos,
        color: desc.color.extend(desc.intensity),
        direction,
        base_dir: direction,
        decay: desc.decay,
        angle: desc.angle,
        penumbra: desc.penumbra,
        morton: morton_2d(desc.position.x, desc.position.z),
        dirty: DirtyFlags::all(),
        lod_level: LodLevel::Full,
        ..Default::default()
    }
}

pub fn create_spot(store: &mut LightStore, desc: &SpotLightDesc) -> Option<usize> {
    let index = store.spots.push(base_spot(desc));
    if index.is_some() {
        store.ordering_stale = true;
    } else {
        log::debug!("spot light capacity {} exhausted", store.spots.capacity());
    }
    index
}

pub fn create_spot_animated(
    store: &mut LightStore,
    desc: &SpotLightDesc,
    mut anim: AnimationParams,
) -> Option<usize> {
    anim.sanitize();
    let mut light = base_spot(desc);
    light.anim = anim;
    let index = store.spots.push(light);
    if index.is_some() {
        store.ordering_stale = true;
        if anim.is_animated() {
            store.has_animated = true;
        }
    }
    index
}

pub(crate) fn base_rect(desc: &RectLightDesc) -> RectLight {
    let base_world_pos = desc.position.extend(desc.radius);
    let normal = desc.normal.normalize_or_zero();
    let (tangent, bitangent) = orthonormal_basis(normal);
    RectLight {
        base_world_pos,
        world_pos: base_world_pos,
        color: desc.color.extend(desc.intensity),
        size: Vec4::new(desc.width, desc.height, 0.0, 0.0),
        normal: normal.extend(0.0),
        tangent: tangent.extend(0.0),
        bitangent: bitangent.extend(0.0),
        base_normal: normal.extend(0.0),
        base_tangent: tangent.extend(0.0),
        base_bitangent: bitangent.extend(0.0),
        decay: desc.decay,
        morton: morton_2d(desc.position.x, desc.position.z),
        dirty: DirtyFlags::all(),
        lod_level: LodLevel::Full,
        ..Default::default()
    }
}

pub fn create_rect(store: &mut LightStore, desc: &RectLightDesc) -> Option<usize> {
    let index = store.rects.push(base_rect(desc));
    if index.is_some() {
        store.ordering_stale = true;
    } else {
        log::debug!("rect light capacity {} exhausted", store.rects.capacity());
    }
    index
}

pub fn create_rect_animated(
    store: &mut LightStore,
    desc: &RectLightDesc,
    mut anim: AnimationParams,
) -> Option<usize> {
    anim.sanitize();
    let mut light = base_rect(desc);
    light.anim = anim;
    let index = store.rects.push(light);
    if index.is_some() {
        store.ordering_stale = true;
        if anim.is_animated() {
            store.has_animated = true;
        }
    }
    index
}

macro_rules! remove_light {
    ($fn_name:ident, $field:ident) => {
        /// Remove by compacting shift. Invalidates spatial ordering and, when
        /// the removed light was animated, rescans all arrays to refresh the
        /// global animated flag.
        pub fn $fn_name(store: &mut LightStore, index: usize) {
            let was_animated = store
                .$field
                .get(index)
                .map(|l| l.anim.is_animated())
                .unwrap_or(false);
            if store.$field.remove_shift(index) {
                store.ordering_stale = true;
                if was_animated {
                    store.rescan_animated();
                }
            }
        }
    };
}

remove_light!(remove_point, points);
remove_light!(remove_spot, spots);
remove_light!(remove_rect, rects);

/// Move a light's authored position. Recomputes the Morton key and marks the
/// ordering stale; the caller's store flag is updated through the return.
pub fn set_position<T: LightRecord>(
    array: &mut LightArray<T>,
    index: usize,
    position: Vec3,
) -> bool {
    let Some(light) = array.get_mut(index) else {
        return false;
    };
    let radius = light.base_world_pos().w;
    *light.base_world_pos_mut() = position.extend(radius);
    let world_radius = light.world_pos_mut().w;
    *light.world_pos_mut() = position.extend(world_radius);
    light.set_morton(morton_2d(position.x, position.z));
    light.dirty_mut().insert(DirtyFlags::POSITION);
    true
}

pub fn set_color<T: LightRecord>(array: &mut LightArray<T>, index: usize, color: Vec3) {
    if let Some(light) = array.get_mut(index) {
        let intensity = light.color_mut().w;
        *light.color_mut() = color.extend(intensity);
        light.dirty_mut().insert(DirtyFlags::COLOR);
    }
}

pub fn set_intensity<T: LightRecord>(array: &mut LightArray<T>, index: usize, intensity: f32) {
    if let Some(light) = array.get_mut(index) {
        light.color_mut().w = intensity;
        light.dirty_mut().insert(DirtyFlags::COLOR);
    }
}

/// Change the authored radius. Radius feeds the sort-relevant base record, so
/// this also reports ordering staleness to the caller.
pub fn set_radius<T: LightRecord>(array: &mut LightArray<T>, index: usize, radius: f32) -> bool {
    let Some(light) = array.get_mut(index) else {
        return false;
    };
    light.base_world_pos_mut().w = radius;
    light.world_pos_mut().w = radius;
    light.dirty_mut().insert(DirtyFlags::POSITION);
    true
}

pub fn set_decay<T: LightRecord>(array: &mut LightArray<T>, index: usize, decay: f32) {
    if let Some(light) = array.get_mut(index) {
        light.set_decay(decay);
        light.dirty_mut().insert(DirtyFlags::PARAMS);
    }
}

pub fn set_visibility<T: LightRecord>(array: &mut LightArray<T>, index: usize, visible: bool) {
    if let Some(light) = array.get_mut(index) {
        light.set_visible(visible);
        light.dirty_mut().insert(DirtyFlags::PARAMS);
    }
}

/// Replace the animation descriptor. Returns true when the light is now
/// animated so the caller can raise the store's global flag.
pub fn set_animation<T: LightRecord>(
    array: &mut LightArray<T>,
    index: usize,
    mut anim: AnimationParams,
) -> bool {
    let Some(light) = array.get_mut(index) else {
        return false;
    };
    anim.sanitize();
    *light.anim_mut() = anim;
    light.dirty_mut().insert(DirtyFlags::all());
    anim.is_animated()
}

/// Re-aim a spot light. Degenerate directions are ignored.
pub fn set_spot_direction(array: &mut LightArray<SpotLight>, index: usize, direction: Vec3) {
    if let Some(light) = array.get_mut(index) {
        if direction.length() > MIN_AXIS_LENGTH {
            let dir = direction.normalize().extend(0.0);
            light.direction = dir;
            light.base_dir = dir;
            light.dirty.insert(DirtyFlags::PARAMS);
        }
    }
}

pub fn set_spot_angle(array: &mut LightArray<SpotLight>, index: usize, angle: f32, penumbra: f32) {
    if let Some(light) = array.get_mut(index) {
        light.angle = angle;
        light.penumbra = penumbra;
        light.dirty.insert(DirtyFlags::PARAMS);
    }
}

pub fn set_rect_size(array: &mut LightArray<RectLight>, index: usize, width: f32, height: f32) {
    if let Some(light) = array.get_mut(index) {
        light.size.x = width;
        light.size.y = height;
        light.dirty.insert(DirtyFlags::PARAMS);
    }
}

/// Re-orient a rect light, rebuilding its tangent frame. Degenerate normals
/// are ignored.
pub fn set_rect_normal(array: &mut LightArray<RectLight>, index: usize, normal: Vec3) {
    if let Some(light) = array.get_mut(index) {
        if normal.length() > MIN_AXIS_LENGTH {
            let n = normal.normalize();
            let (tangent, bitangent) = orthonormal_basis(n);
            light.normal = n.extend(0.0);
            light.base_normal = light.normal;
            light.tangent = tangent.extend(0.0);
            light.base_tangent = light.tangent;
            light.bitangent = bitangent.extend(0.0);
            light.base_bitangent = light.bitangent;
            light.dirty.insert(DirtyFlags::PARAMS);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::AnimFlags;

    fn store(capacity: usize) -> LightStore {
        LightStore::new(capacity).expect("alloc")
    }

    fn point_desc(x: f32, z: f32) -> PointLightDesc {
        PointLightDesc {
            position: Vec3::new(x, 0.0, z),
            radius: 5.0,
            color: Vec3::ONE,
            intensity: 1.0,
            decay: 2.0,
        }
    }

    #[test]
    fn create_returns_sequential_indices_until_full() {
        let mut s = store(2);
        assert_eq!(create_point(&mut s, &point_desc(0.0, 0.0)), Some(0));
        assert_eq!(create_point(&mut s, &point_desc(1.0, 0.0)), Some(1));
        assert_eq!(create_point(&mut s, &point_desc(2.0, 0.0)), None);
        assert_eq!(s.points.count(), 2);
        assert!(s.ordering_stale);
    }

    #[test]
    fn create_initializes_record() {
        let mut s = store(4);
        let idx = create_point(&mut s, &point_desc(3.0, 7.0)).expect("slot");
        let l = s.points.get(idx).expect("live");
        assert_eq!(l.base_world_pos, Vec4::new(3.0, 0.0, 7.0, 5.0));
        assert_eq!(l.world_pos, l.base_world_pos);
        assert_eq!(l.morton, morton_2d(3.0, 7.0));
        assert_eq!(l.dirty, DirtyFlags::all());
        assert!(l.visible);
        assert!(!l.anim.is_animated());
    }

    #[test]
    fn remove_compacts_and_marks_stale() {
        let mut s = store(4);
        for x in 0..4 {
            create_point(&mut s, &point_desc(x as f32, 0.0));
        }
        s.ordering_stale = false;

        remove_point(&mut s, 1);
        assert_eq!(s.points.count(), 3);
        assert!(s.ordering_stale);
        let xs: Vec<f32> = s
            .points
            .live()
            .iter()
            .map(|l| l.base_world_pos.x)
            .collect();
        assert_eq!(xs, vec![0.0, 2.0, 3.0]);
    }

    #[test]
    fn removing_last_animated_light_clears_global_flag() {
        let mut s = store(4);
        create_point(&mut s, &point_desc(0.0, 0.0));
        let anim = AnimationParams::none().with_circular(1.0, 2.0);
        let idx = create_point_animated(&mut s, &point_desc(1.0, 0.0), anim).expect("slot");
        assert!(s.has_animated);

        remove_point(&mut s, idx);
        assert!(!s.has_animated);
    }

    #[test]
    fn animated_flag_survives_when_other_kind_still_animated() {
        let mut s = store(4);
        let anim = AnimationParams::none().with_circular(1.0, 2.0);
        let p = create_point_animated(&mut s, &point_desc(0.0, 0.0), anim).expect("slot");
        create_spot_animated(
            &mut s,
            &SpotLightDesc {
                position: Vec3::ZERO,
                radius: 3.0,
                color: Vec3::ONE,
                intensity: 1.0,
                decay: 1.0,
                direction: Vec3::new(0.0, -1.0, 0.0),
                angle: 0.5,
                penumbra: 0.1,
            },
            anim,
        );

        remove_point(&mut s, p);
        assert!(s.has_animated);
    }

    #[test]
    fn set_position_updates_morton_and_dirty() {
        let mut s = store(4);
        let idx = create_point(&mut s, &point_desc(0.0, 0.0)).expect("slot");
        s.points.get_mut(idx).expect("live").dirty = DirtyFlags::empty();

        assert!(set_position(&mut s.points, idx, Vec3::new(9.0, 1.0, 4.0)));
        let l = s.points.get(idx).expect("live");
        assert_eq!(l.base_world_pos, Vec4::new(9.0, 1.0, 4.0, 5.0));
        assert_eq!(l.world_pos.truncate(), Vec3::new(9.0, 1.0, 4.0));
        assert_eq!(l.morton, morton_2d(9.0, 4.0));
        assert_eq!(l.dirty, DirtyFlags::POSITION);
    }

    #[test]
    fn set_position_out_of_range_is_noop() {
        let mut s = store(2);
        create_point(&mut s, &point_desc(0.0, 0.0));
        assert!(!set_position(&mut s.points, 7, Vec3::ONE));
    }

    #[test]
    fn attribute_setters_mark_expected_dirty_bits() {
        let mut s = store(2);
        let idx = create_point(&mut s, &point_desc(0.0, 0.0)).expect("slot");

        s.points.get_mut(idx).expect("live").dirty = DirtyFlags::empty();
        set_color(&mut s.points, idx, Vec3::new(0.5, 0.25, 0.125));
        assert_eq!(s.points.get(idx).expect("live").dirty, DirtyFlags::COLOR);

        s.points.get_mut(idx).expect("live").dirty = DirtyFlags::empty();
        set_intensity(&mut s.points, idx, 4.0);
        let l = s.points.get(idx).expect("live");
        assert_eq!(l.color, Vec4::new(0.5, 0.25, 0.125, 4.0));
        assert_eq!(l.dirty, DirtyFlags::COLOR);

        s.points.get_mut(idx).expect("live").dirty = DirtyFlags::empty();
        set_decay(&mut s.points, idx, 1.5);
        assert_eq!(s.points.get(idx).expect("live").dirty, DirtyFlags::PARAMS);

        s.points.get_mut(idx).expect("live").dirty = DirtyFlags::empty();
        set_visibility(&mut s.points, idx, false);
        let l = s.points.get(idx).expect("live");
        assert!(!l.visible);
        assert_eq!(l.dirty, DirtyFlags::PARAMS);
    }

    #[test]
    fn set_radius_touches_base_and_world() {
        let mut s = store(2);
        let idx = create_point(&mut s, &point_desc(0.0, 0.0)).expect("slot");
        assert!(set_radius(&mut s.points, idx, 8.0));
        let l = s.points.get(idx).expect("live");
        assert_eq!(l.base_world_pos.w, 8.0);
        assert_eq!(l.world_pos.w, 8.0);
    }

    #[test]
    fn spot_direction_setter_normalizes_and_ignores_degenerate() {
        let mut s = store(2);
        let idx = create_spot(
            &mut s,
            &SpotLightDesc {
                position: Vec3::ZERO,
                radius: 3.0,
                color: Vec3::ONE,
                intensity: 1.0,
                decay: 1.0,
                direction: Vec3::new(0.0, -1.0, 0.0),
                angle: 0.6,
                penumbra: 0.1,
            },
        )
        .expect("slot");

        set_spot_direction(&mut s.spots, idx, Vec3::new(2.0, 0.0, 0.0));
        let l = s.spots.get(idx).expect("live");
        assert_eq!(l.direction.truncate(), Vec3::X);
        assert_eq!(l.base_dir, l.direction);

        set_spot_direction(&mut s.spots, idx, Vec3::ZERO);
        assert_eq!(s.spots.get(idx).expect("live").direction.truncate(), Vec3::X);
    }

    #[test]
    fn rect_normal_setter_rebuilds_basis() {
        let mut s = store(2);
        let idx = create_rect(
            &mut s,
            &RectLightDesc {
                position: Vec3::ZERO,
                radius: 4.0,
                color: Vec3::ONE,
                intensity: 1.0,
                decay: 1.0,
                width: 2.0,
                height: 1.0,
                normal: Vec3::Z,
            },
        )
        .expect("slot");

        set_rect_normal(&mut s.rects, idx, Vec3::new(0.0, 3.0, 0.0));
        let l = s.rects.get(idx).expect("live");
        let n = l.normal.truncate();
        let t = l.tangent.truncate();
        let b = l.bitangent.truncate();
        assert_eq!(n, Vec3::Y);
        assert!(n.dot(t).abs() < 1e-6);
        assert!(n.dot(b).abs() < 1e-6);
        assert!((t.length() - 1.0).abs() < 1e-6);
        assert_eq!(l.base_tangent, l.tangent);
    }

    #[test]
    fn set_animation_reports_animated_state() {
        let mut s = store(2);
        let idx = create_point(&mut s, &point_desc(0.0, 0.0)).expect("slot");
        assert!(set_animation(
            &mut s.points,
            idx,
            AnimationParams::none().with_wave(Vec3::Y, 1.0, 0.5, 0.0),
        ));
        assert!(s.points.get(idx).expect("live").anim.flags.contains(AnimFlags::WAVE));
        assert!(!set_animation(&mut s.points, idx, AnimationParams::none()));
    }
}
