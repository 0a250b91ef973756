//! Bulk ingestion operations.
//!
//! Each entry receives exactly the initialization the single-light creation
//! paths perform, including direction/normal normalization and rect basis
//! construction. Batches that would exceed capacity are silently truncated;
//! the return value is the number actually ingested.

use glam::Vec3;

use crate::animation::{AnimFlags, AnimationParams, LinearMode, PulseTarget, RotateMode};
use crate::bulk::bulk_data::{MixedBatch, PointBatch};
use crate::constants::bulk::{ANIM_PARAM_STRIDE, KIND_PARAM_STRIDE, VEC_STRIDE};
use crate::lights::light_data::{LightKind, PointLightDesc, RectLightDesc, SpotLightDesc};
use crate::lights::store_data::LightStore;
use crate::lights::store_operations::{base_point, base_rect, base_spot};

/// Decode a point light's animation from the packed 14-float block:
/// [circular(2) | wave(6) | flicker(3) | pulse(3)].
fn decode_point_anim(raw_flags: u32, block: &[f32]) -> AnimationParams {
    let flags = AnimFlags::from_bits_truncate(raw_flags);
    let mut anim = AnimationParams::none();

    if flags.contains(AnimFlags::CIRCULAR) {
        anim = anim.with_circular(block[0], block[1]);
    }
    if flags.contains(AnimFlags::WAVE) {
        anim = anim.with_wave(
            Vec3::new(block[2], block[3], block[4]),
            block[5],
            block[6],
            block[7],
        );
    }
    if flags.contains(AnimFlags::FLICKER) {
        anim = anim.with_flicker(block[8], block[9], block[10]);
    }
    if flags.contains(AnimFlags::PULSE) {
        anim = anim.with_pulse(
            block[11],
            block[12],
            PulseTarget::from_bits_truncate(block[13] as u8),
        );
    }

    anim
}

/// Decode a spot/rect light's animation from the packed block:
/// [linear(6) | rotation(5) | pulse(3)], rotation mode sharing the linear
/// mode slot.
fn decode_oriented_anim(raw_flags: u32, block: &[f32]) -> AnimationParams {
    let flags = AnimFlags::from_bits_truncate(raw_flags);
    let mut anim = AnimationParams::none();

    if flags.contains(AnimFlags::LINEAR) {
        anim = anim.with_linear(
            Vec3::new(block[0], block[1], block[2]),
            block[3],
            block[4],
            LinearMode::from_raw(block[5] as u8),
        );
    }
    if flags.contains(AnimFlags::ROTATE) {
        anim = anim.with_rotation(
            Vec3::new(block[6], block[7], block[8]),
            block[9],
            block[10],
            RotateMode::from_raw(block[5] as u8),
        );
    }
    if flags.contains(AnimFlags::PULSE) {
        anim = anim.with_pulse(
            block[11],
            block[12],
            PulseTarget::from_bits_truncate(block[13] as u8),
        );
    }

    anim
}

fn anim_block<'a>(params: &'a [f32], index: usize) -> Option<&'a [f32]> {
    let start = index * ANIM_PARAM_STRIDE;
    params.get(start..start + ANIM_PARAM_STRIDE)
}

/// Append a homogeneous point light batch, truncating at capacity. Returns
/// the number of lights ingested.
pub fn bulk_add_points(store: &mut LightStore, batch: &PointBatch) -> usize {
    let requested = batch.len();
    let available = store.points.capacity() - store.points.count();
    let count = requested.min(available);
    if count < requested {
        log::warn!(
            "point batch truncated from {} to {} (capacity {})",
            requested,
            count,
            store.points.capacity()
        );
    }

    for i in 0..count {
        let pi = i * VEC_STRIDE;
        let desc = PointLightDesc {
            position: Vec3::new(
                batch.positions[pi],
                batch.positions[pi + 1],
                batch.positions[pi + 2],
            ),
            radius: batch.positions[pi + 3],
            color: Vec3::new(batch.colors[pi], batch.colors[pi + 1], batch.colors[pi + 2]),
            intensity: batch.colors[pi + 3],
            decay: batch.decays[i],
        };

        let mut light = base_point(&desc);
        if let Some(flags) = batch.anim_flags {
            if let Some(block) = anim_block(batch.anim_params, i) {
                light.anim = decode_point_anim(flags[i], block);
                if light.anim.is_animated() {
                    store.has_animated = true;
                }
            }
        }
        store.points.push(light);
    }

    if count > 0 {
        store.ordering_stale = true;
    }
    count
}

/// Append a mixed-kind batch. Entries whose kind array is full are skipped
/// (their kind-specific parameter block is still consumed so later entries
/// stay aligned). Returns the total number ingested.
pub fn bulk_add_lights(store: &mut LightStore, batch: &MixedBatch) -> usize {
    let count = batch.len();
    let mut added = 0;
    let mut spot_cursor = 0;
    let mut rect_cursor = 0;

    for i in 0..count {
        let pi = i * VEC_STRIDE;
        let position = Vec3::new(
            batch.positions[pi],
            batch.positions[pi + 1],
            batch.positions[pi + 2],
        );
        let radius = batch.positions[pi + 3];
        let color = Vec3::new(batch.colors[pi], batch.colors[pi + 1], batch.colors[pi + 2]);
        let intensity = batch.colors[pi + 3];
        let decay = batch.decays[i];

        let anim = match batch.anim_flags {
            Some(flags) => anim_block(batch.anim_params, i).map(|block| (flags[i], block)),
            None => None,
        };

        match batch.kinds[i] {
            LightKind::Point => {
                let mut light = base_point(&PointLightDesc {
                    position,
                    radius,
                    color,
                    intensity,
                    decay,
                });
                if let Some((flags, effects)) = anim {
                    light.anim = decode_point_anim(flags, effects);
                }
                let is_animated = light.anim.is_animated();
                if store.points.push(light).is_some() {
                    store.has_animated |= is_animated;
                    added += 1;
                }
            }
            LightKind::Spot => {
                let start = spot_cursor * KIND_PARAM_STRIDE;
                spot_cursor += 1;
                let Some(block) = batch.spot_params.get(start..start + KIND_PARAM_STRIDE) else {
                    log::warn!("spot entry {} missing its parameter block; skipped", i);
                    continue;
                };
                let mut light = base_spot(&SpotLightDesc {
                    position,
                    radius,
                    color,
                    intensity,
                    decay,
                    direction: Vec3::new(block[0], block[1], block[2]),
                    angle: block[3],
                    penumbra: block[4],
                });
                if let Some((flags, effects)) = anim {
                    light.anim = decode_oriented_anim(flags, effects);
                }
                let is_animated = light.anim.is_animated();
                if store.spots.push(light).is_some() {
                    store.has_animated |= is_animated;
                    added += 1;
                }
            }
            LightKind::Rect => {
                let start = rect_cursor * KIND_PARAM_STRIDE;
                rect_cursor += 1;
                let Some(block) = batch.rect_params.get(start..start + KIND_PARAM_STRIDE) else {
                    log::warn!("rect entry {} missing its parameter block; skipped", i);
                    continue;
                };
                let mut light = base_rect(&RectLightDesc {
                    position,
                    radius,
                    color,
                    intensity,
                    decay,
                    width: block[0],
                    height: block[1],
                    normal: Vec3::new(block[2], block[3], block[4]),
                });
                if let Some((flags, effects)) = anim {
                    light.anim = decode_oriented_anim(flags, effects);
                }
                let is_animated = light.anim.is_animated();
                if store.rects.push(light).is_some() {
                    store.has_animated |= is_animated;
                    added += 1;
                }
            }
        }
    }

    if added > 0 {
        store.ordering_stale = true;
    }
    added
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lights::store_operations::{create_point, create_spot};

    fn store(capacity: usize) -> LightStore {
        LightStore::new(capacity).expect("alloc")
    }

    fn flat_positions(n: usize) -> Vec<f32> {
        (0..n)
            .flat_map(|i| {
                let f = i as f32;
                [f * 10.0, f, f * 20.0, 3.0 + f]
            })
            .collect()
    }

    fn flat_colors(n: usize) -> Vec<f32> {
        (0..n).flat_map(|i| [1.0, 0.5, 0.25, 1.0 + i as f32]).collect()
    }

    #[test]
    fn bulk_points_match_single_creation() {
        let n = 3;
        let positions = flat_positions(n);
        let colors = flat_colors(n);
        let decays = vec![2.0; n];

        let mut bulk_store = store(8);
        let ingested = bulk_add_points(
            &mut bulk_store,
            &PointBatch {
                positions: &positions,
                colors: &colors,
                decays: &decays,
                anim_flags: None,
                anim_params: &[],
            },
        );
        assert_eq!(ingested, n);

        let mut single_store = store(8);
        for i in 0..n {
            let pi = i * 4;
            create_point(
                &mut single_store,
                &PointLightDesc {
                    position: Vec3::new(positions[pi], positions[pi + 1], positions[pi + 2]),
                    radius: positions[pi + 3],
                    color: Vec3::new(colors[pi], colors[pi + 1], colors[pi + 2]),
                    intensity: colors[pi + 3],
                    decay: decays[i],
                },
            );
        }

        for (b, s) in bulk_store
            .points
            .live()
            .iter()
            .zip(single_store.points.live().iter())
        {
            assert_eq!(b.base_world_pos, s.base_world_pos);
            assert_eq!(b.base_color, s.base_color);
            assert_eq!(b.decay, s.decay);
            assert_eq!(b.morton, s.morton);
            assert_eq!(b.dirty, s.dirty);
        }
        assert!(bulk_store.ordering_stale);
    }

    #[test]
    fn bulk_points_truncate_at_capacity() {
        let n = 5;
        let positions = flat_positions(n);
        let colors = flat_colors(n);
        let decays = vec![1.0; n];

        let mut s = store(3);
        let ingested = bulk_add_points(
            &mut s,
            &PointBatch {
                positions: &positions,
                colors: &colors,
                decays: &decays,
                anim_flags: None,
                anim_params: &[],
            },
        );
        assert_eq!(ingested, 3);
        assert_eq!(s.points.count(), 3);
    }

    #[test]
    fn bulk_points_decode_animation_blocks() {
        let positions = flat_positions(1);
        let colors = flat_colors(1);
        let decays = vec![1.0];
        let flags = vec![(AnimFlags::CIRCULAR | AnimFlags::WAVE | AnimFlags::PULSE).bits()];
        #[rustfmt::skip]
        let params = vec![
            2.0, 5.0,                      // circular: speed, radius
            0.0, 2.0, 0.0, 3.0, 1.5, 0.25, // wave: axis, speed, amplitude, phase
            0.0, 0.0, 0.0,                 // flicker (unused)
            4.0, 0.5, 2.0,                 // pulse: speed, amount, target=RADIUS
        ];

        let mut s = store(4);
        bulk_add_points(
            &mut s,
            &PointBatch {
                positions: &positions,
                colors: &colors,
                decays: &decays,
                anim_flags: Some(&flags),
                anim_params: &params,
            },
        );

        let l = s.points.get(0).expect("live");
        assert_eq!(l.anim.circular.speed, 2.0);
        assert_eq!(l.anim.circular.radius, 5.0);
        // Wave axis arrives normalized.
        assert!((l.anim.wave.axis - Vec3::Y).length() < 1e-6);
        assert_eq!(l.anim.wave.amplitude, 1.5);
        assert_eq!(l.anim.pulse.target, PulseTarget::RADIUS);
        assert!(!l.anim.flags.contains(AnimFlags::FLICKER));
        assert!(s.has_animated);
    }

    #[test]
    fn mixed_batch_routes_kinds_to_arrays() {
        let kinds = [LightKind::Point, LightKind::Spot, LightKind::Rect, LightKind::Point];
        let n = kinds.len();
        let positions = flat_positions(n);
        let colors = flat_colors(n);
        let decays = vec![1.0; n];
        let spot_params = [0.0, -1.0, 0.0, 0.7, 0.1, 0.0];
        let rect_params = [2.0, 4.0, 0.0, 0.0, 1.0, 0.0];

        let mut s = store(8);
        let ingested = bulk_add_lights(
            &mut s,
            &MixedBatch {
                kinds: &kinds,
                positions: &positions,
                colors: &colors,
                decays: &decays,
                anim_flags: None,
                anim_params: &[],
                spot_params: &spot_params,
                rect_params: &rect_params,
            },
        );

        assert_eq!(ingested, 4);
        assert_eq!(s.points.count(), 2);
        assert_eq!(s.spots.count(), 1);
        assert_eq!(s.rects.count(), 1);

        let spot = s.spots.get(0).expect("live");
        assert!((spot.direction.truncate() - Vec3::new(0.0, -1.0, 0.0)).length() < 1e-6);
        assert_eq!(spot.angle, 0.7);

        let rect = s.rects.get(0).expect("live");
        assert_eq!(rect.size.x, 2.0);
        assert_eq!(rect.size.y, 4.0);
        // Basis built exactly as single creation does.
        assert!((rect.normal.truncate() - Vec3::Z).length() < 1e-6);
        assert!(rect.tangent.truncate().dot(rect.normal.truncate()).abs() < 1e-6);
    }

    #[test]
    fn mixed_batch_matches_single_creation_for_spots() {
        let kinds = [LightKind::Spot];
        let positions = flat_positions(1);
        let colors = flat_colors(1);
        let decays = vec![1.5];
        let spot_params = [3.0, 0.0, 0.0, 0.9, 0.2, 0.0];

        let mut bulk_store = store(4);
        bulk_add_lights(
            &mut bulk_store,
            &MixedBatch {
                kinds: &kinds,
                positions: &positions,
                colors: &colors,
                decays: &decays,
                anim_flags: None,
                anim_params: &[],
                spot_params: &spot_params,
                rect_params: &[],
            },
        );

        let mut single_store = store(4);
        create_spot(
            &mut single_store,
            &SpotLightDesc {
                position: Vec3::new(positions[0], positions[1], positions[2]),
                radius: positions[3],
                color: Vec3::new(colors[0], colors[1], colors[2]),
                intensity: colors[3],
                decay: 1.5,
                direction: Vec3::new(3.0, 0.0, 0.0),
                angle: 0.9,
                penumbra: 0.2,
            },
        );

        let b = bulk_store.spots.get(0).expect("live");
        let s = single_store.spots.get(0).expect("live");
        // Direction normalized in both paths.
        assert_eq!(b.direction, s.direction);
        assert_eq!(b.base_world_pos, s.base_world_pos);
        assert_eq!(b.angle, s.angle);
        assert_eq!(b.morton, s.morton);
    }

    #[test]
    fn oriented_anim_decode_shares_mode_slot() {
        let kinds = [LightKind::Spot];
        let positions = flat_positions(1);
        let colors = flat_colors(1);
        let decays = vec![1.0];
        let flags = vec![(AnimFlags::LINEAR | AnimFlags::ROTATE).bits()];
        #[rustfmt::skip]
        let params = vec![
            4.0, 0.0, 0.0, 2.0, 0.5, 1.0, // linear: target, duration, delay, mode=Loop
            0.0, 1.0, 0.0, 3.0, 0.8,      // rotation: axis, speed, angle
            0.0, 0.0, 0.0,                // pulse (unused)
        ];
        let spot_params = [0.0, 0.0, -1.0, 0.6, 0.1, 0.0];

        let mut s = store(4);
        bulk_add_lights(
            &mut s,
            &MixedBatch {
                kinds: &kinds,
                positions: &positions,
                colors: &colors,
                decays: &decays,
                anim_flags: Some(&flags),
                anim_params: &params,
                spot_params: &spot_params,
                rect_params: &[],
            },
        );

        let l = s.spots.get(0).expect("live");
        assert_eq!(l.anim.linear.mode, LinearMode::Loop);
        // Rotation mode decodes from the shared slot: raw 1 -> Swing.
        assert_eq!(l.anim.rotation.mode, RotateMode::Swing);
        assert_eq!(l.anim.rotation.speed, 3.0);
        assert!((l.anim.rotation.axis - Vec3::Y).length() < 1e-6);
    }

    #[test]
    fn full_kind_is_skipped_without_breaking_alignment() {
        let kinds = [LightKind::Spot, LightKind::Spot];
        let positions = flat_positions(2);
        let colors = flat_colors(2);
        let decays = vec![1.0; 2];
        // First spot aims +X, second aims -Z.
        let spot_params = [1.0, 0.0, 0.0, 0.5, 0.1, 0.0, 0.0, 0.0, -1.0, 0.9, 0.2, 0.0];

        let mut s = store(1);
        let ingested = bulk_add_lights(
            &mut s,
            &MixedBatch {
                kinds: &kinds,
                positions: &positions,
                colors: &colors,
                decays: &decays,
                anim_flags: None,
                anim_params: &[],
                spot_params: &spot_params,
                rect_params: &[],
            },
        );

        assert_eq!(ingested, 1);
        assert_eq!(s.spots.count(), 1);
        let l = s.spots.get(0).expect("live");
        assert!((l.direction.truncate() - Vec3::X).length() < 1e-6);
    }
}
