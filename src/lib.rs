//! Lantern Engine - per-frame update engine for large dynamic light sets.
//!
//! Owns the authoritative light data for thousands of point, spot and rect
//! lights, animates it over time, transforms it into camera view space,
//! assigns an LOD tier and visibility per light, keeps the arrays in
//! cache-friendly Morton order, and packs results into flat `#[repr(C)]`
//! buffers the host uploads directly to the GPU.
//!
//! Data-oriented layout: `*_data` modules hold plain structs, `*_operations`
//! modules hold the pure transformations over them. [`LightEngine`] is the
//! explicit context tying store, pipeline and output buffers together - there
//! is no global state.
//!
//! ```
//! use glam::{Mat4, Vec3};
//! use lantern_engine::{LightEngine, PointLightDesc};
//!
//! let mut engine = LightEngine::with_capacity(256).unwrap();
//! engine.add_point(&PointLightDesc {
//!     position: Vec3::new(0.0, 2.0, 0.0),
//!     radius: 5.0,
//!     color: Vec3::ONE,
//!     intensity: 2.0,
//!     decay: 2.0,
//! });
//! engine.set_view_matrix(Mat4::from_translation(Vec3::new(0.0, 0.0, -20.0)));
//! engine.sort();
//! engine.update(0.0);
//! let records = engine.point_gpu_data();
//! assert_eq!(records.len(), 1);
//! ```

pub mod animation;
pub mod bulk;
pub mod constants;
pub mod error;
pub mod frame;
pub mod lights;
pub mod math;
pub mod spatial;

use glam::{Mat4, Vec3};

use crate::frame::batch_operations::{update_points_batched, update_points_positions_only};
use crate::frame::gpu_data::ViewBasis;
use crate::frame::update_operations::{
    update_points_scalar, update_rects, update_spots, FrameContext,
};
use crate::lights::store_data::LightStore;
use crate::lights::store_operations as store_ops;
use crate::spatial::radix_sort_by_morton;

pub use animation::{
    AnimFlags, AnimationParams, CircularParams, FlickerParams, LinearMode, LinearParams,
    PulseParams, PulseTarget, RotateMode, RotationParams, WaveParams,
};
pub use bulk::{MixedBatch, PointBatch};
pub use error::{LightError, LightResult};
pub use frame::{PointLightGpu, RectLightGpu, SpotLightGpu};
pub use lights::{
    DirtyFlags, LightKind, LodLevel, PointLight, PointLightDesc, RectLight, RectLightDesc,
    SpotLight, SpotLightDesc,
};

/// Engine configuration. Capacity applies per light kind and is fixed for the
/// engine's lifetime; output buffer slices stay valid for the whole session.
#[derive(Debug, Clone, Copy)]
pub struct LightEngineConfig {
    pub capacity: usize,
    pub view_near: f32,
    pub view_far: f32,
    pub lod_bias: f32,
}

impl Default for LightEngineConfig {
    fn default() -> Self {
        Self {
            capacity: constants::defaults::CAPACITY,
            view_near: constants::defaults::VIEW_NEAR,
            view_far: constants::defaults::VIEW_FAR,
            lod_bias: constants::defaults::LOD_BIAS,
        }
    }
}

impl LightEngineConfig {
    pub fn validate(&self) -> LightResult<()> {
        if self.capacity == 0 {
            return Err(LightError::InvalidCapacity { capacity: 0 });
        }
        if !(self.view_near > 0.0 && self.view_near < self.view_far) {
            return Err(LightError::InvalidFrustum {
                near: self.view_near,
                far: self.view_far,
            });
        }
        Ok(())
    }
}

/// The light update engine. All operations are synchronous and
/// single-threaded; every call runs to completion in O(live light count).
#[derive(Debug)]
pub struct LightEngine {
    store: LightStore,
    point_out: Box<[PointLightGpu]>,
    spot_out: Box<[SpotLightGpu]>,
    rect_out: Box<[RectLightGpu]>,
    view_matrix: Mat4,
    view_near: f32,
    view_far: f32,
    lod_bias: f32,
    batched: bool,
}

fn alloc_out<T: Default + Clone>(capacity: usize, what: &'static str) -> LightResult<Box<[T]>> {
    let mut out = Vec::new();
    out.try_reserve_exact(capacity)
        .map_err(|_| LightError::AllocationFailed {
            what,
            bytes: capacity * std::mem::size_of::<T>(),
        })?;
    out.resize(capacity, T::default());
    Ok(out.into_boxed_slice())
}

impl LightEngine {
    /// Allocate all light arrays, scratch buffers and output buffers for
    /// `config.capacity` lights per kind. Allocation failure is a hard error;
    /// nothing is handed out half-initialized.
    pub fn new(config: LightEngineConfig) -> LightResult<Self> {
        config.validate()?;

        let engine = Self {
            store: LightStore::new(config.capacity)?,
            point_out: alloc_out(config.capacity, "point output buffer")?,
            spot_out: alloc_out(config.capacity, "spot output buffer")?,
            rect_out: alloc_out(config.capacity, "rect output buffer")?,
            view_matrix: Mat4::IDENTITY,
            view_near: config.view_near,
            view_far: config.view_far,
            lod_bias: config.lod_bias,
            batched: true,
        };

        log::info!(
            "light engine initialized: capacity {} per kind, frustum {}..{}",
            config.capacity,
            config.view_near,
            config.view_far
        );
        Ok(engine)
    }

    pub fn with_capacity(capacity: usize) -> LightResult<Self> {
        Self::new(LightEngineConfig {
            capacity,
            ..Default::default()
        })
    }

    /// Drop all lights and bookkeeping, keeping allocations.
    pub fn reset(&mut self) {
        self.store.reset();
    }

    // ------------------------------------------------------------------
    // Creation
    // ------------------------------------------------------------------

    /// Create a static point light. `None` means capacity is exhausted.
    pub fn add_point(&mut self, desc: &PointLightDesc) -> Option<usize> {
        store_ops::create_point(&mut self.store, desc)
    }

    pub fn add_point_animated(
        &mut self,
        desc: &PointLightDesc,
        anim: AnimationParams,
    ) -> Option<usize> {
        store_ops::create_point_animated(&mut self.store, desc, anim)
    }

    /// Minimal-init point creation for mass loads (fixed unit decay).
    pub fn add_point_fast(
        &mut self,
        position: Vec3,
        radius: f32,
        color: Vec3,
        intensity: f32,
    ) -> Option<usize> {
        store_ops::create_point_fast(&mut self.store, position, radius, color, intensity)
    }

    pub fn add_spot(&mut self, desc: &SpotLightDesc) -> Option<usize> {
        store_ops::create_spot(&mut self.store, desc)
    }

    pub fn add_spot_animated(
        &mut self,
        desc: &SpotLightDesc,
        anim: AnimationParams,
    ) -> Option<usize> {
        store_ops::create_spot_animated(&mut self.store, desc, anim)
    }

    pub fn add_rect(&mut self, desc: &RectLightDesc) -> Option<usize> {
        store_ops::create_rect(&mut self.store, desc)
    }

    pub fn add_rect_animated(
        &mut self,
        desc: &RectLightDesc,
        anim: AnimationParams,
    ) -> Option<usize> {
        store_ops::create_rect_animated(&mut self.store, desc, anim)
    }

    /// Append a flat point light batch; returns the number ingested, which
    /// is less than the batch length when capacity truncates it.
    pub fn bulk_add_points(&mut self, batch: &PointBatch) -> usize {
        bulk::bulk_add_points(&mut self.store, batch)
    }

    /// Append a mixed-kind batch; returns the total number ingested.
    pub fn bulk_add_lights(&mut self, batch: &MixedBatch) -> usize {
        bulk::bulk_add_lights(&mut self.store, batch)
    }

    // ------------------------------------------------------------------
    // Removal and slot reuse
    // ------------------------------------------------------------------

    /// Remove a light by compacting shift; later indices move down by one.
    /// Out-of-range indices are no-ops.
    pub fn remove(&mut self, kind: LightKind, index: usize) {
        match kind {
            LightKind::Point => store_ops::remove_point(&mut self.store, index),
            LightKind::Spot => store_ops::remove_spot(&mut self.store, index),
            LightKind::Rect => store_ops::remove_rect(&mut self.store, index),
        }
    }

    /// Directly set a kind's live count for host-driven slot reuse.
    pub fn set_count(&mut self, kind: LightKind, count: usize) {
        match kind {
            LightKind::Point => self.store.points.set_count(count),
            LightKind::Spot => self.store.spots.set_count(count),
            LightKind::Rect => self.store.rects.set_count(count),
        }
    }

    // ------------------------------------------------------------------
    // Attribute setters (generic over kind; silent no-op on bad index)
    // ------------------------------------------------------------------

    /// Move a light's authored position; recomputes its Morton key and marks
    /// the spatial ordering stale.
    pub fn set_position(&mut self, kind: LightKind, index: usize, position: Vec3) {
        let moved = match kind {
            LightKind::Point => store_ops::set_position(&mut self.store.points, index, position),
            LightKind::Spot => store_ops::set_position(&mut self.store.spots, index, position),
            LightKind::Rect => store_ops::set_position(&mut self.store.rects, index, position),
        };
        if moved {
            self.store.ordering_stale = true;
        }
    }

    pub fn set_color(&mut self, kind: LightKind, index: usize, color: Vec3) {
        match kind {
            LightKind::Point => store_ops::set_color(&mut self.store.points, index, color),
            LightKind::Spot => store_ops::set_color(&mut self.store.spots, index, color),
            LightKind::Rect => store_ops::set_color(&mut self.store.rects, index, color),
        }
    }

    pub fn set_intensity(&mut self, kind: LightKind, index: usize, intensity: f32) {
        match kind {
            LightKind::Point => store_ops::set_intensity(&mut self.store.points, index, intensity),
            LightKind::Spot => store_ops::set_intensity(&mut self.store.spots, index, intensity),
            LightKind::Rect => store_ops::set_intensity(&mut self.store.rects, index, intensity),
        }
    }

    pub fn set_radius(&mut self, kind: LightKind, index: usize, radius: f32) {
        let changed = match kind {
            LightKind::Point => store_ops::set_radius(&mut self.store.points, index, radius),
            LightKind::Spot => store_ops::set_radius(&mut self.store.spots, index, radius),
            LightKind::Rect => store_ops::set_radius(&mut self.store.rects, index, radius),
        };
        if changed {
            self.store.ordering_stale = true;
        }
    }

    pub fn set_decay(&mut self, kind: LightKind, index: usize, decay: f32) {
        match kind {
            LightKind::Point => store_ops::set_decay(&mut self.store.points, index, decay),
            LightKind::Spot => store_ops::set_decay(&mut self.store.spots, index, decay),
            LightKind::Rect => store_ops::set_decay(&mut self.store.rects, index, decay),
        }
    }

    pub fn set_visibility(&mut self, kind: LightKind, index: usize, visible: bool) {
        match kind {
            LightKind::Point => store_ops::set_visibility(&mut self.store.points, index, visible),
            LightKind::Spot => store_ops::set_visibility(&mut self.store.spots, index, visible),
            LightKind::Rect => store_ops::set_visibility(&mut self.store.rects, index, visible),
        }
    }

    /// Replace a light's animation descriptor.
    pub fn set_animation(&mut self, kind: LightKind, index: usize, anim: AnimationParams) {
        let now_animated = match kind {
            LightKind::Point => store_ops::set_animation(&mut self.store.points, index, anim),
            LightKind::Spot => store_ops::set_animation(&mut self.store.spots, index, anim),
            LightKind::Rect => store_ops::set_animation(&mut self.store.rects, index, anim),
        };
        if now_animated {
            self.store.has_animated = true;
        }
    }

    /// Re-aim a spot light. Degenerate directions are ignored.
    pub fn set_spot_direction(&mut self, index: usize, direction: Vec3) {
        store_ops::set_spot_direction(&mut self.store.spots, index, direction);
    }

    pub fn set_spot_angle(&mut self, index: usize, angle: f32, penumbra: f32) {
        store_ops::set_spot_angle(&mut self.store.spots, index, angle, penumbra);
    }

    pub fn set_rect_size(&mut self, index: usize, width: f32, height: f32) {
        store_ops::set_rect_size(&mut self.store.rects, index, width, height);
    }

    /// Re-orient a rect light, rebuilding its tangent frame. Degenerate
    /// normals are ignored.
    pub fn set_rect_normal(&mut self, index: usize, normal: Vec3) {
        store_ops::set_rect_normal(&mut self.store.rects, index, normal);
    }

    // ------------------------------------------------------------------
    // Frame API
    // ------------------------------------------------------------------

    /// Set the camera's view matrix for subsequent updates (column-major,
    /// world-to-view).
    pub fn set_view_matrix(&mut self, view: Mat4) {
        self.view_matrix = view;
    }

    pub fn view_matrix(&self) -> &Mat4 {
        &self.view_matrix
    }

    pub fn set_view_frustum(&mut self, near: f32, far: f32) {
        self.view_near = near;
        self.view_far = far;
    }

    /// Global LOD quality multiplier (default 1.0); larger values keep
    /// distant lights at higher tiers without touching per-light radii.
    pub fn set_lod_bias(&mut self, bias: f32) {
        self.lod_bias = bias;
    }

    pub fn lod_bias(&self) -> f32 {
        self.lod_bias
    }

    /// Select between the 4-wide batched point path and the scalar fallback.
    /// Both produce identical output; the toggle exists for benchmarking and
    /// verification.
    pub fn set_batched_updates(&mut self, batched: bool) {
        self.batched = batched;
    }

    /// Run the full per-frame pipeline for every live light:
    /// animate, transform to view space, LOD, cull, pack.
    ///
    /// Returns true when any animated light was re-evaluated this frame.
    pub fn update(&mut self, time: f32) -> bool {
        let ctx = FrameContext {
            basis: ViewBasis::from_matrix(&self.view_matrix),
            near: self.view_near,
            far: self.view_far,
            lod_bias: self.lod_bias,
        };

        let mut animated = false;

        let point_count = self.store.points.count();
        if point_count > 0 {
            let lights = self.store.points.live_mut();
            let out = &mut self.point_out[..point_count];
            animated |= if self.batched {
                update_points_batched(lights, out, &ctx, time)
            } else {
                update_points_scalar(lights, out, &ctx, time)
            };
        }

        let spot_count = self.store.spots.count();
        if spot_count > 0 {
            animated |= update_spots(
                self.store.spots.live_mut(),
                &mut self.spot_out[..spot_count],
                &ctx,
                time,
            );
        }

        let rect_count = self.store.rects.count();
        if rect_count > 0 {
            animated |= update_rects(
                self.store.rects.live_mut(),
                &mut self.rect_out[..rect_count],
                &ctx,
                time,
            );
        }

        animated
    }

    /// Positions-only mass update for point lights: packs a constant neutral
    /// decay/visibility word and skips LOD and culling. Spot and rect lights
    /// are untouched.
    pub fn update_positions_only(&mut self, time: f32) {
        let basis = ViewBasis::from_matrix(&self.view_matrix);
        let count = self.store.points.count();
        let has_animated = self.store.has_animated;
        update_points_positions_only(
            self.store.points.live_mut(),
            &mut self.point_out[..count],
            &basis,
            has_animated,
            time,
        );
    }

    /// Re-sort every kind by ascending Morton code, only if the ordering is
    /// stale. Indices returned by creation are invalidated by sorting.
    pub fn sort(&mut self) {
        if !self.store.ordering_stale {
            return;
        }

        let (points, scratch) = self.store.points.sort_pair();
        radix_sort_by_morton(points, scratch);
        let (spots, scratch) = self.store.spots.sort_pair();
        radix_sort_by_morton(spots, scratch);
        let (rects, scratch) = self.store.rects.sort_pair();
        radix_sort_by_morton(rects, scratch);

        self.store.ordering_stale = false;
        log::debug!(
            "re-sorted lights: {} point, {} spot, {} rect",
            self.store.points.count(),
            self.store.spots.count(),
            self.store.rects.count()
        );
    }

    // ------------------------------------------------------------------
    // Introspection (read-only; defaults on bad indices)
    // ------------------------------------------------------------------

    pub fn capacity(&self) -> usize {
        self.store.points.capacity()
    }

    pub fn point_count(&self) -> usize {
        self.store.points.count()
    }

    pub fn spot_count(&self) -> usize {
        self.store.spots.count()
    }

    pub fn rect_count(&self) -> usize {
        self.store.rects.count()
    }

    /// Packed per-frame point records, one per live light. Written only by
    /// `update`; the backing allocation stays put until the engine drops, so
    /// the host may bind it zero-copy.
    pub fn point_gpu_data(&self) -> &[PointLightGpu] {
        &self.point_out[..self.store.points.count()]
    }

    pub fn spot_gpu_data(&self) -> &[SpotLightGpu] {
        &self.spot_out[..self.store.spots.count()]
    }

    pub fn rect_gpu_data(&self) -> &[RectLightGpu] {
        &self.rect_out[..self.store.rects.count()]
    }

    pub fn point_light(&self, index: usize) -> Option<&PointLight> {
        self.store.points.get(index)
    }

    pub fn spot_light(&self, index: usize) -> Option<&SpotLight> {
        self.store.spots.get(index)
    }

    pub fn rect_light(&self, index: usize) -> Option<&RectLight> {
        self.store.rects.get(index)
    }

    /// Current LOD tier; `Skip` for out-of-range indices.
    pub fn light_lod(&self, kind: LightKind, index: usize) -> LodLevel {
        match kind {
            LightKind::Point => self.store.points.get(index).map(|l| l.lod_level),
            LightKind::Spot => self.store.spots.get(index).map(|l| l.lod_level),
            LightKind::Rect => self.store.rects.get(index).map(|l| l.lod_level),
        }
        .unwrap_or(LodLevel::Skip)
    }

    /// Animation flags; empty for out-of-range indices.
    pub fn light_anim_flags(&self, kind: LightKind, index: usize) -> AnimFlags {
        match kind {
            LightKind::Point => self.store.points.get(index).map(|l| l.anim.flags),
            LightKind::Spot => self.store.spots.get(index).map(|l| l.anim.flags),
            LightKind::Rect => self.store.rects.get(index).map(|l| l.anim.flags),
        }
        .unwrap_or(AnimFlags::empty())
    }

    pub fn has_animated_lights(&self) -> bool {
        self.store.has_animated
    }

    /// True when creation, removal or a position change has invalidated the
    /// Morton ordering and the next `sort` call will re-sort.
    pub fn needs_sort(&self) -> bool {
        self.store.ordering_stale
    }
}
