//! Per-frame pipeline: animate, transform to view space, LOD, cull, pack.
//!
//! Two execution paths produce identical output buffers: a 4-wide batched
//! path used for point lights and a one-at-a-time scalar path. A third,
//! positions-only path trades per-light decay/visibility fidelity for
//! throughput on mass uniform lights.

pub mod batch_operations;
pub mod gpu_data;
pub mod update_operations;

pub use gpu_data::{PointLightGpu, RectLightGpu, SpotLightGpu, ViewBasis};
pub use update_operations::FrameContext;
