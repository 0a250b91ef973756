//! Composable per-light animation: a flag set of independent effects plus one
//! parameter block per effect, evaluated against absolute time each frame.

pub mod animation_data;
pub mod animation_operations;

pub use animation_data::{
    AnimFlags, AnimationParams, CircularParams, FlickerParams, LinearMode, LinearParams,
    PulseParams, PulseTarget, RotateMode, RotationParams, WaveParams,
};
pub use animation_operations::{animate_point, animate_rect, animate_spot};
