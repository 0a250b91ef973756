//! Error handling for the light engine.
//!
//! The runtime contract is permissive-silent: invalid indices are no-ops on
//! mutation and return defaults on query. Hard errors exist only at
//! initialization, where a misconfigured or unallocatable engine must not be
//! handed to the host.

use thiserror::Error;

/// Errors surfaced by engine initialization.
#[derive(Debug, Error)]
pub enum LightError {
    #[error("invalid light capacity {capacity}: must be at least 1")]
    InvalidCapacity { capacity: usize },

    #[error("allocation of {bytes} bytes for {what} failed")]
    AllocationFailed { what: &'static str, bytes: usize },

    #[error("invalid view frustum: near {near} must be positive and less than far {far}")]
    InvalidFrustum { near: f32, far: f32 },
}

pub type LightResult<T> = Result<T, LightError>;
