//! Spatial ordering: Morton keys and the radix sort that applies them.
//!
//! Lights are kept in ascending Morton-code order so that spatially-near
//! lights stay contiguous in memory for the render consumer's access pattern.

pub mod morton;
pub mod radix_operations;

pub use morton::morton_2d;
pub use radix_operations::{radix_sort_by_morton, MortonKeyed};
