//! Bulk ingestion: flat parallel parameter arrays, one call for N lights.
//!
//! Exists purely to amortize cross-boundary call cost when populating
//! thousands of lights; every entry gets exactly the same initialization as
//! the single-light creation paths.

pub mod bulk_data;
pub mod bulk_operations;

pub use bulk_data::{MixedBatch, PointBatch};
pub use bulk_operations::{bulk_add_lights, bulk_add_points};
