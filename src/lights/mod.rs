//! Authoritative light data: per-kind records, the fixed-capacity store, and
//! the mutation operations over it.

pub mod light_data;
pub mod store_data;
pub mod store_operations;

pub use light_data::{
    DirtyFlags, LightKind, LightRecord, LodLevel, PointLight, PointLightDesc, RectLight,
    RectLightDesc, SpotLight, SpotLightDesc,
};
pub use store_data::{LightArray, LightStore};
