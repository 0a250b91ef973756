//! Flat batch descriptors for bulk ingestion.
//!
//! Layouts per light:
//! - positions / colors: 4 floats (xyz + radius / rgb + intensity)
//! - animation block: 14 floats, shared across kinds:
//!   point lights read [circular(2) | wave(6) | flicker(3) | pulse(3)];
//!   spot/rect lights read [linear(6: target xyz, duration, delay, mode) |
//!   rotation(5: axis xyz, speed, angle) | pulse(3)], with the rotation mode
//!   sharing the linear mode slot.
//! - kind-specific block (spot/rect only): 6 floats,
//!   spot = [dir xyz, angle, penumbra, pad], rect = [width, height,
//!   normal xyz, pad], consumed in order of appearance of that kind.

use crate::constants::bulk::{ANIM_PARAM_STRIDE, VEC_STRIDE};
use crate::lights::light_data::LightKind;

/// Homogeneous point light batch.
#[derive(Debug, Clone, Copy)]
pub struct PointBatch<'a> {
    pub positions: &'a [f32],
    pub colors: &'a [f32],
    pub decays: &'a [f32],
    /// Raw animation flag bits per light; `None` means no entry is animated.
    pub anim_flags: Option<&'a [u32]>,
    /// Packed animation parameters; may be empty when `anim_flags` is `None`.
    pub anim_params: &'a [f32],
}

impl<'a> PointBatch<'a> {
    /// Number of complete entries across all supplied arrays.
    pub fn len(&self) -> usize {
        let mut n = (self.positions.len() / VEC_STRIDE)
            .min(self.colors.len() / VEC_STRIDE)
            .min(self.decays.len());
        if let Some(flags) = self.anim_flags {
            n = n.min(flags.len());
            n = n.min(self.anim_params.len() / ANIM_PARAM_STRIDE);
        }
        n
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Mixed-kind batch with a kind tag per entry.
#[derive(Debug, Clone, Copy)]
pub struct MixedBatch<'a> {
    pub kinds: &'a [LightKind],
    pub positions: &'a [f32],
    pub colors: &'a [f32],
    pub decays: &'a [f32],
    pub anim_flags: Option<&'a [u32]>,
    pub anim_params: &'a [f32],
    /// Six floats per spot entry, in order of appearance.
    pub spot_params: &'a [f32],
    /// Six floats per rect entry, in order of appearance.
    pub rect_params: &'a [f32],
}

impl<'a> MixedBatch<'a> {
    pub fn len(&self) -> usize {
        let mut n = self
            .kinds
            .len()
            .min(self.positions.len() / VEC_STRIDE)
            .min(self.colors.len() / VEC_STRIDE)
            .min(self.decays.len());
        if let Some(flags) = self.anim_flags {
            n = n.min(flags.len());
            n = n.min(self.anim_params.len() / ANIM_PARAM_STRIDE);
        }
        n
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn len_is_bounded_by_shortest_array() {
        let positions = [0.0f32; 12]; // 3 entries
        let colors = [0.0f32; 8]; // 2 entries
        let decays = [1.0f32; 3];
        let batch = PointBatch {
            positions: &positions,
            colors: &colors,
            decays: &decays,
            anim_flags: None,
            anim_params: &[],
        };
        assert_eq!(batch.len(), 2);
    }

    #[test]
    fn len_accounts_for_anim_blocks_when_flagged() {
        let positions = [0.0f32; 8];
        let colors = [0.0f32; 8];
        let decays = [1.0f32; 2];
        let flags = [0u32; 2];
        let params = [0.0f32; 14]; // one block only
        let batch = PointBatch {
            positions: &positions,
            colors: &colors,
            decays: &decays,
            anim_flags: Some(&flags),
            anim_params: &params,
        };
        assert_eq!(batch.len(), 1);
    }
}
