//! Animation descriptor data. No evaluation logic here; see
//! `animation_operations`.

use glam::Vec3;
use serde::{Deserialize, Serialize};

bitflags::bitflags! {
    /// Independently combinable animation effects.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct AnimFlags: u32 {
        const CIRCULAR = 0x01;
        const LINEAR   = 0x02;
        const WAVE     = 0x04;
        const FLICKER  = 0x08;
        const PULSE    = 0x10;
        const ROTATE   = 0x20;
    }
}

bitflags::bitflags! {
    /// Which attributes a pulse effect modulates.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct PulseTarget: u8 {
        const INTENSITY = 0x01;
        const RADIUS    = 0x02;
    }
}

impl Serialize for AnimFlags {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.bits())
    }
}

impl<'de> Deserialize<'de> for AnimFlags {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(AnimFlags::from_bits_truncate(u32::deserialize(deserializer)?))
    }
}

impl Serialize for PulseTarget {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.bits())
    }
}

impl<'de> Deserialize<'de> for PulseTarget {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(PulseTarget::from_bits_truncate(u8::deserialize(deserializer)?))
    }
}

/// How a linear translation remaps time past its duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LinearMode {
    #[default]
    Once,
    Loop,
    PingPong,
}

impl LinearMode {
    /// Decode from the raw slot used in packed parameter blocks.
    pub fn from_raw(raw: u8) -> Self {
        match raw {
            1 => LinearMode::Loop,
            2 => LinearMode::PingPong,
            _ => LinearMode::Once,
        }
    }
}

/// Whether a rotation winds continuously or oscillates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RotateMode {
    #[default]
    Continuous,
    Swing,
}

impl RotateMode {
    pub fn from_raw(raw: u8) -> Self {
        match raw {
            1 => RotateMode::Swing,
            _ => RotateMode::Continuous,
        }
    }
}

/// Horizontal orbit around the base position.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct CircularParams {
    pub speed: f32,
    pub radius: f32,
}

/// Timed translation from the base position toward a world-space target.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct LinearParams {
    pub target: Vec3,
    pub duration: f32,
    pub delay: f32,
    pub mode: LinearMode,
}

/// Sinusoidal displacement along a unit axis.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct WaveParams {
    pub axis: Vec3,
    pub speed: f32,
    pub amplitude: f32,
    pub phase: f32,
}

/// Two-term sinusoidal intensity modulation.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct FlickerParams {
    pub speed: f32,
    pub intensity: f32,
    pub seed: f32,
}

/// Sinusoidal intensity and/or radius modulation.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PulseParams {
    pub speed: f32,
    pub amount: f32,
    pub target: PulseTarget,
}

/// Axis-angle rotation of direction/normal frames (and spot positions).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct RotationParams {
    pub axis: Vec3,
    pub speed: f32,
    /// Peak deflection for `Swing` mode, radians.
    pub max_angle: f32,
    pub mode: RotateMode,
}

/// Full animation descriptor: a flag set plus one parameter block per effect.
/// All blocks are always present; only the flagged ones are meaningful.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct AnimationParams {
    pub flags: AnimFlags,
    pub circular: CircularParams,
    pub linear: LinearParams,
    pub wave: WaveParams,
    pub flicker: FlickerParams,
    pub pulse: PulseParams,
    pub rotation: RotationParams,
}

impl AnimationParams {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_animated(&self) -> bool {
        !self.flags.is_empty()
    }

    pub fn with_circular(mut self, speed: f32, radius: f32) -> Self {
        self.flags |= AnimFlags::CIRCULAR;
        self.circular = CircularParams { speed, radius };
        self
    }

    pub fn with_linear(mut self, target: Vec3, duration: f32, delay: f32, mode: LinearMode) -> Self {
        self.flags |= AnimFlags::LINEAR;
        self.linear = LinearParams {
            target,
            duration,
            delay,
            mode,
        };
        self
    }

    pub fn with_wave(mut self, axis: Vec3, speed: f32, amplitude: f32, phase: f32) -> Self {
        self.flags |= AnimFlags::WAVE;
        self.wave = WaveParams {
            axis: axis.normalize_or_zero(),
            speed,
            amplitude,
            phase,
        };
        self
    }

    pub fn with_flicker(mut self, speed: f32, intensity: f32, seed: f32) -> Self {
        self.flags |= AnimFlags::FLICKER;
        self.flicker = FlickerParams {
            speed,
            intensity,
            seed,
        };
        self
    }

    pub fn with_pulse(mut self, speed: f32, amount: f32, target: PulseTarget) -> Self {
        self.flags |= AnimFlags::PULSE;
        self.pulse = PulseParams {
            speed,
            amount,
            target,
        };
        self
    }

    pub fn with_rotation(mut self, axis: Vec3, speed: f32, max_angle: f32, mode: RotateMode) -> Self {
        self.flags |= AnimFlags::ROTATE;
        self.rotation = RotationParams {
            axis: axis.normalize_or_zero(),
            speed,
            max_angle,
            mode,
        };
        self
    }

    /// Normalize effect axes supplied by the host. Degenerate axes become
    /// zero vectors, turning the corresponding effect into a no-op.
    pub(crate) fn sanitize(&mut self) {
        self.wave.axis = self.wave.axis.normalize_or_zero();
        self.rotation.axis = self.rotation.axis.normalize_or_zero();
    }
}
