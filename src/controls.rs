use serde::{Deserialize, Serialize};

/// Driver input for one external update. Out-of-range values are clamped on
/// ingestion, never rejected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Controls {
    pub throttle: f32,  // 0..1
    pub brake: f32,     // 0..1
    pub handbrake: f32, // 0..1
    pub steer: f32,     // -1..1, positive turns toward +X
    pub gear_up: bool,
    pub gear_down: bool,
}

#[inline]
fn clamp_or_zero(v: f32, min: f32, max: f32) -> f32 {
    if v.is_nan() { 0.0 } else { v.clamp(min, max) }
}

impl Controls {
    pub fn clamped(self) -> Self {
        Self {
            throttle: clamp_or_zero(self.throttle, 0.0, 1.0),
            brake: clamp_or_zero(self.brake, 0.0, 1.0),
            handbrake: clamp_or_zero(self.handbrake, 0.0, 1.0),
            steer: clamp_or_zero(self.steer, -1.0, 1.0),
            ..self
        }
    }
}
