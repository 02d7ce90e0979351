// ==============================================================================
// load.rs — STATIC LOAD + WEIGHT TRANSFER
// ------------------------------------------------------------------------------
// Fz = m·g/4  ∓ m·a_long·h/(2·L)  ∓ m·a_lat·h/(2·T)
//
// - a_long > 0 (accelerating) moves load off the front axle onto the rear.
// - a_lat points toward the centre of the turn (+X = left); load moves to the
//   wheels on the other side.
// Both accelerations are body-frame. The result is clamped at zero so a
// wheel can go light but never pull the car down.
// ==============================================================================

use crate::tire::types::WheelId;
use crate::vehicle::{GRAVITY, VehicleConfig};

/// Body-frame horizontal acceleration used for load transfer (m/s²).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LoadInputs {
    pub longitudinal: f32, // +forward
    pub lateral: f32,      // +left (toward +X)
}

pub fn wheel_load(cfg: &VehicleConfig, wheel: WheelId, accel: LoadInputs) -> f32 {
    let c = &cfg.chassis;
    let static_load = c.mass * GRAVITY / 4.0;

    let long_transfer = c.mass * accel.longitudinal * c.cg_height / (2.0 * c.wheelbase);
    let lat_transfer = c.mass * accel.lateral * c.cg_height / (2.0 * c.track_width);

    let long = if wheel.is_front() { -long_transfer } else { long_transfer };
    let lat = if wheel.is_left() { -lat_transfer } else { lat_transfer };

    (static_load + long + lat).max(0.0)
}
