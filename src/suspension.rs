// ==============================================================================
// suspension.rs — HEIGHT-FIELD SUSPENSION + CONTACT
// ------------------------------------------------------------------------------
// Per wheel, against a scalar ground height under the wheel:
//
//   rest_bottom  = chassis_y + mount_height − tire_radius − rest_length
//   compression  = clamp(ground − rest_bottom, 0, max_travel)
//   velocity     = (compression − previous_compression) / dt
//   force        = max(0, k·compression + c·velocity)      (upward)
//   contact      = compression > 0
//
// previous_compression starts at 0 when the tire is built, so the first
// substep sees the full static compression as a velocity and the damper
// kicks once. That settles within a second with the stock presets.
// ==============================================================================

use crate::tire::state::TireState;
use crate::vehicle::VehicleConfig;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SuspensionOutput {
    pub compression: f32,
    pub velocity: f32,
    pub force: f32,
    pub contact: bool,
}

/// Spring + damper, never pulling the chassis toward the ground.
pub(crate) fn compute_suspension_force(compression: f32, velocity: f32, k: f32, c: f32) -> f32 {
    let spring = k * compression;
    let damper = c * velocity;
    (spring + damper).max(0.0)
}

/// Bottom of the tire at full extension, in world Y.
#[inline]
pub fn rest_bottom(cfg: &VehicleConfig, chassis_y: f32, mount_y: f32) -> f32 {
    chassis_y + mount_y - cfg.tire.radius - cfg.suspension.rest_length
}

/// Update one wheel's suspension from the ground height under it.
pub fn update_suspension(
    cfg: &VehicleConfig,
    tire: &mut TireState,
    chassis_y: f32,
    ground_height: f32,
    dt: f32,
) -> SuspensionOutput {
    let s = &cfg.suspension;

    let bottom = rest_bottom(cfg, chassis_y, tire.mount.y);
    let compression = (ground_height - bottom).clamp(0.0, s.max_travel);
    let compression = if compression.is_finite() { compression } else { 0.0 };

    let velocity = if dt > 0.0 { (compression - tire.previous_compression) / dt } else { 0.0 };

    let force = compute_suspension_force(compression, velocity, s.spring_rate, s.damper_rate);
    let contact = compression > 0.0;

    tire.previous_compression = compression;
    tire.compression = compression;
    tire.compression_velocity = velocity;
    tire.suspension_force = force;
    tire.contact = contact;

    SuspensionOutput { compression, velocity, force, contact }
}
