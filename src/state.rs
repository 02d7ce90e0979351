use serde::{Deserialize, Serialize};

use crate::controls::Controls;
use crate::drivetrain::DrivetrainState;
use crate::math::Vec3;
use crate::tire::{GripState, Surface, TireState, WheelId};

/// Mutable chassis state. One per car, never shared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleState {
    pub position: Vec3,         // world, chassis reference point
    pub yaw: f32,               // rad, positive turns +Z toward +X
    pub velocity: Vec3,         // world, m/s
    pub angular_velocity: Vec3, // rad/s, only Y is integrated

    // per-substep accumulators
    pub force: Vec3,
    pub torque: Vec3,
    /// Horizontal acceleration of the last substep, body frame (x left, z forward).
    pub acceleration: Vec3,

    pub steer_angle: f32, // rate-limited rack angle
    pub wheel_angle: f32, // speed-scaled road-wheel angle
    pub drivetrain: DrivetrainState,

    /// Unconsumed time, always in [0, FIXED_TIME_STEP).
    pub accumulator: f32,
    /// Last applied (clamped) controls.
    pub controls: Controls,
}

/// Everything needed to resume a car bit-for-bit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarState {
    pub vehicle: VehicleState,
    pub tires: [TireState; 4],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TireSnapshot {
    pub wheel: WheelId,
    pub compression: f32,
    pub load: f32,
    pub slip_angle: f32,
    pub slip_ratio: f32,
    pub skidding: bool,
    pub contact: bool,
    pub surface: Surface,
    pub grip: GripState,
    pub angular_velocity: f32,
}

impl From<&TireState> for TireSnapshot {
    fn from(t: &TireState) -> Self {
        Self {
            wheel: t.wheel,
            compression: t.compression,
            load: t.load,
            slip_angle: t.slip_angle,
            slip_ratio: t.slip_ratio,
            skidding: t.skidding,
            contact: t.contact,
            surface: t.surface,
            grip: t.grip,
            angular_velocity: t.angular_velocity,
        }
    }
}

/// Read-only copy of a car for renderers, HUDs and audio.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CarSnapshot {
    pub position: [f32; 3],
    pub yaw: f32,
    pub velocity: [f32; 3],
    pub angular_velocity: [f32; 3],
    pub speed: f32, // m/s
    pub engine_rpm: f32,
    pub gear: i8,
    pub clutch: f32,
    pub steer_angle: f32,
    pub wheel_angle: f32,
    pub tires: [TireSnapshot; 4],
}

#[inline]
fn arr(v: &Vec3) -> [f32; 3] {
    [v.x, v.y, v.z]
}

impl CarSnapshot {
    pub fn capture(vehicle: &VehicleState, tires: &[TireState; 4]) -> Self {
        Self {
            position: arr(&vehicle.position),
            yaw: vehicle.yaw,
            velocity: arr(&vehicle.velocity),
            angular_velocity: arr(&vehicle.angular_velocity),
            speed: vehicle.velocity.norm(),
            engine_rpm: vehicle.drivetrain.engine_rpm,
            gear: vehicle.drivetrain.gear,
            clutch: vehicle.drivetrain.clutch,
            steer_angle: vehicle.steer_angle,
            wheel_angle: vehicle.wheel_angle,
            tires: tires.each_ref().map(TireSnapshot::from),
        }
    }

    pub fn tire(&self, wheel: WheelId) -> &TireSnapshot {
        &self.tires[wheel.index()]
    }
}
