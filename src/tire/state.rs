// tire/state.rs
use serde::{Deserialize, Serialize};

use crate::math::Vec3;
use crate::tire::types::{Surface, WheelId};

/// Coarse grip classification, kept with hysteresis for skid audio/marks.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GripState {
    #[default]
    Grip,
    Slide,
    Lock,
}

/// `usage` is demanded / available force (> 1 means the friction circle clipped).
pub fn update_grip(prev: GripState, usage: f32, slip_ratio: f32, ground_speed: f32) -> GripState {
    // Locked wheel dominates: spinning backwards relative to the road
    if slip_ratio < -0.9 && ground_speed > 1.0 {
        return GripState::Lock;
    }

    if usage > 1.0 {
        return GripState::Slide;
    }

    // Recover logic
    match prev {
        GripState::Lock => {
            if slip_ratio > -0.5 || ground_speed < 0.5 {
                GripState::Grip
            } else {
                GripState::Lock
            }
        }
        GripState::Slide => {
            if usage < 0.7 {
                GripState::Grip
            } else {
                GripState::Slide
            }
        }
        GripState::Grip => GripState::Grip,
    }
}

/// Mutable per-wheel state. Four of these live inside every car.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TireState {
    pub wheel: WheelId,
    pub mount: Vec3,               // chassis-local mount point (m)

    // suspension
    pub compression: f32,          // m, 0..max_travel
    pub compression_velocity: f32, // m/s, positive while compressing
    pub previous_compression: f32, // m, last substep
    pub suspension_force: f32,     // N, upward

    // wheel
    pub angular_velocity: f32,     // rad/s, positive rolls forward
    pub road_speed: f32,           // m/s, contact point along the wheel heading

    // contact
    pub slip_angle: f32,           // rad
    pub slip_ratio: f32,           // dimensionless, (ωR - v) / |v|
    pub load: f32,                 // N, >= 0
    pub contact: bool,
    pub surface: Surface,
    pub skidding: bool,
    pub grip: GripState,

    // last solved forces (wheel frame)
    pub longitudinal_force: f32,   // N
    pub lateral_force: f32,        // N
}

impl TireState {
    pub fn new(wheel: WheelId, mount: Vec3) -> Self {
        Self {
            wheel,
            mount,
            compression: 0.0,
            compression_velocity: 0.0,
            previous_compression: 0.0,
            suspension_force: 0.0,
            angular_velocity: 0.0,
            road_speed: 0.0,
            slip_angle: 0.0,
            slip_ratio: 0.0,
            load: 0.0,
            contact: false,
            surface: Surface::Asphalt,
            skidding: false,
            grip: GripState::Grip,
            longitudinal_force: 0.0,
            lateral_force: 0.0,
        }
    }
}
