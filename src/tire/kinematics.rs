// ==============================================================================
// kinematics.rs — WHEEL FRAME + SLIP DECOMPOSITION
// ------------------------------------------------------------------------------
// World velocity at a wheel:   v(p) = v_cg + ω × r
// Wheel frame:                 undo yaw, then undo steer (front wheels only)
//                              x = lateral, z = longitudinal
//
// slip angle  α = atan2(v_lat, |v_long| + 0.1)
// slip ratio  κ = (ω·R − v_long) / max(|ω·R|, |v_long|)   (0 near standstill)
// ==============================================================================

use crate::math::{Vec3, VecExt, vec3};

/// Keeps atan2 well-behaved with the car at rest.
pub const SLIP_ANGLE_EPS: f32 = 0.1;
/// Below this (m/s) on both terms the slip ratio is defined as 0.
pub const SLIP_RATIO_MIN_SPEED: f32 = 0.1;

/// World-space velocity of a point rigidly attached to the chassis.
#[inline]
pub fn point_velocity(linvel: &Vec3, yaw_rate: f32, r_world: &Vec3) -> Vec3 {
    linvel + vec3(0.0, yaw_rate, 0.0).cross(r_world)
}

/// World vector → wheel frame. Pass `steer = 0` for rear wheels.
#[inline]
pub fn to_wheel_frame(v_world: &Vec3, yaw: f32, steer: f32) -> Vec3 {
    v_world.rotate_y(-yaw).rotate_y(-steer)
}

/// Wheel-frame vector → body frame (re-applies the steer rotation).
#[inline]
pub fn wheel_to_body(v_wheel: &Vec3, steer: f32) -> Vec3 {
    v_wheel.rotate_y(steer)
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Slip {
    pub v_long: f32,
    pub v_lat: f32,
    pub slip_angle: f32,
    pub slip_ratio: f32,
}

/// `v_wheel` in wheel frame, `surface_speed` = ω·R of the wheel.
pub fn slip_components(v_wheel: &Vec3, surface_speed: f32) -> Slip {
    let v_long = v_wheel.z;
    let v_lat = v_wheel.x;

    let slip_angle = v_lat.atan2(v_long.abs() + SLIP_ANGLE_EPS);

    let slip_ratio = if surface_speed.abs() < SLIP_RATIO_MIN_SPEED && v_long.abs() < SLIP_RATIO_MIN_SPEED {
        0.0
    } else {
        (surface_speed - v_long) / surface_speed.abs().max(v_long.abs())
    };

    Slip { v_long, v_lat, slip_angle, slip_ratio }
}
