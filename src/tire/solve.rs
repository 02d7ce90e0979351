// ==============================================================================
// solve.rs — PER-WHEEL TIRE FORCE
// ==============================================================================
// For one wheel and the current chassis motion:
//   1) contact-point velocity → wheel frame → slip angle / slip ratio
//   2) magic formula: Fy = −MF(α), Fx = +MF(κ), peak = D·Fz
//   3) stiction guard: a tire cannot do more than cancel its own slip velocity
//      within one substep, sideways against a quarter of the car, lengthwise
//      against that quarter coupled to the wheel's spin inertia
//   4) friction circle |(Fy, Fx)| <= Fz·μ(surface)
//   5) skid flag (circle usage of the unguarded forces) + grip classification
//   6) wheel frame → body frame (undo steer) → world; yaw torque = (r × F).y
//
// No contact or zero load => zero force and zero torque.
// ==============================================================================

use crate::math::{Vec3, VecExt, vec3, yaw_torque};
use crate::tire::kinematics::{point_velocity, slip_components, to_wheel_frame, wheel_to_body};
use crate::tire::magic::{friction_circle, magic_formula};
use crate::tire::state::{GripState, TireState, update_grip};
use crate::vehicle::VehicleConfig;

const SKID_SCALE: f32 = 0.9;
const SKID_SLIP_ANGLE: f32 = 0.2; // rad
const SKID_SLIP_RATIO: f32 = 0.2;

/// Chassis motion the tires see during one substep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChassisMotion {
    pub velocity: Vec3, // world, m/s
    pub yaw: f32,       // rad
    pub yaw_rate: f32,  // rad/s
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TireForce {
    pub force_body: Vec3,
    pub force_world: Vec3,
    pub torque_y: f32,
}

impl TireForce {
    pub fn zero() -> Self {
        Self { force_body: Vec3::zeros(), force_world: Vec3::zeros(), torque_y: 0.0 }
    }
}

/// Solve one tire. Writes slip, skid, grip and the clipped wheel-frame forces
/// back into `tire`. `steer` is the road-wheel angle, ignored for rear wheels.
pub fn solve_tire(
    cfg: &VehicleConfig,
    tire: &mut TireState,
    motion: &ChassisMotion,
    steer: f32,
    dt: f32,
) -> TireForce {
    let steer = if tire.wheel.is_front() { steer } else { 0.0 };

    // 1) slip
    let r_world = tire.mount.rotate_y(motion.yaw);
    let v_world = point_velocity(&motion.velocity, motion.yaw_rate, &r_world);
    let v_wheel = to_wheel_frame(&v_world, motion.yaw, steer);
    let slip = slip_components(&v_wheel, tire.angular_velocity * cfg.tire.radius);

    tire.slip_angle = slip.slip_angle;
    tire.slip_ratio = slip.slip_ratio;
    tire.road_speed = slip.v_long;

    if !tire.contact || tire.load <= 0.0 {
        tire.skidding = false;
        tire.grip = GripState::Grip;
        tire.lateral_force = 0.0;
        tire.longitudinal_force = 0.0;
        return TireForce::zero();
    }

    // 2) magic formula
    let mut lat = -magic_formula(&cfg.tire.lateral, slip.slip_angle, tire.load);
    let mut long = magic_formula(&cfg.tire.longitudinal, slip.slip_ratio, tire.load);

    let limit = tire.load * tire.surface.friction();
    let demand = friction_circle(lat, long, limit);

    // 3) stiction guard
    if dt > 0.0 {
        let quarter = cfg.chassis.mass * 0.25;
        let r = cfg.tire.radius;
        // chassis quarter and spinning wheel close the slip gap together
        let coupled = 1.0 / (1.0 / quarter + r * r / cfg.tire.mass);
        let max_lat = quarter * slip.v_lat.abs() / dt;
        let surface_speed = tire.angular_velocity * r;
        let max_long = coupled * (surface_speed - slip.v_long).abs() / dt;
        lat = lat.clamp(-max_lat, max_lat);
        long = long.clamp(-max_long, max_long);
    }

    // 4) friction circle
    let clipped = friction_circle(lat, long, limit);

    // 5) skid + grip
    tire.skidding = demand.scale < SKID_SCALE
        || slip.slip_angle.abs() > SKID_SLIP_ANGLE
        || slip.slip_ratio.abs() > SKID_SLIP_RATIO;
    let ground_speed = v_wheel.horizontal().norm();
    tire.grip = update_grip(tire.grip, clipped.usage, slip.slip_ratio, ground_speed);

    tire.lateral_force = clipped.lateral;
    tire.longitudinal_force = clipped.longitudinal;

    // 6) back to body/world
    let force_body = wheel_to_body(&vec3(clipped.lateral, 0.0, clipped.longitudinal), steer);
    let force_world = force_body.rotate_y(motion.yaw);
    let torque_y = yaw_torque(&tire.mount, &force_body);

    TireForce { force_body, force_world, torque_y }
}
