// ==============================================================================
// steering.rs — RATE-LIMITED, SPEED-SENSITIVE STEERING
// ------------------------------------------------------------------------------
// - steer_angle moves toward input·max_angle by at most rate·dt per substep
//     rate = return_speed while heading back to centre
//     rate = steer_speed  otherwise
// - wheel_angle = steer_angle / (1 + speed·0.02)
//
// |wheel_angle| <= |steer_angle| <= max_angle holds after every update.
// ==============================================================================

use crate::vehicle::SteeringConfig;

const SPEED_SENSITIVITY: f32 = 0.02; // 1/(m/s)

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SteeringOutput {
    pub steer_angle: f32, // rate-limited rack angle (rad)
    pub wheel_angle: f32, // applied road-wheel angle (rad)
}

/// Advance the steering rack one substep.
pub fn update_steering(
    cfg: &SteeringConfig,
    steer_angle: f32,
    input: f32,
    speed: f32,
    dt: f32,
) -> SteeringOutput {
    let target = input.clamp(-1.0, 1.0) * cfg.max_angle;
    let delta = target - steer_angle;

    // heading toward centre: target on the other side or closer to zero
    let returning = steer_angle != 0.0
        && delta.signum() != steer_angle.signum();
    let rate = if returning { cfg.return_speed } else { cfg.steer_speed };

    let max_step = rate * dt.max(0.0);
    let steer_angle = (steer_angle + delta.clamp(-max_step, max_step))
        .clamp(-cfg.max_angle, cfg.max_angle);

    let wheel_angle = steer_angle / (1.0 + speed.abs() * SPEED_SENSITIVITY);

    SteeringOutput { steer_angle, wheel_angle }
}
