// ==============================================================================
// drivetrain.rs — ENGINE + GEARBOX + CLUTCH + BRAKES (rear-wheel drive)
// ==============================================================================
// Per substep:
//   1) engine RPM follows the rear wheels through the current ratio
//        target = |ω_rear| · |ratio| · final_drive · 60/2π
//        rpm   += (target − rpm) · min(1, clutch·dt·rpm_response)
//        rpm    = clamp(rpm, idle, max)
//   2) torque curve  T = max_torque · (−2n² + 2.8n) · throttle,  n = rpm/max
//      cut by the rev limiter while target >= max
//   3) rear wheels each get T · ratio · final_drive · clutch · efficiency / 2
//   4) brakes (front/rear bias) oppose wheel spin and stop at zero
//   5) handbrake acts on the rear ω directly, outside the torque sum
//   6) tire reaction −Fx·R, never carrying a wheel past free rolling
//   7) ω += T / tire_mass · dt
//
// Gear shifts are the only discrete state: a shift drops the clutch to 0 and
// the engine to idle; the clutch then ramps back by `clutch_step` per
// substep. The first substep after a shift runs fully disengaged.
// ==============================================================================

use serde::{Deserialize, Serialize};
use std::f32::consts::PI;
use tracing::debug;

use crate::tire::state::TireState;
use crate::vehicle::VehicleConfig;

pub const REVERSE: i8 = -1;
pub const NEUTRAL: i8 = 0;

const RAD_S_TO_RPM: f32 = 60.0 / (2.0 * PI);
const SPIN_EPS: f32 = 1e-4;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DrivetrainState {
    pub gear: i8,          // -1 reverse, 0 neutral, 1.. forward
    pub clutch: f32,       // 0 disengaged .. 1 engaged
    pub engine_rpm: f32,
    /// Set by a shift, cleared by the next substep.
    pub shift_latched: bool,
}

impl DrivetrainState {
    pub fn new(cfg: &VehicleConfig) -> Self {
        Self {
            gear: 1,
            clutch: 1.0,
            engine_rpm: cfg.engine.idle_rpm,
            shift_latched: false,
        }
    }
}

/// Pedal inputs the drivetrain reads (already clamped).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Pedals {
    pub throttle: f32,
    pub brake: f32,
    pub handbrake: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DrivetrainOutput {
    pub target_rpm: f32,
    pub engine_torque: f32, // N·m at the crank
    pub drive_torque: f32,  // N·m per driven wheel
}

/// Gear ratio for a gear index; neutral is 0.
pub fn gear_ratio(cfg: &VehicleConfig, gear: i8) -> f32 {
    let ratios = &cfg.transmission.gear_ratios;
    match gear {
        g if g < 0 => ratios[0],
        0 => 0.0,
        g => ratios.get(g as usize).copied().unwrap_or(0.0),
    }
}

/// `−2n² + 2.8n`, peaking at n = 0.7.
#[inline]
pub fn torque_factor(n: f32) -> f32 {
    -2.0 * n * n + 2.8 * n
}

/// Apply at most one shift. Returns the new gear when it changed.
pub fn request_shift(cfg: &VehicleConfig, dt_state: &mut DrivetrainState, up: bool, down: bool) -> Option<i8> {
    let delta = match (up, down) {
        (true, false) => 1,
        (false, true) => -1,
        _ => return None,
    };

    let next = (dt_state.gear + delta).clamp(REVERSE, cfg.top_gear());
    if next == dt_state.gear {
        return None;
    }

    debug!(from = dt_state.gear, to = next, "gear shift");
    dt_state.gear = next;
    dt_state.clutch = 0.0;
    dt_state.engine_rpm = cfg.engine.idle_rpm;
    dt_state.shift_latched = true;
    Some(next)
}

/// Clutch re-engagement, once per substep.
pub fn engage_clutch(cfg: &VehicleConfig, dt_state: &mut DrivetrainState) {
    if dt_state.shift_latched {
        dt_state.shift_latched = false;
        return;
    }
    dt_state.clutch = (dt_state.clutch + cfg.transmission.clutch_step).min(1.0);
}

/// Move `w` toward zero by `amount` without crossing it.
#[inline]
fn toward_zero(w: f32, amount: f32) -> f32 {
    if w.abs() <= amount { 0.0 } else { w - w.signum() * amount }
}

/// One substep of engine, gearbox, brakes and wheel spin.
pub fn update_drivetrain(
    cfg: &VehicleConfig,
    dt_state: &mut DrivetrainState,
    tires: &mut [TireState; 4],
    pedals: Pedals,
    dt: f32,
) -> DrivetrainOutput {
    let eng = &cfg.engine;
    let tr = &cfg.transmission;
    let radius = cfg.tire.radius;
    let wheel_mass = cfg.tire.mass;

    // --------------------------------------------------
    // 1) engine speed from the driven (rear) wheels
    // --------------------------------------------------
    let ratio = gear_ratio(cfg, dt_state.gear);
    let rear_spin = tires
        .iter()
        .filter(|t| t.wheel.is_rear())
        .map(|t| t.angular_velocity)
        .sum::<f32>()
        * 0.5;
    let target_rpm = rear_spin.abs() * ratio.abs() * tr.final_drive * RAD_S_TO_RPM;

    let follow = (dt_state.clutch * dt * eng.rpm_response).clamp(0.0, 1.0);
    dt_state.engine_rpm += (target_rpm - dt_state.engine_rpm) * follow;
    dt_state.engine_rpm = dt_state.engine_rpm.clamp(eng.idle_rpm, eng.max_rpm);

    // --------------------------------------------------
    // 2) torque curve + rev limiter
    // --------------------------------------------------
    let engine_torque = if pedals.throttle <= 0.0 || ratio == 0.0 || target_rpm >= eng.max_rpm {
        0.0
    } else {
        let n = dt_state.engine_rpm / eng.max_rpm;
        eng.max_torque * torque_factor(n).max(0.0) * pedals.throttle
    };

    // --------------------------------------------------
    // 3) through the gearbox, split over the rear pair
    // --------------------------------------------------
    let drive_torque =
        engine_torque * ratio * tr.final_drive * dt_state.clutch * tr.efficiency * 0.5;

    // --------------------------------------------------
    // 4-7) per-wheel torque sum + integration
    // --------------------------------------------------
    let brake_total = cfg.brakes.brake_force * pedals.brake * radius;
    let front_brake = brake_total * cfg.brakes.front_bias * 0.5;
    let rear_brake = brake_total * (1.0 - cfg.brakes.front_bias) * 0.5;
    let handbrake = cfg.brakes.handbrake_force * pedals.handbrake * radius * 0.5;

    for tire in tires.iter_mut() {
        let rear = tire.wheel.is_rear();
        let w = tire.angular_velocity;

        let drive = if rear { drive_torque } else { 0.0 };
        let brake = if rear { rear_brake } else { front_brake };
        let brake_dir = if w.abs() > SPIN_EPS { -w.signum() } else { 0.0 };

        let next = w + (drive + brake_dir * brake) / wheel_mass * dt;
        // brakes stop the wheel, they do not spin it backwards
        let mut w = if brake > 0.0 && next * w < 0.0 && drive.abs() < brake { 0.0 } else { next };

        if rear && handbrake > 0.0 {
            w = toward_zero(w, handbrake / wheel_mass * dt);
        }

        // road reaction: pulls the wheel toward free rolling, never past it
        if tire.contact {
            let free = tire.road_speed / radius;
            let reacted = w - tire.longitudinal_force * radius / wheel_mass * dt;
            w = if (w - free) * (reacted - free) < 0.0 { free } else { reacted };
        }

        tire.angular_velocity = if w.is_finite() { w } else { 0.0 };
    }

    DrivetrainOutput { target_rpm, engine_torque, drive_torque }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tire::types::WheelId;

    const DT: f32 = 1.0 / 60.0;

    fn setup() -> (VehicleConfig, DrivetrainState, [TireState; 4]) {
        let cfg = VehicleConfig::default();
        let st = DrivetrainState::new(&cfg);
        let tires = WheelId::ALL.map(|w| TireState::new(w, cfg.mount_position(w)));
        (cfg, st, tires)
    }

    #[test]
    fn ratios_by_gear_index() {
        let cfg = VehicleConfig::default();
        assert!(gear_ratio(&cfg, REVERSE) < 0.0);
        assert_eq!(gear_ratio(&cfg, NEUTRAL), 0.0);
        assert_eq!(gear_ratio(&cfg, 1), cfg.transmission.gear_ratios[1]);
        assert_eq!(gear_ratio(&cfg, cfg.top_gear()), *cfg.transmission.gear_ratios.last().unwrap());
    }

    #[test]
    fn torque_curve_peaks_near_point_seven() {
        let peak = (0..=100).map(|i| i as f32 / 100.0).fold((0.0, f32::MIN), |best, n| {
            let f = torque_factor(n);
            if f > best.1 { (n, f) } else { best }
        });
        assert!((peak.0 - 0.7).abs() < 0.011);
        assert_eq!(torque_factor(0.0), 0.0);
    }

    #[test]
    fn shift_drops_clutch_and_rpm() {
        let (cfg, mut st, _) = setup();
        st.engine_rpm = 5000.0;
        assert_eq!(request_shift(&cfg, &mut st, true, false), Some(2));
        assert_eq!(st.clutch, 0.0);
        assert_eq!(st.engine_rpm, cfg.engine.idle_rpm);
    }

    #[test]
    fn shift_respects_bounds() {
        let (cfg, mut st, _) = setup();
        st.gear = cfg.top_gear();
        assert_eq!(request_shift(&cfg, &mut st, true, false), None);
        assert_eq!(st.clutch, 1.0);

        st.gear = REVERSE;
        assert_eq!(request_shift(&cfg, &mut st, false, true), None);
        assert_eq!(request_shift(&cfg, &mut st, true, true), None);
        assert_eq!(request_shift(&cfg, &mut st, true, false), Some(NEUTRAL));
    }

    #[test]
    fn clutch_ramps_after_the_shift_substep() {
        let (cfg, mut st, _) = setup();
        request_shift(&cfg, &mut st, true, false);
        engage_clutch(&cfg, &mut st);
        assert_eq!(st.clutch, 0.0);
        engage_clutch(&cfg, &mut st);
        assert!((st.clutch - cfg.transmission.clutch_step).abs() < 1e-6);
        for _ in 0..100 {
            engage_clutch(&cfg, &mut st);
        }
        assert_eq!(st.clutch, 1.0);
    }

    #[test]
    fn throttle_spins_only_the_rear_wheels() {
        let (cfg, mut st, mut tires) = setup();
        let out = update_drivetrain(&cfg, &mut st, &mut tires, Pedals { throttle: 1.0, ..Default::default() }, DT);
        assert!(out.engine_torque > 0.0);
        assert_eq!(tires[WheelId::FrontLeft.index()].angular_velocity, 0.0);
        assert!(tires[WheelId::RearLeft.index()].angular_velocity > 0.0);
        assert_eq!(
            tires[WheelId::RearLeft.index()].angular_velocity,
            tires[WheelId::RearRight.index()].angular_velocity
        );
    }

    #[test]
    fn reverse_spins_backwards() {
        let (cfg, mut st, mut tires) = setup();
        st.gear = REVERSE;
        update_drivetrain(&cfg, &mut st, &mut tires, Pedals { throttle: 1.0, ..Default::default() }, DT);
        assert!(tires[WheelId::RearRight.index()].angular_velocity < 0.0);
    }

    #[test]
    fn neutral_makes_no_torque() {
        let (cfg, mut st, mut tires) = setup();
        st.gear = NEUTRAL;
        let out = update_drivetrain(&cfg, &mut st, &mut tires, Pedals { throttle: 1.0, ..Default::default() }, DT);
        assert_eq!(out.engine_torque, 0.0);
        assert_eq!(tires[WheelId::RearRight.index()].angular_velocity, 0.0);
    }

    #[test]
    fn disengaged_clutch_holds_rpm() {
        let (cfg, mut st, mut tires) = setup();
        request_shift(&cfg, &mut st, true, false);
        for t in tires.iter_mut() {
            t.angular_velocity = 40.0;
        }
        let out = update_drivetrain(&cfg, &mut st, &mut tires, Pedals { throttle: 1.0, ..Default::default() }, DT);
        assert_eq!(st.engine_rpm, cfg.engine.idle_rpm);
        assert_eq!(out.drive_torque, 0.0);
    }

    #[test]
    fn rpm_stays_within_idle_and_redline() {
        let (cfg, mut st, mut tires) = setup();
        for t in tires.iter_mut() {
            t.angular_velocity = 500.0;
        }
        for _ in 0..120 {
            update_drivetrain(&cfg, &mut st, &mut tires, Pedals::default(), DT);
            assert!(st.engine_rpm >= cfg.engine.idle_rpm && st.engine_rpm <= cfg.engine.max_rpm);
        }
        assert_eq!(st.engine_rpm, cfg.engine.max_rpm);
    }

    #[test]
    fn rev_limiter_cuts_torque() {
        let (cfg, mut st, mut tires) = setup();
        for t in tires.iter_mut() {
            t.angular_velocity = 500.0;
        }
        let out = update_drivetrain(&cfg, &mut st, &mut tires, Pedals { throttle: 1.0, ..Default::default() }, DT);
        assert!(out.target_rpm >= cfg.engine.max_rpm);
        assert_eq!(out.engine_torque, 0.0);
    }

    #[test]
    fn brakes_stop_but_never_reverse_a_wheel() {
        let (cfg, mut st, mut tires) = setup();
        st.gear = NEUTRAL;
        for t in tires.iter_mut() {
            t.angular_velocity = 3.0;
        }
        for _ in 0..60 {
            update_drivetrain(&cfg, &mut st, &mut tires, Pedals { brake: 1.0, ..Default::default() }, DT);
            for t in &tires {
                assert!(t.angular_velocity >= 0.0);
            }
        }
        for t in &tires {
            assert_eq!(t.angular_velocity, 0.0);
        }
    }

    #[test]
    fn handbrake_only_touches_the_rear() {
        let (cfg, mut st, mut tires) = setup();
        st.gear = NEUTRAL;
        for t in tires.iter_mut() {
            t.angular_velocity = 30.0;
        }
        update_drivetrain(&cfg, &mut st, &mut tires, Pedals { handbrake: 1.0, ..Default::default() }, DT);
        assert_eq!(tires[WheelId::FrontLeft.index()].angular_velocity, 30.0);
        assert!(tires[WheelId::RearLeft.index()].angular_velocity < 30.0);
    }

    #[test]
    fn road_reaction_stops_at_free_rolling() {
        let (cfg, mut st, mut tires) = setup();
        st.gear = NEUTRAL;
        let rl = &mut tires[WheelId::RearLeft.index()];
        rl.contact = true;
        rl.road_speed = 10.0;
        rl.angular_velocity = 10.0 / cfg.tire.radius + 0.1;
        rl.longitudinal_force = 3000.0; // spinning faster than the road
        update_drivetrain(&cfg, &mut st, &mut tires, Pedals::default(), DT);
        let w = tires[WheelId::RearLeft.index()].angular_velocity;
        assert!((w - 10.0 / cfg.tire.radius).abs() < 1e-4);
    }
}
