// End-to-end driving scenarios against the public API.

use car_physics::tire::{ChassisMotion, solve_tire};
use car_physics::{
    CarPhysics, CarState, Controls, FIXED_TIME_STEP, FlatGround, RollingHills, Surface, TireState, VehicleConfig,
    WheelId, vec3,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const DT: f32 = FIXED_TIME_STEP;

fn car() -> CarPhysics {
    CarPhysics::new(VehicleConfig::default()).unwrap()
}

fn flat() -> FlatGround {
    FlatGround::default()
}

fn throttle(t: f32) -> Controls {
    Controls { throttle: t, ..Default::default() }
}

fn assert_close(a: [f32; 3], b: [f32; 3], tol: f32) {
    for i in 0..3 {
        assert!((a[i] - b[i]).abs() <= tol, "{a:?} vs {b:?}");
    }
}

#[test]
fn one_big_update_matches_many_small_ones() {
    let controls = Controls { throttle: 0.7, steer: 0.4, ..Default::default() };
    let mut coarse = car();
    let mut fine = car();
    coarse.set_controls(controls);
    fine.set_controls(controls);

    for _ in 0..40 {
        assert_eq!(coarse.update(3.0 * DT, &flat()), 3);
        for _ in 0..3 {
            fine.update(DT, &flat());
        }
    }

    let (a, b) = (coarse.state(), fine.state());
    assert_close(a.position, b.position, 1e-4);
    assert_close(a.velocity, b.velocity, 1e-4);
    assert!((a.yaw - b.yaw).abs() < 1e-5);
}

#[test]
fn loads_never_go_negative() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let hills = RollingHills::random(&mut rng);
    let mut car = car();

    for i in 0..900 {
        if i % 30 == 0 {
            car.set_controls(Controls {
                throttle: rng.gen_range(0.0..1.0),
                brake: if rng.gen_bool(0.2) { 1.0 } else { 0.0 },
                handbrake: if rng.gen_bool(0.1) { 1.0 } else { 0.0 },
                steer: rng.gen_range(-1.0..1.0),
                ..Default::default()
            });
        }
        car.update(DT, &hills);

        let cfg = car.config();
        for t in &car.state().tires {
            assert!(t.load >= 0.0, "{:?} load {}", t.wheel, t.load);
            assert!(t.compression >= 0.0 && t.compression <= cfg.suspension.max_travel);
            if !t.contact {
                assert_eq!(t.load, 0.0);
            }
        }
    }
}

#[test]
fn tire_forces_stay_inside_the_friction_circle() {
    let cfg = VehicleConfig::default();
    let mut rng = StdRng::seed_from_u64(42);
    let surfaces = [Surface::Asphalt, Surface::Wet, Surface::Dirt, Surface::Ice, Surface::Sand];

    for _ in 0..2000 {
        let wheel = WheelId::ALL[rng.gen_range(0..4)];
        let mut tire = TireState::new(wheel, cfg.mount_position(wheel));
        tire.contact = true;
        tire.load = rng.gen_range(0.0..9000.0);
        tire.surface = surfaces[rng.gen_range(0..surfaces.len())];
        tire.angular_velocity = rng.gen_range(-150.0..150.0);

        let motion = ChassisMotion {
            velocity: vec3(rng.gen_range(-30.0..30.0), 0.0, rng.gen_range(-40.0..40.0)),
            yaw: rng.gen_range(-3.2..3.2),
            yaw_rate: rng.gen_range(-2.0..2.0),
        };
        let steer = rng.gen_range(-0.6..0.6);

        let f = solve_tire(&cfg, &mut tire, &motion, steer, DT);
        let limit = tire.load * tire.surface.friction() + 1e-2;
        let combined = tire.lateral_force.hypot(tire.longitudinal_force);
        assert!(combined <= limit, "{combined} > {limit}");
        assert!(f.force_world.norm() <= limit);
        assert!(f.force_world.y.abs() < 1e-3);
    }
}

#[test]
fn parked_car_stays_put() {
    let mut car = car();
    let start = car.state();

    for _ in 0..300 {
        car.update(DT, &|_x: f32, _z: f32| -> f32 { 0.0 });
    }

    let end = car.state();
    assert_close(end.position, start.position, 1e-3);
    assert_close(end.velocity, [0.0; 3], 1e-3);
    assert_eq!(end.yaw, start.yaw);
}

#[test]
fn gear_change_resets_rpm_and_clutch() {
    let mut car = car();
    car.set_controls(throttle(1.0));
    for _ in 0..120 {
        car.update(DT, &flat());
    }
    let idle = car.config().engine.idle_rpm;
    assert!(car.state().engine_rpm > idle);

    car.set_controls(Controls { throttle: 1.0, gear_up: true, ..Default::default() });
    car.update(DT, &flat());
    let s = car.state();
    assert_eq!(s.gear, 2);
    assert_eq!(s.engine_rpm, idle);
    assert_eq!(s.clutch, 0.0);

    // then the clutch comes back a step per substep
    car.set_controls(throttle(1.0));
    car.update(DT, &flat());
    assert!(car.state().clutch > 0.0);

    car.set_controls(Controls { gear_down: true, ..Default::default() });
    car.update(DT, &flat());
    let s = car.state();
    assert_eq!(s.gear, 1);
    assert_eq!(s.engine_rpm, idle);
    assert_eq!(s.clutch, 0.0);
}

#[test]
fn fast_callers_still_shift_from_idle() {
    const DT_144: f32 = 1.0 / 144.0;
    let mut car = car();
    car.set_controls(throttle(1.0));
    for _ in 0..288 {
        car.update(DT_144, &flat());
    }
    let idle = car.config().engine.idle_rpm;
    assert!(car.state().engine_rpm > idle);

    car.set_controls(Controls { throttle: 1.0, gear_up: true, ..Default::default() });
    let mut updates = 0;
    while car.update(DT_144, &flat()) == 0 {
        updates += 1;
        assert!(updates < 3);
    }
    let s = car.state();
    assert_eq!(s.gear, 2);
    assert_eq!(s.clutch, 0.0);
    assert_eq!(s.engine_rpm, idle);

    while car.update(DT_144, &flat()) == 0 {}
    let step = car.config().transmission.clutch_step;
    assert!((car.state().clutch - step).abs() < 1e-6);
}

#[test]
fn coarse_and_fine_updates_agree_across_a_shift() {
    let mut coarse = car();
    let mut fine = car();
    for c in [&mut coarse, &mut fine] {
        c.set_controls(throttle(1.0));
        for _ in 0..60 {
            c.update(DT, &flat());
        }
        c.set_controls(Controls { throttle: 1.0, gear_up: true, ..Default::default() });
    }

    for _ in 0..10 {
        assert_eq!(coarse.update(3.0 * DT, &flat()), 3);
        for _ in 0..3 {
            fine.update(DT, &flat());
        }
    }

    let (a, b) = (coarse.state(), fine.state());
    assert_eq!(a.gear, 2);
    assert_eq!(a.clutch, b.clutch);
    assert_close(a.position, b.position, 1e-4);
    assert_close(a.velocity, b.velocity, 1e-4);
    assert!((a.engine_rpm - b.engine_rpm).abs() < 0.5);
}

#[test]
fn full_throttle_accelerates_then_levels_off() {
    let mut car = car();
    car.set_controls(throttle(1.0));

    let mut last = 0.0;
    for _ in 0..300 {
        car.update(DT, &flat());
        let forward = car.state().velocity[2];
        assert!(forward >= last - 1e-3, "speed dropped from {last} to {forward}");
        last = forward;
    }

    // first gear tops out where the rev limiter cuts in
    let cfg = car.config();
    let ratio = cfg.transmission.gear_ratios[1] * cfg.transmission.final_drive;
    let redline_speed = cfg.engine.max_rpm / ratio * std::f32::consts::TAU / 60.0 * cfg.tire.radius;
    assert!(last > 8.0, "only reached {last} m/s");
    assert!(last < redline_speed + 0.5);
}

#[test]
fn brakes_bring_the_car_down() {
    let mut car = car();
    car.set_controls(throttle(1.0));
    for _ in 0..180 {
        car.update(DT, &flat());
    }
    let before = car.state().speed;

    car.set_controls(Controls { brake: 1.0, ..Default::default() });
    for _ in 0..120 {
        car.update(DT, &flat());
    }
    assert!(before > 4.0);
    assert!(car.state().speed < 0.5);
}

#[test]
fn steering_turns_the_way_it_is_told() {
    for steer in [1.0_f32, -1.0] {
        let mut car = car();
        car.set_controls(Controls { throttle: 0.5, steer, ..Default::default() });

        let max_angle = car.config().steering.max_angle;
        for _ in 0..180 {
            car.update(DT, &flat());
            let s = car.state();
            assert!(s.steer_angle.abs() <= max_angle + 1e-6);
            assert!(s.wheel_angle.abs() <= s.steer_angle.abs() + 1e-6);
        }

        let yaw = car.state().yaw;
        assert_eq!(yaw.signum(), steer.signum(), "yaw {yaw} for steer {steer}");
    }
}

#[test]
fn restored_state_drives_the_same_path() {
    let mut original = car();
    original.set_controls(Controls { throttle: 0.8, steer: 0.3, ..Default::default() });
    for _ in 0..90 {
        original.update(DT, &flat());
    }

    let json = serde_json::to_string(&original.save_state()).unwrap();
    let saved: CarState = serde_json::from_str(&json).unwrap();
    let mut resumed = CarPhysics::from_state(VehicleConfig::default(), saved).unwrap();

    for _ in 0..120 {
        original.update(DT, &flat());
        resumed.update(DT, &flat());
    }

    let (a, b) = (original.state(), resumed.state());
    assert_close(a.position, b.position, 1e-3);
    assert_close(a.velocity, b.velocity, 1e-3);
    assert!((a.yaw - b.yaw).abs() < 1e-4);
    assert_eq!(a.gear, b.gear);
    assert!((a.engine_rpm - b.engine_rpm).abs() < 0.5);
}

#[test]
fn reverse_gear_backs_up() {
    let mut car = car();
    car.set_controls(Controls { gear_down: true, ..Default::default() }); // 1 -> neutral
    car.set_controls(Controls::default());
    car.set_controls(Controls { gear_down: true, ..Default::default() }); // neutral -> reverse
    assert_eq!(car.state().gear, -1);

    car.set_controls(throttle(1.0));
    for _ in 0..120 {
        car.update(DT, &flat());
    }
    assert!(car.state().velocity[2] < -0.5);
}
