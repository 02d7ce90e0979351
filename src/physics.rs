// ==============================================================================
// physics.rs — CarPhysics: fixed-timestep vehicle integrator
// ------------------------------------------------------------------------------
// update(dt):
//   - accumulator += dt, then at most MAX_SUB_STEPS substeps of FIXED_TIME_STEP
//   - whole steps left over after the cap are dropped (lossy on purpose under a
//     sustained low frame rate); the sub-step fraction is kept
//
// substep:
//   clutch → reset force/torque → steering → per tire {ground, suspension, load,
//   force, accumulate} → drivetrain → aero → gravity → suspension → integrate
//   → damping
// ==============================================================================

use tracing::{debug, trace, warn};

use crate::aero::aero_forces;
use crate::controls::Controls;
use crate::drivetrain::{DrivetrainState, Pedals, REVERSE, engage_clutch, request_shift, update_drivetrain};
use crate::error::ConfigError;
use crate::math::{Vec3, VecExt, vec3};
use crate::state::{CarSnapshot, CarState, VehicleState};
use crate::steering::update_steering;
use crate::suspension::update_suspension;
use crate::terrain::Terrain;
use crate::tire::load::{LoadInputs, wheel_load};
use crate::tire::{ChassisMotion, TireState, WheelId, solve_tire};
use crate::vehicle::{GRAVITY, VehicleConfig};

pub const FIXED_TIME_STEP: f32 = 1.0 / 60.0;
pub const MAX_SUB_STEPS: u32 = 3;

const LINEAR_DAMPING: f32 = 0.999;
const ANGULAR_DAMPING: f32 = 0.995;
// absorbs float error so 1/60 + 1/60 still runs two steps
const STEP_EPS: f32 = 1e-6;

pub struct CarPhysics {
    config: VehicleConfig,
    vehicle: VehicleState,
    tires: [TireState; 4],
}

impl CarPhysics {
    /// Car at the origin, resting at ride height over flat ground.
    pub fn new(config: VehicleConfig) -> Result<Self, ConfigError> {
        let spawn = vec3(0.0, config.ride_height(), 0.0);
        Self::with_position(config, spawn, 0.0)
    }

    pub fn with_position(config: VehicleConfig, position: Vec3, yaw: f32) -> Result<Self, ConfigError> {
        config.validate()?;

        let vehicle = VehicleState {
            position,
            yaw,
            velocity: Vec3::zeros(),
            angular_velocity: Vec3::zeros(),
            force: Vec3::zeros(),
            torque: Vec3::zeros(),
            acceleration: Vec3::zeros(),
            steer_angle: 0.0,
            wheel_angle: 0.0,
            drivetrain: DrivetrainState::new(&config),
            accumulator: 0.0,
            controls: Controls::default(),
        };
        let tires = WheelId::ALL.map(|w| TireState::new(w, config.mount_position(w)));

        debug!(x = position.x, y = position.y, z = position.z, yaw, "car spawned");
        Ok(Self { config, vehicle, tires })
    }

    /// Resume from a saved state. Tires are re-ordered by wheel position and
    /// re-mounted for `config`; the gear is clamped to its gearbox.
    pub fn from_state(config: VehicleConfig, state: CarState) -> Result<Self, ConfigError> {
        config.validate()?;

        let CarState { mut vehicle, mut tires } = state;
        for wheel in WheelId::ALL {
            let count = tires.iter().filter(|t| t.wheel == wheel).count();
            if count != 1 {
                return Err(ConfigError::DuplicateWheel { wheel, count });
            }
        }
        tires.sort_by_key(|t| t.wheel.index());
        for tire in tires.iter_mut() {
            tire.mount = config.mount_position(tire.wheel);
        }

        let gear = &mut vehicle.drivetrain.gear;
        *gear = (*gear).clamp(REVERSE, config.top_gear());
        vehicle.accumulator = vehicle.accumulator.clamp(0.0, FIXED_TIME_STEP);

        debug!(gear = vehicle.drivetrain.gear, "car restored");
        Ok(Self { config, vehicle, tires })
    }

    pub fn config(&self) -> &VehicleConfig {
        &self.config
    }

    pub fn controls(&self) -> Controls {
        self.vehicle.controls
    }

    pub fn state(&self) -> CarSnapshot {
        CarSnapshot::capture(&self.vehicle, &self.tires)
    }

    pub fn save_state(&self) -> CarState {
        CarState { vehicle: self.vehicle.clone(), tires: self.tires.clone() }
    }

    /// Latch driver input for the following updates. Gear requests act on the
    /// rising edge only, so a held button shifts once.
    pub fn set_controls(&mut self, controls: Controls) {
        let controls = controls.clamped();
        let prev = self.vehicle.controls;

        let up = controls.gear_up && !prev.gear_up;
        let down = controls.gear_down && !prev.gear_down;
        request_shift(&self.config, &mut self.vehicle.drivetrain, up, down);

        self.vehicle.controls = controls;
    }

    /// Advance by `dt` seconds of real time. Returns the number of substeps run.
    pub fn update<T>(&mut self, dt: f32, terrain: &T) -> u32
    where
        T: Terrain + ?Sized,
    {
        if !dt.is_finite() || dt < 0.0 {
            trace!(dt, "ignoring bad dt");
            return 0;
        }

        self.vehicle.accumulator += dt;
        let mut steps = 0;
        while self.vehicle.accumulator + STEP_EPS >= FIXED_TIME_STEP && steps < MAX_SUB_STEPS {
            self.substep(terrain, FIXED_TIME_STEP);
            self.vehicle.accumulator -= FIXED_TIME_STEP;
            steps += 1;
        }
        self.vehicle.accumulator = self.vehicle.accumulator.max(0.0);

        if self.vehicle.accumulator >= FIXED_TIME_STEP {
            let dropped = (self.vehicle.accumulator / FIXED_TIME_STEP).floor();
            warn!(dropped_steps = dropped, "substep cap hit, dropping time");
            self.vehicle.accumulator = self.vehicle.accumulator.rem_euclid(FIXED_TIME_STEP);
        }

        steps
    }

    fn substep<T>(&mut self, terrain: &T, dt: f32)
    where
        T: Terrain + ?Sized,
    {
        let cfg = &self.config;
        let v = &mut self.vehicle;
        let mass = cfg.chassis.mass;

        // --------------------------------------------------
        // 1) clutch, reset, steering
        // --------------------------------------------------
        engage_clutch(cfg, &mut v.drivetrain);
        v.force = Vec3::zeros();
        v.torque = Vec3::zeros();

        let steering = update_steering(&cfg.steering, v.steer_angle, v.controls.steer, v.velocity.norm(), dt);
        v.steer_angle = steering.steer_angle;
        v.wheel_angle = steering.wheel_angle;

        // --------------------------------------------------
        // 2) tires, fixed order
        // --------------------------------------------------
        let motion = ChassisMotion { velocity: v.velocity, yaw: v.yaw, yaw_rate: v.angular_velocity.y };
        let v_body = v.velocity.rotate_y(-v.yaw);
        let accel = LoadInputs {
            longitudinal: v.acceleration.z,
            lateral: v.angular_velocity.y * v_body.z, // centripetal
        };

        let mut suspension_total = 0.0;
        for tire in self.tires.iter_mut() {
            let at = v.position + tire.mount.rotate_y(v.yaw);
            let ground = terrain.height(at.x, at.z);
            tire.surface = terrain.surface(at.x, at.z);

            let susp = update_suspension(cfg, tire, v.position.y, ground, dt);
            tire.load = if susp.contact { wheel_load(cfg, tire.wheel, accel) } else { 0.0 };

            let f = solve_tire(cfg, tire, &motion, v.wheel_angle, dt);
            v.force += f.force_world;
            v.torque.y += f.torque_y;
            suspension_total += susp.force;
        }

        // --------------------------------------------------
        // 3) drivetrain, aero, gravity, suspension
        // --------------------------------------------------
        let c = v.controls;
        let pedals = Pedals { throttle: c.throttle, brake: c.brake, handbrake: c.handbrake };
        let out = update_drivetrain(cfg, &mut v.drivetrain, &mut self.tires, pedals, dt);

        v.force += aero_forces(&cfg.aero, &v.velocity).total();
        v.force.y -= mass * GRAVITY;
        v.force.y += suspension_total;

        // body-frame horizontal acceleration for the next load update
        v.acceleration = (v.force.horizontal() / mass).rotate_y(-v.yaw);

        // --------------------------------------------------
        // 4) integrate (semi-implicit Euler) + damping
        // --------------------------------------------------
        let last_good = (v.position, v.yaw);

        v.velocity += v.force / mass * dt;
        v.position += v.velocity * dt;
        v.angular_velocity.y += v.torque.y / cfg.chassis.yaw_inertia * dt;
        v.yaw += v.angular_velocity.y * dt;

        v.velocity *= LINEAR_DAMPING;
        v.angular_velocity *= ANGULAR_DAMPING;

        let finite = v.position.iter().chain(v.velocity.iter()).all(|x| x.is_finite())
            && v.yaw.is_finite()
            && v.angular_velocity.y.is_finite();
        if !finite {
            warn!("non-finite chassis state, freezing car at last position");
            (v.position, v.yaw) = last_good;
            v.velocity = Vec3::zeros();
            v.angular_velocity = Vec3::zeros();
            v.acceleration = Vec3::zeros();
        }

        trace!(
            rpm = v.drivetrain.engine_rpm,
            gear = v.drivetrain.gear,
            drive = out.drive_torque,
            speed = v.velocity.norm(),
            "substep"
        );
    }
}
