//! Vehicle dynamics core: slip-based tires, per-wheel suspension, a
//! torque-based drivetrain and simple aero, advanced by a fixed-timestep
//! integrator over a scalar height field.
//!
//! ```no_run
//! use car_physics::{CarPhysics, Controls, FlatGround, VehicleConfig};
//!
//! let mut car = CarPhysics::new(VehicleConfig::default()).unwrap();
//! car.set_controls(Controls { throttle: 1.0, ..Default::default() });
//! car.update(1.0 / 60.0, &FlatGround::default());
//! println!("{:.1} m/s", car.state().speed);
//! ```

pub mod aero;
pub mod controls;
pub mod drivetrain;
pub mod error;
pub mod math;
pub mod physics;
pub mod state;
pub mod steering;
pub mod suspension;
pub mod terrain;
pub mod tire;
pub mod vehicle;

pub use controls::Controls;
pub use error::ConfigError;
pub use math::{Vec3, VecExt, vec3};
pub use physics::{CarPhysics, FIXED_TIME_STEP, MAX_SUB_STEPS};
pub use state::{CarSnapshot, CarState, TireSnapshot, VehicleState};
pub use terrain::{FlatGround, RollingHills, Terrain};
pub use tire::{GripState, Surface, TireState, WheelId};
pub use vehicle::VehicleConfig;
