//! tire - per-wheel load, slip and force model (pure types + solver)

pub mod types;
pub mod state;
pub mod load;
pub mod kinematics;
pub mod magic;
pub mod solve;

pub use types::{Surface, WheelId};
pub use state::{GripState, TireState};
pub use solve::{ChassisMotion, TireForce, solve_tire};
