// ==============================================================================
// aero.rs — DRAG + DOWNFORCE
// ------------------------------------------------------------------------------
//   q         = ½ · ρ · v²
//   drag      = q · Cd · A   along −v̂
//   downforce = q · Cl · A   along −Y (added to the chassis force, not to the
//               tire loads)
// Below 0.1 m/s both are zero so v̂ is never taken from a near-zero vector.
// ==============================================================================

use crate::math::{Vec3, VecExt, vec3};
use crate::vehicle::AeroConfig;

const MIN_SPEED: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AeroForces {
    pub drag: Vec3,
    pub downforce: Vec3,
}

impl AeroForces {
    pub fn total(&self) -> Vec3 {
        self.drag + self.downforce
    }
}

pub fn aero_forces(cfg: &AeroConfig, velocity: &Vec3) -> AeroForces {
    let speed = velocity.norm();
    if speed < MIN_SPEED {
        return AeroForces { drag: Vec3::zeros(), downforce: Vec3::zeros() };
    }

    let q = 0.5 * cfg.air_density * speed * speed;
    let drag = -velocity.normalize_or_zero() * (q * cfg.drag_coefficient * cfg.frontal_area);
    let downforce = vec3(0.0, -q * cfg.downforce_coefficient * cfg.frontal_area, 0.0);

    AeroForces { drag, downforce }
}
