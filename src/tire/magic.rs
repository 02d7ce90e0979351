// ==============================================================================
// magic.rs — SIMPLIFIED PACEJKA ("MAGIC FORMULA") + FRICTION CIRCLE
// ------------------------------------------------------------------------------
// Pure force curves, no state:
//
//     F = D·Fz · sin(C · atan(B·x − E·(B·x − atan(B·x))))
//
// evaluated once with the slip angle (lateral) and once with the slip ratio
// (longitudinal). The two components are then clipped together so that
// |(Fy, Fx)| <= mu·Fz.
// ==============================================================================

use serde::{Deserialize, Serialize};

/// B/C/D/E coefficients for one force direction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PacejkaCoefficients {
    pub b: f32, // stiffness
    pub c: f32, // shape
    pub d: f32, // peak (multiplied by load)
    pub e: f32, // curvature
}

impl PacejkaCoefficients {
    pub const LATERAL: Self = Self { b: 10.0, c: 1.9, d: 1.0, e: 0.97 };
    pub const LONGITUDINAL: Self = Self { b: 11.0, c: 1.65, d: 1.0, e: 0.97 };
}

#[inline]
pub fn magic_formula(k: &PacejkaCoefficients, slip: f32, load: f32) -> f32 {
    let bx = k.b * slip;
    let peak = k.d * load;
    peak * (k.c * (bx - k.e * (bx - bx.atan())).atan()).sin()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Clipped {
    pub lateral: f32,
    pub longitudinal: f32,
    /// 1.0 when untouched, < 1.0 when the circle clipped the pair.
    pub scale: f32,
    /// demanded / available (for grip classification).
    pub usage: f32,
}

/// Scale both components down so the combined magnitude never exceeds `max_force`.
pub fn friction_circle(lateral: f32, longitudinal: f32, max_force: f32) -> Clipped {
    if max_force <= 0.0 {
        return Clipped { lateral: 0.0, longitudinal: 0.0, scale: 0.0, usage: 0.0 };
    }

    let mag = (lateral * lateral + longitudinal * longitudinal).sqrt();
    let usage = mag / max_force;
    if mag > max_force {
        let scale = max_force / mag;
        Clipped {
            lateral: lateral * scale,
            longitudinal: longitudinal * scale,
            scale,
            usage,
        }
    } else {
        Clipped { lateral, longitudinal, scale: 1.0, usage }
    }
}
