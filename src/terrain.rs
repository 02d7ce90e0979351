//! Ground the car drives on: a scalar height field plus a surface tag.
//!
//! The core only ever asks for `height(x, z)` and `surface(x, z)` under each
//! wheel. Any `Fn(f32, f32) -> f32` works as an asphalt height field.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::tire::types::Surface;

/// Synchronous, side-effect-free ground query.
pub trait Terrain {
    /// Ground height (world Y) at the given X/Z.
    fn height(&self, x: f32, z: f32) -> f32;

    /// Surface under the given X/Z.
    fn surface(&self, _x: f32, _z: f32) -> Surface {
        Surface::Asphalt
    }
}

impl<F> Terrain for F
where
    F: Fn(f32, f32) -> f32,
{
    fn height(&self, x: f32, z: f32) -> f32 {
        self(x, z)
    }
}

/// Infinite plane.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FlatGround {
    pub height: f32,
    pub surface: Surface,
}

impl FlatGround {
    pub fn new(height: f32, surface: Surface) -> Self {
        Self { height, surface }
    }
}

impl Terrain for FlatGround {
    fn height(&self, _x: f32, _z: f32) -> f32 {
        self.height
    }

    fn surface(&self, _x: f32, _z: f32) -> Surface {
        self.surface
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
struct Wave {
    amplitude: f32,
    k: f32, // rad/m
    phase_x: f32,
    phase_z: f32,
}

/// Gentle hills from a few crossed sine waves, with a flat paved pad around
/// the origin and dirt beyond `paved_radius`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollingHills {
    waves: Vec<Wave>,
    pub pad_radius: f32,
    pub paved_radius: f32,
}

impl RollingHills {
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        let waves = (0..3)
            .map(|i| {
                let wavelength = 60.0 / (i as f32 + 1.0);
                Wave {
                    amplitude: 0.6 / (i as f32 + 1.0),
                    k: std::f32::consts::TAU / wavelength,
                    phase_x: rng.gen_range(0.0..std::f32::consts::TAU),
                    phase_z: rng.gen_range(0.0..std::f32::consts::TAU),
                }
            })
            .collect();
        Self { waves, pad_radius: 15.0, paved_radius: 120.0 }
    }
}

impl Terrain for RollingHills {
    fn height(&self, x: f32, z: f32) -> f32 {
        let r = (x * x + z * z).sqrt();
        // blend from flat pad to full hills over 10 m
        let blend = ((r - self.pad_radius) / 10.0).clamp(0.0, 1.0);
        let h: f32 = self
            .waves
            .iter()
            .map(|w| w.amplitude * (w.k * x + w.phase_x).sin() * (w.k * z + w.phase_z).cos())
            .sum();
        h * blend
    }

    fn surface(&self, x: f32, z: f32) -> Surface {
        if (x * x + z * z).sqrt() > self.paved_radius { Surface::Dirt } else { Surface::Asphalt }
    }
}
