//! Immutable vehicle parameters, presets and validation.
//!
//! A `VehicleConfig` is handed to `CarPhysics` once at construction and never
//! mutated afterwards. Presets are plain functions; a YAML file can override
//! any subset of a preset through [`VehicleConfig::load`].

use std::path::Path;

use config::{Config, File, FileFormat};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::math::{Vec3, vec3};
use crate::tire::magic::PacejkaCoefficients;
use crate::tire::types::WheelId;

/// m/s²
pub const GRAVITY: f32 = 9.81;

/// Reverse plus forward ratios; forward gears are indexed by `i8`.
pub const MAX_GEAR_RATIOS: usize = i8::MAX as usize + 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChassisConfig {
    pub mass: f32,         // kg
    pub wheelbase: f32,    // m (front axle to rear axle)
    pub track_width: f32,  // m (left to right)
    pub cg_height: f32,    // m above ground at rest
    pub cg_to_front: f32,  // m, CG to front axle
    pub cg_to_rear: f32,   // m, CG to rear axle
    pub yaw_inertia: f32,  // kg·m²
    pub mount_height: f32, // m, wheel mount Y relative to the CG (usually < 0)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub max_torque: f32,   // N·m at the torque-curve peak
    pub idle_rpm: f32,
    pub max_rpm: f32,
    pub rpm_response: f32, // 1/s, engine speed tracking with clutch fully in
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransmissionConfig {
    /// Index 0 is reverse (negative), 1.. are forward gears.
    pub gear_ratios: Vec<f32>,
    pub final_drive: f32,
    pub efficiency: f32,   // 0..1
    pub clutch_step: f32,  // clutch re-engagement per external update
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TireConfig {
    pub radius: f32,       // m
    pub width: f32,        // m
    pub mass: f32,         // kg, also the spin-up "inertia" of the wheel
    pub lateral: PacejkaCoefficients,
    pub longitudinal: PacejkaCoefficients,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuspensionConfig {
    pub spring_rate: f32,  // N/m
    pub damper_rate: f32,  // N·s/m
    pub max_travel: f32,   // m
    pub rest_length: f32,  // m
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AeroConfig {
    pub drag_coefficient: f32,
    pub downforce_coefficient: f32,
    pub frontal_area: f32, // m²
    pub air_density: f32,  // kg/m³
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrakeConfig {
    pub brake_force: f32,     // N, total at the contact patches
    pub front_bias: f32,      // 0..1 share of brake torque on the front axle
    pub handbrake_force: f32, // N, rear axle only
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SteeringConfig {
    pub max_angle: f32,    // rad
    pub steer_speed: f32,  // rad/s while steering away from centre
    pub return_speed: f32, // rad/s while returning to centre
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleConfig {
    pub chassis: ChassisConfig,
    pub engine: EngineConfig,
    pub transmission: TransmissionConfig,
    pub tire: TireConfig,
    pub suspension: SuspensionConfig,
    pub aero: AeroConfig,
    pub brakes: BrakeConfig,
    pub steering: SteeringConfig,
}

impl Default for VehicleConfig {
    fn default() -> Self {
        Self::gt86()
    }
}

impl VehicleConfig {
    /// Light rear-drive coupe, the default car.
    pub fn gt86() -> Self {
        Self {
            chassis: ChassisConfig {
                mass: 1250.0,
                wheelbase: 2.57,
                track_width: 1.52,
                cg_height: 0.46,
                cg_to_front: 1.20,
                cg_to_rear: 1.37,
                yaw_inertia: 1800.0,
                mount_height: -0.10,
            },
            engine: EngineConfig {
                max_torque: 260.0,
                idle_rpm: 900.0,
                max_rpm: 7400.0,
                rpm_response: 10.0,
            },
            transmission: TransmissionConfig {
                gear_ratios: vec![-3.44, 3.63, 2.19, 1.54, 1.21, 1.00, 0.77],
                final_drive: 4.1,
                efficiency: 0.85,
                clutch_step: 0.05,
            },
            tire: TireConfig {
                radius: 0.31,
                width: 0.215,
                mass: 18.0,
                lateral: PacejkaCoefficients::LATERAL,
                longitudinal: PacejkaCoefficients::LONGITUDINAL,
            },
            suspension: SuspensionConfig {
                spring_rate: 35_000.0,
                damper_rate: 3_200.0,
                max_travel: 0.25,
                rest_length: 0.30,
            },
            aero: AeroConfig {
                drag_coefficient: 0.32,
                downforce_coefficient: 0.12,
                frontal_area: 2.0,
                air_density: 1.225,
            },
            brakes: BrakeConfig {
                brake_force: 14_000.0,
                front_bias: 0.62,
                handbrake_force: 9_000.0,
            },
            steering: SteeringConfig {
                max_angle: 0.6,
                steer_speed: 2.5,
                return_speed: 5.0,
            },
        }
    }

    /// Softer, slower front-heavy hatch.
    pub fn hatchback() -> Self {
        let mut c = Self::gt86();
        c.chassis = ChassisConfig {
            mass: 1050.0,
            wheelbase: 2.45,
            track_width: 1.45,
            cg_height: 0.50,
            cg_to_front: 1.05,
            cg_to_rear: 1.40,
            yaw_inertia: 1400.0,
            mount_height: -0.12,
        };
        c.engine = EngineConfig { max_torque: 180.0, idle_rpm: 850.0, max_rpm: 6500.0, rpm_response: 8.0 };
        c.transmission.gear_ratios = vec![-3.2, 3.4, 1.9, 1.3, 1.0, 0.8];
        c.transmission.final_drive = 4.0;
        c.tire.radius = 0.29;
        c.tire.mass = 15.0;
        c.suspension.spring_rate = 28_000.0;
        c.suspension.damper_rate = 2_600.0;
        c.aero = AeroConfig {
            drag_coefficient: 0.34,
            downforce_coefficient: 0.05,
            frontal_area: 2.1,
            air_density: 1.225,
        };
        c.brakes = BrakeConfig { brake_force: 11_000.0, front_bias: 0.65, handbrake_force: 7_000.0 };
        c.steering.max_angle = 0.62;
        c
    }

    /// Look a preset up by name (used by the server settings).
    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "gt86" => Some(Self::gt86()),
            "hatchback" => Some(Self::hatchback()),
            _ => None,
        }
    }

    /// Layer a YAML file over the default preset, then validate.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let cfg: Self = Config::builder()
            .add_source(Config::try_from(&Self::default())?)
            .add_source(File::from(path.as_ref()).format(FileFormat::Yaml))
            .build()?
            .try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Same as [`load`](Self::load) for an in-memory YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let cfg: Self = Config::builder()
            .add_source(Config::try_from(&Self::default())?)
            .add_source(File::from_str(yaml, FileFormat::Yaml))
            .build()?
            .try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    // --------------------------------------------------
    // Validation (construction time only)
    // --------------------------------------------------
    pub fn validate(&self) -> Result<(), ConfigError> {
        let c = &self.chassis;
        positive("chassis.mass", c.mass)?;
        positive("chassis.wheelbase", c.wheelbase)?;
        positive("chassis.track_width", c.track_width)?;
        positive("chassis.cg_height", c.cg_height)?;
        positive("chassis.cg_to_front", c.cg_to_front)?;
        positive("chassis.cg_to_rear", c.cg_to_rear)?;
        positive("chassis.yaw_inertia", c.yaw_inertia)?;
        finite("chassis.mount_height", c.mount_height)?;
        let axles = c.cg_to_front + c.cg_to_rear;
        let slack = c.wheelbase * 0.01;
        in_range("chassis.cg_to_front + cg_to_rear", axles, c.wheelbase - slack, c.wheelbase + slack)?;

        let e = &self.engine;
        positive("engine.max_torque", e.max_torque)?;
        positive("engine.idle_rpm", e.idle_rpm)?;
        positive("engine.max_rpm", e.max_rpm)?;
        positive("engine.rpm_response", e.rpm_response)?;
        if e.idle_rpm >= e.max_rpm {
            return Err(ConfigError::IdleAboveMax { idle: e.idle_rpm, max: e.max_rpm });
        }

        let t = &self.transmission;
        match t.gear_ratios.first() {
            Some(r) if r.is_finite() && *r < 0.0 => {}
            _ => return Err(ConfigError::MissingReverseGear),
        }
        if t.gear_ratios.len() < 2 {
            return Err(ConfigError::MissingForwardGear);
        }
        if t.gear_ratios.len() > MAX_GEAR_RATIOS {
            return Err(ConfigError::TooManyGears { count: t.gear_ratios.len(), max: MAX_GEAR_RATIOS });
        }
        for r in &t.gear_ratios[1..] {
            positive("transmission.gear_ratios", *r)?;
        }
        positive("transmission.final_drive", t.final_drive)?;
        positive("transmission.efficiency", t.efficiency)?;
        in_range("transmission.efficiency", t.efficiency, 0.0, 1.0)?;
        positive("transmission.clutch_step", t.clutch_step)?;
        in_range("transmission.clutch_step", t.clutch_step, 0.0, 1.0)?;

        let w = &self.tire;
        positive("tire.radius", w.radius)?;
        positive("tire.width", w.width)?;
        positive("tire.mass", w.mass)?;
        for (name, k) in [("tire.lateral", &w.lateral), ("tire.longitudinal", &w.longitudinal)] {
            positive(name, k.b)?;
            positive(name, k.c)?;
            positive(name, k.d)?;
            finite(name, k.e)?;
        }

        let s = &self.suspension;
        positive("suspension.spring_rate", s.spring_rate)?;
        positive("suspension.damper_rate", s.damper_rate)?;
        positive("suspension.max_travel", s.max_travel)?;
        positive("suspension.rest_length", s.rest_length)?;

        let a = &self.aero;
        positive("aero.drag_coefficient", a.drag_coefficient)?;
        positive("aero.downforce_coefficient", a.downforce_coefficient)?;
        positive("aero.frontal_area", a.frontal_area)?;
        positive("aero.air_density", a.air_density)?;

        let b = &self.brakes;
        positive("brakes.brake_force", b.brake_force)?;
        positive("brakes.handbrake_force", b.handbrake_force)?;
        finite("brakes.front_bias", b.front_bias)?;
        in_range("brakes.front_bias", b.front_bias, 0.0, 1.0)?;

        let st = &self.steering;
        positive("steering.max_angle", st.max_angle)?;
        positive("steering.steer_speed", st.steer_speed)?;
        positive("steering.return_speed", st.return_speed)?;

        Ok(())
    }

    // --------------------------------------------------
    // Derived quantities
    // --------------------------------------------------

    /// Per-wheel load with the car standing still (N).
    pub fn static_wheel_load(&self) -> f32 {
        self.chassis.mass * GRAVITY / 4.0
    }

    /// Spring compression that carries the static load.
    pub fn static_compression(&self) -> f32 {
        (self.static_wheel_load() / self.suspension.spring_rate).clamp(0.0, self.suspension.max_travel)
    }

    /// Chassis Y at static equilibrium over flat ground at height 0.
    pub fn ride_height(&self) -> f32 {
        self.tire.radius + self.suspension.rest_length - self.chassis.mount_height - self.static_compression()
    }

    /// Chassis-local wheel mount point. Left wheels sit on +X, front on +Z.
    pub fn mount_position(&self, wheel: WheelId) -> Vec3 {
        let half_track = self.chassis.track_width * 0.5;
        let x = if wheel.is_left() { half_track } else { -half_track };
        let z = if wheel.is_front() { self.chassis.cg_to_front } else { -self.chassis.cg_to_rear };
        vec3(x, self.chassis.mount_height, z)
    }

    /// Highest forward gear index.
    pub fn top_gear(&self) -> i8 {
        let forward = self.transmission.gear_ratios.len().saturating_sub(1);
        i8::try_from(forward).unwrap_or(i8::MAX)
    }
}

fn finite(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() { Ok(()) } else { Err(ConfigError::NonFinite { field }) }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    finite(field, value)?;
    if value > 0.0 { Ok(()) } else { Err(ConfigError::NonPositive { field, value }) }
}

fn in_range(field: &'static str, value: f32, min: f32, max: f32) -> Result<(), ConfigError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange { field, value, min, max })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_are_valid() {
        VehicleConfig::gt86().validate().unwrap();
        VehicleConfig::hatchback().validate().unwrap();
    }

    #[test]
    fn rejects_non_positive_mass() {
        let mut c = VehicleConfig::default();
        c.chassis.mass = 0.0;
        assert!(matches!(
            c.validate(),
            Err(ConfigError::NonPositive { field: "chassis.mass", .. })
        ));
    }

    #[test]
    fn rejects_nan_spring() {
        let mut c = VehicleConfig::default();
        c.suspension.spring_rate = f32::NAN;
        assert!(matches!(c.validate(), Err(ConfigError::NonFinite { .. })));
    }

    #[test]
    fn gear_list_needs_reverse_and_forward() {
        let mut c = VehicleConfig::default();
        c.transmission.gear_ratios = vec![3.5, 2.0];
        assert!(matches!(c.validate(), Err(ConfigError::MissingReverseGear)));

        c.transmission.gear_ratios = vec![-3.5];
        assert!(matches!(c.validate(), Err(ConfigError::MissingForwardGear)));

        c.transmission.gear_ratios = vec![-3.5, 0.0];
        assert!(matches!(c.validate(), Err(ConfigError::NonPositive { .. })));
    }

    #[test]
    fn gear_count_fits_the_gear_index() {
        let mut c = VehicleConfig::default();
        c.transmission.gear_ratios = std::iter::once(-3.5).chain(std::iter::repeat(1.0).take(200)).collect();
        assert!(matches!(c.validate(), Err(ConfigError::TooManyGears { count: 201, .. })));
        assert_eq!(c.top_gear(), i8::MAX);

        c.transmission.gear_ratios.truncate(MAX_GEAR_RATIOS);
        c.validate().unwrap();
        assert_eq!(c.top_gear(), i8::MAX);
    }

    #[test]
    fn idle_must_be_below_redline() {
        let mut c = VehicleConfig::default();
        c.engine.idle_rpm = 8000.0;
        assert!(matches!(c.validate(), Err(ConfigError::IdleAboveMax { .. })));
    }

    #[test]
    fn brake_bias_is_a_fraction() {
        let mut c = VehicleConfig::default();
        c.brakes.front_bias = 1.2;
        assert!(matches!(c.validate(), Err(ConfigError::OutOfRange { field: "brakes.front_bias", .. })));
    }

    #[test]
    fn axle_offsets_must_match_wheelbase() {
        let mut c = VehicleConfig::default();
        c.chassis.cg_to_front = 2.0;
        assert!(c.validate().is_err());
    }

    #[test]
    fn mounts_are_symmetric() {
        let c = VehicleConfig::default();
        let fl = c.mount_position(WheelId::FrontLeft);
        let fr = c.mount_position(WheelId::FrontRight);
        let rl = c.mount_position(WheelId::RearLeft);
        assert_eq!(fl.x, -fr.x);
        assert!(fl.x > 0.0);
        assert!(fl.z > 0.0 && rl.z < 0.0);
        assert!(((fl.z - rl.z) - c.chassis.wheelbase).abs() < 1e-4);
    }

    #[test]
    fn ride_height_puts_tires_at_static_compression() {
        let c = VehicleConfig::default();
        let bottom = c.ride_height() + c.chassis.mount_height - c.tire.radius - c.suspension.rest_length;
        assert!((-bottom - c.static_compression()).abs() < 1e-5);
        let carried = 4.0 * c.static_compression() * c.suspension.spring_rate;
        assert!((carried - c.chassis.mass * GRAVITY).abs() < 1.0);
    }

    #[test]
    fn yaml_overrides_a_subset() {
        let c = VehicleConfig::from_yaml_str(
            "chassis:\n  mass: 1400.0\nbrakes:\n  front_bias: 0.7\n",
        )
        .unwrap();
        assert_eq!(c.chassis.mass, 1400.0);
        assert_eq!(c.brakes.front_bias, 0.7);
        assert_eq!(c.tire.radius, VehicleConfig::default().tire.radius);
    }

    #[test]
    fn yaml_is_validated() {
        let err = VehicleConfig::from_yaml_str("aero:\n  frontal_area: -1.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::NonPositive { field: "aero.frontal_area", .. }));
    }
}
