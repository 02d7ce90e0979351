//! Construction-time errors. The per-substep path never returns one.

use thiserror::Error;

use crate::tire::WheelId;

/// Invalid vehicle configuration, reported once when a car is built.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A mass, rate, area, length or ratio that must be strictly positive.
    #[error("{field} must be > 0, got {value}")]
    NonPositive {
        /// Dotted field path, e.g. `suspension.spring_rate`
        field: &'static str,
        /// Offending value
        value: f32,
    },

    /// A bounded field outside its range.
    #[error("{field} must be within [{min}, {max}], got {value}")]
    OutOfRange {
        /// Dotted field path
        field: &'static str,
        /// Offending value
        value: f32,
        /// Lower bound (inclusive)
        min: f32,
        /// Upper bound (inclusive)
        max: f32,
    },

    /// NaN or infinity anywhere in the configuration.
    #[error("{field} is not finite")]
    NonFinite {
        /// Dotted field path
        field: &'static str,
    },

    /// `gear_ratios[0]` must be a negative reverse ratio.
    #[error("gear_ratios needs a negative reverse ratio at index 0")]
    MissingReverseGear,

    /// At least one positive forward ratio after the reverse entry.
    #[error("gear_ratios needs at least one positive forward ratio after reverse")]
    MissingForwardGear,

    /// More forward gears than an `i8` gear index can address.
    #[error("gear_ratios has {count} entries, at most {max} are supported")]
    TooManyGears {
        /// Entries in `gear_ratios`, reverse included
        count: usize,
        /// Largest accepted length
        max: usize,
    },

    /// Idle speed has to sit below the redline.
    #[error("idle_rpm ({idle}) must be below max_rpm ({max})")]
    IdleAboveMax {
        /// Configured idle RPM
        idle: f32,
        /// Configured max RPM
        max: f32,
    },

    /// A restored car must hold each wheel exactly once.
    #[error("saved state lists {wheel:?} {count} times")]
    DuplicateWheel {
        /// Wheel that is missing or repeated
        wheel: WheelId,
        /// How often it appears
        count: usize,
    },

    /// YAML file could not be read or deserialized.
    #[error("failed to load vehicle config: {0}")]
    Load(#[from] ::config::ConfigError),
}
