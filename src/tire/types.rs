//! Wheel identification and ground surface types.
// tire/types.rs
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================
// Wheel identification
// ============================================

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum WheelId {
    FrontLeft,
    FrontRight,
    RearLeft,
    RearRight,
}

impl WheelId {
    /// Fixed solve order; also the index order of every per-wheel array.
    pub const ALL: [WheelId; 4] = [
        WheelId::FrontLeft,
        WheelId::FrontRight,
        WheelId::RearLeft,
        WheelId::RearRight,
    ];

    #[inline]
    pub fn index(self) -> usize {
        match self {
            WheelId::FrontLeft => 0,
            WheelId::FrontRight => 1,
            WheelId::RearLeft => 2,
            WheelId::RearRight => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WheelId::FrontLeft => "FL",
            WheelId::FrontRight => "FR",
            WheelId::RearLeft => "RL",
            WheelId::RearRight => "RR",
        }
    }

    pub fn is_front(&self) -> bool {
        matches!(self, WheelId::FrontLeft | WheelId::FrontRight)
    }

    pub fn is_rear(&self) -> bool {
        !self.is_front()
    }

    /// Left wheels sit on +X.
    pub fn is_left(&self) -> bool {
        matches!(self, WheelId::FrontLeft | WheelId::RearLeft)
    }
}

impl fmt::Display for WheelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================
// Ground surfaces
// ============================================

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Surface {
    #[default]
    Asphalt,
    Wet,
    Dirt,
    Ice,
    Sand,
}

impl Surface {
    /// Friction coefficient used by the friction-circle clamp.
    pub fn friction(self) -> f32 {
        match self {
            Surface::Asphalt => 0.9,
            Surface::Wet => 0.7,
            Surface::Dirt => 0.6,
            Surface::Ice => 0.3,
            Surface::Sand => 0.5,
        }
    }

    /// Unknown names fall back to asphalt.
    pub fn from_name(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "wet" => Surface::Wet,
            "dirt" => Surface::Dirt,
            "ice" => Surface::Ice,
            "sand" => Surface::Sand,
            _ => Surface::Asphalt,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Surface::Asphalt => "asphalt",
            Surface::Wet => "wet",
            Surface::Dirt => "dirt",
            Surface::Ice => "ice",
            Surface::Sand => "sand",
        }
    }
}
