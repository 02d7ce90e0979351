//! Small vector helpers shared by every model (pure, no side effects).
// math.rs
use nalgebra::Vector3;

/// World/body vector. Y is up, +Z is the chassis forward axis, +X is left.
pub type Vec3 = Vector3<f32>;

const NORM_EPS: f32 = 1e-6;

#[inline]
pub fn vec3(x: f32, y: f32, z: f32) -> Vec3 {
    Vec3::new(x, y, z)
}

/// Yaw component of `r × f` (the only rotational axis the core models).
#[inline]
pub fn yaw_torque(r: &Vec3, f: &Vec3) -> f32 {
    r.z * f.x - r.x * f.z
}

pub trait VecExt {
    /// Unit vector, or zero when the magnitude is ~0. Never fails.
    fn normalize_or_zero(&self) -> Vec3;

    /// Rotate in the X/Z plane about +Y. Positive angles turn +Z toward +X.
    fn rotate_y(&self, angle: f32) -> Vec3;

    /// Same vector with Y dropped.
    fn horizontal(&self) -> Vec3;
}

impl VecExt for Vec3 {
    #[inline]
    fn normalize_or_zero(&self) -> Vec3 {
        let m = self.norm();
        if m > NORM_EPS { self / m } else { Vec3::zeros() }
    }

    #[inline]
    fn rotate_y(&self, angle: f32) -> Vec3 {
        let (s, c) = angle.sin_cos();
        Vec3::new(
            self.x * c + self.z * s,
            self.y,
            -self.x * s + self.z * c,
        )
    }

    #[inline]
    fn horizontal(&self) -> Vec3 {
        Vec3::new(self.x, 0.0, self.z)
    }
}
