use std::ops::Mul;

use glam::{DMat4, DQuat, DVec3, Mat4};

/// Rigid transform in double precision.
///
/// Scene placement stays in `f64` so long sessions do not accumulate drift;
/// values are narrowed to `f32` only when handed to the GPU.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transform {
    pub translation: DVec3,
    pub rotation: DQuat,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        translation: DVec3::ZERO,
        rotation: DQuat::IDENTITY,
    };

    pub fn from_translation(translation: DVec3) -> Self {
        Self {
            translation,
            rotation: DQuat::IDENTITY,
        }
    }

    pub fn from_rotation(rotation: DQuat) -> Self {
        Self {
            translation: DVec3::ZERO,
            rotation,
        }
    }

    pub fn rotation_x(degrees: f64) -> Self {
        Self::from_rotation(DQuat::from_rotation_x(degrees.to_radians()))
    }

    pub fn rotation_z(degrees: f64) -> Self {
        Self::from_rotation(DQuat::from_rotation_z(degrees.to_radians()))
    }

    /// Places an object at `eye` facing `target` (local -Z forward, `up` as +Y).
    pub fn look_at(eye: DVec3, target: DVec3, up: DVec3) -> Self {
        let view = DMat4::look_at_rh(eye, target, up);
        let (_, rotation, translation) = view.inverse().to_scale_rotation_translation();
        Self {
            translation,
            rotation: rotation.normalize(),
        }
    }

    pub fn inverse(&self) -> Self {
        let rotation = self.rotation.inverse();
        Self {
            translation: -(rotation * self.translation),
            rotation,
        }
    }

    pub fn transform_point(&self, p: DVec3) -> DVec3 {
        self.rotation * p + self.translation
    }

    pub fn transform_vector(&self, v: DVec3) -> DVec3 {
        self.rotation * v
    }

    pub fn to_matrix(&self) -> DMat4 {
        DMat4::from_rotation_translation(self.rotation, self.translation)
    }

    /// Single-precision copy for GPU upload.
    pub fn to_mat4_f32(&self) -> Mat4 {
        Mat4::from_cols_array(&self.to_matrix().to_cols_array().map(|v| v as f32))
    }

    pub fn abs_diff_eq(&self, other: &Self, eps: f64) -> bool {
        self.translation.abs_diff_eq(other.translation, eps)
            && (self.rotation.abs_diff_eq(other.rotation, eps)
                || self.rotation.abs_diff_eq(-other.rotation, eps))
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// `a * b` applies `b` first, then `a`.
impl Mul for Transform {
    type Output = Transform;

    fn mul(self, rhs: Transform) -> Transform {
        Transform {
            translation: self.translation + self.rotation * rhs.translation,
            rotation: (self.rotation * rhs.rotation).normalize(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn compose_then_inverse_is_identity() {
        let a = Transform {
            translation: DVec3::new(1.0, -2.0, 3.5),
            rotation: DQuat::from_rotation_z(0.7) * DQuat::from_rotation_x(-0.3),
        };
        let round = a * a.inverse();
        assert!(round.abs_diff_eq(&Transform::IDENTITY, 1e-12));
    }

    #[test]
    fn composition_order_matches_point_application() {
        let spin = Transform::rotation_z(90.0);
        let offset = Transform::from_translation(DVec3::X);
        let p = (spin * offset).transform_point(DVec3::ZERO);
        assert_relative_eq!(p.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(p.y, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn look_at_faces_the_target() {
        let eye = DVec3::new(12.0, 12.0, 6.0);
        let t = Transform::look_at(eye, DVec3::ZERO, DVec3::Z);
        assert!(t.translation.abs_diff_eq(eye, 1e-9));

        let forward = t.transform_vector(-DVec3::Z);
        let expected = (-eye).normalize();
        assert!(forward.abs_diff_eq(expected, 1e-9));
    }

    #[test]
    fn f32_matrix_matches_f64() {
        let t = Transform::rotation_x(30.0) * Transform::from_translation(DVec3::new(0.0, 1.0, 2.0));
        let m = t.to_mat4_f32();
        let p = t.transform_point(DVec3::ONE);
        let q = m.transform_point3(glam::Vec3::ONE);
        assert_relative_eq!(q.x as f64, p.x, epsilon = 1e-5);
        assert_relative_eq!(q.y as f64, p.y, epsilon = 1e-5);
        assert_relative_eq!(q.z as f64, p.z, epsilon = 1e-5);
    }
}
