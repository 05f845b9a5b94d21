use glam::{EulerRot, Mat4, Quat, Vec3};
use std::f32::consts::TAU;

/// Position, Euler rotation (radians, applied X then Y then Z) and scale of a node
/// relative to its parent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub pos: Vec3,
    pub rot: Vec3,
    pub scale: Vec3,
}

impl Transform {
    pub fn new() -> Self {
        Transform {
            pos: Vec3::ZERO,
            rot: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }

    pub fn from_translation(pos: Vec3) -> Self {
        Transform {
            pos,
            ..Transform::new()
        }
    }

    /// Translate by a given offset
    pub fn translate(&mut self, offset: Vec3) {
        self.pos += offset;
    }

    /// Add to the Euler angles (radians)
    pub fn rotate_euler(&mut self, delta: Vec3) {
        self.rot += delta;
    }

    pub fn quat(&self) -> Quat {
        Quat::from_euler(EulerRot::XYZ, self.rot.x, self.rot.y, self.rot.z)
    }

    /// Local-to-parent matrix. Angles are wrapped into `[0, TAU)` first so long
    /// running animations keep full precision in the trig calls.
    pub fn local_matrix(&self) -> Mat4 {
        let wrapped = Vec3::new(
            self.rot.x.rem_euclid(TAU),
            self.rot.y.rem_euclid(TAU),
            self.rot.z.rem_euclid(TAU),
        );
        let rot = Quat::from_euler(EulerRot::XYZ, wrapped.x, wrapped.y, wrapped.z);
        Mat4::from_scale_rotation_translation(self.scale, rot, self.pos)
    }

    /// Parent-to-world matrix composed with this transform.
    pub fn compose(&self, parent_world: &Mat4) -> Mat4 {
        *parent_world * self.local_matrix()
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn child_offset_follows_parent_rotation() {
        let mut parent = Transform::new();
        parent.rot.y = std::f32::consts::FRAC_PI_2;
        let child = Transform::from_translation(Vec3::new(50.0, 0.0, 0.0));

        let world = child.compose(&parent.local_matrix());
        let p = world.transform_point3(Vec3::ZERO);
        assert_relative_eq!(p.x, 0.0, epsilon = 1e-4);
        assert_relative_eq!(p.z, -50.0, epsilon = 1e-4);
    }

    #[test]
    fn wrapped_angles_give_same_matrix() {
        let mut a = Transform::new();
        a.rot = Vec3::new(0.3, 1.0, 0.0);
        let mut b = a;
        b.rot.y += TAU;
        let (ma, mb) = (a.local_matrix(), b.local_matrix());
        assert!(ma.abs_diff_eq(mb, 1e-5));
    }
}
