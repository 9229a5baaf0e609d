//! Placement transforms for bodies and surface anchors.

use glam::{Mat4, Quat, Vec3};

/// A 3D transform representing position, rotation, and scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    /// Uniformly scaled transform at `position`.
    pub fn from_position_scale(position: Vec3, scale: f32) -> Self {
        Self {
            position,
            scale: Vec3::splat(scale),
            ..Default::default()
        }
    }

    /// Transform whose local +Y axis points along `up`, placed at `position`.
    ///
    /// Used to stand a tree upright on a sphere: the turtle grows along +Y.
    /// A zero `up` leaves the rotation at identity.
    pub fn aligned_to(position: Vec3, up: Vec3) -> Self {
        let dir = up.normalize_or_zero();
        let rotation = if dir == Vec3::ZERO {
            Quat::IDENTITY
        } else {
            Quat::from_rotation_arc(Vec3::Y, dir)
        };
        Self {
            position,
            rotation,
            ..Default::default()
        }
    }

    /// Create the model matrix for this transform.
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    /// Get the up direction (positive Y).
    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    /// Matrix that orbits this transform about the world Y axis by `angle`.
    ///
    /// The rotation is applied after placement, so the body sweeps around
    /// the origin rather than spinning in place.
    pub fn orbit_matrix(&self, angle: f32) -> Mat4 {
        Mat4::from_rotation_y(angle) * self.to_matrix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aligned_to_points_up_along_direction() {
        let t = Transform::aligned_to(Vec3::new(0.0, 0.0, 2.0), Vec3::Z);
        assert!((t.up() - Vec3::Z).length() < 1e-5);
        let origin = t.to_matrix().transform_point3(Vec3::ZERO);
        assert!((origin - Vec3::new(0.0, 0.0, 2.0)).length() < 1e-5);
    }

    #[test]
    fn aligned_to_handles_straight_down() {
        let t = Transform::aligned_to(Vec3::ZERO, -Vec3::Y);
        assert!((t.up() + Vec3::Y).length() < 1e-5);
    }

    #[test]
    fn orbit_matrix_moves_position_around_origin() {
        let t = Transform::from_position_scale(Vec3::new(5.0, 0.0, 0.0), 1.0);
        let m = t.orbit_matrix(std::f32::consts::FRAC_PI_2);
        let p = m.transform_point3(Vec3::ZERO);
        assert!((p.length() - 5.0).abs() < 1e-4);
        assert!(p.x.abs() < 1e-4);
    }
}
