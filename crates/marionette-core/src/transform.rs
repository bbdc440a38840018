use glam::{Mat4, Quat, Vec3};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    pub fn new(position: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            position,
            rotation,
            scale,
        }
    }

    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }

    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.rotation * (self.scale * point) + self.position
    }

    pub fn transform_vector(&self, vector: Vec3) -> Vec3 {
        self.rotation * (self.scale * vector)
    }

    pub fn inverse(&self) -> Self {
        let inv_rotation = self.rotation.inverse();
        let inv_scale = Vec3::ONE / self.scale;
        let inv_position = inv_rotation * (-self.position * inv_scale);

        Self {
            position: inv_position,
            rotation: inv_rotation,
            scale: inv_scale,
        }
    }
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

impl From<Mat4> for Transform {
    fn from(mat: Mat4) -> Self {
        let (scale, rotation, position) = mat.to_scale_rotation_translation();
        Self {
            position,
            rotation,
            scale,
        }
    }
}

/// Inverse of `m`, or identity when `m` is singular or non-finite.
///
/// Pose retargeting divides by previous-frame matrices; a degenerate matrix
/// must freeze that bone for a frame instead of spreading NaN through the
/// hierarchy.
pub fn invert_or_identity(m: Mat4) -> Mat4 {
    let det = m.determinant();
    if !det.is_finite() || det.abs() < 1e-8 {
        log::warn!("singular matrix inverted, substituting identity");
        return Mat4::IDENTITY;
    }
    let inv = m.inverse();
    if inv.is_finite() {
        inv
    } else {
        log::warn!("non-finite matrix inverse, substituting identity");
        Mat4::IDENTITY
    }
}
