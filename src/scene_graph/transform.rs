use glam::{Mat4, Quat, Vec3};

/// Local translation/rotation/uniform-scale. World matrices are composed on
/// demand by the scene traversal; the node count here is far too small for
/// dirty-flag caching to pay for itself.
#[derive(Debug, Clone)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: f32,
}

impl Transform {
    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            rotation: Quat::IDENTITY,
            scale: 1.0,
        }
    }

    pub fn local_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            Vec3::splat(self.scale),
            self.rotation,
            self.translation,
        )
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::from_translation(Vec3::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_matrix_applies_translation() {
        let transform = Transform::from_translation(Vec3::new(5.0, 0.0, 0.0));
        let point = transform.local_matrix().transform_point3(Vec3::ZERO);
        assert_eq!(point, Vec3::new(5.0, 0.0, 0.0));
    }
}
