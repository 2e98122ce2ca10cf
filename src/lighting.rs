use glam::{Mat4, Vec3};

use crate::color;

/// Shadow parameters for the key light. Fixed at construction.
#[derive(Debug, Clone)]
pub struct ShadowSettings {
    pub map_size: u32,
    pub camera_far: f32,
    pub normal_bias: f32,
}

/// Sun-style light with parallel rays, aimed from `position` at the origin.
#[derive(Debug, Clone)]
pub struct DirectionalLight {
    pub color: Vec3,
    pub intensity: f32,
    pub position: Vec3,
    pub cast_shadow: bool,
    pub shadow: ShadowSettings,
}

impl DirectionalLight {
    /// The stage's single key light.
    pub fn key() -> Self {
        Self {
            color: color::LIGHT,
            intensity: 2.0,
            position: Vec3::new(2.0, 5.0, 3.0),
            cast_shadow: true,
            shadow: ShadowSettings {
                map_size: 1024,
                camera_far: 10.0,
                normal_bias: 0.05,
            },
        }
    }

    pub fn direction(&self) -> Vec3 {
        (-self.position).normalize()
    }

    /// View-projection used to render and sample the shadow map. The ortho
    /// extent covers the area around the origin where the models and the
    /// nearby floor live; geometry past `camera_far` is unshadowed.
    pub fn shadow_view_proj(&self) -> Mat4 {
        let view = Mat4::look_at_rh(self.position, Vec3::ZERO, Vec3::Y);
        let projection =
            Mat4::orthographic_rh(-7.0, 7.0, -7.0, 7.0, 0.1, self.shadow.camera_far);
        projection * view
    }
}

/// Uniform fill light, blending between a sky and a ground color by
/// surface orientation.
#[derive(Debug, Clone)]
pub struct HemisphereLight {
    pub sky_color: Vec3,
    pub ground_color: Vec3,
    pub intensity: f32,
}

impl HemisphereLight {
    pub fn fill() -> Self {
        Self {
            sky_color: color::SKY,
            ground_color: color::GROUND,
            intensity: 0.5,
        }
    }
}

/// The complete, immutable light rig: one shadow-casting key light and one
/// hemisphere fill.
#[derive(Debug, Clone)]
pub struct LightRig {
    pub key: DirectionalLight,
    pub fill: HemisphereLight,
}

impl LightRig {
    pub fn new() -> Self {
        Self {
            key: DirectionalLight::key(),
            fill: HemisphereLight::fill(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_light_shadow_settings() {
        let rig = LightRig::new();
        assert!(rig.key.cast_shadow);
        assert_eq!(rig.key.shadow.map_size, 1024);
        assert_eq!(rig.key.shadow.camera_far, 10.0);
        assert_eq!(rig.key.shadow.normal_bias, 0.05);
    }

    #[test]
    fn key_light_points_at_origin() {
        let light = DirectionalLight::key();
        let direction = light.direction();
        assert!((direction.length() - 1.0).abs() < 1e-6);
        // Direction must run from the light position toward the origin.
        assert!(direction.dot(-light.position) > 0.0);
    }
}
