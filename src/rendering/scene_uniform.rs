use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use wgpu::util::DeviceExt;

use crate::stage::Stage;

/// Fixed tone mapping exposure (Reinhard operator in the forward shader).
pub const TONE_MAPPING_EXPOSURE: f32 = 5.0;

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct SceneUniformState {
    pub light_view_proj: Mat4,
    /// xyz: normalized key light direction.
    pub light_direction: [f32; 4],
    /// rgb: key light color, w: intensity.
    pub light_color: [f32; 4],
    /// rgb: hemisphere sky color, w: hemisphere intensity.
    pub sky_color: [f32; 4],
    /// rgb: hemisphere ground color.
    pub ground_color: [f32; 4],
    /// rgb: fog color.
    pub fog_color: [f32; 4],
    /// x: fog near, y: fog far, z: exposure.
    pub fog_params: [f32; 4],
    /// x: shadow map size in texels, y: shadow normal bias.
    pub shadow_params: [f32; 4],
}

impl SceneUniformState {
    pub fn new(stage: &Stage) -> Self {
        let key = &stage.lights.key;
        let fill = &stage.lights.fill;
        let fog = &stage.scene.fog;
        let direction = key.direction();

        Self {
            light_view_proj: key.shadow_view_proj(),
            light_direction: [direction.x, direction.y, direction.z, 0.0],
            light_color: [key.color.x, key.color.y, key.color.z, key.intensity],
            sky_color: [
                fill.sky_color.x,
                fill.sky_color.y,
                fill.sky_color.z,
                fill.intensity,
            ],
            ground_color: [
                fill.ground_color.x,
                fill.ground_color.y,
                fill.ground_color.z,
                0.0,
            ],
            fog_color: [fog.color.x, fog.color.y, fog.color.z, 1.0],
            fog_params: [fog.near, fog.far, TONE_MAPPING_EXPOSURE, 0.0],
            shadow_params: [
                key.shadow.map_size as f32,
                key.shadow.normal_bias,
                0.0,
                0.0,
            ],
        }
    }
}

pub struct SceneUniform {
    pub buffer: wgpu::Buffer,
}

impl SceneUniform {
    pub fn new(device: &wgpu::Device, initial_state: SceneUniformState) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Scene uniform buffer"),
            contents: bytemuck::cast_slice(&[initial_state]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        Self { buffer }
    }

    pub fn update(&self, queue: &wgpu::Queue, state: SceneUniformState) {
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[state]));
    }
}
