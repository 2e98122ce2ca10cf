use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Context;
use glam::Vec3;
use wgpu::CommandEncoderDescriptor;
use winit::window::Window;

use crate::model::SceneModelId;
use crate::rendering::{
    instance::Instance,
    passes::{
        forward_pass::{ForwardPass, ForwardPassTextureViews},
        pass::Pass,
        shadow_pass::{ShadowPass, ShadowPassTextureViews},
    },
    render_camera::RenderCamera,
    render_common::RenderCommon,
    render_model::RenderModel,
    scene_uniform::{SceneUniform, SceneUniformState, TONE_MAPPING_EXPOSURE},
    shadow::ShadowMap,
    texture::DepthTexture,
};
use crate::stage::Stage;

pub struct Renderer {
    pub window: Arc<Window>,
    pub size: (u32, u32),

    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,

    common: Arc<RenderCommon>,
    depth_texture: DepthTexture,
    shadow_map: ShadowMap,

    render_camera: RenderCamera,
    scene_uniform: SceneUniform,

    // Models appear here as their async loads land; the scene arena is the
    // source of truth.
    render_models: HashMap<SceneModelId, RenderModel>,

    shadow_pass: ShadowPass,
    forward_pass: ForwardPass,
}

impl Renderer {
    pub async fn new(window: Arc<Window>, stage: &Stage) -> anyhow::Result<Renderer> {
        let size = stage.viewport.surface_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let surface = instance
            .create_surface(window.clone())
            .context("mount point not found: failed to create drawing surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("mount point not found: no compatible graphics adapter")?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                label: None,
                memory_hints: Default::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .context("mount point not found: failed to acquire graphics device")?;

        let render_camera = RenderCamera::new(&device, &stage.camera);
        let scene_uniform = SceneUniform::new(&device, SceneUniformState::new(stage));

        let common = Arc::new(RenderCommon::new(
            &device,
            &adapter,
            &surface,
            size,
            render_camera.buffer.clone(),
            scene_uniform.buffer.clone(),
        ));

        let depth_texture = DepthTexture::new(&device, size, "Depth Texture");
        let shadow_map = ShadowMap::new(&device, &stage.lights.key.shadow);

        let shadow_pass = ShadowPass::create(&device, &common)?;
        let forward_pass = ForwardPass::create(
            &device,
            &common,
            &shadow_map,
            tone_mapped_clear(stage.scene.background),
        )?;

        Ok(Self {
            window,
            size,
            surface,
            device,
            queue,
            common,
            depth_texture,
            shadow_map,
            render_camera,
            scene_uniform,
            render_models: HashMap::new(),
            shadow_pass,
            forward_pass,
        })
    }

    /// Resizes the surface backing buffer. The caller passes physical
    /// pixels derived from the viewport record, so the pixel ratio clamp
    /// has already been applied.
    pub fn resize(&mut self, new_size: (u32, u32)) {
        if new_size.0 == 0 || new_size.1 == 0 {
            return;
        }

        self.size = new_size;

        let mut config = self.common.output_surface_config.write().unwrap();
        config.width = new_size.0;
        config.height = new_size.1;
        self.surface.configure(&self.device, &config);
        drop(config);

        self.depth_texture.resize(&self.device, new_size);
    }

    pub fn render(&mut self, stage: &Stage) -> Result<(), wgpu::SurfaceError> {
        // Per-frame look-at: the view matrix is rebuilt from eye/target on
        // every frame.
        self.render_camera.update(&self.queue, &stage.camera);
        self.scene_uniform
            .update(&self.queue, SceneUniformState::new(stage));

        // Upload any models that landed since the last frame.
        for (id, model) in stage.scene.models.iter() {
            if !self.render_models.contains_key(&id) {
                log::info!(
                    "uploaded model '{}' ({} primitives)",
                    model.name,
                    model.primitives.len()
                );
                self.render_models
                    .insert(id, RenderModel::from_model(&self.device, model));
            }
        }

        for render_model in self.render_models.values_mut() {
            render_model.clear_instances();
        }

        stage.scene.visit_world(&mut |object, world| {
            let Some(model_id) = object.model_id else {
                return;
            };
            if let Some(render_model) = self.render_models.get_mut(&model_id) {
                let instance = Instance::new(world, object.receive_shadow);
                render_model.instances.add(instance);
                if object.cast_shadow {
                    render_model.caster_instances.add(instance);
                }
            }
        });

        for render_model in self.render_models.values() {
            render_model.write_instance_buffers(&self.queue);
        }

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        self.shadow_pass.render(
            &ShadowPassTextureViews {
                depth: self.shadow_map.view.clone(),
            },
            &mut encoder,
            |render_pass| {
                for render_model in self.render_models.values() {
                    if !render_model.caster_instances.should_render() {
                        continue;
                    }

                    render_pass.set_vertex_buffer(1, render_model.caster_buffer.buffer().slice(..));
                    for primitive in &render_model.primitives {
                        render_pass.set_vertex_buffer(0, primitive.vertex_buffer.slice(..));
                        render_pass.set_index_buffer(
                            primitive.index_buffer.slice(..),
                            wgpu::IndexFormat::Uint32,
                        );
                        render_pass.draw_indexed(
                            0..primitive.num_indices,
                            0,
                            0..render_model.caster_instances.len() as u32,
                        );
                    }
                }
            },
        );

        self.forward_pass.render(
            &ForwardPassTextureViews {
                color: view.clone(),
                depth: self.depth_texture.view().clone(),
            },
            &mut encoder,
            |render_pass| {
                for render_model in self.render_models.values() {
                    if !render_model.instances.should_render() {
                        continue;
                    }

                    render_pass
                        .set_vertex_buffer(1, render_model.instance_buffer.buffer().slice(..));
                    for primitive in &render_model.primitives {
                        render_pass.set_vertex_buffer(0, primitive.vertex_buffer.slice(..));
                        render_pass.set_index_buffer(
                            primitive.index_buffer.slice(..),
                            wgpu::IndexFormat::Uint32,
                        );
                        render_pass.draw_indexed(
                            0..primitive.num_indices,
                            0,
                            0..render_model.instances.len() as u32,
                        );
                    }
                }
            },
        );

        self.queue.submit([encoder.finish()]);
        output.present();

        Ok(())
    }
}

/// Clear color matching what the forward shader would output for the
/// background, so fogged geometry blends into the clear seamlessly.
fn tone_mapped_clear(background: Vec3) -> wgpu::Color {
    let exposed = background * TONE_MAPPING_EXPOSURE;
    let mapped = exposed / (Vec3::ONE + exposed);
    wgpu::Color {
        r: mapped.x as f64,
        g: mapped.y as f64,
        b: mapped.z as f64,
        a: 1.0,
    }
}
