use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use winit::{
    application::ApplicationHandler,
    event::{ElementState, KeyEvent, MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{Key, NamedKey},
    window::Window,
};

use crate::config::StageConfig;
use crate::frame_loop::FrameLoop;
use crate::loader::AssetLoader;
use crate::rendering::renderer::Renderer;
use crate::stage::Stage;

struct App {
    stage: Stage,
    renderer: Option<Renderer>,
    loader: Option<AssetLoader>,
    frame_loop: FrameLoop,
    runtime: tokio::runtime::Runtime,
    pending_resize: Option<(f32, f32, f64)>,
    last_resize: Instant,
}

impl App {
    fn new(config: StageConfig, runtime: tokio::runtime::Runtime) -> Self {
        Self {
            stage: Stage::new(config),
            renderer: None,
            loader: None,
            frame_loop: FrameLoop::new(),
            runtime,
            pending_resize: None,
            last_resize: Instant::now(),
        }
    }

    fn bootstrap(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        let window_attributes = Window::default_attributes().with_title("scrollstage");
        let window = Arc::new(
            event_loop
                .create_window(window_attributes)
                .context("mount point not found: failed to create window")?,
        );

        // Initial resize runs unconditionally; no initial layout is assumed.
        let scale = window.scale_factor();
        let size = window.inner_size().to_logical::<f32>(scale);
        self.stage.resize(size.width, size.height, scale);

        let renderer = pollster::block_on(Renderer::new(window, &self.stage))?;

        // All loads start together; an empty asset list gives a zero-count
        // barrier that fires on the first poll.
        self.loader = Some(AssetLoader::spawn(
            self.runtime.handle(),
            &self.stage.config.assets,
            self.stage.config.load_timeout,
        ));

        renderer.window.request_redraw();
        self.renderer = Some(renderer);

        Ok(())
    }

    fn queue_resize(&mut self) {
        let Some(renderer) = &self.renderer else {
            return;
        };

        let scale = renderer.window.scale_factor();
        let size = renderer.window.inner_size().to_logical::<f32>(scale);

        match self.stage.config.resize_throttle {
            Some(throttle) if self.last_resize.elapsed() < throttle => {
                self.pending_resize = Some((size.width, size.height, scale));
            }
            _ => self.apply_resize(size.width, size.height, scale),
        }
    }

    fn apply_resize(&mut self, width: f32, height: f32, scale: f64) {
        self.last_resize = Instant::now();
        self.pending_resize = None;

        if self.stage.resize(width, height, scale) {
            if let Some(renderer) = &mut self.renderer {
                renderer.resize(self.stage.viewport.surface_size());
            }
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        // A cancelled loop renders no further frames.
        let Some(dt) = self.frame_loop.begin_tick() else {
            return;
        };

        if let Some((width, height, scale)) = self.pending_resize {
            let due = self
                .stage
                .config
                .resize_throttle
                .map_or(true, |throttle| self.last_resize.elapsed() >= throttle);
            if due {
                self.apply_resize(width, height, scale);
            }
        }

        if let Some(loader) = &mut self.loader {
            let finished = loader.poll();
            for asset in finished {
                if let Err(error) = self.stage.attach_asset(asset) {
                    log::error!("failed to attach asset: {:#}", error);
                }
            }

            if loader.barrier.take_fire() {
                let reduced_motion = self.stage.config.reduced_motion();
                self.stage.setup_animation(reduced_motion);
            }
        }

        self.stage.update(dt);

        let Some(renderer) = &mut self.renderer else {
            return;
        };
        renderer.window.request_redraw();

        match renderer.render(&self.stage) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                let size = renderer.size;
                renderer.resize(size);
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("Out of memory");
                self.frame_loop.cancel();
                event_loop.exit();
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("Timeout");
            }
            Err(other) => {
                log::error!("Unexpected error: {:?}", other);
            }
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.renderer.is_some() {
            return;
        }

        if let Err(error) = self.bootstrap(event_loop) {
            // Bootstrap failures (including the missing mount point) are
            // reported once, here, instead of crashing mid-render.
            log::error!("bootstrap failed: {:#}", error);
            self.frame_loop.cancel();
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        logical_key: Key::Named(NamedKey::Escape),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => {
                self.frame_loop.cancel();
                event_loop.exit();
            }
            WindowEvent::Resized(_) | WindowEvent::ScaleFactorChanged { .. } => {
                self.queue_resize();
            }
            WindowEvent::MouseWheel { delta, .. } => match delta {
                MouseScrollDelta::LineDelta(_, y) => self.stage.scroll.apply_line_delta(y),
                MouseScrollDelta::PixelDelta(position) => {
                    self.stage.scroll.apply_pixel_delta(position.y as f32)
                }
            },
            WindowEvent::RedrawRequested => {
                self.redraw(event_loop);
            }
            _ => (),
        }
    }
}

pub async fn run(config: StageConfig) -> anyhow::Result<()> {
    let event_loop = EventLoop::new().context("Failed to create event loop")?;
    let runtime = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;

    let mut app = App::new(config, runtime);
    event_loop.run_app(&mut app)?;

    Ok(())
}
