use std::collections::HashMap;

use anyhow::Context;

use crate::animation::ScrollTimeline;
use crate::camera::Camera;
use crate::color;
use crate::config::StageConfig;
use crate::lighting::LightRig;
use crate::loader::LoadedAsset;
use crate::scene_graph::{Fog, ObjectId, Scene};
use crate::scroll::ScrollState;
use crate::viewport::Viewport;

/// The whole stage in one explicit context: scene graph, camera, lights,
/// viewport, scroll state and the loaded-models registry. Constructed once
/// at startup; bootstrap, resize, load and frame-loop code all operate on
/// this rather than on shared globals.
pub struct Stage {
    pub config: StageConfig,
    pub scene: Scene,
    pub camera: Camera,
    pub lights: LightRig,
    pub viewport: Viewport,
    pub scroll: ScrollState,
    pub floor: ObjectId,
    /// Pre-allocated container group per asset entry.
    groups: HashMap<String, ObjectId>,
    /// Populated only as loads complete; a failed asset never appears here.
    registry: HashMap<String, ObjectId>,
    timeline: Option<ScrollTimeline>,
    animation_ready: bool,
}

impl Stage {
    pub fn new(config: StageConfig) -> Self {
        let mut scene = Scene::new(color::BACKGROUND, Fog::stage());
        let floor = scene.spawn_floor();

        let groups = config
            .assets
            .iter()
            .map(|entry| (entry.name.clone(), scene.add_group(entry.name.clone())))
            .collect();

        Self {
            camera: Camera::new(config.camera_eye),
            lights: LightRig::new(),
            viewport: Viewport::new(),
            scroll: ScrollState::new(config.page_scroll_range),
            floor,
            groups,
            registry: HashMap::new(),
            timeline: None,
            animation_ready: false,
            scene,
            config,
        }
    }

    /// The resize handler. Idempotent; a zero-sized layout box leaves both
    /// the viewport and the camera untouched. Returns whether the viewport
    /// actually changed, so the caller knows to resize the surface.
    pub fn resize(&mut self, width: f32, height: f32, host_pixel_ratio: f64) -> bool {
        if !self.viewport.update(width, height, host_pixel_ratio) {
            return false;
        }

        self.camera
            .update_aspect(self.viewport.width(), self.viewport.height());
        true
    }

    /// Spawns a finished load under its pre-allocated group and records the
    /// group in the registry.
    pub fn attach_asset(&mut self, asset: LoadedAsset) -> anyhow::Result<()> {
        let group = *self
            .groups
            .get(&asset.name)
            .with_context(|| format!("no group allocated for asset '{}'", asset.name))?;

        let gltf_scene = asset
            .document
            .scenes()
            .next()
            .with_context(|| format!("no scenes in glTF for asset '{}'", asset.name))?;

        self.scene
            .spawn_gltf_scene(&asset.name, &asset.buffers, &gltf_scene, group)?;

        self.mark_loaded(&asset.name);
        Ok(())
    }

    fn mark_loaded(&mut self, name: &str) -> Option<ObjectId> {
        let group = *self.groups.get(name)?;
        self.registry.insert(name.to_string(), group);
        Some(group)
    }

    #[allow(dead_code)]
    pub fn loaded(&self, name: &str) -> Option<ObjectId> {
        self.registry.get(name).copied()
    }

    /// Animation setup, triggered exactly once by the load barrier. Applies
    /// the static rest offsets, then builds the scroll timeline unless the
    /// user asked for reduced motion. Returns whether this call did the
    /// setup.
    pub fn setup_animation(&mut self, reduced_motion: bool) -> bool {
        if self.animation_ready {
            return false;
        }
        self.animation_ready = true;

        let offsets: Vec<(ObjectId, glam::Vec3)> = self
            .registry
            .iter()
            .filter_map(|(name, &group)| {
                self.config.asset(name).map(|entry| (group, entry.rest_offset))
            })
            .collect();

        for (group, offset) in offsets {
            self.scene.set_translation(group, offset);
        }

        if reduced_motion {
            log::info!("reduced motion requested, skipping scroll timeline");
            return true;
        }

        let Some(spec) = &self.config.timeline else {
            return true;
        };

        let Some(&target) = self.registry.get(&spec.target) else {
            // The target asset failed to load; nothing to animate.
            log::warn!("timeline target '{}' not loaded, no timeline", spec.target);
            return true;
        };

        let from = self
            .config
            .asset(&spec.target)
            .map(|entry| entry.rest_offset.x)
            .unwrap_or(0.0);

        self.timeline = Some(ScrollTimeline::new(target, from, spec.to_x, self.config.scrub));
        true
    }

    #[allow(dead_code)]
    pub fn has_timeline(&self) -> bool {
        self.timeline.is_some()
    }

    /// One frame of stage logic: scrub the timeline toward the current
    /// scroll progress and write the animated position back to the target
    /// group. Camera look-at is re-derived per frame inside the renderer.
    pub fn update(&mut self, dt: f32) {
        if let Some(timeline) = &mut self.timeline {
            let x = timeline.advance(self.scroll.progress(), dt);
            self.scene.set_translation_x(timeline.target, x);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loaded_showcase_stage(scrub: f32) -> Stage {
        let mut config = StageConfig::showcase();
        config.scrub = scrub;
        let mut stage = Stage::new(config);
        stage.mark_loaded("bear").unwrap();
        stage.mark_loaded("dog").unwrap();
        stage
    }

    #[test]
    fn resize_updates_camera_aspect_exactly() {
        let mut stage = Stage::new(StageConfig::intro());
        assert!(stage.resize(1280.0, 720.0, 1.0));
        assert_eq!(stage.camera.aspect(), 1280.0 / 720.0);

        // Degenerate layout box changes nothing.
        assert!(!stage.resize(0.0, 720.0, 1.0));
        assert_eq!(stage.camera.aspect(), 1280.0 / 720.0);
    }

    #[test]
    fn setup_runs_exactly_once() {
        let mut stage = loaded_showcase_stage(0.0);
        assert!(stage.setup_animation(false));
        assert!(!stage.setup_animation(false));
        assert!(!stage.setup_animation(true));
        assert!(stage.has_timeline());
    }

    #[test]
    fn reduced_motion_gets_static_offsets_only() {
        let mut stage = loaded_showcase_stage(0.0);
        stage.setup_animation(true);

        assert!(!stage.has_timeline());
        let bear = stage.loaded("bear").unwrap();
        let dog = stage.loaded("dog").unwrap();
        assert_eq!(stage.scene.translation(bear).unwrap().x, 5.0);
        assert_eq!(stage.scene.translation(dog).unwrap().x, -5.0);

        // Scrolling with no timeline moves nothing.
        stage.scroll.set_offset(stage.scroll.max_offset());
        stage.update(1.0 / 60.0);
        assert_eq!(stage.scene.translation(bear).unwrap().x, 5.0);
    }

    #[test]
    fn scroll_progress_drives_the_bear() {
        let mut stage = loaded_showcase_stage(0.0);
        stage.setup_animation(false);
        let bear = stage.loaded("bear").unwrap();

        stage.update(1.0 / 60.0);
        assert_eq!(stage.scene.translation(bear).unwrap().x, 5.0);

        stage.scroll.set_offset(stage.scroll.max_offset());
        stage.update(1.0 / 60.0);
        assert_eq!(stage.scene.translation(bear).unwrap().x, 1.0);

        stage.scroll.set_offset(0.0);
        stage.update(1.0 / 60.0);
        assert_eq!(stage.scene.translation(bear).unwrap().x, 5.0);
    }

    #[test]
    fn missing_timeline_target_degrades_to_static_offsets() {
        let mut config = StageConfig::showcase();
        config.scrub = 0.0;
        let mut stage = Stage::new(config);
        // Only the dog load completed; the bear (the timeline target) failed.
        stage.mark_loaded("dog").unwrap();

        assert!(stage.setup_animation(false));
        assert!(!stage.has_timeline());

        let dog = stage.loaded("dog").unwrap();
        assert_eq!(stage.scene.translation(dog).unwrap().x, -5.0);
        assert!(stage.loaded("bear").is_none());
    }

    #[test]
    fn intro_variant_needs_no_assets() {
        let mut stage = Stage::new(StageConfig::intro());
        assert!(stage.setup_animation(false));
        assert!(!stage.has_timeline());
        stage.update(1.0 / 60.0);
    }
}
