use std::path::PathBuf;
use std::time::Duration;

use glam::Vec3;

/// Environment variable consulted when no reduced-motion override is set.
/// Stands in for the `prefers-reduced-motion` media query of the web build.
const REDUCED_MOTION_ENV: &str = "SCROLLSTAGE_REDUCED_MOTION";

/// One asset to load at startup. `rest_offset` is the group's static
/// position, applied once at animation setup.
#[derive(Debug, Clone)]
pub struct AssetEntry {
    pub name: String,
    pub path: PathBuf,
    pub rest_offset: Vec3,
}

/// The single scroll-bound tween: moves `target`'s group to `to_x` over the
/// page scroll range.
#[derive(Debug, Clone)]
pub struct TimelineSpec {
    pub target: String,
    pub to_x: f32,
}

/// Everything that differs between the stage variants, plus the tunables.
/// Both variants run through the exact same bootstrap, resize, load and
/// frame-loop code.
#[derive(Debug, Clone)]
pub struct StageConfig {
    pub camera_eye: Vec3,
    pub assets: Vec<AssetEntry>,
    pub timeline: Option<TimelineSpec>,
    /// Virtual page scroll range in pixels; progress 0 is the top, 1 the
    /// bottom.
    pub page_scroll_range: f32,
    /// Scrub smoothing time constant in seconds; 0 disables smoothing.
    pub scrub: f32,
    /// Overrides reduced-motion detection when set.
    pub reduced_motion: Option<bool>,
    /// Best-effort deadline per asset load; a timed-out load counts as
    /// failed.
    pub load_timeout: Duration,
    /// Minimum interval between full resize recomputes. `None` recomputes on
    /// every event; the recompute is cheap enough that throttling has not
    /// been needed so far.
    pub resize_throttle: Option<Duration>,
}

impl StageConfig {
    /// Close-up variant: just the lit floor, no assets, no timeline.
    pub fn intro() -> Self {
        Self {
            camera_eye: Vec3::new(0.0, 1.0, 2.0),
            assets: Vec::new(),
            timeline: None,
            page_scroll_range: 2000.0,
            scrub: 0.3,
            reduced_motion: None,
            load_timeout: Duration::from_secs(30),
            resize_throttle: None,
        }
    }

    /// Pulled-back variant with the animal models and the scroll tween.
    pub fn showcase() -> Self {
        Self {
            camera_eye: Vec3::new(0.0, 1.0, 5.0),
            assets: vec![
                AssetEntry {
                    name: "bear".to_string(),
                    path: PathBuf::from("assets/bear.glb"),
                    rest_offset: Vec3::new(5.0, 0.0, 0.0),
                },
                AssetEntry {
                    name: "dog".to_string(),
                    path: PathBuf::from("assets/dog.glb"),
                    rest_offset: Vec3::new(-5.0, 0.0, 0.0),
                },
            ],
            timeline: Some(TimelineSpec {
                target: "bear".to_string(),
                to_x: 1.0,
            }),
            ..Self::intro()
        }
    }

    /// Resolves the reduced-motion preference: the explicit override wins,
    /// otherwise the environment is consulted once.
    pub fn reduced_motion(&self) -> bool {
        self.reduced_motion.unwrap_or_else(|| {
            matches!(
                std::env::var(REDUCED_MOTION_ENV).as_deref(),
                Ok("1") | Ok("true")
            )
        })
    }

    pub fn asset(&self, name: &str) -> Option<&AssetEntry> {
        self.assets.iter().find(|entry| entry.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variants_share_everything_but_camera_and_assets() {
        let intro = StageConfig::intro();
        let showcase = StageConfig::showcase();

        assert!(intro.assets.is_empty());
        assert!(intro.timeline.is_none());
        assert!(!showcase.assets.is_empty());

        assert_eq!(intro.page_scroll_range, showcase.page_scroll_range);
        assert_eq!(intro.scrub, showcase.scrub);
        assert!(showcase.camera_eye.z > intro.camera_eye.z);
    }

    #[test]
    fn showcase_offsets_match_the_design() {
        let config = StageConfig::showcase();
        assert_eq!(config.asset("bear").unwrap().rest_offset.x, 5.0);
        assert_eq!(config.asset("dog").unwrap().rest_offset.x, -5.0);

        let timeline = config.timeline.unwrap();
        assert_eq!(timeline.target, "bear");
        assert_eq!(timeline.to_x, 1.0);
    }

    #[test]
    fn reduced_motion_override_wins() {
        let mut config = StageConfig::showcase();
        config.reduced_motion = Some(true);
        assert!(config.reduced_motion());

        config.reduced_motion = Some(false);
        assert!(!config.reduced_motion());
    }
}
