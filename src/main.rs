use anyhow::Result;

mod animation;
mod camera;
mod color;
mod config;
mod frame_loop;
mod lighting;
mod loader;
mod model;
mod rendering;
mod scene_graph;
mod scroll;
mod stage;
mod viewport;
mod window;

use config::StageConfig;

fn main() -> Result<()> {
    pretty_env_logger::init();

    let variant = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "showcase".to_string());

    let config = match variant.as_str() {
        "intro" => StageConfig::intro(),
        "showcase" => StageConfig::showcase(),
        other => anyhow::bail!("unknown variant '{}', expected 'intro' or 'showcase'", other),
    };

    pollster::block_on(window::run(config))?;

    Ok(())
}
