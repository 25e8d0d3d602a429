//! rigview: loads a bone/cuboid model (and optionally a texture atlas) and
//! shows it under a free-look camera.
//!
//! Hold the left mouse button to look around, W/A/S/D to move, Escape to quit.

mod config;
mod scene;
mod viewer;

use anyhow::Context;
use rigview_engine::camera::CameraConfig;
use rigview_engine::device::GpuInit;
use rigview_engine::frame::FrameConfig;
use rigview_engine::logging::{LoggingConfig, init_logging};
use rigview_engine::window::{Runtime, RuntimeConfig};

use crate::config::ViewerConfig;
use crate::viewer::Viewer;

fn main() -> anyhow::Result<()> {
    init_logging(LoggingConfig::default());

    let config = ViewerConfig::from_env();
    log::info!("asset root: {}", config.asset_root.display());

    let assets = scene::load(&config).context("failed to load assets")?;
    let viewer = Viewer::new(assets, CameraConfig::default());

    Runtime::run(RuntimeConfig::default(), GpuInit::default(), FrameConfig::default(), viewer)
}
