use std::path::PathBuf;

use anyhow::Context;
use star_dash::{GameConfig, StarScene, engine};

/// Level file read when no path is given on the command line
const DEFAULT_CONFIG: &str = "star_dash.ron";

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG));

    let config = if path.is_file() {
        GameConfig::load(&path).with_context(|| format!("reading {}", path.display()))?
    } else {
        log::info!("{} not found, using the built-in level", path.display());
        GameConfig::default()
    };

    let mut scene = StarScene::new(config.clone()).context("invalid level configuration")?;
    engine::run(&config, &mut scene)
}
