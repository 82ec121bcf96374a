//! # starfield
//!
//! Runs the starfield scene headless and logs a summary of the last frame.
//!
//! Usage: `starfield [CONFIG.toml] [FRAMES]`. Without a config file the defaults of the 128x128
//! demo are used; `FRAMES` defaults to ten seconds worth of frames.

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use starfield_engine::config::GameConfig;
use starfield_engine::platform::HeadlessPlatform;
use starfield_engine::scene::starfield_scene;

fn main() -> Result<()> {
    // Initialise structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("starfield_engine=info".parse()?),
        )
        .init();

    let mut args = std::env::args().skip(1);

    let config = match args.next() {
        Some(path) => GameConfig::load(&path).with_context(|| format!("load config {path}"))?,
        None => GameConfig::default(),
    };
    let frames = match args.next() {
        Some(frames) => frames
            .parse::<usize>()
            .with_context(|| format!("invalid frame count `{frames}`"))?,
        None => config.target_fps as usize * 10,
    };

    let scene = starfield_scene(&config)?;
    let mut game = scene.into_game_loop(&config);
    let mut platform = HeadlessPlatform::fixed(1.0 / config.target_fps as f32, frames);

    let ran = game.run(&mut platform)?;

    let state = game.state();
    info!(
        frames = ran,
        entities = game.world().entity_count(),
        draws = platform.last_frame().len(),
        accumulator = state.accumulator,
        "starfield finished"
    );

    Ok(())
}
