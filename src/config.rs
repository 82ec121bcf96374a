//! Game configuration, loaded from TOML. Every field is optional and falls back to the
//! defaults of the 128x128 starfield demo.
use crate::factories::{PlayerConfig, StarfieldConfig};
use crate::game_loop::LoopConfig;
use glam::Vec2;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub game_width: u32,
    pub game_height: u32,
    pub star_count: usize,
    /// Seed of the starfield. A fresh entropy seed is used when absent.
    pub seed: Option<u64>,
    pub target_fps: u32,
    pub max_fixed_steps_per_frame: u32,
    /// Velocity of every star in pixels per second.
    pub star_drift: [f32; 2],
    /// Spawns a player when present.
    pub player: Option<PlayerConfig>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            game_width: 128,
            game_height: 128,
            star_count: 100,
            seed: None,
            target_fps: 60,
            max_fixed_steps_per_frame: 8,
            star_drift: [0.0, 0.0],
            player: None,
        }
    }
}

impl GameConfig {
    /// Parses and validates a TOML document.
    ///
    /// ```
    /// use starfield_engine::config::GameConfig;
    ///
    /// let config = GameConfig::from_toml_str("star_count = 25\nseed = 3").unwrap();
    /// assert_eq!(config.star_count, 25);
    /// assert_eq!(config.seed, Some(3));
    /// assert_eq!(config.game_width, 128);
    /// ```
    ///
    /// # Errors
    ///
    /// Fails on malformed TOML or values rejected by [`GameConfig::validate`].
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Fails if the file can not be read, in addition to the errors of
    /// [`GameConfig::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_toml_str(&source)
    }

    /// Rejects zero sizes, a zero frame rate or step cap and non-finite drift.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.game_width < 2 || self.game_height < 2 {
            return Err(ConfigError::Invalid(format!(
                "game area must be at least 2x2, got {}x{}",
                self.game_width, self.game_height
            )));
        }
        if self.target_fps == 0 {
            return Err(ConfigError::Invalid("target_fps must be positive".to_owned()));
        }
        if self.max_fixed_steps_per_frame == 0 {
            return Err(ConfigError::Invalid(
                "max_fixed_steps_per_frame must be positive".to_owned(),
            ));
        }
        if !self.star_drift.iter().all(|axis| axis.is_finite()) {
            return Err(ConfigError::Invalid("star_drift must be finite".to_owned()));
        }

        Ok(())
    }

    /// The play area in pixels.
    #[must_use]
    pub fn game_size(&self) -> Vec2 {
        Vec2::new(self.game_width as f32, self.game_height as f32)
    }

    /// Stars are spawned one pixel short of the game size on each axis, so a star snapped to
    /// whole pixels never lands on the far edge.
    #[must_use]
    pub fn starfield(&self) -> StarfieldConfig {
        StarfieldConfig {
            area_width: self.game_width as f32 - 1.0,
            area_height: self.game_height as f32 - 1.0,
            count: self.star_count,
            drift: Vec2::from_array(self.star_drift),
        }
    }

    #[must_use]
    pub fn loop_config(&self) -> LoopConfig {
        LoopConfig {
            fixed_step: 1.0 / self.target_fps as f32,
            max_fixed_steps_per_frame: self.max_fixed_steps_per_frame,
            max_frames: None,
        }
    }
}
