use std::fs;
use std::path::Path;

use bevy_ecs::resource::Resource;
use bevy_log::info;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{
    DEFAULT_INITIALIZATION_GRACE, DEFAULT_SCREEN_HEIGHT, DEFAULT_SCREEN_WIDTH, TICKS_PER_SECOND,
};
use crate::physics::PhysicsTuning;
use crate::vehicle::{BoatBuildId, ShipBuild};
use crate::water::{SeaConfig, SeaPreset};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] ron::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Everything needed to start a session.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub screen_width: f32,
    pub screen_height: f32,
    pub ticks_per_second: u64,
    /// Seeds boat side and build selection
    pub seed: u64,
    pub sea: SeaConfig,
    pub physics: PhysicsTuning,
    pub ship: ShipBuild,
    /// Builds boats are drawn from
    pub boat_builds: Vec<BoatBuildId>,
    /// Seconds a vehicle is held still after creation
    pub initialization_grace: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::with_preset(SeaPreset::default(), DEFAULT_SCREEN_WIDTH, DEFAULT_SCREEN_HEIGHT)
    }
}

impl GameConfig {
    /// Defaults for the given screen with a three-layer `preset` sea.
    pub fn with_preset(preset: SeaPreset, screen_width: f32, screen_height: f32) -> Self {
        Self {
            screen_width,
            screen_height,
            ticks_per_second: TICKS_PER_SECOND,
            seed: 0,
            sea: preset.to_config(screen_width, screen_height),
            physics: PhysicsTuning::default(),
            ship: ShipBuild::default(),
            boat_builds: BoatBuildId::ALL.to_vec(),
            initialization_grace: DEFAULT_INITIALIZATION_GRACE,
        }
    }

    /// Read and validate a RON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        let config = Self::from_ron(&contents)?;
        info!("Loaded game config from {}", path.display());
        Ok(config)
    }

    /// Parse and validate a RON config string.
    pub fn from_ron(contents: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = ron::de::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_ron(&self) -> Result<String, ConfigError> {
        let pretty_config = ron::ser::PrettyConfig::new().with_depth_limit(4);
        Ok(ron::ser::to_string_pretty(self, pretty_config)?)
    }

    /// Reject configs the simulation cannot run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.screen_width > 0.0 && self.screen_height > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "screen size must be positive, got {}x{}",
                self.screen_width, self.screen_height
            )));
        }
        if self.ticks_per_second == 0 {
            return Err(ConfigError::Invalid("ticks_per_second must be at least 1".into()));
        }
        if !(self.sea.width > 0.0 && self.sea.height > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "sea size must be positive, got {}x{}",
                self.sea.width, self.sea.height
            )));
        }
        if self.sea.layers.is_empty() {
            return Err(ConfigError::Invalid("sea needs at least one layer".into()));
        }
        if self.sea.main_layer >= self.sea.layers.len() {
            return Err(ConfigError::Invalid(format!(
                "main layer {} out of range for {} layers",
                self.sea.main_layer,
                self.sea.layers.len()
            )));
        }
        if self.boat_builds.is_empty() {
            return Err(ConfigError::Invalid("boat_builds must not be empty".into()));
        }
        if self.initialization_grace < 0.0 {
            return Err(ConfigError::Invalid("initialization_grace must not be negative".into()));
        }
        Ok(())
    }

    /// Seconds per fixed tick.
    pub fn tick_duration(&self) -> f32 {
        1.0 / self.ticks_per_second.max(1) as f32
    }
}
