//! Sea layout and ambient wave configuration.
//!
//! A sea is described once per level and can be serialized to level files.

use serde::{Deserialize, Serialize};

use super::wave::WaveConfig;

/// One parallax slice of the sea.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerConfig {
    /// Vertical offset of the layer centre from the sea centre (pixels)
    pub offset_y: f32,
    /// Layer height (pixels)
    pub height: f32,
    /// Background swell, if any. It always occupies wave index 0.
    pub ambient: Option<WaveConfig>,
}

impl LayerConfig {
    pub fn new(offset_y: f32, height: f32, ambient: Option<WaveConfig>) -> Self {
        Self {
            offset_y,
            height,
            ambient,
        }
    }
}

/// Rectangular sea region and its layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeaConfig {
    /// Centre x of the region
    pub x: f32,
    /// Centre y of the region
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub layers: Vec<LayerConfig>,
    /// Layer that vehicles float on
    pub main_layer: usize,
}

impl SeaConfig {
    /// A sea filling the lower part of a screen, with the given layers.
    pub fn for_screen(screen_width: f32, screen_height: f32, layers: Vec<LayerConfig>, main_layer: usize) -> Self {
        let height = screen_height * 0.45;
        Self {
            x: screen_width / 2.0,
            y: screen_height - height / 2.0,
            width: screen_width,
            height,
            layers,
            main_layer,
        }
    }

    /// Config of the layer vehicles float on.
    pub fn main_layer_config(&self) -> Option<&LayerConfig> {
        self.layers.get(self.main_layer)
    }
}

/// Ready-made seas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SeaPreset {
    /// Flat water, no background motion
    Still,
    /// Gentle swell
    Calm,
    /// Standard play sea
    #[default]
    Choppy,
    /// Heavy swell
    Storm,
}

impl SeaPreset {
    fn ambient(self) -> Option<(f32, f32, f32)> {
        match self {
            SeaPreset::Still => None,
            SeaPreset::Calm => Some((0.25, 12.0, 0.2)),
            SeaPreset::Choppy => Some((0.4, 16.0, 0.4)),
            SeaPreset::Storm => Some((0.8, 20.0, 0.6)),
        }
    }

    /// Build a three-layer sea (back, main, front) for the given screen.
    pub fn to_config(self, screen_width: f32, screen_height: f32) -> SeaConfig {
        let base = self.ambient();
        let sea_height = screen_height * 0.45;

        // Background layers move slower and with less amplitude than the main one.
        let layer = |offset: f32, height_ratio: f32, damping: f32| {
            LayerConfig::new(
                offset,
                sea_height * height_ratio,
                base.map(|(amplitude, frequency, speed)| {
                    WaveConfig::ambient(amplitude * damping, frequency, speed * damping)
                }),
            )
        };

        SeaConfig::for_screen(
            screen_width,
            screen_height,
            vec![
                layer(-sea_height * 0.1, 1.0, 0.6),
                layer(0.0, 1.0, 1.0),
                layer(sea_height * 0.15, 0.8, 0.8),
            ],
            1,
        )
    }

    /// A single-layer version of the preset.
    pub fn to_single_layer_config(self, screen_width: f32, screen_height: f32) -> SeaConfig {
        let ambient = self
            .ambient()
            .map(|(amplitude, frequency, speed)| WaveConfig::ambient(amplitude, frequency, speed));
        SeaConfig::for_screen(
            screen_width,
            screen_height,
            vec![LayerConfig::new(0.0, screen_height * 0.45, ambient)],
            0,
        )
    }
}
