//! The sea: a rectangular region of waves, optionally split into parallax
//! layers.
//!
//! A sea built from more than one layer config becomes a pure container: it
//! holds one child `Sea` per layer and no waves of its own. Queries without an
//! explicit layer go to the main layer, which is the only one vehicles float on.

use bevy::math::Vec2;
use bevy_ecs::resource::Resource;
use bevy_log::{debug, warn};

use super::config::{LayerConfig, SeaConfig};
use super::wave::{Wave, WaveConfig, WaveDimensions, WaveSource};

/// Result of a surface query at one x.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SurfaceSample {
    /// Screen y of the water surface
    pub surface_y: f32,
    /// Tallest single crest at this x (pixels above the flat baseline, 0 if none)
    pub max_wave_height: f32,
}

/// Region covered by a sea or layer. `x`/`y` are the centre.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeaBounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl SeaBounds {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Undisturbed surface line.
    #[inline]
    pub fn baseline_y(&self) -> f32 {
        self.y - self.height / 2.0
    }

    pub fn dimensions(&self) -> WaveDimensions {
        WaveDimensions::new(self.width, self.height)
    }
}

#[derive(Resource, Debug, Clone)]
pub struct Sea {
    bounds: SeaBounds,
    waves: Vec<Wave>,
    layers: Vec<Sea>,
    main_layer_index: usize,
}

impl Sea {
    /// Build a sea, starting each layer's ambient swell.
    pub fn new(config: &SeaConfig) -> Self {
        let bounds = SeaBounds::new(config.x, config.y, config.width, config.height);

        if config.layers.len() > 1 {
            let layers = config
                .layers
                .iter()
                .map(|layer| Self::single_layer(&bounds, layer))
                .collect();
            return Self {
                bounds,
                waves: Vec::new(),
                layers,
                main_layer_index: config.main_layer.min(config.layers.len() - 1),
            };
        }

        match config.layers.first() {
            Some(layer) => Self::single_layer(&bounds, layer),
            None => Self {
                bounds,
                waves: Vec::new(),
                layers: Vec::new(),
                main_layer_index: 0,
            },
        }
    }

    fn single_layer(parent: &SeaBounds, layer: &LayerConfig) -> Self {
        let bounds = SeaBounds::new(parent.x, parent.y + layer.offset_y, parent.width, layer.height);
        let waves = layer
            .ambient
            .iter()
            .map(|ambient| {
                Wave::new(
                    WaveConfig {
                        source: WaveSource::AmbientFlow,
                        ..*ambient
                    },
                    bounds.dimensions(),
                )
            })
            .collect();

        Self {
            bounds,
            waves,
            layers: Vec::new(),
            main_layer_index: 0,
        }
    }

    /// Resolve a layer. With child layers, `None` means the main layer and
    /// `Some(i)` the i-th child; a sea without children always resolves to
    /// itself.
    pub fn default_layer(&self, layer: Option<usize>) -> Option<&Sea> {
        if self.layers.is_empty() {
            return Some(self);
        }
        self.layers.get(layer.unwrap_or(self.main_layer_index))
    }

    /// Mutable form of [`Sea::default_layer`].
    pub fn default_layer_mut(&mut self, layer: Option<usize>) -> Option<&mut Sea> {
        if self.layers.is_empty() {
            return Some(self);
        }
        let index = layer.unwrap_or(self.main_layer_index);
        self.layers.get_mut(index)
    }

    /// The layer vehicles float on.
    pub fn main_layer(&self) -> Option<&Sea> {
        self.default_layer(None)
    }

    /// Create a wave on a layer and return it.
    pub fn initiate_wave(&mut self, config: WaveConfig, layer: Option<usize>) -> Option<&Wave> {
        let Some(target) = self.default_layer_mut(layer) else {
            warn!("Cannot initiate wave: no sea layer {:?}", layer);
            return None;
        };

        let wave = Wave::new(config, target.bounds.dimensions());
        debug!(
            "Initiated {:?} wave at x={:.1} (amplitude {:.2}, frequency {:.2}, speed {:.3})",
            config.source, config.origin_x, config.amplitude, config.frequency, config.speed
        );
        target.waves.push(wave);
        target.waves.last()
    }

    /// Surface y at `x` plus the tallest single crest contributing to it.
    pub fn surface_and_max_height_at(&self, x: f32, layer: Option<usize>) -> Option<SurfaceSample> {
        let target = self.default_layer(layer)?;
        let mut sample = SurfaceSample {
            surface_y: target.bounds.baseline_y(),
            max_wave_height: 0.0,
        };

        for wave in &target.waves {
            let contribution = wave.surface_at(x);
            sample.surface_y += contribution;
            sample.max_wave_height = sample.max_wave_height.max(-contribution);
        }

        Some(sample)
    }

    /// Surface gradient `dy/dx` at `x`, summed over the layer's waves.
    pub fn slope_at(&self, x: f32, layer: Option<usize>) -> Option<f32> {
        let target = self.default_layer(layer)?;
        Some(target.waves.iter().map(|wave| wave.slope_at(x)).sum())
    }

    /// Approximate force the disturbance waves exert at `x`. The ambient swell
    /// is excluded; only upward vertical contributions are accumulated.
    pub fn force_at(&self, x: f32, layer: Option<usize>) -> Option<Vec2> {
        let target = self.default_layer(layer)?;
        let mut force = Vec2::ZERO;

        for wave in target
            .waves
            .iter()
            .filter(|wave| wave.source() != WaveSource::AmbientFlow)
        {
            let term = wave.force_at(x);
            force.x += term.x;
            if term.y < 0.0 {
                force.y += term.y;
            }
        }

        Some(force)
    }

    /// Advance every wave on every layer and drop the ones that have expired.
    pub fn update(&mut self, delta: f32) {
        for wave in &mut self.waves {
            wave.update(delta);
        }

        let before = self.waves.len();
        self.waves.retain(|wave| !wave.is_expired());
        if self.waves.len() != before {
            debug!("Removed {} expired waves", before - self.waves.len());
        }

        for layer in &mut self.layers {
            layer.update(delta);
        }
    }

    pub fn bounds(&self) -> SeaBounds {
        self.bounds
    }

    pub fn baseline_y(&self) -> f32 {
        self.bounds.baseline_y()
    }

    pub fn waves(&self) -> &[Wave] {
        &self.waves
    }

    pub fn layers(&self) -> &[Sea] {
        &self.layers
    }

    /// A sea without child layers counts as one layer.
    pub fn layer_count(&self) -> usize {
        self.layers.len().max(1)
    }

    pub fn main_layer_index(&self) -> usize {
        self.main_layer_index
    }

    /// Count of disturbance waves still alive across all layers.
    pub fn active_disturbances(&self) -> usize {
        self.waves
            .iter()
            .filter(|wave| wave.source() == WaveSource::TouchDisturbance)
            .count()
            + self
                .layers
                .iter()
                .map(Sea::active_disturbances)
                .sum::<usize>()
    }
}
