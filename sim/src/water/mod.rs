//! Water simulation: closed-form waves aggregated by a layered sea.
//!
//! Vehicles only ever query the main layer. The other layers carry their own
//! ambient swell and exist for parallax.

pub mod config;
pub mod sea;
pub mod wave;

use bevy::prelude::*;

pub use config::{LayerConfig, SeaConfig, SeaPreset};
pub use sea::{Sea, SeaBounds, SurfaceSample};
pub use wave::{Wave, WaveConfig, WaveDimensions, WaveSource};

/// Advance every wave by the tick length.
pub fn update_sea_system(mut sea: ResMut<Sea>, time: Res<Time>) {
    sea.update(time.delta_secs());
}
