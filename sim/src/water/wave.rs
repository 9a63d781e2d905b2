//! A single travelling disturbance on a sea layer.
//!
//! Waves are evaluated in closed form: the surface contribution at any `x`
//! depends only on the wave's current amplitude, frequency, phase and how far
//! its origin has drifted since creation. Nothing is integrated over a grid.

use bevy::math::Vec2;
use serde::{Deserialize, Serialize};

/// Tuning constants for wave evolution.
pub mod constants {
    /// Length of the cubic ease-in after a touch wave is created (seconds).
    pub const RISE_WINDOW: f32 = 0.25;
    /// Multiplicative amplitude decay applied every tick after the rise window.
    pub const DECAY_PER_TICK: f32 = 0.98;
    /// Multiplicative growth of frequency and speed once the wave is moving.
    pub const GROWTH_PER_TICK: f32 = 1.01;
    /// Frequency stops growing at this value.
    pub const MAX_FREQUENCY: f32 = 20.0;
    /// Propagation speed stops growing at this value (sea widths per second).
    pub const MAX_SPEED: f32 = 0.3;
    /// Touch waves below this amplitude are expired.
    pub const EXPIRY_AMPLITUDE: f32 = 1.0;
    /// Steepness of the spatial falloff `exp(-k * |distance|)`.
    pub const SPATIAL_DECAY: f32 = 8.0;
    /// Fraction of the layer height that one unit of amplitude represents.
    pub const HEIGHT_SCALE_FACTOR: f32 = 0.05;
}

use constants::*;

/// Where a wave came from, which decides how it evolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum WaveSource {
    /// Persistent background swell. Never decays, never expires.
    #[default]
    AmbientFlow,
    /// Player swipe. Rises, decays and is removed once it falls flat.
    TouchDisturbance,
}

/// Parameters used to create a wave.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaveConfig {
    /// Horizontal origin in screen pixels
    pub origin_x: f32,
    /// Ambient: constant amplitude. Touch: peak amplitude added during the rise.
    pub amplitude: f32,
    pub frequency: f32,
    pub phase: f32,
    /// Drift of the origin in sea widths per second
    pub speed: f32,
    /// Added to `speed` every tick once the wave is moving
    pub acceleration: f32,
    pub source: WaveSource,
}

impl WaveConfig {
    /// Background swell anchored at x = 0. It never decays.
    pub fn ambient(amplitude: f32, frequency: f32, speed: f32) -> Self {
        Self {
            origin_x: 0.0,
            amplitude,
            frequency,
            phase: 0.0,
            speed,
            acceleration: 0.0,
            source: WaveSource::AmbientFlow,
        }
    }

    /// Disturbance released at `origin_x`. `amplitude` is the peak the wave
    /// eases up to over the rise window.
    pub fn touch(origin_x: f32, amplitude: f32, frequency: f32, speed: f32) -> Self {
        Self {
            origin_x,
            amplitude,
            frequency,
            phase: 0.0,
            speed,
            acceleration: 0.0,
            source: WaveSource::TouchDisturbance,
        }
    }

    /// Speed added every tick once the wave is moving.
    pub fn with_acceleration(mut self, acceleration: f32) -> Self {
        self.acceleration = acceleration;
        self
    }
}

impl Default for WaveConfig {
    fn default() -> Self {
        Self::ambient(0.4, 16.0, 0.4)
    }
}

/// Size of the region a wave lives in, used to normalise distance and height.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveDimensions {
    pub width: f32,
    pub height: f32,
}

impl WaveDimensions {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Width used as a denominator. Degenerate widths fall back to 1 so a bad
    /// layer never turns the water surface into NaN.
    #[inline]
    fn safe_width(&self) -> f32 {
        if self.width.is_finite() && self.width > 0.0 {
            self.width
        } else {
            1.0
        }
    }

    /// Pixels per unit of amplitude. Zero or malformed heights yield a flat wave.
    #[inline]
    fn height_scale(&self) -> f32 {
        if self.height.is_finite() && self.height > 0.0 {
            self.height * HEIGHT_SCALE_FACTOR
        } else {
            0.0
        }
    }
}

/// A live wave on a layer.
#[derive(Debug, Clone, PartialEq)]
pub struct Wave {
    origin_x: f32,
    amplitude: f32,
    max_amplitude: f32,
    frequency: f32,
    phase: f32,
    elapsed: f32,
    speed: f32,
    prev_speed: f32,
    acceleration: f32,
    source: WaveSource,
    dimensions: WaveDimensions,
}

impl Wave {
    /// Touch waves start flat and rise over the rise window.
    pub fn new(config: WaveConfig, dimensions: WaveDimensions) -> Self {
        let amplitude = match config.source {
            WaveSource::AmbientFlow => config.amplitude,
            // 1 + max * 0^3
            WaveSource::TouchDisturbance => EXPIRY_AMPLITUDE,
        };

        Self {
            origin_x: config.origin_x,
            amplitude,
            max_amplitude: config.amplitude,
            frequency: config.frequency,
            phase: config.phase,
            elapsed: 0.0,
            speed: config.speed,
            prev_speed: config.speed,
            acceleration: config.acceleration,
            source: config.source,
            dimensions,
        }
    }

    /// Advance the wave by `delta` seconds.
    pub fn update(&mut self, delta: f32) {
        self.elapsed += delta.max(0.0);

        if self.source == WaveSource::AmbientFlow {
            return;
        }

        self.prev_speed = self.speed;

        if self.elapsed < RISE_WINDOW {
            let progress = self.elapsed / RISE_WINDOW;
            self.amplitude = EXPIRY_AMPLITUDE + self.max_amplitude * progress.powi(3);
        } else {
            self.amplitude *= DECAY_PER_TICK;
        }

        if self.elapsed > RISE_WINDOW / 3.0 {
            if self.frequency < MAX_FREQUENCY {
                self.frequency = (self.frequency * GROWTH_PER_TICK).min(MAX_FREQUENCY);
            }
            if self.speed < MAX_SPEED {
                self.speed = (self.speed * GROWTH_PER_TICK + self.acceleration).min(MAX_SPEED);
            }
        }
    }

    /// Normalised horizontal distance from the drifting origin.
    #[inline]
    fn distance_from_origin(&self, x: f32) -> f32 {
        (x - self.origin_x) / self.dimensions.safe_width() - self.elapsed * self.speed
    }

    #[inline]
    fn phase_argument(&self, distance: f32) -> f32 {
        let argument = distance * self.frequency * 0.5 + 0.5;
        match self.source {
            WaveSource::AmbientFlow => argument,
            WaveSource::TouchDisturbance => argument + self.phase,
        }
    }

    #[inline]
    fn decay_at(&self, distance: f32) -> f32 {
        match self.source {
            WaveSource::AmbientFlow => 1.0,
            WaveSource::TouchDisturbance => Self::decay_factor_at_distance(distance),
        }
    }

    /// Spatial falloff of a touch wave. Steep enough that a swipe only
    /// disturbs the water around where it was released.
    #[inline]
    pub fn decay_factor_at_distance(distance: f32) -> f32 {
        (-SPATIAL_DECAY * distance.abs()).exp()
    }

    /// Vertical offset this wave adds to the surface at `x`. Negative values
    /// raise the water (screen y grows downward).
    pub fn surface_at(&self, x: f32) -> f32 {
        let distance = self.distance_from_origin(x);
        -self.amplitude
            * self.decay_at(distance)
            * self.phase_argument(distance).sin()
            * self.dimensions.height_scale()
    }

    /// Surface gradient `dy/dx` contributed at `x`, used for hull tilt.
    pub fn slope_at(&self, x: f32) -> f32 {
        let distance = self.distance_from_origin(x);
        let wavenumber = self.frequency * 0.5 / self.dimensions.safe_width();
        -self.amplitude
            * self.decay_at(distance)
            * self.phase_argument(distance).cos()
            * wavenumber
            * self.dimensions.height_scale()
    }

    /// Raw force terms at `x`: `x` is the drag from the wave's change in speed
    /// over the last tick, `y` the vertical push (negative is upward).
    pub fn force_at(&self, x: f32) -> Vec2 {
        let distance = self.distance_from_origin(x);
        let decay = self.decay_at(distance);
        let vertical = -self.amplitude * decay * self.frequency * self.phase_argument(distance).sin();
        let horizontal = (self.speed - self.prev_speed) * decay * self.dimensions.safe_width();
        Vec2::new(horizontal, vertical)
    }

    /// Touch waves expire once they fall flat. Ambient waves never do.
    pub fn is_expired(&self) -> bool {
        match self.source {
            WaveSource::AmbientFlow => false,
            WaveSource::TouchDisturbance => self.amplitude < EXPIRY_AMPLITUDE,
        }
    }

    pub fn source(&self) -> WaveSource {
        self.source
    }

    pub fn amplitude(&self) -> f32 {
        self.amplitude
    }

    pub fn max_amplitude(&self) -> f32 {
        self.max_amplitude
    }

    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn prev_speed(&self) -> f32 {
        self.prev_speed
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn origin_x(&self) -> f32 {
        self.origin_x
    }
}
