//! Turns a released swipe into a disturbance wave on the main sea layer.

use bevy::math::Vec2;
use bevy::prelude::*;
use bevy_log::debug;

use crate::config::GameConfig;
use crate::water::{Sea, WaveConfig};

pub mod constants {
    pub const MAX_WAVE_SPEED: f32 = 0.2;
    pub const MAX_WAVE_FREQUENCY: f32 = 20.0;
    pub const MAX_WAVE_ACCELERATION: f32 = 0.01;
    pub const MAX_WAVE_AMPLITUDE: f32 = 20.0;

    /// Gesture maxima, in screen heights (per second where timed).
    pub const MAX_SWIPE_VELOCITY_SCREENS: f32 = 3.0;
    pub const MAX_SWIPE_ACCELERATION_SCREENS: f32 = 20.0;
    pub const MAX_SWIPE_TRANSLATION_SCREENS: f32 = 0.5;
}

use constants::*;

/// Raw gesture input, as delivered by whatever recognises swipes.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub enum GestureEvent {
    Start {
        point: Vec2,
        /// Seconds
        time: f32,
    },
    End {
        point: Vec2,
        time: f32,
        translation: Vec2,
        /// Pixels per second
        velocity: Vec2,
    },
}

/// Where and when the current swipe began.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq)]
pub struct TouchTracker {
    start: Option<(Vec2, f32)>,
}

impl TouchTracker {
    pub fn is_tracking(&self) -> bool {
        self.start.is_some()
    }
}

#[inline]
fn normalize(value: f32, max: f32) -> f32 {
    if max <= 0.0 || !value.is_finite() {
        return 0.0;
    }
    (value / max).clamp(0.0, 1.0)
}

/// Map a finished swipe to wave parameters. `None` for swipes with no
/// measurable duration.
pub fn wave_parameters(
    start: Vec2,
    start_time: f32,
    end: Vec2,
    end_time: f32,
    translation: Vec2,
    velocity: Vec2,
    screen_height: f32,
) -> Option<WaveConfig> {
    let duration = end_time - start_time;
    if duration <= 0.0 {
        return None;
    }

    let distance = start.distance(end);
    let swipe_speed = distance / duration;
    let swipe_acceleration = swipe_speed / duration;

    let screen = screen_height.max(1.0);
    let speed = MAX_WAVE_SPEED * normalize(velocity.x.abs(), MAX_SWIPE_VELOCITY_SCREENS * screen);
    let frequency = MAX_WAVE_FREQUENCY * normalize(swipe_speed, MAX_SWIPE_VELOCITY_SCREENS * screen);
    let acceleration =
        MAX_WAVE_ACCELERATION * normalize(swipe_acceleration, MAX_SWIPE_ACCELERATION_SCREENS * screen);
    let amplitude = MAX_WAVE_AMPLITUDE * normalize(translation.length(), MAX_SWIPE_TRANSLATION_SCREENS * screen);

    Some(WaveConfig::touch(end.x, amplitude, frequency, speed).with_acceleration(acceleration))
}

/// Feed one gesture event through the tracker, raising a wave on release.
pub fn handle_gesture(
    tracker: &mut TouchTracker,
    sea: &mut Sea,
    event: &GestureEvent,
    screen_height: f32,
) -> Option<WaveConfig> {
    match *event {
        GestureEvent::Start { point, time } => {
            tracker.start = Some((point, time));
            None
        }
        GestureEvent::End {
            point,
            time,
            translation,
            velocity,
        } => {
            let Some((start, start_time)) = tracker.start.take() else {
                debug!("Swipe ended without a start, ignoring");
                return None;
            };
            let Some(config) = wave_parameters(start, start_time, point, time, translation, velocity, screen_height)
            else {
                debug!("Ignoring swipe with no duration");
                return None;
            };
            sea.initiate_wave(config, None).map(|_| config)
        }
    }
}

/// Turn this tick's gestures into touch waves on the main layer.
pub fn touch_system(
    mut gestures: EventReader<GestureEvent>,
    mut tracker: ResMut<TouchTracker>,
    mut sea: ResMut<Sea>,
    config: Res<GameConfig>,
) {
    for event in gestures.read() {
        handle_gesture(&mut tracker, &mut sea, event, config.screen_height);
    }
}
