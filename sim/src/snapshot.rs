//! Immutable per-tick frames handed from the simulation to a renderer.
//!
//! The simulation is the only writer: once per tick it builds a
//! [`FrameSnapshot`] and swaps it into the [`SnapshotBuffer`]. A renderer on
//! its own clock grabs the latest two frames and blends them with
//! [`FrameSnapshot::interpolate`]. The lock is held only for the pointer swap.

use std::sync::Arc;

use bevy::math::Vec2;
use bevy::prelude::*;
use parking_lot::RwLock;

use crate::session::GameSession;
use crate::vehicle::{VehicleKind, VehicleRegistry};
use crate::water::Sea;

pub mod constants {
    /// Surface samples across the main layer per frame.
    pub const SURFACE_SAMPLES: usize = 64;
}

#[derive(Debug, Clone, PartialEq)]
pub struct VehicleSnapshot {
    pub label: String,
    pub kind: VehicleKind,
    pub position: Vec2,
    pub angle: f32,
    pub size: Vec2,
    pub sunk: bool,
    pub trail: Vec<Vec2>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FrameSnapshot {
    pub tick: u64,
    /// Simulation seconds
    pub time: f32,
    pub vehicles: Vec<VehicleSnapshot>,
    /// Main layer surface y at evenly spaced x across the sea
    pub surface: Vec<f32>,
    pub boats_sunk: u32,
    pub game_over: bool,
}

impl FrameSnapshot {
    /// Copy everything a renderer needs out of this tick's state.
    pub fn capture(registry: &VehicleRegistry, sea: &Sea, session: &GameSession, time: f32) -> Self {
        let vehicles = registry
            .iter()
            .map(|vehicle| VehicleSnapshot {
                label: vehicle.label.clone(),
                kind: vehicle.kind,
                position: vehicle.position,
                angle: vehicle.angle,
                size: vehicle.size,
                sunk: vehicle.is_sunk(),
                trail: vehicle
                    .course
                    .as_ref()
                    .map(|course| course.trail.iter().copied().collect())
                    .unwrap_or_default(),
            })
            .collect();

        Self {
            tick: session.tick,
            time,
            vehicles,
            surface: sample_surface(sea, constants::SURFACE_SAMPLES),
            boats_sunk: session.boats_sunk,
            game_over: session.is_over(),
        }
    }

    /// Blend two frames. Vehicles are matched by label; ones missing from
    /// `prev` are taken from `next` as is, ones missing from `next` are gone.
    pub fn interpolate(prev: &FrameSnapshot, next: &FrameSnapshot, alpha: f32) -> FrameSnapshot {
        let alpha = alpha.clamp(0.0, 1.0);
        let vehicles = next
            .vehicles
            .iter()
            .map(|current| {
                let Some(before) = prev.vehicles.iter().find(|v| v.label == current.label) else {
                    return current.clone();
                };
                VehicleSnapshot {
                    position: before.position.lerp(current.position, alpha),
                    angle: before.angle + (current.angle - before.angle) * alpha,
                    ..current.clone()
                }
            })
            .collect();

        let surface = if prev.surface.len() == next.surface.len() {
            prev.surface
                .iter()
                .zip(&next.surface)
                .map(|(a, b)| a + (b - a) * alpha)
                .collect()
        } else {
            next.surface.clone()
        };

        FrameSnapshot {
            tick: next.tick,
            time: prev.time + (next.time - prev.time) * alpha,
            vehicles,
            surface,
            boats_sunk: next.boats_sunk,
            game_over: next.game_over,
        }
    }
}

/// Where `now` falls between two frame times, clamped to `[0, 1]`.
pub fn interpolation_alpha(prev_time: f32, next_time: f32, now: f32) -> f32 {
    let span = next_time - prev_time;
    if span <= 0.0 {
        return 1.0;
    }
    ((now - prev_time) / span).clamp(0.0, 1.0)
}

fn sample_surface(sea: &Sea, samples: usize) -> Vec<f32> {
    let Some(layer) = sea.main_layer() else {
        return Vec::new();
    };
    let bounds = layer.bounds();
    let left = bounds.x - bounds.width / 2.0;
    let step = bounds.width / samples.saturating_sub(1).max(1) as f32;
    (0..samples)
        .filter_map(|i| {
            sea.surface_and_max_height_at(left + step * i as f32, None)
                .map(|sample| sample.surface_y)
        })
        .collect()
}

type FramePair = (Option<Arc<FrameSnapshot>>, Option<Arc<FrameSnapshot>>);

/// Shared, double-buffered frame slot. Cloning shares the same buffer.
#[derive(Resource, Clone, Default)]
pub struct SnapshotBuffer {
    frames: Arc<RwLock<FramePair>>,
}

impl SnapshotBuffer {
    /// Make `frame` the latest, demoting the current latest to previous.
    pub fn publish(&self, frame: FrameSnapshot) {
        let frame = Arc::new(frame);
        let mut frames = self.frames.write();
        let latest = frames.1.take();
        *frames = (latest, Some(frame));
    }

    /// Most recently published frame.
    pub fn latest(&self) -> Option<Arc<FrameSnapshot>> {
        self.frames.read().1.clone()
    }

    /// Previous and latest frames.
    pub fn pair(&self) -> FramePair {
        self.frames.read().clone()
    }

    /// Frame for a renderer at simulation time `now`.
    pub fn sample(&self, now: f32) -> Option<FrameSnapshot> {
        match self.pair() {
            (Some(prev), Some(next)) => {
                let alpha = interpolation_alpha(prev.time, next.time, now);
                Some(FrameSnapshot::interpolate(&prev, &next, alpha))
            }
            (None, Some(next)) => Some((*next).clone()),
            _ => None,
        }
    }
}

/// Publish the frame for the tick that just finished.
pub fn publish_snapshot_system(
    registry: Res<VehicleRegistry>,
    sea: Res<Sea>,
    session: Res<GameSession>,
    buffer: Res<SnapshotBuffer>,
    time: Res<Time>,
) {
    buffer.publish(FrameSnapshot::capture(&registry, &sea, &session, time.elapsed_secs()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vehicle::{BoatBuildId, Vehicle};
    use crate::water::SeaPreset;

    fn frame(tick: u64, time: f32, x: f32, angle: f32) -> FrameSnapshot {
        FrameSnapshot {
            tick,
            time,
            vehicles: vec![VehicleSnapshot {
                label: "boat-00000".into(),
                kind: VehicleKind::Boat(BoatBuildId::Skiff),
                position: Vec2::new(x, 100.0),
                angle,
                size: Vec2::new(80.0, 28.0),
                sunk: false,
                trail: Vec::new(),
            }],
            surface: vec![300.0, 310.0],
            boats_sunk: 0,
            game_over: false,
        }
    }

    #[test]
    fn test_interpolate_midpoint() {
        let mid = FrameSnapshot::interpolate(&frame(1, 0.0, 0.0, 0.0), &frame(2, 1.0, 10.0, 0.2), 0.5);
        assert_eq!(mid.vehicles[0].position, Vec2::new(5.0, 100.0));
        assert!((mid.vehicles[0].angle - 0.1).abs() < 1e-6);
        assert_eq!(mid.tick, 2);
        assert!((mid.time - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_new_vehicle_is_not_blended() {
        let mut next = frame(2, 1.0, 10.0, 0.0);
        next.vehicles[0].label = "boat-00001".into();
        let blended = FrameSnapshot::interpolate(&frame(1, 0.0, 0.0, 0.0), &next, 0.5);
        assert_eq!(blended.vehicles[0].position.x, 10.0);
    }

    #[test]
    fn test_alpha_clamps() {
        assert_eq!(interpolation_alpha(1.0, 2.0, 0.0), 0.0);
        assert_eq!(interpolation_alpha(1.0, 2.0, 5.0), 1.0);
        assert_eq!(interpolation_alpha(1.0, 1.0, 1.0), 1.0);
        assert!((interpolation_alpha(1.0, 2.0, 1.25) - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_buffer_keeps_last_two() {
        let buffer = SnapshotBuffer::default();
        assert!(buffer.latest().is_none());
        assert!(buffer.sample(0.0).is_none());

        let reader = buffer.clone();
        buffer.publish(frame(1, 0.0, 0.0, 0.0));
        assert_eq!(reader.sample(3.0).map(|f| f.tick), Some(1));

        buffer.publish(frame(2, 1.0, 10.0, 0.0));
        buffer.publish(frame(3, 2.0, 20.0, 0.0));
        let (prev, latest) = reader.pair();
        assert_eq!(prev.map(|f| f.tick), Some(2));
        assert_eq!(latest.map(|f| f.tick), Some(3));
        assert_eq!(reader.sample(1.5).map(|f| f.vehicles[0].position.x), Some(15.0));
    }

    #[test]
    fn test_capture_samples_surface() {
        let sea = Sea::new(&SeaPreset::Still.to_config(800.0, 600.0));
        let mut registry = VehicleRegistry::default();
        registry.insert(Vehicle::boat("boat-00000", BoatBuildId::Dinghy.build(), Vec2::ZERO, 1.0, 800.0, 0.0));
        let session = GameSession::default();

        let frame = FrameSnapshot::capture(&registry, &sea, &session, 0.5);
        assert_eq!(frame.surface.len(), constants::SURFACE_SAMPLES);
        let baseline = sea.main_layer().map(Sea::baseline_y).unwrap_or_default();
        assert!(frame.surface.iter().all(|y| (*y - baseline).abs() < 1e-3));
        assert_eq!(frame.vehicles.len(), 1);
        assert!(!frame.game_over);
    }
}
