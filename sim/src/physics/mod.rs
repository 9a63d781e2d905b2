//! Rigid-body world and the buoyancy pass that feeds it.

pub mod buoyancy;
pub mod world;

use bevy::prelude::*;
use bevy_log::warn;
use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_GRAVITY;
use crate::vehicle::VehicleRegistry;
pub use buoyancy::{apply_buoyancy, buoyancy_system, BuoyancyOutcome};
pub use world::{BodyDesc, BodyHandle, BodyState, PhysicsWorld};

/// Runtime knobs for the water forces. Structural thresholds live in
/// [`buoyancy::constants`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsTuning {
    /// Pixels per second squared, positive is down the screen
    pub gravity: f32,
    /// Scales the upward impulse raised water gives a hull
    pub buoyancy_factor: f32,
    /// Scales the horizontal drag from accelerating waves
    pub wave_push_factor: f32,
    /// Fraction of the remaining tilt error corrected each tick
    pub tilt_correction_rate: f32,
}

impl Default for PhysicsTuning {
    fn default() -> Self {
        Self {
            gravity: DEFAULT_GRAVITY,
            buoyancy_factor: 0.2,
            wave_push_factor: 1.0,
            tilt_correction_rate: 0.1,
        }
    }
}

/// Step the rigid-body world, then write the results back into the vehicles.
pub fn physics_step_system(
    mut world: ResMut<PhysicsWorld>,
    mut registry: ResMut<VehicleRegistry>,
    time: Res<Time>,
) {
    world.step(time.delta_secs());

    for vehicle in registry.iter_mut() {
        let Some(body) = vehicle.body else {
            continue;
        };
        match world.body_state(body) {
            Some(state) => {
                vehicle.sync_from_body(&state);
                vehicle.record_trail();
            }
            None => warn!("{} has no body in the physics world", vehicle.label),
        }
    }
}
