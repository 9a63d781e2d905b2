//! Boat spawning, chasing and culling.

use bevy::math::Vec2;
use bevy::prelude::*;
use bevy_log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::config::GameConfig;
use crate::events::BoatSinked;
use crate::physics::buoyancy::{constants::SINKING_FRICTION, resting_position};
use crate::physics::PhysicsWorld;
use crate::session::GameSession;
use crate::vehicle::{launch, Vehicle, VehicleGroup, VehicleKind, VehicleRegistry};
use crate::water::Sea;

pub mod constants {
    /// Chase tilt per unit of horizontal velocity (pixels per tick).
    pub const TILT_PER_VELOCITY: f32 = 0.01;
    /// Largest tilt the chase applies.
    pub const MAX_CHASE_TILT: f32 = std::f32::consts::FRAC_PI_8;
}

/// Seeded source for boat side and build selection.
#[derive(Resource)]
pub struct BoatRng(pub StdRng);

impl BoatRng {
    pub fn from_seed(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

/// Hands out boat labels.
#[derive(Resource, Debug, Default)]
pub struct BoatSpawner {
    next_index: u64,
}

impl BoatSpawner {
    /// Next free label, `boat-00000` first.
    pub fn next_label(&mut self) -> String {
        let label = format!("boat-{:05}", self.next_index);
        self.next_index += 1;
        label
    }
}

/// What one boat tick changed.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct BoatTickReport {
    pub spawned: Option<String>,
    pub sunk: Vec<BoatSinked>,
    pub removed: Vec<String>,
}

/// Horizontal speed after one tick of chasing, in pixels per tick.
pub fn chase_velocity(velocity_x: f32, direction: f32, acceleration: f32, max_velocity_x: f32) -> f32 {
    let max = max_velocity_x.abs();
    (velocity_x + direction * acceleration).clamp(-max, max)
}

/// Tilt for a boat moving at `velocity_x` pixels per tick, capped at
/// [`constants::MAX_CHASE_TILT`].
pub fn chase_tilt(velocity_x: f32) -> f32 {
    (velocity_x * constants::TILT_PER_VELOCITY).clamp(-constants::MAX_CHASE_TILT, constants::MAX_CHASE_TILT)
}

/// Launch one boat just off a random side of the screen, heading inward.
pub fn spawn_boat(
    registry: &mut VehicleRegistry,
    world: &mut PhysicsWorld,
    rng: &mut StdRng,
    spawner: &mut BoatSpawner,
    sea: &Sea,
    config: &GameConfig,
    now: f32,
) -> Option<String> {
    let Some(build_id) = config.boat_builds.choose(rng).copied() else {
        warn!("No boat builds configured, nothing to spawn");
        return None;
    };
    let build = build_id.build();
    let size = build.hull_size(config.screen_width);
    let from_left = rng.gen_bool(0.5);
    let (x, direction) = if from_left {
        (-size.x / 2.0, 1.0)
    } else {
        (config.screen_width + size.x / 2.0, -1.0)
    };

    let Some(layer) = sea.main_layer() else {
        warn!("Cannot spawn a boat without a main sea layer");
        return None;
    };
    let position = resting_position(layer.baseline_y(), x, size);
    let boat = Vehicle::boat(
        spawner.next_label(),
        build,
        position,
        direction,
        config.screen_width,
        now,
    );
    Some(launch(boat, world, registry))
}

/// Chase the ship for one tick. `dt` converts between the body's
/// pixels-per-second velocity and the boat's per-tick limits.
pub fn chase(vehicle: &mut Vehicle, ship_x: Option<f32>, world: &mut PhysicsWorld, dt: f32) {
    let Some(body) = vehicle.body else {
        return;
    };
    let Some(ship_x) = ship_x else {
        vehicle.go_idle();
        return;
    };
    if dt <= 0.0 {
        return;
    }

    vehicle.aim_at(ship_x);
    vehicle.start_attacking();

    let per_tick = chase_velocity(
        vehicle.velocity.x * dt,
        vehicle.direction(),
        vehicle.acceleration,
        vehicle.max_velocity_x,
    );
    let velocity = Vec2::new(per_tick / dt, vehicle.velocity.y);
    let tilt = chase_tilt(per_tick);
    world.set_velocity(body, velocity);
    world.set_angle(body, tilt);
    vehicle.velocity = velocity;
    vehicle.angle = tilt;
}

/// One boat tick. A new boat is spawned whenever none is attacking, and
/// wrecks are dropped once they sink below the screen. Every boat is sunk
/// once the session stops running.
pub fn update_boats(
    registry: &mut VehicleRegistry,
    world: &mut PhysicsWorld,
    session: &mut GameSession,
    rng: &mut StdRng,
    spawner: &mut BoatSpawner,
    sea: &Sea,
    config: &GameConfig,
    now: f32,
    dt: f32,
) -> BoatTickReport {
    let mut report = BoatTickReport::default();

    if session.running {
        if !registry.any_attacking() {
            report.spawned = spawn_boat(registry, world, rng, spawner, sea, config, now);
        }
    } else {
        for boat in registry.group_mut(VehicleGroup::Boats) {
            if boat.mark_sunk() {
                if let Some(body) = boat.body {
                    // Grace-period bodies are still kinematic.
                    world.set_kinematic(body, false);
                    world.set_air_friction(body, SINKING_FRICTION);
                }
            }
        }
    }

    let ship_x = registry
        .ship()
        .filter(|ship| !ship.is_sunk())
        .map(|ship| ship.position.x);
    for boat in registry.group_mut(VehicleGroup::Boats) {
        if boat.is_initialized() && !boat.is_sunk() {
            chase(boat, ship_x, world, dt);
        }
    }

    let scoring = session.running && !session.is_over();
    for boat in registry.group_mut(VehicleGroup::Boats) {
        if !boat.take_sink_notice() {
            continue;
        }
        if scoring {
            session.record_boat_sunk();
        }
        if let VehicleKind::Boat(build) = boat.kind {
            report.sunk.push(BoatSinked {
                label: boat.label.clone(),
                build,
            });
        }
    }

    let expired: Vec<String> = registry
        .group(VehicleGroup::Sinking)
        .filter(|vehicle| vehicle.is_boat() && vehicle.is_off_screen(config.screen_height))
        .map(|vehicle| vehicle.label.clone())
        .collect();
    for mut boat in registry.remove_batch(&expired) {
        if let Some(body) = boat.body {
            world.remove_body(body);
        }
        boat.mark_removed();
        debug!("Removed {}", boat.label);
    }
    report.removed = expired;

    report
}

/// Runs [`update_boats`] and emits a [`BoatSinked`] per sunk boat.
pub fn boat_system(
    mut registry: ResMut<VehicleRegistry>,
    mut world: ResMut<PhysicsWorld>,
    mut session: ResMut<GameSession>,
    mut rng: ResMut<BoatRng>,
    mut spawner: ResMut<BoatSpawner>,
    sea: Res<Sea>,
    config: Res<GameConfig>,
    time: Res<Time>,
    mut sinks: EventWriter<BoatSinked>,
) {
    let report = update_boats(
        &mut registry,
        &mut world,
        &mut session,
        &mut rng.0,
        &mut spawner,
        &sea,
        &config,
        time.elapsed_secs(),
        time.delta_secs(),
    );

    for sunk in report.sunk {
        info!("Boat sunk: {} ({:?}), score {}", sunk.label, sunk.build, session.boats_sunk);
        sinks.write(sunk);
    }
}
