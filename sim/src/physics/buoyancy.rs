//! Buoyancy, drag and tilt for floating hulls.
//!
//! This is a tuned heuristic rather than a pressure integral. Raised water
//! pushes a hull up through a handful of point impulses spread across its
//! width, a hull riding near the surface is held at a fixed draft, and the
//! hull eases toward the local surface slope.

use bevy::math::Vec2;
use bevy::prelude::*;
use bevy_log::{debug, info, warn};

use super::world::PhysicsWorld;
use super::PhysicsTuning;
use crate::config::GameConfig;
use crate::vehicle::{Vehicle, VehicleRegistry};
use crate::water::Sea;

pub mod constants {
    /// Hulls tilted past this angle (radians) capsize.
    pub const CAPSIZE_ANGLE: f32 = 0.5;
    /// A hull whose centre is this many hull heights under the surface is lost.
    pub const LOST_DEPTH_HULLS: f32 = 3.0;
    /// Water must be raised by at least this much (pixels) to push a hull up.
    pub const MIN_RAISE: f32 = 1.0;
    /// No buoyant impulse once a hull is this many hull heights under.
    pub const MAX_BUOYANT_DEPTH_HULLS: f32 = 2.0;
    /// Submersion (in hull heights) still corrected by snapping to the surface.
    pub const SHALLOW_DEPTH_HULLS: f32 = 0.6;
    /// Draft a hull rests at in calm water, in hull heights.
    pub const RESTING_DRAFT_HULLS: f32 = 0.2;
    /// Buoyancy sample points as fractions of hull width, denser near the keel.
    pub const BUOYANCY_SAMPLES: [f32; 5] = [-0.4, -0.15, 0.0, 0.15, 0.4];
    /// Slope sample points as fractions of hull width.
    pub const TILT_SAMPLES: [f32; 5] = [-0.5, -0.25, 0.0, 0.25, 0.5];
    /// Air friction while sinking.
    pub const SINKING_FRICTION: f32 = 0.05;

    /// (minimum submersion in hull heights, air friction), deepest first.
    pub const SUBMERGED_DRAG_BANDS: [(f32, f32); 3] = [(1.0, 0.05), (0.5, 0.03), (0.0, 0.02)];
    /// (minimum height above water in hull heights, air friction), highest first.
    pub const AIRBORNE_DRAG_BANDS: [(f32, f32); 2] = [(1.0, 0.03), (0.0, 0.01)];
}

use constants::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuoyancyOutcome {
    /// No body or no water under the vehicle this tick
    Skipped,
    Floating,
    Sunk,
}

/// Submersion of a hull against the water surface under its centre.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Submersion {
    /// Positive when the hull bottom is under the surface
    pub depth: f32,
    pub area: f32,
}

/// How deep a hull sits given its bottom and the surface under it.
pub fn submersion(bottom_y: f32, surface_y: f32, size: Vec2) -> Submersion {
    let depth = bottom_y - surface_y;
    Submersion {
        depth,
        area: depth.clamp(0.0, size.y) * size.x,
    }
}

/// Whether a hull should be declared sunk this tick.
pub fn should_sink(
    submersion: &Submersion,
    hull_area: f32,
    center_y: f32,
    surface_y: f32,
    baseline_y: f32,
    hull_height: f32,
    angle: f32,
) -> bool {
    let swamped = hull_area > 0.0 && submersion.area >= hull_area && surface_y <= baseline_y;
    let lost = center_y - surface_y > LOST_DEPTH_HULLS * hull_height;
    let capsized = angle.abs() > CAPSIZE_ANGLE;
    swamped || lost || capsized
}

/// Air friction for a hull `depth` pixels under the surface (negative when
/// above it).
pub fn drag_band(depth: f32, hull_height: f32) -> f32 {
    let height = hull_height.max(f32::EPSILON);
    if depth > 0.0 {
        let hulls = depth / height;
        SUBMERGED_DRAG_BANDS
            .iter()
            .find(|(threshold, _)| hulls > *threshold)
            .map_or(SUBMERGED_DRAG_BANDS[2].1, |(_, friction)| *friction)
    } else {
        let hulls = -depth / height;
        AIRBORNE_DRAG_BANDS
            .iter()
            .find(|(threshold, _)| hulls > *threshold)
            .map_or(AIRBORNE_DRAG_BANDS[1].1, |(_, friction)| *friction)
    }
}

/// Angle a hull eases toward given the surface slope under it.
pub fn tilt_step(angle: f32, average_slope: f32, rate: f32) -> f32 {
    let target = average_slope.atan();
    angle + (target - angle) * rate.clamp(0.0, 1.0)
}

/// Centre of a hull resting at its calm-water draft on `surface_y`.
pub fn resting_position(surface_y: f32, x: f32, size: Vec2) -> Vec2 {
    Vec2::new(x, surface_y - size.y / 2.0 + RESTING_DRAFT_HULLS * size.y)
}

/// Pin an uninitialized vehicle at its spawn point.
pub fn keep_body_stable(vehicle: &mut Vehicle, world: &mut PhysicsWorld) {
    let Some(body) = vehicle.body else {
        return;
    };
    world.freeze(body, vehicle.spawn_position, 0.0);
    vehicle.position = vehicle.spawn_position;
    vehicle.velocity = Vec2::ZERO;
    vehicle.angle = 0.0;
}

/// One buoyancy pass for one initialized, floating vehicle.
pub fn apply_buoyancy(
    vehicle: &mut Vehicle,
    sea: &Sea,
    world: &mut PhysicsWorld,
    tuning: &PhysicsTuning,
    dt: f32,
) -> BuoyancyOutcome {
    let Some(body) = vehicle.body else {
        warn!("Skipping buoyancy for {}: no rigid body", vehicle.label);
        return BuoyancyOutcome::Skipped;
    };
    let Some(state) = world.body_state(body) else {
        warn!("Skipping buoyancy for {}: body missing from world", vehicle.label);
        return BuoyancyOutcome::Skipped;
    };
    let Some(layer) = sea.main_layer() else {
        warn!("Skipping buoyancy for {}: no main sea layer", vehicle.label);
        return BuoyancyOutcome::Skipped;
    };
    let Some(sample) = layer.surface_and_max_height_at(state.position.x, None) else {
        return BuoyancyOutcome::Skipped;
    };

    vehicle.sync_from_body(&state);
    let size = vehicle.size;
    let baseline = layer.baseline_y();
    let surface = sample.surface_y;
    let submerged = submersion(vehicle.bottom_y(), surface, size);

    if should_sink(
        &submerged,
        vehicle.hull_area(),
        state.position.y,
        surface,
        baseline,
        size.y,
        state.angle,
    ) {
        if vehicle.mark_sunk() {
            debug!(
                "{} sank: depth {:.1}, area {:.0}/{:.0}, angle {:.2}",
                vehicle.label,
                submerged.depth,
                submerged.area,
                vehicle.hull_area(),
                state.angle
            );
        }
        world.set_air_friction(body, SINKING_FRICTION);
        return BuoyancyOutcome::Sunk;
    }

    world.set_air_friction(body, drag_band(submerged.depth, size.y));

    // Shallow hulls sit at the resting draft, raised water or not.
    if submerged.depth > RESTING_DRAFT_HULLS * size.y && submerged.depth <= SHALLOW_DEPTH_HULLS * size.y {
        let lift = submerged.depth - RESTING_DRAFT_HULLS * size.y;
        world.set_position(body, Vec2::new(state.position.x, state.position.y - lift));
        world.set_velocity(body, Vec2::new(state.velocity.x, state.velocity.y.min(0.0)));
    }

    let raise = baseline - surface;
    if raise > MIN_RAISE && submerged.depth < MAX_BUOYANT_DEPTH_HULLS * size.y {
        // ln(area) stays at zero until the hull actually touches the water.
        let area_scale = submerged.area.max(1.0).ln();
        let per_point = state.mass * tuning.gravity * tuning.buoyancy_factor * area_scale
            / (size.y.max(f32::EPSILON) * BUOYANCY_SAMPLES.len() as f32);

        for offset in BUOYANCY_SAMPLES {
            let x = state.position.x + offset * size.x;
            let Some(local) = layer.surface_and_max_height_at(x, None) else {
                continue;
            };
            let deficit = (baseline - local.surface_y).max(0.0);
            let impulse = Vec2::new(0.0, -per_point * deficit * dt);
            world.apply_impulse_at_point(body, impulse, Vec2::new(x, state.position.y));
        }
    }

    let slope_sum: f32 = TILT_SAMPLES
        .iter()
        .filter_map(|offset| layer.slope_at(state.position.x + offset * size.x, None))
        .sum();
    let average_slope = slope_sum / TILT_SAMPLES.len() as f32;
    world.set_angle(body, tilt_step(state.angle, average_slope, tuning.tilt_correction_rate));

    if let Some(force) = layer.force_at(state.position.x, None) {
        if force.x != 0.0 && sample.max_wave_height > MIN_RAISE {
            world.apply_impulse(body, Vec2::new(force.x * tuning.wave_push_factor * state.mass, 0.0));
        }
    }

    BuoyancyOutcome::Floating
}

/// Hold new vehicles still through their grace period, then hand them to the
/// physics engine and float everything that is afloat.
pub fn buoyancy_system(
    mut registry: ResMut<VehicleRegistry>,
    mut world: ResMut<PhysicsWorld>,
    sea: Res<Sea>,
    config: Res<GameConfig>,
    time: Res<Time>,
) {
    let now = time.elapsed_secs();
    let dt = time.delta_secs();

    for vehicle in registry.iter_mut() {
        if !vehicle.is_initialized() {
            if !vehicle.try_initialize(now, config.initialization_grace) {
                keep_body_stable(vehicle, &mut world);
                continue;
            }
            if let Some(body) = vehicle.body {
                world.set_kinematic(body, false);
            }
            info!("{} initialized", vehicle.label);
        }

        if !vehicle.buoyant || vehicle.is_sunk() {
            continue;
        }
        apply_buoyancy(vehicle, &sea, &mut world, &config.physics, dt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::BodyDesc;
    use crate::vehicle::{BoatBuildId, ShipBuild};
    use crate::water::{SeaPreset, WaveConfig};

    const DT: f32 = 1.0 / 60.0;

    fn floating_boat(sea: &Sea, world: &mut PhysicsWorld, x: f32) -> Vehicle {
        let build = BoatBuildId::Skiff.build();
        let size = build.hull_size(800.0);
        let position = resting_position(sea.baseline_y(), x, size);
        let mut boat = Vehicle::boat("boat-0", build, position, 1.0, 800.0, 0.0);
        boat.body = Some(world.create_body(&BodyDesc::hull(boat.position, size, boat.id)));
        boat.try_initialize(1.0, 0.0);
        boat
    }

    fn tick(boat: &mut Vehicle, sea: &mut Sea, world: &mut PhysicsWorld) -> BuoyancyOutcome {
        sea.update(DT);
        let outcome = apply_buoyancy(boat, sea, world, &PhysicsTuning::default(), DT);
        world.step(DT);
        if let Some(state) = boat.body.and_then(|body| world.body_state(body)) {
            boat.sync_from_body(&state);
        }
        outcome
    }

    #[test]
    fn test_submersion_clamps_area() {
        let size = Vec2::new(80.0, 20.0);
        assert_eq!(submersion(100.0, 110.0, size).area, 0.0);
        assert_eq!(submersion(105.0, 100.0, size).area, 400.0);
        assert_eq!(submersion(200.0, 100.0, size).area, 1600.0);
    }

    #[test]
    fn test_sink_conditions() {
        let size = Vec2::new(80.0, 20.0);
        let area = size.x * size.y;
        let full = submersion(130.0, 100.0, size);
        let shallow = submersion(105.0, 100.0, size);
        // Fully swamped under raised water.
        assert!(should_sink(&full, area, 120.0, 100.0, 110.0, size.y, 0.0));
        // Swamped in a trough does not count.
        assert!(!should_sink(&full, area, 120.0, 100.0, 90.0, size.y, 0.0));
        // Lost deep under the surface.
        assert!(should_sink(&shallow, area, 161.0, 100.0, 90.0, size.y, 0.0));
        // Capsized.
        assert!(should_sink(&shallow, area, 100.0, 100.0, 100.0, size.y, 0.6));
        assert!(!should_sink(&shallow, area, 100.0, 100.0, 100.0, size.y, -0.4));
    }

    #[test]
    fn test_drag_grows_away_from_the_surface() {
        let h = 20.0;
        assert!(drag_band(30.0, h) > drag_band(15.0, h));
        assert!(drag_band(15.0, h) > drag_band(2.0, h));
        assert!(drag_band(-30.0, h) > drag_band(-2.0, h));
    }

    #[test]
    fn test_tilt_eases_toward_slope() {
        let next = tilt_step(0.0, 1.0, 0.1);
        let target = 1.0f32.atan();
        assert!(next > 0.0 && next < target);
        assert!((tilt_step(target, 1.0, 0.1) - target).abs() < 1e-6);
    }

    #[test]
    fn test_boat_floats_on_still_water() {
        let mut sea = Sea::new(&SeaPreset::Still.to_single_layer_config(800.0, 600.0));
        let mut world = PhysicsWorld::new(980.0);
        let mut boat = floating_boat(&sea, &mut world, 400.0);
        for _ in 0..240 {
            assert_eq!(tick(&mut boat, &mut sea, &mut world), BuoyancyOutcome::Floating);
        }
        let depth = boat.bottom_y() - sea.baseline_y();
        assert!(depth > 0.0 && depth < SHALLOW_DEPTH_HULLS * boat.size.y);
    }

    #[test]
    fn test_large_wave_sinks_boat() {
        let mut sea = Sea::new(&SeaPreset::Still.to_single_layer_config(800.0, 600.0));
        let mut world = PhysicsWorld::new(980.0);
        let mut boat = floating_boat(&sea, &mut world, 400.0);
        sea.initiate_wave(WaveConfig::touch(400.0, 150.0, 4.0, 0.0), None);

        let sunk_after = (0..120).find(|_| tick(&mut boat, &mut sea, &mut world) == BuoyancyOutcome::Sunk);
        assert!(sunk_after.is_some(), "boat survived a 150 amplitude wave");
        assert!(boat.is_sunk());
    }

    /// Rest `vehicle` on the main layer's current surface with a live body.
    fn set_afloat(mut vehicle: Vehicle, sea: &Sea, world: &mut PhysicsWorld) -> Vehicle {
        let x = vehicle.position.x;
        let surface = sea
            .surface_and_max_height_at(x, None)
            .map_or(sea.baseline_y(), |sample| sample.surface_y);
        vehicle.position = resting_position(surface, x, vehicle.size);
        vehicle.body = Some(world.create_body(&BodyDesc::hull(vehicle.position, vehicle.size, vehicle.id)));
        vehicle.try_initialize(1.0, 0.0);
        vehicle
    }

    #[test]
    fn test_hulls_ride_out_ambient_swell() {
        let mut sea = Sea::new(&SeaPreset::Choppy.to_config(800.0, 600.0));
        let mut world = PhysicsWorld::new(980.0);
        let ship = Vehicle::ship("ship", &ShipBuild::default(), Vec2::new(400.0, 0.0), 800.0, 0.0);
        let skiff = Vehicle::boat("boat-0", BoatBuildId::Skiff.build(), Vec2::new(120.0, 0.0), 1.0, 800.0, 0.0);
        let mut hulls = vec![set_afloat(ship, &sea, &mut world), set_afloat(skiff, &sea, &mut world)];

        let tuning = PhysicsTuning::default();
        for step in 0..600 {
            sea.update(DT);
            for hull in hulls.iter_mut() {
                let outcome = apply_buoyancy(hull, &sea, &mut world, &tuning, DT);
                assert_eq!(outcome, BuoyancyOutcome::Floating, "{} went down at tick {step}", hull.label);
            }
            world.step(DT);
            for hull in hulls.iter_mut() {
                if let Some(state) = hull.body.and_then(|body| world.body_state(body)) {
                    hull.sync_from_body(&state);
                }
            }
        }
        for hull in &hulls {
            let surface = sea
                .surface_and_max_height_at(hull.position.x, None)
                .map_or(f32::NAN, |sample| sample.surface_y);
            let depth = hull.bottom_y() - surface;
            assert!(depth.abs() < hull.size.y, "{} drifted {depth} px from the surface", hull.label);
        }
    }

    #[test]
    fn test_missing_body_is_skipped() {
        let sea = Sea::new(&SeaPreset::Still.to_single_layer_config(800.0, 600.0));
        let mut world = PhysicsWorld::new(980.0);
        let mut boat = floating_boat(&sea, &mut world, 400.0);
        boat.body = None;
        let outcome = apply_buoyancy(&mut boat, &sea, &mut world, &PhysicsTuning::default(), DT);
        assert_eq!(outcome, BuoyancyOutcome::Skipped);
        assert!(!boat.is_sunk());
    }

    #[test]
    fn test_uninitialized_vehicle_stays_pinned() {
        let sea = Sea::new(&SeaPreset::Still.to_single_layer_config(800.0, 600.0));
        let mut world = PhysicsWorld::new(980.0);
        let build = BoatBuildId::Dinghy.build();
        let spawn = Vec2::new(100.0, sea.baseline_y() - 100.0);
        let mut boat = Vehicle::boat("boat-1", build, spawn, 1.0, 800.0, 0.0);
        let body = world.create_body(&BodyDesc::hull(spawn, boat.size, boat.id).kinematic());
        boat.body = Some(body);

        for _ in 0..60 {
            world.apply_impulse(body, Vec2::new(50.0, 50.0));
            keep_body_stable(&mut boat, &mut world);
            world.step(DT);
            let state = world.body_state(body);
            assert_eq!(state.map(|s| s.position), Some(spawn));
            assert_eq!(state.map(|s| s.angle), Some(0.0));
        }
        assert_eq!(boat.velocity, Vec2::ZERO);
    }
}
