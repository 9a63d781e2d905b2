use std::time::Duration;

use bevy::prelude::*;
use undertow_sim::physics::buoyancy::resting_position;
use undertow_sim::physics::PhysicsWorld;
use undertow_sim::vehicle::{launch, BoatBuildId, Vehicle, VehicleGroup, VehicleRegistry};
use undertow_sim::water::{Sea, SeaPreset, WaveConfig};
use undertow_sim::{
    BoatSinked, GameConfig, GameOver, GameOverReason, GameSession, SeaGamePlugin, ShipSinked,
    SnapshotBuffer,
};

const TICK: f64 = 1.0 / 60.0;

fn still_config(builds: Vec<BoatBuildId>) -> GameConfig {
    let mut config = GameConfig::with_preset(SeaPreset::Still, 800.0, 600.0);
    config.seed = 11;
    config.initialization_grace = 0.0;
    config.boat_builds = builds;
    config
}

fn build_app(config: GameConfig, with_ship: bool) -> App {
    let mut app = App::new();
    app.init_resource::<Time>();
    app.add_plugins(SeaGamePlugin::new(config));
    if with_ship {
        app.world_mut().run_schedule(Startup);
    }
    app
}

fn tick(app: &mut App) {
    app.world_mut()
        .resource_mut::<Time>()
        .advance_by(Duration::from_secs_f64(TICK));
    app.world_mut().run_schedule(FixedUpdate);
}

fn session(app: &App) -> &GameSession {
    app.world().resource::<GameSession>()
}

#[test]
fn test_ship_spawns_at_startup() {
    let app = build_app(still_config(vec![BoatBuildId::Skiff]), true);
    let registry = app.world().resource::<VehicleRegistry>();
    let ship = registry.ship();
    assert!(ship.is_some_and(|ship| ship.position.x == 400.0 && ship.body.is_some()));
    assert_eq!(app.world().resource::<PhysicsWorld>().body_count(), 1);
}

#[test]
fn test_fixed_clock_follows_tick_rate() {
    let mut config = still_config(vec![BoatBuildId::Skiff]);
    config.ticks_per_second = 30;
    let app = build_app(config, false);
    let timestep = app.world().resource::<Time<Fixed>>().timestep();
    assert!((timestep.as_secs_f64() - 1.0 / 30.0).abs() < 1e-6);
}

#[test]
fn test_game_over_fires_once() {
    let mut app = build_app(still_config(vec![BoatBuildId::Cutter]), true);

    let mut ticks = 0;
    while !session(&app).is_over() && ticks < 1200 {
        tick(&mut app);
        ticks += 1;
    }
    assert!(session(&app).is_over(), "no boat reached the ship in {ticks} ticks");
    assert_eq!(session(&app).game_over(), Some(GameOverReason::Collision));

    for _ in 0..120 {
        tick(&mut app);
    }
    let game_overs = app.world().resource::<Events<GameOver>>();
    assert_eq!(game_overs.len(), 1);
    // The boat that reached the ship was wrecked by the ram.
    assert!(!app.world().resource::<Events<BoatSinked>>().is_empty());
    assert_eq!(session(&app).boats_sunk, 0);
    let registry = app.world().resource::<VehicleRegistry>();
    assert!(registry.ship().is_some_and(|ship| ship.health < 100.0));
}

#[test]
fn test_chase_speed_is_capped() {
    let mut app = build_app(still_config(vec![BoatBuildId::Skiff]), true);
    let dt = Duration::from_secs_f64(TICK).as_secs_f32();

    let position = {
        let sea = app.world().resource::<Sea>();
        let size = BoatBuildId::Skiff.build().hull_size(800.0);
        let baseline = sea.main_layer().map(Sea::baseline_y).unwrap_or_default();
        resting_position(baseline, 100.0, size)
    };
    let boat = Vehicle::boat("boat-test", BoatBuildId::Skiff.build(), position, 1.0, 800.0, 0.0)
        .with_motion(1.0, 5.0);
    app.world_mut()
        .resource_scope(|world, mut physics: Mut<PhysicsWorld>| {
            let mut registry = world.resource_mut::<VehicleRegistry>();
            launch(boat, &mut physics, &mut registry);
        });

    let mut last = 0.0;
    for _ in 0..20 {
        tick(&mut app);
        let registry = app.world().resource::<VehicleRegistry>();
        let per_tick = registry
            .get("boat-test")
            .map(|boat| boat.velocity.x * dt)
            .unwrap_or_default();
        assert!(per_tick <= 5.0 + 1e-3, "boat exceeded its top speed: {per_tick}");
        last = per_tick;
    }
    assert!((last - 5.0).abs() < 1e-3);
    // The hand-placed boat counts as attacking, so nothing else spawned.
    assert_eq!(
        app.world().resource::<VehicleRegistry>().labels_in(VehicleGroup::Boats),
        vec!["boat-test".to_string()]
    );
}

#[test]
fn test_default_sea_keeps_everything_afloat() {
    let config = GameConfig::default();
    let screen_width = config.screen_width;
    let mut app = build_app(config, true);

    // A boat that never moves, so only the swell acts on it.
    let position = {
        let sea = app.world().resource::<Sea>();
        let size = BoatBuildId::Skiff.build().hull_size(screen_width);
        let baseline = sea.main_layer().map(Sea::baseline_y).unwrap_or_default();
        resting_position(baseline, screen_width * 0.1, size)
    };
    let boat = Vehicle::boat("boat-calm", BoatBuildId::Skiff.build(), position, 1.0, screen_width, 0.0)
        .with_motion(0.0, 0.0);
    app.world_mut()
        .resource_scope(|world, mut physics: Mut<PhysicsWorld>| {
            let mut registry = world.resource_mut::<VehicleRegistry>();
            launch(boat, &mut physics, &mut registry);
        });

    for _ in 0..600 {
        tick(&mut app);
    }

    assert_eq!(session(&app).game_over(), None);
    assert_eq!(session(&app).boats_sunk, 0);
    assert!(app.world().resource::<Events<BoatSinked>>().is_empty());
    assert!(app.world().resource::<Events<ShipSinked>>().is_empty());
    let registry = app.world().resource::<VehicleRegistry>();
    assert!(registry.ship().is_some_and(|ship| !ship.is_sunk()));
    assert!(registry.get("boat-calm").is_some_and(|boat| boat.is_initialized() && !boat.is_sunk()));
}

#[test]
fn test_big_wave_sinks_boat() {
    let mut app = build_app(still_config(vec![BoatBuildId::Skiff]), false);
    for _ in 0..3 {
        tick(&mut app);
    }

    let boat_x = {
        let registry = app.world().resource::<VehicleRegistry>();
        registry.group(VehicleGroup::Attacking).next().map(|boat| boat.position.x)
    };
    let Some(boat_x) = boat_x else {
        panic!("no boat spawned");
    };
    app.world_mut()
        .resource_mut::<Sea>()
        .initiate_wave(WaveConfig::touch(boat_x, 150.0, 4.0, 0.0), None);

    let mut sunk = false;
    for _ in 0..120 {
        tick(&mut app);
        if !app.world().resource::<Events<BoatSinked>>().is_empty() {
            sunk = true;
            break;
        }
    }
    assert!(sunk, "boat survived a 150 amplitude wave");
    assert!(session(&app).boats_sunk >= 1);
}

#[test]
fn test_snapshot_follows_ticks() {
    let mut app = build_app(still_config(vec![BoatBuildId::Dinghy]), true);
    let buffer = app.world().resource::<SnapshotBuffer>().clone();
    assert!(buffer.latest().is_none());

    for _ in 0..5 {
        tick(&mut app);
    }
    let latest = buffer.latest();
    assert_eq!(latest.as_ref().map(|frame| frame.tick), Some(5));
    assert!(latest.is_some_and(|frame| frame.vehicles.len() == 2 && !frame.surface.is_empty()));
    assert_eq!(buffer.pair().0.map(|frame| frame.tick), Some(4));
}

#[test]
fn test_same_seed_same_boats() {
    let run = || {
        let mut app = build_app(still_config(BoatBuildId::ALL.to_vec()), true);
        let mut seen = Vec::new();
        for _ in 0..4 {
            tick(&mut app);
            let mut registry = app.world_mut().resource_mut::<VehicleRegistry>();
            for boat in registry.group_mut(VehicleGroup::Attacking) {
                seen.push((boat.kind, boat.position.x));
                boat.mark_sunk();
            }
        }
        seen
    };
    let first = run();
    assert_eq!(first.len(), 4);
    assert_eq!(first, run());
}
