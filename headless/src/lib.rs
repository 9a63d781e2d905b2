//! Headless runner: the sea simulation on a fixed clock with scripted swipes
//! standing in for a player.

use std::time::Duration;

use bevy::app::ScheduleRunnerPlugin;
use bevy::math::Vec2;
use bevy::prelude::*;
use bevy_log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use undertow_sim::vehicle::{VehicleGroup, VehicleRegistry};
use undertow_sim::{
    BoatSinked, GameConfig, GameOver, GameSession, GestureEvent, SeaFixedUpdateSet, SeaGamePlugin,
    ShipSinked,
};

/// Length of a scripted swipe in seconds.
const SWIPE_DURATION: f32 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunOptions {
    /// Stop after this many ticks
    pub ticks: u64,
    /// Ticks between scripted swipes, 0 disables them
    pub swipe_interval: u64,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            ticks: 3600,
            swipe_interval: 90,
        }
    }
}

#[derive(Resource, Debug, Clone, Copy)]
struct RunLimit(RunOptions);

/// Drives swipes at whichever boat is attacking.
#[derive(Resource)]
pub struct SwipeScript {
    interval: u64,
    rng: StdRng,
}

impl SwipeScript {
    /// Swipe every `interval` ticks. Strengths come from `seed`.
    pub fn new(interval: u64, seed: u64) -> Self {
        Self {
            interval,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// A swipe released just under `target`, of random strength.
    pub fn swipe_at(&mut self, target: Vec2, now: f32) -> [GestureEvent; 2] {
        let length = self.rng.gen_range(40.0..160.0_f32);
        let rise = self.rng.gen_range(20.0..80.0_f32);
        let start = Vec2::new(target.x - length, target.y + rise);
        let translation = target - start;
        [
            GestureEvent::Start { point: start, time: now },
            GestureEvent::End {
                point: target,
                time: now + SWIPE_DURATION,
                translation,
                velocity: translation / SWIPE_DURATION,
            },
        ]
    }
}

fn scripted_swipe_system(
    mut script: ResMut<SwipeScript>,
    registry: Res<VehicleRegistry>,
    session: Res<GameSession>,
    time: Res<Time>,
    mut gestures: EventWriter<GestureEvent>,
) {
    if script.interval == 0 || session.tick == 0 || session.tick % script.interval != 0 || !session.running {
        return;
    }
    let Some(target) = registry
        .group(VehicleGroup::Attacking)
        .find(|boat| boat.is_initialized())
        .map(|boat| boat.position)
    else {
        return;
    };
    debug!("Swiping at ({:.1}, {:.1})", target.x, target.y);
    for gesture in script.swipe_at(target, time.elapsed_secs()) {
        gestures.write(gesture);
    }
}

fn stop_on_game_over_system(mut game_overs: EventReader<GameOver>, mut session: ResMut<GameSession>) {
    for game_over in game_overs.read() {
        info!("Stopping session: {:?}", game_over.reason);
        session.running = false;
    }
}

fn log_sinks_system(mut boats: EventReader<BoatSinked>, mut ships: EventReader<ShipSinked>) {
    for sunk in boats.read() {
        info!("{} ({:?}) went under", sunk.label, sunk.build);
    }
    for sunk in ships.read() {
        info!("{} went under", sunk.label);
    }
}

fn run_limit_system(limit: Res<RunLimit>, session: Res<GameSession>, mut exit: EventWriter<AppExit>) {
    if session.tick < limit.0.ticks {
        return;
    }
    info!(
        "Finished after {} ticks: {} boats sunk, game over: {:?}",
        session.tick,
        session.boats_sunk,
        session.game_over()
    );
    exit.write(AppExit::Success);
}

/// Register the runner's systems on an app that already has the sea plugin.
pub fn add_runner_systems(app: &mut App, options: RunOptions, seed: u64) {
    app.insert_resource(RunLimit(options))
        .insert_resource(SwipeScript::new(options.swipe_interval, seed))
        .add_systems(
            FixedUpdate,
            (
                scripted_swipe_system.before(SeaFixedUpdateSet::Input),
                (stop_on_game_over_system, log_sinks_system).after(SeaFixedUpdateSet::Collisions),
            ),
        )
        .add_systems(Update, run_limit_system);
}

/// Run a headless session until `options.ticks` have elapsed.
pub fn init(config: GameConfig, options: RunOptions) -> AppExit {
    let tick = Duration::from_secs_f32(config.tick_duration());
    let seed = config.seed;

    let mut app = App::new();
    app.add_plugins(MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(tick)));
    app.add_plugins(bevy::log::LogPlugin::default());
    app.add_plugins(SeaGamePlugin::new(config));
    add_runner_systems(&mut app, options, seed);

    info!("Running {} ticks, swipe every {} ticks", options.ticks, options.swipe_interval);
    app.run()
}
