use bevy::prelude::*;
use bevy_log::{info, warn};

use crate::boats::{boat_system, BoatRng, BoatSpawner};
use crate::collisions::collisions_system;
use crate::config::GameConfig;
use crate::constants::SHIP_LABEL;
use crate::events::{BoatSinked, GameOver, ShipSinked};
use crate::physics::buoyancy::resting_position;
use crate::physics::{buoyancy_system, physics_step_system, PhysicsWorld};
use crate::session::GameSession;
use crate::sets::SeaFixedUpdateSet;
use crate::snapshot::{publish_snapshot_system, SnapshotBuffer};
use crate::touch::{touch_system, GestureEvent, TouchTracker};
use crate::vehicle::{launch, Vehicle, VehicleRegistry};
use crate::water::{update_sea_system, Sea};

/// Installs the whole sea simulation into FixedUpdate.
pub struct SeaGamePlugin {
    config: GameConfig,
}

impl SeaGamePlugin {
    /// Plugin running a session with `config`.
    pub fn new(config: GameConfig) -> Self {
        Self { config }
    }
}

impl Plugin for SeaGamePlugin {
    fn build(&self, app: &mut App) {
        let config = self.config.clone();

        app.insert_resource(Time::<Fixed>::from_seconds(config.tick_duration() as f64))
            .insert_resource(PhysicsWorld::new(config.physics.gravity))
            .insert_resource(BoatRng::from_seed(config.seed))
            .init_resource::<BoatSpawner>()
            .init_resource::<VehicleRegistry>()
            .init_resource::<GameSession>()
            .init_resource::<TouchTracker>()
            .init_resource::<SnapshotBuffer>()
            .add_event::<GestureEvent>()
            .add_event::<BoatSinked>()
            .add_event::<ShipSinked>()
            .add_event::<GameOver>();

        app.configure_sets(
            FixedUpdate,
            (
                SeaFixedUpdateSet::Input,
                SeaFixedUpdateSet::Waves,
                SeaFixedUpdateSet::Buoyancy,
                SeaFixedUpdateSet::Integrate,
                SeaFixedUpdateSet::Boats,
                SeaFixedUpdateSet::Collisions,
                SeaFixedUpdateSet::Publish,
            )
                .chain(),
        );

        app.add_systems(Startup, spawn_ship_system).add_systems(
            FixedUpdate,
            (
                touch_system.in_set(SeaFixedUpdateSet::Input),
                update_sea_system.in_set(SeaFixedUpdateSet::Waves),
                buoyancy_system.in_set(SeaFixedUpdateSet::Buoyancy),
                physics_step_system.in_set(SeaFixedUpdateSet::Integrate),
                boat_system.in_set(SeaFixedUpdateSet::Boats),
                collisions_system.in_set(SeaFixedUpdateSet::Collisions),
                (advance_tick_system, publish_snapshot_system)
                    .chain()
                    .in_set(SeaFixedUpdateSet::Publish),
            ),
        );

        let sea = Sea::new(&config.sea);
        info!(
            "Sea game ready: {}x{} at {} ticks/s, {} sea layers, seed {}",
            config.screen_width,
            config.screen_height,
            config.ticks_per_second,
            sea.layer_count(),
            config.seed
        );
        app.insert_resource(sea).insert_resource(config);
    }
}

/// Float the ship at the middle of the screen.
pub fn spawn_ship_system(
    config: Res<GameConfig>,
    sea: Res<Sea>,
    mut world: ResMut<PhysicsWorld>,
    mut registry: ResMut<VehicleRegistry>,
    time: Res<Time>,
) {
    let Some(layer) = sea.main_layer() else {
        warn!("No main sea layer, the ship stays in port");
        return;
    };
    let size = config.ship.hull_size(config.screen_width);
    let position = resting_position(layer.baseline_y(), config.screen_width / 2.0, size);
    let ship = Vehicle::ship(
        SHIP_LABEL,
        &config.ship,
        position,
        config.screen_width,
        time.elapsed_secs(),
    );
    launch(ship, &mut world, &mut registry);
}

fn advance_tick_system(mut session: ResMut<GameSession>) {
    session.tick += 1;
}
