//! Ship loss: sinking or being reached by an attacking boat ends the game.
//!
//! A boat that reaches the ship rams it. The boat is wrecked and the ship
//! takes the boat's remaining health as damage.

use bevy::prelude::*;
use bevy_log::{debug, info};

use crate::events::{GameOver, GameOverReason, ShipSinked};
use crate::physics::buoyancy::constants::SINKING_FRICTION;
use crate::physics::{BodyHandle, PhysicsWorld};
use crate::session::GameSession;
use crate::vehicle::{VehicleGroup, VehicleRegistry};

#[derive(Debug, Default, Clone, PartialEq)]
pub struct CollisionReport {
    pub ship_sunk: Option<ShipSinked>,
    pub game_over: Option<GameOver>,
}

/// Announce a sunk ship and end the game on the first contact between the
/// ship and an attacking boat. Only the first game-over reason is reported.
pub fn check_collisions(
    registry: &mut VehicleRegistry,
    world: &mut PhysicsWorld,
    session: &mut GameSession,
) -> CollisionReport {
    let mut report = CollisionReport::default();

    if let Some(ship) = registry.ship_mut() {
        if ship.take_sink_notice() {
            report.ship_sunk = Some(ShipSinked {
                label: ship.label.clone(),
            });
            if session.raise_game_over(GameOverReason::ShipSunk) {
                report.game_over = Some(GameOver {
                    reason: GameOverReason::ShipSunk,
                });
            }
        }
    }

    if !session.running || session.is_over() {
        return report;
    }

    let Some(ship_body) = registry.ship().and_then(|ship| ship.body) else {
        return report;
    };
    let attackers: Vec<BodyHandle> = registry
        .group(VehicleGroup::Attacking)
        .filter_map(|boat| boat.body)
        .collect();
    if attackers.is_empty() {
        return report;
    }

    let hits = world.colliding(ship_body, &attackers);
    if hits.is_empty() {
        return report;
    }
    debug!("Ship touched by {} attacking boats", hits.len());

    let mut impact = 0.0;
    for boat in registry
        .group_mut(VehicleGroup::Attacking)
        .filter(|boat| boat.body.is_some_and(|body| hits.contains(&body)))
    {
        let health = boat.health;
        impact += health;
        if boat.take_damage(health) {
            if let Some(body) = boat.body {
                world.set_kinematic(body, false);
                world.set_air_friction(body, SINKING_FRICTION);
            }
        }
    }
    if let Some(ship) = registry.ship_mut() {
        if ship.take_damage(impact) {
            info!("{} was rammed under", ship.label);
            if let Some(body) = ship.body {
                world.set_air_friction(body, SINKING_FRICTION);
            }
        }
    }

    if session.raise_game_over(GameOverReason::Collision) {
        report.game_over = Some(GameOver {
            reason: GameOverReason::Collision,
        });
    }
    report
}

/// Emits the ship sink and game-over events found by [`check_collisions`].
pub fn collisions_system(
    mut registry: ResMut<VehicleRegistry>,
    mut world: ResMut<PhysicsWorld>,
    mut session: ResMut<GameSession>,
    mut ship_sinks: EventWriter<ShipSinked>,
    mut game_overs: EventWriter<GameOver>,
) {
    let report = check_collisions(&mut registry, &mut world, &mut session);
    if let Some(sunk) = report.ship_sunk {
        info!("Ship {} sank", sunk.label);
        ship_sinks.write(sunk);
    }
    if let Some(game_over) = report.game_over {
        game_overs.write(game_over);
    }
}
