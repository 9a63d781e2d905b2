//! Signals raised by the simulation for UI and audio layers.

use bevy::prelude::*;

use crate::vehicle::BoatBuildId;

#[derive(Event, Debug, Clone, PartialEq)]
pub struct BoatSinked {
    pub label: String,
    pub build: BoatBuildId,
}

#[derive(Event, Debug, Clone, PartialEq)]
pub struct ShipSinked {
    pub label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameOverReason {
    /// An attacking boat reached the ship
    Collision,
    ShipSunk,
}

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameOver {
    pub reason: GameOverReason,
}
