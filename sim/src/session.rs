use bevy_ecs::resource::Resource;
use bevy_log::info;

use crate::events::GameOverReason;

/// State of the current play session.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct GameSession {
    /// Boats only spawn, and collisions only count, while running.
    pub running: bool,
    game_over: Option<GameOverReason>,
    pub boats_sunk: u32,
    pub tick: u64,
}

impl Default for GameSession {
    fn default() -> Self {
        Self {
            running: true,
            game_over: None,
            boats_sunk: 0,
            tick: 0,
        }
    }
}

impl GameSession {
    /// Why the session ended, if it has.
    pub fn game_over(&self) -> Option<GameOverReason> {
        self.game_over
    }

    pub fn is_over(&self) -> bool {
        self.game_over.is_some()
    }

    /// Latch the game-over state. Only the first call returns true.
    pub fn raise_game_over(&mut self, reason: GameOverReason) -> bool {
        if self.game_over.is_some() {
            return false;
        }
        info!("Game over: {:?} after {} ticks, score {}", reason, self.tick, self.boats_sunk);
        self.game_over = Some(reason);
        true
    }

    /// Count a boat sunk during play.
    pub fn record_boat_sunk(&mut self) {
        self.boats_sunk += 1;
    }
}
