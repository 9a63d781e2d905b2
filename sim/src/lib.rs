pub mod boats;
pub mod collisions;
pub mod config;
pub mod constants;
pub mod events;
pub mod physics;
pub mod plugin;
pub mod session;
pub mod sets;
pub mod snapshot;
pub mod touch;
pub mod vehicle;
pub mod water;

pub use config::{ConfigError, GameConfig};
pub use constants::*;
pub use events::{BoatSinked, GameOver, GameOverReason, ShipSinked};
pub use plugin::SeaGamePlugin;
pub use session::GameSession;
pub use sets::SeaFixedUpdateSet;
pub use snapshot::{FrameSnapshot, SnapshotBuffer};
pub use touch::GestureEvent;
