use bevy::prelude::*;

/// Per-tick order of the game systems. The sets are chained, so nothing in one
/// set observes a half-finished tick of the next.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SeaFixedUpdateSet {
    Input,
    Waves,
    Buoyancy,
    Integrate,
    Boats,
    Collisions,
    Publish,
}
