//! Hull catalog. Boats and the ship differ only by the numbers in these tables.

use bevy::math::Vec2;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BoatBuildId {
    Dinghy,
    Skiff,
    Cutter,
    Gunboat,
}

impl BoatBuildId {
    pub const ALL: [BoatBuildId; 4] = [
        BoatBuildId::Dinghy,
        BoatBuildId::Skiff,
        BoatBuildId::Cutter,
        BoatBuildId::Gunboat,
    ];

    /// Catalog entry for this build.
    pub fn build(self) -> &'static BoatBuild {
        match self {
            BoatBuildId::Dinghy => &BOAT_CATALOG[0],
            BoatBuildId::Skiff => &BOAT_CATALOG[1],
            BoatBuildId::Cutter => &BOAT_CATALOG[2],
            BoatBuildId::Gunboat => &BOAT_CATALOG[3],
        }
    }
}

/// One boat type. Velocities are in pixels per tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoatBuild {
    pub id: BoatBuildId,
    /// Hull width as a fraction of the screen width
    pub size_ratio: f32,
    /// Hull height over hull width
    pub aspect: f32,
    /// Horizontal speed gained per tick while chasing
    pub acceleration: f32,
    pub max_velocity_x: f32,
    pub health: f32,
    pub asset_key: &'static str,
}

impl BoatBuild {
    pub fn hull_size(&self, screen_width: f32) -> Vec2 {
        let width = screen_width * self.size_ratio;
        Vec2::new(width, width * self.aspect)
    }
}

pub static BOAT_CATALOG: [BoatBuild; 4] = [
    BoatBuild {
        id: BoatBuildId::Dinghy,
        size_ratio: 0.08,
        aspect: 0.4,
        acceleration: 0.05,
        max_velocity_x: 1.5,
        health: 20.0,
        asset_key: "boats/dinghy",
    },
    BoatBuild {
        id: BoatBuildId::Skiff,
        size_ratio: 0.1,
        aspect: 0.35,
        acceleration: 0.08,
        max_velocity_x: 2.0,
        health: 30.0,
        asset_key: "boats/skiff",
    },
    BoatBuild {
        id: BoatBuildId::Cutter,
        size_ratio: 0.12,
        aspect: 0.35,
        acceleration: 0.1,
        max_velocity_x: 2.5,
        health: 40.0,
        asset_key: "boats/cutter",
    },
    BoatBuild {
        id: BoatBuildId::Gunboat,
        size_ratio: 0.15,
        aspect: 0.4,
        acceleration: 0.04,
        max_velocity_x: 1.2,
        health: 80.0,
        asset_key: "boats/gunboat",
    },
];

/// The player's ship.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShipBuild {
    pub size_ratio: f32,
    pub aspect: f32,
    pub health: f32,
    pub asset_key: String,
}

impl ShipBuild {
    pub fn hull_size(&self, screen_width: f32) -> Vec2 {
        let width = screen_width * self.size_ratio;
        Vec2::new(width, width * self.aspect)
    }
}

impl Default for ShipBuild {
    fn default() -> Self {
        Self {
            size_ratio: 0.2,
            aspect: 0.3,
            health: 100.0,
            asset_key: "ship".to_string(),
        }
    }
}
