//! Floating vehicles: the player's ship and the attacking boats.
//!
//! A vehicle is a plain record tagged by kind. Its rigid body lives in the
//! [`PhysicsWorld`](crate::physics::PhysicsWorld); position, velocity and angle
//! are mirrored here after every physics step so readers never need the world.

pub mod builds;
pub mod registry;

use std::collections::VecDeque;

use bevy::math::Vec2;
use bevy_log::{info, warn};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::physics::world::{BodyDesc, BodyHandle, BodyState, PhysicsWorld};
pub use builds::{BoatBuild, BoatBuildId, ShipBuild, BOAT_CATALOG};
pub use registry::{VehicleGroup, VehicleRegistry};

pub mod constants {
    /// Positions kept for a boat's wake trail.
    pub const TRAIL_LENGTH: usize = 12;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VehicleKind {
    Ship,
    Boat(BoatBuildId),
}

/// `Uninitialized -> Stable -> (Attacking | Idle) -> Sinking -> Removed`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VehicleState {
    /// Held still during the grace period after creation
    Uninitialized,
    Stable,
    Attacking,
    /// A boat with no ship to chase
    Idle,
    Sinking,
    /// Body and registry entry are gone
    Removed,
}

/// Which way a boat is heading, and its wake.
#[derive(Debug, Clone, PartialEq)]
pub struct BoatCourse {
    /// +1 heads right, -1 heads left
    pub direction: f32,
    pub trail: VecDeque<Vec2>,
    /// Membership of the attacking group. Set on launch, so a boat still in
    /// its grace period already counts as the current attacker.
    pub attacking: bool,
}

impl BoatCourse {
    pub fn new(direction: f32) -> Self {
        Self {
            direction: if direction < 0.0 { -1.0 } else { 1.0 },
            trail: VecDeque::with_capacity(constants::TRAIL_LENGTH),
            attacking: true,
        }
    }

    fn record(&mut self, position: Vec2) {
        if self.trail.len() == constants::TRAIL_LENGTH {
            self.trail.pop_front();
        }
        self.trail.push_back(position);
    }
}

/// Fresh ulid for a vehicle body's user data.
pub fn create_new_vehicle_id() -> u128 {
    Ulid::new().0
}

#[derive(Debug, Clone, PartialEq)]
pub struct Vehicle {
    pub id: u128,
    pub label: String,
    pub kind: VehicleKind,
    pub body: Option<BodyHandle>,
    /// Full hull width and height
    pub size: Vec2,
    pub position: Vec2,
    /// Pixels per second
    pub velocity: Vec2,
    pub angle: f32,
    /// Where the body is pinned while uninitialized
    pub spawn_position: Vec2,
    pub health: f32,
    pub destroyed: bool,
    pub buoyant: bool,
    /// Set once the sink has been announced
    pub sink_reported: bool,
    /// Game time of creation (seconds)
    pub created_at: f32,
    /// Pixels per tick
    pub max_velocity_x: f32,
    /// Pixels per tick, per tick
    pub acceleration: f32,
    pub course: Option<BoatCourse>,
    state: VehicleState,
}

impl Vehicle {
    /// The player's ship, sized for `screen_width`.
    pub fn ship(label: impl Into<String>, build: &ShipBuild, position: Vec2, screen_width: f32, now: f32) -> Self {
        Self::new(
            label.into(),
            VehicleKind::Ship,
            build.hull_size(screen_width),
            position,
            build.health,
            now,
        )
    }

    /// A boat of `build` heading in `direction` (-1 left, 1 right).
    pub fn boat(
        label: impl Into<String>,
        build: &BoatBuild,
        position: Vec2,
        direction: f32,
        screen_width: f32,
        now: f32,
    ) -> Self {
        let mut vehicle = Self::new(
            label.into(),
            VehicleKind::Boat(build.id),
            build.hull_size(screen_width),
            position,
            build.health,
            now,
        );
        vehicle.max_velocity_x = build.max_velocity_x;
        vehicle.acceleration = build.acceleration;
        vehicle.course = Some(BoatCourse::new(direction));
        vehicle
    }

    fn new(label: String, kind: VehicleKind, size: Vec2, position: Vec2, health: f32, now: f32) -> Self {
        Self {
            id: create_new_vehicle_id(),
            label,
            kind,
            body: None,
            size,
            position,
            velocity: Vec2::ZERO,
            angle: 0.0,
            spawn_position: position,
            health,
            destroyed: false,
            buoyant: true,
            sink_reported: false,
            created_at: now,
            max_velocity_x: 0.0,
            acceleration: 0.0,
            course: None,
            state: VehicleState::Uninitialized,
        }
    }

    /// Override the chase limits, in pixels per tick.
    pub fn with_motion(mut self, acceleration: f32, max_velocity_x: f32) -> Self {
        self.acceleration = acceleration;
        self.max_velocity_x = max_velocity_x;
        self
    }

    pub fn state(&self) -> VehicleState {
        self.state
    }

    pub fn is_ship(&self) -> bool {
        self.kind == VehicleKind::Ship
    }

    pub fn is_boat(&self) -> bool {
        matches!(self.kind, VehicleKind::Boat(_))
    }

    pub fn is_initialized(&self) -> bool {
        self.state != VehicleState::Uninitialized
    }

    pub fn is_sunk(&self) -> bool {
        matches!(self.state, VehicleState::Sinking | VehicleState::Removed)
    }

    pub fn is_attacking(&self) -> bool {
        !self.is_sunk() && self.course.as_ref().is_some_and(|course| course.attacking)
    }

    /// Leave the grace period once `grace` seconds have passed since creation.
    /// Returns true on the transition.
    pub fn try_initialize(&mut self, now: f32, grace: f32) -> bool {
        if self.state != VehicleState::Uninitialized || now - self.created_at < grace {
            return false;
        }
        self.state = VehicleState::Stable;
        true
    }

    /// Boats only. Returns true when the boat starts chasing.
    pub fn start_attacking(&mut self) -> bool {
        if !matches!(self.state, VehicleState::Stable | VehicleState::Idle) {
            return false;
        }
        let Some(course) = self.course.as_mut() else {
            return false;
        };
        course.attacking = true;
        self.state = VehicleState::Attacking;
        true
    }

    /// Point a boat at `target_x`.
    pub fn aim_at(&mut self, target_x: f32) {
        let position_x = self.position.x;
        if let Some(course) = self.course.as_mut() {
            if target_x != position_x {
                course.direction = (target_x - position_x).signum();
            }
        }
    }

    pub fn direction(&self) -> f32 {
        self.course.as_ref().map_or(0.0, |course| course.direction)
    }

    /// Stop chasing. The boat drifts with the water.
    pub fn go_idle(&mut self) {
        if self.state == VehicleState::Attacking {
            self.state = VehicleState::Idle;
        }
    }

    /// Returns true if this call sank the vehicle.
    pub fn mark_sunk(&mut self) -> bool {
        if self.is_sunk() {
            return false;
        }
        self.state = VehicleState::Sinking;
        info!("{} is sinking", self.label);
        true
    }

    pub fn mark_removed(&mut self) {
        self.state = VehicleState::Removed;
        self.body = None;
    }

    /// Returns true if the damage sank the vehicle.
    pub fn take_damage(&mut self, amount: f32) -> bool {
        self.health = (self.health - amount.max(0.0)).max(0.0);
        if self.health > 0.0 || self.destroyed {
            return false;
        }
        self.destroyed = true;
        self.mark_sunk()
    }

    /// True exactly once, on the first call after the vehicle sank.
    pub fn take_sink_notice(&mut self) -> bool {
        if self.is_sunk() && !self.sink_reported {
            self.sink_reported = true;
            return true;
        }
        false
    }

    pub fn hull_area(&self) -> f32 {
        self.size.x * self.size.y
    }

    /// Half height of the hull's axis-aligned bounds at its current angle.
    pub fn half_extent_y(&self) -> f32 {
        let (sin, cos) = self.angle.sin_cos();
        (self.size.x / 2.0) * sin.abs() + (self.size.y / 2.0) * cos.abs()
    }

    pub fn bottom_y(&self) -> f32 {
        self.position.y + self.half_extent_y()
    }

    /// Fully below the visible screen.
    pub fn is_off_screen(&self, screen_height: f32) -> bool {
        self.position.y > screen_height + self.size.y
    }

    /// Mirror the fields read elsewhere from the body.
    pub fn sync_from_body(&mut self, state: &BodyState) {
        self.position = state.position;
        self.velocity = state.velocity;
        self.angle = state.angle;
    }

    /// Append the current position to a boat's wake.
    pub fn record_trail(&mut self) {
        let position = self.position;
        if let Some(course) = self.course.as_mut() {
            course.record(position);
        }
    }
}

/// Give a vehicle a kinematic body for its grace period and register it.
pub fn launch(mut vehicle: Vehicle, world: &mut PhysicsWorld, registry: &mut VehicleRegistry) -> String {
    let desc = BodyDesc::hull(vehicle.position, vehicle.size, vehicle.id).kinematic();
    vehicle.body = Some(world.create_body(&desc));
    let label = vehicle.label.clone();
    info!(
        "Launched {} ({:?}) at ({:.1}, {:.1})",
        label, vehicle.kind, vehicle.position.x, vehicle.position.y
    );
    if let Some(previous) = registry.insert(vehicle) {
        warn!("{} replaced an existing vehicle", previous.label);
        if let Some(body) = previous.body {
            world.remove_body(body);
        }
    }
    label
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boat() -> Vehicle {
        Vehicle::boat(
            "boat-1",
            BoatBuildId::Skiff.build(),
            Vec2::new(0.0, 300.0),
            1.0,
            800.0,
            0.0,
        )
    }

    #[test]
    fn test_boat_lifecycle() {
        let mut boat = boat();
        assert_eq!(boat.state(), VehicleState::Uninitialized);
        assert!(!boat.start_attacking());

        assert!(!boat.try_initialize(0.2, 0.5));
        assert!(boat.try_initialize(0.5, 0.5));
        assert!(!boat.try_initialize(0.6, 0.5));
        assert_eq!(boat.state(), VehicleState::Stable);
        // Launched boats belong to the attacking group before they move.
        assert!(boat.is_attacking());

        assert!(boat.start_attacking());
        assert_eq!(boat.state(), VehicleState::Attacking);
        boat.go_idle();
        assert_eq!(boat.state(), VehicleState::Idle);
        assert!(boat.start_attacking());

        assert!(boat.mark_sunk());
        assert!(!boat.mark_sunk());
        assert!(!boat.is_attacking());
        boat.mark_removed();
        assert_eq!(boat.state(), VehicleState::Removed);
        assert!(boat.is_sunk());
    }

    #[test]
    fn test_ship_never_attacks() {
        let mut ship = Vehicle::ship("ship", &ShipBuild::default(), Vec2::ZERO, 800.0, 0.0);
        ship.try_initialize(1.0, 0.5);
        assert!(!ship.start_attacking());
        assert!(ship.is_ship());
        assert!(ship.course.is_none());
    }

    #[test]
    fn test_damage_clamps_and_sinks_once() {
        let mut boat = boat();
        let health = boat.health;
        assert!(!boat.take_damage(health / 2.0));
        assert!(!boat.destroyed);
        assert!(boat.take_damage(health * 10.0));
        assert_eq!(boat.health, 0.0);
        assert!(boat.destroyed);
        assert!(!boat.take_damage(5.0));
        assert_eq!(boat.health, 0.0);
    }

    #[test]
    fn test_sink_notice_fires_once() {
        let mut boat = boat();
        assert!(!boat.take_sink_notice());
        boat.mark_sunk();
        assert!(boat.take_sink_notice());
        assert!(!boat.take_sink_notice());
    }

    #[test]
    fn test_bottom_follows_rotation() {
        let mut boat = boat();
        let flat = boat.bottom_y();
        assert_eq!(flat, boat.position.y + boat.size.y / 2.0);
        boat.angle = std::f32::consts::FRAC_PI_2;
        assert!((boat.bottom_y() - (boat.position.y + boat.size.x / 2.0)).abs() < 1e-3);
    }

    #[test]
    fn test_off_screen_needs_full_hull_below() {
        let mut boat = boat();
        boat.position.y = 600.0 + boat.size.y * 0.5;
        assert!(!boat.is_off_screen(600.0));
        boat.position.y = 600.0 + boat.size.y * 1.5;
        assert!(boat.is_off_screen(600.0));
    }

    #[test]
    fn test_sync_records_bounded_trail() {
        let mut boat = boat();
        for i in 0..40 {
            boat.sync_from_body(&BodyState {
                position: Vec2::new(i as f32, 300.0),
                velocity: Vec2::new(60.0, 0.0),
                angle: 0.01,
                mass: 1.0,
                kinematic: false,
            });
            boat.record_trail();
        }
        let trail = boat.course.as_ref().map(|course| course.trail.len());
        assert_eq!(trail, Some(constants::TRAIL_LENGTH));
        assert_eq!(boat.position.x, 39.0);
        assert_eq!(boat.angle, 0.01);
    }

    #[test]
    fn test_aim_flips_direction() {
        let mut boat = boat();
        assert_eq!(boat.direction(), 1.0);
        boat.aim_at(-50.0);
        assert_eq!(boat.direction(), -1.0);
        boat.aim_at(boat.position.x);
        assert_eq!(boat.direction(), -1.0);
    }

    #[test]
    fn test_launch_creates_kinematic_body() {
        let mut world = PhysicsWorld::new(980.0);
        let mut registry = VehicleRegistry::default();
        let label = launch(boat(), &mut world, &mut registry);
        let body = registry.get(&label).and_then(|vehicle| vehicle.body);
        assert!(body.and_then(|body| world.body_state(body)).is_some_and(|state| state.kinematic));

        // Relaunching the same label replaces the old body.
        launch(boat(), &mut world, &mut registry);
        assert_eq!(world.body_count(), 1);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_ids_are_unique() {
        assert_ne!(boat().id, boat().id);
    }
}
