//! Rigid-body world wrapping a raw Rapier pipeline.
//!
//! The game is planar: every body lives in the XY plane of a 3D Rapier world,
//! with Z translation and X/Y rotation locked. Screen y grows downward, so
//! gravity points along +y.

use bevy::math::Vec2;
use bevy_ecs::resource::Resource;
use bevy_log::{debug, warn};
use bevy_rapier3d::parry::query::intersection_test;
use bevy_rapier3d::rapier::prelude::*;
use nalgebra as na;

pub mod constants {
    /// Half-depth of every collider along the locked Z axis.
    pub const BODY_HALF_DEPTH: f32 = 0.5;
    /// Hull density (mass per square pixel, with unit depth).
    pub const DEFAULT_DENSITY: f32 = 0.001;
    pub const DEFAULT_FRICTION: f32 = 0.1;
    pub const DEFAULT_RESTITUTION: f32 = 0.0;
    /// Keeps point impulses from spinning hulls up faster than tilt correction.
    pub const ANGULAR_DAMPING: f32 = 4.0;
    /// Air friction coefficients are per 1/60 s step; Rapier damping is per second.
    pub const AIR_FRICTION_TO_DAMPING: f32 = 60.0;
    /// Rapier's length unit, i.e. how many world units make up one "meter".
    pub const PIXELS_PER_METER: f32 = 50.0;
}

use constants::*;

/// Opaque handle to a body in the [`PhysicsWorld`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyHandle(RigidBodyHandle);

/// Everything needed to insert a hull into the world.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyDesc {
    /// Centre of the hull
    pub position: Vec2,
    /// Full width and height of the hull
    pub size: Vec2,
    pub angle: f32,
    /// Kinematic bodies ignore gravity and contacts until switched to dynamic.
    pub kinematic: bool,
    /// Stored on the body for identification (the vehicle id)
    pub user_data: u128,
    pub density: f32,
}

impl BodyDesc {
    /// Dynamic box body for a hull centred at `position`.
    pub fn hull(position: Vec2, size: Vec2, user_data: u128) -> Self {
        Self {
            position,
            size,
            angle: 0.0,
            kinematic: false,
            user_data,
            density: DEFAULT_DENSITY,
        }
    }

    pub fn kinematic(mut self) -> Self {
        self.kinematic = true;
        self
    }
}

/// Read-only copy of the fields the game mirrors from a body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyState {
    pub position: Vec2,
    /// Pixels per second
    pub velocity: Vec2,
    pub angle: f32,
    pub mass: f32,
    pub kinematic: bool,
}

#[derive(Resource)]
pub struct PhysicsWorld {
    gravity: Vector<Real>,
    integration_parameters: IntegrationParameters,
    pipeline: PhysicsPipeline,
    islands: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    query_pipeline: QueryPipeline,
}

#[inline]
fn to_vector(v: Vec2) -> Vector<Real> {
    na::Vector3::new(v.x, v.y, 0.0)
}

#[inline]
fn z_rotation(angle: f32) -> Rotation<Real> {
    na::UnitQuaternion::from_axis_angle(&na::Vector3::z_axis(), angle)
}

impl PhysicsWorld {
    /// Empty world. Gravity pulls toward +y.
    pub fn new(gravity_y: f32) -> Self {
        let integration_parameters = IntegrationParameters {
            length_unit: PIXELS_PER_METER,
            ..IntegrationParameters::default()
        };

        Self {
            gravity: na::Vector3::new(0.0, gravity_y, 0.0),
            integration_parameters,
            pipeline: PhysicsPipeline::new(),
            islands: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
        }
    }

    /// Insert a body with its collider.
    pub fn create_body(&mut self, desc: &BodyDesc) -> BodyHandle {
        let builder = if desc.kinematic {
            RigidBodyBuilder::kinematic_position_based()
        } else {
            RigidBodyBuilder::dynamic()
        };

        let body = builder
            .translation(to_vector(desc.position))
            .rotation(na::Vector3::new(0.0, 0.0, desc.angle))
            .locked_axes(
                LockedAxes::TRANSLATION_LOCKED_Z
                    | LockedAxes::ROTATION_LOCKED_X
                    | LockedAxes::ROTATION_LOCKED_Y,
            )
            .angular_damping(ANGULAR_DAMPING)
            .can_sleep(false)
            .ccd_enabled(true)
            .user_data(desc.user_data)
            .build();
        let handle = self.bodies.insert(body);

        let collider = ColliderBuilder::cuboid(
            (desc.size.x / 2.0).max(f32::EPSILON),
            (desc.size.y / 2.0).max(f32::EPSILON),
            BODY_HALF_DEPTH,
        )
        .density(desc.density)
        .friction(DEFAULT_FRICTION)
        .restitution(DEFAULT_RESTITUTION)
        .build();
        self.colliders
            .insert_with_parent(collider, handle, &mut self.bodies);

        debug!(
            "Created {} body at ({:.1}, {:.1}) size {:.1}x{:.1}",
            if desc.kinematic { "kinematic" } else { "dynamic" },
            desc.position.x,
            desc.position.y,
            desc.size.x,
            desc.size.y
        );

        BodyHandle(handle)
    }

    /// Remove a body and its colliders. Returns false if it was already gone.
    pub fn remove_body(&mut self, handle: BodyHandle) -> bool {
        self.bodies
            .remove(
                handle.0,
                &mut self.islands,
                &mut self.colliders,
                &mut self.impulse_joints,
                &mut self.multibody_joints,
                true,
            )
            .is_some()
    }

    pub fn contains(&self, handle: BodyHandle) -> bool {
        self.bodies.contains(handle.0)
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Position, velocity, angle and mass of a body, `None` once removed.
    pub fn body_state(&self, handle: BodyHandle) -> Option<BodyState> {
        let body = self.bodies.get(handle.0)?;
        let translation = body.translation();
        let linvel = body.linvel();
        Some(BodyState {
            position: Vec2::new(translation.x, translation.y),
            velocity: Vec2::new(linvel.x, linvel.y),
            angle: body.rotation().euler_angles().2,
            mass: body.mass(),
            kinematic: body.is_kinematic(),
        })
    }

    /// Impulse applied at a world point, so it can also spin the body.
    pub fn apply_impulse_at_point(&mut self, handle: BodyHandle, impulse: Vec2, point: Vec2) -> bool {
        let Some(body) = self.bodies.get_mut(handle.0) else {
            return false;
        };
        body.apply_impulse_at_point(
            to_vector(impulse),
            na::Point3::new(point.x, point.y, 0.0),
            true,
        );
        true
    }

    pub fn apply_impulse(&mut self, handle: BodyHandle, impulse: Vec2) -> bool {
        let Some(body) = self.bodies.get_mut(handle.0) else {
            return false;
        };
        body.apply_impulse(to_vector(impulse), true);
        true
    }

    pub fn set_velocity(&mut self, handle: BodyHandle, velocity: Vec2) -> bool {
        let Some(body) = self.bodies.get_mut(handle.0) else {
            return false;
        };
        body.set_linvel(to_vector(velocity), true);
        true
    }

    pub fn set_angle(&mut self, handle: BodyHandle, angle: f32) -> bool {
        let Some(body) = self.bodies.get_mut(handle.0) else {
            return false;
        };
        body.set_rotation(z_rotation(angle), true);
        true
    }

    pub fn set_position(&mut self, handle: BodyHandle, position: Vec2) -> bool {
        let Some(body) = self.bodies.get_mut(handle.0) else {
            return false;
        };
        body.set_translation(to_vector(position), true);
        true
    }

    /// Per-step air friction, translated to Rapier's per-second linear damping.
    pub fn set_air_friction(&mut self, handle: BodyHandle, friction: f32) -> bool {
        let Some(body) = self.bodies.get_mut(handle.0) else {
            return false;
        };
        body.set_linear_damping(friction.max(0.0) * AIR_FRICTION_TO_DAMPING);
        true
    }

    /// Switch between kinematic and dynamic. Returns false for unknown handles.
    pub fn set_kinematic(&mut self, handle: BodyHandle, kinematic: bool) -> bool {
        let Some(body) = self.bodies.get_mut(handle.0) else {
            return false;
        };
        let body_type = if kinematic {
            RigidBodyType::KinematicPositionBased
        } else {
            RigidBodyType::Dynamic
        };
        body.set_body_type(body_type, true);
        true
    }

    /// Pin a body in place: zero velocity, fixed position and angle.
    pub fn freeze(&mut self, handle: BodyHandle, position: Vec2, angle: f32) -> bool {
        let Some(body) = self.bodies.get_mut(handle.0) else {
            return false;
        };
        body.set_linvel(na::Vector3::zeros(), false);
        body.set_angvel(na::Vector3::zeros(), false);
        body.set_translation(to_vector(position), false);
        body.set_rotation(z_rotation(angle), false);
        true
    }

    fn collider_of(&self, handle: BodyHandle) -> Option<ColliderHandle> {
        self.bodies.get(handle.0)?.colliders().first().copied()
    }

    /// Bodies from `others` currently touching `handle`.
    ///
    /// Uses the narrow phase contacts from the last step, falling back to a
    /// direct shape intersection test for pairs the solver ignores (two
    /// kinematic bodies).
    pub fn colliding(&self, handle: BodyHandle, others: &[BodyHandle]) -> Vec<BodyHandle> {
        let Some(own) = self.collider_of(handle) else {
            warn!("Collision query on a body that is not in the world");
            return Vec::new();
        };
        let Some(own_collider) = self.colliders.get(own) else {
            return Vec::new();
        };

        others
            .iter()
            .copied()
            .filter(|other| *other != handle)
            .filter(|other| {
                let Some(theirs) = self.collider_of(*other) else {
                    return false;
                };
                let in_contact = self
                    .narrow_phase
                    .contact_pair(own, theirs)
                    .is_some_and(|pair| pair.has_any_active_contact);
                if in_contact {
                    return true;
                }
                let Some(their_collider) = self.colliders.get(theirs) else {
                    return false;
                };
                intersection_test(
                    own_collider.position(),
                    own_collider.shape(),
                    their_collider.position(),
                    their_collider.shape(),
                )
                .unwrap_or(false)
            })
            .collect()
    }

    /// Advance the world by `dt` seconds.
    pub fn step(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        self.integration_parameters.dt = dt;
        self.pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &(),
        );
    }

    pub fn gravity(&self) -> f32 {
        self.gravity.y
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new(crate::constants::DEFAULT_GRAVITY)
    }
}
