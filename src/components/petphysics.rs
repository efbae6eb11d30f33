//! One-body integrator for a pet inside a fixed rectangular arena.
//!
//! [`PetPhysics`] only stores a velocity vector. Position is read and written
//! through the [`Movable`] contract of the entity being simulated.
//!
//! Per tick, in order:
//! 1. bounce off the arena edges (invert the component, clamp back inside)
//! 2. gravity above the ground line, damped inverted bounce at or below it
//! 3. snap near-zero components to exactly 0
//! 4. move by `velocity * alpha`

use crate::components::path::Vec2;

pub const ARENA_WIDTH: f32 = 200.0;
pub const ARENA_HEIGHT: f32 = 200.0;
/// Y of the ground line the pet rests on.
pub const PET_GROUND: f32 = 190.0;
/// Downward acceleration per tick.
pub const G: f32 = 2.0;

/// Move contract the integrator drives.
pub trait Movable {
    fn x(&self) -> f32;
    fn y(&self) -> f32;
    /// Rendered width at the current scale.
    fn w(&self) -> f32;
    /// Rendered height at the current scale.
    fn h(&self) -> f32;
    fn move_to(&mut self, x: f32, y: f32);
}

/// Arena bounds and integration constants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicsSettings {
    pub arena_width: f32,
    pub arena_height: f32,
    /// Y of the line gravity pulls towards.
    pub ground: f32,
    /// Added to `vy` each tick while above the ground.
    pub gravity: f32,
    /// Components with `|v| <= deadzone` snap to 0.
    pub deadzone: f32,
    /// Factor applied to a non-negative `vy` at or below the ground.
    pub ground_bounce: f32,
}

impl Default for PhysicsSettings {
    fn default() -> Self {
        Self {
            arena_width: ARENA_WIDTH,
            arena_height: ARENA_HEIGHT,
            ground: PET_GROUND,
            gravity: G,
            deadzone: 1.0,
            ground_bounce: -0.5,
        }
    }
}

/// Velocity of one pet plus the settings it integrates with.
///
/// Forces accumulate into the velocity until [`stop`](Self::stop) or the
/// arena edges change it.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PetPhysics {
    velocity: Vec2,
    settings: PhysicsSettings,
}

impl PetPhysics {
    /// At rest, using `settings`.
    pub fn new(settings: PhysicsSettings) -> Self {
        Self {
            velocity: Vec2::ZERO,
            settings,
        }
    }

    /// Current velocity in units per tick.
    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn settings(&self) -> &PhysicsSettings {
        &self.settings
    }

    /// Add `delta` to the velocity.
    pub fn apply_force(&mut self, delta: Vec2) {
        self.velocity.x += delta.x;
        self.velocity.y += delta.y;
    }

    /// Drop all momentum.
    pub fn stop(&mut self) {
        self.velocity = Vec2::ZERO;
    }

    /// Reflect off arena edges and clamp the entity back inside.
    pub fn apply_limits(&mut self, body: &mut impl Movable) {
        let s = self.settings;
        if body.x() < 0.0 {
            self.velocity.x = -self.velocity.x;
            body.move_to(0.0, body.y());
        }
        if body.x() + body.w() > s.arena_width {
            self.velocity.x = -self.velocity.x;
            body.move_to(s.arena_width - body.w(), body.y());
        }
        if body.y() + body.h() > s.arena_height {
            self.velocity.y = -self.velocity.y;
            body.move_to(body.x(), s.arena_height - body.h());
        }
        if body.y() < 0.0 {
            self.velocity.y = -self.velocity.y;
            body.move_to(body.x(), 0.0);
        }
    }

    fn apply_gravity(&mut self, body: &impl Movable) {
        if body.y() + body.h() < self.settings.ground {
            self.velocity.y += self.settings.gravity;
        } else if self.velocity.y >= 0.0 {
            self.velocity.y *= self.settings.ground_bounce;
        }
    }

    fn apply_deadzone(&mut self) {
        if self.velocity.x.abs() <= self.settings.deadzone {
            self.velocity.x = 0.0;
        }
        if self.velocity.y.abs() <= self.settings.deadzone {
            self.velocity.y = 0.0;
        }
    }

    /// Run one integration step on `body`, scaling the move by `alpha`.
    ///
    /// The arena clamp runs first, so `body` is inside the arena when the
    /// step starts and may end it up to one velocity step outside.
    pub fn tick(&mut self, body: &mut impl Movable, alpha: f32) {
        self.apply_limits(body);
        self.apply_gravity(body);
        self.apply_deadzone();
        body.move_to(
            body.x() + self.velocity.x * alpha,
            body.y() + self.velocity.y * alpha,
        );
    }
}
