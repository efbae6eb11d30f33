//! The pet entity.
//!
//! A pet is three components: [`Pet`] (a [`PetPhysics`] integrator, an
//! [`AnimationPlayer`] and a [`StateMachine`] of [`PetState`]s),
//! [`MapPosition`] and [`Scale`]. The systems in [`crate::systems::pet`]
//! drive them once per frame.
//!
//! # Tick order
//!
//! 1. physics moves the position through the [`Movable`] contract
//!    ([`Pet::step_physics`])
//! 2. the behavior machine updates and any requested transition is entered
//! 3. the animation player advances and rebuilds if needed
//!
//! Steps 2 and 3 are [`Pet::step_behavior`]. Behaviors see this tick's
//! position, and entry side effects (forces, animation switches) are in place
//! before the frame is drawn.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use bevy_ecs::prelude::*;
use log::{debug, info};

use crate::components::animationplayer::{AnimationConfig, AnimationListener, AnimationPlayer};
use crate::components::mapposition::MapPosition;
use crate::components::path::{Affine, Vec2};
use crate::components::petphysics::{Movable, PetPhysics};
use crate::components::petstate::{BehaviorSettings, PetContext, PetState, PetStateKey};
use crate::components::scale::Scale;
use crate::components::statemachine::StateMachine;
use crate::error::PetError;
use crate::resources::assetstore::AssetStore;
use crate::resources::canvas::{
    Canvas, CompositeMode, PET_BODY_FILL, PET_PARTS_FILL, PET_STROKE, PET_STROKE_WIDTH,
};
use crate::resources::petconfig::PetConfig;

/// Vertical offset of the rolling ground at horizontal position `x`.
pub fn ground_offset(x: f32) -> f32 {
    -0.4 * x + 0.002 * x * x
}

/// Counts one-shot animation completions between ticks.
#[derive(Debug, Default)]
pub struct AnimationEndLatch(AtomicU32);

impl AnimationEndLatch {
    /// Return and reset the number of completions seen.
    pub fn take(&self) -> u32 {
        self.0.swap(0, Ordering::Relaxed)
    }
}

impl AnimationListener for AnimationEndLatch {
    fn on_animation_end(&self, _config: &AnimationConfig) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }
}

/// What happened to a pet during one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PetTickReport {
    /// `(from, to)` when the behavior changed.
    pub transition: Option<(PetStateKey, PetStateKey)>,
    pub animation_ended: bool,
    pub rebuilt: bool,
}

/// Everything the behavior callbacks borrow.
struct PetParts {
    physics: PetPhysics,
    player: AnimationPlayer,
    rng: fastrand::Rng,
    behavior: BehaviorSettings,
}

impl PetParts {
    fn context(&mut self, now_ms: u64) -> PetContext<'_> {
        PetContext {
            physics: &mut self.physics,
            player: &mut self.player,
            rng: &mut self.rng,
            settings: &self.behavior,
            now_ms,
        }
    }
}

/// A position paired with the scaled size the integrator clamps against.
struct Footprint<'a> {
    position: &'a mut MapPosition,
    size: Vec2,
}

impl Movable for Footprint<'_> {
    fn x(&self) -> f32 {
        self.position.pos.x
    }
    fn y(&self) -> f32 {
        self.position.pos.y
    }
    fn w(&self) -> f32 {
        self.size.x
    }
    fn h(&self) -> f32 {
        self.size.y
    }
    fn move_to(&mut self, x: f32, y: f32) {
        self.position.pos = Vec2::new(x, y);
    }
}

/// Behavior, physics and animation state of one pet.
///
/// Placement lives in the sibling [`MapPosition`] and [`Scale`] components
/// and is passed in explicitly wherever it matters.
#[derive(Component)]
pub struct Pet {
    alpha: f32,
    parts: PetParts,
    machine: StateMachine<PetState>,
    latch: Arc<AnimationEndLatch>,
    destroyed: bool,
}

impl Pet {
    /// Build a pet with randomly chosen variants and start it in Idle.
    ///
    /// Fails with [`PetError::NotReady`] before the store finished loading,
    /// with [`PetError::AssetNotFound`] when a needed variant is missing and
    /// with [`PetError::Config`] when the blink timings are unusable.
    pub fn new(
        store: &AssetStore,
        config: &PetConfig,
        seed: u64,
        now_ms: u64,
    ) -> Result<Self, PetError> {
        if !store.is_ready() {
            return Err(PetError::NotReady);
        }
        let mut rng = fastrand::Rng::with_seed(seed);
        let look = store.pick_look(&mut rng)?;
        let body_name = look.bodies[0].name.clone();
        let player_rng = fastrand::Rng::with_seed(rng.u64(..));
        let mut player = AnimationPlayer::new(look, config.blink, player_rng)?;

        let latch = Arc::new(AnimationEndLatch::default());
        player.subscribe(&latch);

        let mut parts = PetParts {
            physics: PetPhysics::new(config.physics),
            player,
            rng,
            behavior: config.behavior,
        };
        let idle = PetState::build(PetStateKey::Idle, &mut parts.rng, &parts.behavior);
        let mut machine = StateMachine::new(idle);
        machine
            .start(&mut parts.context(now_ms), now_ms)
            .map_err(|e| PetError::Config(e.to_string()))?;

        info!("Created pet '{}' (seed {})", body_name, seed);
        Ok(Self {
            alpha: config.alpha,
            parts,
            machine,
            latch,
            destroyed: false,
        })
    }

    /// Key of the running behavior.
    pub fn state(&self) -> PetStateKey {
        self.machine.current_key()
    }

    /// The behavior machine, for inspecting timers and the previous state.
    pub fn machine(&self) -> &StateMachine<PetState> {
        &self.machine
    }

    /// Current velocity, shorthand for `physics().velocity()`.
    pub fn velocity(&self) -> Vec2 {
        self.parts.physics.velocity()
    }

    pub fn physics(&self) -> &PetPhysics {
        &self.parts.physics
    }

    /// Direct access to the integrator, e.g. to push the pet around.
    pub fn physics_mut(&mut self) -> &mut PetPhysics {
        &mut self.parts.physics
    }

    pub fn player(&self) -> &AnimationPlayer {
        &self.parts.player
    }

    /// The latch subscribed to the player for one-shot completions.
    pub fn listener(&self) -> &Arc<AnimationEndLatch> {
        &self.latch
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Mirrored while moving right.
    pub fn is_flipped(&self) -> bool {
        self.parts.physics.velocity().x > 0.0
    }

    /// Width and height of the current composite at `scale`.
    pub fn size(&self, scale: &Scale) -> Vec2 {
        let bounds = self.parts.player.bounds();
        Vec2::new(bounds.width * scale.scale, bounds.height * scale.scale)
    }

    /// Replace the running animation without changing behavior.
    pub fn play_animation(&mut self, config: AnimationConfig) {
        self.parts.player.play(config);
    }

    /// Request a behavior. Returns whether the machine accepted it.
    pub fn set_state(&mut self, key: PetStateKey, now_ms: u64) -> bool {
        if self.destroyed {
            return false;
        }
        let next = PetState::build(key, &mut self.parts.rng, &self.parts.behavior);
        self.machine
            .enter(next, &mut self.parts.context(now_ms), now_ms)
    }

    /// Integrate one physics step, moving `position`.
    pub fn step_physics(&mut self, position: &mut MapPosition, scale: &Scale) {
        if self.destroyed {
            return;
        }
        let mut footprint = Footprint {
            position,
            size: self.size(scale),
        };
        self.parts.physics.tick(&mut footprint, self.alpha);
    }

    /// Update the behavior machine, enter any requested state, then advance
    /// the animation.
    pub fn step_behavior(&mut self, now_ms: u64) -> PetTickReport {
        let mut report = PetTickReport::default();
        if self.destroyed {
            return report;
        }

        let from = self.machine.current_key();
        let request = self.machine.update(&mut self.parts.context(now_ms), now_ms);
        if let Some(next) = request {
            if self.set_state(next, now_ms) {
                report.transition = Some((from, next));
            }
        }

        report.rebuilt = self.parts.player.tick();
        report.animation_ended = self.latch.take() > 0;
        report
    }

    /// One full tick: [`step_physics`](Self::step_physics) followed by
    /// [`step_behavior`](Self::step_behavior).
    pub fn tick(&mut self, position: &mut MapPosition, scale: &Scale, now_ms: u64) -> PetTickReport {
        self.step_physics(position, scale);
        self.step_behavior(now_ms)
    }

    /// Detach from the animation player. Later ticks and renders are no-ops
    /// or errors respectively.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.parts.player.unsubscribe(&self.latch);
        self.destroyed = true;
        debug!("Destroyed pet in state {}", self.machine.current_key());
    }

    /// Canvas transform for the current frame: ground offset, optional
    /// mirroring about the right edge, then scale.
    pub fn render_transform(&self, position: &MapPosition, scale: &Scale) -> Affine {
        let width = self.parts.player.bounds().width;
        let z = scale.scale;
        let Vec2 { x, y } = position.pos;
        let y = y + ground_offset(x + width * z / 2.0);
        let base = if self.is_flipped() {
            Affine::IDENTITY.translate(x + width * z, y).flip_x()
        } else {
            Affine::IDENTITY.translate(x, y)
        };
        base.scale(z, z)
    }

    /// Draw the pet: outer parts, body cut-out, body, inner parts.
    pub fn render(
        &self,
        position: &MapPosition,
        scale: &Scale,
        canvas: &mut dyn Canvas,
    ) -> Result<(), PetError> {
        if self.destroyed {
            return Err(PetError::Render("pet was destroyed".into()));
        }
        let Vec2 { x, y } = position.pos;
        if !(x.is_finite() && y.is_finite() && scale.scale.is_finite()) {
            return Err(PetError::Render(format!(
                "non-finite placement ({}, {}, {})",
                x, y, scale.scale
            )));
        }
        let composite = self.parts.player.composite();

        canvas.save();
        canvas.set_transform(self.render_transform(position, scale));

        canvas.fill(&composite.outer, PET_PARTS_FILL);
        canvas.stroke(&composite.outer, PET_STROKE, PET_STROKE_WIDTH);

        canvas.set_composite(CompositeMode::DestinationOut);
        canvas.fill(&composite.body, PET_PARTS_FILL);
        canvas.set_composite(CompositeMode::SourceOver);

        canvas.fill(&composite.body, PET_BODY_FILL);
        canvas.stroke(&composite.body, PET_STROKE, PET_STROKE_WIDTH);

        canvas.fill(&composite.inner, PET_PARTS_FILL);
        canvas.stroke(&composite.inner, PET_STROKE, PET_STROKE_WIDTH);

        canvas.restore();
        Ok(())
    }
}

impl std::fmt::Debug for Pet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pet")
            .field("state", &self.machine.current_key())
            .field("velocity", &self.parts.physics.velocity())
            .field("destroyed", &self.destroyed)
            .finish()
    }
}
