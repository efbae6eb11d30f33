//! Pet behaviors on top of the generic [`StateMachine`](crate::components::statemachine::StateMachine).
//!
//! Each behavior is a [`PetState`] variant carrying only the data it needs.
//! A fresh value is built for every activation with [`PetState::build`], and
//! the pet's parts are lent to callbacks through a [`PetContext`].
//!
//! Topology is hub-and-spoke: Idle may go to Walking, Eating or Jumping, and
//! every other state may only return to Idle.

use std::fmt;

use crate::components::animationplayer::{AnimationConfig, AnimationPlayer, Pose};
use crate::components::path::Vec2;
use crate::components::petphysics::PetPhysics;
use crate::components::statemachine::{LeaveCondition, StateBehavior, StateDescriptor};
use crate::components::timer::DeferredTimer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PetStateKey {
    Idle,
    Walking,
    Eating,
    Jumping,
}

impl PetStateKey {
    pub const ALL: [PetStateKey; 4] = [
        PetStateKey::Idle,
        PetStateKey::Walking,
        PetStateKey::Eating,
        PetStateKey::Jumping,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PetStateKey::Idle => "Idle",
            PetStateKey::Walking => "Walking",
            PetStateKey::Eating => "Eating",
            PetStateKey::Jumping => "Jumping",
        }
    }

    pub fn permitted_next(&self) -> &'static [PetStateKey] {
        match self {
            PetStateKey::Idle => &[PetStateKey::Walking, PetStateKey::Eating, PetStateKey::Jumping],
            PetStateKey::Walking | PetStateKey::Eating | PetStateKey::Jumping => &[PetStateKey::Idle],
        }
    }
}

impl fmt::Display for PetStateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tunables of the four behaviors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BehaviorSettings {
    /// Idle jumps with a 1/n chance per tick; 0 never jumps.
    pub jump_chance: u32,
    /// Idle starts walking with a 1/n chance per tick; 0 never walks.
    pub walk_chance: u32,
    pub walk_min_ms: u64,
    /// Exclusive upper bound of the walk duration.
    pub walk_max_ms: u64,
    pub walk_force: f32,
    pub eat_ms: u64,
    /// Time the legs stay raised before the jump impulse.
    pub jump_delay_ms: u64,
    pub jump_impulse: f32,
    /// A jump ends once `|vy|` falls below this.
    pub jump_settle: f32,
}

impl Default for BehaviorSettings {
    fn default() -> Self {
        Self {
            jump_chance: 500,
            walk_chance: 500,
            walk_min_ms: 1_000,
            walk_max_ms: 4_000,
            walk_force: 2.0,
            eat_ms: 2_000,
            jump_delay_ms: 1_000,
            jump_impulse: 10.0,
            jump_settle: 1.0,
        }
    }
}

/// Everything a behavior callback may touch.
pub struct PetContext<'a> {
    pub physics: &'a mut PetPhysics,
    pub player: &'a mut AnimationPlayer,
    pub rng: &'a mut fastrand::Rng,
    pub settings: &'a BehaviorSettings,
    pub now_ms: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PetState {
    Idle,
    Walking {
        time_ms: u64,
    },
    Eating {
        time_ms: u64,
    },
    Jumping {
        pose_timer: DeferredTimer,
        jumped: bool,
    },
}

impl PetState {
    /// Build a fresh activation of `key`. Walking draws its duration here.
    pub fn build(key: PetStateKey, rng: &mut fastrand::Rng, settings: &BehaviorSettings) -> Self {
        match key {
            PetStateKey::Idle => PetState::Idle,
            PetStateKey::Walking => {
                let max = settings.walk_max_ms.max(settings.walk_min_ms + 1);
                PetState::Walking {
                    time_ms: rng.u64(settings.walk_min_ms..max),
                }
            }
            PetStateKey::Eating => PetState::Eating {
                time_ms: settings.eat_ms,
            },
            PetStateKey::Jumping => PetState::Jumping {
                pose_timer: DeferredTimer::new(),
                jumped: false,
            },
        }
    }

    /// Whether a jump impulse has been applied in this activation.
    pub fn has_jumped(&self) -> bool {
        matches!(self, PetState::Jumping { jumped: true, .. })
    }
}

fn roll(rng: &mut fastrand::Rng, chance: u32) -> bool {
    chance > 0 && rng.u32(0..chance) == 0
}

impl StateDescriptor for PetState {
    type Key = PetStateKey;

    fn key(&self) -> PetStateKey {
        match self {
            PetState::Idle => PetStateKey::Idle,
            PetState::Walking { .. } => PetStateKey::Walking,
            PetState::Eating { .. } => PetStateKey::Eating,
            PetState::Jumping { .. } => PetStateKey::Jumping,
        }
    }

    fn leave_condition(&self) -> LeaveCondition {
        match self {
            PetState::Idle | PetState::Jumping { .. } => LeaveCondition::Manual,
            PetState::Walking { .. } | PetState::Eating { .. } => LeaveCondition::Timeout,
        }
    }

    fn time_ms(&self) -> Option<u64> {
        match self {
            PetState::Walking { time_ms } | PetState::Eating { time_ms } => Some(*time_ms),
            PetState::Idle | PetState::Jumping { .. } => None,
        }
    }

    fn permitted_next(&self) -> &[PetStateKey] {
        self.key().permitted_next()
    }

    fn has_exit(&self) -> bool {
        !matches!(self, PetState::Idle)
    }
}

impl StateBehavior<PetContext<'_>> for PetState {
    fn on_enter(&mut self, ctx: &mut PetContext<'_>) {
        match self {
            PetState::Idle => ctx.player.play(AnimationConfig::idle()),
            PetState::Walking { .. } => {
                let dir = if ctx.rng.bool() { -1.0 } else { 1.0 };
                ctx.player.play(AnimationConfig::walking());
                ctx.physics
                    .apply_force(Vec2::new(ctx.settings.walk_force * dir, 0.0));
            }
            PetState::Eating { .. } => ctx.player.play(AnimationConfig::eating()),
            PetState::Jumping { pose_timer, jumped } => {
                ctx.player.apply_pose(Pose {
                    body: 1,
                    leg1: 1,
                    leg2: 1,
                });
                *jumped = false;
                pose_timer.schedule(ctx.now_ms, ctx.settings.jump_delay_ms);
            }
        }
    }

    fn on_update(&mut self, ctx: &mut PetContext<'_>) -> Option<PetStateKey> {
        match self {
            PetState::Idle => {
                if roll(ctx.rng, ctx.settings.jump_chance) {
                    Some(PetStateKey::Jumping)
                } else if roll(ctx.rng, ctx.settings.walk_chance) {
                    Some(PetStateKey::Walking)
                } else {
                    None
                }
            }
            PetState::Jumping { pose_timer, jumped } => {
                if pose_timer.poll(ctx.now_ms).is_some() {
                    ctx.player.apply_pose(Pose::default());
                    ctx.physics
                        .apply_force(Vec2::new(0.0, -ctx.settings.jump_impulse));
                    *jumped = true;
                }
                (*jumped && ctx.physics.velocity().y.abs() < ctx.settings.jump_settle)
                    .then_some(PetStateKey::Idle)
            }
            PetState::Walking { .. } | PetState::Eating { .. } => None,
        }
    }

    fn on_exit(&mut self, ctx: &mut PetContext<'_>) -> Option<PetStateKey> {
        match self {
            PetState::Idle => None,
            PetState::Walking { .. } => {
                ctx.physics.stop();
                Some(PetStateKey::Idle)
            }
            PetState::Eating { .. } => Some(PetStateKey::Idle),
            PetState::Jumping { pose_timer, .. } => {
                ctx.physics.stop();
                pose_timer.cancel();
                None
            }
        }
    }
}
