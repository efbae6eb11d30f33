//! Generic one-level state machine with time-gated leave conditions.
//!
//! A state is any value implementing [`StateDescriptor`] (static facts: key,
//! leave condition, duration, permitted successors) and [`StateBehavior`]
//! (callbacks receiving an explicit context). Callbacks never hold a back
//! reference to their owner; instead `on_update` and `on_exit` return the key
//! they would like to move to, and the owner decides what to build and enter.
//!
//! # Leave conditions
//!
//! - [`LeaveCondition::Manual`] – the state stays until someone enters another
//! - [`LeaveCondition::Timeout`] – `on_exit` fires by itself `time_ms` after
//!   entry; requires a duration and an exit callback
//! - [`LeaveCondition::Delay`] – the machine is locked for `time_ms` after
//!   entry; no transition of any kind is accepted meanwhile
//!
//! Both timers are [`DeferredTimer`]s polled from [`StateMachine::update`]:
//! entering a state always cancels a pending timeout, and a superseded timer
//! can never fire.
//!
//! # Exit rule
//!
//! A state's `on_exit` runs at most once per activation. It runs when its
//! timeout fires, or when another state is entered and it has not run yet.
//! In the latter case its requested key is discarded, since a transition is
//! already under way.

use std::fmt::Debug;

use log::{debug, warn};
use thiserror::Error;

use crate::components::timer::DeferredTimer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LeaveCondition {
    Manual,
    Timeout,
    Delay,
}

/// Static description of one state.
pub trait StateDescriptor {
    type Key: Copy + Eq + Debug;

    fn key(&self) -> Self::Key;
    fn leave_condition(&self) -> LeaveCondition;
    /// Duration for `Timeout` and `Delay` states.
    fn time_ms(&self) -> Option<u64>;
    fn permitted_next(&self) -> &[Self::Key];
    /// Whether this state defines an exit callback.
    fn has_exit(&self) -> bool;
}

/// Callbacks of one state, run against the caller's context `C`.
pub trait StateBehavior<C>: StateDescriptor {
    fn on_enter(&mut self, _ctx: &mut C) {}

    fn on_update(&mut self, _ctx: &mut C) -> Option<Self::Key> {
        None
    }

    fn on_exit(&mut self, _ctx: &mut C) -> Option<Self::Key> {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransitionError<K: Debug> {
    #[error("transition from {from:?} to {to:?} is not permitted")]
    NotPermitted { from: K, to: K },
    #[error("state machine is locked by a pending delay")]
    Locked,
    #[error("timeout state {0:?} has no exit callback")]
    MissingExit(K),
    #[error("state {0:?} has a timed leave condition but no duration")]
    MissingTime(K),
}

#[derive(Debug)]
pub struct StateMachine<S: StateDescriptor> {
    current: S,
    previous: Option<S::Key>,
    can_change: bool,
    exited: bool,
    timeout: DeferredTimer,
    delay: DeferredTimer,
}

impl<S: StateDescriptor> StateMachine<S> {
    /// Create a machine sitting in `initial`. Call [`start`](Self::start) to
    /// run its entry side effects.
    pub fn new(initial: S) -> Self {
        Self {
            current: initial,
            previous: None,
            can_change: true,
            exited: false,
            timeout: DeferredTimer::new(),
            delay: DeferredTimer::new(),
        }
    }

    pub fn current(&self) -> &S {
        &self.current
    }

    pub fn current_key(&self) -> S::Key {
        self.current.key()
    }

    pub fn previous_key(&self) -> Option<S::Key> {
        self.previous
    }

    /// `false` while a delay state holds the machine.
    pub fn can_change(&self) -> bool {
        self.can_change
    }

    /// Whether the current state's exit callback already ran.
    pub fn has_exited(&self) -> bool {
        self.exited
    }

    pub fn timeout_due_ms(&self) -> Option<u64> {
        self.timeout.due_ms()
    }

    pub fn delay_due_ms(&self) -> Option<u64> {
        self.delay.due_ms()
    }

    fn validate(&self, next: &S) -> Result<(), TransitionError<S::Key>> {
        let to = next.key();
        if !self.current.permitted_next().contains(&to) {
            return Err(TransitionError::NotPermitted {
                from: self.current.key(),
                to,
            });
        }
        if !self.can_change {
            return Err(TransitionError::Locked);
        }
        Self::validate_descriptor(next)
    }

    fn validate_descriptor(state: &S) -> Result<(), TransitionError<S::Key>> {
        match state.leave_condition() {
            LeaveCondition::Manual => Ok(()),
            LeaveCondition::Timeout if !state.has_exit() => {
                Err(TransitionError::MissingExit(state.key()))
            }
            LeaveCondition::Timeout | LeaveCondition::Delay if state.time_ms().is_none() => {
                Err(TransitionError::MissingTime(state.key()))
            }
            LeaveCondition::Timeout | LeaveCondition::Delay => Ok(()),
        }
    }

    fn arm(&mut self, now_ms: u64) {
        let time = self.current.time_ms().unwrap_or(0);
        match self.current.leave_condition() {
            LeaveCondition::Manual => {}
            LeaveCondition::Timeout => {
                self.timeout.schedule(now_ms, time);
            }
            LeaveCondition::Delay => {
                self.can_change = false;
                self.delay.schedule(now_ms, time);
            }
        }
    }

    /// Run the initial state's entry and arm its leave condition.
    pub fn start<C>(&mut self, ctx: &mut C, now_ms: u64) -> Result<(), TransitionError<S::Key>>
    where
        S: StateBehavior<C>,
    {
        Self::validate_descriptor(&self.current)?;
        self.exited = false;
        self.current.on_enter(ctx);
        self.arm(now_ms);
        Ok(())
    }

    /// Enter `next`, or explain why not. A rejection leaves the machine untouched.
    pub fn try_enter<C>(
        &mut self,
        mut next: S,
        ctx: &mut C,
        now_ms: u64,
    ) -> Result<(), TransitionError<S::Key>>
    where
        S: StateBehavior<C>,
    {
        self.validate(&next)?;

        if !self.exited {
            // A transition is already decided; the outgoing request is moot.
            let _ = self.current.on_exit(ctx);
        }
        self.timeout.cancel();

        let from = self.current.key();
        let to = next.key();
        next.on_enter(ctx);
        self.current = next;
        self.previous = Some(from);
        self.exited = false;
        self.arm(now_ms);
        debug!("state {:?} -> {:?}", from, to);
        Ok(())
    }

    /// Enter `next`; returns whether the transition happened.
    pub fn enter<C>(&mut self, next: S, ctx: &mut C, now_ms: u64) -> bool
    where
        S: StateBehavior<C>,
    {
        match self.try_enter(next, ctx, now_ms) {
            Ok(()) => true,
            Err(err @ (TransitionError::MissingExit(_) | TransitionError::MissingTime(_))) => {
                warn!("rejected state descriptor: {}", err);
                false
            }
            Err(err) => {
                debug!("transition refused: {}", err);
                false
            }
        }
    }

    /// Poll timers and run the current state's update.
    ///
    /// Returns the key the machine's owner should enter next, if any. When the
    /// timeout fires this is the exit callback's request and `on_update` is
    /// skipped for the tick.
    pub fn update<C>(&mut self, ctx: &mut C, now_ms: u64) -> Option<S::Key>
    where
        S: StateBehavior<C>,
    {
        if self.delay.poll(now_ms).is_some() {
            self.can_change = true;
        }
        if self.timeout.poll(now_ms).is_some() {
            self.exited = true;
            return self.current.on_exit(ctx);
        }
        if self.exited {
            return None;
        }
        self.current.on_update(ctx)
    }
}
