//! Frame-animation player for one pet.
//!
//! The player owns the live frame selection (current body frame and the frame
//! shown in every [`PartSlot`]), a shared frame counter, the involuntary blink
//! automaton and the active [`AnimationConfig`]. The frame sequences
//! themselves are shared, read-only `Arc`s from the
//! [`AssetStore`](crate::resources::assetstore::AssetStore).
//!
//! # Tick
//!
//! 1. The frame counter always advances (wrapping on overflow). `play` never
//!    resets it, so a new cadence resumes wherever the counter sits.
//! 2. Without an active animation nothing else happens.
//! 3. The body advances every `body` ticks (0 keeps it frozen) and wraps.
//! 4. Animated parts advance every `speed` ticks. A looping animation wraps to
//!    frame 0; a one-shot animation holds the last frame, notifies listeners
//!    once and clears itself.
//! 5. The blink automaton counts down a blink, then a cooldown, then rolls a
//!    `1/probability` chance to blink again.
//! 6. Any selection change rebuilds the composite from scratch.
//!
//! # Related
//!
//! - [`crate::components::composite::build_composite`] – the rebuild
//! - [`crate::components::pet::Pet`] – owner of one player

use std::sync::{Arc, Weak};

use arrayvec::ArrayVec;
use log::debug;

use crate::components::composite::{Composite, Rect, build_composite};
use crate::components::frame::{BodyFrame, PartFrame};
use crate::components::partslot::{PartSlot, PartSlots};
use crate::error::PetError;

/// Ticks an eye stays closed (counting down to 1).
pub const BLINK_DURATION: i32 = 10;
/// Ticks before another blink may occur.
pub const BLINK_COOLDOWN: i32 = 300;
/// 1/BLINK_PROBABILITY chance to blink per eligible tick.
pub const BLINK_PROBABILITY: u32 = 100;

/// Variant name reserved for the closed-eye frame.
pub const CLOSED_EYE_VARIANT: &str = "CLOSED";

/// Timing of the blink automaton, in ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlinkSettings {
    /// Ticks the eyes stay closed. The countdown reopens them on reaching 1,
    /// so anything below 2 would never reopen.
    pub duration: i32,
    /// Ticks after a blink before the next roll. Below 2 the eyes would be
    /// closed again in the same tick that reopens them.
    pub cooldown: i32,
    /// 0 disables blinking.
    pub probability: u32,
}

impl BlinkSettings {
    /// Reject timings under which a blink could not complete its cycle.
    pub fn validate(&self) -> Result<(), PetError> {
        if self.duration < 2 {
            return Err(PetError::Config(format!(
                "blink duration must be at least 2 ticks, got {}",
                self.duration
            )));
        }
        if self.cooldown < 2 {
            return Err(PetError::Config(format!(
                "blink cooldown must be at least 2 ticks, got {}",
                self.cooldown
            )));
        }
        Ok(())
    }
}

impl Default for BlinkSettings {
    fn default() -> Self {
        Self {
            duration: BLINK_DURATION,
            cooldown: BLINK_COOLDOWN,
            probability: BLINK_PROBABILITY,
        }
    }
}

/// Declarative visual cadence of one behavior.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimationConfig {
    /// Slots animated by this config.
    pub parts: ArrayVec<PartSlot, 7>,
    /// Ticks per part frame advance.
    pub speed: u32,
    pub looped: bool,
    /// Ticks per body frame advance; 0 freezes the body.
    pub body: u32,
}

impl AnimationConfig {
    pub fn new(parts: &[PartSlot], speed: u32, looped: bool, body: u32) -> Self {
        Self {
            parts: parts.iter().copied().collect(),
            speed,
            looped,
            body,
        }
    }

    pub fn idle() -> Self {
        Self::new(&[], 1, true, 100)
    }

    pub fn walking() -> Self {
        Self::new(&PartSlot::OUTER, 10, true, 20)
    }

    pub fn eating() -> Self {
        Self::new(&[PartSlot::Mouth], 20, true, 0)
    }
}

/// Receives completion notices of one-shot animations.
pub trait AnimationListener: Send + Sync {
    fn on_animation_end(&self, config: &AnimationConfig);
}

/// Frame currently shown in a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// Index into the slot's own sequence.
    Frame(usize),
    /// The shared closed-eye frame.
    Closed,
}

/// Held pose: body frame and leg frames set directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pose {
    pub body: usize,
    pub leg1: usize,
    pub leg2: usize,
}

/// Variants chosen for one pet.
#[derive(Debug, Clone)]
pub struct PetLook {
    pub bodies: Arc<[BodyFrame]>,
    pub parts: PartSlots<Arc<[PartFrame]>>,
    pub closed_eye: Arc<PartFrame>,
}

/// Drives the frame selection of one pet.
///
/// Each tick advances the parts named by the active [`AnimationConfig`] every
/// `speed` ticks and the body every `body` ticks, runs the blink automaton and
/// rebuilds the [`Composite`] only when a selection changed. One-shot
/// animations notify the subscribed [`AnimationListener`]s once on their last
/// frame.
pub struct AnimationPlayer {
    bodies: Arc<[BodyFrame]>,
    body_index: usize,
    sequences: PartSlots<Arc<[PartFrame]>>,
    selection: PartSlots<Selection>,
    closed_eye: Arc<PartFrame>,
    frame_counter: u32,
    /// Positive: blinking countdown. Negative: cooldown. Zero: may blink.
    blink: i32,
    blink_settings: BlinkSettings,
    active: Option<AnimationConfig>,
    listeners: Vec<Weak<dyn AnimationListener>>,
    composite: Composite,
    rebuilds: u64,
    rng: fastrand::Rng,
}

impl AnimationPlayer {
    /// Create a player showing frame 0 of every sequence.
    ///
    /// Fails with [`PetError::AssetNotFound`] when the body or any slot has an
    /// empty sequence, so nothing downstream indexes an empty frame list, and
    /// with [`PetError::Config`] when the blink timings cannot complete a cycle.
    pub fn new(
        look: PetLook,
        blink_settings: BlinkSettings,
        rng: fastrand::Rng,
    ) -> Result<Self, PetError> {
        blink_settings.validate()?;
        if look.bodies.is_empty() {
            return Err(PetError::AssetNotFound("empty body sequence".into()));
        }
        if let Some((slot, _)) = look.parts.iter().find(|(_, seq)| seq.is_empty()) {
            return Err(PetError::AssetNotFound(format!(
                "empty frame sequence for slot {:?}",
                slot
            )));
        }
        let mut player = Self {
            bodies: look.bodies,
            body_index: 0,
            sequences: look.parts,
            selection: PartSlots::from_fn(|_| Selection::Frame(0)),
            closed_eye: look.closed_eye,
            frame_counter: 0,
            blink: 0,
            blink_settings,
            active: None,
            listeners: Vec::new(),
            composite: Composite::default(),
            rebuilds: 0,
            rng,
        };
        player.rebuild();
        Ok(player)
    }

    /// Replace the active animation. Counters and frame positions are kept.
    pub fn play(&mut self, config: AnimationConfig) {
        debug!(
            "play {:?} speed={} body={} loop={}",
            config.parts.as_slice(),
            config.speed,
            config.body,
            config.looped
        );
        self.active = Some(config);
    }

    /// Jump straight to a held pose and rebuild.
    pub fn apply_pose(&mut self, pose: Pose) {
        self.body_index = pose.body.min(self.bodies.len() - 1);
        for (slot, index) in [(PartSlot::Leg1, pose.leg1), (PartSlot::Leg2, pose.leg2)] {
            let last = self.sequences[slot].len() - 1;
            self.selection[slot] = Selection::Frame(index.min(last));
        }
        self.rebuild();
    }

    /// Add a weak reference to `listener`. Subscribing twice is a no-op.
    pub fn subscribe<L: AnimationListener + 'static>(&mut self, listener: &Arc<L>) {
        if self.is_subscribed(listener) {
            return;
        }
        let weak: Weak<dyn AnimationListener> = Arc::downgrade(listener) as Weak<dyn AnimationListener>;
        self.listeners.push(weak);
    }

    /// Remove `listener` if present.
    pub fn unsubscribe<L: AnimationListener + 'static>(&mut self, listener: &Arc<L>) {
        let target = Arc::as_ptr(listener);
        self.listeners
            .retain(|w| !std::ptr::addr_eq(w.as_ptr(), target));
    }

    pub fn is_subscribed<L: AnimationListener + 'static>(&self, listener: &Arc<L>) -> bool {
        let target = Arc::as_ptr(listener);
        self.listeners
            .iter()
            .any(|w| std::ptr::addr_eq(w.as_ptr(), target))
    }

    /// Listeners that are still alive.
    pub fn listener_count(&self) -> usize {
        self.listeners.iter().filter(|w| w.strong_count() > 0).count()
    }

    fn notify_animation_end(&mut self, config: &AnimationConfig) {
        self.listeners.retain(|w| w.strong_count() > 0);
        for listener in self.listeners.iter().filter_map(Weak::upgrade) {
            listener.on_animation_end(config);
        }
    }

    /// Advance one tick. Returns `true` when the composite was rebuilt.
    pub fn tick(&mut self) -> bool {
        self.frame_counter = self.frame_counter.wrapping_add(1);

        let Some(anim) = self.active.clone() else {
            return false;
        };
        let mut need_rebuild = false;

        if anim.body > 0 && self.frame_counter % anim.body == 0 {
            self.body_index = (self.body_index + 1) % self.bodies.len();
            need_rebuild = true;
        }

        if !anim.parts.is_empty() && anim.speed > 0 && self.frame_counter % anim.speed == 0 {
            let mut ended = false;
            for &slot in &anim.parts {
                let len = self.sequences[slot].len();
                let mut next = self.current_frame(slot).frame + 1;
                if next >= len {
                    if anim.looped {
                        next = 0;
                    } else {
                        next = len - 1;
                        ended = true;
                    }
                }
                let next = Selection::Frame(next);
                if self.selection[slot] != next {
                    self.selection[slot] = next;
                    need_rebuild = true;
                }
            }
            if ended {
                self.notify_animation_end(&anim);
                self.active = None;
            }
        }

        need_rebuild |= self.step_blink();

        if need_rebuild {
            self.rebuild();
        }
        need_rebuild
    }

    /// Run the blink automaton; returns whether it asks for a rebuild.
    fn step_blink(&mut self) -> bool {
        let mut need_rebuild = false;
        if self.blink > 0 {
            self.blink -= 1;
            if self.blink == 1 {
                need_rebuild = true;
                self.blink = -self.blink_settings.cooldown;
            }
        }
        if self.blink < 0 {
            self.blink += 1;
        }
        if self.blink == 0
            && self.blink_settings.probability > 0
            && self.rng.u32(0..self.blink_settings.probability) == 0
        {
            self.blink = self.blink_settings.duration;
            need_rebuild = true;
        }
        if need_rebuild {
            if self.blink > 0 {
                for slot in PartSlot::EYES {
                    self.selection[slot] = Selection::Closed;
                }
            } else if self.blink < 0 {
                for slot in PartSlot::EYES {
                    self.selection[slot] = Selection::Frame(0);
                }
            }
        }
        need_rebuild
    }

    fn rebuild(&mut self) {
        let parts = PartSlots::from_fn(|slot| Some(self.current_frame(slot)));
        self.composite = build_composite(&self.bodies[self.body_index], &parts);
        self.rebuilds += 1;
    }

    pub fn current_frame(&self, slot: PartSlot) -> &PartFrame {
        match self.selection[slot] {
            Selection::Frame(i) => &self.sequences[slot][i],
            Selection::Closed => &self.closed_eye,
        }
    }

    /// Body frame currently shown.
    pub fn current_body(&self) -> &BodyFrame {
        &self.bodies[self.body_index]
    }

    pub fn selection(&self, slot: PartSlot) -> Selection {
        self.selection[slot]
    }

    /// Number of frames in the sequence chosen for `slot`.
    pub fn sequence_len(&self, slot: PartSlot) -> usize {
        self.sequences[slot].len()
    }

    pub fn body_index(&self) -> usize {
        self.body_index
    }

    /// Number of frames in the body sequence.
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Ticks seen since creation; cadences are multiples of it.
    pub fn frame_counter(&self) -> u32 {
        self.frame_counter
    }

    /// Raw blink counter: positive while closed, negative while cooling down.
    pub fn blink_counter(&self) -> i32 {
        self.blink
    }

    pub fn is_blinking(&self) -> bool {
        self.blink > 0
    }

    /// The running animation, `None` once a one-shot has finished.
    pub fn active(&self) -> Option<&AnimationConfig> {
        self.active.as_ref()
    }

    /// Shapes built from the current selection.
    pub fn composite(&self) -> &Composite {
        &self.composite
    }

    /// Unscaled bounding box of the composite.
    pub fn bounds(&self) -> Rect {
        self.composite.bounds
    }

    /// How many times the composite was rebuilt, including at creation.
    pub fn rebuild_count(&self) -> u64 {
        self.rebuilds
    }
}

impl std::fmt::Debug for AnimationPlayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnimationPlayer")
            .field("body", &self.current_body().name)
            .field("body_index", &self.body_index)
            .field("selection", &self.selection)
            .field("frame_counter", &self.frame_counter)
            .field("blink", &self.blink)
            .field("active", &self.active)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::frame::PartType;
    use crate::fixtures;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Default)]
    struct Counter(AtomicU32);

    impl AnimationListener for Counter {
        fn on_animation_end(&self, _config: &AnimationConfig) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn no_blink() -> BlinkSettings {
        BlinkSettings {
            probability: 0,
            ..BlinkSettings::default()
        }
    }

    fn look() -> PetLook {
        fixtures::store()
            .pick_look(&mut fastrand::Rng::with_seed(7))
            .unwrap()
    }

    fn player(blink: BlinkSettings) -> AnimationPlayer {
        AnimationPlayer::new(look(), blink, fastrand::Rng::with_seed(1)).unwrap()
    }

    #[test]
    fn test_new_player_starts_on_frame_zero() {
        let p = player(no_blink());
        assert_eq!(p.body_index(), 0);
        assert!(PartSlot::ALL.iter().all(|s| p.selection(*s) == Selection::Frame(0)));
        assert_eq!(p.rebuild_count(), 1);
        assert!(p.composite().placed[PartSlot::Mouth]);
        assert!(p.active().is_none());
    }

    #[test]
    fn test_empty_sequence_is_asset_not_found() {
        let mut l = look();
        l.parts[PartSlot::Arm2] = Arc::from(Vec::new());
        let err = AnimationPlayer::new(l, no_blink(), fastrand::Rng::with_seed(1)).unwrap_err();
        assert!(matches!(err, PetError::AssetNotFound(_)));
    }

    #[test]
    fn test_blink_settings_that_never_reopen_are_rejected() {
        for bad in [
            BlinkSettings { duration: 1, ..BlinkSettings::default() },
            BlinkSettings { duration: 0, ..BlinkSettings::default() },
            BlinkSettings { cooldown: 1, ..BlinkSettings::default() },
            BlinkSettings { cooldown: -5, ..BlinkSettings::default() },
        ] {
            let err = AnimationPlayer::new(look(), bad, fastrand::Rng::with_seed(1)).unwrap_err();
            assert!(matches!(err, PetError::Config(_)));
        }
    }

    #[test]
    fn test_shortest_blink_reopens_eyes() {
        let mut p = player(BlinkSettings {
            duration: 2,
            cooldown: 2,
            probability: 1,
        });
        p.play(AnimationConfig::idle());
        let mut closed_run = 0;
        let mut longest_closed = 0;
        let mut reopened = false;
        for _ in 0..200 {
            p.tick();
            if p.selection(PartSlot::Eye1) == Selection::Closed {
                closed_run += 1;
                longest_closed = longest_closed.max(closed_run);
            } else {
                if closed_run > 0 {
                    reopened = true;
                }
                closed_run = 0;
            }
        }
        assert!(reopened);
        assert_eq!(longest_closed, 1);
    }

    #[test]
    fn test_tick_without_animation_is_noop() {
        let mut p = player(BlinkSettings {
            probability: 1,
            ..BlinkSettings::default()
        });
        assert!(!p.tick());
        assert_eq!(p.frame_counter(), 1);
        assert_eq!(p.rebuild_count(), 1);
        assert_eq!(p.blink_counter(), 0);
    }

    #[test]
    fn test_body_advances_on_cadence_and_wraps() {
        let mut p = player(no_blink());
        p.play(AnimationConfig::new(&[], 1, true, 2));
        let bodies = p.body_count();
        let mut seen = Vec::new();
        for _ in 0..(2 * bodies) {
            p.tick();
            seen.push(p.body_index());
        }
        assert_eq!(seen, vec![0, 1, 1, 2, 2, 0]);
    }

    #[test]
    fn test_zero_body_cadence_freezes_body() {
        let mut p = player(no_blink());
        p.play(AnimationConfig::eating());
        for _ in 0..200 {
            p.tick();
        }
        assert_eq!(p.body_index(), 0);
    }

    #[test]
    fn test_looping_part_returns_to_frame_zero() {
        let mut p = player(no_blink());
        p.play(AnimationConfig::new(&[PartSlot::Mouth], 1, true, 0));
        let len = p.sequence_len(PartSlot::Mouth);
        for _ in 0..len {
            p.tick();
        }
        assert_eq!(p.selection(PartSlot::Mouth), Selection::Frame(0));
        p.tick();
        assert_eq!(p.selection(PartSlot::Mouth), Selection::Frame(1));
    }

    #[test]
    fn test_one_shot_clamps_and_notifies_once() {
        let mut p = player(no_blink());
        let counter = Arc::new(Counter::default());
        p.subscribe(&counter);
        p.play(AnimationConfig::new(&[PartSlot::Mouth], 1, false, 0));
        let len = p.sequence_len(PartSlot::Mouth);
        for _ in 0..(len * 4) {
            p.tick();
        }
        assert_eq!(p.selection(PartSlot::Mouth), Selection::Frame(len - 1));
        assert_eq!(counter.0.load(Ordering::SeqCst), 1);
        assert!(p.active().is_none());
    }

    #[test]
    fn test_one_shot_over_several_parts_notifies_once() {
        let mut p = player(no_blink());
        let counter = Arc::new(Counter::default());
        p.subscribe(&counter);
        p.play(AnimationConfig::new(&PartSlot::OUTER, 1, false, 0));
        for _ in 0..10 {
            p.tick();
        }
        assert_eq!(counter.0.load(Ordering::SeqCst), 1);
        p.play(AnimationConfig::new(&PartSlot::OUTER, 1, false, 0));
        p.tick();
        assert_eq!(counter.0.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_play_keeps_frame_counter_and_positions() {
        let mut p = player(no_blink());
        p.play(AnimationConfig::new(&[PartSlot::Mouth], 1, true, 0));
        p.tick();
        assert_eq!(p.selection(PartSlot::Mouth), Selection::Frame(1));
        p.play(AnimationConfig::walking());
        assert_eq!(p.frame_counter(), 1);
        assert_eq!(p.selection(PartSlot::Mouth), Selection::Frame(1));
    }

    #[test]
    fn test_unsubscribed_listener_is_not_notified() {
        let mut p = player(no_blink());
        let counter = Arc::new(Counter::default());
        p.subscribe(&counter);
        p.subscribe(&counter);
        assert_eq!(p.listener_count(), 1);
        p.unsubscribe(&counter);
        assert!(!p.is_subscribed(&counter));
        p.play(AnimationConfig::new(&[PartSlot::Mouth], 1, false, 0));
        for _ in 0..5 {
            p.tick();
        }
        assert_eq!(counter.0.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_dropped_listener_is_pruned() {
        let mut p = player(no_blink());
        let counter = Arc::new(Counter::default());
        p.subscribe(&counter);
        drop(counter);
        assert_eq!(p.listener_count(), 0);
        p.play(AnimationConfig::new(&[PartSlot::Mouth], 1, false, 0));
        for _ in 0..5 {
            p.tick();
        }
    }

    #[test]
    fn test_blink_cycle_closes_then_restores_eyes() {
        let mut p = player(BlinkSettings {
            duration: 10,
            cooldown: 300,
            probability: 1,
        });
        p.play(AnimationConfig::new(&[], 1, true, 0));

        assert!(p.tick());
        assert_eq!(p.blink_counter(), 10);
        assert_eq!(p.selection(PartSlot::Eye1), Selection::Closed);
        assert_eq!(p.current_frame(PartSlot::Eye2).name, CLOSED_EYE_VARIANT);

        for _ in 0..8 {
            assert!(!p.tick());
            assert!(p.is_blinking());
        }
        // Countdown reaches 1: enter cooldown and reopen.
        assert!(p.tick());
        assert_eq!(p.blink_counter(), -299);
        assert_eq!(p.selection(PartSlot::Eye1), Selection::Frame(0));
        assert_eq!(p.selection(PartSlot::Eye2), Selection::Frame(0));
        assert_eq!(p.current_frame(PartSlot::Eye1).part_type, PartType::Eye);

        for _ in 0..298 {
            p.tick();
            assert!(p.blink_counter() < 0);
        }
        // Cooldown hits zero and the next trial succeeds at once.
        p.tick();
        assert_eq!(p.blink_counter(), 10);
    }

    #[test]
    fn test_blink_counter_sign_is_exclusive() {
        let mut p = player(BlinkSettings::default());
        p.play(AnimationConfig::idle());
        for _ in 0..5_000 {
            p.tick();
            let b = p.blink_counter();
            assert!(b <= BLINK_DURATION && b > -BLINK_COOLDOWN);
            if b > 0 {
                assert_eq!(p.selection(PartSlot::Eye1), Selection::Closed);
            } else if b < 0 {
                assert_eq!(p.selection(PartSlot::Eye1), Selection::Frame(0));
            }
        }
    }

    #[test]
    fn test_apply_pose_sets_and_clamps_indices() {
        let mut p = player(no_blink());
        p.apply_pose(Pose {
            body: 1,
            leg1: 1,
            leg2: 99,
        });
        assert_eq!(p.body_index(), 1);
        assert_eq!(p.selection(PartSlot::Leg1), Selection::Frame(1));
        let last = p.sequence_len(PartSlot::Leg2) - 1;
        assert_eq!(p.selection(PartSlot::Leg2), Selection::Frame(last));
        assert_eq!(p.rebuild_count(), 2);
    }

    #[test]
    fn test_unchanged_selection_skips_rebuild() {
        let mut p = player(no_blink());
        p.play(AnimationConfig::new(&[], 1, true, 0));
        for _ in 0..50 {
            assert!(!p.tick());
        }
        assert_eq!(p.rebuild_count(), 1);
    }
}
