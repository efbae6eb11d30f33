//! Animation completion event.
//!
//! Triggered by [`pet_behavior_system`](crate::systems::pet::pet_behavior_system)
//! when a pet's one-shot animation reached its last frame during the tick.
//!
//! # Example
//!
//! ```ignore
//! world.add_observer(|trigger: On<AnimationEndedEvent>| {
//!     log::info!("{:?} finished its animation", trigger.event().entity);
//! });
//! ```

use bevy_ecs::prelude::*;

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationEndedEvent {
    /// The pet whose animation ended.
    pub entity: Entity,
}
