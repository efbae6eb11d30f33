//! Behavior transition event.
//!
//! Triggered whenever a pet's behavior state machine moves from one state to
//! another, both for transitions requested by the behaviors themselves
//! ([`pet_behavior_system`](crate::systems::pet::pet_behavior_system)) and for
//! external requests ([`set_pet_state`](crate::systems::pet::set_pet_state)).

use bevy_ecs::prelude::*;

use crate::components::petstate::PetStateKey;

/// Event emitted after a pet entered a new behavior state.
///
/// # Fields
///
/// - `entity` – the pet that transitioned
/// - `from` – the state it left
/// - `to` – the state it is now in
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PetStateChangedEvent {
    pub entity: Entity,
    pub from: PetStateKey,
    pub to: PetStateKey,
}
