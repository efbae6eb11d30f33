//! Pet lifecycle systems.
//!
//! - [`spawn_pets`] – build pets from the loaded [`AssetStore`] and spawn them
//!   with a [`MapPosition`] and a [`Scale`]
//! - [`pet_physics_system`] – integrate every pet's velocity into its position
//! - [`pet_behavior_system`] – update behaviors and animations, trigger
//!   [`PetStateChangedEvent`] / [`AnimationEndedEvent`]
//! - [`set_pet_state`] – request a behavior from outside the machine
//! - [`despawn_pet`] – detach a pet from its animation player, then despawn
//!
//! Run the two tick systems chained, physics first:
//!
//! ```ignore
//! schedule.add_systems((pet_physics_system, pet_behavior_system).chain());
//! ```
//!
//! All pets share the [`WorldTime`] clock; their timers run on
//! [`WorldTime::elapsed_ms`].

use bevy_ecs::prelude::*;
use log::{debug, info};

use crate::components::mapposition::MapPosition;
use crate::components::pet::Pet;
use crate::components::petstate::PetStateKey;
use crate::components::scale::Scale;
use crate::error::PetError;
use crate::events::animation::AnimationEndedEvent;
use crate::events::petstate::PetStateChangedEvent;
use crate::resources::assetstore::AssetStore;
use crate::resources::petconfig::PetConfig;
use crate::resources::worldtime::WorldTime;

/// Spawn `count` pets spread along the ground line.
///
/// Each pet gets its own seed derived from `seed`, so a run is reproducible.
/// Fails without spawning anything when a single pet cannot be built.
pub fn spawn_pets(world: &mut World, count: usize, seed: u64) -> Result<Vec<Entity>, PetError> {
    let now_ms = world.resource::<WorldTime>().elapsed_ms();
    let config = world.resource::<PetConfig>();
    let store = world.resource::<AssetStore>();

    let mut seeds = fastrand::Rng::with_seed(seed);
    let lane = config.physics.arena_width / (count.max(1) as f32 + 1.0);
    let scale = Scale::new(config.scale);
    let mut pets = Vec::with_capacity(count);
    for i in 0..count {
        let x = lane * i as f32 + lane / 2.0;
        let pet = Pet::new(store, config, seeds.u64(..), now_ms)?;
        let rest_y = (config.physics.ground - pet.size(&scale).y).max(0.0);
        pets.push((pet, MapPosition::new(x, rest_y), scale));
    }

    let entities: Vec<Entity> = pets
        .into_iter()
        .map(|bundle| world.spawn(bundle).id())
        .collect();
    info!("Spawned {} pets", entities.len());
    Ok(entities)
}

/// Move every pet by its velocity, bouncing off the arena edges.
pub fn pet_physics_system(mut pets: Query<(&mut Pet, &mut MapPosition, &Scale)>) {
    for (mut pet, mut position, scale) in pets.iter_mut() {
        pet.step_physics(&mut position, scale);
    }
}

/// Advance every pet's behavior and animation by one frame.
///
/// Triggers a [`PetStateChangedEvent`] for each behavior transition and an
/// [`AnimationEndedEvent`] for each finished one-shot animation.
pub fn pet_behavior_system(
    world_time: Res<WorldTime>,
    mut pets: Query<(Entity, &mut Pet)>,
    mut commands: Commands,
) {
    let now_ms = world_time.elapsed_ms();
    for (entity, mut pet) in pets.iter_mut() {
        let report = pet.step_behavior(now_ms);
        if let Some((from, to)) = report.transition {
            commands.trigger(PetStateChangedEvent { entity, from, to });
        }
        if report.animation_ended {
            commands.trigger(AnimationEndedEvent { entity });
        }
    }
}

/// Ask `entity` to enter `key` at the current world time.
///
/// Returns `false` when the entity is not a pet or the transition is refused.
pub fn set_pet_state(world: &mut World, entity: Entity, key: PetStateKey) -> bool {
    let now_ms = world.resource::<WorldTime>().elapsed_ms();
    let Some(mut pet) = world.get_mut::<Pet>(entity) else {
        return false;
    };
    let from = pet.state();
    if !pet.set_state(key, now_ms) {
        return false;
    }
    world.trigger(PetStateChangedEvent {
        entity,
        from,
        to: key,
    });
    true
}

/// Destroy and despawn a pet. Returns whether the entity existed.
pub fn despawn_pet(world: &mut World, entity: Entity) -> bool {
    if let Some(mut pet) = world.get_mut::<Pet>(entity) {
        pet.destroy();
    }
    let despawned = world.despawn(entity);
    if despawned {
        debug!("Despawned pet {:?}", entity);
    }
    despawned
}
