//! Frame rendering.
//!
//! We draw through the write-only [`Canvas`] boundary and query the ECS
//! World. Pets are drawn back to front by scale, so bigger (closer) pets
//! cover smaller ones. A pet that fails to render is logged and skipped;
//! its siblings still draw.

use bevy_ecs::prelude::*;
use log::warn;

use crate::components::composite::Rect;
use crate::components::mapposition::MapPosition;
use crate::components::pet::Pet;
use crate::components::petphysics::PhysicsSettings;
use crate::components::scale::Scale;
use crate::resources::canvas::{Canvas, Color};

const SKY: Color = Color::from_hex(0xc2f5ff);
const GROUND: Color = Color::from_hex(0xc8f9ed);

/// Fill the arena: sky above the ground line, ground below it.
pub fn render_background(canvas: &mut dyn Canvas, arena: &PhysicsSettings) {
    canvas.fill_rect(
        Rect::new(0.0, 0.0, arena.arena_width, arena.ground),
        SKY,
    );
    canvas.fill_rect(
        Rect::new(
            0.0,
            arena.ground,
            arena.arena_width,
            (arena.arena_height - arena.ground).max(0.0),
        ),
        GROUND,
    );
}

/// Render every pet in the world. Returns how many rendered successfully.
pub fn render_pets(world: &mut World, canvas: &mut dyn Canvas) -> usize {
    let mut query = world.query::<(Entity, &Pet, &MapPosition, &Scale)>();
    let mut to_draw: Vec<(Entity, &Pet, &MapPosition, &Scale)> = query.iter(world).collect();
    to_draw.sort_by(|a, b| a.3.scale.total_cmp(&b.3.scale));

    let mut drawn = 0;
    for (entity, pet, position, scale) in to_draw {
        match pet.render(position, scale, canvas) {
            Ok(()) => drawn += 1,
            Err(err) => warn!("Skipping pet {:?}: {}", entity, err),
        }
    }
    drawn
}
