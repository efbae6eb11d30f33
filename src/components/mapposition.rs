use bevy_ecs::prelude::Component;

use crate::components::path::Vec2;

/// Top-left corner of a pet in arena coordinates, before the ground offset
/// is applied at render time.
#[derive(Component, Clone, Copy, Debug, PartialEq, Default)]
pub struct MapPosition {
    pub pos: Vec2,
}

impl MapPosition {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
        }
    }
}
