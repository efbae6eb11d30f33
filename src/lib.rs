//! Petsprite library.
//!
//! This module exposes the virtual-pet core's ECS components, resources,
//! systems, and events for use in integration tests and as a reusable
//! library.

pub mod components;
pub mod error;
pub mod events;
pub mod resources;
pub mod systems;

#[cfg(test)]
mod fixtures;
