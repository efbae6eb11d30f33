//! Simulation systems.
//!
//! Submodules overview
//! - [`pet`] – spawn, tick, drive and despawn pets
//! - [`render`] – draw the arena and every pet through a canvas
//! - [`time`] – update simulation time and delta

pub mod pet;
pub mod render;
pub mod time;
