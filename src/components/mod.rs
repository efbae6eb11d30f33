//! ECS components and the per-pet building blocks they are made of.
//!
//! Submodules overview:
//! - [`path`] – 2D vectors, affine transforms and parsed vector paths
//! - [`frame`] – body and part frames as produced by the asset pipeline
//! - [`partslot`] – the seven attachment slots and a slot-indexed array
//! - [`composite`] – pinning parts onto body anchors and the bounding box
//! - [`animationplayer`] – frame selection, animation cadence and blinking
//! - [`mapposition`] – where a pet stands in the arena
//! - [`scale`] – uniform draw scale of a pet
//! - [`petphysics`] – velocity integrator with arena limits and gravity
//! - [`timer`] – cancellable single-shot timers keyed by generation
//! - [`statemachine`] – generic state machine with time-gated transitions
//! - [`petstate`] – Idle, Walking, Eating and Jumping behaviors
//! - [`pet`] – the pet entity tying everything together

pub mod animationplayer;
pub mod composite;
pub mod frame;
pub mod mapposition;
pub mod partslot;
pub mod path;
pub mod pet;
pub mod petphysics;
pub mod petstate;
pub mod scale;
pub mod statemachine;
pub mod timer;
