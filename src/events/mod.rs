//! Event types triggered by the pet systems.
//!
//! Submodules:
//! - [`animation`] – a pet's one-shot animation finished
//! - [`petstate`] – a pet's behavior state changed
pub mod animation;
pub mod petstate;
