//! ECS resources made available to systems.
//!
//! Overview
//! - `assetstore` – loaded body and part frame sequences, variant lookups
//! - `canvas` – write-only drawing boundary and a recording implementation
//! - `petconfig` – simulation tunables loaded from an INI file
//! - `worldtime` – simulation time and delta
pub mod assetstore;
pub mod canvas;
pub mod petconfig;
pub mod worldtime;
