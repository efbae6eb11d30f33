//! Pet simulation configuration resource.
//!
//! Holds the tunables of the arena, physics, blink automaton and behaviors.
//! Defaults reproduce the stock pet; an INI file may override any subset.
//!
//! # Configuration File Format
//!
//! ```ini
//! [arena]
//! width = 200
//! height = 200
//! ground = 190
//!
//! [physics]
//! gravity = 2
//! deadzone = 1
//! bounce = -0.5
//! alpha = 1
//!
//! [blink]
//! duration = 10
//! cooldown = 300
//! probability = 100
//!
//! [behavior]
//! jump_chance = 500
//! walk_chance = 500
//! walk_min_ms = 1000
//! walk_max_ms = 4000
//! walk_force = 2
//! eat_ms = 2000
//! jump_delay_ms = 1000
//! jump_impulse = 10
//!
//! [pet]
//! scale = 1
//! ```

use bevy_ecs::prelude::*;
use configparser::ini::Ini;
use log::info;
use std::path::PathBuf;

use crate::components::animationplayer::BlinkSettings;
use crate::components::petphysics::PhysicsSettings;
use crate::components::petstate::BehaviorSettings;
use crate::error::PetError;

const DEFAULT_ALPHA: f32 = 1.0;
const DEFAULT_SCALE: f32 = 1.0;
const DEFAULT_CONFIG_PATH: &str = "./petsprite.ini";

#[derive(Resource, Debug, Clone, PartialEq)]
pub struct PetConfig {
    pub physics: PhysicsSettings,
    /// Integration step factor handed to every physics tick.
    pub alpha: f32,
    pub blink: BlinkSettings,
    pub behavior: BehaviorSettings,
    /// Scale `z` of spawned pets.
    pub scale: f32,
    /// Path to the configuration file.
    pub config_path: PathBuf,
}

impl Default for PetConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn get_f32(config: &Ini, section: &str, key: &str) -> Option<f32> {
    config
        .getfloat(section, key)
        .ok()
        .flatten()
        .map(|v| v as f32)
}

fn get_u64(config: &Ini, section: &str, key: &str) -> Option<u64> {
    config.getuint(section, key).ok().flatten()
}

/// Read an integer that must fit `T`. Out-of-range values are an error
/// rather than a silent truncation.
fn get_int<T: TryFrom<i64>>(config: &Ini, section: &str, key: &str) -> Result<Option<T>, PetError> {
    match config.getint(section, key).ok().flatten() {
        Some(v) => T::try_from(v).map(Some).map_err(|_| {
            PetError::Config(format!("[{}] {} = {} is out of range", section, key, v))
        }),
        None => Ok(None),
    }
}

impl PetConfig {
    pub fn new() -> Self {
        Self {
            physics: PhysicsSettings::default(),
            alpha: DEFAULT_ALPHA,
            blink: BlinkSettings::default(),
            behavior: BehaviorSettings::default(),
            scale: DEFAULT_SCALE,
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            ..Self::new()
        }
    }

    /// Load configuration from the INI file at `config_path`.
    ///
    /// Missing or malformed values keep their current value. Values that are
    /// out of range fail the whole load and leave `self` untouched.
    pub fn load_from_file(&mut self) -> Result<(), PetError> {
        let mut config = Ini::new();
        config
            .load(&self.config_path)
            .map_err(|e| PetError::Config(format!("failed to load config file: {}", e)))?;
        self.apply(&config)?;
        info!(
            "Loaded config from {:?}: arena {}x{} ground={}, blink 1/{}, scale={}",
            self.config_path,
            self.physics.arena_width,
            self.physics.arena_height,
            self.physics.ground,
            self.blink.probability,
            self.scale
        );
        Ok(())
    }

    /// Same as [`load_from_file`](Self::load_from_file) over in-memory INI text.
    pub fn load_from_str(&mut self, text: &str) -> Result<(), PetError> {
        let mut config = Ini::new();
        config
            .read(text.to_string())
            .map_err(|e| PetError::Config(format!("failed to parse config: {}", e)))?;
        self.apply(&config)
    }

    fn apply(&mut self, config: &Ini) -> Result<(), PetError> {
        let mut next = self.clone();
        next.read_values(config)?;
        next.blink.validate()?;
        *self = next;
        Ok(())
    }

    fn read_values(&mut self, config: &Ini) -> Result<(), PetError> {
        // [arena]
        if let Some(v) = get_f32(config, "arena", "width") {
            self.physics.arena_width = v;
        }
        if let Some(v) = get_f32(config, "arena", "height") {
            self.physics.arena_height = v;
        }
        if let Some(v) = get_f32(config, "arena", "ground") {
            self.physics.ground = v;
        }

        // [physics]
        if let Some(v) = get_f32(config, "physics", "gravity") {
            self.physics.gravity = v;
        }
        if let Some(v) = get_f32(config, "physics", "deadzone") {
            self.physics.deadzone = v;
        }
        if let Some(v) = get_f32(config, "physics", "bounce") {
            self.physics.ground_bounce = v;
        }
        if let Some(v) = get_f32(config, "physics", "alpha") {
            self.alpha = v;
        }

        // [blink]
        if let Some(v) = get_int::<i32>(config, "blink", "duration")? {
            self.blink.duration = v;
        }
        if let Some(v) = get_int::<i32>(config, "blink", "cooldown")? {
            self.blink.cooldown = v;
        }
        if let Some(v) = get_int::<u32>(config, "blink", "probability")? {
            self.blink.probability = v;
        }

        // [behavior]
        let b = &mut self.behavior;
        if let Some(v) = get_int::<u32>(config, "behavior", "jump_chance")? {
            b.jump_chance = v;
        }
        if let Some(v) = get_int::<u32>(config, "behavior", "walk_chance")? {
            b.walk_chance = v;
        }
        if let Some(v) = get_u64(config, "behavior", "walk_min_ms") {
            b.walk_min_ms = v;
        }
        if let Some(v) = get_u64(config, "behavior", "walk_max_ms") {
            b.walk_max_ms = v;
        }
        if let Some(v) = get_f32(config, "behavior", "walk_force") {
            b.walk_force = v;
        }
        if let Some(v) = get_u64(config, "behavior", "eat_ms") {
            b.eat_ms = v;
        }
        if let Some(v) = get_u64(config, "behavior", "jump_delay_ms") {
            b.jump_delay_ms = v;
        }
        if let Some(v) = get_f32(config, "behavior", "jump_impulse") {
            b.jump_impulse = v;
        }

        // [pet]
        if let Some(v) = get_f32(config, "pet", "scale") {
            self.scale = v;
        }
        Ok(())
    }

    fn to_ini(&self) -> Ini {
        let mut config = Ini::new();
        let p = &self.physics;
        config.set("arena", "width", Some(p.arena_width.to_string()));
        config.set("arena", "height", Some(p.arena_height.to_string()));
        config.set("arena", "ground", Some(p.ground.to_string()));

        config.set("physics", "gravity", Some(p.gravity.to_string()));
        config.set("physics", "deadzone", Some(p.deadzone.to_string()));
        config.set("physics", "bounce", Some(p.ground_bounce.to_string()));
        config.set("physics", "alpha", Some(self.alpha.to_string()));

        config.set("blink", "duration", Some(self.blink.duration.to_string()));
        config.set("blink", "cooldown", Some(self.blink.cooldown.to_string()));
        config.set("blink", "probability", Some(self.blink.probability.to_string()));

        let b = &self.behavior;
        config.set("behavior", "jump_chance", Some(b.jump_chance.to_string()));
        config.set("behavior", "walk_chance", Some(b.walk_chance.to_string()));
        config.set("behavior", "walk_min_ms", Some(b.walk_min_ms.to_string()));
        config.set("behavior", "walk_max_ms", Some(b.walk_max_ms.to_string()));
        config.set("behavior", "walk_force", Some(b.walk_force.to_string()));
        config.set("behavior", "eat_ms", Some(b.eat_ms.to_string()));
        config.set("behavior", "jump_delay_ms", Some(b.jump_delay_ms.to_string()));
        config.set("behavior", "jump_impulse", Some(b.jump_impulse.to_string()));

        config.set("pet", "scale", Some(self.scale.to_string()));
        config
    }

    /// Save configuration to the INI file at `config_path`.
    pub fn save_to_file(&self) -> Result<(), PetError> {
        self.to_ini()
            .write(&self.config_path)
            .map_err(|e| PetError::Config(format!("failed to save config file: {}", e)))?;
        info!("Saved config to {:?}", self.config_path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_stock_pet() {
        let config = PetConfig::new();
        assert_eq!(config.physics.ground, 190.0);
        assert_eq!(config.physics.gravity, 2.0);
        assert_eq!(config.blink.duration, 10);
        assert_eq!(config.blink.cooldown, 300);
        assert_eq!(config.blink.probability, 100);
        assert_eq!(config.behavior.eat_ms, 2_000);
        assert_eq!(config.alpha, 1.0);
    }

    #[test]
    fn test_partial_override_keeps_other_values() {
        let mut config = PetConfig::new();
        config
            .load_from_str("[blink]\nprobability = 0\n\n[physics]\ngravity = 3.5\nbounce = nope\n")
            .unwrap();
        assert_eq!(config.blink.probability, 0);
        assert_eq!(config.physics.gravity, 3.5);
        assert_eq!(config.physics.ground_bounce, -0.5);
        assert_eq!(config.blink.cooldown, 300);
    }

    #[test]
    fn test_blink_timings_that_never_reopen_are_rejected() {
        for text in [
            "[blink]\nduration = 1\n",
            "[blink]\ncooldown = -3\n",
            "[blink]\nduration = 4294967298\n",
            "[blink]\nprobability = -1\n",
            "[behavior]\njump_chance = 5000000000\n",
        ] {
            let mut config = PetConfig::new();
            let err = config.load_from_str(text).unwrap_err();
            assert!(matches!(err, PetError::Config(_)), "{text}: {err}");
            assert_eq!(config, PetConfig::new(), "{text} left a partial update");
        }
    }

    #[test]
    fn test_shortest_valid_blink_is_accepted() {
        let mut config = PetConfig::new();
        config
            .load_from_str("[blink]\nduration = 2\ncooldown = 2\n")
            .unwrap();
        assert_eq!(config.blink.duration, 2);
        assert_eq!(config.blink.cooldown, 2);
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let mut config = PetConfig::with_path("/nonexistent/petsprite.ini");
        assert!(matches!(config.load_from_file(), Err(PetError::Config(_))));
    }

    #[test]
    fn test_save_then_load_file() {
        let path = std::env::temp_dir().join(format!("petsprite-config-{}.ini", std::process::id()));
        let mut saved = PetConfig::with_path(&path);
        saved.scale = 2.5;
        saved.behavior.walk_chance = 42;
        saved.save_to_file().unwrap();

        let mut loaded = PetConfig::with_path(&path);
        loaded.load_from_file().unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(loaded, saved);
    }
}
