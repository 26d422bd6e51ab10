//! Game tuning resource.
//!
//! Holds every tunable number the state machines read: movement speeds,
//! attack timings, jelloporter motion, death/respawn delays, cut-scene fades.
//! Values are loaded from an INI file; anything missing keeps its default.
//!
//! # Configuration File Format
//!
//! ```ini
//! [character]
//! run_velocity = 4.0
//! jump_velocity = 9.0
//! apex_velocity = 0.25
//! gravity = -20.0
//!
//! [attack]
//! lock_time = 0.2
//! swing_time = 0.4
//! reach = 0.6
//!
//! [jelloporter]
//! move_speed = 5.0
//! enter_speed = 3.0
//! exit_velocity_x = 3.0
//! exit_velocity_y = 6.0
//!
//! [lifecycle]
//! death_duration = 2.0
//! respawn_grace = 0.5
//!
//! [cutscene]
//! fade_speed = 1.0
//! black_delay = 1.0
//! input_delay = 2.0
//!
//! [monster]
//! death_duration = 3.0
//!
//! [obstacle]
//! button_cooldown = 0.5
//! move_speed = 2.0
//!
//! [ice_block]
//! push_speed = 1.0
//!
//! [simulation]
//! fixed_delta = 0.016666668
//! ```

use std::path::{Path, PathBuf};

use bevy_ecs::prelude::*;
use configparser::ini::Ini;
use log::info;
use thiserror::Error;

const DEFAULT_CONFIG_PATH: &str = "./config.ini";

/// Errors raised while reading or writing the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config file {path}: {reason}")]
    Load { path: PathBuf, reason: String },
    #[error("failed to parse config: {0}")]
    Parse(String),
    #[error("invalid value for [{section}] {key}: {reason}")]
    Invalid {
        section: &'static str,
        key: &'static str,
        reason: String,
    },
    #[error("failed to save config file {path}: {source}")]
    Save {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Tuning values shared by every state machine.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct GameConfig {
    /// Horizontal speed while running or steering in the air.
    pub run_velocity: f32,
    /// Initial vertical speed of a jump.
    pub jump_velocity: f32,
    /// Half-width of the "topping" velocity band.
    pub apex_velocity: f32,
    /// Vertical acceleration applied to characters (negative is down).
    pub gravity: f32,

    /// Seconds into a kick before movement may resume.
    pub attack_lock_time: f32,
    /// Length of a kick animation in seconds.
    pub attack_swing_time: f32,
    /// Distance a kick reaches beyond the body.
    pub attack_reach: f32,

    /// Jelloporter travel speed between plates.
    pub jelloporter_move_speed: f32,
    /// Speed a character is pulled into a jelloporter.
    pub jelloporter_enter_speed: f32,
    pub exit_velocity_x: f32,
    pub exit_velocity_y: f32,

    /// Seconds spent dead before respawning.
    pub death_duration: f32,
    /// Seconds after respawn before the collider is enabled again.
    pub respawn_grace: f32,

    /// Alpha units per second.
    pub fade_speed: f32,
    pub black_delay: f32,
    /// Seconds a slide must be shown before a press advances it.
    pub input_delay: f32,

    pub monster_death_duration: f32,

    /// Seconds after a toggle during which an obstacle button ignores touches.
    pub button_cooldown: f32,
    pub obstacle_move_speed: f32,
    /// Speed of an ice block while a character pushes it.
    pub ice_block_push_speed: f32,

    /// Frame delta used by the headless runner.
    pub fixed_delta: f32,

    pub config_path: PathBuf,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl GameConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self {
            run_velocity: 4.0,
            jump_velocity: 9.0,
            apex_velocity: 0.25,
            gravity: -20.0,
            attack_lock_time: 0.2,
            attack_swing_time: 0.4,
            attack_reach: 0.6,
            jelloporter_move_speed: 5.0,
            jelloporter_enter_speed: 3.0,
            exit_velocity_x: 3.0,
            exit_velocity_y: 6.0,
            death_duration: 2.0,
            respawn_grace: 0.5,
            fade_speed: 1.0,
            black_delay: 1.0,
            input_delay: 2.0,
            monster_death_duration: 3.0,
            button_cooldown: 0.5,
            obstacle_move_speed: 2.0,
            ice_block_push_speed: 1.0,
            fixed_delta: 1.0 / 60.0,
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    /// Create a configuration with defaults and a custom file path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            ..Self::new()
        }
    }

    fn fields_mut(&mut self) -> [(&'static str, &'static str, &mut f32); 21] {
        [
            ("character", "run_velocity", &mut self.run_velocity),
            ("character", "jump_velocity", &mut self.jump_velocity),
            ("character", "apex_velocity", &mut self.apex_velocity),
            ("character", "gravity", &mut self.gravity),
            ("attack", "lock_time", &mut self.attack_lock_time),
            ("attack", "swing_time", &mut self.attack_swing_time),
            ("attack", "reach", &mut self.attack_reach),
            ("jelloporter", "move_speed", &mut self.jelloporter_move_speed),
            ("jelloporter", "enter_speed", &mut self.jelloporter_enter_speed),
            ("jelloporter", "exit_velocity_x", &mut self.exit_velocity_x),
            ("jelloporter", "exit_velocity_y", &mut self.exit_velocity_y),
            ("lifecycle", "death_duration", &mut self.death_duration),
            ("lifecycle", "respawn_grace", &mut self.respawn_grace),
            ("cutscene", "fade_speed", &mut self.fade_speed),
            ("cutscene", "black_delay", &mut self.black_delay),
            ("cutscene", "input_delay", &mut self.input_delay),
            ("monster", "death_duration", &mut self.monster_death_duration),
            ("obstacle", "button_cooldown", &mut self.button_cooldown),
            ("obstacle", "move_speed", &mut self.obstacle_move_speed),
            ("ice_block", "push_speed", &mut self.ice_block_push_speed),
            ("simulation", "fixed_delta", &mut self.fixed_delta),
        ]
    }

    /// Load configuration from `config_path`.
    ///
    /// Missing values retain their current values.
    pub fn load_from_file(&mut self) -> Result<(), ConfigError> {
        let mut config = Ini::new();
        config.load(&self.config_path).map_err(|reason| ConfigError::Load {
            path: self.config_path.clone(),
            reason,
        })?;
        self.apply(&config)?;
        info!(
            "Loaded config from {:?}: run={} jump={} gravity={} fixed_delta={}",
            self.config_path, self.run_velocity, self.jump_velocity, self.gravity, self.fixed_delta
        );
        Ok(())
    }

    /// Load configuration from INI text.
    pub fn load_from_str(&mut self, text: &str) -> Result<(), ConfigError> {
        let mut config = Ini::new();
        config.read(text.to_string()).map_err(ConfigError::Parse)?;
        self.apply(&config)
    }

    /// Load `path` if it exists; otherwise keep the defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let mut config = Self::with_path(path.as_ref());
        if path.as_ref().exists() {
            config.load_from_file()?;
        } else {
            info!("No config at {:?}, using defaults", path.as_ref());
        }
        Ok(config)
    }

    fn apply(&mut self, config: &Ini) -> Result<(), ConfigError> {
        for (section, key, slot) in self.fields_mut() {
            let value = config
                .getfloat(section, key)
                .map_err(|reason| ConfigError::Invalid {
                    section,
                    key,
                    reason,
                })?;
            if let Some(value) = value {
                *slot = value as f32;
            }
        }
        Ok(())
    }

    /// Save configuration to `config_path`, creating the file if needed.
    pub fn save_to_file(&self) -> Result<(), ConfigError> {
        let mut config = Ini::new();
        let mut copy = self.clone();
        for (section, key, value) in copy.fields_mut() {
            config.set(section, key, Some(value.to_string()));
        }
        config
            .write(&self.config_path)
            .map_err(|source| ConfigError::Save {
                path: self.config_path.clone(),
                source,
            })?;
        info!("Saved config to {:?}", self.config_path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = GameConfig::new();
        assert_eq!(config.run_velocity, 4.0);
        assert_eq!(config.monster_death_duration, 3.0);
        assert_eq!(config.death_duration, 2.0);
        assert_eq!(config.button_cooldown, 0.5);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let mut config = GameConfig::new();
        config
            .load_from_str("[attack]\nlock_time = 0.1\n[monster]\ndeath_duration = 4\n")
            .unwrap();
        assert!((config.attack_lock_time - 0.1).abs() < 1e-6);
        assert_eq!(config.monster_death_duration, 4.0);
        assert_eq!(config.death_duration, 2.0);
        assert_eq!(config.attack_swing_time, 0.4);
    }

    #[test]
    fn invalid_value_is_reported() {
        let mut config = GameConfig::new();
        let err = config
            .load_from_str("[character]\ngravity = sideways\n")
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                section: "character",
                key: "gravity",
                ..
            }
        ));
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = GameConfig::load_or_default("./does/not/exist.ini").unwrap();
        assert_eq!(config.run_velocity, GameConfig::new().run_velocity);
    }

    #[test]
    fn save_then_load() {
        let path = std::env::temp_dir().join(format!("jellojump_cfg_{}.ini", std::process::id()));
        let mut original = GameConfig::with_path(&path);
        original.jump_velocity = 11.5;
        original.save_to_file().unwrap();
        let loaded = GameConfig::load_or_default(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(loaded.jump_velocity, 11.5);
    }
}
