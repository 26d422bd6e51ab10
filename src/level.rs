//! Level and input-script data.
//!
//! A level is a JSON document describing the characters, jelloporters with
//! their two plates, monsters, solid geometry, obstacle buttons with their
//! obstacles, ice blocks and cut-scene sequences. An input script lists raw
//! button changes per frame for the headless runner.
//!
//! ```json
//! {
//!   "jello_state": "pink_up_green_down",
//!   "characters": [{ "id": "first", "position": [0.0, 0.5] }],
//!   "jelloporters": [{
//!     "color": "pink",
//!     "top": { "name": "roof", "position": [6.0, 8.5], "exit_right": true },
//!     "bottom": { "name": "cellar", "position": [6.0, 0.5], "exit_right": false }
//!   }],
//!   "solids": [{ "position": [-20.0, -1.0], "size": [40.0, 1.0] }],
//!   "buttons": [{ "name": "gate", "position": [2.0, 0.25] }],
//!   "obstacles": [{
//!     "button": "gate", "size": [1.0, 3.0],
//!     "unpressed": [10.0, 1.5], "pressed": [10.0, 4.5]
//!   }],
//!   "ice_blocks": [{ "position": [-4.0, 0.5] }],
//!   "cutscenes": [{ "slides": [{ "image": "intro_1.png" }] }]
//! }
//! ```
//!
//! Solid positions are the lower-left corner; every other position, obstacles
//! and ice blocks included, is the centre of the entity.

use std::fs;
use std::path::Path;

use bevy_ecs::prelude::*;
use glam::Vec2;
use log::{info, warn};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::components::animation::Animator;
use crate::components::boxcollider::BoxCollider;
use crate::components::iceblock::IceBlock;
use crate::components::brains::{CharacterBrain, JelloporterBrain, MonsterBrain};
use crate::components::character::{Character, CharacterId};
use crate::components::jelloporter::{JelloPlate, JelloState, Jelloporter, JelloporterColor, PlateSide};
use crate::components::mapposition::MapPosition;
use crate::components::monster::Monster;
use crate::components::obstacle::{Obstacle, ObstacleButton};
use crate::components::rigidbody::RigidBody;
use crate::components::sensors::Sensors;
use crate::components::solid::Solid;
use crate::events::input::MoveButton;
use crate::resources::cutscene::{CutSceneDirector, CutSceneSequence, Slide};
use crate::resources::gameconfig::GameConfig;
use crate::resources::input::RawButtons;
use crate::resources::jelloworld::JelloWorld;

#[derive(Debug, Error)]
pub enum LevelError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("duplicate character {0:?}")]
    DuplicateCharacter(CharacterId),
    #[error("level has no character {0:?}")]
    MissingCharacter(CharacterId),
    #[error("duplicate plate name '{0}'")]
    DuplicatePlate(String),
    #[error("cut-scene {index} is triggered by unknown plate '{plate}'")]
    UnknownPlate { index: usize, plate: String },
    #[error("duplicate button name '{0}'")]
    DuplicateButton(String),
    #[error("obstacle {index} is driven by unknown button '{button}'")]
    UnknownButton { index: usize, button: String },
}

fn default_character_size() -> Vec2 {
    Vec2::new(0.8, 1.0)
}

fn default_jelloporter_size() -> Vec2 {
    Vec2::new(1.0, 1.0)
}

fn default_monster_size() -> Vec2 {
    Vec2::new(1.0, 1.0)
}

fn default_monster_speed() -> f32 {
    1.0
}

fn default_button_size() -> Vec2 {
    Vec2::new(1.0, 0.5)
}

fn default_block_size() -> Vec2 {
    Vec2::new(1.0, 1.0)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterDef {
    pub id: CharacterId,
    pub position: Vec2,
    #[serde(default = "default_character_size")]
    pub size: Vec2,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlateDef {
    pub name: String,
    pub position: Vec2,
    #[serde(default)]
    pub exit_right: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JelloporterDef {
    pub color: JelloporterColor,
    pub top: PlateDef,
    pub bottom: PlateDef,
    #[serde(default = "default_jelloporter_size")]
    pub size: Vec2,
    /// Overrides `jelloporter.move_speed` from the config.
    #[serde(default)]
    pub move_speed: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonsterDef {
    pub position: Vec2,
    pub left: f32,
    pub right: f32,
    #[serde(default = "default_monster_speed")]
    pub speed: f32,
    #[serde(default = "default_monster_size")]
    pub size: Vec2,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolidDef {
    pub position: Vec2,
    pub size: Vec2,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ButtonDef {
    pub name: String,
    pub position: Vec2,
    #[serde(default = "default_button_size")]
    pub size: Vec2,
    #[serde(default)]
    pub pressed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObstacleDef {
    /// Name of the controlling button.
    pub button: String,
    pub size: Vec2,
    pub pressed: Vec2,
    pub unpressed: Vec2,
    /// Overrides `obstacle.move_speed` from the config.
    #[serde(default)]
    pub move_speed: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IceBlockDef {
    pub position: Vec2,
    #[serde(default = "default_block_size")]
    pub size: Vec2,
    /// Overrides `ice_block.push_speed` from the config.
    #[serde(default)]
    pub push_speed: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CutSceneDef {
    /// Plate name; absent for the intro sequence.
    #[serde(default)]
    pub trigger_plate: Option<String>,
    pub slides: Vec<Slide>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Level {
    #[serde(default)]
    pub jello_state: JelloState,
    pub characters: Vec<CharacterDef>,
    #[serde(default)]
    pub jelloporters: Vec<JelloporterDef>,
    #[serde(default)]
    pub monsters: Vec<MonsterDef>,
    #[serde(default)]
    pub solids: Vec<SolidDef>,
    #[serde(default)]
    pub buttons: Vec<ButtonDef>,
    #[serde(default)]
    pub obstacles: Vec<ObstacleDef>,
    #[serde(default)]
    pub ice_blocks: Vec<IceBlockDef>,
    #[serde(default)]
    pub cutscenes: Vec<CutSceneDef>,
}

/// Entities created by [`Level::spawn`].
#[derive(Debug, Clone, Default)]
pub struct SpawnedLevel {
    pub characters: FxHashMap<CharacterId, Entity>,
    pub jelloporters: Vec<Entity>,
    pub plates: FxHashMap<String, Entity>,
    pub monsters: Vec<Entity>,
    pub buttons: FxHashMap<String, Entity>,
    pub obstacles: Vec<Entity>,
    pub ice_blocks: Vec<Entity>,
}

impl SpawnedLevel {
    pub fn character(&self, id: CharacterId) -> Option<Entity> {
        self.characters.get(&id).copied()
    }

    pub fn plate(&self, name: &str) -> Option<Entity> {
        self.plates.get(name).copied()
    }

    pub fn button(&self, name: &str) -> Option<Entity> {
        self.buttons.get(name).copied()
    }
}

impl Level {
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, LevelError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| LevelError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let level = Self::load_from_str(&text).map_err(|e| match e {
            LevelError::Parse { source, .. } => LevelError::Parse {
                path: path.display().to_string(),
                source,
            },
            other => other,
        })?;
        info!(
            "loaded level {}: {} characters, {} jelloporters, {} monsters, {} cut-scenes",
            path.display(),
            level.characters.len(),
            level.jelloporters.len(),
            level.monsters.len(),
            level.cutscenes.len()
        );
        Ok(level)
    }

    pub fn load_from_str(text: &str) -> Result<Self, LevelError> {
        let level: Level = serde_json::from_str(text).map_err(|source| LevelError::Parse {
            path: "<string>".into(),
            source,
        })?;
        level.validate()?;
        Ok(level)
    }

    fn validate(&self) -> Result<(), LevelError> {
        let mut seen = Vec::new();
        for def in &self.characters {
            if seen.contains(&def.id) {
                return Err(LevelError::DuplicateCharacter(def.id));
            }
            seen.push(def.id);
        }
        if !seen.contains(&CharacterId::First) {
            return Err(LevelError::MissingCharacter(CharacterId::First));
        }
        let mut names: Vec<&str> = Vec::new();
        for def in &self.jelloporters {
            for plate in [&def.top, &def.bottom] {
                if names.contains(&plate.name.as_str()) {
                    return Err(LevelError::DuplicatePlate(plate.name.clone()));
                }
                names.push(&plate.name);
            }
        }
        let mut buttons: Vec<&str> = Vec::new();
        for def in &self.buttons {
            if buttons.contains(&def.name.as_str()) {
                return Err(LevelError::DuplicateButton(def.name.clone()));
            }
            buttons.push(&def.name);
        }
        for (index, obstacle) in self.obstacles.iter().enumerate() {
            if !buttons.contains(&obstacle.button.as_str()) {
                return Err(LevelError::UnknownButton {
                    index,
                    button: obstacle.button.clone(),
                });
            }
        }
        for (index, cutscene) in self.cutscenes.iter().enumerate() {
            let Some(plate) = &cutscene.trigger_plate else {
                continue;
            };
            if !names.contains(&plate.as_str()) {
                return Err(LevelError::UnknownPlate {
                    index,
                    plate: plate.clone(),
                });
            }
        }
        Ok(())
    }

    /// Spawn every entity and install the level resources
    /// ([`JelloWorld`], [`CutSceneDirector`]).
    pub fn spawn(&self, world: &mut World) -> Result<SpawnedLevel, LevelError> {
        self.validate()?;
        let config = world
            .get_resource::<GameConfig>()
            .cloned()
            .unwrap_or_default();
        let mut spawned = SpawnedLevel::default();

        for def in &self.solids {
            world.spawn((
                Solid,
                MapPosition { pos: def.position },
                BoxCollider::new(def.size.x, def.size.y).with_offset(Vec2::ZERO),
            ));
        }

        for def in &self.jelloporters {
            let entity = world.spawn_empty().id();
            let top = spawn_plate(world, entity, PlateSide::Top, &def.top);
            let bottom = spawn_plate(world, entity, PlateSide::Bottom, &def.bottom);
            let start = match def.color.choose_destination(self.jello_state) {
                PlateSide::Top => def.top.position,
                PlateSide::Bottom => def.bottom.position,
            };
            world.entity_mut(entity).insert((
                Jelloporter {
                    color: def.color,
                    top_plate: top,
                    bottom_plate: bottom,
                    move_speed: def.move_speed.unwrap_or(config.jelloporter_move_speed),
                    responds_to_collisions: true,
                },
                JelloporterBrain::new(entity),
                MapPosition { pos: start },
                BoxCollider::new(def.size.x, def.size.y),
                Animator::new("Idle"),
            ));
            spawned.plates.insert(def.top.name.clone(), top);
            spawned.plates.insert(def.bottom.name.clone(), bottom);
            spawned.jelloporters.push(entity);
        }

        for def in &self.characters {
            let entity = world.spawn_empty().id();
            world.entity_mut(entity).insert((
                Character::new(def.id, def.position),
                CharacterBrain::new(entity),
                RigidBody::with_gravity(config.gravity),
                MapPosition { pos: def.position },
                BoxCollider::new(def.size.x, def.size.y),
                Animator::new("Idle"),
                Sensors::default(),
            ));
            spawned.characters.insert(def.id, entity);
        }

        for def in &self.monsters {
            let entity = world.spawn_empty().id();
            world.entity_mut(entity).insert((
                Monster::new(def.left, def.right, def.speed),
                MonsterBrain::new(entity),
                MapPosition { pos: def.position },
                BoxCollider::new(def.size.x, def.size.y),
                Animator::new("Walk"),
            ));
            spawned.monsters.push(entity);
        }

        for def in &self.buttons {
            let entity = world
                .spawn((
                    ObstacleButton {
                        pressed: def.pressed,
                        cooldown: 0.0,
                    },
                    MapPosition { pos: def.position },
                    BoxCollider::new(def.size.x, def.size.y),
                    Animator::new(if def.pressed { "Pressed" } else { "Unpressed" }),
                ))
                .id();
            spawned.buttons.insert(def.name.clone(), entity);
        }

        for (index, def) in self.obstacles.iter().enumerate() {
            let button = spawned.button(&def.button).ok_or_else(|| LevelError::UnknownButton {
                index,
                button: def.button.clone(),
            })?;
            let pressed = self
                .buttons
                .iter()
                .any(|b| b.name == def.button && b.pressed);
            let obstacle = Obstacle {
                button,
                pressed_position: def.pressed,
                unpressed_position: def.unpressed,
                move_speed: def.move_speed.unwrap_or(config.obstacle_move_speed),
            };
            let entity = world
                .spawn((
                    Solid,
                    MapPosition {
                        pos: obstacle.target(pressed),
                    },
                    BoxCollider::new(def.size.x, def.size.y),
                    obstacle,
                ))
                .id();
            spawned.obstacles.push(entity);
        }

        for def in &self.ice_blocks {
            let entity = world
                .spawn((
                    Solid,
                    IceBlock {
                        push_speed: def.push_speed.unwrap_or(config.ice_block_push_speed),
                    },
                    RigidBody::with_gravity(config.gravity),
                    MapPosition { pos: def.position },
                    BoxCollider::new(def.size.x, def.size.y),
                    Sensors::default(),
                ))
                .id();
            spawned.ice_blocks.push(entity);
        }

        let mut sequences = Vec::with_capacity(self.cutscenes.len());
        for (index, def) in self.cutscenes.iter().enumerate() {
            let trigger = match &def.trigger_plate {
                Some(name) => Some(spawned.plate(name).ok_or_else(|| LevelError::UnknownPlate {
                    index,
                    plate: name.clone(),
                })?),
                None => None,
            };
            if index > 0 && trigger.is_none() {
                warn!("cut-scene {} has no trigger plate and will never play", index);
            }
            sequences.push(CutSceneSequence::new(trigger, def.slides.clone()));
        }
        if self.cutscenes.first().is_some_and(|c| c.trigger_plate.is_some()) {
            warn!("first cut-scene is played as the intro; its trigger plate is ignored");
        }

        world.insert_resource(JelloWorld::new(self.jello_state));
        world.insert_resource(CutSceneDirector::new(sequences));
        Ok(spawned)
    }
}

fn spawn_plate(world: &mut World, jelloporter: Entity, side: PlateSide, def: &PlateDef) -> Entity {
    world
        .spawn((
            JelloPlate {
                jelloporter,
                side,
                exit_right: def.exit_right,
                name: def.name.clone(),
            },
            MapPosition { pos: def.position },
        ))
        .id()
}

/// One raw button change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptEvent {
    pub frame: u64,
    pub button: MoveButton,
    pub down: bool,
}

/// Scripted raw input for the headless runner.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InputScript {
    pub events: Vec<ScriptEvent>,
}

impl InputScript {
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, LevelError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| LevelError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let mut script: InputScript =
            serde_json::from_str(&text).map_err(|source| LevelError::Parse {
                path: path.display().to_string(),
                source,
            })?;
        script.events.sort_by_key(|e| e.frame);
        Ok(script)
    }

    /// Apply every change scheduled for `frame`.
    pub fn apply(&self, frame: u64, raw: &mut RawButtons) {
        for event in self.events.iter().filter(|e| e.frame == frame) {
            raw.set(event.button, event.down);
        }
    }

    pub fn last_frame(&self) -> Option<u64> {
        self.events.iter().map(|e| e.frame).max()
    }
}
