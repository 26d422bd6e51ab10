//! Playable character component.
use bevy_ecs::prelude::{Component, Entity};
use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::events::input::MoveButton;

/// Which of the two playable characters an entity is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CharacterId {
    First,
    Second,
}

impl CharacterId {
    pub fn other(self) -> Self {
        match self {
            CharacterId::First => CharacterId::Second,
            CharacterId::Second => CharacterId::First,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Facing {
    Left,
    #[default]
    Right,
}

impl Facing {
    pub fn opposite(self) -> Self {
        match self {
            Facing::Left => Facing::Right,
            Facing::Right => Facing::Left,
        }
    }

    /// Horizontal sign: -1 for left, +1 for right.
    pub fn sign(self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }

    pub fn from_button(button: MoveButton) -> Option<Self> {
        match button {
            MoveButton::Left => Some(Facing::Left),
            MoveButton::Right => Some(Facing::Right),
            _ => None,
        }
    }

    pub fn button(self) -> MoveButton {
        match self {
            Facing::Left => MoveButton::Left,
            Facing::Right => MoveButton::Right,
        }
    }
}

/// Player-controlled character.
#[derive(Component, Debug, Clone)]
pub struct Character {
    pub id: CharacterId,
    pub facing: Facing,
    /// Re-armed whenever grounded, consumed by a flying kick.
    pub can_jump_kick: bool,
    /// Last plate the character exited onto; respawn point.
    pub waypoint: Option<Entity>,
    /// Respawn point used before any plate was visited.
    pub spawn: Vec2,
    /// Set while a kick is in progress; widens the contact reach.
    pub attacking: bool,
}

impl Character {
    pub fn new(id: CharacterId, spawn: Vec2) -> Self {
        Self {
            id,
            facing: Facing::Right,
            can_jump_kick: true,
            waypoint: None,
            spawn,
            attacking: false,
        }
    }
}
