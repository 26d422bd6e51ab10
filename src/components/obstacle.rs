//! Obstacle buttons and the obstacles they drive.
use bevy_ecs::prelude::{Component, Entity};
use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Toggled by a character's body or kick; ignores touches while cooling down.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ObstacleButton {
    pub pressed: bool,
    /// Seconds left before the next toggle is accepted.
    pub cooldown: f32,
}

impl ObstacleButton {
    /// Flip the button unless it is cooling down. Returns whether it flipped.
    pub fn toggle(&mut self, cooldown: f32) -> bool {
        if self.cooldown > 0.0 {
            return false;
        }
        self.pressed = !self.pressed;
        self.cooldown = cooldown;
        true
    }

    pub fn cool(&mut self, delta: f32) {
        if self.cooldown > 0.0 {
            self.cooldown = (self.cooldown - delta).max(0.0);
        }
    }
}

/// Solid block that slides between two positions following its button.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Obstacle {
    pub button: Entity,
    pub pressed_position: Vec2,
    pub unpressed_position: Vec2,
    pub move_speed: f32,
}

impl Obstacle {
    pub fn target(&self, pressed: bool) -> Vec2 {
        if pressed {
            self.pressed_position
        } else {
            self.unpressed_position
        }
    }
}
