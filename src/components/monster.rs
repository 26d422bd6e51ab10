//! Patrolling monster.
use bevy_ecs::prelude::Component;
use serde::{Deserialize, Serialize};

/// Walks back and forth between `left` and `right` (world x).
#[derive(Component, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Monster {
    pub left: f32,
    pub right: f32,
    pub speed: f32,
    #[serde(default)]
    pub walking_right: bool,
}

impl Monster {
    pub fn new(left: f32, right: f32, speed: f32) -> Self {
        Self {
            left: left.min(right),
            right: left.max(right),
            speed,
            walking_right: false,
        }
    }

    /// Next x after walking `step`; turns around when a bound is within reach.
    pub fn patrol(&mut self, x: f32, step: f32) -> f32 {
        let bound = if self.walking_right { self.right } else { self.left };
        if (x - bound).abs() < step {
            self.walking_right = !self.walking_right;
            bound
        } else if self.walking_right {
            x + step
        } else {
            x - step
        }
    }
}
