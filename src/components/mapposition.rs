use bevy_ecs::prelude::Component;
use glam::Vec2;

/// World-space position of an entity (y points up).
#[derive(Component, Clone, Copy, Debug, Default, PartialEq)]
pub struct MapPosition {
    pub pos: Vec2,
}

impl MapPosition {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
        }
    }

    /// Move towards `target` by at most `max_distance`, never overshooting.
    /// Returns the new position.
    pub fn move_towards(&mut self, target: Vec2, max_distance: f32) -> Vec2 {
        let offset = target - self.pos;
        let distance = offset.length();
        if distance <= max_distance || distance <= f32::EPSILON {
            self.pos = target;
        } else {
            self.pos += offset / distance * max_distance;
        }
        self.pos
    }
}
