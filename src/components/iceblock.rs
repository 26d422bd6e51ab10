use bevy_ecs::prelude::Component;
use serde::{Deserialize, Serialize};

/// Solid block a pushing character slides along the ground.
///
/// The block never keeps horizontal momentum: it moves only on frames where a
/// character in a push state leans on it, and stops at walls.
#[derive(Component, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IceBlock {
    pub push_speed: f32,
}
