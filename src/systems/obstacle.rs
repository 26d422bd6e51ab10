//! Obstacle buttons cool down; obstacles slide towards the position their
//! button asks for.
use bevy_ecs::prelude::*;
use log::warn;

use crate::components::mapposition::MapPosition;
use crate::components::obstacle::{Obstacle, ObstacleButton};
use crate::resources::worldtime::WorldTime;

pub fn obstacle_system(
    time: Res<WorldTime>,
    mut buttons: Query<&mut ObstacleButton>,
    mut obstacles: Query<(Entity, &Obstacle, &mut MapPosition)>,
) {
    for mut button in buttons.iter_mut() {
        button.cool(time.delta);
    }

    for (entity, obstacle, mut position) in obstacles.iter_mut() {
        let Ok(button) = buttons.get(obstacle.button) else {
            warn!("obstacle {:?} lost its button {:?}", entity, obstacle.button);
            continue;
        };
        let target = obstacle.target(button.pressed);
        if position.pos != target {
            position.move_towards(target, obstacle.move_speed * time.delta);
        }
    }
}
