//! Ice blocks slide while a pushing character leans on them.
//!
//! Runs after the character machines so a fresh push state is honoured in
//! the same frame, and before movement, which does the actual sliding.
use bevy_ecs::prelude::*;
use glam::Vec2;
use log::trace;

use crate::components::boxcollider::BoxCollider;
use crate::components::brains::CharacterBrain;
use crate::components::character::Facing;
use crate::components::iceblock::IceBlock;
use crate::components::mapposition::MapPosition;
use crate::components::rigidbody::RigidBody;
use crate::components::sensors::Sensors;
use crate::states::character::CharacterState;

/// Gap under which a character counts as leaning on a block.
const LEAN: f32 = 0.01;

/// Whether a body at `pos` touches `block` on the side it faces.
fn leans_on(
    collider: &BoxCollider,
    pos: Vec2,
    facing: Facing,
    block: &BoxCollider,
    block_pos: Vec2,
) -> bool {
    let (min, max) = collider.aabb(pos);
    let (block_min, block_max) = block.aabb(block_pos);
    if min.y >= block_max.y - LEAN || max.y <= block_min.y + LEAN {
        return false;
    }
    match facing {
        Facing::Right => (block_min.x - max.x).abs() <= LEAN,
        Facing::Left => (min.x - block_max.x).abs() <= LEAN,
    }
}

pub fn ice_block_system(
    characters: Query<(&CharacterBrain, &MapPosition, &BoxCollider), Without<IceBlock>>,
    mut blocks: Query<(Entity, &IceBlock, &MapPosition, &BoxCollider, &Sensors, &mut RigidBody)>,
) {
    for (entity, block, block_pos, block_collider, sensors, mut body) in blocks.iter_mut() {
        body.velocity.x = 0.0;
        let push = characters.iter().find_map(|(brain, pos, collider)| match brain.state() {
            Some(CharacterState::Push { facing, .. })
                if collider.enabled
                    && leans_on(collider, pos.pos, *facing, block_collider, block_pos.pos) =>
            {
                Some(*facing)
            }
            _ => None,
        });
        let Some(facing) = push else {
            continue;
        };
        let stuck = match facing {
            Facing::Right => sensors.blocked_right,
            Facing::Left => sensors.blocked_left,
        };
        if !stuck {
            body.velocity.x = facing.sign() * block.push_speed;
            trace!("ice block {:?} pushed {:?}", entity, facing);
        }
    }
}
