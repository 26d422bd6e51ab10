//! Monster update and removal.
use bevy_ecs::prelude::*;
use log::debug;

use crate::components::animation::Animator;
use crate::components::boxcollider::BoxCollider;
use crate::components::brains::MonsterBrain;
use crate::components::mapposition::MapPosition;
use crate::components::monster::Monster;
use crate::resources::gameconfig::GameConfig;
use crate::resources::signalbus::SignalBus;
use crate::resources::worldtime::WorldTime;
use crate::states::monster::{MonsterContext, MonsterState};

pub fn monster_system(
    mut commands: Commands,
    mut query: Query<(
        Entity,
        &mut MonsterBrain,
        &mut Monster,
        &mut MapPosition,
        &mut Animator,
        &mut BoxCollider,
    )>,
    bus: NonSend<SignalBus>,
    config: Res<GameConfig>,
    time: Res<WorldTime>,
) {
    for (entity, mut brain, mut monster, mut position, mut animator, mut collider) in query.iter_mut() {
        let mut ctx = MonsterContext {
            entity,
            monster: &mut monster,
            position: &mut position,
            animator: &mut animator,
            collider: &mut collider,
            death_duration: config.monster_death_duration,
            delta: time.delta,
            despawn: false,
        };
        brain.machine.update(&mut ctx, &bus, MonsterState::patrol);
        if ctx.despawn {
            // Release the bus mailbox before the entity goes away.
            brain.machine.shutdown(&mut ctx, &bus);
            commands.entity(entity).despawn();
            debug!("monster {:?} despawned", entity);
        }
    }
}
