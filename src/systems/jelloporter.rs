//! Jelloporter update.
use bevy_ecs::prelude::*;

use crate::components::animation::Animator;
use crate::components::brains::JelloporterBrain;
use crate::components::jelloporter::Jelloporter;
use crate::components::mapposition::MapPosition;
use crate::resources::directory::JelloporterDirectory;
use crate::resources::signalbus::SignalBus;
use crate::resources::worldtime::WorldTime;
use crate::states::jelloporter::{JelloporterContext, JelloporterState};

pub fn jelloporter_system(
    mut query: Query<(
        Entity,
        &mut JelloporterBrain,
        &mut Jelloporter,
        &mut MapPosition,
        &mut Animator,
    )>,
    bus: NonSend<SignalBus>,
    directory: Res<JelloporterDirectory>,
    time: Res<WorldTime>,
) {
    for (entity, mut brain, mut jelloporter, mut position, mut animator) in query.iter_mut() {
        let mut ctx = JelloporterContext {
            entity,
            jelloporter: &mut jelloporter,
            position: &mut position,
            animator: &mut animator,
            bus: &bus,
            directory: &directory,
            delta: time.delta,
        };
        brain.machine.update(&mut ctx, &bus, JelloporterState::idle);
    }
}
