//! Character update.
//!
//! Builds a [`CharacterContext`] per character from its components and the
//! shared resources, then advances its brain. Only the character named by
//! [`GameFlow::active_character`] sees player input.
use bevy_ecs::prelude::*;

use crate::components::animation::Animator;
use crate::components::boxcollider::BoxCollider;
use crate::components::brains::CharacterBrain;
use crate::components::character::Character;
use crate::components::mapposition::MapPosition;
use crate::components::rigidbody::RigidBody;
use crate::components::sensors::Sensors;
use crate::resources::directory::JelloporterDirectory;
use crate::resources::gameconfig::GameConfig;
use crate::resources::gameflow::GameFlow;
use crate::resources::input::InputState;
use crate::resources::jelloworld::JelloWorld;
use crate::resources::signalbus::SignalBus;
use crate::resources::worldtime::WorldTime;
use crate::states::character::{CharacterContext, CharacterState};

#[allow(clippy::too_many_arguments)]
pub fn character_system(
    mut query: Query<(
        Entity,
        &mut CharacterBrain,
        &mut Character,
        &mut RigidBody,
        &mut MapPosition,
        &mut Animator,
        &mut BoxCollider,
        &Sensors,
    )>,
    bus: NonSend<SignalBus>,
    input: Res<InputState>,
    mut jello: ResMut<JelloWorld>,
    flow: Res<GameFlow>,
    directory: Res<JelloporterDirectory>,
    config: Res<GameConfig>,
    time: Res<WorldTime>,
) {
    let active = flow.active_character();
    for (entity, mut brain, mut character, mut body, mut position, mut animator, mut collider, sensors) in
        query.iter_mut()
    {
        if sensors.grounded && !character.can_jump_kick {
            character.can_jump_kick = true;
        }
        let mut ctx = CharacterContext {
            entity,
            character: &mut character,
            body: &mut body,
            position: &mut position,
            animator: &mut animator,
            collider: &mut collider,
            sensors: *sensors,
            input: &input,
            bus: &bus,
            jello: &mut jello,
            active,
            directory: &directory,
            tuning: &config,
            delta: time.delta,
            frame: time.frame_count,
        };
        brain
            .machine
            .update(&mut ctx, &bus, CharacterState::wait_to_start);
    }
}
