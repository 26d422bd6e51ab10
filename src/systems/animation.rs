//! Animation clocks and animation-driven signals.
//!
//! Kick clips release the attack lock after `attack.lock_time` and finish
//! after `attack.swing_time`; each signal is emitted once per clip play.
use bevy_ecs::prelude::*;

use crate::components::animation::Animator;
use crate::components::character::Character;
use crate::events::signal::Signal;
use crate::resources::gameconfig::GameConfig;
use crate::resources::signalbus::SignalBus;
use crate::resources::worldtime::WorldTime;

fn is_kick(clip: &str) -> bool {
    clip.ends_with("Kick")
}

pub fn animation_events(
    mut query: Query<(Entity, &mut Animator, Has<Character>)>,
    bus: NonSend<SignalBus>,
    config: Res<GameConfig>,
    time: Res<WorldTime>,
) {
    for (entity, mut animator, is_character) in query.iter_mut() {
        animator.advance(time.delta);
        if !is_character || !is_kick(&animator.clip) {
            continue;
        }
        if animator.emitted & Animator::LOCK_RELEASED == 0
            && animator.clip_time >= config.attack_lock_time
        {
            animator.emitted |= Animator::LOCK_RELEASED;
            bus.publish(Signal::AttackLockReleased { character: entity });
        }
        if animator.emitted & Animator::FINISHED == 0 && animator.clip_time >= config.attack_swing_time {
            animator.emitted |= Animator::FINISHED;
            bus.publish(Signal::AttackAnimationFinished { character: entity });
        }
    }
}
