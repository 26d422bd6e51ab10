//! Monster states: patrol until struck, then vanish.
use bevy_ecs::prelude::Entity;
use log::debug;

use crate::components::animation::Animator;
use crate::components::boxcollider::BoxCollider;
use crate::components::mapposition::MapPosition;
use crate::components::monster::Monster;
use crate::events::signal::{Signal, SignalKind};
use crate::fsm::MachineState;

pub struct MonsterContext<'a> {
    pub entity: Entity,
    pub monster: &'a mut Monster,
    pub position: &'a mut MapPosition,
    pub animator: &'a mut Animator,
    pub collider: &'a mut BoxCollider,
    pub death_duration: f32,
    pub delta: f32,
    /// Set once the monster is ready to be removed from the world.
    pub despawn: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MonsterState {
    Patrol { struck: bool },
    Dying { elapsed: f32 },
}

impl MonsterState {
    pub fn patrol() -> Self {
        MonsterState::Patrol { struck: false }
    }
}

impl<'a> MachineState<MonsterContext<'a>> for MonsterState {
    fn label(&self) -> &'static str {
        match self {
            MonsterState::Patrol { .. } => "Patrol",
            MonsterState::Dying { .. } => "Dying",
        }
    }

    fn subscriptions(&self) -> &'static [SignalKind] {
        match self {
            MonsterState::Patrol { .. } => &[SignalKind::PlayerAttackedMonster],
            MonsterState::Dying { .. } => &[],
        }
    }

    fn enter(&mut self, ctx: &mut MonsterContext<'a>) {
        match self {
            MonsterState::Patrol { .. } => ctx.animator.fire("Walk"),
            MonsterState::Dying { .. } => {
                debug!("monster {:?} struck", ctx.entity);
                ctx.collider.enabled = false;
                ctx.animator.fire("Invisible");
            }
        }
    }

    fn on_signal(&mut self, signal: &Signal, ctx: &mut MonsterContext<'a>) {
        if let (MonsterState::Patrol { struck }, Signal::PlayerAttackedMonster { monster, .. }) =
            (&mut *self, *signal)
        {
            *struck |= monster == ctx.entity;
        }
    }

    fn tick(&mut self, ctx: &mut MonsterContext<'a>) -> Option<Self> {
        match self {
            MonsterState::Patrol { struck: true } => Some(MonsterState::Dying { elapsed: 0.0 }),
            MonsterState::Patrol { struck: false } => {
                let x = ctx.monster.patrol(ctx.position.pos.x, ctx.monster.speed * ctx.delta);
                ctx.position.pos.x = x;
                ctx.animator.set_facing(ctx.monster.walking_right);
                None
            }
            MonsterState::Dying { elapsed } => {
                *elapsed += ctx.delta;
                if *elapsed >= ctx.death_duration {
                    ctx.despawn = true;
                }
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fsm::StateMachine;
    use crate::resources::signalbus::SignalBus;
    use bevy_ecs::world::World;

    struct Rig {
        entity: Entity,
        monster: Monster,
        position: MapPosition,
        animator: Animator,
        collider: BoxCollider,
    }

    impl Rig {
        fn step(&mut self, machine: &mut StateMachine<MonsterState>, bus: &SignalBus) -> bool {
            let mut ctx = MonsterContext {
                entity: self.entity,
                monster: &mut self.monster,
                position: &mut self.position,
                animator: &mut self.animator,
                collider: &mut self.collider,
                death_duration: 1.0,
                delta: 0.5,
                despawn: false,
            };
            machine.update(&mut ctx, bus, MonsterState::patrol);
            ctx.despawn
        }
    }

    #[test]
    fn struck_monster_vanishes_then_despawns() {
        let bus = SignalBus::new();
        let mut world = World::new();
        let entity = world.spawn_empty().id();
        let other = world.spawn_empty().id();
        let character = world.spawn_empty().id();
        let mut rig = Rig {
            entity,
            monster: Monster::new(-5.0, 5.0, 1.0),
            position: MapPosition::new(0.0, 0.0),
            animator: Animator::default(),
            collider: BoxCollider::new(1.0, 1.0),
        };
        let mut machine = StateMachine::new("monster");
        assert!(!rig.step(&mut machine, &bus));
        assert_eq!(rig.position.pos.x, -0.5);

        bus.publish(Signal::PlayerAttackedMonster {
            character,
            monster: other,
        });
        rig.step(&mut machine, &bus);
        assert_eq!(machine.current().map(|s| s.label()), Some("Patrol"));

        bus.publish(Signal::PlayerAttackedMonster {
            character,
            monster: entity,
        });
        rig.animator.take_fired();
        assert!(!rig.step(&mut machine, &bus));
        assert_eq!(machine.current().map(|s| s.label()), Some("Dying"));
        assert!(!rig.collider.enabled);
        assert_eq!(rig.animator.take_fired(), vec!["Invisible".to_string()]);
        assert!(!rig.step(&mut machine, &bus));
        assert!(rig.step(&mut machine, &bus));
    }
}
