//! State machine holders attached to entities.
//!
//! Each brain owns the [`StateMachine`] of its entity. Brains are only touched
//! by their own system, which builds the matching context from the entity's
//! other components every frame.
use bevy_ecs::prelude::{Component, Entity};

use crate::fsm::{MachineState, StateMachine};
use crate::states::character::CharacterState;
use crate::states::jelloporter::JelloporterState;
use crate::states::monster::MonsterState;

macro_rules! brain {
    ($(#[$meta:meta])* $name:ident, $state:ty, $machine:literal) => {
        $(#[$meta])*
        #[derive(Component, Debug)]
        pub struct $name {
            pub machine: StateMachine<$state>,
        }

        impl $name {
            pub fn new(owner: Entity) -> Self {
                Self {
                    machine: StateMachine::new($machine).with_owner(owner),
                }
            }

            pub fn state(&self) -> Option<&$state> {
                self.machine.current()
            }

            pub fn state_label(&self) -> Option<&'static str> {
                self.machine.current().map(|s| s.label())
            }
        }
    };
}

brain!(
    /// Drives a player character.
    CharacterBrain,
    CharacterState,
    "character"
);
brain!(JelloporterBrain, JelloporterState, "jelloporter");
brain!(MonsterBrain, MonsterState, "monster");
