//! Typed signals exchanged over the [`SignalBus`](crate::resources::signalbus::SignalBus).
//!
//! A [`Signal`] is an immutable payload created by its publisher, copied to
//! every current subscriber of its [`SignalKind`] during a single
//! `publish` call, then dropped. Payloads name the entities involved
//! (character, teleporter, plate, monster) so subscribers can tell whether a
//! signal is addressed to them.

use bevy_ecs::prelude::Entity;

use crate::components::character::CharacterId;
use crate::components::jelloporter::JelloState;
use crate::events::input::{MenuButton, MoveButton};

/// Event payloads carried by the bus.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Signal {
    /// A state machine entered a new state.
    StateStarted {
        machine: &'static str,
        owner: Option<Entity>,
        state: &'static str,
    },
    /// A state machine is leaving its current state.
    StateEnding {
        machine: &'static str,
        owner: Option<Entity>,
        state: &'static str,
    },
    /// Rising edge of a latched gameplay button.
    ButtonPressed(MoveButton),
    /// Falling edge of a latched gameplay button.
    ButtonReleased(MoveButton),
    /// A UI button was clicked.
    MenuButtonPressed(MenuButton),
    /// The main menu was confirmed and closed.
    MenuClosed,
    /// The kick animation reached the frame where movement may resume.
    AttackLockReleased { character: Entity },
    /// The kick animation played to its end.
    AttackAnimationFinished { character: Entity },
    /// A character touched a teleporter that currently accepts riders.
    PlayerHitJelloporter {
        jelloporter: Entity,
        character: Entity,
    },
    /// A rider committed to a teleport; carries the next global jello state.
    JelloportationStarted {
        character: Entity,
        rider: CharacterId,
        jelloporter: Entity,
        new_jello_state: JelloState,
        destination_plate: Entity,
    },
    /// A teleporter reached the plate it was travelling to.
    JelloporterArrivedAtPlate { jelloporter: Entity, plate: Entity },
    /// A rider left the teleporter onto a plate.
    PlayerExitingJelloporter {
        jelloporter: Entity,
        character: Entity,
        plate: Entity,
    },
    /// The rider landed after exiting; teleporters may accept riders again.
    JelloportationFinished {
        character: Entity,
        jelloporter: Entity,
    },
    /// Control moved from one playable character to the other.
    CharacterSwitch { from: CharacterId, to: CharacterId },
    /// A monster touched a character.
    MonsterAttackedPlayer { character: Entity, monster: Entity },
    /// A character's kick reached a monster.
    PlayerAttackedMonster { character: Entity, monster: Entity },
    /// An obstacle button was toggled by a touch or a kick.
    ObstacleButtonChanged { button: Entity, pressed: bool },
    /// A plate-triggered cut-scene is about to take over the screen.
    CutSceneStarting,
    /// A cut-scene sequence faded out completely.
    CutSceneFinished,
}

/// Discriminant of a [`Signal`], used as the subscription key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalKind {
    StateStarted,
    StateEnding,
    ButtonPressed,
    ButtonReleased,
    MenuButtonPressed,
    MenuClosed,
    AttackLockReleased,
    AttackAnimationFinished,
    PlayerHitJelloporter,
    JelloportationStarted,
    JelloporterArrivedAtPlate,
    PlayerExitingJelloporter,
    JelloportationFinished,
    CharacterSwitch,
    MonsterAttackedPlayer,
    PlayerAttackedMonster,
    ObstacleButtonChanged,
    CutSceneStarting,
    CutSceneFinished,
}

impl SignalKind {
    pub const ALL: [SignalKind; 19] = [
        SignalKind::StateStarted,
        SignalKind::StateEnding,
        SignalKind::ButtonPressed,
        SignalKind::ButtonReleased,
        SignalKind::MenuButtonPressed,
        SignalKind::MenuClosed,
        SignalKind::AttackLockReleased,
        SignalKind::AttackAnimationFinished,
        SignalKind::PlayerHitJelloporter,
        SignalKind::JelloportationStarted,
        SignalKind::JelloporterArrivedAtPlate,
        SignalKind::PlayerExitingJelloporter,
        SignalKind::JelloportationFinished,
        SignalKind::CharacterSwitch,
        SignalKind::MonsterAttackedPlayer,
        SignalKind::PlayerAttackedMonster,
        SignalKind::ObstacleButtonChanged,
        SignalKind::CutSceneStarting,
        SignalKind::CutSceneFinished,
    ];
}

impl Signal {
    /// The subscription key this signal is delivered under.
    pub fn kind(&self) -> SignalKind {
        match self {
            Signal::StateStarted { .. } => SignalKind::StateStarted,
            Signal::StateEnding { .. } => SignalKind::StateEnding,
            Signal::ButtonPressed(_) => SignalKind::ButtonPressed,
            Signal::ButtonReleased(_) => SignalKind::ButtonReleased,
            Signal::MenuButtonPressed(_) => SignalKind::MenuButtonPressed,
            Signal::MenuClosed => SignalKind::MenuClosed,
            Signal::AttackLockReleased { .. } => SignalKind::AttackLockReleased,
            Signal::AttackAnimationFinished { .. } => SignalKind::AttackAnimationFinished,
            Signal::PlayerHitJelloporter { .. } => SignalKind::PlayerHitJelloporter,
            Signal::JelloportationStarted { .. } => SignalKind::JelloportationStarted,
            Signal::JelloporterArrivedAtPlate { .. } => SignalKind::JelloporterArrivedAtPlate,
            Signal::PlayerExitingJelloporter { .. } => SignalKind::PlayerExitingJelloporter,
            Signal::JelloportationFinished { .. } => SignalKind::JelloportationFinished,
            Signal::CharacterSwitch { .. } => SignalKind::CharacterSwitch,
            Signal::MonsterAttackedPlayer { .. } => SignalKind::MonsterAttackedPlayer,
            Signal::PlayerAttackedMonster { .. } => SignalKind::PlayerAttackedMonster,
            Signal::ObstacleButtonChanged { .. } => SignalKind::ObstacleButtonChanged,
            Signal::CutSceneStarting => SignalKind::CutSceneStarting,
            Signal::CutSceneFinished => SignalKind::CutSceneFinished,
        }
    }
}
