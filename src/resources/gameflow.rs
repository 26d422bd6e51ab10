//! Top-level game flow resource.
use bevy_ecs::prelude::Resource;

use crate::components::character::CharacterId;
use crate::fsm::{MachineState, StateMachine};
use crate::states::gameflow::FlowState;

/// Owns the game-flow machine; only [`FlowState::Play`] grants control.
#[derive(Resource, Debug)]
pub struct GameFlow {
    pub machine: StateMachine<FlowState>,
    initial: FlowState,
}

impl GameFlow {
    pub const MACHINE: &'static str = "game_flow";

    pub fn new() -> Self {
        Self::starting_in(FlowState::start_menu())
    }

    /// Begin somewhere other than the start menu, e.g. to skip straight to play.
    pub fn starting_in(initial: FlowState) -> Self {
        Self {
            machine: StateMachine::new(Self::MACHINE),
            initial,
        }
    }

    pub fn initial(&self) -> FlowState {
        self.initial
    }

    pub fn active_character(&self) -> Option<CharacterId> {
        self.machine.current().and_then(FlowState::active_character)
    }

    pub fn state_label(&self) -> Option<&'static str> {
        self.machine.current().map(|s| s.label())
    }
}

impl Default for GameFlow {
    fn default() -> Self {
        Self::new()
    }
}
