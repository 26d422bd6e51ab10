//! Main menu resource.
use bevy_ecs::prelude::Resource;

use crate::fsm::{MachineState, StateMachine};
use crate::states::menu::{MenuItem, MenuState};

#[derive(Resource, Debug)]
pub struct MainMenu {
    pub machine: StateMachine<MenuState>,
}

impl MainMenu {
    pub fn new() -> Self {
        Self {
            machine: StateMachine::new("main_menu"),
        }
    }

    /// Highlighted item, `None` once the menu has closed.
    pub fn selected(&self) -> Option<MenuItem> {
        match self.machine.current() {
            Some(state) => state.selected(),
            None => Some(MenuItem::Start),
        }
    }

    pub fn info_open(&self) -> bool {
        matches!(self.machine.current(), Some(MenuState::Info { .. }))
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.machine.current(), Some(MenuState::Closed))
    }

    pub fn state_label(&self) -> Option<&'static str> {
        self.machine.current().map(|s| s.label())
    }
}

impl Default for MainMenu {
    fn default() -> Self {
        Self::new()
    }
}
