//! Main menu update.
use bevy_ecs::prelude::*;

use crate::resources::menu::MainMenu;
use crate::resources::signalbus::SignalBus;
use crate::states::menu::{MenuContext, MenuState};

pub fn menu_system(mut menu: ResMut<MainMenu>, bus: NonSend<SignalBus>) {
    let mut ctx = MenuContext { bus: &bus };
    menu.machine.update(&mut ctx, &bus, MenuState::start);
}
