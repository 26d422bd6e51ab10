//! Main menu: a Start / Info selector with an info screen.
use log::info;

use crate::events::input::{MenuButton, MoveButton};
use crate::events::signal::{Signal, SignalKind};
use crate::fsm::MachineState;
use crate::resources::signalbus::SignalBus;

pub struct MenuContext<'a> {
    pub bus: &'a SignalBus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MenuItem {
    #[default]
    Start,
    Info,
}

impl MenuItem {
    pub fn toggled(self) -> Self {
        match self {
            MenuItem::Start => MenuItem::Info,
            MenuItem::Info => MenuItem::Start,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuState {
    Browse {
        selected: MenuItem,
        confirmed: bool,
        /// Closed from the UI button; nothing left to announce.
        dismissed: bool,
    },
    Info {
        back: bool,
    },
    Closed,
}

impl MenuState {
    pub fn browse(selected: MenuItem) -> Self {
        MenuState::Browse {
            selected,
            confirmed: false,
            dismissed: false,
        }
    }

    pub fn start() -> Self {
        Self::browse(MenuItem::Start)
    }

    pub fn selected(&self) -> Option<MenuItem> {
        match self {
            MenuState::Browse { selected, .. } => Some(*selected),
            MenuState::Info { .. } => Some(MenuItem::Info),
            MenuState::Closed => None,
        }
    }
}

impl<'a> MachineState<MenuContext<'a>> for MenuState {
    fn label(&self) -> &'static str {
        match self {
            MenuState::Browse { .. } => "Browse",
            MenuState::Info { .. } => "InfoScreen",
            MenuState::Closed => "Closed",
        }
    }

    fn subscriptions(&self) -> &'static [SignalKind] {
        match self {
            MenuState::Browse { .. } => &[SignalKind::ButtonPressed, SignalKind::MenuButtonPressed],
            MenuState::Info { .. } => &[SignalKind::ButtonPressed],
            MenuState::Closed => &[],
        }
    }

    fn on_signal(&mut self, signal: &Signal, _ctx: &mut MenuContext<'a>) {
        match (&mut *self, *signal) {
            (
                MenuState::Browse { selected, .. },
                Signal::ButtonPressed(MoveButton::Jump | MoveButton::Down),
            ) => *selected = selected.toggled(),
            (MenuState::Browse { confirmed, .. }, Signal::ButtonPressed(button))
                if button.is_confirm() =>
            {
                *confirmed = true
            }
            (MenuState::Browse { dismissed, .. }, Signal::MenuButtonPressed(MenuButton::Start)) => {
                *dismissed = true
            }
            (MenuState::Info { back }, Signal::ButtonPressed(button)) if button.is_confirm() => {
                *back = true
            }
            _ => {}
        }
    }

    fn tick(&mut self, ctx: &mut MenuContext<'a>) -> Option<Self> {
        match *self {
            MenuState::Browse {
                dismissed: true, ..
            } => Some(MenuState::Closed),
            MenuState::Browse {
                confirmed: true,
                selected: MenuItem::Start,
                ..
            } => {
                info!("menu: start selected");
                ctx.bus.publish(Signal::MenuClosed);
                Some(MenuState::Closed)
            }
            MenuState::Browse {
                confirmed: true,
                selected: MenuItem::Info,
                ..
            } => Some(MenuState::Info { back: false }),
            MenuState::Info { back: true } => Some(Self::browse(MenuItem::Info)),
            _ => None,
        }
    }
}
