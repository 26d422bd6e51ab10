//! Logical input buttons.
//!
//! This module defines [`MoveButton`], the fixed set of gameplay buttons the
//! [`InputState`](crate::resources::input::InputState) latches every frame,
//! and [`MenuButton`], the buttons a UI layer can report directly.
//!
//! Press and release edges travel over the
//! [`SignalBus`](crate::resources::signalbus::SignalBus) as
//! [`Signal::ButtonPressed`](crate::events::signal::Signal::ButtonPressed) and
//! [`Signal::ButtonReleased`](crate::events::signal::Signal::ButtonReleased).

use serde::{Deserialize, Serialize};

/// Enumeration of logical gameplay buttons.
///
/// These abstract the physical keys and pad buttons into gameplay-meaningful
/// actions. The order of [`MoveButton::ALL`] is the order in which edges are
/// published when several buttons change in the same frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveButton {
    /// Move left (default: A, stick/d-pad left).
    Left,
    /// Move right (default: D, stick/d-pad right).
    Right,
    /// Jump, also "menu up" (default: W, stick/d-pad up).
    Jump,
    /// Kick, also "confirm" (default: Space, pad button 0).
    Attack,
    /// Switch character, also "confirm" (default: E, pad button 1).
    Switch,
    /// Down, also "menu down" (default: S, stick/d-pad down).
    Down,
}

impl MoveButton {
    /// Every button, in publication order.
    pub const ALL: [MoveButton; 6] = [
        MoveButton::Left,
        MoveButton::Right,
        MoveButton::Jump,
        MoveButton::Attack,
        MoveButton::Switch,
        MoveButton::Down,
    ];

    /// Dense index used by the input latch arrays.
    pub fn index(self) -> usize {
        match self {
            MoveButton::Left => 0,
            MoveButton::Right => 1,
            MoveButton::Jump => 2,
            MoveButton::Attack => 3,
            MoveButton::Switch => 4,
            MoveButton::Down => 5,
        }
    }

    /// Whether the button is one of the two horizontal directions.
    pub fn is_horizontal(self) -> bool {
        matches!(self, MoveButton::Left | MoveButton::Right)
    }

    /// Whether the button confirms a menu entry or advances a cut-scene.
    pub fn is_confirm(self) -> bool {
        matches!(self, MoveButton::Attack | MoveButton::Switch)
    }
}

/// Buttons reported by an on-screen UI rather than by the input latch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MenuButton {
    Start,
}
