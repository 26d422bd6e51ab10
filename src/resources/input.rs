//! Per-frame gameplay input resources.
//!
//! [`RawButtons`] is written by whatever polls the device (the headless
//! runner's input script, or a test) and holds the raw "is down" value of
//! every [`MoveButton`]. [`InputState`] keeps the latched value from the
//! previous frame; [`InputState::update`] compares the two and reports edges,
//! which the [`input system`](crate::systems::input::input_system) publishes as
//! press/release signals.
use arrayvec::ArrayVec;
use bevy_ecs::prelude::*;

use crate::events::input::MoveButton;

/// Raw device state for the current frame.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RawButtons {
    pub down: [bool; 6],
}

impl RawButtons {
    pub fn set(&mut self, button: MoveButton, down: bool) {
        self.down[button.index()] = down;
    }

    pub fn is_down(&self, button: MoveButton) -> bool {
        self.down[button.index()]
    }
}

/// A change of a latched button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonEdge {
    Pressed(MoveButton),
    Released(MoveButton),
}

/// Latched button state, queried synchronously by state logic.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct InputState {
    latches: [bool; 6],
}

impl InputState {
    /// Latch `raw` and return the edges, in [`MoveButton::ALL`] order.
    ///
    /// Holding a button produces no further edges.
    pub fn update(&mut self, raw: &RawButtons) -> ArrayVec<ButtonEdge, 6> {
        let mut edges = ArrayVec::new();
        for button in MoveButton::ALL {
            let i = button.index();
            let now = raw.down[i];
            if now != self.latches[i] {
                self.latches[i] = now;
                edges.push(if now {
                    ButtonEdge::Pressed(button)
                } else {
                    ButtonEdge::Released(button)
                });
            }
        }
        edges
    }

    pub fn is_down(&self, button: MoveButton) -> bool {
        self.latches[button.index()]
    }

    /// Horizontal direction currently held. Left wins when both are down.
    pub fn horizontal(&self) -> Option<MoveButton> {
        if self.is_down(MoveButton::Left) {
            Some(MoveButton::Left)
        } else if self.is_down(MoveButton::Right) {
            Some(MoveButton::Right)
        } else {
            None
        }
    }

    /// Set a latch directly, bypassing edge detection.
    pub fn force(&mut self, button: MoveButton, down: bool) {
        self.latches[button.index()] = down;
    }
}
