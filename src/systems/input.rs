//! Publish button edges.
//!
//! Compares the frame's [`RawButtons`] with the latched [`InputState`] and
//! publishes one [`Signal::ButtonPressed`] / [`Signal::ButtonReleased`] per
//! change. This is the only place gameplay input enters the signal bus.
use bevy_ecs::prelude::*;

use crate::events::signal::Signal;
use crate::resources::input::{ButtonEdge, InputState, RawButtons};
use crate::resources::signalbus::SignalBus;

pub fn input_system(raw: Res<RawButtons>, mut input: ResMut<InputState>, bus: NonSend<SignalBus>) {
    for edge in input.update(&raw) {
        bus.publish(match edge {
            ButtonEdge::Pressed(button) => Signal::ButtonPressed(button),
            ButtonEdge::Released(button) => Signal::ButtonReleased(button),
        });
    }
}
