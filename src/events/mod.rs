//! Signal types exchanged across state machines.
//!
//! Everything that crosses from one owner (character, teleporter, game flow,
//! cut-scene director, monster, menu) to another travels as a
//! [`signal::Signal`] through the
//! [`SignalBus`](crate::resources::signalbus::SignalBus). No state machine
//! reaches into another one directly.
//!
//! Submodules:
//! - [`input`] – logical gameplay and UI buttons
//! - [`signal`] – the closed signal enum and its subscription keys
pub mod input;
pub mod signal;
