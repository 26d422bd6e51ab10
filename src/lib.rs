//! Jellojump game core.
//!
//! Signal-driven state machines for a two-character platformer with
//! teleporting jello pads, on top of `bevy_ecs`. The library exposes the
//! components, resources, systems and state machines for the headless runner
//! and for integration tests.

pub mod components;
pub mod events;
pub mod fsm;
pub mod game;
pub mod level;
pub mod resources;
pub mod states;
pub mod systems;
