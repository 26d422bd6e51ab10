//! Contact sensors fed by the movement system.
use bevy_ecs::prelude::Component;

/// Boolean contact latches refreshed once per frame by
/// [`movement_system`](crate::systems::movement::movement_system).
#[derive(Component, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Sensors {
    pub grounded: bool,
    pub blocked_left: bool,
    pub blocked_right: bool,
}
