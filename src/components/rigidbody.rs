//! Kinematic body: velocity plus named constant accelerations.
//!
//! Characters carry a single `"gravity"` force. While a state drives the
//! position directly (entering or riding a jelloporter, dying) the body is
//! [`frozen`](RigidBody::frozen) and the movement system leaves it alone.

use bevy_ecs::prelude::Component;
use glam::Vec2;
use rustc_hash::FxHashMap;

/// Velocity and accelerations consumed by
/// [`movement_system`](crate::systems::movement::movement_system).
///
/// ```ignore
/// let mut body = RigidBody::with_gravity(-20.0);
/// body.set_velocity(Vec2::new(3.0, 6.0));
/// ```
#[derive(Component, Clone, Debug, Default)]
pub struct RigidBody {
    /// World units per second.
    pub velocity: Vec2,
    pub forces: FxHashMap<String, Vec2>,
    pub frozen: bool,
}

impl RigidBody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_gravity(gravity: f32) -> Self {
        let mut body = Self::new();
        body.add_force("gravity", Vec2::new(0.0, gravity));
        body
    }

    /// Add or replace the acceleration called `name`.
    pub fn add_force(&mut self, name: &str, value: Vec2) {
        self.forces.insert(name.to_string(), value);
    }

    pub fn total_acceleration(&self) -> Vec2 {
        self.forces.values().fold(Vec2::ZERO, |acc, f| acc + *f)
    }

    pub fn set_velocity(&mut self, velocity: Vec2) {
        self.velocity = velocity;
    }

    /// Stop the body and hand its position over to the caller.
    pub fn freeze(&mut self) {
        self.frozen = true;
        self.velocity = Vec2::ZERO;
    }

    pub fn unfreeze(&mut self) {
        self.frozen = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forces_sum_up() {
        let mut body = RigidBody::with_gravity(-20.0);
        body.add_force("wind", Vec2::new(1.0, 0.0));
        assert_eq!(body.total_acceleration(), Vec2::new(1.0, -20.0));
        body.add_force("gravity", Vec2::new(0.0, -10.0));
        assert_eq!(body.total_acceleration(), Vec2::new(1.0, -10.0));
    }

    #[test]
    fn freeze_stops_body() {
        let mut body = RigidBody::new();
        body.set_velocity(Vec2::new(3.0, 4.0));
        body.freeze();
        assert!(body.frozen);
        assert_eq!(body.velocity, Vec2::ZERO);
        body.unfreeze();
        assert!(!body.frozen);
    }
}
