//! Body integration and the solid-geometry collision feed.
//!
//! Non-frozen bodies integrate their enabled forces and velocity, then are
//! pushed out of [`Solid`] boxes one axis at a time. Horizontal velocity is
//! kept when a wall stops the body, so a character running into a wall keeps
//! pressing against it. [`Sensors`] are refreshed afterwards by sampling a thin
//! band below and beside each body.
//!
//! A body that is itself [`Solid`] (an ice block) is a moving solid: it
//! collides with every other solid. Moving solids go first, so the bodies
//! resting on or pushing against them resolve against where they ended up.
use bevy_ecs::prelude::*;
use glam::Vec2;

use crate::components::boxcollider::BoxCollider;
use crate::components::mapposition::MapPosition;
use crate::components::rigidbody::RigidBody;
use crate::components::sensors::Sensors;
use crate::components::solid::Solid;
use crate::resources::worldtime::WorldTime;

/// Tolerance under which touching boxes do not count as overlapping.
const SKIN: f32 = 1e-3;

#[derive(Debug, Clone, Copy)]
struct Aabb {
    min: Vec2,
    max: Vec2,
}

impl Aabb {
    fn of(collider: &BoxCollider, position: Vec2) -> Self {
        let (min, max) = collider.aabb(position);
        Self { min, max }
    }

    fn shifted(self, by: Vec2) -> Self {
        Self {
            min: self.min + by,
            max: self.max + by,
        }
    }

    fn penetrates(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x - SKIN
            && self.max.x > other.min.x + SKIN
            && self.min.y < other.max.y - SKIN
            && self.max.y > other.min.y + SKIN
    }
}

/// Solid boxes of the frame, tagged with their entity so a moving solid can
/// skip itself.
type SolidSet = Vec<(Entity, Aabb)>;

fn others(solids: &SolidSet, me: Entity) -> impl Iterator<Item = &Aabb> {
    solids
        .iter()
        .filter(move |(entity, _)| *entity != me)
        .map(|(_, aabb)| aabb)
}

fn resolve_x<'a>(
    pos: &mut Vec2,
    collider: &BoxCollider,
    vx: f32,
    solids: impl Iterator<Item = &'a Aabb>,
) {
    for solid in solids {
        let body = Aabb::of(collider, *pos);
        if !body.penetrates(solid) {
            continue;
        }
        if vx > 0.0 {
            pos.x -= body.max.x - solid.min.x;
        } else if vx < 0.0 {
            pos.x += solid.max.x - body.min.x;
        }
    }
}

fn resolve_y<'a>(
    pos: &mut Vec2,
    collider: &BoxCollider,
    velocity: &mut Vec2,
    solids: impl Iterator<Item = &'a Aabb>,
) {
    for solid in solids {
        let body = Aabb::of(collider, *pos);
        if !body.penetrates(solid) {
            continue;
        }
        if velocity.y < 0.0 {
            pos.y += solid.max.y - body.min.y;
            velocity.y = 0.0;
        } else if velocity.y > 0.0 {
            pos.y -= body.max.y - solid.min.y;
            velocity.y = 0.0;
        }
    }
}

/// Sensor readings for a body at `pos`.
fn sense(collider: &BoxCollider, pos: Vec2, solids: &SolidSet, me: Entity) -> Sensors {
    let body = Aabb::of(collider, pos);
    let reach = SKIN * 2.0;
    let hits = |by: Vec2| {
        let shifted = body.shifted(by);
        others(solids, me).any(|s| shifted.penetrates(s))
    };
    Sensors {
        grounded: hits(Vec2::new(0.0, -reach)),
        blocked_left: hits(Vec2::new(-reach, 0.0)),
        blocked_right: hits(Vec2::new(reach, 0.0)),
    }
}

pub fn movement_system(
    time: Res<WorldTime>,
    solids: Query<(Entity, &MapPosition, &BoxCollider), (With<Solid>, Without<RigidBody>)>,
    mut bodies: Query<(
        Entity,
        &mut MapPosition,
        &mut RigidBody,
        Option<&BoxCollider>,
        Option<&mut Sensors>,
        Has<Solid>,
    )>,
) {
    let mut solid_set: SolidSet = solids
        .iter()
        .map(|(entity, position, collider)| (entity, Aabb::of(collider, position.pos)))
        .collect();
    for (entity, position, _, collider, _, is_solid) in bodies.iter() {
        if let (true, Some(collider)) = (is_solid, collider) {
            solid_set.push((entity, Aabb::of(collider, position.pos)));
        }
    }
    let dt = time.delta;

    for moving_solids in [true, false] {
        for (entity, mut position, mut body, collider, sensors, is_solid) in bodies.iter_mut() {
            if is_solid != moving_solids {
                continue;
            }
            if !body.frozen {
                let acceleration = body.total_acceleration();
                body.velocity += acceleration * dt;
                let velocity = body.velocity;
                let mut pos = position.pos;

                pos.x += velocity.x * dt;
                if let Some(collider) = collider {
                    resolve_x(&mut pos, collider, velocity.x, others(&solid_set, entity));
                }
                pos.y += velocity.y * dt;
                if let Some(collider) = collider {
                    resolve_y(&mut pos, collider, &mut body.velocity, others(&solid_set, entity));
                }
                position.pos = pos;

                if let (true, Some(collider)) = (is_solid, collider) {
                    if let Some(slot) = solid_set.iter_mut().find(|(e, _)| *e == entity) {
                        slot.1 = Aabb::of(collider, pos);
                    }
                }
            }

            if let (Some(collider), Some(mut sensors)) = (collider, sensors) {
                let reading = sense(collider, position.pos, &solid_set, entity);
                if *sensors != reading {
                    *sensors = reading;
                }
            }
        }
    }
}
