//! Read-only snapshot of jelloporters and plates.
//!
//! Character states need to know where a jelloporter and its plates are
//! without querying those entities directly. The
//! [`refresh_directory`](crate::systems::directory::refresh_directory) system
//! rebuilds this resource every frame right after the jelloporters move.
use bevy_ecs::prelude::{Entity, Resource};
use glam::Vec2;
use rustc_hash::FxHashMap;

use crate::components::jelloporter::{JelloState, Jelloporter, JelloporterColor, PlateSide};

#[derive(Debug, Clone, Copy)]
pub struct JelloporterEntry {
    pub position: Vec2,
    pub color: JelloporterColor,
    pub top_plate: Entity,
    pub bottom_plate: Entity,
    pub responds_to_collisions: bool,
}

#[derive(Debug, Clone)]
pub struct PlateEntry {
    pub position: Vec2,
    pub jelloporter: Entity,
    pub side: PlateSide,
    pub exit_right: bool,
    pub name: String,
}

#[derive(Resource, Debug, Clone, Default)]
pub struct JelloporterDirectory {
    pub jelloporters: FxHashMap<Entity, JelloporterEntry>,
    pub plates: FxHashMap<Entity, PlateEntry>,
}

impl JelloporterDirectory {
    pub fn insert_jelloporter(&mut self, entity: Entity, jelloporter: &Jelloporter, position: Vec2) {
        self.jelloporters.insert(
            entity,
            JelloporterEntry {
                position,
                color: jelloporter.color,
                top_plate: jelloporter.top_plate,
                bottom_plate: jelloporter.bottom_plate,
                responds_to_collisions: jelloporter.responds_to_collisions,
            },
        );
    }

    pub fn jelloporter(&self, entity: Entity) -> Option<&JelloporterEntry> {
        self.jelloporters.get(&entity)
    }

    pub fn plate(&self, entity: Entity) -> Option<&PlateEntry> {
        self.plates.get(&entity)
    }

    pub fn plate_by_name(&self, name: &str) -> Option<Entity> {
        self.plates
            .iter()
            .find(|(_, plate)| plate.name == name)
            .map(|(entity, _)| *entity)
    }

    /// Plate entity on `side` of `jelloporter`.
    pub fn plate_on(&self, jelloporter: Entity, side: PlateSide) -> Option<Entity> {
        let entry = self.jelloporter(jelloporter)?;
        Some(match side {
            PlateSide::Top => entry.top_plate,
            PlateSide::Bottom => entry.bottom_plate,
        })
    }

    /// Side of the plate `jelloporter` currently stands closest to.
    pub fn nearest_side(&self, jelloporter: Entity) -> Option<PlateSide> {
        let entry = self.jelloporter(jelloporter)?;
        let top = self.plate(entry.top_plate)?.position;
        let bottom = self.plate(entry.bottom_plate)?.position;
        Some(Jelloporter::nearest_side(entry.position, top, bottom))
    }

    /// Global state that would send `jelloporter` to its far plate.
    pub fn next_state(&self, jelloporter: Entity) -> Option<JelloState> {
        let side = self.nearest_side(jelloporter)?;
        Some(self.jelloporter(jelloporter)?.color.choose_next_state(side))
    }

    /// Plate `jelloporter` travels to under `state`.
    pub fn destination(&self, jelloporter: Entity, state: JelloState) -> Option<Entity> {
        let color = self.jelloporter(jelloporter)?.color;
        self.plate_on(jelloporter, color.choose_destination(state))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy_ecs::world::World;

    #[test]
    fn destination_of_next_state_is_far_plate() {
        let mut world = World::new();
        let porter = world.spawn_empty().id();
        let top = world.spawn_empty().id();
        let bottom = world.spawn_empty().id();
        let mut dir = JelloporterDirectory::default();
        for (entity, side, y) in [(top, PlateSide::Top, 10.0), (bottom, PlateSide::Bottom, 0.0)] {
            dir.plates.insert(
                entity,
                PlateEntry {
                    position: Vec2::new(0.0, y),
                    jelloporter: porter,
                    side,
                    exit_right: true,
                    name: format!("{side:?}"),
                },
            );
        }
        for color in [JelloporterColor::Pink, JelloporterColor::Green] {
            for (y, far) in [(1.0, top), (9.0, bottom)] {
                let jp = Jelloporter {
                    color,
                    top_plate: top,
                    bottom_plate: bottom,
                    move_speed: 1.0,
                    responds_to_collisions: true,
                };
                dir.insert_jelloporter(porter, &jp, Vec2::new(0.0, y));
                let next = dir.next_state(porter).unwrap();
                assert_eq!(dir.destination(porter, next), Some(far));
            }
        }
        assert_eq!(dir.plate_by_name("Top"), Some(top));
        assert_eq!(dir.plate_by_name("Nowhere"), None);
    }
}
