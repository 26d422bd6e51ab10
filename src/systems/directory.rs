//! Rebuild the [`JelloporterDirectory`] snapshot.
use bevy_ecs::prelude::*;

use crate::components::jelloporter::{JelloPlate, Jelloporter};
use crate::components::mapposition::MapPosition;
use crate::resources::directory::{JelloporterDirectory, PlateEntry};

pub fn refresh_directory(
    mut directory: ResMut<JelloporterDirectory>,
    jelloporters: Query<(Entity, &Jelloporter, &MapPosition)>,
    plates: Query<(Entity, &JelloPlate, &MapPosition)>,
) {
    directory.jelloporters.clear();
    directory.plates.clear();
    for (entity, jelloporter, position) in jelloporters.iter() {
        directory.insert_jelloporter(entity, jelloporter, position.pos);
    }
    for (entity, plate, position) in plates.iter() {
        directory.plates.insert(
            entity,
            PlateEntry {
                position: position.pos,
                jelloporter: plate.jelloporter,
                side: plate.side,
                exit_right: plate.exit_right,
                name: plate.name.clone(),
            },
        );
    }
}
