//! World assembly and the frame driver.
//!
//! [`Game`] owns the ECS world and the chained update schedule. Each
//! [`Game::step`] advances [`WorldTime`] and runs the schedule once.

use bevy_ecs::prelude::*;
use log::debug;

use crate::events::input::MoveButton;
use crate::events::signal::SignalKind;
use crate::level::{Level, LevelError, SpawnedLevel};
use crate::resources::cutscene::CutSceneDirector;
use crate::resources::directory::JelloporterDirectory;
use crate::resources::gameconfig::GameConfig;
use crate::resources::gameflow::GameFlow;
use crate::resources::input::{InputState, RawButtons};
use crate::resources::jelloworld::JelloWorld;
use crate::resources::menu::MainMenu;
use crate::resources::signalbus::{SignalBus, SubscriberId};
use crate::resources::worldtime::WorldTime;
use crate::systems::animation::animation_events;
use crate::systems::character::character_system;
use crate::systems::contacts::{ContactPairs, contact_system};
use crate::systems::cutscene::cutscene_system;
use crate::systems::directory::refresh_directory;
use crate::systems::gameflow::game_flow_system;
use crate::systems::iceblock::ice_block_system;
use crate::systems::input::input_system;
use crate::systems::jelloporter::jelloporter_system;
use crate::systems::menu::menu_system;
use crate::systems::monster::monster_system;
use crate::systems::movement::movement_system;
use crate::systems::obstacle::obstacle_system;
use crate::systems::time::update_world_time;

/// The per-frame schedule, strictly ordered.
pub fn build_schedule() -> Schedule {
    let mut update = Schedule::default();
    update.add_systems(
        (
            input_system,
            menu_system,
            game_flow_system,
            cutscene_system,
            jelloporter_system,
            refresh_directory,
            character_system,
            monster_system,
            obstacle_system,
            ice_block_system,
            movement_system,
            contact_system,
            animation_events,
        )
            .chain(),
    );
    update
}

/// Insert every resource the schedule reads.
pub fn install_resources(world: &mut World, config: GameConfig, flow: GameFlow) {
    world.insert_resource(WorldTime::default());
    world.insert_resource(config);
    world.insert_resource(RawButtons::default());
    world.insert_resource(InputState::default());
    world.insert_resource(JelloWorld::default());
    world.insert_resource(JelloporterDirectory::default());
    world.insert_resource(ContactPairs::default());
    world.insert_resource(CutSceneDirector::default());
    world.insert_resource(MainMenu::new());
    world.insert_resource(flow);
    world.insert_non_send_resource(SignalBus::new());
}

pub struct Game {
    pub world: World,
    schedule: Schedule,
}

impl Game {
    pub fn new(config: GameConfig) -> Self {
        Self::with_flow(config, GameFlow::new())
    }

    /// Start the game flow somewhere other than the start menu.
    pub fn with_flow(config: GameConfig, flow: GameFlow) -> Self {
        let mut world = World::new();
        install_resources(&mut world, config, flow);
        Self {
            world,
            schedule: build_schedule(),
        }
    }

    /// Spawn `level` and take a first directory snapshot.
    pub fn load_level(&mut self, level: &Level) -> Result<SpawnedLevel, LevelError> {
        let spawned = level.spawn(&mut self.world)?;
        let mut once = Schedule::default();
        once.add_systems(refresh_directory);
        once.run(&mut self.world);
        Ok(spawned)
    }

    /// Advance one frame of `dt` seconds.
    pub fn step(&mut self, dt: f32) {
        update_world_time(&mut self.world, dt);
        self.schedule.run(&mut self.world);
    }

    pub fn frame(&self) -> u64 {
        self.world.resource::<WorldTime>().frame_count
    }

    pub fn bus(&self) -> &SignalBus {
        self.world.non_send_resource::<SignalBus>()
    }

    pub fn set_button(&mut self, button: MoveButton, down: bool) {
        self.world.resource_mut::<RawButtons>().set(button, down);
    }

    pub fn raw_buttons_mut(&mut self) -> Mut<'_, RawButtons> {
        self.world.resource_mut::<RawButtons>()
    }

    /// Log every published signal at debug level.
    pub fn log_signals(&self) -> SubscriberId {
        let bus = self.bus();
        let id = bus.register_handler(|signal, _| debug!("signal {:?}", signal));
        for kind in SignalKind::ALL {
            bus.subscribe(kind, id);
        }
        id
    }

    pub fn reload_requested(&self) -> bool {
        self.world.resource::<CutSceneDirector>().scene_reload_requested
    }
}
