//! Cut-scene director update.
use bevy_ecs::prelude::*;
use log::info;

use crate::resources::cutscene::CutSceneDirector;
use crate::resources::gameconfig::GameConfig;
use crate::resources::signalbus::SignalBus;
use crate::resources::worldtime::WorldTime;
use crate::states::cutscene::{CutSceneContext, CutSceneState};

pub fn cutscene_system(
    mut director: ResMut<CutSceneDirector>,
    bus: NonSend<SignalBus>,
    config: Res<GameConfig>,
    time: Res<WorldTime>,
) {
    let director = &mut *director;
    if director.stage.input_delay > 0.0 {
        director.stage.input_delay -= time.delta;
    }
    let mut ctx = CutSceneContext {
        library: &mut director.library,
        stage: &mut director.stage,
        bus: &bus,
        fade_speed: config.fade_speed,
        black_delay: config.black_delay,
        input_delay: config.input_delay,
        delta: time.delta,
        reload_requested: &mut director.scene_reload_requested,
    };
    if let Some(t) = director.machine.update(&mut ctx, &bus, CutSceneState::black) {
        info!("cut-scene: {} -> {}", t.from, t.to);
    }
}
