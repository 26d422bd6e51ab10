//! Game flow update.
use bevy_ecs::prelude::*;
use log::info;

use crate::resources::gameflow::GameFlow;
use crate::resources::signalbus::SignalBus;
use crate::states::gameflow::FlowContext;

pub fn game_flow_system(mut flow: ResMut<GameFlow>, bus: NonSend<SignalBus>) {
    let initial = flow.initial();
    let starting = !flow.machine.is_started();
    let mut ctx = FlowContext { bus: &bus };
    let transition = flow.machine.update(&mut ctx, &bus, || initial);
    if starting {
        info!("game flow: starting in {:?}", initial);
    }
    if let Some(t) = transition {
        info!("game flow: {} -> {}", t.from, t.to);
    }
}
