//! Jelloporter behaviour.
//!
//! `Idle` accepts riders and listens for [`Signal::JelloportationStarted`].
//! The addressed jelloporter always travels to the plate chosen by the new
//! global jello state; every other idle jelloporter travels only if that state
//! sends it away from the plate it stands on. `JumpTo` moves to the target
//! plate, announces arrival once, and returns to `Idle` after the rider has
//! landed ([`Signal::JelloportationFinished`]). The jelloporter carrying the
//! rider only accepts the finish naming itself; a bystander accepts any.

use bevy_ecs::prelude::Entity;
use log::{debug, warn};

use crate::components::animation::Animator;
use crate::components::jelloporter::{Jelloporter, PlateSide};
use crate::components::mapposition::MapPosition;
use crate::events::signal::{Signal, SignalKind};
use crate::fsm::MachineState;
use crate::resources::directory::JelloporterDirectory;
use crate::resources::signalbus::SignalBus;

pub struct JelloporterContext<'a> {
    pub entity: Entity,
    pub jelloporter: &'a mut Jelloporter,
    pub position: &'a mut MapPosition,
    pub animator: &'a mut Animator,
    pub bus: &'a SignalBus,
    pub directory: &'a JelloporterDirectory,
    pub delta: f32,
}

impl JelloporterContext<'_> {
    fn nearest_side(&self) -> Option<PlateSide> {
        let top = self.directory.plate(self.jelloporter.top_plate)?.position;
        let bottom = self.directory.plate(self.jelloporter.bottom_plate)?.position;
        Some(Jelloporter::nearest_side(self.position.pos, top, bottom))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JelloporterState {
    Idle {
        /// Target plate, and whether this jelloporter carries the rider.
        pending: Option<(PlateSide, bool)>,
    },
    JumpTo {
        side: PlateSide,
        carrying: bool,
        arrived: bool,
        rider_exited: bool,
        finished: bool,
    },
}

impl JelloporterState {
    pub fn idle() -> Self {
        JelloporterState::Idle { pending: None }
    }

    pub fn jump_to(side: PlateSide, carrying: bool) -> Self {
        JelloporterState::JumpTo {
            side,
            carrying,
            arrived: false,
            rider_exited: false,
            finished: false,
        }
    }
}

impl<'a> MachineState<JelloporterContext<'a>> for JelloporterState {
    fn label(&self) -> &'static str {
        match self {
            JelloporterState::Idle { .. } => "JelloIdle",
            JelloporterState::JumpTo {
                side: PlateSide::Top,
                ..
            } => "JumpToTopPlate",
            JelloporterState::JumpTo {
                side: PlateSide::Bottom,
                ..
            } => "JumpToBottomPlate",
        }
    }

    fn subscriptions(&self) -> &'static [SignalKind] {
        match self {
            JelloporterState::Idle { .. } => &[SignalKind::JelloportationStarted],
            JelloporterState::JumpTo { .. } => &[
                SignalKind::JelloportationFinished,
                SignalKind::PlayerExitingJelloporter,
            ],
        }
    }

    fn enter(&mut self, ctx: &mut JelloporterContext<'a>) {
        match self {
            JelloporterState::Idle { .. } => {
                ctx.jelloporter.responds_to_collisions = true;
                ctx.animator.fire("Idle");
            }
            JelloporterState::JumpTo { .. } => {
                ctx.jelloporter.responds_to_collisions = false;
                ctx.animator.fire("Jump");
            }
        }
    }

    fn on_signal(&mut self, signal: &Signal, ctx: &mut JelloporterContext<'a>) {
        match (self, *signal) {
            (
                JelloporterState::Idle { pending },
                Signal::JelloportationStarted {
                    jelloporter,
                    new_jello_state,
                    ..
                },
            ) => {
                let target = ctx.jelloporter.color.choose_destination(new_jello_state);
                if jelloporter == ctx.entity {
                    *pending = Some((target, true));
                } else if ctx.nearest_side() != Some(target) {
                    debug!(
                        "jelloporter {:?} realigns to {:?} for {:?}",
                        ctx.entity, target, new_jello_state
                    );
                    *pending = Some((target, false));
                }
            }
            (
                JelloporterState::JumpTo {
                    carrying, finished, ..
                },
                Signal::JelloportationFinished { jelloporter, .. },
            ) if !*carrying || jelloporter == ctx.entity => {
                *finished = true;
            }
            (
                JelloporterState::JumpTo { rider_exited, .. },
                Signal::PlayerExitingJelloporter { jelloporter, .. },
            ) if jelloporter == ctx.entity => {
                *rider_exited = true;
            }
            _ => {}
        }
    }

    fn tick(&mut self, ctx: &mut JelloporterContext<'a>) -> Option<Self> {
        match self {
            JelloporterState::Idle { pending } => {
                pending.map(|(side, carrying)| Self::jump_to(side, carrying))
            }
            JelloporterState::JumpTo {
                side,
                arrived,
                rider_exited,
                finished,
                ..
            } => {
                if *rider_exited {
                    ctx.animator.fire("GetExited");
                    *rider_exited = false;
                }
                if !*arrived {
                    let plate = ctx.jelloporter.plate(*side);
                    let Some(target) = ctx.directory.plate(plate).map(|p| p.position) else {
                        warn!("jelloporter {:?} has no plate {:?}", ctx.entity, plate);
                        return Some(Self::idle());
                    };
                    let step = ctx.jelloporter.move_speed * ctx.delta;
                    if ctx.position.move_towards(target, step) == target {
                        *arrived = true;
                        ctx.bus.publish(Signal::JelloporterArrivedAtPlate {
                            jelloporter: ctx.entity,
                            plate,
                        });
                    }
                }
                if *arrived && *finished {
                    Some(Self::idle())
                } else {
                    None
                }
            }
        }
    }
}
