//! Top-level game flow.
//!
//! ```text
//! StartMenu ──MenuClosed──▶ Intro ──CutSceneFinished──▶ Play(First)
//! Play(c) ──Switch press / CharacterSwitch──▶ Play(other)
//! Play(c) ──JelloportationStarted──▶ Jelloport(rider) ──JelloportationFinished──▶ Play(rider)
//! Play(c) | Jelloport(c) ──CutSceneStarting──▶ WaitForCutscene(c) ──CutSceneFinished──▶ Play(c)
//! ```
//!
//! Every transition is triggered by a bus signal; the flow never polls.

use bevy_ecs::prelude::Entity;

use crate::components::character::CharacterId;
use crate::events::input::{MenuButton, MoveButton};
use crate::events::signal::{Signal, SignalKind};
use crate::fsm::MachineState;
use crate::resources::signalbus::SignalBus;

pub struct FlowContext<'a> {
    pub bus: &'a SignalBus,
}

/// What a flow state decided to do on its next tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowMove {
    Advance,
    /// The player asked to switch; announce it, then hand over control.
    RequestSwitch,
    Follow(CharacterId),
    Jelloport {
        rider: CharacterId,
        destination: Entity,
    },
    Cutscene,
}

impl FlowMove {
    fn rank(self) -> u8 {
        match self {
            FlowMove::Advance | FlowMove::RequestSwitch | FlowMove::Follow(_) => 0,
            FlowMove::Jelloport { .. } => 1,
            FlowMove::Cutscene => 2,
        }
    }
}

fn offer(slot: &mut Option<FlowMove>, next: FlowMove) {
    match slot {
        Some(current) if current.rank() > next.rank() => {}
        _ => *slot = Some(next),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
    StartMenu {
        next: Option<FlowMove>,
    },
    Intro {
        next: Option<FlowMove>,
    },
    Play {
        character: CharacterId,
        next: Option<FlowMove>,
    },
    Jelloport {
        rider: CharacterId,
        destination: Entity,
        next: Option<FlowMove>,
    },
    WaitForCutscene {
        resume: CharacterId,
        next: Option<FlowMove>,
    },
}

impl FlowState {
    pub fn start_menu() -> Self {
        FlowState::StartMenu { next: None }
    }

    pub fn intro() -> Self {
        FlowState::Intro { next: None }
    }

    pub fn play(character: CharacterId) -> Self {
        FlowState::Play {
            character,
            next: None,
        }
    }

    /// The character receiving input, only while playing.
    pub fn active_character(&self) -> Option<CharacterId> {
        match self {
            FlowState::Play { character, .. } => Some(*character),
            _ => None,
        }
    }

    fn next_mut(&mut self) -> &mut Option<FlowMove> {
        match self {
            FlowState::StartMenu { next }
            | FlowState::Intro { next }
            | FlowState::Play { next, .. }
            | FlowState::Jelloport { next, .. }
            | FlowState::WaitForCutscene { next, .. } => next,
        }
    }
}

impl<'a> MachineState<FlowContext<'a>> for FlowState {
    fn label(&self) -> &'static str {
        match self {
            FlowState::StartMenu { .. } => "StartMenu",
            FlowState::Intro { .. } => "Intro",
            FlowState::Play {
                character: CharacterId::First,
                ..
            } => "PlayFirst",
            FlowState::Play {
                character: CharacterId::Second,
                ..
            } => "PlaySecond",
            FlowState::Jelloport { .. } => "Jelloport",
            FlowState::WaitForCutscene { .. } => "WaitForCutscene",
        }
    }

    fn subscriptions(&self) -> &'static [SignalKind] {
        match self {
            FlowState::StartMenu { .. } => &[SignalKind::MenuClosed, SignalKind::MenuButtonPressed],
            FlowState::Intro { .. } | FlowState::WaitForCutscene { .. } => {
                &[SignalKind::CutSceneFinished]
            }
            FlowState::Play { .. } => &[
                SignalKind::ButtonPressed,
                SignalKind::CharacterSwitch,
                SignalKind::JelloportationStarted,
                SignalKind::CutSceneStarting,
            ],
            FlowState::Jelloport { .. } => &[
                SignalKind::JelloportationFinished,
                SignalKind::CutSceneStarting,
            ],
        }
    }

    fn on_signal(&mut self, signal: &Signal, _ctx: &mut FlowContext<'a>) {
        let decided = match (&*self, *signal) {
            (FlowState::StartMenu { .. }, Signal::MenuClosed)
            | (FlowState::StartMenu { .. }, Signal::MenuButtonPressed(MenuButton::Start))
            | (FlowState::Intro { .. }, Signal::CutSceneFinished)
            | (FlowState::WaitForCutscene { .. }, Signal::CutSceneFinished)
            | (FlowState::Jelloport { .. }, Signal::JelloportationFinished { .. }) => {
                Some(FlowMove::Advance)
            }
            (FlowState::Play { .. }, Signal::ButtonPressed(MoveButton::Switch)) => {
                Some(FlowMove::RequestSwitch)
            }
            (FlowState::Play { character, .. }, Signal::CharacterSwitch { to, .. })
                if to != *character =>
            {
                Some(FlowMove::Follow(to))
            }
            (
                FlowState::Play { .. },
                Signal::JelloportationStarted {
                    rider,
                    destination_plate,
                    ..
                },
            ) => Some(FlowMove::Jelloport {
                rider,
                destination: destination_plate,
            }),
            (FlowState::Play { .. } | FlowState::Jelloport { .. }, Signal::CutSceneStarting) => {
                Some(FlowMove::Cutscene)
            }
            _ => None,
        };
        if let Some(decided) = decided {
            offer(self.next_mut(), decided);
        }
    }

    fn tick(&mut self, ctx: &mut FlowContext<'a>) -> Option<Self> {
        let next = (*self.next_mut())?;
        match (*self, next) {
            (FlowState::StartMenu { .. }, _) => Some(Self::intro()),
            (FlowState::Intro { .. }, _) => Some(Self::play(CharacterId::First)),
            (FlowState::Play { character, .. }, FlowMove::RequestSwitch) => {
                let to = character.other();
                ctx.bus.publish(Signal::CharacterSwitch {
                    from: character,
                    to,
                });
                Some(Self::play(to))
            }
            (FlowState::Play { .. }, FlowMove::Follow(to)) => Some(Self::play(to)),
            (FlowState::Play { .. }, FlowMove::Jelloport { rider, destination }) => {
                Some(FlowState::Jelloport {
                    rider,
                    destination,
                    next: None,
                })
            }
            (FlowState::Play { character: c, .. }, FlowMove::Cutscene)
            | (FlowState::Jelloport { rider: c, .. }, FlowMove::Cutscene) => {
                Some(FlowState::WaitForCutscene {
                    resume: c,
                    next: None,
                })
            }
            (FlowState::Jelloport { rider, .. }, _) => Some(Self::play(rider)),
            (FlowState::WaitForCutscene { resume, .. }, _) => Some(Self::play(resume)),
            (FlowState::Play { .. }, FlowMove::Advance) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::jelloporter::JelloState;
    use crate::fsm::StateMachine;
    use bevy_ecs::world::World;

    fn step(machine: &mut StateMachine<FlowState>, bus: &SignalBus) -> &'static str {
        let mut ctx = FlowContext { bus };
        machine.update(&mut ctx, bus, FlowState::start_menu);
        machine.current().map(|s| s.label()).unwrap_or("")
    }

    #[test]
    fn menu_intro_play() {
        let bus = SignalBus::new();
        let mut flow = StateMachine::new("game_flow");
        assert_eq!(step(&mut flow, &bus), "StartMenu");
        bus.publish(Signal::CutSceneFinished);
        assert_eq!(step(&mut flow, &bus), "StartMenu");
        bus.publish(Signal::MenuClosed);
        assert_eq!(step(&mut flow, &bus), "Intro");
        assert_eq!(flow.current().and_then(|s| s.active_character()), None);
        bus.publish(Signal::CutSceneFinished);
        assert_eq!(step(&mut flow, &bus), "PlayFirst");
        assert_eq!(
            flow.current().and_then(|s| s.active_character()),
            Some(CharacterId::First)
        );
    }

    #[test]
    fn ui_start_button_closes_menu() {
        let bus = SignalBus::new();
        let mut flow = StateMachine::new("game_flow");
        step(&mut flow, &bus);
        bus.publish(Signal::MenuButtonPressed(MenuButton::Start));
        assert_eq!(step(&mut flow, &bus), "Intro");
    }

    #[test]
    fn switch_press_announces_and_toggles() {
        let bus = SignalBus::new();
        let watcher = bus.register_mailbox();
        bus.subscribe(SignalKind::CharacterSwitch, watcher);
        let mut flow = StateMachine::new("game_flow");
        let mut ctx = FlowContext { bus: &bus };
        flow.update(&mut ctx, &bus, || FlowState::play(CharacterId::First));

        bus.publish(Signal::ButtonPressed(MoveButton::Switch));
        assert_eq!(step(&mut flow, &bus), "PlaySecond");
        assert_eq!(
            bus.drain(watcher),
            vec![Signal::CharacterSwitch {
                from: CharacterId::First,
                to: CharacterId::Second
            }]
        );
        bus.publish(Signal::ButtonPressed(MoveButton::Switch));
        assert_eq!(step(&mut flow, &bus), "PlayFirst");
    }

    #[test]
    fn jelloport_then_cutscene_resumes_rider() {
        let bus = SignalBus::new();
        let mut world = World::new();
        let character = world.spawn_empty().id();
        let porter = world.spawn_empty().id();
        let plate = world.spawn_empty().id();
        let mut flow = StateMachine::new("game_flow");
        let mut ctx = FlowContext { bus: &bus };
        flow.update(&mut ctx, &bus, || FlowState::play(CharacterId::First));

        bus.publish(Signal::JelloportationStarted {
            character,
            rider: CharacterId::First,
            jelloporter: porter,
            new_jello_state: JelloState::PinkDownGreenUp,
            destination_plate: plate,
        });
        assert_eq!(step(&mut flow, &bus), "Jelloport");
        assert_eq!(flow.current().and_then(|s| s.active_character()), None);

        bus.publish(Signal::CutSceneStarting);
        assert_eq!(step(&mut flow, &bus), "WaitForCutscene");
        bus.publish(Signal::JelloportationFinished {
            character,
            jelloporter: porter,
        });
        assert_eq!(step(&mut flow, &bus), "WaitForCutscene");
        bus.publish(Signal::CutSceneFinished);
        assert_eq!(step(&mut flow, &bus), "PlayFirst");
    }

    #[test]
    fn cutscene_outranks_switch_in_same_frame() {
        let bus = SignalBus::new();
        let mut flow = StateMachine::new("game_flow");
        let mut ctx = FlowContext { bus: &bus };
        flow.update(&mut ctx, &bus, || FlowState::play(CharacterId::Second));
        bus.publish(Signal::CutSceneStarting);
        bus.publish(Signal::ButtonPressed(MoveButton::Switch));
        assert_eq!(step(&mut flow, &bus), "WaitForCutscene");
        bus.publish(Signal::CutSceneFinished);
        assert_eq!(step(&mut flow, &bus), "PlaySecond");
    }
}
