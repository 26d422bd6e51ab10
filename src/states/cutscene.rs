//! Cut-scene director states.
//!
//! `Black` holds a full backdrop until game flow enters `Intro`, then the
//! intro sequence (index 0) plays: `FadeIn`, then `WaitForUser` until a confirm
//! press moves on via `CrossFade` or `FadeThroughBlack`, and `FinalFadeOut`
//! after the last slide. Afterwards `WaitForTrigger` waits for a player to exit
//! a jelloporter onto a plate with an unwatched sequence, and `FirstFadeIn`
//! brings the backdrop and first slide up.

use log::{info, warn};

use crate::events::signal::{Signal, SignalKind};
use crate::fsm::MachineState;
use crate::resources::cutscene::{CutSceneLibrary, FadeType, Stage};
use crate::resources::signalbus::SignalBus;

pub struct CutSceneContext<'a> {
    pub library: &'a mut CutSceneLibrary,
    pub stage: &'a mut Stage,
    pub bus: &'a SignalBus,
    pub fade_speed: f32,
    pub black_delay: f32,
    pub input_delay: f32,
    pub delta: f32,
    pub reload_requested: &'a mut bool,
}

impl CutSceneContext<'_> {
    fn step(&self) -> f32 {
        self.fade_speed * self.delta
    }

    fn place_active_slide(&mut self) {
        let image = self.library.active_slide().map(|s| s.image.clone());
        self.stage.place_main(image);
    }

    fn start_sequence(&mut self, index: usize) -> bool {
        let started = self.library.activate(index);
        if started {
            self.stage.input_delay = self.input_delay;
            info!("cut-scene: playing sequence {}", index);
        }
        started
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CutSceneState {
    Black {
        intro: bool,
    },
    FadeIn,
    WaitForUser {
        next: Option<FadeType>,
        last: bool,
    },
    CrossFade,
    FadeThroughBlack {
        faded_out: bool,
        remaining: f32,
        placed: bool,
    },
    FinalFadeOut,
    WaitForTrigger {
        triggered: bool,
    },
    FirstFadeIn {
        placed: bool,
    },
}

impl CutSceneState {
    pub fn black() -> Self {
        CutSceneState::Black { intro: false }
    }

    fn wait_for_user() -> Self {
        CutSceneState::WaitForUser {
            next: None,
            last: false,
        }
    }
}

impl<'a> MachineState<CutSceneContext<'a>> for CutSceneState {
    fn label(&self) -> &'static str {
        match self {
            CutSceneState::Black { .. } => "Black",
            CutSceneState::FadeIn => "FadeIn",
            CutSceneState::WaitForUser { .. } => "WaitForUser",
            CutSceneState::CrossFade => "CrossFade",
            CutSceneState::FadeThroughBlack { .. } => "FadeThroughBlack",
            CutSceneState::FinalFadeOut => "FinalFadeOut",
            CutSceneState::WaitForTrigger { .. } => "WaitForTrigger",
            CutSceneState::FirstFadeIn { .. } => "FirstFadeIn",
        }
    }

    fn subscriptions(&self) -> &'static [SignalKind] {
        match self {
            CutSceneState::Black { .. } => &[SignalKind::StateStarted],
            CutSceneState::WaitForUser { .. } => &[SignalKind::ButtonPressed],
            CutSceneState::WaitForTrigger { .. } => &[SignalKind::PlayerExitingJelloporter],
            _ => &[],
        }
    }

    fn enter(&mut self, ctx: &mut CutSceneContext<'a>) {
        match self {
            CutSceneState::Black { .. } => ctx.stage.backdrop = 1.0,
            CutSceneState::FadeIn => ctx.place_active_slide(),
            CutSceneState::CrossFade => {
                let next = ctx.library.active_slide_index() + 1;
                let image = ctx
                    .library
                    .active()
                    .and_then(|i| ctx.library.sequences.get(i))
                    .and_then(|s| s.slides.get(next))
                    .map(|s| s.image.clone());
                ctx.stage.place_cross(image);
            }
            CutSceneState::FadeThroughBlack { remaining, .. } => *remaining = ctx.black_delay,
            CutSceneState::FirstFadeIn { .. } => {
                info!("cut-scene: starting");
                ctx.bus.publish(Signal::CutSceneStarting);
            }
            _ => {}
        }
    }

    fn on_signal(&mut self, signal: &Signal, ctx: &mut CutSceneContext<'a>) {
        match (&mut *self, *signal) {
            (
                CutSceneState::Black { intro },
                Signal::StateStarted {
                    machine: "game_flow",
                    state: "Intro",
                    ..
                },
            ) => *intro = true,
            (CutSceneState::WaitForUser { next, last }, Signal::ButtonPressed(button)) => {
                if ctx.library.is_end_game() {
                    info!("cut-scene: end of game, scene reload requested");
                    *ctx.reload_requested = true;
                }
                if ctx.stage.input_ready() && button.is_confirm() {
                    *last = ctx.library.is_last_slide();
                    *next = Some(ctx.library.next_fade());
                }
            }
            (CutSceneState::WaitForTrigger { triggered }, Signal::PlayerExitingJelloporter { plate, .. }) => {
                if *triggered {
                    return;
                }
                if let Some(index) = ctx.library.unplayed_for(plate) {
                    *triggered = ctx.start_sequence(index);
                }
            }
            _ => {}
        }
    }

    fn tick(&mut self, ctx: &mut CutSceneContext<'a>) -> Option<Self> {
        let step = ctx.step();
        match self {
            CutSceneState::Black { intro: false } => None,
            CutSceneState::Black { intro: true } => {
                if ctx.start_sequence(0) {
                    Some(CutSceneState::FadeIn)
                } else {
                    warn!("cut-scene: no intro sequence, skipping");
                    Some(CutSceneState::FinalFadeOut)
                }
            }
            CutSceneState::FadeIn => ctx
                .stage
                .fade_in_main(step)
                .then(Self::wait_for_user),
            CutSceneState::WaitForUser { next: None, .. } => None,
            CutSceneState::WaitForUser { last: true, .. } => Some(CutSceneState::FinalFadeOut),
            CutSceneState::WaitForUser {
                next: Some(FadeType::Cross),
                ..
            } => Some(CutSceneState::CrossFade),
            CutSceneState::WaitForUser {
                next: Some(FadeType::Black),
                ..
            } => Some(CutSceneState::FadeThroughBlack {
                faded_out: false,
                remaining: 0.0,
                placed: false,
            }),
            CutSceneState::CrossFade => ctx.stage.cross_fade(step).then(Self::wait_for_user),
            CutSceneState::FadeThroughBlack {
                faded_out,
                remaining,
                placed,
            } => {
                if !*faded_out {
                    *faded_out = ctx.stage.fade_out_main(step);
                } else if *remaining > 0.0 {
                    *remaining -= ctx.delta;
                } else if !*placed {
                    ctx.library.advance_slide();
                    ctx.place_active_slide();
                    *placed = true;
                } else if ctx.stage.fade_in_main(step) {
                    return Some(Self::wait_for_user());
                }
                None
            }
            CutSceneState::FinalFadeOut => {
                let done = ctx.stage.fade_out_main(step) && ctx.stage.fade_out_backdrop(step);
                done.then_some(CutSceneState::WaitForTrigger { triggered: false })
            }
            CutSceneState::WaitForTrigger { triggered } => {
                triggered.then_some(CutSceneState::FirstFadeIn { placed: false })
            }
            CutSceneState::FirstFadeIn { placed } => {
                if !ctx.stage.fade_in_backdrop(step) {
                    return None;
                }
                if !*placed {
                    ctx.place_active_slide();
                    *placed = true;
                }
                ctx.stage.fade_in_main(step).then(Self::wait_for_user)
            }
        }
    }

    fn exit(&mut self, ctx: &mut CutSceneContext<'a>) {
        match self {
            CutSceneState::CrossFade => {
                ctx.library.advance_slide();
                ctx.stage.promote_cross();
            }
            CutSceneState::FinalFadeOut => {
                ctx.library.mark_finished();
                ctx.stage.clear();
                info!("cut-scene: finished");
                ctx.bus.publish(Signal::CutSceneFinished);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::input::MoveButton;
    use crate::fsm::StateMachine;
    use crate::resources::cutscene::{CutSceneSequence, Slide};
    use bevy_ecs::world::World;

    struct Rig {
        library: CutSceneLibrary,
        stage: Stage,
        reload: bool,
        machine: StateMachine<CutSceneState>,
    }

    fn slide(image: &str, fade: FadeType) -> Slide {
        Slide {
            image: image.to_string(),
            fade,
            end_game: false,
        }
    }

    impl Rig {
        fn new(sequences: Vec<CutSceneSequence>) -> Self {
            Self {
                library: CutSceneLibrary::new(sequences),
                stage: Stage::default(),
                reload: false,
                machine: StateMachine::new("cut_scene"),
            }
        }

        fn step(&mut self, bus: &SignalBus) -> &'static str {
            self.stage.input_delay -= 0.5;
            let mut ctx = CutSceneContext {
                library: &mut self.library,
                stage: &mut self.stage,
                bus,
                fade_speed: 1.0,
                black_delay: 0.5,
                input_delay: 0.5,
                delta: 0.5,
                reload_requested: &mut self.reload,
            };
            self.machine.update(&mut ctx, bus, CutSceneState::black);
            self.label()
        }

        fn label(&self) -> &'static str {
            self.machine.current().map(|s| s.label()).unwrap_or("")
        }

        fn step_until(&mut self, bus: &SignalBus, label: &str) -> usize {
            for n in 1..=32 {
                if self.step(bus) == label {
                    return n;
                }
            }
            panic!("never reached {label}, stuck in {}", self.label());
        }
    }

    fn intro_started() -> Signal {
        Signal::StateStarted {
            machine: "game_flow",
            owner: None,
            state: "Intro",
        }
    }

    #[test]
    fn intro_plays_cross_then_black_then_finishes() {
        let bus = SignalBus::new();
        let watcher = bus.register_mailbox();
        bus.subscribe(SignalKind::CutSceneFinished, watcher);
        let mut rig = Rig::new(vec![CutSceneSequence::new(
            None,
            vec![
                slide("a", FadeType::Cross),
                slide("b", FadeType::Black),
                slide("c", FadeType::Cross),
            ],
        )]);
        assert_eq!(rig.step(&bus), "Black");
        assert_eq!(rig.stage.backdrop, 1.0);
        bus.publish(Signal::StateStarted {
            machine: "game_flow",
            owner: None,
            state: "StartMenu",
        });
        assert_eq!(rig.step(&bus), "Black");

        bus.publish(intro_started());
        assert_eq!(rig.step(&bus), "FadeIn");
        assert_eq!(rig.stage.main_slide.as_deref(), Some("a"));
        rig.step_until(&bus, "WaitForUser");
        assert_eq!(rig.stage.main, 1.0);

        // Non-confirm buttons do nothing.
        bus.publish(Signal::ButtonPressed(MoveButton::Jump));
        assert_eq!(rig.step(&bus), "WaitForUser");

        bus.publish(Signal::ButtonPressed(MoveButton::Attack));
        assert_eq!(rig.step(&bus), "CrossFade");
        assert_eq!(rig.stage.cross_slide.as_deref(), Some("b"));
        rig.step_until(&bus, "WaitForUser");
        assert_eq!(rig.stage.main_slide.as_deref(), Some("b"));
        assert_eq!(rig.library.active_slide_index(), 1);

        bus.publish(Signal::ButtonPressed(MoveButton::Switch));
        assert_eq!(rig.step(&bus), "FadeThroughBlack");
        rig.step_until(&bus, "WaitForUser");
        assert_eq!(rig.stage.main_slide.as_deref(), Some("c"));

        bus.publish(Signal::ButtonPressed(MoveButton::Attack));
        assert_eq!(rig.step(&bus), "FinalFadeOut");
        assert!(bus.drain(watcher).is_empty());
        rig.step_until(&bus, "WaitForTrigger");
        assert_eq!(bus.drain(watcher), vec![Signal::CutSceneFinished]);
        assert!(rig.library.sequences[0].finished);
        assert_eq!(rig.stage.backdrop, 0.0);
    }

    #[test]
    fn input_delay_swallows_early_presses() {
        let bus = SignalBus::new();
        let mut rig = Rig::new(vec![CutSceneSequence::new(
            None,
            vec![slide("a", FadeType::Cross), slide("b", FadeType::Cross)],
        )]);
        rig.step(&bus);
        bus.publish(intro_started());
        rig.step(&bus);
        rig.stage.input_delay = 10.0;
        rig.step_until(&bus, "WaitForUser");
        bus.publish(Signal::ButtonPressed(MoveButton::Attack));
        assert_eq!(rig.step(&bus), "WaitForUser");
        rig.stage.input_delay = 0.0;
        bus.publish(Signal::ButtonPressed(MoveButton::Attack));
        assert_eq!(rig.step(&bus), "CrossFade");
    }

    #[test]
    fn plate_trigger_plays_once() {
        let bus = SignalBus::new();
        let watcher = bus.register_mailbox();
        bus.subscribe(SignalKind::CutSceneStarting, watcher);
        let mut world = World::new();
        let plate = world.spawn_empty().id();
        let other_plate = world.spawn_empty().id();
        let porter = world.spawn_empty().id();
        let character = world.spawn_empty().id();
        let mut rig = Rig::new(vec![
            CutSceneSequence::new(None, vec![slide("intro", FadeType::Cross)]),
            CutSceneSequence::new(Some(plate), vec![slide("plate", FadeType::Cross)]),
        ]);
        rig.step(&bus);
        bus.publish(intro_started());
        rig.step_until(&bus, "WaitForUser");
        bus.publish(Signal::ButtonPressed(MoveButton::Attack));
        rig.step_until(&bus, "WaitForTrigger");

        let exiting = |plate| Signal::PlayerExitingJelloporter {
            jelloporter: porter,
            character,
            plate,
        };
        bus.publish(exiting(other_plate));
        assert_eq!(rig.step(&bus), "WaitForTrigger");
        bus.publish(exiting(plate));
        assert_eq!(rig.step(&bus), "FirstFadeIn");
        assert_eq!(bus.drain(watcher), vec![Signal::CutSceneStarting]);
        rig.step_until(&bus, "WaitForUser");
        assert_eq!(rig.stage.main_slide.as_deref(), Some("plate"));
        assert_eq!(rig.stage.backdrop, 1.0);
        rig.stage.input_delay = 0.0;
        bus.publish(Signal::ButtonPressed(MoveButton::Switch));
        rig.step_until(&bus, "WaitForTrigger");

        bus.publish(exiting(plate));
        assert_eq!(rig.step(&bus), "WaitForTrigger");
    }

    #[test]
    fn end_game_slide_requests_reload() {
        let bus = SignalBus::new();
        let mut rig = Rig::new(vec![CutSceneSequence::new(
            None,
            vec![Slide {
                image: "the_end".into(),
                fade: FadeType::Black,
                end_game: true,
            }],
        )]);
        rig.step(&bus);
        bus.publish(intro_started());
        rig.step_until(&bus, "WaitForUser");
        bus.publish(Signal::ButtonPressed(MoveButton::Left));
        rig.step(&bus);
        assert!(rig.reload);
    }

    #[test]
    fn missing_intro_finishes_immediately() {
        let bus = SignalBus::new();
        let watcher = bus.register_mailbox();
        bus.subscribe(SignalKind::CutSceneFinished, watcher);
        let mut rig = Rig::new(Vec::new());
        rig.step(&bus);
        bus.publish(intro_started());
        assert_eq!(rig.step(&bus), "FinalFadeOut");
        rig.step_until(&bus, "WaitForTrigger");
        assert_eq!(bus.drain(watcher), vec![Signal::CutSceneFinished]);
    }
}
