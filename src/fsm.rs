//! Generic state machine runtime.
//!
//! Every behaviour in the game (characters, jelloporters, monsters, game
//! flow, cut-scenes) is a closed enum implementing [`MachineState`] and driven
//! by a [`StateMachine`]. One call to [`StateMachine::update`] per frame:
//!
//! 1. builds and enters the initial state if none is current,
//! 2. hands every signal queued since the last update to
//!    [`MachineState::on_signal`], which may only record a pending transition,
//! 3. calls [`MachineState::tick`]; `None` keeps the current state,
//! 4. on `Some(next)` exits the old state, publishes
//!    [`Signal::StateEnding`], enters `next` and publishes
//!    [`Signal::StateStarted`].
//!
//! Bus subscriptions follow [`MachineState::subscriptions`]: they are added
//! right before `enter` and removed right after `exit`, so a state never keeps
//! listening once it is left. Each transition bumps a generation counter;
//! a transition into another value of the same variant is still a transition.

use bevy_ecs::prelude::Entity;
use log::debug;

use crate::events::signal::{Signal, SignalKind};
use crate::resources::signalbus::{SignalBus, SubscriberId};

/// One mode of behaviour of a machine operating on context `C`.
pub trait MachineState<C>: Sized {
    /// Stable, human-readable state name (e.g. `"FlyTopRight"`).
    fn label(&self) -> &'static str;

    /// Signal kinds this state listens to while current.
    fn subscriptions(&self) -> &'static [SignalKind] {
        &[]
    }

    fn enter(&mut self, _ctx: &mut C) {}

    /// Record the effect of a received signal. Must not transition directly.
    fn on_signal(&mut self, _signal: &Signal, _ctx: &mut C) {}

    /// Decide the next state. `None` stays in the current one.
    fn tick(&mut self, ctx: &mut C) -> Option<Self>;

    fn exit(&mut self, _ctx: &mut C) {}
}

/// Report of a transition performed by [`StateMachine::update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: &'static str,
    pub to: &'static str,
    pub generation: u64,
}

/// Owner-side driver for a [`MachineState`] enum.
#[derive(Debug)]
pub struct StateMachine<S> {
    name: &'static str,
    owner: Option<Entity>,
    current: Option<S>,
    generation: u64,
    ticks_in_state: u32,
    subscriber: Option<SubscriberId>,
}

impl<S> StateMachine<S> {
    /// Create an idle machine; the initial state is built on the first update.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            owner: None,
            current: None,
            generation: 0,
            ticks_in_state: 0,
            subscriber: None,
        }
    }

    /// Tag lifecycle signals with the owning entity.
    pub fn with_owner(mut self, owner: Entity) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn owner(&self) -> Option<Entity> {
        self.owner
    }

    pub fn current(&self) -> Option<&S> {
        self.current.as_ref()
    }

    /// Number of transitions performed, counting the initial enter.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Updates completed since the current state was entered.
    pub fn ticks_in_state(&self) -> u32 {
        self.ticks_in_state
    }

    pub fn is_started(&self) -> bool {
        self.current.is_some()
    }

    fn mailbox(&mut self, bus: &SignalBus) -> SubscriberId {
        match self.subscriber {
            Some(id) => id,
            None => {
                let id = bus.register_mailbox();
                self.subscriber = Some(id);
                id
            }
        }
    }
}

impl<S> StateMachine<S> {
    fn begin<C>(&mut self, mut state: S, ctx: &mut C, bus: &SignalBus) -> &'static str
    where
        S: MachineState<C>,
    {
        let id = self.mailbox(bus);
        for kind in state.subscriptions() {
            bus.subscribe(*kind, id);
        }
        state.enter(ctx);
        let label = state.label();
        self.current = Some(state);
        self.generation += 1;
        self.ticks_in_state = 0;
        bus.publish(Signal::StateStarted {
            machine: self.name,
            owner: self.owner,
            state: label,
        });
        label
    }

    fn end<C>(&mut self, ctx: &mut C, bus: &SignalBus) -> Option<&'static str>
    where
        S: MachineState<C>,
    {
        let mut state = self.current.take()?;
        state.exit(ctx);
        if let Some(id) = self.subscriber {
            for kind in state.subscriptions() {
                bus.unsubscribe(*kind, id);
            }
            bus.discard(id);
        }
        let label = state.label();
        bus.publish(Signal::StateEnding {
            machine: self.name,
            owner: self.owner,
            state: label,
        });
        Some(label)
    }

    /// Run one frame of the machine. Returns the transition performed, if any.
    pub fn update<C>(
        &mut self,
        ctx: &mut C,
        bus: &SignalBus,
        initial: impl FnOnce() -> S,
    ) -> Option<Transition>
    where
        S: MachineState<C>,
    {
        if self.current.is_none() {
            let label = self.begin(initial(), ctx, bus);
            debug!("{}: start in {}", self.name, label);
        }

        if let Some(id) = self.subscriber {
            let inbox = bus.drain(id);
            if let Some(state) = self.current.as_mut() {
                for signal in &inbox {
                    state.on_signal(signal, ctx);
                }
            }
        }

        let next = self.current.as_mut().and_then(|state| state.tick(ctx));
        let Some(next) = next else {
            self.ticks_in_state = self.ticks_in_state.saturating_add(1);
            return None;
        };

        let from = self.end(ctx, bus).unwrap_or("<none>");
        let to = self.begin(next, ctx, bus);
        debug!("{}: {} -> {}", self.name, from, to);
        Some(Transition {
            from,
            to,
            generation: self.generation,
        })
    }

    /// Force a transition outside of `tick`, e.g. when a level is reset.
    pub fn switch_to<C>(&mut self, next: S, ctx: &mut C, bus: &SignalBus) -> Transition
    where
        S: MachineState<C>,
    {
        let from = self.end(ctx, bus).unwrap_or("<none>");
        let to = self.begin(next, ctx, bus);
        Transition {
            from,
            to,
            generation: self.generation,
        }
    }

    /// Exit the current state and release the bus mailbox.
    pub fn shutdown<C>(&mut self, ctx: &mut C, bus: &SignalBus)
    where
        S: MachineState<C>,
    {
        self.end(ctx, bus);
        if let Some(id) = self.subscriber.take() {
            bus.deregister(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::input::MoveButton;

    #[derive(Default)]
    struct Bench {
        enters: Vec<&'static str>,
        exits: Vec<&'static str>,
        seen: Vec<Signal>,
    }

    #[derive(Debug, PartialEq)]
    enum Lamp {
        Off { pending: bool },
        On,
        Again,
    }

    impl MachineState<Bench> for Lamp {
        fn label(&self) -> &'static str {
            match self {
                Lamp::Off { .. } => "Off",
                Lamp::On => "On",
                Lamp::Again => "Again",
            }
        }

        fn subscriptions(&self) -> &'static [SignalKind] {
            match self {
                Lamp::Off { .. } => &[SignalKind::ButtonPressed],
                Lamp::On | Lamp::Again => &[],
            }
        }

        fn enter(&mut self, ctx: &mut Bench) {
            ctx.enters.push(self.label());
        }

        fn on_signal(&mut self, signal: &Signal, ctx: &mut Bench) {
            ctx.seen.push(*signal);
            if let Lamp::Off { pending } = self {
                *pending = true;
            }
        }

        fn tick(&mut self, _ctx: &mut Bench) -> Option<Self> {
            match self {
                Lamp::Off { pending: true } => Some(Lamp::On),
                Lamp::Off { pending: false } => None,
                Lamp::On => Some(Lamp::Again),
                Lamp::Again => None,
            }
        }

        fn exit(&mut self, ctx: &mut Bench) {
            ctx.exits.push(self.label());
        }
    }

    #[test]
    fn tick_before_enter_does_not_panic() {
        let mut bench = Bench::default();
        let mut state = Lamp::Off { pending: false };
        assert!(state.tick(&mut bench).is_none());
    }

    #[test]
    fn staying_does_not_reenter() {
        let bus = SignalBus::new();
        let mut bench = Bench::default();
        let mut machine = StateMachine::new("lamp");
        for _ in 0..5 {
            assert!(
                machine
                    .update(&mut bench, &bus, || Lamp::Off { pending: false })
                    .is_none()
            );
        }
        assert_eq!(bench.enters, vec!["Off"]);
        assert!(bench.exits.is_empty());
        assert_eq!(machine.generation(), 1);
        assert_eq!(machine.ticks_in_state(), 5);
    }

    #[test]
    fn signal_drives_transition_and_unsubscribes() {
        let bus = SignalBus::new();
        let mut bench = Bench::default();
        let mut machine = StateMachine::new("lamp");
        machine.update(&mut bench, &bus, || Lamp::Off { pending: false });
        assert_eq!(bus.subscriber_count(SignalKind::ButtonPressed), 1);

        bus.publish(Signal::ButtonPressed(MoveButton::Jump));
        let t = machine
            .update(&mut bench, &bus, || Lamp::Off { pending: false })
            .expect("transition");
        assert_eq!((t.from, t.to, t.generation), ("Off", "On", 2));
        assert_eq!(bus.subscriber_count(SignalKind::ButtonPressed), 0);
        assert_eq!(bench.seen, vec![Signal::ButtonPressed(MoveButton::Jump)]);

        // Further presses are no longer delivered.
        bus.publish(Signal::ButtonPressed(MoveButton::Jump));
        machine.update(&mut bench, &bus, || Lamp::Off { pending: false });
        assert_eq!(bench.seen.len(), 1);
        assert_eq!(bench.enters, vec!["Off", "On", "Again"]);
        assert_eq!(bench.exits, vec!["Off", "On"]);
    }

    #[test]
    fn lifecycle_signals_are_published() {
        let bus = SignalBus::new();
        let watcher = bus.register_mailbox();
        bus.subscribe(SignalKind::StateStarted, watcher);
        bus.subscribe(SignalKind::StateEnding, watcher);
        let mut bench = Bench::default();
        let mut machine = StateMachine::new("lamp");
        machine.update(&mut bench, &bus, || Lamp::On);
        let signals = bus.drain(watcher);
        assert_eq!(
            signals,
            vec![
                Signal::StateStarted { machine: "lamp", owner: None, state: "On" },
                Signal::StateEnding { machine: "lamp", owner: None, state: "On" },
                Signal::StateStarted { machine: "lamp", owner: None, state: "Again" },
            ]
        );
    }

    #[test]
    fn shutdown_exits_and_releases_mailbox() {
        let bus = SignalBus::new();
        let mut bench = Bench::default();
        let mut machine = StateMachine::new("lamp");
        machine.update(&mut bench, &bus, || Lamp::Off { pending: false });
        machine.shutdown(&mut bench, &bus);
        assert_eq!(bench.exits, vec!["Off"]);
        assert!(!machine.is_started());
        assert_eq!(bus.subscriber_count(SignalKind::ButtonPressed), 0);
    }

    #[test]
    fn switch_to_moves_subscriptions() {
        let bus = SignalBus::new();
        let mut bench = Bench::default();
        let mut machine = StateMachine::new("lamp");
        machine.update(&mut bench, &bus, || Lamp::Again);
        assert_eq!(bus.subscriber_count(SignalKind::ButtonPressed), 0);

        let t = machine.switch_to(Lamp::Off { pending: false }, &mut bench, &bus);
        assert_eq!((t.from, t.to, t.generation), ("Again", "Off", 2));
        let id = machine.subscriber.expect("mailbox");
        assert!(bus.is_subscribed(SignalKind::ButtonPressed, id));
        assert_eq!(bench.exits, vec!["Again"]);
        assert_eq!(machine.ticks_in_state(), 0);
    }
}
