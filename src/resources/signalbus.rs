//! Process-wide publish/subscribe signal bus.
//!
//! The [`SignalBus`] fans a [`Signal`] out to every subscriber of its
//! [`SignalKind`], synchronously, on the calling thread. Subscribers are
//! identified by a [`SubscriberId`] handle returned at registration and are
//! removed by that same handle.
//!
//! Two kinds of subscriber exist:
//! - **mailboxes** collect copies of the signals they receive; state machine
//!   owners drain them once per tick (see [`StateMachine`](crate::fsm::StateMachine)),
//! - **handlers** are callbacks run during `publish`; they may publish again
//!   or change subscriptions, since dispatch iterates a snapshot taken when
//!   `publish` was called and no internal borrow is held while they run.
//!
//! The bus is inserted as a `NonSend` resource: handlers are `Rc` closures and
//! the registry sits behind a `RefCell`, so all access goes through `&SignalBus`.
//!
//! # Example
//!
//! ```ignore
//! let bus = SignalBus::new();
//! let inbox = bus.register_mailbox();
//! bus.subscribe(SignalKind::MenuClosed, inbox);
//! bus.publish(Signal::MenuClosed);
//! assert_eq!(bus.drain(inbox), vec![Signal::MenuClosed]);
//! ```

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use log::trace;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::events::signal::{Signal, SignalKind};

/// Handle identifying one subscriber on the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriberId(u64);

/// Callback type for handler subscribers.
pub type SignalHandler = Rc<dyn Fn(&Signal, &SignalBus)>;

enum Subscriber {
    Mailbox(VecDeque<Signal>),
    Handler(SignalHandler),
}

#[derive(Default)]
struct Registry {
    subscribers: FxHashMap<SubscriberId, Subscriber>,
    /// Subscribers per kind, in subscription order.
    kinds: FxHashMap<SignalKind, SmallVec<[SubscriberId; 4]>>,
    next_id: u64,
}

/// Typed signal dispatcher shared by every state machine in the world.
#[derive(Default)]
pub struct SignalBus {
    registry: RefCell<Registry>,
}

impl SignalBus {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate(&self, subscriber: Subscriber) -> SubscriberId {
        let mut registry = self.registry.borrow_mut();
        let id = SubscriberId(registry.next_id);
        registry.next_id += 1;
        registry.subscribers.insert(id, subscriber);
        id
    }

    /// Register a mailbox subscriber. Its signals are collected with [`drain`](Self::drain).
    pub fn register_mailbox(&self) -> SubscriberId {
        self.allocate(Subscriber::Mailbox(VecDeque::new()))
    }

    /// Register a callback subscriber run synchronously on every matching publish.
    pub fn register_handler(&self, handler: impl Fn(&Signal, &SignalBus) + 'static) -> SubscriberId {
        self.allocate(Subscriber::Handler(Rc::new(handler)))
    }

    /// Remove a subscriber and all of its subscriptions.
    ///
    /// Unknown ids are ignored.
    pub fn deregister(&self, id: SubscriberId) {
        self.unsubscribe_all(id);
        self.registry.borrow_mut().subscribers.remove(&id);
    }

    /// Subscribe `id` to `kind`.
    ///
    /// Returns `false` if the pair was already subscribed; a subscriber is
    /// never delivered the same signal twice.
    pub fn subscribe(&self, kind: SignalKind, id: SubscriberId) -> bool {
        let mut registry = self.registry.borrow_mut();
        if !registry.subscribers.contains_key(&id) {
            return false;
        }
        let list = registry.kinds.entry(kind).or_default();
        if list.contains(&id) {
            return false;
        }
        list.push(id);
        true
    }

    /// Unsubscribe `id` from `kind`.
    ///
    /// Returns `false` when the pair was not subscribed. The kind entry is
    /// dropped once its last subscriber leaves.
    pub fn unsubscribe(&self, kind: SignalKind, id: SubscriberId) -> bool {
        let mut registry = self.registry.borrow_mut();
        let Some(list) = registry.kinds.get_mut(&kind) else {
            return false;
        };
        let Some(position) = list.iter().position(|s| *s == id) else {
            return false;
        };
        list.remove(position);
        if list.is_empty() {
            registry.kinds.remove(&kind);
        }
        true
    }

    /// Drop every subscription held by `id`. The subscriber stays registered.
    pub fn unsubscribe_all(&self, id: SubscriberId) {
        let mut registry = self.registry.borrow_mut();
        registry.kinds.retain(|_, list| {
            list.retain(|s| *s != id);
            !list.is_empty()
        });
    }

    /// Deliver `signal` to every current subscriber of its kind, in
    /// subscription order.
    ///
    /// Subscribers added or removed by a handler during this call do not
    /// change the set of recipients of this call, except that a subscriber
    /// deregistered mid-dispatch is skipped.
    pub fn publish(&self, signal: Signal) {
        let kind = signal.kind();
        let snapshot: SmallVec<[SubscriberId; 8]> = match self.registry.borrow().kinds.get(&kind) {
            Some(list) => list.iter().copied().collect(),
            None => {
                trace!("signal {:?} has no subscribers", kind);
                return;
            }
        };
        trace!("publish {:?} to {} subscriber(s)", signal, snapshot.len());

        for id in snapshot {
            let handler = {
                let mut registry = self.registry.borrow_mut();
                match registry.subscribers.get_mut(&id) {
                    Some(Subscriber::Mailbox(queue)) => {
                        queue.push_back(signal);
                        None
                    }
                    Some(Subscriber::Handler(handler)) => Some(Rc::clone(handler)),
                    None => None,
                }
            };
            if let Some(handler) = handler {
                handler(&signal, self);
            }
        }
    }

    /// Take every signal queued in mailbox `id`, oldest first.
    ///
    /// Returns an empty vector for handlers and unknown ids.
    pub fn drain(&self, id: SubscriberId) -> Vec<Signal> {
        match self.registry.borrow_mut().subscribers.get_mut(&id) {
            Some(Subscriber::Mailbox(queue)) => queue.drain(..).collect(),
            _ => Vec::new(),
        }
    }

    /// Discard queued signals of mailbox `id` without reading them.
    pub fn discard(&self, id: SubscriberId) {
        if let Some(Subscriber::Mailbox(queue)) = self.registry.borrow_mut().subscribers.get_mut(&id) {
            queue.clear();
        }
    }

    /// Number of subscribers currently registered for `kind`.
    pub fn subscriber_count(&self, kind: SignalKind) -> usize {
        self.registry
            .borrow()
            .kinds
            .get(&kind)
            .map(|list| list.len())
            .unwrap_or(0)
    }

    /// Whether `id` is currently subscribed to `kind`.
    pub fn is_subscribed(&self, kind: SignalKind, id: SubscriberId) -> bool {
        self.registry
            .borrow()
            .kinds
            .get(&kind)
            .is_some_and(|list| list.contains(&id))
    }

    /// Remove every subscriber and subscription.
    pub fn clear(&self) {
        let mut registry = self.registry.borrow_mut();
        registry.subscribers.clear();
        registry.kinds.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::input::MoveButton;
    use std::cell::Cell;

    #[test]
    fn mailbox_receives_copies_in_order() {
        let bus = SignalBus::new();
        let inbox = bus.register_mailbox();
        assert!(bus.subscribe(SignalKind::ButtonPressed, inbox));
        bus.publish(Signal::ButtonPressed(MoveButton::Left));
        bus.publish(Signal::ButtonReleased(MoveButton::Left));
        bus.publish(Signal::ButtonPressed(MoveButton::Jump));
        assert_eq!(
            bus.drain(inbox),
            vec![
                Signal::ButtonPressed(MoveButton::Left),
                Signal::ButtonPressed(MoveButton::Jump)
            ]
        );
        assert!(bus.drain(inbox).is_empty());
    }

    #[test]
    fn subscribe_is_idempotent() {
        let bus = SignalBus::new();
        let inbox = bus.register_mailbox();
        assert!(bus.subscribe(SignalKind::MenuClosed, inbox));
        assert!(!bus.subscribe(SignalKind::MenuClosed, inbox));
        assert_eq!(bus.subscriber_count(SignalKind::MenuClosed), 1);
        bus.publish(Signal::MenuClosed);
        assert_eq!(bus.drain(inbox).len(), 1);
    }

    #[test]
    fn handlers_run_in_subscription_order() {
        let bus = SignalBus::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let a_log = Rc::clone(&log);
        let a = bus.register_handler(move |_, _| {
            a_log.borrow_mut().push("a-start");
            a_log.borrow_mut().push("a-end");
        });
        let b_log = Rc::clone(&log);
        let b = bus.register_handler(move |_, _| b_log.borrow_mut().push("b"));
        bus.subscribe(SignalKind::CutSceneFinished, a);
        bus.subscribe(SignalKind::CutSceneFinished, b);
        bus.publish(Signal::CutSceneFinished);
        assert_eq!(*log.borrow(), vec!["a-start", "a-end", "b"]);
    }

    #[test]
    fn unsubscribe_without_subscribe_is_noop() {
        let bus = SignalBus::new();
        let inbox = bus.register_mailbox();
        assert!(!bus.unsubscribe(SignalKind::MenuClosed, inbox));
        assert!(bus.subscribe(SignalKind::MenuClosed, inbox));
        assert!(bus.unsubscribe(SignalKind::MenuClosed, inbox));
        assert!(!bus.unsubscribe(SignalKind::MenuClosed, inbox));
        assert_eq!(bus.subscriber_count(SignalKind::MenuClosed), 0);
    }

    #[test]
    fn publish_without_subscribers_is_noop() {
        let bus = SignalBus::new();
        bus.publish(Signal::CutSceneStarting);
        assert_eq!(bus.subscriber_count(SignalKind::CutSceneStarting), 0);
    }

    #[test]
    fn handler_may_publish_and_resubscribe() {
        let bus = SignalBus::new();
        let inbox = bus.register_mailbox();
        bus.subscribe(SignalKind::MenuClosed, inbox);
        let relay = bus.register_handler(|signal, bus| {
            if *signal == Signal::CutSceneStarting {
                bus.publish(Signal::MenuClosed);
            }
        });
        bus.subscribe(SignalKind::CutSceneStarting, relay);
        bus.publish(Signal::CutSceneStarting);
        assert_eq!(bus.drain(inbox), vec![Signal::MenuClosed]);
    }

    #[test]
    fn late_subscriber_misses_current_dispatch() {
        let bus = SignalBus::new();
        let late = bus.register_mailbox();
        let adder = bus.register_handler(move |_, bus| {
            bus.subscribe(SignalKind::MenuClosed, late);
        });
        bus.subscribe(SignalKind::MenuClosed, adder);
        bus.publish(Signal::MenuClosed);
        assert!(bus.drain(late).is_empty());
        bus.publish(Signal::MenuClosed);
        assert_eq!(bus.drain(late).len(), 1);
    }

    #[test]
    fn handler_unsubscribing_itself_still_completes_dispatch() {
        let bus = SignalBus::new();
        let hits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&hits);
        let id = Rc::new(Cell::new(None));
        let own = Rc::clone(&id);
        let once = bus.register_handler(move |_, bus| {
            counter.set(counter.get() + 1);
            if let Some(me) = own.get() {
                bus.unsubscribe(SignalKind::MenuClosed, me);
            }
        });
        id.set(Some(once));
        let inbox = bus.register_mailbox();
        bus.subscribe(SignalKind::MenuClosed, once);
        bus.subscribe(SignalKind::MenuClosed, inbox);
        bus.publish(Signal::MenuClosed);
        bus.publish(Signal::MenuClosed);
        assert_eq!(hits.get(), 1);
        assert_eq!(bus.drain(inbox).len(), 2);
    }

    #[test]
    fn deregister_and_clear() {
        let bus = SignalBus::new();
        let a = bus.register_mailbox();
        let b = bus.register_mailbox();
        bus.subscribe(SignalKind::MenuClosed, a);
        bus.subscribe(SignalKind::CutSceneFinished, a);
        bus.subscribe(SignalKind::MenuClosed, b);
        bus.deregister(a);
        assert!(!bus.subscribe(SignalKind::MenuClosed, a));
        assert_eq!(bus.subscriber_count(SignalKind::MenuClosed), 1);
        assert_eq!(bus.subscriber_count(SignalKind::CutSceneFinished), 0);
        bus.clear();
        assert_eq!(bus.subscriber_count(SignalKind::MenuClosed), 0);
        assert!(bus.drain(b).is_empty());
    }
}
