//! Player character behaviour.
//!
//! [`CharacterState`] is the closed set of character modes. Families:
//!
//! - grounded: `Idle`, `Run{Left,Right}`, `Push{Left,Right}`
//! - airborne: `Jump{Left,Right}` and the 3×2 flight lattice
//!   `Fly{Up,Top,Down}{Left,Right}`
//! - attack: `{Standing,Running,Flying}Kick{Left,Right}`
//! - lifecycle: `WaitToStart`, `EnterJelloporter`, `RideJelloporter`,
//!   `ExitJelloporter`, `Die`, `Respawn`
//!
//! Signal callbacks only record an [`Intent`] into the state's [`Pending`]
//! slot; `tick` decides. Death and jelloporter contact are checked before
//! anything else, so they pre-empt a locked attack, while movement intents
//! wait for the lock to be released.

use bevy_ecs::prelude::Entity;
use glam::Vec2;
use log::{debug, warn};

use crate::components::animation::Animator;
use crate::components::boxcollider::BoxCollider;
use crate::components::character::{Character, CharacterId, Facing};
use crate::components::mapposition::MapPosition;
use crate::components::rigidbody::RigidBody;
use crate::components::sensors::Sensors;
use crate::events::input::MoveButton;
use crate::events::signal::{Signal, SignalKind};
use crate::fsm::MachineState;
use crate::resources::directory::JelloporterDirectory;
use crate::resources::gameconfig::GameConfig;
use crate::resources::input::InputState;
use crate::resources::jelloworld::JelloWorld;
use crate::resources::signalbus::SignalBus;

/// Everything a character state may read or write during one update.
pub struct CharacterContext<'a> {
    pub entity: Entity,
    pub character: &'a mut Character,
    pub body: &'a mut RigidBody,
    pub position: &'a mut MapPosition,
    pub animator: &'a mut Animator,
    pub collider: &'a mut BoxCollider,
    pub sensors: Sensors,
    pub input: &'a InputState,
    pub bus: &'a SignalBus,
    pub jello: &'a mut JelloWorld,
    /// Character currently in control, per the game flow.
    pub active: Option<CharacterId>,
    pub directory: &'a JelloporterDirectory,
    pub tuning: &'a GameConfig,
    pub delta: f32,
    pub frame: u64,
}

impl CharacterContext<'_> {
    pub fn is_active(&self) -> bool {
        self.active == Some(self.character.id)
    }

    pub fn upping(&self) -> bool {
        self.body.velocity.y > self.tuning.apex_velocity
    }

    pub fn topping(&self) -> bool {
        self.body.velocity.y.abs() < self.tuning.apex_velocity
    }

    pub fn downing(&self) -> bool {
        self.body.velocity.y < -self.tuning.apex_velocity
    }

    /// Standing on ground and not moving up off it.
    pub fn landed(&self) -> bool {
        self.sensors.grounded && !self.upping()
    }

    fn blocked(&self, facing: Facing) -> bool {
        match facing {
            Facing::Left => self.sensors.blocked_left,
            Facing::Right => self.sensors.blocked_right,
        }
    }

    /// Horizontal direction held by the player, if this character is in control.
    fn held(&self) -> Option<Facing> {
        if !self.is_active() {
            return None;
        }
        self.input.horizontal().and_then(Facing::from_button)
    }

    fn face(&mut self, facing: Facing) {
        self.character.facing = facing;
        self.animator.set_facing(facing == Facing::Left);
    }

    fn run(&mut self, facing: Facing) {
        self.body.velocity.x = facing.sign() * self.tuning.run_velocity;
    }

    fn stop(&mut self) {
        self.body.velocity.x = 0.0;
    }

    fn exit_velocity(&self, right: bool) -> Vec2 {
        let sign = if right { 1.0 } else { -1.0 };
        Vec2::new(sign * self.tuning.exit_velocity_x, self.tuning.exit_velocity_y)
    }
}

/// Vertical velocity band used by the flight lattice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VelocityBand {
    Up,
    Top,
    Down,
}

impl VelocityBand {
    /// Band of `vy`. Exactly on a band boundary the `current` band is kept.
    pub fn classify(vy: f32, apex: f32, current: Option<VelocityBand>) -> VelocityBand {
        if vy > apex {
            VelocityBand::Up
        } else if vy < -apex {
            VelocityBand::Down
        } else if vy.abs() < apex {
            VelocityBand::Top
        } else {
            current.unwrap_or(VelocityBand::Top)
        }
    }

    /// One lattice step towards `target`; Up and Down are never adjacent.
    pub fn step_towards(self, target: VelocityBand) -> VelocityBand {
        match (self, target) {
            (a, b) if a == b => a,
            (VelocityBand::Top, b) => b,
            _ => VelocityBand::Top,
        }
    }

    fn trigger(self) -> &'static str {
        match self {
            VelocityBand::Up => "JumpUp",
            VelocityBand::Top => "JumpTop",
            VelocityBand::Down => "JumpDown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttackKind {
    Standing,
    Running,
    Flying,
}

impl AttackKind {
    fn trigger(self) -> &'static str {
        match self {
            AttackKind::Standing => "StandingKick",
            AttackKind::Running => "RunningKick",
            AttackKind::Flying => "FlyingKick",
        }
    }
}

/// Transition recorded by a signal callback, applied by the next `tick`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// The held direction was released.
    Stop,
    Run(Facing),
    Jump,
    Kick,
    Teleport(Entity),
    Die,
}

/// Ordering between competing intents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Priority {
    Release,
    Press,
    Teleport,
    Death,
}

impl Intent {
    pub fn priority(self) -> Priority {
        match self {
            Intent::Stop => Priority::Release,
            Intent::Run(_) | Intent::Jump | Intent::Kick => Priority::Press,
            Intent::Teleport(_) => Priority::Teleport,
            Intent::Die => Priority::Death,
        }
    }
}

/// Single-slot pending transition. A lower-priority intent never replaces a
/// higher one; an equal one replaces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pending(Option<Intent>);

impl Pending {
    pub fn offer(&mut self, intent: Intent) {
        match self.0 {
            Some(current) if current.priority() > intent.priority() => {}
            _ => self.0 = Some(intent),
        }
    }

    pub fn get(&self) -> Option<Intent> {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CharacterState {
    WaitToStart {
        pending: Pending,
    },
    Idle {
        pending: Pending,
    },
    Run {
        facing: Facing,
        pending: Pending,
    },
    Push {
        facing: Facing,
        pending: Pending,
    },
    Jump {
        facing: Facing,
        pending: Pending,
    },
    Fly {
        band: VelocityBand,
        facing: Facing,
        pending: Pending,
    },
    Attack {
        kind: AttackKind,
        facing: Facing,
        locked: bool,
        finished: bool,
        pending: Pending,
    },
    EnterJelloporter {
        jelloporter: Entity,
    },
    RideJelloporter {
        jelloporter: Entity,
        destination: Option<Entity>,
        arrived: Option<Entity>,
    },
    ExitJelloporter {
        jelloporter: Entity,
        plate: Entity,
    },
    Die {
        elapsed: f32,
    },
    Respawn {
        elapsed: f32,
    },
}

const GROUNDED_SIGNALS: &[SignalKind] = &[
    SignalKind::ButtonPressed,
    SignalKind::ButtonReleased,
    SignalKind::MonsterAttackedPlayer,
    SignalKind::PlayerHitJelloporter,
];
const AIRBORNE_SIGNALS: &[SignalKind] = &[
    SignalKind::ButtonPressed,
    SignalKind::MonsterAttackedPlayer,
    SignalKind::PlayerHitJelloporter,
];
const ATTACK_SIGNALS: &[SignalKind] = &[
    SignalKind::ButtonPressed,
    SignalKind::AttackLockReleased,
    SignalKind::AttackAnimationFinished,
    SignalKind::MonsterAttackedPlayer,
    SignalKind::PlayerHitJelloporter,
];

impl CharacterState {
    pub fn wait_to_start() -> Self {
        CharacterState::WaitToStart {
            pending: Pending::default(),
        }
    }

    pub fn idle() -> Self {
        CharacterState::Idle {
            pending: Pending::default(),
        }
    }

    pub fn run(facing: Facing) -> Self {
        CharacterState::Run {
            facing,
            pending: Pending::default(),
        }
    }

    pub fn push(facing: Facing) -> Self {
        CharacterState::Push {
            facing,
            pending: Pending::default(),
        }
    }

    pub fn jump(facing: Facing) -> Self {
        CharacterState::Jump {
            facing,
            pending: Pending::default(),
        }
    }

    pub fn fly(band: VelocityBand, facing: Facing) -> Self {
        CharacterState::Fly {
            band,
            facing,
            pending: Pending::default(),
        }
    }

    pub fn attack(kind: AttackKind, facing: Facing) -> Self {
        CharacterState::Attack {
            kind,
            facing,
            locked: true,
            finished: false,
            pending: Pending::default(),
        }
    }

    pub fn die() -> Self {
        CharacterState::Die { elapsed: 0.0 }
    }

    fn pending_mut(&mut self) -> Option<&mut Pending> {
        match self {
            CharacterState::WaitToStart { pending }
            | CharacterState::Idle { pending }
            | CharacterState::Run { pending, .. }
            | CharacterState::Push { pending, .. }
            | CharacterState::Jump { pending, .. }
            | CharacterState::Fly { pending, .. }
            | CharacterState::Attack { pending, .. } => Some(pending),
            _ => None,
        }
    }

    /// Pending death or jelloporter entry, checked first in every tick.
    fn interrupt(pending: Pending) -> Option<Self> {
        match pending.get() {
            Some(Intent::Die) => Some(Self::die()),
            Some(Intent::Teleport(jelloporter)) => {
                Some(CharacterState::EnterJelloporter { jelloporter })
            }
            _ => None,
        }
    }

    /// Where a character goes once its feet are on the ground.
    pub fn landing(ctx: &CharacterContext) -> Self {
        if !ctx.is_active() {
            return Self::wait_to_start();
        }
        match ctx.held() {
            Some(facing) => Self::run(facing),
            None => Self::idle(),
        }
    }

    /// Where a rider goes on touching down after a ride. The flow hands it
    /// control once [`Signal::JelloportationFinished`] is out, so the held
    /// direction is read without the active check.
    pub fn rider_landing(ctx: &CharacterContext) -> Self {
        match ctx.input.horizontal().and_then(Facing::from_button) {
            Some(facing) => Self::run(facing),
            None => Self::idle(),
        }
    }

    /// Flight state matching the current vertical velocity.
    pub fn airborne(ctx: &CharacterContext, facing: Facing) -> Self {
        let band = VelocityBand::classify(ctx.body.velocity.y, ctx.tuning.apex_velocity, None);
        Self::fly(band, ctx.held().unwrap_or(facing))
    }

    fn abort_teleport(ctx: &mut CharacterContext) -> Self {
        ctx.body.unfreeze();
        Self::idle()
    }
}

impl<'a> MachineState<CharacterContext<'a>> for CharacterState {
    fn label(&self) -> &'static str {
        use CharacterState::*;
        use VelocityBand::*;
        match self {
            WaitToStart { .. } => "WaitToStart",
            Idle { .. } => "Idle",
            Run { facing: Facing::Left, .. } => "RunLeft",
            Run { facing: Facing::Right, .. } => "RunRight",
            Push { facing: Facing::Left, .. } => "PushLeft",
            Push { facing: Facing::Right, .. } => "PushRight",
            Jump { facing: Facing::Left, .. } => "JumpLeft",
            Jump { facing: Facing::Right, .. } => "JumpRight",
            Fly { band, facing, .. } => match (band, facing) {
                (Up, Facing::Left) => "FlyUpLeft",
                (Up, Facing::Right) => "FlyUpRight",
                (Top, Facing::Left) => "FlyTopLeft",
                (Top, Facing::Right) => "FlyTopRight",
                (Down, Facing::Left) => "FlyDownLeft",
                (Down, Facing::Right) => "FlyDownRight",
            },
            Attack { kind, facing, .. } => match (kind, facing) {
                (AttackKind::Standing, Facing::Left) => "StandingKickLeft",
                (AttackKind::Standing, Facing::Right) => "StandingKickRight",
                (AttackKind::Running, Facing::Left) => "RunningKickLeft",
                (AttackKind::Running, Facing::Right) => "RunningKickRight",
                (AttackKind::Flying, Facing::Left) => "FlyingKickLeft",
                (AttackKind::Flying, Facing::Right) => "FlyingKickRight",
            },
            EnterJelloporter { .. } => "EnterJelloporter",
            RideJelloporter { .. } => "RideJelloporter",
            ExitJelloporter { .. } => "ExitJelloporter",
            Die { .. } => "Die",
            Respawn { .. } => "Respawn",
        }
    }

    fn subscriptions(&self) -> &'static [SignalKind] {
        match self {
            CharacterState::WaitToStart { .. } => &[SignalKind::MonsterAttackedPlayer],
            CharacterState::Idle { .. }
            | CharacterState::Run { .. }
            | CharacterState::Push { .. } => GROUNDED_SIGNALS,
            CharacterState::Jump { .. } | CharacterState::Fly { .. } => AIRBORNE_SIGNALS,
            CharacterState::Attack { .. } => ATTACK_SIGNALS,
            CharacterState::RideJelloporter { .. } => &[SignalKind::JelloporterArrivedAtPlate],
            CharacterState::EnterJelloporter { .. }
            | CharacterState::ExitJelloporter { .. }
            | CharacterState::Die { .. }
            | CharacterState::Respawn { .. } => &[],
        }
    }

    fn enter(&mut self, ctx: &mut CharacterContext<'a>) {
        match *self {
            CharacterState::WaitToStart { .. } | CharacterState::Idle { .. } => {
                ctx.stop();
                ctx.animator.fire("Idle");
            }
            CharacterState::Run { facing, .. } => {
                ctx.face(facing);
                ctx.animator.fire("Run");
            }
            CharacterState::Push { facing, .. } => {
                ctx.face(facing);
                ctx.animator.fire("Push");
            }
            CharacterState::Jump { facing, .. } => {
                ctx.body.velocity.y = ctx.tuning.jump_velocity;
                ctx.face(facing);
                ctx.animator.fire("JumpUp");
            }
            CharacterState::Fly { band, facing, .. } => {
                ctx.face(facing);
                ctx.animator.fire(band.trigger());
            }
            CharacterState::Attack { kind, facing, .. } => {
                ctx.face(facing);
                ctx.character.attacking = true;
                match kind {
                    AttackKind::Standing => ctx.stop(),
                    AttackKind::Running => ctx.run(facing),
                    AttackKind::Flying => ctx.character.can_jump_kick = false,
                }
                ctx.animator.fire(kind.trigger());
            }
            CharacterState::EnterJelloporter { .. } => {
                ctx.character.attacking = false;
                ctx.body.freeze();
                ctx.animator.fire("Idle");
            }
            CharacterState::RideJelloporter {
                jelloporter,
                ref mut destination,
                ..
            } => {
                let next = ctx.directory.next_state(jelloporter);
                let plate = next.and_then(|state| ctx.directory.destination(jelloporter, state));
                match (next, plate) {
                    (Some(new_jello_state), Some(destination_plate)) => {
                        *destination = Some(destination_plate);
                        ctx.jello.set(new_jello_state, ctx.frame);
                        ctx.bus.publish(Signal::JelloportationStarted {
                            character: ctx.entity,
                            rider: ctx.character.id,
                            jelloporter,
                            new_jello_state,
                            destination_plate,
                        });
                    }
                    _ => {
                        debug_assert!(false, "jelloporter {jelloporter:?} has no plates");
                        warn!("jelloporter {:?} has no plates, aborting ride", jelloporter);
                    }
                }
            }
            CharacterState::ExitJelloporter { jelloporter, plate } => {
                ctx.body.unfreeze();
                let exit_right = match ctx.directory.plate(plate) {
                    Some(entry) => {
                        ctx.position.pos = entry.position;
                        entry.exit_right
                    }
                    None => {
                        warn!("exit plate {:?} is not in the directory", plate);
                        ctx.character.facing == Facing::Right
                    }
                };
                ctx.body.set_velocity(ctx.exit_velocity(exit_right));
                ctx.face(if exit_right { Facing::Right } else { Facing::Left });
                ctx.animator.fire("JumpUp");
                ctx.character.waypoint = Some(plate);
                ctx.bus.publish(Signal::PlayerExitingJelloporter {
                    jelloporter,
                    character: ctx.entity,
                    plate,
                });
            }
            CharacterState::Die { .. } => {
                ctx.character.attacking = false;
                ctx.collider.enabled = false;
                ctx.body.freeze();
                ctx.animator.fire("Die");
            }
            CharacterState::Respawn { .. } => {
                let (position, exit_right) = match ctx
                    .character
                    .waypoint
                    .and_then(|plate| ctx.directory.plate(plate))
                {
                    Some(entry) => (entry.position, entry.exit_right),
                    None => (ctx.character.spawn, ctx.character.facing == Facing::Right),
                };
                ctx.position.pos = position;
                ctx.body.unfreeze();
                ctx.body.set_velocity(ctx.exit_velocity(exit_right));
                ctx.face(if exit_right { Facing::Right } else { Facing::Left });
                ctx.animator.fire("Respawn");
            }
        }
    }

    fn on_signal(&mut self, signal: &Signal, ctx: &mut CharacterContext<'a>) {
        let me = ctx.entity;
        match *signal {
            Signal::MonsterAttackedPlayer { character, .. } if character == me => {
                if let Some(pending) = self.pending_mut() {
                    pending.offer(Intent::Die);
                }
                return;
            }
            Signal::PlayerHitJelloporter {
                character,
                jelloporter,
            } if character == me => {
                if let Some(pending) = self.pending_mut() {
                    pending.offer(Intent::Teleport(jelloporter));
                }
                return;
            }
            _ => {}
        }

        let active = ctx.is_active();
        match (&mut *self, *signal) {
            (
                CharacterState::Idle { pending },
                Signal::ButtonPressed(button),
            ) if active => match button {
                MoveButton::Left => pending.offer(Intent::Run(Facing::Left)),
                MoveButton::Right => pending.offer(Intent::Run(Facing::Right)),
                MoveButton::Jump => pending.offer(Intent::Jump),
                MoveButton::Attack => pending.offer(Intent::Kick),
                MoveButton::Switch | MoveButton::Down => {}
            },
            (
                CharacterState::Run { facing, pending } | CharacterState::Push { facing, pending },
                Signal::ButtonPressed(button),
            ) if active => match button {
                MoveButton::Jump => pending.offer(Intent::Jump),
                MoveButton::Attack => pending.offer(Intent::Kick),
                b if Facing::from_button(b) == Some(facing.opposite()) => {
                    pending.offer(Intent::Run(facing.opposite()))
                }
                _ => {}
            },
            (
                CharacterState::Run { facing, pending } | CharacterState::Push { facing, pending },
                Signal::ButtonReleased(button),
            ) if active && button == facing.button() => pending.offer(Intent::Stop),
            (
                CharacterState::Jump { pending, .. } | CharacterState::Fly { pending, .. },
                Signal::ButtonPressed(MoveButton::Attack),
            ) if active => pending.offer(Intent::Kick),
            (CharacterState::Attack { locked, finished, .. }, signal) => match signal {
                Signal::AttackLockReleased { character } if character == me => *locked = false,
                Signal::AttackAnimationFinished { character } if character == me => {
                    *locked = false;
                    *finished = true;
                }
                _ => {}
            },
            _ => {}
        }

        // Movement presses during a kick are remembered for when it unlocks.
        if let (CharacterState::Attack { pending, .. }, Signal::ButtonPressed(button)) =
            (&mut *self, *signal)
        {
            if active {
                match button {
                    MoveButton::Left => pending.offer(Intent::Run(Facing::Left)),
                    MoveButton::Right => pending.offer(Intent::Run(Facing::Right)),
                    MoveButton::Jump => pending.offer(Intent::Jump),
                    _ => {}
                }
            }
        }

        if let (
            CharacterState::RideJelloporter {
                jelloporter,
                arrived,
                ..
            },
            Signal::JelloporterArrivedAtPlate {
                jelloporter: which,
                plate,
            },
        ) = (&mut *self, *signal)
        {
            if which == *jelloporter {
                *arrived = Some(plate);
            }
        }
    }

    fn tick(&mut self, ctx: &mut CharacterContext<'a>) -> Option<Self> {
        match *self {
            CharacterState::WaitToStart { pending } => {
                if let Some(next) = Self::interrupt(pending) {
                    return Some(next);
                }
                if !ctx.is_active() {
                    return None;
                }
                if ctx.sensors.grounded {
                    Some(Self::landing(ctx))
                } else {
                    Some(Self::airborne(ctx, ctx.character.facing))
                }
            }

            CharacterState::Idle { pending } => {
                if let Some(next) = Self::interrupt(pending) {
                    return Some(next);
                }
                if !ctx.is_active() {
                    return Some(Self::wait_to_start());
                }
                if !ctx.sensors.grounded {
                    return Some(Self::airborne(ctx, ctx.character.facing));
                }
                match pending.get() {
                    Some(Intent::Run(facing)) => Some(Self::run(facing)),
                    Some(Intent::Jump) => Some(Self::jump(ctx.character.facing)),
                    Some(Intent::Kick) => {
                        Some(Self::attack(AttackKind::Standing, ctx.character.facing))
                    }
                    _ => None,
                }
            }

            CharacterState::Run { facing, pending } | CharacterState::Push { facing, pending } => {
                let pushing = matches!(self, CharacterState::Push { .. });
                if let Some(next) = Self::interrupt(pending) {
                    return Some(next);
                }
                if !ctx.is_active() {
                    return Some(Self::wait_to_start());
                }
                if !ctx.sensors.grounded {
                    return Some(Self::airborne(ctx, facing));
                }
                match pending.get() {
                    Some(Intent::Run(other)) if other != facing => return Some(Self::run(other)),
                    Some(Intent::Jump) => return Some(Self::jump(facing)),
                    Some(Intent::Kick) => return Some(Self::attack(AttackKind::Running, facing)),
                    Some(Intent::Stop) => {
                        return Some(match ctx.held() {
                            Some(other) if other != facing => Self::run(other),
                            _ => Self::idle(),
                        });
                    }
                    _ => {}
                }
                let blocked = ctx.blocked(facing);
                if blocked && !pushing {
                    return Some(Self::push(facing));
                }
                if !blocked && pushing {
                    return Some(Self::run(facing));
                }
                ctx.run(facing);
                None
            }

            CharacterState::Jump { facing, pending } => {
                if let Some(next) = Self::interrupt(pending) {
                    return Some(next);
                }
                if ctx.sensors.grounded {
                    if ctx.upping() {
                        return None;
                    }
                    return Some(Self::landing(ctx));
                }
                if pending.get() == Some(Intent::Kick) && ctx.character.can_jump_kick {
                    return Some(Self::attack(AttackKind::Flying, facing));
                }
                Some(Self::fly(VelocityBand::Up, facing))
            }

            CharacterState::Fly {
                band,
                facing,
                pending,
            } => {
                if let Some(next) = Self::interrupt(pending) {
                    return Some(next);
                }
                if ctx.landed() {
                    return Some(Self::landing(ctx));
                }
                let held = ctx.held();
                let next_facing = held.unwrap_or(facing);
                if pending.get() == Some(Intent::Kick) && ctx.character.can_jump_kick {
                    return Some(Self::attack(AttackKind::Flying, next_facing));
                }
                if let Some(steer) = held {
                    ctx.run(steer);
                }
                let target = VelocityBand::classify(
                    ctx.body.velocity.y,
                    ctx.tuning.apex_velocity,
                    Some(band),
                );
                let next_band = band.step_towards(target);
                if next_band != band || next_facing != facing {
                    Some(Self::fly(next_band, next_facing))
                } else {
                    None
                }
            }

            CharacterState::Attack {
                kind,
                facing,
                locked,
                finished,
                pending,
            } => {
                if let Some(next) = Self::interrupt(pending) {
                    return Some(next);
                }
                if locked {
                    return None;
                }
                if ctx.sensors.grounded && kind != AttackKind::Flying {
                    match pending.get() {
                        Some(Intent::Run(dir)) if ctx.held() == Some(dir) => {
                            return Some(Self::run(dir));
                        }
                        Some(Intent::Jump) => return Some(Self::jump(facing)),
                        _ => {}
                    }
                }
                if !finished {
                    return None;
                }
                if ctx.landed() {
                    Some(Self::landing(ctx))
                } else if ctx.sensors.grounded {
                    None
                } else {
                    Some(Self::airborne(ctx, facing))
                }
            }

            CharacterState::EnterJelloporter { jelloporter } => {
                let entry = ctx.directory.jelloporter(jelloporter);
                debug_assert!(entry.is_some(), "entering unknown jelloporter {jelloporter:?}");
                let Some(entry) = entry else {
                    warn!("jelloporter {:?} vanished, back to idle", jelloporter);
                    return Some(Self::abort_teleport(ctx));
                };
                let target = entry.position;
                let step = ctx.tuning.jelloporter_enter_speed * ctx.delta;
                if ctx.position.move_towards(target, step) == target {
                    Some(CharacterState::RideJelloporter {
                        jelloporter,
                        destination: None,
                        arrived: None,
                    })
                } else {
                    None
                }
            }

            CharacterState::RideJelloporter {
                jelloporter,
                destination,
                arrived,
            } => {
                if destination.is_none() {
                    return Some(Self::abort_teleport(ctx));
                }
                if let Some(entry) = ctx.directory.jelloporter(jelloporter) {
                    ctx.position.pos = entry.position;
                }
                if let Some(plate) = arrived {
                    if destination != Some(plate) {
                        debug!(
                            "jelloporter {:?} arrived at {:?}, expected {:?}",
                            jelloporter, plate, destination
                        );
                    }
                    return Some(CharacterState::ExitJelloporter { jelloporter, plate });
                }
                None
            }

            CharacterState::ExitJelloporter { .. } => {
                if ctx.landed() {
                    Some(Self::rider_landing(ctx))
                } else {
                    None
                }
            }

            CharacterState::Die { ref mut elapsed } => {
                *elapsed += ctx.delta;
                if *elapsed >= ctx.tuning.death_duration {
                    Some(CharacterState::Respawn { elapsed: 0.0 })
                } else {
                    None
                }
            }

            CharacterState::Respawn { ref mut elapsed } => {
                *elapsed += ctx.delta;
                if !ctx.collider.enabled && *elapsed >= ctx.tuning.respawn_grace {
                    ctx.collider.enabled = true;
                }
                if ctx.collider.enabled && ctx.landed() {
                    Some(Self::landing(ctx))
                } else {
                    None
                }
            }
        }
    }

    fn exit(&mut self, ctx: &mut CharacterContext<'a>) {
        match *self {
            CharacterState::Attack { .. } => ctx.character.attacking = false,
            CharacterState::ExitJelloporter { jelloporter, .. } => {
                ctx.bus.publish(Signal::JelloportationFinished {
                    character: ctx.entity,
                    jelloporter,
                });
            }
            CharacterState::Respawn { .. } => ctx.collider.enabled = true,
            _ => {}
        }
    }
}
