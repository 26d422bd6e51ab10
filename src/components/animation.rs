//! Animation trigger sink.
//!
//! The game core never plays animations itself; it fires named triggers
//! ("Idle", "Jump", "StandingKick", "Die", ...) and sets the sprite facing.
//! [`Animator`] records the active clip and how long it has been playing so
//! the [`animation_events`](crate::systems::animation::animation_events)
//! system can emit timing signals for kick clips.
use std::collections::VecDeque;

use bevy_ecs::prelude::Component;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Component, Default, Serialize, Deserialize)]
pub struct Animator {
    /// Last trigger fired.
    pub clip: String,
    /// Seconds since `clip` was fired.
    pub clip_time: f32,
    /// Sprite is mirrored (facing left).
    pub flipped: bool,
    /// Timing signals already emitted for the current clip, as bit flags.
    pub emitted: u8,
    /// Most recent triggers not yet collected by [`take_fired`](Self::take_fired),
    /// at most [`HISTORY`](Self::HISTORY) of them.
    #[serde(skip)]
    fired: VecDeque<String>,
}

impl Animator {
    pub const LOCK_RELEASED: u8 = 1;
    pub const FINISHED: u8 = 2;
    pub const HISTORY: usize = 16;

    pub fn new(clip: impl Into<String>) -> Self {
        Self {
            clip: clip.into(),
            ..Default::default()
        }
    }

    /// Fire-and-forget trigger; restarts the clip clock.
    pub fn fire(&mut self, trigger: impl Into<String>) {
        let trigger = trigger.into();
        if self.fired.len() == Self::HISTORY {
            self.fired.pop_front();
        }
        self.fired.push_back(trigger.clone());
        self.clip = trigger;
        self.clip_time = 0.0;
        self.emitted = 0;
    }

    pub fn set_facing(&mut self, flipped: bool) {
        self.flipped = flipped;
    }

    pub fn advance(&mut self, delta: f32) {
        self.clip_time += delta;
    }

    /// Triggers fired since the previous call, oldest first. Older ones
    /// are dropped once the history is full.
    pub fn take_fired(&mut self) -> Vec<String> {
        self.fired.drain(..).collect()
    }

    /// Whether the most recent trigger was `name`.
    pub fn is_playing(&self, name: &str) -> bool {
        self.clip == name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fire_resets_clock() {
        let mut a = Animator::new("Idle");
        a.advance(0.5);
        a.emitted = Animator::LOCK_RELEASED;
        a.fire("StandingKick");
        assert!(a.is_playing("StandingKick"));
        assert_eq!(a.clip_time, 0.0);
        assert_eq!(a.emitted, 0);
        assert_eq!(a.take_fired(), vec!["StandingKick".to_string()]);
        assert!(a.take_fired().is_empty());
    }

    #[test]
    fn history_keeps_latest_triggers() {
        let mut a = Animator::new("Idle");
        for i in 0..40 {
            a.fire(format!("Clip{i}"));
        }
        let fired = a.take_fired();
        assert_eq!(fired.len(), Animator::HISTORY);
        assert_eq!(fired.first().map(String::as_str), Some("Clip24"));
        assert_eq!(fired.last().map(String::as_str), Some("Clip39"));
    }
}
