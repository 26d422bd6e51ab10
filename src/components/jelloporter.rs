//! Jelloporter (paired-plate teleporter) components.
//!
//! A [`Jelloporter`] travels between its top and bottom [`JelloPlate`]. Which
//! plate is "up" for each color is decided by the global [`JelloState`]:
//!
//! | state               | pink goes to | green goes to |
//! |---------------------|--------------|---------------|
//! | `PinkUpGreenDown`   | top          | bottom        |
//! | `PinkDownGreenUp`   | bottom       | top           |
//!
//! Riding a jelloporter always takes the rider to the plate farther from
//! where the jelloporter currently stands: [`JelloporterColor::choose_next_state`]
//! picks the global state whose destination is the opposite plate.

use bevy_ecs::prelude::{Component, Entity};
use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Global binary toggle selecting the "up" plate per color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JelloState {
    #[default]
    PinkUpGreenDown,
    PinkDownGreenUp,
}

impl JelloState {
    pub fn flipped(self) -> Self {
        match self {
            JelloState::PinkUpGreenDown => JelloState::PinkDownGreenUp,
            JelloState::PinkDownGreenUp => JelloState::PinkUpGreenDown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JelloporterColor {
    Pink,
    Green,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlateSide {
    Top,
    Bottom,
}

impl PlateSide {
    pub fn opposite(self) -> Self {
        match self {
            PlateSide::Top => PlateSide::Bottom,
            PlateSide::Bottom => PlateSide::Top,
        }
    }
}

impl JelloporterColor {
    /// Plate side a jelloporter of this color travels to under `state`.
    pub fn choose_destination(self, state: JelloState) -> PlateSide {
        match (self, state) {
            (JelloporterColor::Pink, JelloState::PinkUpGreenDown) => PlateSide::Top,
            (JelloporterColor::Pink, JelloState::PinkDownGreenUp) => PlateSide::Bottom,
            (JelloporterColor::Green, JelloState::PinkDownGreenUp) => PlateSide::Top,
            (JelloporterColor::Green, JelloState::PinkUpGreenDown) => PlateSide::Bottom,
        }
    }

    /// Global state that sends this color away from the `nearest` plate.
    pub fn choose_next_state(self, nearest: PlateSide) -> JelloState {
        match (self, nearest) {
            (JelloporterColor::Pink, PlateSide::Top) => JelloState::PinkDownGreenUp,
            (JelloporterColor::Pink, PlateSide::Bottom) => JelloState::PinkUpGreenDown,
            (JelloporterColor::Green, PlateSide::Top) => JelloState::PinkUpGreenDown,
            (JelloporterColor::Green, PlateSide::Bottom) => JelloState::PinkDownGreenUp,
        }
    }
}

/// Paired-plate teleporter.
#[derive(Component, Debug, Clone, Copy)]
pub struct Jelloporter {
    pub color: JelloporterColor,
    pub top_plate: Entity,
    pub bottom_plate: Entity,
    /// Travel speed between plates, world units per second.
    pub move_speed: f32,
    /// Contacts with characters are reported only while this is set.
    pub responds_to_collisions: bool,
}

impl Jelloporter {
    pub fn plate(&self, side: PlateSide) -> Entity {
        match side {
            PlateSide::Top => self.top_plate,
            PlateSide::Bottom => self.bottom_plate,
        }
    }

    pub fn choose_destination(&self, state: JelloState) -> Entity {
        self.plate(self.color.choose_destination(state))
    }

    /// Side of the plate closest to `position`. Ties go to the bottom plate.
    pub fn nearest_side(position: Vec2, top: Vec2, bottom: Vec2) -> PlateSide {
        if position.distance(top) < position.distance(bottom) {
            PlateSide::Top
        } else {
            PlateSide::Bottom
        }
    }

    pub fn choose_next_state(&self, position: Vec2, top: Vec2, bottom: Vec2) -> JelloState {
        self.color
            .choose_next_state(Self::nearest_side(position, top, bottom))
    }
}

/// One end of a jelloporter's route.
#[derive(Component, Debug, Clone)]
pub struct JelloPlate {
    pub jelloporter: Entity,
    pub side: PlateSide,
    /// Riders leave this plate moving right.
    pub exit_right: bool,
    /// Level name, used to attach cut-scene triggers.
    pub name: String,
}
