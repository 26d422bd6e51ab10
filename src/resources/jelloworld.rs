//! Global jello state shared by every jelloporter.
use bevy_ecs::prelude::Resource;
use log::{info, warn};

use crate::components::jelloporter::JelloState;

/// The process-wide [`JelloState`] toggle.
///
/// Only a rider starting a jelloportation writes it, and at most once per
/// frame; a second write in the same frame is a wiring bug.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct JelloWorld {
    state: JelloState,
    last_write: Option<u64>,
}

impl JelloWorld {
    pub fn new(state: JelloState) -> Self {
        Self {
            state,
            last_write: None,
        }
    }

    pub fn get(&self) -> JelloState {
        self.state
    }

    /// Write the state for `frame`.
    pub fn set(&mut self, state: JelloState, frame: u64) {
        debug_assert!(
            self.last_write != Some(frame),
            "jello state written twice in frame {frame}"
        );
        if self.last_write == Some(frame) {
            warn!("jello state written twice in frame {}", frame);
        }
        info!("jello state {:?} -> {:?}", self.state, state);
        self.state = state;
        self.last_write = Some(frame);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_on_distinct_frames() {
        let mut jello = JelloWorld::default();
        jello.set(JelloState::PinkDownGreenUp, 1);
        jello.set(JelloState::PinkUpGreenDown, 2);
        assert_eq!(jello.get(), JelloState::PinkUpGreenDown);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "written twice")]
    fn second_write_in_frame_asserts() {
        let mut jello = JelloWorld::default();
        jello.set(JelloState::PinkDownGreenUp, 7);
        jello.set(JelloState::PinkUpGreenDown, 7);
    }
}
