//! Cut-scene library, stage and director.
//!
//! The library holds the sequences loaded from the level; the stage holds the
//! three fading layers (backdrop, main slide, cross-fade slide). Both are
//! driven by [`CutSceneState`](crate::states::cutscene::CutSceneState).

use bevy_ecs::prelude::{Entity, Resource};
use serde::{Deserialize, Serialize};

use crate::fsm::{MachineState, StateMachine};
use crate::states::cutscene::CutSceneState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FadeType {
    #[default]
    Cross,
    Black,
}

/// A single image; `fade` is how the next slide replaces it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slide {
    pub image: String,
    #[serde(default)]
    pub fade: FadeType,
    #[serde(default)]
    pub end_game: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CutSceneSequence {
    /// Plate whose arrival plays this sequence. `None` for the intro.
    pub trigger_plate: Option<Entity>,
    pub slides: Vec<Slide>,
    pub finished: bool,
}

impl CutSceneSequence {
    pub fn new(trigger_plate: Option<Entity>, slides: Vec<Slide>) -> Self {
        Self {
            trigger_plate,
            slides,
            finished: false,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CutSceneLibrary {
    pub sequences: Vec<CutSceneSequence>,
    active: Option<usize>,
    active_slide: usize,
}

impl CutSceneLibrary {
    pub fn new(sequences: Vec<CutSceneSequence>) -> Self {
        Self {
            sequences,
            active: None,
            active_slide: 0,
        }
    }

    /// Make sequence `index` active from its first slide. False if unknown or empty.
    pub fn activate(&mut self, index: usize) -> bool {
        match self.sequences.get(index) {
            Some(sequence) if !sequence.slides.is_empty() => {
                self.active = Some(index);
                self.active_slide = 0;
                true
            }
            _ => false,
        }
    }

    /// First unwatched sequence triggered by `plate`.
    pub fn unplayed_for(&self, plate: Entity) -> Option<usize> {
        self.sequences
            .iter()
            .position(|s| s.trigger_plate == Some(plate) && !s.finished && !s.slides.is_empty())
    }

    pub fn active(&self) -> Option<usize> {
        self.active
    }

    pub fn active_slide_index(&self) -> usize {
        self.active_slide
    }

    fn active_sequence(&self) -> Option<&CutSceneSequence> {
        self.sequences.get(self.active?)
    }

    pub fn active_slide(&self) -> Option<&Slide> {
        self.active_sequence()?.slides.get(self.active_slide)
    }

    pub fn is_last_slide(&self) -> bool {
        self.active_sequence()
            .is_none_or(|s| self.active_slide + 1 >= s.slides.len())
    }

    pub fn is_end_game(&self) -> bool {
        self.active_slide().is_some_and(|s| s.end_game)
    }

    /// How the active slide hands over to the next one.
    pub fn next_fade(&self) -> FadeType {
        self.active_slide().map(|s| s.fade).unwrap_or_default()
    }

    pub fn advance_slide(&mut self) {
        self.active_slide += 1;
    }

    pub fn mark_finished(&mut self) {
        if let Some(sequence) = self.active.take().and_then(|i| self.sequences.get_mut(i)) {
            sequence.finished = true;
        }
        self.active_slide = 0;
    }
}

/// Alphas and contents of the three cut-scene layers.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Stage {
    pub backdrop: f32,
    pub main: f32,
    pub cross: f32,
    pub main_slide: Option<String>,
    pub cross_slide: Option<String>,
    pub input_delay: f32,
}

/// Move `alpha` by `step` towards `target`; true once it is reached.
fn fade(alpha: &mut f32, target: f32, step: f32) -> bool {
    if *alpha < target {
        *alpha = (*alpha + step).min(target);
    } else {
        *alpha = (*alpha - step).max(target);
    }
    *alpha == target
}

impl Stage {
    pub fn place_main(&mut self, image: Option<String>) {
        self.main = 0.0;
        self.main_slide = image;
    }

    pub fn place_cross(&mut self, image: Option<String>) {
        self.cross = 0.0;
        self.cross_slide = image;
    }

    pub fn fade_in_main(&mut self, step: f32) -> bool {
        fade(&mut self.main, 1.0, step)
    }

    pub fn fade_out_main(&mut self, step: f32) -> bool {
        fade(&mut self.main, 0.0, step)
    }

    pub fn fade_in_backdrop(&mut self, step: f32) -> bool {
        fade(&mut self.backdrop, 1.0, step)
    }

    pub fn fade_out_backdrop(&mut self, step: f32) -> bool {
        fade(&mut self.backdrop, 0.0, step)
    }

    /// Raise the cross-fade layer while the main one falls by the same amount.
    pub fn cross_fade(&mut self, step: f32) -> bool {
        let done = fade(&mut self.cross, 1.0, step);
        self.main = if done { 0.0 } else { 1.0 - self.cross };
        done
    }

    pub fn promote_cross(&mut self) {
        self.main_slide = self.cross_slide.take();
        self.main = 1.0;
        self.cross = 0.0;
    }

    pub fn clear(&mut self) {
        self.main_slide = None;
        self.cross_slide = None;
    }

    pub fn input_ready(&self) -> bool {
        self.input_delay <= 0.0
    }
}

#[derive(Resource, Debug)]
pub struct CutSceneDirector {
    pub library: CutSceneLibrary,
    pub stage: Stage,
    pub machine: StateMachine<CutSceneState>,
    pub scene_reload_requested: bool,
}

impl CutSceneDirector {
    pub fn new(sequences: Vec<CutSceneSequence>) -> Self {
        Self {
            library: CutSceneLibrary::new(sequences),
            stage: Stage::default(),
            machine: StateMachine::new("cut_scene"),
            scene_reload_requested: false,
        }
    }

    pub fn state_label(&self) -> Option<&'static str> {
        self.machine.current().map(|s| s.label())
    }
}

impl Default for CutSceneDirector {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy_ecs::world::World;

    fn slides(n: usize) -> Vec<Slide> {
        (0..n)
            .map(|i| Slide {
                image: format!("slide{i}"),
                fade: FadeType::Cross,
                end_game: false,
            })
            .collect()
    }

    #[test]
    fn unplayed_lookup_skips_finished_sequences() {
        let mut world = World::new();
        let plate = world.spawn_empty().id();
        let mut library = CutSceneLibrary::new(vec![
            CutSceneSequence::new(None, slides(1)),
            CutSceneSequence::new(Some(plate), slides(2)),
            CutSceneSequence::new(Some(plate), slides(1)),
        ]);
        assert_eq!(library.unplayed_for(plate), Some(1));
        assert!(library.activate(1));
        assert!(!library.is_last_slide());
        library.advance_slide();
        assert!(library.is_last_slide());
        library.mark_finished();
        assert_eq!(library.unplayed_for(plate), Some(2));
        assert_eq!(library.active(), None);
    }

    #[test]
    fn activate_rejects_empty_and_unknown() {
        let mut library = CutSceneLibrary::new(vec![CutSceneSequence::new(None, Vec::new())]);
        assert!(!library.activate(0));
        assert!(!library.activate(3));
    }

    #[test]
    fn cross_fade_hands_alpha_over() {
        let mut stage = Stage {
            main: 1.0,
            ..Stage::default()
        };
        stage.place_cross(Some("next".into()));
        assert!(!stage.cross_fade(0.25));
        assert_eq!(stage.main, 0.75);
        for _ in 0..3 {
            stage.cross_fade(0.25);
        }
        assert_eq!((stage.main, stage.cross), (0.0, 1.0));
        stage.promote_cross();
        assert_eq!(stage.main_slide.as_deref(), Some("next"));
        assert_eq!(stage.main, 1.0);
    }
}
