//! Many frames of play must not grow per-entity bookkeeping.

use jellojump::components::animation::Animator;
use jellojump::components::character::CharacterId;
use jellojump::events::input::MoveButton;
use jellojump::game::Game;
use jellojump::level::Level;
use jellojump::resources::gameconfig::GameConfig;
use jellojump::resources::gameflow::GameFlow;
use jellojump::states::gameflow::FlowState;

const DT: f32 = 0.05;

const LEVEL: &str = r#"{
    "characters": [{ "id": "first", "position": [0.0, 0.5] }],
    "solids": [
        { "position": [-20.0, -1.0], "size": [40.0, 1.0] }
    ]
}"#;

#[test]
fn animator_history_stays_bounded() {
    let mut game = Game::with_flow(
        GameConfig::new(),
        GameFlow::starting_in(FlowState::play(CharacterId::First)),
    );
    let level = Level::load_from_str(LEVEL).unwrap();
    let spawned = game.load_level(&level).unwrap();
    let first = spawned.character(CharacterId::First).unwrap();

    for frame in 0..20_000u32 {
        if frame % 20 == 0 {
            let right = (frame / 20) % 2 == 0;
            game.set_button(MoveButton::Right, right);
            game.set_button(MoveButton::Left, !right);
        }
        game.step(DT);
    }

    let fired = game
        .world
        .get_mut::<Animator>(first)
        .unwrap()
        .take_fired();
    assert!(!fired.is_empty());
    assert!(fired.len() <= Animator::HISTORY);
}
