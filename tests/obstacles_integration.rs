//! Obstacle buttons flipped by touch and kick, and ice blocks pushed into walls.

use bevy_ecs::prelude::*;
use glam::Vec2;

use jellojump::components::brains::CharacterBrain;
use jellojump::components::character::CharacterId;
use jellojump::components::mapposition::MapPosition;
use jellojump::components::obstacle::ObstacleButton;
use jellojump::events::input::MoveButton;
use jellojump::events::signal::{Signal, SignalKind};
use jellojump::game::Game;
use jellojump::level::{Level, SpawnedLevel};
use jellojump::resources::gameconfig::GameConfig;
use jellojump::resources::gameflow::GameFlow;
use jellojump::states::gameflow::FlowState;

const DT: f32 = 0.05;

const BUTTON_LEVEL: &str = r#"{
    "characters": [{ "id": "first", "position": [0.0, 0.5] }],
    "solids": [{ "position": [-20.0, -1.0], "size": [40.0, 1.0] }],
    "buttons": [{ "name": "gate", "position": [2.0, 0.25] }],
    "obstacles": [{
        "button": "gate", "size": [1.0, 3.0],
        "unpressed": [-8.0, 1.5], "pressed": [-8.0, 4.5]
    }]
}"#;

const ICE_LEVEL: &str = r#"{
    "characters": [{ "id": "first", "position": [0.0, 0.5] }],
    "solids": [
        { "position": [-20.0, -1.0], "size": [40.0, 1.0] },
        { "position": [6.0, 0.0], "size": [1.0, 5.0] }
    ],
    "ice_blocks": [{ "position": [2.0, 0.5] }]
}"#;

fn new_game(level: &str) -> (Game, SpawnedLevel) {
    let mut game = Game::with_flow(
        GameConfig::new(),
        GameFlow::starting_in(FlowState::play(CharacterId::First)),
    );
    let level = Level::load_from_str(level).unwrap();
    let spawned = game.load_level(&level).unwrap();
    (game, spawned)
}

fn steps(game: &mut Game, n: usize) {
    for _ in 0..n {
        game.step(DT);
    }
}

fn position(game: &Game, entity: Entity) -> Vec2 {
    game.world.get::<MapPosition>(entity).unwrap().pos
}

fn brain_label(game: &Game, entity: Entity) -> &'static str {
    game.world
        .get::<CharacterBrain>(entity)
        .and_then(|b| b.state_label())
        .unwrap_or("")
}

#[test]
fn touch_and_kick_flip_button_and_move_obstacle() {
    let (mut game, spawned) = new_game(BUTTON_LEVEL);
    let button = spawned.button("gate").unwrap();
    let obstacle = spawned.obstacles[0];
    let watcher = game.bus().register_mailbox();
    game.bus().subscribe(SignalKind::ObstacleButtonChanged, watcher);

    steps(&mut game, 5);
    assert_eq!(position(&game, obstacle), Vec2::new(-8.0, 1.5));

    // Walk onto the button and stand on it.
    game.set_button(MoveButton::Right, true);
    steps(&mut game, 10);
    game.set_button(MoveButton::Right, false);
    steps(&mut game, 2);
    assert_eq!(
        game.bus().drain(watcher),
        vec![Signal::ObstacleButtonChanged {
            button,
            pressed: true,
        }]
    );

    steps(&mut game, 40);
    assert_eq!(position(&game, obstacle), Vec2::new(-8.0, 4.5));
    assert!(game.bus().drain(watcher).is_empty());
    assert_eq!(game.world.get::<ObstacleButton>(button).unwrap().cooldown, 0.0);

    // Still standing on it: only the kick reach is a new contact.
    game.set_button(MoveButton::Attack, true);
    game.step(DT);
    game.set_button(MoveButton::Attack, false);
    game.step(DT);
    assert_eq!(
        game.bus().drain(watcher),
        vec![Signal::ObstacleButtonChanged {
            button,
            pressed: false,
        }]
    );
    steps(&mut game, 40);
    assert_eq!(position(&game, obstacle), Vec2::new(-8.0, 1.5));
}

#[test]
fn pushed_ice_block_slides_until_wall() {
    let (mut game, spawned) = new_game(ICE_LEVEL);
    let first = spawned.character(CharacterId::First).unwrap();
    let block = spawned.ice_blocks[0];

    steps(&mut game, 5);
    assert!((position(&game, block).x - 2.0).abs() < 1e-4);

    game.set_button(MoveButton::Right, true);
    steps(&mut game, 40);
    assert_eq!(brain_label(&game, first), "PushRight");
    let midway = position(&game, block).x;
    assert!(midway > 2.5, "block at {midway}");

    steps(&mut game, 120);
    let block_x = position(&game, block).x;
    assert!((block_x - 5.5).abs() < 1e-3, "block at {block_x}");
    assert_eq!(brain_label(&game, first), "PushRight");
    let character_x = position(&game, first).x;
    assert!((character_x - 4.6).abs() < 1e-3, "character at {character_x}");

    // Released, the block keeps no momentum.
    game.set_button(MoveButton::Right, false);
    steps(&mut game, 10);
    assert!((position(&game, block).x - block_x).abs() < 1e-4);
}
