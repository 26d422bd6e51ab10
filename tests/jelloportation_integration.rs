//! A full ride: walk into a jelloporter, travel to the opposite plate, land.

use bevy_ecs::prelude::*;
use glam::Vec2;

use jellojump::components::brains::{CharacterBrain, JelloporterBrain};
use jellojump::components::character::{Character, CharacterId};
use jellojump::components::jelloporter::JelloState;
use jellojump::components::mapposition::MapPosition;
use jellojump::events::input::MoveButton;
use jellojump::events::signal::{Signal, SignalKind};
use jellojump::game::Game;
use jellojump::level::Level;
use jellojump::resources::gameconfig::GameConfig;
use jellojump::resources::gameflow::GameFlow;
use jellojump::resources::jelloworld::JelloWorld;
use jellojump::states::gameflow::FlowState;

const DT: f32 = 0.05;

const LEVEL: &str = r#"{
    "characters": [{ "id": "first", "position": [3.0, 0.5] }],
    "jelloporters": [
        {
            "color": "green",
            "top": { "name": "roof", "position": [6.0, 8.5], "exit_right": true },
            "bottom": { "name": "cellar", "position": [6.0, 0.5] }
        },
        {
            "color": "pink",
            "top": { "name": "tower", "position": [-10.0, 8.5] },
            "bottom": { "name": "moat", "position": [-10.0, 0.5] }
        }
    ],
    "solids": [
        { "position": [-20.0, -1.0], "size": [40.0, 1.0] },
        { "position": [4.0, 7.0], "size": [12.0, 1.0] }
    ]
}"#;

fn flow_label(game: &Game) -> &'static str {
    game.world
        .resource::<GameFlow>()
        .state_label()
        .unwrap_or("")
}

fn new_game() -> Game {
    Game::with_flow(
        GameConfig::new(),
        GameFlow::starting_in(FlowState::play(CharacterId::First)),
    )
}

/// Character states entered by `owner`, oldest first.
fn states_entered(seen: &[Signal], owner: Entity) -> Vec<&'static str> {
    seen.iter()
        .filter_map(|s| match s {
            Signal::StateStarted {
                machine: "character",
                owner: Some(o),
                state,
            } if *o == owner => Some(*state),
            _ => None,
        })
        .collect()
}

fn state_after<'a>(states: &[&'a str], label: &str) -> Option<&'a str> {
    let at = states.iter().position(|s| *s == label)?;
    states.get(at + 1).copied()
}

#[test]
fn ride_flips_jello_state_and_sets_waypoint() {
    let mut game = new_game();
    let level = Level::load_from_str(LEVEL).unwrap();
    let spawned = game.load_level(&level).unwrap();
    let first = spawned.character(CharacterId::First).unwrap();
    let green = spawned.jelloporters[0];
    let pink = spawned.jelloporters[1];
    let roof = spawned.plate("roof").unwrap();

    // Pink starts on its top plate under the default state.
    assert_eq!(
        game.world.get::<MapPosition>(pink).unwrap().pos,
        Vec2::new(-10.0, 8.5)
    );

    let watcher = game.bus().register_mailbox();
    for kind in [
        SignalKind::JelloportationStarted,
        SignalKind::JelloporterArrivedAtPlate,
        SignalKind::JelloportationFinished,
    ] {
        game.bus().subscribe(kind, watcher);
    }
    let states = game.bus().register_mailbox();
    game.bus().subscribe(SignalKind::StateStarted, states);

    for _ in 0..5 {
        game.step(DT);
    }
    assert_eq!(flow_label(&game), "PlayFirst");

    game.set_button(MoveButton::Right, true);
    let mut saw_jelloport = false;
    for _ in 0..300 {
        game.step(DT);
        let label = flow_label(&game);
        if label == "Jelloport" {
            saw_jelloport = true;
            game.set_button(MoveButton::Right, false);
        }
        if saw_jelloport && label == "PlayFirst" {
            break;
        }
    }
    assert!(saw_jelloport);
    assert_eq!(flow_label(&game), "PlayFirst");

    assert_eq!(
        game.world.resource::<JelloWorld>().get(),
        JelloState::PinkDownGreenUp
    );
    assert_eq!(game.world.get::<Character>(first).unwrap().waypoint, Some(roof));
    assert_eq!(
        game.world.get::<MapPosition>(green).unwrap().pos,
        Vec2::new(6.0, 8.5)
    );

    let seen = game.bus().drain(watcher);
    assert!(seen.iter().any(|s| matches!(
        s,
        Signal::JelloportationStarted {
            rider: CharacterId::First,
            new_jello_state: JelloState::PinkDownGreenUp,
            destination_plate,
            ..
        } if *destination_plate == roof
    )));
    assert!(seen.iter().any(|s| matches!(
        s,
        Signal::JelloporterArrivedAtPlate { jelloporter, plate } if *jelloporter == green && *plate == roof
    )));
    assert_eq!(
        seen.iter()
            .filter(|s| matches!(s, Signal::JelloportationFinished { .. }))
            .count(),
        1
    );
    let entered = states_entered(&game.bus().drain(states), first);
    assert_eq!(state_after(&entered, "ExitJelloporter"), Some("Idle"));

    // The idle pink jelloporter realigns with the new state.
    for _ in 0..60 {
        game.step(DT);
    }
    assert_eq!(
        game.world.get::<MapPosition>(pink).unwrap().pos,
        Vec2::new(-10.0, 0.5)
    );
    let label = |e: Entity| {
        game.world
            .get::<JelloporterBrain>(e)
            .and_then(|b| b.state_label())
    };
    assert_eq!(label(green), Some("JelloIdle"));
    assert_eq!(label(pink), Some("JelloIdle"));
    assert_eq!(
        game.world
            .get::<CharacterBrain>(first)
            .and_then(|b| b.state_label()),
        Some("Idle")
    );
}

#[test]
fn rider_holding_direction_lands_running() {
    let mut game = new_game();
    let level = Level::load_from_str(LEVEL).unwrap();
    let spawned = game.load_level(&level).unwrap();
    let first = spawned.character(CharacterId::First).unwrap();

    let states = game.bus().register_mailbox();
    game.bus().subscribe(SignalKind::StateStarted, states);

    for _ in 0..5 {
        game.step(DT);
    }
    game.set_button(MoveButton::Right, true);
    let mut entered = Vec::new();
    for _ in 0..300 {
        game.step(DT);
        entered.extend(states_entered(&game.bus().drain(states), first));
        if state_after(&entered, "ExitJelloporter").is_some() {
            break;
        }
    }

    assert!(entered.contains(&"RideJelloporter"));
    assert_eq!(state_after(&entered, "ExitJelloporter"), Some("RunRight"));
}
