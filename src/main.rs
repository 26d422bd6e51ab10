//! Jellojump headless runner.
//!
//! Loads `config.ini`, a JSON level and an optional JSON input script, then
//! runs the game schedule for a fixed number of frames. Every signal is
//! logged at debug level:
//!
//! ```sh
//! RUST_LOG=debug cargo run -- --level assets/levels/demo.json \
//!     --script assets/scripts/demo_input.json
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::{error, info};

use jellojump::game::Game;
use jellojump::level::{InputScript, Level};
use jellojump::resources::gameconfig::GameConfig;
use jellojump::resources::gameflow::GameFlow;
use jellojump::resources::jelloworld::JelloWorld;

/// Jellojump
#[derive(Parser)]
#[command(version, about = "Headless runner for the Jellojump game core")]
struct Cli {
    /// Tuning file; defaults are used when it does not exist.
    #[arg(long, value_name = "PATH", default_value = "config.ini")]
    config: PathBuf,

    /// Level description (JSON).
    #[arg(long, value_name = "PATH", default_value = "assets/levels/demo.json")]
    level: PathBuf,

    /// Scripted raw input (JSON).
    #[arg(long, value_name = "PATH")]
    script: Option<PathBuf>,

    /// Frames to simulate. Defaults to the script length plus five seconds.
    #[arg(long)]
    frames: Option<u64>,

    /// Seconds per frame. Defaults to `simulation.fixed_delta` from the config.
    #[arg(long)]
    dt: Option<f32>,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = GameConfig::load_or_default(&cli.config)?;
    let level = Level::load_from_file(&cli.level)?;
    let script = match &cli.script {
        Some(path) => InputScript::load_from_file(path)?,
        None => InputScript::default(),
    };

    let dt = cli.dt.unwrap_or(config.fixed_delta);
    if !(dt.is_finite() && dt > 0.0) {
        return Err(format!("frame delta must be positive, got {dt}").into());
    }
    let frames = cli.frames.unwrap_or_else(|| {
        let tail = (5.0 / dt).ceil() as u64;
        script.last_frame().unwrap_or(0) + tail
    });

    let mut game = Game::with_flow(config, GameFlow::new());
    game.load_level(&level)?;
    game.log_signals();

    info!("running {} frames at {:.4}s", frames, dt);
    for _ in 0..frames {
        let frame = game.frame() + 1;
        script.apply(frame, &mut game.raw_buttons_mut());
        game.step(dt);
        if game.reload_requested() {
            info!("scene reload requested at frame {}, stopping", frame);
            break;
        }
    }

    let flow = game.world.resource::<GameFlow>();
    info!(
        "finished at frame {}: flow {}, jello state {:?}",
        game.frame(),
        flow.state_label().unwrap_or("<none>"),
        game.world.resource::<JelloWorld>().get()
    );
    Ok(())
}
