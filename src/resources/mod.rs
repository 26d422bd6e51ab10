//! ECS resources made available to systems.
//!
//! Overview
//! - `cutscene` – cut-scene library, stage layers and director machine
//! - `directory` – per-frame snapshot of jelloporter and plate positions
//! - `gameconfig` – tuning values loaded from `config.ini`
//! - `gameflow` – top-level game flow machine and the active character
//! - `input` – raw device buttons and the latched input state
//! - `jelloworld` – the global jello state toggle
//! - `menu` – main menu machine
//! - `signalbus` – publish/subscribe bus (non-`Send`)
//! - `worldtime` – simulation time, delta and frame counter
pub mod cutscene;
pub mod directory;
pub mod gameconfig;
pub mod gameflow;
pub mod input;
pub mod jelloworld;
pub mod menu;
pub mod signalbus;
pub mod worldtime;
