//! Game systems.
//!
//! Every frame runs these in one chained schedule (see
//! [`crate::game::build_schedule`]):
//!
//! 1. [`input`] – latch raw buttons and publish press/release edges
//! 2. [`menu`] – main menu machine
//! 3. [`gameflow`] – top-level game flow machine
//! 4. [`cutscene`] – cut-scene director machine
//! 5. [`jelloporter`] – jelloporter machines
//! 6. [`directory`] – snapshot jelloporter and plate positions
//! 7. [`character`] – character machines
//! 8. [`monster`] – monster machines and removal
//! 9. [`obstacle`] – button cooldowns, obstacles follow their buttons
//! 10. [`iceblock`] – pushed ice blocks pick up sliding speed
//! 11. [`movement`] – integrate bodies, resolve solids, refresh sensors
//! 12. [`contacts`] – publish trigger contacts on enter, flip buttons
//! 13. [`animation`] – advance clip clocks, publish kick timing signals
//!
//! [`time`] is called by the frame driver before the schedule runs.

pub mod animation;
pub mod character;
pub mod contacts;
pub mod cutscene;
pub mod directory;
pub mod gameflow;
pub mod iceblock;
pub mod input;
pub mod jelloporter;
pub mod menu;
pub mod monster;
pub mod movement;
pub mod obstacle;
pub mod time;
