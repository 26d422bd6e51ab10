//! ECS components for entities.
//!
//! Submodules overview:
//! - [`animation`] – animation trigger sink with a clip clock
//! - [`boxcollider`] – axis-aligned rectangular collider
//! - [`brains`] – state machine holders for characters, jelloporters, monsters
//! - [`character`] – player character identity and flags
//! - [`iceblock`] – pushable ice block
//! - [`jelloporter`] – jelloporters, their plates and the jello state
//! - [`mapposition`] – world-space position
//! - [`monster`] – patrolling monster
//! - [`obstacle`] – obstacle buttons and the obstacles they move
//! - [`rigidbody`] – velocity, named forces and the frozen flag
//! - [`sensors`] – ground and wall contact latches
//! - [`solid`] – static level geometry marker

pub mod animation;
pub mod boxcollider;
pub mod brains;
pub mod character;
pub mod iceblock;
pub mod jelloporter;
pub mod mapposition;
pub mod monster;
pub mod obstacle;
pub mod rigidbody;
pub mod sensors;
pub mod solid;
