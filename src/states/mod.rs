//! Closed state enums, one per machine.
//!
//! Each module defines the state type and the context it runs against; the
//! [`StateMachine`](crate::fsm::StateMachine) runtime drives them.
pub mod character;
pub mod cutscene;
pub mod gameflow;
pub mod jelloporter;
pub mod menu;
pub mod monster;
