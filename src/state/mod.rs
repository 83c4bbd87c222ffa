//! Application state machine.
//!
//! Three states, one fixed cycle:
//! Idle → Recording → Processing → Idle
//!
//! `StateMachine::transition` is the only way state changes. Subscribers are
//! told about every committed transition, in registration order.

pub mod machine;
pub mod trigger;

pub use machine::{State, StateError, StateMachine, StateSubscriber};
pub use trigger::{complete, toggle, ToggleOutcome};
