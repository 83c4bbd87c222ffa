//! Trigger semantics shared by the HTTP API and the CLI.
//!
//! A single toggle key drives the cycle: the first press starts recording,
//! the second stops it and hands off to processing. Presses while processing
//! are ignored; the processing pipeline calls [`complete`] when it is done.

use tracing::info;

use super::machine::{State, StateError, StateMachine};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Transitioned { from: State, to: State },
    Busy(State),
}

pub async fn toggle(machine: &StateMachine) -> Result<ToggleOutcome, StateError> {
    let current = machine.state();
    let target = match current {
        State::Idle => State::Recording,
        State::Recording => State::Processing,
        State::Processing => {
            //NOTE: processing finishes on its own via `complete`
            info!("Toggle requested while processing, ignoring");
            return Ok(ToggleOutcome::Busy(current));
        }
    };

    machine.transition(target).await?;
    Ok(ToggleOutcome::Transitioned {
        from: current,
        to: target,
    })
}

pub async fn complete(machine: &StateMachine) -> Result<(), StateError> {
    machine.transition(State::Idle).await
}
