//! Turn state machine.
//!
//! Valid transitions (`Error` behaves as `Idle` for every guard):
//! - Idle -> Listening (start listening)
//! - Idle -> Processing (typed input)
//! - Idle -> Speaking (announcement)
//! - Idle -> Error (recognizer could not start)
//! - Listening -> Processing (speech recognized)
//! - Listening -> Idle (silence, explicit stop)
//! - Listening -> Error (recognition failed)
//! - Processing -> Speaking (answer ready)
//! - Processing -> Idle (nothing to say, cancelled)
//! - Speaking -> Idle (speech complete or stopped)
//! - Error -> Idle
//!
//! Speaking never moves straight to Listening.

use tokio::sync::watch;
use voxa_core::TurnState;

use crate::error::ChatError;

/// Returns whether moving from `from` to `to` is allowed.
pub fn can_transition(from: &TurnState, to: &TurnState) -> bool {
    use TurnState::*;
    matches!(
        (from, to),
        (Idle | Error(_), Listening)
            | (Idle | Error(_), Processing)
            | (Idle | Error(_), Speaking)
            | (Idle | Error(_), Error(_))
            | (Listening, Processing)
            | (Listening, Idle)
            | (Listening, Error(_))
            | (Processing, Speaking)
            | (Processing, Idle)
            | (Speaking, Idle)
            | (Error(_), Idle)
    )
}

/// The orchestrator's turn state, published through a `watch` channel.
///
/// Owned by a single task, so no locking is involved.
#[derive(Debug)]
pub struct TurnMachine {
    state: TurnState,
    tx: watch::Sender<TurnState>,
}

impl Default for TurnMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl TurnMachine {
    /// Create a machine in `Idle`.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(TurnState::Idle);
        Self {
            state: TurnState::Idle,
            tx,
        }
    }

    pub fn current(&self) -> &TurnState {
        &self.state
    }

    pub fn subscribe(&self) -> watch::Receiver<TurnState> {
        self.tx.subscribe()
    }

    /// Move to `target`, returning the previous state.
    pub fn transition(&mut self, target: TurnState) -> Result<TurnState, ChatError> {
        if !can_transition(&self.state, &target) {
            return Err(ChatError::InvalidTransition {
                from: self.state.clone(),
                to: target,
            });
        }
        tracing::debug!(from = %self.state, to = %target, "Turn state");
        let previous = std::mem::replace(&mut self.state, target);
        self.tx.send_replace(self.state.clone());
        Ok(previous)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use TurnState::*;

    fn err() -> TurnState {
        Error("falha".into())
    }

    #[test]
    fn test_valid_transitions() {
        // Turn path
        assert!(can_transition(&Idle, &Listening));
        assert!(can_transition(&Listening, &Processing));
        assert!(can_transition(&Processing, &Speaking));
        assert!(can_transition(&Speaking, &Idle));

        // Early exits
        assert!(can_transition(&Listening, &Idle));
        assert!(can_transition(&Processing, &Idle));
        assert!(can_transition(&Listening, &err()));

        // Announcements and typed input
        assert!(can_transition(&Idle, &Speaking));
        assert!(can_transition(&Idle, &Processing));
    }

    #[test]
    fn test_error_is_idle_like() {
        assert!(can_transition(&err(), &Listening));
        assert!(can_transition(&err(), &Speaking));
        assert!(can_transition(&err(), &Processing));
        assert!(can_transition(&err(), &Idle));
        assert!(can_transition(&err(), &err()));
    }

    #[test]
    fn test_invalid_transitions() {
        assert!(!can_transition(&Speaking, &Listening));
        assert!(!can_transition(&Listening, &Speaking));
        assert!(!can_transition(&Processing, &Listening));
        assert!(!can_transition(&Speaking, &Processing));
        assert!(!can_transition(&Idle, &Idle));
        assert!(!can_transition(&Processing, &err()));
        assert!(!can_transition(&Speaking, &err()));
    }

    #[test]
    fn test_machine_transition_publishes() {
        let mut machine = TurnMachine::new();
        let rx = machine.subscribe();
        assert_eq!(*machine.current(), Idle);

        let previous = machine.transition(Listening).unwrap();
        assert_eq!(previous, Idle);
        assert_eq!(*rx.borrow(), Listening);
    }

    #[test]
    fn test_machine_rejects_invalid() {
        let mut machine = TurnMachine::new();
        machine.transition(Listening).unwrap();
        machine.transition(Processing).unwrap();
        machine.transition(Speaking).unwrap();

        let result = machine.transition(Listening);
        assert!(matches!(result, Err(ChatError::InvalidTransition { .. })));
        assert_eq!(*machine.current(), Speaking);
    }

    #[test]
    fn test_full_cycle_back_to_idle() {
        let mut machine = TurnMachine::new();
        for target in [Listening, Processing, Speaking, Idle] {
            machine.transition(target).unwrap();
        }
        assert_eq!(*machine.current(), Idle);
    }
}
