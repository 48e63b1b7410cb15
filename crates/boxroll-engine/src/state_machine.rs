//! Pure state machine for the crafting session
//!
//! This module implements a pure functional state machine with NO I/O.
//! All state transitions are deterministic and testable.
//!
//! Key design principles:
//! - Pure function: transition(state, event) -> (state, directives)
//! - No async, no I/O, no dependency on the game surface
//! - Unexpected events are ignored in place (never panic, never a dead end)
//! - Cancel is accepted from every state; resume always lands in Searching

use boxroll_core::{ContainerId, CraftAction};

/// Session state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum State {
    /// No session in progress
    Idle,
    /// Looking for the nearest workable container
    Searching,
    /// Computing readiness and choosing an action for a container
    Evaluating { id: ContainerId },
    /// An action has been chosen and is being dispatched
    Acting { id: ContainerId, action: CraftAction },
    /// Waiting for the dispatched action to show up in the affix text
    Confirming { id: ContainerId, action: CraftAction },
    /// User-requested pause; resume re-enters Searching
    Paused,
    /// The container satisfied the policy; session rests until resumed
    Done { id: ContainerId },
}

/// Events that trigger state transitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Session activated by the user
    Activated,
    /// Session deactivated by the user
    Deactivated,
    /// A workable container was found
    TargetFound { id: ContainerId },
    /// No workable container in reach
    NoTarget,
    /// The host window lost focus
    FocusLost,
    /// The container already satisfies the policy
    Ready,
    /// The decision table chose an action
    ActionChosen { action: CraftAction },
    /// Nothing applies (usually out of items); not an error
    NothingToDo,
    /// Input for the chosen action was sent
    Dispatched,
    /// A fast-apply batch finished, confirmations included
    BatchComplete { applied: usize },
    /// An affix change was observed
    Confirmed,
    /// No affix change within the confirmation window
    ConfirmTimeout,
    /// Something went wrong mid-step; recover by searching again
    Failed { message: String },
    /// User-requested cancel
    Cancel,
    /// Resume from Paused or Done
    Resume,
}

/// Side effects the orchestrator must execute after a transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// Log activity
    Log { message: String },
    /// Compute readiness and pick an action for this container
    Evaluate { id: ContainerId },
    /// Dispatch the chosen action
    Dispatch { id: ContainerId, action: CraftAction },
    /// Run the change-confirmation protocol
    AwaitConfirmation { id: ContainerId },
    /// Record the container as fully satisfied
    MarkSatisfied { id: ContainerId },
}

/// Pure state transition function
///
/// Completely deterministic, no side effects, never panics. Events that make
/// no sense in the current state are logged and ignored, leaving the state
/// unchanged, so a stale event can never wedge the session.
pub fn transition(state: State, event: Event) -> (State, Vec<Directive>) {
    match (state, event) {
        // Session control, honored everywhere
        (_, Event::Deactivated) => (
            State::Idle,
            vec![Directive::Log {
                message: "session deactivated".to_string(),
            }],
        ),
        (State::Paused, Event::Cancel) => (State::Paused, vec![]),
        (_, Event::Cancel) => (
            State::Paused,
            vec![Directive::Log {
                message: "session paused".to_string(),
            }],
        ),
        // A fresh activation resumes a paused or completed session
        (State::Paused, Event::Resume | Event::Activated)
        | (State::Done { .. }, Event::Resume) => (
            State::Searching,
            vec![Directive::Log {
                message: "session resumed".to_string(),
            }],
        ),

        (State::Idle, Event::Activated) => (
            State::Searching,
            vec![Directive::Log {
                message: "session activated".to_string(),
            }],
        ),
        (State::Done { .. }, Event::Activated) => (
            State::Searching,
            vec![Directive::Log {
                message: "session reactivated".to_string(),
            }],
        ),

        // Searching
        (State::Searching, Event::TargetFound { id }) => {
            (State::Evaluating { id }, vec![Directive::Evaluate { id }])
        }
        (State::Searching, Event::NoTarget) => (
            State::Idle,
            vec![Directive::Log {
                message: "no workable container in reach".to_string(),
            }],
        ),
        (State::Searching, Event::FocusLost) => (
            State::Idle,
            vec![Directive::Log {
                message: "host window lost focus".to_string(),
            }],
        ),

        // Evaluating
        (State::Evaluating { id }, Event::Ready) => (
            State::Done { id },
            vec![
                Directive::MarkSatisfied { id },
                Directive::Log {
                    message: format!("{id} satisfies the policy, session resting"),
                },
            ],
        ),
        (State::Evaluating { id }, Event::ActionChosen { action }) => (
            State::Acting { id, action },
            vec![Directive::Dispatch { id, action }],
        ),
        (State::Evaluating { .. }, Event::NothingToDo) => (
            State::Searching,
            vec![Directive::Log {
                message: "nothing to do for this container".to_string(),
            }],
        ),

        // Acting
        (State::Acting { id, action }, Event::Dispatched) => (
            State::Confirming { id, action },
            vec![Directive::AwaitConfirmation { id }],
        ),
        (State::Acting { .. }, Event::BatchComplete { applied }) => (
            State::Searching,
            vec![Directive::Log {
                message: format!("fast-apply batch finished after {applied} applications"),
            }],
        ),

        // Confirming
        (State::Confirming { .. }, Event::Confirmed) => (State::Searching, vec![]),
        (State::Confirming { id, action }, Event::ConfirmTimeout) => (
            State::Searching,
            vec![Directive::Log {
                message: format!("{action} on {id} not confirmed within the window"),
            }],
        ),

        // Recoverable failures from any mid-step state
        (State::Evaluating { .. }, Event::Failed { message })
        | (State::Acting { .. }, Event::Failed { message })
        | (State::Confirming { .. }, Event::Failed { message }) => (
            State::Searching,
            vec![Directive::Log {
                message: format!("recovering after error: {message}"),
            }],
        ),

        // Everything else is a stale or out-of-order event: ignore in place
        (state, event) => {
            let directives = vec![Directive::Log {
                message: format!("ignoring {event:?} in state {state:?}"),
            }];
            (state, directives)
        }
    }
}
