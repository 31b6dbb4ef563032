use sim_core::TerminalOutcome;
use std::fmt;

/// Error for operations on a live session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The session was terminated by its owner.
    Terminated,
    /// The game reached a terminal outcome.
    Finished(TerminalOutcome),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::Terminated => write!(f, "session has terminated"),
            SessionError::Finished(outcome) => write!(f, "run already finished ({:?})", outcome),
        }
    }
}

impl std::error::Error for SessionError {}
