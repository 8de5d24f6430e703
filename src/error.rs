//! Typed failures for environments, learners and the trial protocol.
//!
//! Every variant reflects a configuration or programming defect, never a transient
//! condition: callers are expected to stop the trial and surface the message.

use crate::BanditKind;

/// Errors produced by this crate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// Malformed construction parameters (dimensions, ranges, arm counts).
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// An action that the environment cannot execute, or feedback that does not
    /// match the actions it answers.
    #[error("invalid action: {0}")]
    InvalidAction(String),

    /// The environment cannot evaluate regret for this goal.
    #[error("unsupported goal: {0}")]
    UnsupportedGoal(String),

    /// A learner was bound to an environment it does not understand.
    #[error("{learner} does not understand the {bandit:?} bandit environment")]
    IncompatibleBandit { learner: String, bandit: BanditKind },
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

pub(crate) fn config_err(msg: impl Into<String>) -> Error {
    Error::Configuration(msg.into())
}

pub(crate) fn action_err(msg: impl Into<String>) -> Error {
    Error::InvalidAction(msg.into())
}
