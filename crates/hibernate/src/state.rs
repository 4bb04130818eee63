use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Conditional-activation state of a traversal session.
///
/// `Pending` sessions are waiting for the wake filter to match; `Sleeping`
/// and `Fastward` are auxiliary pre-awake markers used while resuming.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum HibernationState {
    /// Waiting for the wake filter to match.
    Pending,
    /// Resumed session waiting for its wake condition while muted.
    Sleeping,
    /// Fast-forwarding to a recorded position while muted.
    Fastward,
    /// Callbacks are live.
    Awake,
    /// The sleep filter matched; callbacks are over for this session.
    Retired,
}

impl HibernationState {
    const fn stage(self) -> u8 {
        match self {
            Self::Pending | Self::Sleeping | Self::Fastward => 0,
            Self::Awake => 1,
            Self::Retired => 2,
        }
    }

    /// Advances to `to`, enforcing monotonicity.
    pub fn advance(&mut self, to: Self) -> Result<(), HibernationError> {
        if to.stage() <= self.stage() {
            return Err(HibernationError { from: *self, to });
        }
        tracing::debug!(from = ?*self, ?to, "hibernation state advanced");
        *self = to;
        Ok(())
    }

    /// Whether callbacks fire in this state.
    #[must_use]
    pub const fn is_awake(self) -> bool {
        matches!(self, Self::Awake)
    }

    /// Whether the session is past its sleep condition.
    #[must_use]
    pub const fn is_retired(self) -> bool {
        matches!(self, Self::Retired)
    }
}

impl Default for HibernationState {
    fn default() -> Self {
        Self::Pending
    }
}

/// Error raised on a non-monotonic state transition.
#[derive(Clone, Copy, Debug, Error, Eq, PartialEq)]
#[error("hibernation state cannot move from {from:?} to {to:?}")]
pub struct HibernationError {
    /// State the session was in.
    pub from: HibernationState,
    /// State the transition requested.
    pub to: HibernationState,
}
