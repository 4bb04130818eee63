// crates/kernel/src/error.rs
use std::path::PathBuf;

use thiserror::Error;

use crate::exec::PoolError;
use crate::resume::ResumeError;

/// Error type a session callback may return.
pub type CallbackError = Box<dyn std::error::Error + Send + Sync>;

/// Fatal session errors. Non-fatal per-node vetoes never surface here.
#[derive(Debug, Error)]
pub enum TraverseError {
    /// Chain registration or dispatch failed.
    #[error(transparent)]
    Chain(#[from] chain::ChainError),

    /// A filter definition did not compile.
    #[error(transparent)]
    Filter(#[from] filters::FilterError),

    /// The resume subsystem failed to persist or load a snapshot.
    #[error(transparent)]
    Resume(#[from] ResumeError),

    /// The concurrent worker pool failed.
    #[error(transparent)]
    Pool(#[from] PoolError),

    /// A sequential callback invocation failed.
    #[error("callback failed for '{}'", path.display())]
    Callback {
        /// Node the callback was running for.
        path: PathBuf,
        /// The callback's own error.
        #[source]
        source: CallbackError,
    },

    /// The node source handed the session an error instead of a node.
    #[error("node source failed")]
    Source {
        /// Underlying source error, typically a walk failure.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A fast-forward resume finished the whole traversal without ever
    /// encountering the recorded position.
    #[error("fast-forward target (name '{name}', parent '{parent}') was never reached")]
    FastwardMissed {
        /// Recorded node name.
        name: String,
        /// Recorded parent name, `"."` for the tree root.
        parent: String,
    },
}
