use thiserror::Error;

use crate::Role;

/// Error raised by decoration, unwinding, or link dispatch.
#[derive(Debug, Error)]
pub enum ChainError {
    /// Decoration was refused because an active seal rejects the role.
    #[error("chain is sealed by '{sealed_by}': decoration of '{rejected}' is forbidden")]
    Sealed {
        /// Role whose link installed the seal.
        sealed_by: Role,
        /// Role that was refused decoration.
        rejected: Role,
    },

    /// A link with this role is already registered.
    #[error("a link for role '{role}' is already decorated")]
    DuplicateRole {
        /// The conflicting role.
        role: Role,
    },

    /// No link with this role is registered.
    #[error("no link for role '{role}' is decorated")]
    MissingRole {
        /// The absent role.
        role: Role,
    },

    /// A link's `next` failed; dispatch stops and the traversal aborts.
    #[error("link '{role}' failed during dispatch: {source}")]
    Link {
        /// Role of the failing link.
        role: Role,
        /// The link's own error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl ChainError {
    /// Wraps a link-internal error for dispatch propagation.
    #[must_use]
    pub fn link(role: Role, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Link {
            role,
            source: Box::new(source),
        }
    }
}
