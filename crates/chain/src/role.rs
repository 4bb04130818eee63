use std::fmt;

use serde::{Deserialize, Serialize};

/// Closed enumeration identifying a link's feature.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    /// Resume link that fast-forwards to a recorded position.
    Fastward,
    /// Wake/sleep state machine gating callback activation.
    Hibernate,
    /// Sample-window enforcement.
    Sampler,
    /// Caller-configured node filtering (owns the hybrid child filter).
    ClientFilter,
    /// Standalone child-list filtering for folders-with-files.
    Nanny,
    /// Terminal link that invokes the caller's callback.
    Anchor,
}

impl Role {
    /// Fixed priority table. The active dispatch order is always a stable
    /// subsequence of this manifest.
    pub const MANIFEST: [Self; 6] = [
        Self::Fastward,
        Self::Hibernate,
        Self::Sampler,
        Self::ClientFilter,
        Self::Nanny,
        Self::Anchor,
    ];

    /// Position of the role in the priority table.
    #[must_use]
    pub fn rank(self) -> usize {
        Self::MANIFEST
            .iter()
            .position(|role| *role == self)
            .unwrap_or(Self::MANIFEST.len())
    }

    /// Roles whose presence in the accumulated active set excludes this one.
    ///
    /// Nanny defers to ClientFilter (the client filter runs the hybrid child
    /// scheme itself); ClientFilter defers to Sampler (one selection scheme
    /// at a time).
    #[must_use]
    pub const fn defers_to(self) -> &'static [Self] {
        match self {
            Self::Nanny => &[Self::ClientFilter],
            Self::ClientFilter => &[Self::Sampler],
            _ => &[],
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Fastward => "fastward",
            Self::Hibernate => "hibernate",
            Self::Sampler => "sampler",
            Self::ClientFilter => "client-filter",
            Self::Nanny => "nanny",
            Self::Anchor => "anchor",
        };
        f.write_str(name)
    }
}
