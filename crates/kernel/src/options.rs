// crates/kernel/src/options.rs
//! Live session configuration and its builder.

use std::path::PathBuf;
use std::time::Duration;

use filters::{FilterDef, SampleSpec};
use node::Node;
use serde::{Deserialize, Serialize};

/// Which node kinds the session callback is invoked for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Subscription {
    /// Every node, files and folders alike.
    #[default]
    Universal,
    /// Folder nodes only.
    Folders,
    /// Folder nodes, delivered with their surviving child-file listing.
    FoldersWithFiles,
    /// File nodes only.
    Files,
}

impl Subscription {
    /// Whether `node` falls inside this subscription.
    #[must_use]
    pub fn accepts(self, node: &Node) -> bool {
        match self {
            Self::Universal => true,
            Self::Folders | Self::FoldersWithFiles => node.is_folder(),
            Self::Files => node.is_file(),
        }
    }
}

/// Session-wide behavior toggles.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Behaviors {
    /// Persist an active-state snapshot when a run aborts via panic or
    /// cancellation. Requires [`SessionOptions::snapshot`] to be set.
    pub save_on_abort: bool,
}

/// Hibernation gate configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct HibernationOptions {
    /// Filter whose first match wakes the session.
    pub wake: Option<FilterDef>,
    /// Filter whose first match (while awake) retires the session.
    pub sleep: Option<FilterDef>,
    /// Run the remaining chain for the node that triggered the wake.
    /// Also governs whether a fast-forward match re-enters the chain.
    pub inclusive_wake: bool,
    /// Run the remaining chain for the node that triggered the sleep.
    pub inclusive_sleep: bool,
}

impl Default for HibernationOptions {
    fn default() -> Self {
        Self {
            wake: None,
            sleep: None,
            inclusive_wake: true,
            inclusive_sleep: false,
        }
    }
}

impl HibernationOptions {
    /// True when at least one of the wake or sleep filters is configured.
    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.wake.is_some() || self.sleep.is_some()
    }
}

/// Worker-pool sizing and backpressure parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConcurrencyOptions {
    /// Number of worker threads. Zero is a construction error.
    pub workers: usize,
    /// Bounded capacity of the job and result channels.
    pub queue_capacity: usize,
    /// How long a worker may block handing back a result before the
    /// pool is declared wedged.
    pub send_timeout: Duration,
}

impl Default for ConcurrencyOptions {
    fn default() -> Self {
        Self {
            workers: 4,
            queue_capacity: 64,
            send_timeout: Duration::from_secs(30),
        }
    }
}

/// Complete live configuration of a traversal session.
///
/// This is the in-memory model. The resume subsystem projects it into a
/// JSON-safe shape before persisting; see [`crate::resume`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SessionOptions {
    /// Callback subscription.
    pub subscription: Subscription,
    /// Behavior toggles.
    pub behaviors: Behaviors,
    /// Per-parent sampling window. All-`None` means no sampling.
    pub sampling: SampleSpec,
    /// Node-level client filter.
    pub node_filter: Option<FilterDef>,
    /// Child-listing filter applied to folder nodes.
    pub child_filter: Option<FilterDef>,
    /// Hibernation gate configuration.
    pub hibernation: HibernationOptions,
    /// Worker-pool parameters for concurrent execution.
    pub concurrency: ConcurrencyOptions,
    /// Where abort snapshots are written, when enabled.
    pub snapshot: Option<PathBuf>,
}

impl SessionOptions {
    /// Starts a builder over defaults.
    #[must_use]
    pub fn builder() -> SessionOptionsBuilder {
        SessionOptionsBuilder::default()
    }
}

/// Builder for [`SessionOptions`].
#[derive(Debug, Default)]
pub struct SessionOptionsBuilder {
    options: SessionOptions,
}

impl SessionOptionsBuilder {
    /// Sets the callback subscription.
    #[must_use]
    pub fn subscription(mut self, subscription: Subscription) -> Self {
        self.options.subscription = subscription;
        self
    }

    /// Enables snapshot-on-abort, writing to `path`.
    #[must_use]
    pub fn save_on_abort(mut self, path: PathBuf) -> Self {
        self.options.behaviors.save_on_abort = true;
        self.options.snapshot = Some(path);
        self
    }

    /// Installs the node-level client filter.
    #[must_use]
    pub fn node_filter(mut self, def: FilterDef) -> Self {
        self.options.node_filter = Some(def);
        self
    }

    /// Installs the child-listing filter.
    #[must_use]
    pub fn child_filter(mut self, def: FilterDef) -> Self {
        self.options.child_filter = Some(def);
        self
    }

    /// Configures the per-parent sampling window.
    #[must_use]
    pub fn sampling(mut self, spec: SampleSpec) -> Self {
        self.options.sampling = spec;
        self
    }

    /// Installs the wake filter. Inclusive wake is the default.
    #[must_use]
    pub fn wake(mut self, def: FilterDef) -> Self {
        self.options.hibernation.wake = Some(def);
        self
    }

    /// Installs the sleep filter. Exclusive sleep is the default.
    #[must_use]
    pub fn sleep(mut self, def: FilterDef) -> Self {
        self.options.hibernation.sleep = Some(def);
        self
    }

    /// Overrides whether the wake-triggering node runs the chain itself.
    #[must_use]
    pub fn inclusive_wake(mut self, inclusive: bool) -> Self {
        self.options.hibernation.inclusive_wake = inclusive;
        self
    }

    /// Overrides whether the sleep-triggering node runs the chain itself.
    #[must_use]
    pub fn inclusive_sleep(mut self, inclusive: bool) -> Self {
        self.options.hibernation.inclusive_sleep = inclusive;
        self
    }

    /// Sets the worker count for concurrent execution.
    #[must_use]
    pub fn workers(mut self, workers: usize) -> Self {
        self.options.concurrency.workers = workers;
        self
    }

    /// Sets the bounded channel capacity for the worker pool.
    #[must_use]
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.options.concurrency.queue_capacity = capacity;
        self
    }

    /// Sets the worker-side result send timeout.
    #[must_use]
    pub fn send_timeout(mut self, timeout: Duration) -> Self {
        self.options.concurrency.send_timeout = timeout;
        self
    }

    /// Finalizes the options.
    #[must_use]
    pub fn build(self) -> SessionOptions {
        self.options
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use filters::FilterKind;

    #[test]
    fn builder_defaults_are_universal_and_sequential_friendly() {
        let options = SessionOptions::builder().build();
        assert_eq!(options.subscription, Subscription::Universal);
        assert!(!options.behaviors.save_on_abort);
        assert!(options.node_filter.is_none());
        assert!(!options.hibernation.is_configured());
        assert_eq!(options.concurrency.workers, 4);
    }

    #[test]
    fn wake_defaults_to_inclusive() {
        let options = SessionOptions::builder()
            .wake(FilterDef::new(FilterKind::Glob, "start-here"))
            .build();
        assert!(options.hibernation.inclusive_wake);
        assert!(!options.hibernation.inclusive_sleep);
        assert!(options.hibernation.is_configured());
    }
}
