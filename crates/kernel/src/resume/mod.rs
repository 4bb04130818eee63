// crates/kernel/src/resume/mod.rs
//! Persistence of a session's position and configuration.
//!
//! A resume document is one JSON object with two top-level members: `JO`,
//! the projected session options, and `Active`, the active traversal state.
//! Writing is a single buffered write followed by a field-by-field
//! equivalence validation of the projection against the live options, so a
//! snapshot that lands on disk is known to restore faithfully.

mod json;
mod store;

use std::path::{Path, PathBuf};

use hibernate::HibernationState;
use ledger::Ledger;
use node::Node;
use serde::{Deserialize, Serialize};

pub use json::{EquivalenceError, JsonOptions, equivalent, project, restore};
pub use store::{ResumeDocument, ResumeError, load, save};

use crate::options::Subscription;

/// Where a resumed session should pick up.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ResumeStrategy {
    /// Start a fresh traversal with the restored options and a zeroed
    /// ledger, ignoring the recorded position.
    Spawn,
    /// Replay the tree silently until the recorded position is reached,
    /// then continue live from there.
    Fastward,
}

/// Live traversal position and progress, snapshotted verbatim.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ActiveState {
    /// Root the traversal started from.
    #[serde(rename = "tree-root")]
    pub tree_root: PathBuf,
    /// Node most recently handed to the chain.
    #[serde(rename = "current-path")]
    pub current_path: PathBuf,
    /// Depth of that node below the root.
    pub depth: usize,
    /// Subscription the session was running under.
    pub subscription: Subscription,
    /// Conditional-activation state at snapshot time.
    pub hibernation: HibernationState,
    /// Counters accumulated so far.
    pub ledger: Ledger,
}

impl ActiveState {
    /// Creates the state of a freshly started session.
    #[must_use]
    pub fn fresh(root: &Path, subscription: Subscription, hibernation: HibernationState) -> Self {
        Self {
            tree_root: root.to_path_buf(),
            current_path: root.to_path_buf(),
            depth: 0,
            subscription,
            hibernation,
            ledger: Ledger::default(),
        }
    }

    /// Records `node` as the current traversal position.
    pub fn mark(&mut self, node: &Node) {
        self.current_path = node.path().to_path_buf();
        self.depth = node.depth();
    }

    /// Name of the node at the recorded position.
    #[must_use]
    pub fn position_name(&self) -> String {
        self.current_path
            .file_name()
            .map_or_else(|| ".".to_owned(), |name| name.to_string_lossy().into_owned())
    }

    /// Parent path of the node at the recorded position, `"."` when the
    /// position is directly under (or is) the tree root.
    #[must_use]
    pub fn position_parent(&self) -> String {
        if self.depth <= 1 {
            return ".".to_owned();
        }
        self.current_path
            .parent()
            .map_or_else(|| ".".to_owned(), |path| path.to_string_lossy().into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_state_points_at_the_root() {
        let state = ActiveState::fresh(
            Path::new("/srv/tree"),
            Subscription::Universal,
            HibernationState::Awake,
        );
        assert_eq!(state.tree_root, state.current_path);
        assert_eq!(state.depth, 0);
        assert_eq!(state.position_parent(), ".");
    }

    #[test]
    fn position_parent_is_dot_at_depth_one() {
        let mut state = ActiveState::fresh(
            Path::new("/srv/tree"),
            Subscription::Universal,
            HibernationState::Awake,
        );
        state.current_path = PathBuf::from("/srv/tree/top.txt");
        state.depth = 1;
        assert_eq!(state.position_name(), "top.txt");
        assert_eq!(state.position_parent(), ".");

        state.current_path = PathBuf::from("/srv/tree/sub/deep.txt");
        state.depth = 2;
        assert_eq!(state.position_parent(), "/srv/tree/sub");
    }
}
