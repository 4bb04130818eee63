// crates/kernel/src/session.rs
//! The session facade: drives nodes through the chain and the callback.

use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::Arc;

use chain::{Mediator, Role};
use hibernate::{EventKind, HibernationState, Notification, NotificationHub};
use ledger::Ledger;
use node::Node;

use crate::context::SessionContext;
use crate::error::{CallbackError, TraverseError};
use crate::exec::{CancellationToken, ExecutionMode, JobOutcome, WorkerPool};
use crate::options::SessionOptions;
use crate::plugins::{self, FastwardPlugin, Plugin, PluginInit};
use crate::resume::{self, ActiveState, ResumeStrategy};

/// Per-node handler supplied by the caller.
///
/// Shared across worker threads in concurrent mode, so it must be `Send`
/// and `Sync`; per-node mutable state belongs in the node payload or behind
/// the caller's own synchronization.
pub type Callback = Arc<dyn Fn(&Node) -> Result<(), CallbackError> + Send + Sync>;

/// Final result of a completed (or cancelled) traversal.
#[derive(Debug)]
pub struct TraverseReport {
    /// Counters accumulated over the whole run.
    pub ledger: Ledger,
    /// Per-node callback results, in completion order. Empty in
    /// sequential mode, where a callback error aborts the run instead.
    pub outcomes: Vec<JobOutcome>,
    /// `false` when the run stopped on cancellation.
    pub completed: bool,
}

/// One traversal session: configuration, chain, state, and callback.
///
/// A session is single-use. Feed it nodes through [`Session::run`] (or one
/// at a time through [`Session::visit`]), then drop it; resume from a
/// snapshot with [`Session::resume`].
pub struct Session {
    options: SessionOptions,
    callback: Callback,
    mode: ExecutionMode,
    mediator: Mediator<SessionContext>,
    ctx: SessionContext,
    token: CancellationToken,
    fastward: Option<(String, String)>,
    last_depth: usize,
    last_was_folder: bool,
}

impl Session {
    /// Builds a fresh session rooted at `root`.
    ///
    /// Built-in plugins for every configured feature are registered and
    /// initialized here; configuration problems (bad patterns, role
    /// conflicts) surface now, never mid-traversal.
    pub fn new(
        root: &Path,
        options: SessionOptions,
        callback: Callback,
        mode: ExecutionMode,
    ) -> Result<Self, TraverseError> {
        let initial = if options.hibernation.wake.is_some() {
            HibernationState::Pending
        } else {
            HibernationState::Awake
        };
        let state = ActiveState::fresh(root, options.subscription, initial);
        Self::assemble(options, callback, mode, state, None)
    }

    /// Rebuilds a session from a resume document.
    ///
    /// `Spawn` restores the configuration and starts over from the tree
    /// root with zeroed counters. `Fastward` additionally replays silently
    /// to the recorded position, carrying the snapshot's counters forward.
    pub fn resume(
        document: &Path,
        strategy: ResumeStrategy,
        callback: Callback,
        mode: ExecutionMode,
    ) -> Result<Self, TraverseError> {
        let document = resume::load(document)?;
        let options = resume::restore(&document.options);
        tracing::info!(?strategy, root = %document.active.tree_root.display(), "resuming session");
        match strategy {
            ResumeStrategy::Spawn => {
                let root = document.active.tree_root.clone();
                Self::new(&root, options, callback, mode)
            }
            ResumeStrategy::Fastward => {
                let mut active = document.active;
                let target = (active.position_name(), active.position_parent());
                active.hibernation = HibernationState::Fastward;
                Self::assemble(options, callback, mode, active, Some(target))
            }
        }
    }

    fn assemble(
        options: SessionOptions,
        callback: Callback,
        mode: ExecutionMode,
        state: ActiveState,
        fastward: Option<(String, String)>,
    ) -> Result<Self, TraverseError> {
        let mut ctx = SessionContext::new(state);
        ctx.ledger = ctx.state.ledger.clone();
        let mut mediator = Mediator::new();

        let mut plugins = plugins::built_ins(&options);
        if let Some((name, parent)) = &fastward {
            plugins.push(Box::new(FastwardPlugin {
                name: name.clone(),
                parent: parent.clone(),
            }));
        }
        for plugin in &mut plugins {
            plugin.register(&options)?;
        }
        let mut init = PluginInit {
            options: &options,
            mediator: &mut mediator,
            context: &mut ctx,
        };
        for plugin in &mut plugins {
            plugin.init(&mut init)?;
        }

        Ok(Self {
            options,
            callback,
            mode,
            mediator,
            ctx,
            token: CancellationToken::new(),
            fastward,
            last_depth: 0,
            last_was_folder: false,
        })
    }

    /// Registers a caller-supplied plugin, running both protocol stages.
    pub fn register_plugin(&mut self, mut plugin: Box<dyn Plugin>) -> Result<(), TraverseError> {
        plugin.register(&self.options)?;
        let mut init = PluginInit {
            options: &self.options,
            mediator: &mut self.mediator,
            context: &mut self.ctx,
        };
        plugin.init(&mut init)
    }

    /// Subscribes `handler` to lifecycle events of `kind`.
    pub fn on(&mut self, kind: EventKind, handler: hibernate::Handler) {
        self.ctx.hub.on(kind, handler);
    }

    /// Mutable access to the notification hub, for muting.
    pub fn hub_mut(&mut self) -> &mut NotificationHub {
        self.ctx.hub_mut()
    }

    /// Read access to the traversal counters.
    #[must_use]
    pub fn ledger(&self) -> &Ledger {
        self.ctx.ledger()
    }

    /// Read access to the active traversal state.
    #[must_use]
    pub fn state(&self) -> &ActiveState {
        self.ctx.state()
    }

    /// The chain's current effective execution order.
    #[must_use]
    pub fn active_order(&self) -> &[Role] {
        self.mediator.active_order()
    }

    /// A clone of the session's cancellation token.
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Persists the session's current position and configuration.
    pub fn checkpoint(&mut self, path: &Path) -> Result<(), TraverseError> {
        self.ctx.state.ledger = self.ctx.ledger.clone();
        resume::save(path, &self.options, &self.ctx.state)?;
        Ok(())
    }

    /// Runs one node through the chain; when the chain accepts it, the
    /// callback runs inline regardless of the execution mode.
    ///
    /// This is the seam for callers that drive their own walker. The
    /// returned flag is a continuation signal: `false` means the session
    /// is retired or cancelled and feeding further nodes is pointless.
    pub fn visit(&mut self, mut node: Node) -> Result<bool, TraverseError> {
        if self.decide(&mut node)? {
            (self.callback)(&node).map_err(|source| TraverseError::Callback {
                path: node.path().to_path_buf(),
                source,
            })?;
        }
        Ok(!self.ctx.state.hibernation.is_retired() && !self.token.is_cancelled())
    }

    /// Drives an entire node stream to completion.
    ///
    /// When the snapshot policy is enabled, the active state is persisted
    /// on any exit: normal completion, cancellation, error, or panic (the
    /// panic is then propagated).
    pub fn run<I, E>(&mut self, nodes: I) -> Result<TraverseReport, TraverseError>
    where
        I: IntoIterator<Item = Result<Node, E>>,
        E: std::error::Error + Send + Sync + 'static,
    {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.drive(nodes)));
        match outcome {
            Ok(result) => {
                self.apply_snapshot_policy();
                result
            }
            Err(payload) => {
                self.apply_snapshot_policy();
                panic::resume_unwind(payload);
            }
        }
    }

    fn apply_snapshot_policy(&mut self) {
        if !self.options.behaviors.save_on_abort {
            return;
        }
        let Some(path) = self.options.snapshot.clone() else {
            tracing::warn!("snapshot policy enabled without a snapshot path");
            return;
        };
        self.ctx.state.ledger = self.ctx.ledger.clone();
        if let Err(error) = resume::save(&path, &self.options, &self.ctx.state) {
            tracing::warn!(%error, "snapshot write failed");
        }
    }

    fn drive<I, E>(&mut self, nodes: I) -> Result<TraverseReport, TraverseError>
    where
        I: IntoIterator<Item = Result<Node, E>>,
        E: std::error::Error + Send + Sync + 'static,
    {
        let pool = match self.mode {
            ExecutionMode::Sequential => None,
            ExecutionMode::Concurrent => Some(WorkerPool::new(
                &self.options.concurrency,
                Arc::clone(&self.callback),
                self.token.clone(),
            )?),
        };

        self.ctx.hub.dispatch(
            EventKind::Begin,
            &Notification::Begin {
                root: self.ctx.state.tree_root.clone(),
            },
        );

        let mut completed = true;
        let mut failure: Option<TraverseError> = None;
        let mut outcomes: Vec<JobOutcome> = Vec::new();
        for entry in nodes {
            if self.token.is_cancelled() {
                completed = false;
                break;
            }
            let mut node = match entry {
                Ok(node) => node,
                Err(source) => {
                    failure = Some(TraverseError::Source {
                        source: Box::new(source),
                    });
                    break;
                }
            };
            let accepted = match self.decide(&mut node) {
                Ok(accepted) => accepted,
                Err(error) => {
                    failure = Some(error);
                    break;
                }
            };
            if !accepted {
                continue;
            }
            let result = match &pool {
                Some(pool) => {
                    let sent = pool.submit(node).map_err(TraverseError::from);
                    if sent.is_ok() {
                        pool.poll(&mut outcomes);
                    }
                    sent
                }
                None => (self.callback)(&node).map_err(|source| TraverseError::Callback {
                    path: node.path().to_path_buf(),
                    source,
                }),
            };
            if let Err(error) = result {
                failure = Some(error);
                break;
            }
        }

        if let Some(pool) = pool {
            match pool.drain() {
                Ok(rest) => outcomes.extend(rest),
                Err(error) => {
                    failure.get_or_insert(error.into());
                }
            }
        }

        self.ctx.hub.dispatch(EventKind::End, &Notification::End);

        if let Some(error) = failure {
            return Err(error);
        }
        if completed {
            if let Some((name, parent)) = &self.fastward {
                if self.mediator.is_active(Role::Fastward) {
                    return Err(TraverseError::FastwardMissed {
                        name: name.clone(),
                        parent: parent.clone(),
                    });
                }
            }
        }

        Ok(TraverseReport {
            ledger: self.ctx.ledger.clone(),
            outcomes,
            completed,
        })
    }

    /// Event bookkeeping plus chain dispatch for one node.
    fn decide(&mut self, node: &mut Node) -> Result<bool, TraverseError> {
        let depth = node.depth();
        if depth < self.last_depth {
            // One event per directory actually exited, deepest first. The
            // previous node itself counts when it was an empty directory.
            let previous = self.ctx.state.current_path.clone();
            let mut left = if self.last_was_folder {
                Some(previous.as_path())
            } else {
                previous.parent()
            };
            let mut level = if self.last_was_folder {
                self.last_depth
            } else {
                self.last_depth.saturating_sub(1)
            };
            while let Some(dir) = left {
                if level < depth {
                    break;
                }
                self.ctx.hub.dispatch(
                    EventKind::Ascend,
                    &Notification::Ascend {
                        path: dir.to_path_buf(),
                    },
                );
                left = dir.parent();
                if level == 0 {
                    break;
                }
                level -= 1;
            }
        }
        if node.is_folder() {
            self.ctx.hub.dispatch(
                EventKind::Descend,
                &Notification::Descend {
                    path: node.path().to_path_buf(),
                },
            );
        }
        self.last_depth = depth;
        self.last_was_folder = node.is_folder();
        self.ctx.state.mark(node);

        Ok(self.mediator.dispatch(node, &mut self.ctx)?)
    }
}
