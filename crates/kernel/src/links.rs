// crates/kernel/src/links.rs
//! Built-in chain links installed by the session's own plugins.

use chain::{ChainError, Dispatch, Flow, Link, Role};
use filters::{ChildFilter, Filter, SampleFilter};
use hibernate::{EventKind, HibernationState, Notification};
use ledger::MetricKind;
use node::Node;

use crate::context::SessionContext;
use crate::options::Subscription;

fn filtered_out_metric(node: &Node) -> MetricKind {
    if node.is_folder() {
        MetricKind::DirectoriesFilteredOut
    } else {
        MetricKind::FilesFilteredOut
    }
}

/// Conditional-activation link: drives wake and sleep transitions and
/// vetoes every node outside the awake window.
pub(crate) struct HibernateLink {
    pub(crate) wake: Option<Box<dyn Filter>>,
    pub(crate) sleep: Option<Box<dyn Filter>>,
    pub(crate) inclusive_wake: bool,
    pub(crate) inclusive_sleep: bool,
}

impl Link<SessionContext> for HibernateLink {
    fn role(&self) -> Role {
        Role::Hibernate
    }

    fn next(&mut self, node: &mut Node, ctx: &mut SessionContext) -> Result<Dispatch, ChainError> {
        match ctx.state.hibernation {
            // A fast-forward link ahead of us owns the transition.
            HibernationState::Fastward => Ok(Dispatch::Continue),
            HibernationState::Pending | HibernationState::Sleeping => {
                let woke = self
                    .wake
                    .as_ref()
                    .is_some_and(|filter| filter.evaluate(node));
                if !woke {
                    return Ok(Dispatch::Veto);
                }
                ctx.state
                    .hibernation
                    .advance(HibernationState::Awake)
                    .map_err(|err| ChainError::link(Role::Hibernate, err))?;
                ctx.hub.dispatch(
                    EventKind::Wake,
                    &Notification::Wake {
                        at: node.path().to_path_buf(),
                    },
                );
                if self.inclusive_wake {
                    Ok(Dispatch::Continue)
                } else {
                    Ok(Dispatch::Veto)
                }
            }
            HibernationState::Awake => {
                let slept = self
                    .sleep
                    .as_ref()
                    .is_some_and(|filter| filter.evaluate(node));
                if !slept {
                    return Ok(Dispatch::Continue);
                }
                ctx.state
                    .hibernation
                    .advance(HibernationState::Retired)
                    .map_err(|err| ChainError::link(Role::Hibernate, err))?;
                ctx.hub.dispatch(
                    EventKind::Sleep,
                    &Notification::Sleep {
                        at: node.path().to_path_buf(),
                    },
                );
                if self.inclusive_sleep {
                    Ok(Dispatch::Continue)
                } else {
                    Ok(Dispatch::Veto)
                }
            }
            HibernationState::Retired => Ok(Dispatch::Veto),
        }
    }
}

/// Streaming sampler link: vetoes nodes that fall outside the per-parent
/// sample window.
pub(crate) struct SamplerLink {
    pub(crate) filter: SampleFilter,
}

impl Link<SessionContext> for SamplerLink {
    fn role(&self) -> Role {
        Role::Sampler
    }

    fn next(&mut self, node: &mut Node, ctx: &mut SessionContext) -> Result<Dispatch, ChainError> {
        if ctx.is_replaying() {
            return Ok(Dispatch::Continue);
        }
        if self.filter.evaluate(node) {
            Ok(Dispatch::Continue)
        } else {
            ctx.ledger.tick(filtered_out_metric(node));
            Ok(Dispatch::Veto)
        }
    }
}

/// Client filter link: node-level verdict plus the hybrid child-listing
/// pass for folder nodes.
pub(crate) struct ClientFilterLink {
    pub(crate) filter: Option<Box<dyn Filter>>,
    pub(crate) child: Option<ChildFilter>,
}

impl Link<SessionContext> for ClientFilterLink {
    fn role(&self) -> Role {
        Role::ClientFilter
    }

    fn next(&mut self, node: &mut Node, ctx: &mut SessionContext) -> Result<Dispatch, ChainError> {
        if ctx.is_replaying() {
            return Ok(Dispatch::Continue);
        }
        if let Some(filter) = &self.filter {
            if !filter.evaluate(node) {
                ctx.ledger.tick(filtered_out_metric(node));
                return Ok(Dispatch::Veto);
            }
        }
        if node.is_folder() {
            if let Some(child) = &self.child {
                let (kept, discarded) = child.apply(node.take_children());
                ctx.ledger.times(MetricKind::ChildFilesFound, kept.len() as u64);
                ctx.ledger
                    .times(MetricKind::ChildFilesFilteredOut, discarded as u64);
                node.set_children(kept);
            }
        }
        Ok(Dispatch::Continue)
    }
}

/// Standalone child-listing link, active only when no client filter link
/// claims the role ahead of it.
pub(crate) struct NannyLink {
    pub(crate) child: ChildFilter,
}

impl Link<SessionContext> for NannyLink {
    fn role(&self) -> Role {
        Role::Nanny
    }

    fn next(&mut self, node: &mut Node, ctx: &mut SessionContext) -> Result<Dispatch, ChainError> {
        if ctx.is_replaying() || !node.is_folder() {
            return Ok(Dispatch::Continue);
        }
        let (kept, discarded) = self.child.apply(node.take_children());
        ctx.ledger.times(MetricKind::ChildFilesFound, kept.len() as u64);
        ctx.ledger
            .times(MetricKind::ChildFilesFilteredOut, discarded as u64);
        node.set_children(kept);
        Ok(Dispatch::Continue)
    }
}

/// Terminal link: subscription gate and invocation accounting. A
/// `Continue` verdict from the anchor means the caller's callback runs.
pub(crate) struct AnchorLink {
    pub(crate) subscription: Subscription,
}

impl Link<SessionContext> for AnchorLink {
    fn role(&self) -> Role {
        Role::Anchor
    }

    fn next(&mut self, node: &mut Node, ctx: &mut SessionContext) -> Result<Dispatch, ChainError> {
        if !ctx.state.hibernation.is_awake() {
            return Ok(Dispatch::Veto);
        }
        if !self.subscription.accepts(node) {
            return Ok(Dispatch::Veto);
        }
        ctx.ledger.tick(if node.is_folder() {
            MetricKind::DirectoriesInvoked
        } else {
            MetricKind::FilesInvoked
        });
        Ok(Dispatch::Continue)
    }
}

/// Fast-forward link: silently replays the tree until the recorded
/// position, then detaches itself and wakes the session.
pub(crate) struct FastwardLink {
    pub(crate) name: String,
    pub(crate) parent: String,
    pub(crate) inclusive: bool,
}

impl FastwardLink {
    fn matches(&self, node: &Node) -> bool {
        if node.name() != self.name {
            return false;
        }
        // "." stands for the tree root on both sides of the match.
        node.parent() == self.parent
    }
}

impl Link<SessionContext> for FastwardLink {
    fn role(&self) -> Role {
        Role::Fastward
    }

    fn next(&mut self, node: &mut Node, ctx: &mut SessionContext) -> Result<Dispatch, ChainError> {
        if !self.matches(node) {
            return Ok(Dispatch::Continue);
        }
        tracing::info!(path = %node.path().display(), "fast-forward position reached");
        ctx.state
            .hibernation
            .advance(HibernationState::Awake)
            .map_err(|err| ChainError::link(Role::Fastward, err))?;
        ctx.hub.unmute_all();
        Ok(Dispatch::Detach {
            role: Role::Fastward,
            then: if self.inclusive {
                Flow::Continue
            } else {
                Flow::Veto
            },
        })
    }
}
