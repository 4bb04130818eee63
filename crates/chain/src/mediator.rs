use node::Node;

use crate::{ChainError, Role};

/// What happens to the current node after a verdict is applied.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Flow {
    /// Evaluation proceeds to the next link.
    Continue,
    /// The callback is suppressed for this node; later links do not run.
    Veto,
}

/// Verdict returned by a link for one node.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Dispatch {
    /// Proceed to the next link.
    Continue,
    /// Suppress the callback for this node only.
    Veto,
    /// Remove a link (possibly the reporting link itself), then apply `then`
    /// to the current node. Lifts the seal when the detached link sealed the
    /// chain.
    Detach {
        /// Role of the link to remove.
        role: Role,
        /// Continuation applied to the current node after removal.
        then: Flow,
    },
}

/// One decorator participating in the per-node decision chain.
///
/// `C` is the session context threaded through dispatch (ledger, gates,
/// active state). Links are created by plugins at initialization, registered
/// through [`Mediator::decorate`], and never shared across traversals.
pub trait Link<C> {
    /// The link's feature tag.
    fn role(&self) -> Role;

    /// Evaluates one node. Returning an error aborts the traversal.
    fn next(&mut self, node: &mut Node, ctx: &mut C) -> Result<Dispatch, ChainError>;
}

/// Decoration seal: either open or closed by a privileged link.
#[derive(Debug)]
pub enum Seal {
    /// Decoration is unrestricted.
    Open,
    /// Decoration of `rejects` fails until the sealing link is unwound.
    Closed {
        /// Role whose link installed the seal.
        by: Role,
        /// Roles refused while the seal holds.
        rejects: Vec<Role>,
    },
}

impl Seal {
    fn forbids(&self, role: Role) -> Option<Role> {
        match self {
            Self::Open => None,
            Self::Closed { by, rejects } => rejects.contains(&role).then_some(*by),
        }
    }
}

/// Orchestrates link ordering, sealing, and per-node dispatch.
pub struct Mediator<C> {
    links: Vec<Box<dyn Link<C>>>,
    seal: Seal,
    order: Vec<Role>,
}

impl<C> Default for Mediator<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Mediator<C> {
    /// Creates an empty, unsealed chain.
    #[must_use]
    pub fn new() -> Self {
        Self {
            links: Vec::new(),
            seal: Seal::Open,
            order: Vec::new(),
        }
    }

    /// Appends a link, unless the active seal rejects its role or a link for
    /// the role is already present.
    pub fn decorate(&mut self, link: Box<dyn Link<C>>) -> Result<(), ChainError> {
        let role = link.role();
        if let Some(sealed_by) = self.seal.forbids(role) {
            return Err(ChainError::Sealed {
                sealed_by,
                rejected: role,
            });
        }
        if self.links.iter().any(|existing| existing.role() == role) {
            return Err(ChainError::DuplicateRole { role });
        }
        tracing::debug!(%role, "decorating chain");
        self.links.push(link);
        self.arrange();
        Ok(())
    }

    /// Appends a privileged link and seals the chain against decoration of
    /// `rejects` until that link is unwound.
    pub fn decorate_sealed(
        &mut self,
        link: Box<dyn Link<C>>,
        rejects: Vec<Role>,
    ) -> Result<(), ChainError> {
        let by = link.role();
        // Only one seal at a time; a second sealer must unwind the first.
        if let Seal::Closed { by: holder, .. } = &self.seal {
            return Err(ChainError::Sealed {
                sealed_by: *holder,
                rejected: by,
            });
        }
        self.decorate(link)?;
        self.seal = Seal::Closed { by, rejects };
        Ok(())
    }

    /// Removes a link. When the removed link sealed the chain, the seal is
    /// lifted and decoration re-opens.
    pub fn unwind(&mut self, role: Role) -> Result<(), ChainError> {
        let index = self
            .links
            .iter()
            .position(|link| link.role() == role)
            .ok_or(ChainError::MissingRole { role })?;
        self.links.remove(index);
        if matches!(&self.seal, Seal::Closed { by, .. } if *by == role) {
            self.seal = Seal::Open;
        }
        tracing::debug!(%role, "unwound chain link");
        self.arrange();
        Ok(())
    }

    /// Recomputes the effective execution order.
    ///
    /// The order is the priority table filtered to registered roles, with
    /// defer rules applied against the accumulated active set: a role is
    /// skipped when any role it defers to has already been accepted.
    pub fn arrange(&mut self) {
        let mut order = Vec::with_capacity(self.links.len());
        for role in Role::MANIFEST {
            if !self.links.iter().any(|link| link.role() == role) {
                continue;
            }
            if role.defers_to().iter().any(|other| order.contains(other)) {
                tracing::trace!(%role, "role deferred out of the active order");
                continue;
            }
            order.push(role);
        }
        self.order = order;
    }

    /// Returns the current effective execution order.
    #[must_use]
    pub fn active_order(&self) -> &[Role] {
        &self.order
    }

    /// Returns whether a link for `role` participates in dispatch.
    #[must_use]
    pub fn is_active(&self, role: Role) -> bool {
        self.order.contains(&role)
    }

    /// Returns whether the chain currently holds a seal.
    #[must_use]
    pub fn is_sealed(&self) -> bool {
        matches!(self.seal, Seal::Closed { .. })
    }

    /// Dispatches one node through the active links in priority order.
    ///
    /// Returns `Ok(true)` when every link continued (the caller's callback
    /// may run), `Ok(false)` when a link vetoed this node. Side effects
    /// applied by earlier links are not rolled back on a veto or an error.
    pub fn dispatch(&mut self, node: &mut Node, ctx: &mut C) -> Result<bool, ChainError> {
        let order = self.order.clone();
        for role in order {
            // A link detached earlier in this very dispatch no longer runs.
            let Some(link) = self.links.iter_mut().find(|link| link.role() == role) else {
                continue;
            };
            match link.next(node, ctx)? {
                Dispatch::Continue => {}
                Dispatch::Veto => {
                    tracing::trace!(%role, path = %node.path().display(), "node vetoed");
                    return Ok(false);
                }
                Dispatch::Detach { role: target, then } => {
                    tracing::debug!(%role, detached = %target, "link requested detachment");
                    self.unwind(target)?;
                    if then == Flow::Veto {
                        return Ok(false);
                    }
                }
            }
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::{Arc, Mutex};

    type Trace = Arc<Mutex<Vec<Role>>>;

    struct TestLink {
        role: Role,
        verdict: Dispatch,
        trace: Trace,
    }

    impl TestLink {
        fn boxed(role: Role, verdict: Dispatch, trace: &Trace) -> Box<dyn Link<()>> {
            Box::new(Self {
                role,
                verdict,
                trace: Arc::clone(trace),
            })
        }
    }

    impl Link<()> for TestLink {
        fn role(&self) -> Role {
            self.role
        }

        fn next(&mut self, _node: &mut Node, (): &mut ()) -> Result<Dispatch, ChainError> {
            self.trace.lock().unwrap().push(self.role);
            Ok(self.verdict)
        }
    }

    fn sample_node() -> (tempfile::TempDir, Node) {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("entry.txt");
        fs::write(&path, b"x").expect("write");
        let metadata = fs::symlink_metadata(&path).expect("metadata");
        let node = Node::new(&path, temp.path(), metadata, 1);
        (temp, node)
    }

    fn is_subsequence(candidate: &[Role], table: &[Role]) -> bool {
        let mut cursor = table.iter();
        candidate
            .iter()
            .all(|role| cursor.any(|entry| entry == role))
    }

    #[test]
    fn active_order_is_subsequence_of_manifest() {
        let trace: Trace = Trace::default();
        let mut mediator: Mediator<()> = Mediator::new();
        // Decorate in scrambled order; arrangement must still follow the table.
        for role in [Role::Anchor, Role::Hibernate, Role::Fastward] {
            mediator
                .decorate(TestLink::boxed(role, Dispatch::Continue, &trace))
                .expect("decorate");
        }

        assert_eq!(
            mediator.active_order(),
            &[Role::Fastward, Role::Hibernate, Role::Anchor]
        );
        assert!(is_subsequence(mediator.active_order(), &Role::MANIFEST));
    }

    #[test]
    fn nanny_defers_to_client_filter() {
        let trace: Trace = Trace::default();
        let mut mediator: Mediator<()> = Mediator::new();
        mediator
            .decorate(TestLink::boxed(Role::ClientFilter, Dispatch::Continue, &trace))
            .expect("decorate filter");
        mediator
            .decorate(TestLink::boxed(Role::Nanny, Dispatch::Continue, &trace))
            .expect("decorate nanny");

        assert!(mediator.is_active(Role::ClientFilter));
        assert!(!mediator.is_active(Role::Nanny));
    }

    #[test]
    fn client_filter_defers_to_sampler() {
        let trace: Trace = Trace::default();
        let mut mediator: Mediator<()> = Mediator::new();
        mediator
            .decorate(TestLink::boxed(Role::Sampler, Dispatch::Continue, &trace))
            .expect("decorate sampler");
        mediator
            .decorate(TestLink::boxed(Role::ClientFilter, Dispatch::Continue, &trace))
            .expect("decorate filter");

        assert_eq!(mediator.active_order(), &[Role::Sampler]);
    }

    #[test]
    fn veto_short_circuits_remaining_links() {
        let trace: Trace = Trace::default();
        let mut mediator: Mediator<()> = Mediator::new();
        mediator
            .decorate(TestLink::boxed(Role::Hibernate, Dispatch::Continue, &trace))
            .expect("decorate");
        mediator
            .decorate(TestLink::boxed(Role::ClientFilter, Dispatch::Veto, &trace))
            .expect("decorate");
        mediator
            .decorate(TestLink::boxed(Role::Anchor, Dispatch::Continue, &trace))
            .expect("decorate");

        let (_temp, mut node) = sample_node();
        let verdict = mediator.dispatch(&mut node, &mut ()).expect("dispatch");
        assert!(!verdict);
        assert_eq!(
            trace.lock().unwrap().as_slice(),
            &[Role::Hibernate, Role::ClientFilter]
        );
    }

    #[test]
    fn sealed_role_is_rejected_until_unwound() {
        let trace: Trace = Trace::default();
        let mut mediator: Mediator<()> = Mediator::new();
        mediator
            .decorate_sealed(
                TestLink::boxed(Role::Fastward, Dispatch::Continue, &trace),
                vec![Role::Fastward],
            )
            .expect("seal");

        let rejected = mediator
            .decorate(TestLink::boxed(Role::Fastward, Dispatch::Continue, &trace))
            .unwrap_err();
        assert!(matches!(
            rejected,
            ChainError::Sealed {
                sealed_by: Role::Fastward,
                rejected: Role::Fastward,
            }
        ));

        mediator.unwind(Role::Fastward).expect("unwind");
        assert!(!mediator.is_sealed());
        mediator
            .decorate(TestLink::boxed(Role::Fastward, Dispatch::Continue, &trace))
            .expect("decoration re-opens after unwind");
    }

    #[test]
    fn detach_verdict_removes_link_and_continues() {
        let trace: Trace = Trace::default();
        let mut mediator: Mediator<()> = Mediator::new();
        mediator
            .decorate_sealed(
                TestLink::boxed(
                    Role::Fastward,
                    Dispatch::Detach {
                        role: Role::Fastward,
                        then: Flow::Continue,
                    },
                    &trace,
                ),
                vec![Role::Fastward],
            )
            .expect("seal");
        mediator
            .decorate(TestLink::boxed(Role::Anchor, Dispatch::Continue, &trace))
            .expect("decorate anchor");

        let (_temp, mut node) = sample_node();
        let verdict = mediator.dispatch(&mut node, &mut ()).expect("dispatch");
        assert!(verdict);
        assert!(!mediator.is_active(Role::Fastward));
        assert!(!mediator.is_sealed());
        // The node that triggered the detachment still reached the anchor.
        assert_eq!(
            trace.lock().unwrap().as_slice(),
            &[Role::Fastward, Role::Anchor]
        );
    }

    #[test]
    fn duplicate_role_is_refused() {
        let trace: Trace = Trace::default();
        let mut mediator: Mediator<()> = Mediator::new();
        mediator
            .decorate(TestLink::boxed(Role::Anchor, Dispatch::Continue, &trace))
            .expect("decorate");
        let error = mediator
            .decorate(TestLink::boxed(Role::Anchor, Dispatch::Continue, &trace))
            .unwrap_err();
        assert!(matches!(error, ChainError::DuplicateRole { role: Role::Anchor }));
    }

    #[test]
    fn link_error_aborts_dispatch() {
        struct FailingLink;
        impl Link<()> for FailingLink {
            fn role(&self) -> Role {
                Role::Sampler
            }
            fn next(&mut self, _node: &mut Node, (): &mut ()) -> Result<Dispatch, ChainError> {
                Err(ChainError::link(
                    Role::Sampler,
                    std::io::Error::other("window state lost"),
                ))
            }
        }

        let trace: Trace = Trace::default();
        let mut mediator: Mediator<()> = Mediator::new();
        mediator.decorate(Box::new(FailingLink)).expect("decorate");
        mediator
            .decorate(TestLink::boxed(Role::Anchor, Dispatch::Continue, &trace))
            .expect("decorate");

        let (_temp, mut node) = sample_node();
        let error = mediator.dispatch(&mut node, &mut ()).unwrap_err();
        assert!(matches!(error, ChainError::Link { role: Role::Sampler, .. }));
        // The anchor never ran.
        assert!(trace.lock().unwrap().is_empty());
    }
}
