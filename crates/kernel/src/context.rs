// crates/kernel/src/context.rs
use hibernate::{HibernationState, NotificationHub};
use ledger::Ledger;

use crate::resume::ActiveState;

/// Mutable session state threaded through every chain dispatch.
///
/// Links receive `&mut SessionContext` and use it for counter updates,
/// notification dispatch, and hibernation transitions. The context never
/// crosses a thread boundary; worker results are folded back on the driver.
pub struct SessionContext {
    pub(crate) ledger: Ledger,
    pub(crate) hub: NotificationHub,
    pub(crate) state: ActiveState,
}

impl SessionContext {
    pub(crate) fn new(state: ActiveState) -> Self {
        Self {
            ledger: Ledger::default(),
            hub: NotificationHub::new(),
            state,
        }
    }

    /// Read access to the traversal counters.
    #[must_use]
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Mutable access to the traversal counters.
    pub fn ledger_mut(&mut self) -> &mut Ledger {
        &mut self.ledger
    }

    /// Mutable access to the notification hub.
    pub fn hub_mut(&mut self) -> &mut NotificationHub {
        &mut self.hub
    }

    /// Read access to the active traversal state.
    #[must_use]
    pub fn state(&self) -> &ActiveState {
        &self.state
    }

    /// Mutable access to the active traversal state.
    pub fn state_mut(&mut self) -> &mut ActiveState {
        &mut self.state
    }

    /// Whether the session is silently replaying toward a recorded
    /// position. Side-effecting links stand down while this holds.
    #[must_use]
    pub fn is_replaying(&self) -> bool {
        matches!(self.state.hibernation, HibernationState::Fastward)
    }
}
