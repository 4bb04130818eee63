#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `hibernate` holds the wake/sleep machinery that conditions callback
//! activation and event broadcast: the monotonic [`HibernationState`]
//! machine, and the per-event [`Gate`]s collected in a [`NotificationHub`].
//!
//! # Design
//!
//! - The hub is owned by the session and built fresh per session; there is
//!   no process-wide dispatcher table, so sessions can never leak handlers
//!   into each other.
//! - Each gate computes its dispatcher from the subscriber count (no-op,
//!   single handler, broadcaster invoking every subscriber in subscription
//!   order). Muting is independent of subscription: while muted, dispatch is
//!   a permanent no-op; unmuting restores the last-computed dispatcher
//!   unchanged.
//! - Gating suppresses *event broadcast* to external listeners. It is
//!   orthogonal to the decision chain's veto logic over the callback.
//!
//! # Invariants
//!
//! - State transitions are monotonic within a session: `Pending` (or the
//!   auxiliary resume markers `Sleeping`/`Fastward`) advance to `Awake`,
//!   `Awake` advances to `Retired`, and no state is revisited.
//! - `mute` is idempotent; `unmute` after any number of `mute` calls restores
//!   exactly the pre-mute dispatcher.

mod gate;
mod state;

pub use gate::{EventKind, Gate, Handler, Notification, NotificationHub};
pub use state::{HibernationError, HibernationState};
