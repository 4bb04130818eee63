#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `kernel` is the traversal engine's control plane. For every node a
//! walker produces, the session drives the decorator chain to decide
//! whether the caller's callback runs, then executes the callback inline
//! or on a bounded worker pool, keeps the metrics ledger, and maintains
//! the active state the resume subsystem snapshots and restores.
//!
//! # Design
//!
//! - [`Session`] owns the chain ([`chain::Mediator`]), the notification
//!   hub, the counters, and the active state; [`Session::run`] drives a
//!   node stream to completion and [`Session::visit`] exposes the per-node
//!   seam for external drivers.
//! - Features join the chain through the two-phase [`Plugin`] protocol:
//!   `register` validates (filter definitions compile here), `init`
//!   decorates. The session's own filtering, sampling, hibernation, and
//!   resume features use the same protocol as caller plugins.
//! - The resume subsystem ([`resume`]) projects the live configuration
//!   into a JSON document, validates the projection field by field after
//!   every write, and restores a session either fresh (`Spawn`) or by
//!   silently fast-forwarding to the recorded position (`Fastward`).
//!
//! # Invariants
//!
//! - Setup errors surface at construction or plugin registration, never
//!   mid-traversal.
//! - A chain veto suppresses exactly one callback; it never stops the
//!   walk itself.
//! - In concurrent mode every accepted node yields exactly one
//!   [`JobOutcome`], and the result stream closes exactly once, after the
//!   job side is closed and drained.
//!
//! # Errors
//!
//! [`TraverseError`] is the single fatal error type. Callback errors are
//! fatal in sequential mode and recorded per node in concurrent mode.
//!
//! # Examples
//!
//! ```
//! use std::fs;
//! use std::sync::Arc;
//!
//! use kernel::{ExecutionMode, MetricKind, Node, Session, SessionOptions};
//! use walk::WalkBuilder;
//!
//! # fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let temp = tempfile::tempdir()?;
//! fs::write(temp.path().join("a.txt"), b"data")?;
//!
//! let mut session = Session::new(
//!     temp.path(),
//!     SessionOptions::builder().build(),
//!     Arc::new(|node: &Node| {
//!         println!("visited {}", node.sub_path());
//!         Ok(())
//!     }),
//!     ExecutionMode::Sequential,
//! )?;
//!
//! let walker = WalkBuilder::new(temp.path()).include_root(false).build()?;
//! let report = session.run(walker)?;
//! assert_eq!(report.ledger.count(MetricKind::FilesInvoked), 1);
//! # Ok(())
//! # }
//! # demo().unwrap();
//! ```

mod context;
mod error;
mod exec;
mod links;
mod options;
mod plugins;
pub mod resume;
mod session;

pub use context::SessionContext;
pub use error::{CallbackError, TraverseError};
pub use exec::{CancellationToken, ExecutionMode, JobOutcome, PoolError};
pub use hibernate::{EventKind, Handler, Notification, NotificationHub};
pub use ledger::{Ledger, MetricKind};
pub use node::{ChildEntry, Node, Scope};
pub use options::{
    Behaviors, ConcurrencyOptions, HibernationOptions, SessionOptions, SessionOptionsBuilder,
    Subscription,
};
pub use plugins::{Plugin, PluginInit};
pub use resume::{ActiveState, ResumeStrategy};
pub use session::{Callback, Session, TraverseReport};
