#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `chain` implements the decision pipeline that runs once per visited node:
//! an ordered list of [`Link`]s, each able to veto the caller's callback for
//! that node or request detachment of a link, orchestrated by a [`Mediator`].
//!
//! # Design
//!
//! - Each feature is a tagged variant of the closed [`Role`] enumeration
//!   carrying one function-shaped capability ([`Link::next`]); composition is
//!   an explicit ordered list plus a declarative defer-rule table, not a
//!   class hierarchy.
//! - The effective execution order is always a stable subsequence of the
//!   fixed priority table ([`Role::MANIFEST`]), filtered by defer rules that
//!   are evaluated against the *currently accumulated* active set. Activation
//!   order in the table therefore decides which rule can apply: a
//!   later-declared role can never retroactively exclude an earlier one.
//! - Sealing is an explicit two-state machine ([`Seal`]), not a boolean flag:
//!   once a privileged link installs a seal, decoration of the rejected roles
//!   fails with [`ChainError::Sealed`] until the sealing link is unwound.
//! - A link never calls back into the mediator. Detachment, including a
//!   link removing itself as the fastward link does on its first match, is
//!   expressed as a [`Dispatch::Detach`] verdict the mediator honours after
//!   the link returns.
//!
//! # Invariants
//!
//! - At most one link per role is active at a time.
//! - A veto suppresses the callback for the current node only; sibling and
//!   descendant nodes are unaffected.
//! - Dispatch is non-transactional: side effects applied by earlier links
//!   stand when a later link vetoes or errors.
//!
//! # Errors
//!
//! [`ChainError`] covers sealed-role conflicts, duplicate or missing roles,
//! and errors surfaced by a link's own `next`. A veto is never an error.

mod error;
mod mediator;
mod role;

pub use error::ChainError;
pub use mediator::{Dispatch, Flow, Link, Mediator, Seal};
pub use role::Role;
