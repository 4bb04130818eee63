#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `node` defines the value types shared by every crate in the traversal
//! workspace: the [`Node`] handed to the decision chain once per visited
//! filesystem entry, the [`Scope`] bitmask classifying its position and kind,
//! and the [`Extension`] record carrying derived strings and the caller's
//! free-form payload.
//!
//! # Design
//!
//! - [`Node`] owns its path and captured [`fs::Metadata`]. It is created once
//!   per walker step, consumed synchronously by the chain and the execution
//!   strategy, and never retained afterwards; concurrent execution moves the
//!   node into the worker job.
//! - There is no parent pointer. The `name`, `parent`, and `sub_path` strings
//!   a chain link ever reads are derived once at construction and stored in
//!   the [`Extension`], so nodes stay free of ownership cycles.
//! - [`Scope`] combines positional bits (`TREE`, `TOP`, `LEAF`,
//!   `INTERMEDIATE`, `CUSTOM`) with exactly one kind bit (`FILE` or
//!   `FOLDER`).
//!
//! # Invariants
//!
//! - Exactly one of [`Scope::FILE`] / [`Scope::FOLDER`] is set on a
//!   constructed node; positional bits combine freely.
//! - `sub_path` is always relative to the traversal root and never contains
//!   `..` segments.
//!
//! # Examples
//!
//! ```
//! use node::{Node, Scope};
//! use std::fs;
//!
//! # fn demo() -> std::io::Result<()> {
//! let temp = tempfile::tempdir()?;
//! let file = temp.path().join("report.txt");
//! fs::write(&file, b"data")?;
//!
//! let metadata = fs::symlink_metadata(&file)?;
//! let node = Node::new(&file, temp.path(), metadata, 1);
//! assert_eq!(node.name(), "report.txt");
//! assert!(node.scope().contains(Scope::FILE));
//! # Ok(())
//! # }
//! # demo().unwrap();
//! ```

mod entry;
mod scope;

pub use entry::{ChildEntry, Extension, Node};
pub use scope::{Scope, ScopeParseError};
