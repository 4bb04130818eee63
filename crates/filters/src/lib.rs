#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `filters` provides the matcher families evaluated against every visited
//! node: case-insensitive shell globs, extended globs with extension
//! allow-lists, regular expressions, caller-supplied predicates, sample
//! windows over a directory's sorted children, and child-list filters that
//! rewrite a folder node's collected file entries.
//!
//! # Design
//!
//! - Every family implements [`Filter`]. The trait separates the raw match
//!   ([`Filter::is_match`]) from the evaluated verdict ([`Filter::evaluate`]),
//!   which applies the applicability short-circuit and negation on top.
//! - A filter only consults `is_match` when its scope intersects the node's
//!   scope; otherwise the configured `if_not_applicable` default (pass) is
//!   returned. `negate` inverts *after* that short-circuit, so a node the
//!   filter does not apply to is never negated.
//! - [`FilterDef`] is the serde wire model persisted inside resume documents
//!   (`filter-type`, `pattern`, `filter-scope`, `negate`,
//!   `if-not-applicable`, optional `Poly`). [`compile`] turns a definition
//!   into a boxed filter; pattern problems surface here, at registration
//!   time, never during dispatch.
//!
//! # Errors
//!
//! Construction and [`compile`] report [`FilterError`] carrying the offending
//! pattern and the underlying [`globset::Error`] or [`regex::Error`].
//!
//! # Examples
//!
//! ```
//! use filters::{FilterDef, FilterKind, compile};
//! use node::{Node, Scope};
//! use std::fs;
//!
//! # fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let temp = tempfile::tempdir()?;
//! let file = temp.path().join("cover.jpg");
//! fs::write(&file, b"img")?;
//! let metadata = fs::symlink_metadata(&file)?;
//! let node = Node::new(&file, temp.path(), metadata, 1);
//!
//! let def = FilterDef::new(FilterKind::Glob, "cover.*").with_scope(Scope::FILE);
//! let filter = compile(&def)?;
//! assert!(filter.evaluate(&node));
//! # Ok(())
//! # }
//! # demo().unwrap();
//! ```

mod child;
mod custom;
mod def;
mod error;
mod extended;
mod glob;
mod regexp;
mod sample;

use node::Node;

pub use child::ChildFilter;
pub use custom::CustomFilter;
pub use def::{FilterDef, FilterKind, PolyDef, compile, compile_child};
pub use error::FilterError;
pub use extended::ExtendedGlobFilter;
pub use glob::GlobFilter;
pub use regexp::RegexFilter;
pub use sample::{SampleFilter, SampleSpec, windowed};

use node::Scope;

/// Common configuration shared by every filter family.
#[derive(Clone, Debug)]
pub struct FilterOptions {
    /// Scope bits the filter applies to.
    pub scope: Scope,
    /// Inverts the match result after the applicability short-circuit.
    pub negate: bool,
    /// Verdict returned for nodes the filter is not applicable to.
    pub if_not_applicable: bool,
    /// Human-readable origin of the filter (usually the pattern text).
    pub source: String,
}

impl FilterOptions {
    /// Creates options applying to every scope, passing when not applicable.
    #[must_use]
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            scope: Scope::any(),
            negate: false,
            if_not_applicable: true,
            source: source.into(),
        }
    }

    /// Restricts the filter to `scope`.
    #[must_use]
    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    /// Sets the negation flag.
    #[must_use]
    pub const fn with_negate(mut self, negate: bool) -> Self {
        self.negate = negate;
        self
    }

    /// Sets the verdict used when the filter is not applicable.
    #[must_use]
    pub const fn with_if_not_applicable(mut self, verdict: bool) -> Self {
        self.if_not_applicable = verdict;
        self
    }
}

/// Capability set shared by every node-filter family.
pub trait Filter: std::fmt::Debug + Send {
    /// Returns the common configuration.
    fn options(&self) -> &FilterOptions;

    /// Raw match against the node, without negation or applicability.
    fn is_match(&self, node: &Node) -> bool;

    /// Whether the filter applies to the node's scope at all.
    fn is_applicable(&self, node: &Node) -> bool {
        self.options().scope.intersects(node.scope())
    }

    /// Scope bits this filter applies to.
    fn scope(&self) -> Scope {
        self.options().scope
    }

    /// Human-readable origin of the filter.
    fn source(&self) -> &str {
        &self.options().source
    }

    /// Re-checks the filter's configuration.
    ///
    /// Construction already validates patterns; this exists so registration
    /// sites can surface configuration problems uniformly.
    fn validate(&self) -> Result<(), FilterError> {
        Ok(())
    }

    /// Evaluated verdict: applicability default, then match, then negation.
    fn evaluate(&self, node: &Node) -> bool {
        if !self.is_applicable(node) {
            return self.options().if_not_applicable;
        }
        let matched = self.is_match(node);
        if self.options().negate { !matched } else { matched }
    }
}

#[cfg(test)]
mod tests;
