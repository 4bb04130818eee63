use node::Scope;
use serde::{Deserialize, Serialize};

use crate::{
    ChildFilter, ExtendedGlobFilter, Filter, FilterError, FilterOptions, GlobFilter, RegexFilter,
};

/// Filter family discriminator carried in persisted definitions.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FilterKind {
    /// Case-insensitive shell glob over the base name.
    Glob,
    /// Base glob with extension allow-list.
    ExtendedGlob,
    /// Regular expression over the base name.
    Regex,
    /// Caller-supplied predicate (not constructible from a definition alone).
    Custom,
    /// Separate file/folder definitions under `Poly`.
    Poly,
}

/// Separate file and folder definitions carried by a poly filter.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct PolyDef {
    /// Definition applied to file nodes.
    #[serde(rename = "File")]
    pub file: FilterDef,
    /// Definition applied to folder nodes.
    #[serde(rename = "Folder")]
    pub folder: FilterDef,
}

/// Wire model of one filter, as persisted inside resume documents.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct FilterDef {
    /// Filter family.
    #[serde(rename = "filter-type")]
    pub kind: FilterKind,
    /// Pattern text (ignored for poly definitions).
    #[serde(default)]
    pub pattern: String,
    /// Scope bits the filter applies to.
    #[serde(rename = "filter-scope", default = "Scope::any")]
    pub scope: Scope,
    /// Inverts the match after the applicability short-circuit.
    #[serde(default)]
    pub negate: bool,
    /// Verdict for non-applicable nodes.
    #[serde(rename = "if-not-applicable", default = "default_pass")]
    pub if_not_applicable: bool,
    /// Separate file/folder members for poly filters.
    #[serde(rename = "Poly", default, skip_serializing_if = "Option::is_none")]
    pub poly: Option<Box<PolyDef>>,
}

const fn default_pass() -> bool {
    true
}

impl FilterDef {
    /// Creates a definition for `kind` with the given pattern.
    #[must_use]
    pub fn new(kind: FilterKind, pattern: impl Into<String>) -> Self {
        Self {
            kind,
            pattern: pattern.into(),
            scope: Scope::any(),
            negate: false,
            if_not_applicable: true,
            poly: None,
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

    /// Sets the non-applicable verdict.
    #[must_use]
    pub const fn with_if_not_applicable(mut self, verdict: bool) -> Self {
        self.if_not_applicable = verdict;
        self
    }

    /// Attaches poly members and marks the definition as poly.
    #[must_use]
    pub fn with_poly(mut self, file: Self, folder: Self) -> Self {
        self.kind = FilterKind::Poly;
        self.poly = Some(Box::new(PolyDef { file, folder }));
        self
    }

    fn options(&self) -> FilterOptions {
        FilterOptions::new(self.pattern.clone())
            .with_scope(self.scope)
            .with_negate(self.negate)
            .with_if_not_applicable(self.if_not_applicable)
    }
}

/// Poly filter: distinct member filters for file and folder nodes.
#[derive(Debug)]
pub struct PolyFilter {
    options: FilterOptions,
    file: Box<dyn Filter>,
    folder: Box<dyn Filter>,
}

impl Filter for PolyFilter {
    fn options(&self) -> &FilterOptions {
        &self.options
    }

    fn is_match(&self, node: &node::Node) -> bool {
        if node.is_folder() {
            self.folder.evaluate(node)
        } else {
            self.file.evaluate(node)
        }
    }
}

/// Compiles a definition into a boxed node filter.
///
/// Pattern problems surface here, at registration time. `custom` definitions
/// cannot be compiled without the caller's predicate and are rejected; build
/// a [`crate::CustomFilter`] directly instead.
pub fn compile(def: &FilterDef) -> Result<Box<dyn Filter>, FilterError> {
    tracing::debug!(kind = ?def.kind, pattern = %def.pattern, "compiling filter definition");
    match def.kind {
        FilterKind::Glob => Ok(Box::new(GlobFilter::new(&def.pattern, def.options())?)),
        FilterKind::ExtendedGlob => Ok(Box::new(ExtendedGlobFilter::new(
            &def.pattern,
            def.options(),
        )?)),
        FilterKind::Regex => Ok(Box::new(RegexFilter::new(&def.pattern, def.options())?)),
        FilterKind::Custom => Err(FilterError::CustomUnresolved {
            source_text: def.pattern.clone(),
        }),
        FilterKind::Poly => {
            let poly = def.poly.as_deref().ok_or_else(|| FilterError::PolyIncomplete {
                source_text: def.pattern.clone(),
            })?;
            let file = compile(&poly.file)?;
            let folder = compile(&poly.folder)?;
            // The umbrella scope is the union of the members', so the poly
            // filter is applicable whenever either member is.
            let options = FilterOptions::new(def.pattern.clone())
                .with_scope(poly.file.scope | poly.folder.scope)
                .with_if_not_applicable(def.if_not_applicable);
            Ok(Box::new(PolyFilter {
                options,
                file,
                folder,
            }))
        }
    }
}

/// Compiles a definition into a child-list filter.
pub fn compile_child(def: &FilterDef) -> Result<ChildFilter, FilterError> {
    ChildFilter::new(def.kind, &def.pattern, def.negate)
}
