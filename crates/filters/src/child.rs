use globset::GlobMatcher;
use node::ChildEntry;
use regex::Regex;

use crate::glob::compile_name_glob;
use crate::{FilterError, FilterKind};

#[derive(Debug)]
enum NameMatcher {
    Glob(GlobMatcher),
    Regex(Regex),
}

impl NameMatcher {
    fn is_match(&self, name: &str) -> bool {
        match self {
            Self::Glob(matcher) => matcher.is_match(name),
            Self::Regex(pattern) => pattern.is_match(name),
        }
    }
}

/// Filter over the collected file entries of a folder node.
///
/// Unlike the node families, a child filter never vetoes the folder it runs
/// for; it only rewrites the folder's filtered-children list. It backs the
/// folders-with-files subscription (the "nanny" scheme).
#[derive(Debug)]
pub struct ChildFilter {
    pattern: String,
    matcher: NameMatcher,
    negate: bool,
}

impl ChildFilter {
    /// Compiles a glob child filter.
    pub fn glob(pattern: &str, negate: bool) -> Result<Self, FilterError> {
        Ok(Self {
            pattern: pattern.to_owned(),
            matcher: NameMatcher::Glob(compile_name_glob(pattern)?),
            negate,
        })
    }

    /// Compiles a regex child filter.
    pub fn regex(pattern: &str, negate: bool) -> Result<Self, FilterError> {
        let compiled = Regex::new(pattern).map_err(|source| FilterError::Regex {
            pattern: pattern.to_owned(),
            source,
        })?;
        Ok(Self {
            pattern: pattern.to_owned(),
            matcher: NameMatcher::Regex(compiled),
            negate,
        })
    }

    /// Compiles a child filter of the given kind.
    pub fn new(kind: FilterKind, pattern: &str, negate: bool) -> Result<Self, FilterError> {
        match kind {
            FilterKind::Regex => Self::regex(pattern, negate),
            _ => Self::glob(pattern, negate),
        }
    }

    /// Returns the pattern text.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Splits `children` into retained entries and the discarded count.
    #[must_use]
    pub fn apply(&self, children: Vec<ChildEntry>) -> (Vec<ChildEntry>, usize) {
        let total = children.len();
        let kept: Vec<ChildEntry> = children
            .into_iter()
            .filter(|child| self.matcher.is_match(child.name()) != self.negate)
            .collect();
        let discarded = total - kept.len();
        (kept, discarded)
    }
}
