use globset::{GlobBuilder, GlobMatcher};
use node::Node;

use crate::{Filter, FilterError, FilterOptions};

/// Case-insensitive shell-glob match against an entry's base name.
#[derive(Debug)]
pub struct GlobFilter {
    options: FilterOptions,
    matcher: GlobMatcher,
}

impl GlobFilter {
    /// Compiles `pattern` into a case-insensitive base-name matcher.
    pub fn new(pattern: &str, options: FilterOptions) -> Result<Self, FilterError> {
        let matcher = compile_name_glob(pattern)?;
        Ok(Self { options, matcher })
    }
}

impl Filter for GlobFilter {
    fn options(&self) -> &FilterOptions {
        &self.options
    }

    fn is_match(&self, node: &Node) -> bool {
        self.matcher.is_match(node.name())
    }
}

/// Compiles a case-insensitive glob over base names.
///
/// Shared by the glob, extended-glob, and child filter families so all of
/// them reject invalid patterns identically.
pub(crate) fn compile_name_glob(pattern: &str) -> Result<GlobMatcher, FilterError> {
    GlobBuilder::new(pattern)
        .case_insensitive(true)
        .literal_separator(false)
        .build()
        .map(|glob| glob.compile_matcher())
        .map_err(|source| FilterError::Glob {
            pattern: pattern.to_owned(),
            source,
        })
}
