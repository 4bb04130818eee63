use node::Node;
use regex::Regex;

use crate::{Filter, FilterError, FilterOptions};

/// Regular-expression match against an entry's base name.
#[derive(Debug)]
pub struct RegexFilter {
    options: FilterOptions,
    pattern: Regex,
}

impl RegexFilter {
    /// Compiles `pattern` into a base-name regex matcher.
    pub fn new(pattern: &str, options: FilterOptions) -> Result<Self, FilterError> {
        let compiled = Regex::new(pattern).map_err(|source| FilterError::Regex {
            pattern: pattern.to_owned(),
            source,
        })?;
        Ok(Self {
            options,
            pattern: compiled,
        })
    }
}

impl Filter for RegexFilter {
    fn options(&self) -> &FilterOptions {
        &self.options
    }

    fn is_match(&self, node: &Node) -> bool {
        self.pattern.is_match(node.name())
    }
}
