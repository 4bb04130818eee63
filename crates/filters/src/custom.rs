use std::fmt;

use node::Node;

use crate::{Filter, FilterOptions};

/// Predicate supplied by the caller.
pub type Predicate = Box<dyn Fn(&Node) -> bool + Send>;

/// Caller-supplied predicate filter.
pub struct CustomFilter {
    options: FilterOptions,
    predicate: Predicate,
}

impl CustomFilter {
    /// Wraps a caller predicate. The predicate cannot fail to "compile", so
    /// construction is infallible.
    #[must_use]
    pub fn new(predicate: Predicate, options: FilterOptions) -> Self {
        Self { options, predicate }
    }
}

impl fmt::Debug for CustomFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomFilter")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl Filter for CustomFilter {
    fn options(&self) -> &FilterOptions {
        &self.options
    }

    fn is_match(&self, node: &Node) -> bool {
        (self.predicate)(node)
    }
}
