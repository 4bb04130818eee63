use thiserror::Error;

/// Error produced when a filter definition cannot be compiled.
///
/// Pattern problems are registration-time failures; dispatch never sees a
/// filter that failed to compile.
#[derive(Debug, Error)]
pub enum FilterError {
    /// A glob pattern failed to compile.
    #[error("failed to compile filter pattern '{pattern}': {source}")]
    Glob {
        /// The offending pattern.
        pattern: String,
        /// Underlying glob compiler error.
        source: globset::Error,
    },

    /// A regular-expression pattern failed to compile.
    #[error("failed to compile regex pattern '{pattern}': {source}")]
    Regex {
        /// The offending pattern.
        pattern: String,
        /// Underlying regex compiler error.
        source: regex::Error,
    },

    /// An extended-glob pattern was structurally malformed.
    #[error("extended pattern '{pattern}' is malformed: {reason}")]
    Extended {
        /// The offending pattern.
        pattern: String,
        /// Why the pattern was rejected.
        reason: String,
    },

    /// A `custom` definition was compiled without a caller predicate.
    #[error("custom filter '{source_text}' requires a caller-supplied predicate")]
    CustomUnresolved {
        /// The definition's source text.
        source_text: String,
    },

    /// A `Poly` definition was missing one of its File/Folder members.
    #[error("poly filter '{source_text}' must define both file and folder members")]
    PolyIncomplete {
        /// The definition's source text.
        source_text: String,
    },
}
