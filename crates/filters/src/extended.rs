use globset::GlobMatcher;
use node::Node;

use crate::glob::compile_name_glob;
use crate::{Filter, FilterError, FilterOptions};

/// Extended glob: a base glob plus a comma-separated extension allow-list.
///
/// The pattern form is `"<base-glob>|ext1,ext2"`. The base glob is evaluated
/// against the entry's base name (case-insensitively); the suffix check then
/// requires the entry's extension to appear in the allow-list. An entry with
/// no extension matches only when the allow-list is empty. `any_extension`
/// bypasses the suffix check entirely, and an optional `exclusion` sub-glob
/// vetoes an otherwise-matching base.
#[derive(Debug)]
pub struct ExtendedGlobFilter {
    options: FilterOptions,
    base: GlobMatcher,
    suffixes: Vec<String>,
    any_extension: bool,
    exclusion: Option<GlobMatcher>,
}

impl ExtendedGlobFilter {
    /// Parses and compiles an extended pattern of the form
    /// `"<base-glob>|ext1,ext2"`.
    pub fn new(pattern: &str, options: FilterOptions) -> Result<Self, FilterError> {
        let (base_text, suffix_text) = pattern.split_once('|').ok_or_else(|| {
            FilterError::Extended {
                pattern: pattern.to_owned(),
                reason: "missing '|' separator between base glob and extensions".to_owned(),
            }
        })?;
        if suffix_text.contains('|') {
            return Err(FilterError::Extended {
                pattern: pattern.to_owned(),
                reason: "more than one '|' separator".to_owned(),
            });
        }

        let base = compile_name_glob(base_text)?;
        let suffixes = suffix_text
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_ascii_lowercase)
            .collect();

        Ok(Self {
            options,
            base,
            suffixes,
            any_extension: false,
            exclusion: None,
        })
    }

    /// Bypasses the extension allow-list entirely.
    #[must_use]
    pub const fn with_any_extension(mut self, any: bool) -> Self {
        self.any_extension = any;
        self
    }

    /// Installs an exclusion sub-glob that vetoes a matching base.
    pub fn with_exclusion(mut self, pattern: &str) -> Result<Self, FilterError> {
        self.exclusion = Some(compile_name_glob(pattern)?);
        Ok(self)
    }

    fn suffix_allowed(&self, name: &str) -> bool {
        if self.any_extension {
            return true;
        }
        match name.rsplit_once('.') {
            Some((stem, extension)) if !stem.is_empty() => self
                .suffixes
                .iter()
                .any(|allowed| allowed.eq_ignore_ascii_case(extension)),
            // No extension: only an empty allow-list matches.
            _ => self.suffixes.is_empty(),
        }
    }
}

impl Filter for ExtendedGlobFilter {
    fn options(&self) -> &FilterOptions {
        &self.options
    }

    fn is_match(&self, node: &Node) -> bool {
        let name = node.name();
        // The base glob targets the name without its extension; patterns that
        // spell out a suffix of their own (e.g. "cover.*") are honoured by
        // also consulting the full name.
        let stem = name
            .rsplit_once('.')
            .map_or(name, |(stem, _)| if stem.is_empty() { name } else { stem });
        if !self.base.is_match(stem) && !self.base.is_match(name) {
            return false;
        }
        if let Some(exclusion) = &self.exclusion
            && exclusion.is_match(name)
        {
            return false;
        }
        self.suffix_allowed(name)
    }
}
