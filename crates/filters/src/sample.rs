use std::collections::HashMap;
use std::sync::Mutex;

use node::{Node, Scope};

use crate::{Filter, FilterOptions};

/// Window definition for sampled traversal.
///
/// `None` leaves the corresponding kind unsampled. `in_reverse` selects the
/// window from the end of a directory's sorted entries instead of the front;
/// it only affects whole-directory sampling ([`windowed`]), since a streaming
/// per-node filter cannot know a directory's tail ahead of time.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct SampleSpec {
    /// Maximum file entries retained per directory.
    pub files: Option<usize>,
    /// Maximum folder entries retained per directory.
    pub folders: Option<usize>,
    /// Take the window from the end of the sorted entries.
    pub in_reverse: bool,
}

impl SampleSpec {
    /// Returns whether the spec samples anything at all.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.files.is_some() || self.folders.is_some()
    }
}

/// Applies `spec` to a directory's sorted entries.
///
/// Used by read-dir interception: the sampler prunes entries before they ever
/// reach chain dispatch. `is_folder` classifies each entry so file and folder
/// windows are tracked independently.
pub fn windowed<T>(spec: &SampleSpec, entries: Vec<T>, is_folder: impl Fn(&T) -> bool) -> Vec<T> {
    let mut kept_files = 0usize;
    let mut kept_folders = 0usize;

    let keep = |entry: &T, kept_files: &mut usize, kept_folders: &mut usize| {
        if is_folder(entry) {
            match spec.folders {
                Some(limit) if *kept_folders >= limit => false,
                _ => {
                    *kept_folders += 1;
                    true
                }
            }
        } else {
            match spec.files {
                Some(limit) if *kept_files >= limit => false,
                _ => {
                    *kept_files += 1;
                    true
                }
            }
        }
    };

    if spec.in_reverse {
        let mut kept: Vec<T> = entries
            .into_iter()
            .rev()
            .filter(|entry| keep(entry, &mut kept_files, &mut kept_folders))
            .collect();
        kept.reverse();
        kept
    } else {
        entries
            .into_iter()
            .filter(|entry| keep(entry, &mut kept_files, &mut kept_folders))
            .collect()
    }
}

/// Streaming sample window evaluated per node.
///
/// Counts visited entries per parent directory and matches while the count is
/// inside the window. Used when the walker offers no read-dir hook to
/// intercept; the verdict is independent of any glob/regex matching.
#[derive(Debug)]
pub struct SampleFilter {
    options: FilterOptions,
    spec: SampleSpec,
    counts: Mutex<HashMap<String, (usize, usize)>>,
}

impl SampleFilter {
    /// Creates a streaming sample filter for `spec`.
    #[must_use]
    pub fn new(spec: SampleSpec, options: FilterOptions) -> Self {
        Self {
            options,
            spec,
            counts: Mutex::new(HashMap::new()),
        }
    }
}

impl Filter for SampleFilter {
    fn options(&self) -> &FilterOptions {
        &self.options
    }

    fn is_match(&self, node: &Node) -> bool {
        let limit = if node.scope().contains(Scope::FOLDER) {
            self.spec.folders
        } else {
            self.spec.files
        };
        let Some(limit) = limit else {
            return true;
        };

        let mut counts = match self.counts.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let slot = counts.entry(node.parent().to_owned()).or_insert((0, 0));
        let seen = if node.scope().contains(Scope::FOLDER) {
            slot.1 += 1;
            slot.1
        } else {
            slot.0 += 1;
            slot.0
        };
        seen <= limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn windowed_takes_leading_entries() {
        let spec = SampleSpec {
            files: Some(2),
            folders: None,
            in_reverse: false,
        };
        let entries = vec!["a", "b", "c", "d"];
        let kept = windowed(&spec, entries, |_| false);
        assert_eq!(kept, vec!["a", "b"]);
    }

    #[test]
    fn windowed_in_reverse_takes_trailing_entries() {
        let spec = SampleSpec {
            files: Some(2),
            folders: None,
            in_reverse: true,
        };
        let entries = vec!["a", "b", "c", "d"];
        let kept = windowed(&spec, entries, |_| false);
        assert_eq!(kept, vec!["c", "d"]);
    }

    #[test]
    fn windowed_tracks_kinds_independently() {
        let spec = SampleSpec {
            files: Some(1),
            folders: Some(2),
            in_reverse: false,
        };
        // Uppercase entries stand in for folders.
        let entries = vec!["A", "b", "C", "d", "E"];
        let kept = windowed(&spec, entries, |e| e.chars().all(char::is_uppercase));
        assert_eq!(kept, vec!["A", "b", "C"]);
    }
}
