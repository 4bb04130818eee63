// crates/kernel/src/resume/store.rs
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::json::{self, EquivalenceError, JsonOptions};
use super::ActiveState;
use crate::options::SessionOptions;

/// The persisted resume artifact: options projection plus active state.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ResumeDocument {
    /// Projected session options.
    #[serde(rename = "JO")]
    pub options: JsonOptions,
    /// Traversal position and progress.
    #[serde(rename = "Active")]
    pub active: ActiveState,
}

/// Resume persistence errors.
#[derive(Debug, Error)]
pub enum ResumeError {
    /// The document could not be read.
    #[error("failed to read resume document '{}'", path.display())]
    Read {
        /// Document path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The document could not be written.
    #[error("failed to write resume document '{}'", path.display())]
    Write {
        /// Document path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The document was present but not a valid resume JSON object.
    #[error("resume document '{}' is not valid", path.display())]
    Decode {
        /// Document path.
        path: PathBuf,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// The written projection failed the post-write equivalence check. The
    /// artifact is already on disk and should not be trusted.
    #[error("written resume document failed validation")]
    Validation(#[source] EquivalenceError),

    /// The projection could not be encoded at all.
    #[error("resume document could not be encoded")]
    Encode(#[source] serde_json::Error),
}

/// Persists a snapshot, then validates the written projection.
///
/// The document is encoded fully in memory and lands in a single write
/// call. After the write, the projection is checked field by field against
/// the live options; a mismatch is reported as [`ResumeError::Validation`]
/// even though the artifact already exists on disk.
pub fn save(
    path: &Path,
    options: &SessionOptions,
    active: &ActiveState,
) -> Result<(), ResumeError> {
    let document = ResumeDocument {
        options: json::project(options),
        active: active.clone(),
    };
    let encoded = serde_json::to_vec_pretty(&document).map_err(ResumeError::Encode)?;
    fs::write(path, encoded).map_err(|source| ResumeError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(path = %path.display(), "resume snapshot written");

    json::equivalent(options, &document.options).map_err(ResumeError::Validation)
}

/// Loads a resume document. The file must exist and hold valid JSON.
pub fn load(path: &Path) -> Result<ResumeDocument, ResumeError> {
    let raw = fs::read(path).map_err(|source| ResumeError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&raw).map_err(|source| ResumeError::Decode {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::Subscription;
    use filters::{FilterDef, FilterKind};
    use hibernate::HibernationState;

    fn sample() -> (SessionOptions, ActiveState) {
        let options = SessionOptions::builder()
            .subscription(Subscription::FoldersWithFiles)
            .child_filter(FilterDef::new(FilterKind::Glob, "*.txt"))
            .build();
        let active = ActiveState::fresh(
            Path::new("/srv/tree"),
            options.subscription,
            HibernationState::Awake,
        );
        (options, active)
    }

    #[test]
    fn save_then_load_round_trips_the_document() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("session.resume.json");
        let (options, active) = sample();

        save(&path, &options, &active).expect("save");
        let document = load(&path).expect("load");

        assert_eq!(document.active, active);
        assert_eq!(json::restore(&document.options), options);
    }

    #[test]
    fn document_uses_the_expected_top_level_members() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("session.resume.json");
        let (options, active) = sample();
        save(&path, &options, &active).expect("save");

        let raw = fs::read_to_string(&path).expect("read back");
        let value: serde_json::Value = serde_json::from_str(&raw).expect("json");
        assert!(value.get("JO").is_some());
        assert!(value.get("Active").is_some());
        assert_eq!(
            value["JO"]["subscription"],
            serde_json::json!("folders-with-files")
        );
    }

    #[test]
    fn load_rejects_a_missing_document() {
        let temp = tempfile::tempdir().expect("tempdir");
        let error = load(&temp.path().join("absent.json")).unwrap_err();
        assert!(matches!(error, ResumeError::Read { .. }));
    }

    #[test]
    fn load_rejects_invalid_json() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("broken.json");
        fs::write(&path, b"{ not json").expect("write");
        let error = load(&path).unwrap_err();
        assert!(matches!(error, ResumeError::Decode { .. }));
    }
}
