#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `walk` is the reference tree-walker collaborator for the traversal
//! kernel. It enumerates a directory tree in deterministic pre-order,
//! sorting entries lexicographically before yielding them, and hands the
//! kernel one fully classified [`Node`] per entry: depth, scope bits,
//! derived name/parent strings, and the folder's collected file children.
//!
//! # Design
//!
//! - [`WalkBuilder`] configures the traversal root, whether the root entry is
//!   emitted, and an optional read-dir hook.
//! - [`Walker`] implements [`Iterator`] and yields [`Node`] values
//!   depth-first. A directory is read when its node is prepared, so folder
//!   nodes carry their child list and leaf/intermediate classification at the
//!   moment they are yielded.
//! - The read-dir hook intercepts a directory's sorted entries *before* they
//!   reach the kernel. The sampler scheme wraps this hook to pre-filter
//!   entries so discarded ones are never visited at all.
//!
//! # Invariants
//!
//! - Entries are yielded exactly once, in lexicographic order within each
//!   directory, parents before children.
//! - Folder nodes are classified `LEAF` when their directory holds no
//!   sub-folders (after hook filtering) and `INTERMEDIATE` otherwise.
//! - Traversal never panics; filesystem failures surface as [`WalkError`].
//!
//! # Examples
//!
//! ```
//! use std::fs;
//! use walk::WalkBuilder;
//!
//! # fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let temp = tempfile::tempdir()?;
//! fs::create_dir(temp.path().join("albums"))?;
//! fs::write(temp.path().join("albums/cover.jpg"), b"img")?;
//!
//! let names: Vec<String> = WalkBuilder::new(temp.path())
//!     .include_root(false)
//!     .build()?
//!     .map(|entry| entry.map(|node| node.name().to_owned()))
//!     .collect::<Result<_, _>>()?;
//! assert_eq!(names, vec!["albums", "cover.jpg"]);
//! # Ok(())
//! # }
//! # demo().unwrap();
//! ```

mod error;

pub use error::{WalkError, WalkErrorKind};

use std::fs;
use std::path::{Path, PathBuf};

use node::{ChildEntry, Node, Scope};

/// One directory entry probed while reading a directory, before it reaches
/// chain dispatch.
#[derive(Clone, Debug)]
pub struct ProbedEntry {
    /// Name and path of the entry.
    pub child: ChildEntry,
    /// Whether the entry is a directory.
    pub is_dir: bool,
}

/// Hook invoked with a directory's sorted entries before traversal descends.
///
/// Returning a reduced list prunes both the folder's child list and the
/// subtree walk itself.
pub type ReadDirHook = Box<dyn FnMut(&Path, Vec<ProbedEntry>) -> Vec<ProbedEntry> + Send>;

/// Configures a traversal rooted at a specific path.
pub struct WalkBuilder {
    root: PathBuf,
    include_root: bool,
    hook: Option<ReadDirHook>,
}

impl WalkBuilder {
    /// Creates a builder that will traverse the provided root path.
    #[must_use]
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self {
            root: root.into(),
            include_root: true,
            hook: None,
        }
    }

    /// Controls whether the root entry itself is yielded.
    #[must_use]
    pub const fn include_root(mut self, include: bool) -> Self {
        self.include_root = include;
        self
    }

    /// Installs a read-dir interception hook.
    #[must_use]
    pub fn with_read_dir_hook(mut self, hook: ReadDirHook) -> Self {
        self.hook = Some(hook);
        self
    }

    /// Builds a [`Walker`] using the configured options.
    pub fn build(self) -> Result<Walker, WalkError> {
        let metadata = fs::symlink_metadata(&self.root)
            .map_err(|error| WalkError::root_metadata(self.root.clone(), error))?;
        Ok(Walker {
            root: self.root,
            include_root: self.include_root,
            hook: self.hook,
            root_metadata: Some(metadata),
            stack: Vec::new(),
            started: false,
            finished: false,
        })
    }
}

struct DirectoryState {
    entries: Vec<ProbedEntry>,
    index: usize,
    depth: usize,
}

/// Pre-order iterator over classified nodes.
pub struct Walker {
    root: PathBuf,
    include_root: bool,
    hook: Option<ReadDirHook>,
    root_metadata: Option<fs::Metadata>,
    stack: Vec<DirectoryState>,
    started: bool,
    finished: bool,
}

impl Walker {
    fn read_directory(&mut self, path: &Path) -> Result<Vec<ProbedEntry>, WalkError> {
        let mut entries = Vec::new();
        let read_dir =
            fs::read_dir(path).map_err(|error| WalkError::read_dir(path.to_path_buf(), error))?;
        for entry in read_dir {
            let entry =
                entry.map_err(|error| WalkError::read_dir_entry(path.to_path_buf(), error))?;
            let entry_path = entry.path();
            let metadata = fs::symlink_metadata(&entry_path)
                .map_err(|error| WalkError::metadata(entry_path.clone(), error))?;
            entries.push(ProbedEntry {
                child: ChildEntry::new(entry_path),
                is_dir: metadata.is_dir(),
            });
        }
        entries.sort_by(|a, b| a.child.name().cmp(b.child.name()));

        if let Some(hook) = self.hook.as_mut() {
            entries = hook(path, entries);
        }
        Ok(entries)
    }

    /// Builds a folder node: reads the directory, classifies leafness, and
    /// attaches the file children, then pushes the directory for descent.
    fn prepare_folder(
        &mut self,
        path: &Path,
        metadata: fs::Metadata,
        depth: usize,
    ) -> Result<Node, WalkError> {
        let entries = self.read_directory(path)?;
        let has_subdirs = entries.iter().any(|entry| entry.is_dir);
        let children: Vec<ChildEntry> = entries
            .iter()
            .filter(|entry| !entry.is_dir)
            .map(|entry| entry.child.clone())
            .collect();

        let mut node = Node::new(path, &self.root, metadata, depth);
        node.extend_scope(if has_subdirs {
            if depth > 0 { Scope::INTERMEDIATE } else { Scope::empty() }
        } else {
            Scope::LEAF
        });
        node.set_children(children);

        self.stack.push(DirectoryState {
            entries,
            index: 0,
            depth,
        });
        Ok(node)
    }

    fn next_entry(&mut self) -> Option<(ProbedEntry, usize)> {
        loop {
            let state = self.stack.last_mut()?;
            if let Some(entry) = state.entries.get(state.index) {
                state.index += 1;
                return Some((entry.clone(), state.depth + 1));
            }
            self.stack.pop();
        }
    }
}

impl Iterator for Walker {
    type Item = Result<Node, WalkError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        if !self.started {
            self.started = true;
            if let Some(metadata) = self.root_metadata.take() {
                if metadata.is_dir() {
                    let root = self.root.clone();
                    match self.prepare_folder(&root, metadata, 0) {
                        Ok(node) => {
                            if self.include_root {
                                return Some(Ok(node));
                            }
                        }
                        Err(error) => {
                            self.finished = true;
                            return Some(Err(error));
                        }
                    }
                } else if self.include_root {
                    // A single-file root yields exactly one node.
                    let node = Node::new(&self.root, &self.root, metadata, 0);
                    self.finished = true;
                    return Some(Ok(node));
                }
            }
        }

        let (entry, depth) = self.next_entry()?;
        let path = entry.child.path().to_path_buf();
        let metadata = match fs::symlink_metadata(&path) {
            Ok(metadata) => metadata,
            Err(error) => {
                self.finished = true;
                return Some(Err(WalkError::metadata(path, error)));
            }
        };

        if entry.is_dir {
            match self.prepare_folder(&path, metadata, depth) {
                Ok(node) => Some(Ok(node)),
                Err(error) => {
                    self.finished = true;
                    Some(Err(error))
                }
            }
        } else {
            Some(Ok(Node::new(&path, &self.root, metadata, depth)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect_sub_paths(walker: Walker) -> Vec<String> {
        walker
            .map(|entry| entry.expect("walker entry").sub_path().to_owned())
            .collect()
    }

    #[test]
    fn walk_errors_when_root_missing() {
        let builder = WalkBuilder::new("/nonexistent/path/for/walker");
        let error = builder.build().err().expect("missing root must fail");
        assert!(matches!(error.kind(), WalkErrorKind::RootMetadata { .. }));
    }

    #[test]
    fn walk_yields_deterministic_pre_order() {
        let temp = tempfile::tempdir().expect("tempdir");
        let root = temp.path();
        fs::create_dir(root.join("b")).expect("dir b");
        fs::create_dir(root.join("a")).expect("dir a");
        fs::write(root.join("a/inner.txt"), b"data").expect("write inner");
        fs::write(root.join("c.txt"), b"data").expect("write file");

        let walker = WalkBuilder::new(root)
            .include_root(false)
            .build()
            .expect("build walker");
        assert_eq!(
            collect_sub_paths(walker),
            vec!["a", "a/inner.txt", "b", "c.txt"]
        );
    }

    #[test]
    fn folder_nodes_carry_file_children_and_leafness() {
        let temp = tempfile::tempdir().expect("tempdir");
        let root = temp.path();
        fs::create_dir(root.join("album")).expect("dir");
        fs::write(root.join("album/01.flac"), b"x").expect("write");
        fs::write(root.join("album/02.flac"), b"x").expect("write");

        let mut walker = WalkBuilder::new(root)
            .include_root(false)
            .build()
            .expect("build walker");
        let album = walker.next().expect("entry").expect("node");
        assert!(album.scope().contains(Scope::FOLDER | Scope::LEAF));
        assert_eq!(album.children().len(), 2);
        assert_eq!(album.children()[0].name(), "01.flac");
    }

    #[test]
    fn root_node_is_tree_scoped() {
        let temp = tempfile::tempdir().expect("tempdir");
        fs::create_dir(temp.path().join("sub")).expect("dir");

        let mut walker = WalkBuilder::new(temp.path()).build().expect("build walker");
        let root = walker.next().expect("entry").expect("node");
        assert!(root.scope().contains(Scope::TREE | Scope::FOLDER));
        assert!(!root.scope().contains(Scope::INTERMEDIATE));
        assert_eq!(root.parent(), ".");
    }

    #[test]
    fn parent_folders_are_intermediate() {
        let temp = tempfile::tempdir().expect("tempdir");
        let root = temp.path();
        fs::create_dir_all(root.join("outer/inner")).expect("dirs");

        let mut walker = WalkBuilder::new(root)
            .include_root(false)
            .build()
            .expect("build walker");
        let outer = walker.next().expect("entry").expect("node");
        assert!(outer.scope().contains(Scope::INTERMEDIATE));
        let inner = walker.next().expect("entry").expect("node");
        assert!(inner.scope().contains(Scope::LEAF));
    }

    #[test]
    fn read_dir_hook_prunes_children_and_descent() {
        let temp = tempfile::tempdir().expect("tempdir");
        let root = temp.path();
        fs::create_dir(root.join("skipped")).expect("dir");
        fs::write(root.join("skipped/never.txt"), b"x").expect("write");
        fs::write(root.join("kept.txt"), b"x").expect("write");

        let walker = WalkBuilder::new(root)
            .include_root(false)
            .with_read_dir_hook(Box::new(|_dir, entries| {
                entries
                    .into_iter()
                    .filter(|entry| !entry.is_dir)
                    .collect()
            }))
            .build()
            .expect("build walker");
        assert_eq!(collect_sub_paths(walker), vec!["kept.txt"]);
    }
}
