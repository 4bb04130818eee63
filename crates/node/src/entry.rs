use std::any::Any;
use std::fs;
use std::path::{Path, PathBuf};

use crate::Scope;

/// Derived attributes attached to every [`Node`].
///
/// The `name`, `parent`, and `sub_path` strings replace the parent
/// back-reference: they are computed once at construction and are all the
/// decision chain ever reads from a node's ancestry.
#[derive(Debug, Default)]
pub struct Extension {
    /// Depth relative to the traversal root (root is `0`).
    pub depth: usize,
    /// Base name of the entry.
    pub name: String,
    /// Parent directory path; `"."` when the parent is the root.
    pub parent: String,
    /// Path relative to the traversal root.
    pub sub_path: String,
    /// Positional and kind classification.
    pub scope: Scope,
    /// Free-form caller payload, threaded through untouched.
    pub payload: Option<Box<dyn Any + Send>>,
}

/// One already-collected sibling file entry of a folder node.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ChildEntry {
    name: String,
    path: PathBuf,
}

impl ChildEntry {
    /// Creates a child entry for `path`, deriving the base name.
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self { name, path }
    }

    /// Returns the entry's base name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the entry's full path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// One filesystem entry visited during a traversal.
///
/// Created once per walker step and consumed synchronously; the concurrent
/// execution strategy takes ownership when the callback is offloaded to a
/// worker.
#[derive(Debug)]
pub struct Node {
    path: PathBuf,
    metadata: fs::Metadata,
    extension: Extension,
    children: Vec<ChildEntry>,
}

impl Node {
    /// Builds a node for `path` visited at `depth` below `root`.
    ///
    /// Derives the name/parent/sub-path strings and assigns the kind bit from
    /// the captured metadata. Positional scope bits beyond `TREE`/`TOP` are
    /// the walker's business and are added via [`Node::extend_scope`].
    #[must_use]
    pub fn new(path: &Path, root: &Path, metadata: fs::Metadata, depth: usize) -> Self {
        let name = if depth == 0 {
            path.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.to_string_lossy().into_owned())
        } else {
            path.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default()
        };
        // "." stands for the traversal root, both for the root itself and
        // for its direct children. Deeper nodes carry the full parent path.
        let parent = if depth <= 1 {
            ".".to_owned()
        } else {
            path.parent()
                .map(|p| p.to_string_lossy().into_owned())
                .unwrap_or_else(|| ".".to_owned())
        };
        let sub_path = path
            .strip_prefix(root)
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_default();

        let mut scope = if metadata.is_dir() {
            Scope::FOLDER
        } else {
            Scope::FILE
        };
        if depth == 0 {
            scope |= Scope::TREE;
        }
        if depth == 1 {
            scope |= Scope::TOP;
        }

        Self {
            path: path.to_path_buf(),
            metadata,
            extension: Extension {
                depth,
                name,
                parent,
                sub_path,
                scope,
                payload: None,
            },
            children: Vec::new(),
        }
    }

    /// Returns the absolute path of the entry.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the captured metadata.
    #[must_use]
    pub fn metadata(&self) -> &fs::Metadata {
        &self.metadata
    }

    /// Returns the derived base name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.extension.name
    }

    /// Returns the derived parent path (`"."` when the parent is the
    /// traversal root, or the node is the root itself).
    #[must_use]
    pub fn parent(&self) -> &str {
        &self.extension.parent
    }

    /// Returns the root-relative sub-path.
    #[must_use]
    pub fn sub_path(&self) -> &str {
        &self.extension.sub_path
    }

    /// Returns the traversal depth (root is `0`).
    #[must_use]
    pub const fn depth(&self) -> usize {
        self.extension.depth
    }

    /// Returns the node's scope bitmask.
    #[must_use]
    pub const fn scope(&self) -> Scope {
        self.extension.scope
    }

    /// Adds positional scope bits (e.g. `LEAF` once the walker has read the
    /// directory).
    pub fn extend_scope(&mut self, bits: Scope) {
        self.extension.scope |= bits;
    }

    /// Returns whether the entry is a directory.
    #[must_use]
    pub fn is_folder(&self) -> bool {
        self.extension.scope.contains(Scope::FOLDER)
    }

    /// Returns whether the entry is a regular file.
    #[must_use]
    pub fn is_file(&self) -> bool {
        self.extension.scope.contains(Scope::FILE)
    }

    /// Provides access to the extension record.
    #[must_use]
    pub fn extension(&self) -> &Extension {
        &self.extension
    }

    /// Provides mutable access to the extension record.
    pub fn extension_mut(&mut self) -> &mut Extension {
        &mut self.extension
    }

    /// Returns the filtered-children list collected for folder nodes.
    #[must_use]
    pub fn children(&self) -> &[ChildEntry] {
        &self.children
    }

    /// Replaces the filtered-children list.
    pub fn set_children(&mut self, children: Vec<ChildEntry>) {
        self.children = children;
    }

    /// Takes the children list out, leaving it empty.
    pub fn take_children(&mut self) -> Vec<ChildEntry> {
        std::mem::take(&mut self.children)
    }
}
