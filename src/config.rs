//! Index configuration: which directories hold which class of pages, and
//! where the snapshot lives.

use crate::model::Class;
use std::path::{Path, PathBuf};

/// Snapshot file used when none is configured.
pub const DEFAULT_SNAPSHOT: &str = "manindex.db";

/// A directory tree of HTML pages belonging to one class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManualRoot {
    pub class: Class,
    pub dir: PathBuf,
}

impl ManualRoot {
    /// Relative directories are resolved against the working directory, so
    /// indexed file paths stay valid from anywhere.
    pub fn new(class: Class, dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        ManualRoot {
            class,
            dir: std::path::absolute(&dir).unwrap_or(dir),
        }
    }
}

#[derive(Debug, Clone)]
pub struct IndexConfig {
    /// Roots in indexing order
    pub roots: Vec<ManualRoot>,
    pub snapshot: PathBuf,
}

impl Default for IndexConfig {
    fn default() -> Self {
        IndexConfig {
            roots: Vec::new(),
            snapshot: PathBuf::from(DEFAULT_SNAPSHOT),
        }
    }
}

impl IndexConfig {
    pub fn with_root(mut self, class: Class, dir: impl Into<PathBuf>) -> Self {
        self.roots.push(ManualRoot::new(class, dir));
        self
    }

    pub fn with_snapshot(mut self, snapshot: impl Into<PathBuf>) -> Self {
        self.snapshot = snapshot.into();
        self
    }
}

/// Installation-independent name of a page: the path below its class root,
/// re-rooted under the class namespace.
///
/// `/usr/lib/swipl/doc/Manual/lists.html` with a manual root of
/// `/usr/lib/swipl/doc/Manual` becomes `Manual/lists.html`. Pages outside
/// every root of their class, and classes without a namespace, keep the
/// path as given.
pub fn local_path(file: &Path, class: Class, roots: &[ManualRoot]) -> String {
    let Some(namespace) = class.namespace() else {
        return file.to_string_lossy().into_owned();
    };

    roots
        .iter()
        .filter(|root| root.class == class)
        .find_map(|root| file.strip_prefix(&root.dir).ok())
        .map(|relative| {
            let mut local = namespace.to_string();
            for component in relative.components() {
                local.push('/');
                local.push_str(&component.as_os_str().to_string_lossy());
            }
            local
        })
        .unwrap_or_else(|| file.to_string_lossy().into_owned())
}
