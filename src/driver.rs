//! Directory driver: find the pages under each root and index them.

use crate::config::{local_path, IndexConfig, ManualRoot};
use crate::diag::Diagnostics;
use crate::indexer::index_html;
use crate::model::{Class, IndexRecord};
use crate::store::IndexStore;
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Full indexing pass over every configured root.
///
/// Files are indexed in parallel; each file's records are appended as one
/// block, in sorted file order, so the result does not depend on scheduling.
pub fn build_index(config: &IndexConfig, diagnostics: &dyn Diagnostics) -> IndexStore {
    let mut store = IndexStore::new();

    for root in &config.roots {
        let files = html_files(&root.dir, diagnostics);
        info!(
            "indexing {} {} pages under {}",
            files.len(),
            root.class,
            root.dir.display()
        );

        let per_file: Vec<Vec<IndexRecord>> = files
            .par_iter()
            .map(|file| index_file(file, root.class, &config.roots, diagnostics))
            .collect();

        for records in per_file {
            store.extend(records);
        }
    }

    info!("index holds {} records", store.len());
    store
}

/// Index a single page. Unreadable files produce no records.
pub fn index_file(
    path: &Path,
    class: Class,
    roots: &[ManualRoot],
    diagnostics: &dyn Diagnostics,
) -> Vec<IndexRecord> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            diagnostics.warning(&format!("skipping {}: {}", path.display(), e));
            return Vec::new();
        }
    };
    let text = String::from_utf8_lossy(&bytes);
    let local = local_path(path, class, roots);

    let records = index_html(&text, path, class, &local, diagnostics);
    debug!("{}: {} records", path.display(), records.len());
    records
}

/// All `.html` files below `dir`, sorted.
pub fn html_files(dir: &Path, diagnostics: &dyn Diagnostics) -> Vec<PathBuf> {
    if !dir.is_dir() {
        diagnostics.warning(&format!("no such directory: {}", dir.display()));
        return Vec::new();
    }

    let pattern = format!(
        "{}/**/*.html",
        glob::Pattern::escape(&dir.to_string_lossy())
    );
    let mut files: Vec<PathBuf> = match glob::glob(&pattern) {
        Ok(paths) => paths
            .filter_map(|r| r.ok())
            .filter(|p| p.is_file())
            .collect(),
        Err(e) => {
            diagnostics.warning(&format!("invalid glob pattern {}: {}", pattern, e));
            Vec::new()
        }
    };
    // Sort for deterministic output
    files.sort();
    files.dedup();
    files
}
