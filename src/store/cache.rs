//! Process-wide index service: load the snapshot or scan the corpus, once.

use super::{IndexStore, SnapshotError};
use crate::config::IndexConfig;
use crate::diag::Diagnostics;
use crate::driver;
use std::fs;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info};

/// Owns the materialized index.
///
/// The first [`ManIndex::load_or_build`] call loads the snapshot or runs
/// a full scan while holding the guard; racing callers block on it and
/// then share the same [`IndexStore`].
pub struct ManIndex {
    config: IndexConfig,
    diagnostics: Arc<dyn Diagnostics>,
    store: Mutex<Option<Arc<IndexStore>>>,
    scans: AtomicUsize,
}

impl ManIndex {
    pub fn new(config: IndexConfig, diagnostics: Arc<dyn Diagnostics>) -> Self {
        ManIndex {
            config,
            diagnostics,
            store: Mutex::new(None),
            scans: AtomicUsize::new(0),
        }
    }

    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    /// Number of full corpus scans this instance has run.
    pub fn scan_count(&self) -> usize {
        self.scans.load(Ordering::SeqCst)
    }

    pub fn is_loaded(&self) -> bool {
        self.lock().is_some()
    }

    pub fn load_or_build(&self) -> Arc<IndexStore> {
        let mut slot = self.lock();
        if let Some(store) = slot.as_ref() {
            return Arc::clone(store);
        }

        let store = match IndexStore::load(&self.config.snapshot) {
            Ok(store) => {
                info!(
                    "loaded {} records from {}",
                    store.len(),
                    self.config.snapshot.display()
                );
                store
            }
            Err(e) => {
                self.report_load_failure(&e);
                self.scan()
            }
        };

        let store = Arc::new(store);
        *slot = Some(Arc::clone(&store));
        store
    }

    /// Forget the in-memory index. The snapshot file is left alone.
    pub fn reset(&self) {
        *self.lock() = None;
    }

    /// Drop the in-memory index and the snapshot, then scan again.
    pub fn rebuild(&self) -> Arc<IndexStore> {
        let mut slot = self.lock();
        *slot = None;

        match fs::remove_file(&self.config.snapshot) {
            Ok(()) => debug!("removed {}", self.config.snapshot.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => self.diagnostics.warning(&format!(
                "cannot remove snapshot {}: {}",
                self.config.snapshot.display(),
                e
            )),
        }

        let store = Arc::new(self.scan());
        *slot = Some(Arc::clone(&store));
        store
    }

    /// Duplicate section ids in the current index, each also reported as a
    /// warning.
    pub fn check_duplicate_section_ids(&self) -> Vec<String> {
        let duplicates = self.load_or_build().check_duplicate_section_ids();
        for id in &duplicates {
            self.diagnostics
                .warning(&format!("duplicate section id: {}", id));
        }
        duplicates
    }

    // Full scan plus best-effort persist. Caller holds the guard.
    fn scan(&self) -> IndexStore {
        self.scans.fetch_add(1, Ordering::SeqCst);
        let store = driver::build_index(&self.config, self.diagnostics.as_ref());

        match store.persist(&self.config.snapshot) {
            Ok(()) => info!("wrote {}", self.config.snapshot.display()),
            Err(e) => self.diagnostics.warning(&format!("{}", e)),
        }
        store
    }

    fn report_load_failure(&self, error: &SnapshotError) {
        if error.is_not_found() {
            debug!("no snapshot at {}", self.config.snapshot.display());
        } else {
            self.diagnostics
                .warning(&format!("ignoring snapshot: {}", error));
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<Arc<IndexStore>>> {
        self.store.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
