//! Warning sink for recoverable indexing issues.

use std::sync::Mutex;

/// Receives warnings about recoverable problems: synthesized section ids,
/// duplicate ids, unreadable snapshots. Never used to abort.
pub trait Diagnostics: Send + Sync {
    fn warning(&self, message: &str);
}

/// Forwards warnings to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn warning(&self, message: &str) {
        tracing::warn!("{}", message);
    }
}

/// Keeps warnings in memory, for callers that report them later.
#[derive(Debug, Default)]
pub struct CollectedDiagnostics {
    warnings: Mutex<Vec<String>>,
}

impl CollectedDiagnostics {
    pub fn warnings(&self) -> Vec<String> {
        match self.warnings.lock() {
            Ok(w) => w.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl Diagnostics for CollectedDiagnostics {
    fn warning(&self, message: &str) {
        match self.warnings.lock() {
            Ok(mut w) => w.push(message.to_string()),
            Err(poisoned) => poisoned.into_inner().push(message.to_string()),
        }
    }
}
