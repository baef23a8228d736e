use std::sync::{Mutex, PoisonError};

use ab_bayes_types::diagnostics::CorrectnessWarning;
use ab_bayes_types::DiagnosticsSink;
use tracing::warn;

#[cfg(test)]
#[path = "diagnostics_test.rs"]
mod diagnostics_test;

/// Forwards every correctness warning to `tracing` at `WARN` level.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingDiagnostics;

impl DiagnosticsSink for TracingDiagnostics {
    fn report(&self, warning: CorrectnessWarning) {
        warn!(kind = warning.kind(), "{warning}");
    }
}

/// Logs like [`TracingDiagnostics`] and also keeps the warnings, so they can be attached to a
/// persisted report.
#[derive(Debug, Default)]
pub struct CollectingDiagnostics {
    warnings: Mutex<Vec<CorrectnessWarning>>,
}

impl CollectingDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warnings(&self) -> Vec<CorrectnessWarning> {
        self.warnings.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn take_warnings(&self) -> Vec<CorrectnessWarning> {
        std::mem::take(&mut *self.warnings.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl DiagnosticsSink for CollectingDiagnostics {
    fn report(&self, warning: CorrectnessWarning) {
        TracingDiagnostics.report(warning.clone());
        self.warnings.lock().unwrap_or_else(PoisonError::into_inner).push(warning);
    }
}
