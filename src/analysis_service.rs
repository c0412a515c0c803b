//! Exclusive access to the analysis backend.
//!
//! At most one analysis runs at a time. A second request while one is in
//! flight is refused immediately rather than queued. The gate also records
//! what is running, for the health endpoint and logs.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use serde::Serialize;

/// Where the analyzed medication list came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisSource {
    /// List supplied in the request body.
    Submitted,
    /// List read from the medication store.
    Stored,
}

impl std::fmt::Display for AnalysisSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Submitted => write!(f, "Submitted list"),
            Self::Stored => write!(f, "Stored list"),
        }
    }
}

/// Snapshot of the analysis currently in flight.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveAnalysis {
    pub source: AnalysisSource,
    pub model: String,
    pub medication_count: usize,
    /// ISO 8601.
    pub started_at: String,
}

#[derive(Default)]
pub struct AnalysisGate {
    busy: AtomicBool,
    current: Mutex<Option<ActiveAnalysis>>,
}

impl AnalysisGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the gate without blocking. `None` while another analysis runs.
    ///
    /// The returned guard is owned so it can move onto a blocking worker.
    pub fn try_acquire(
        self: &Arc<Self>,
        source: AnalysisSource,
        model: &str,
        medication_count: usize,
    ) -> Option<AnalysisGuard> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()?;

        if let Ok(mut current) = self.current.lock() {
            *current = Some(ActiveAnalysis {
                source,
                model: model.to_string(),
                medication_count,
                started_at: chrono::Utc::now().to_rfc3339(),
            });
        }

        Some(AnalysisGuard {
            gate: Arc::clone(self),
        })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// `None` when idle.
    pub fn current_analysis(&self) -> Option<ActiveAnalysis> {
        self.current.lock().ok()?.clone()
    }

    fn release(&self) {
        if let Ok(mut current) = self.current.lock() {
            *current = None;
        }
        self.busy.store(false, Ordering::Release);
    }
}

/// RAII token for the gate. Dropping it releases the gate.
pub struct AnalysisGuard {
    gate: Arc<AnalysisGate>,
}

impl Drop for AnalysisGuard {
    fn drop(&mut self) {
        self.gate.release();
    }
}
