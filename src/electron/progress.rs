use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::info;

/// Receives coarse progress from long running engines
///
/// Engines call `start` once with the number of steps, `advance` as steps complete (possibly from several threads)
/// and `finish` at the end. Every method defaults to a no-op, and `()` is the sink used when progress is not wanted.
pub trait ProgressSink: Sync {
    /// The engine is about to run `total` steps
    fn start(&self, _total: usize) {}
    /// `steps` more steps have completed
    fn advance(&self, _steps: usize) {}
    /// The engine has completed
    fn finish(&self) {}
}

impl ProgressSink for () {}

/// Reports progress through `tracing`, roughly every tenth of the total
#[derive(Debug)]
pub struct TracingProgress {
    label: &'static str,
    total: AtomicUsize,
    completed: AtomicUsize,
}

impl TracingProgress {
    /// A sink reporting under `label`
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            total: AtomicUsize::new(0),
            completed: AtomicUsize::new(0),
        }
    }

    /// Steps completed so far
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::Relaxed)
    }
}

impl ProgressSink for TracingProgress {
    fn start(&self, total: usize) {
        self.total.store(total, Ordering::Relaxed);
        self.completed.store(0, Ordering::Relaxed);
        info!(label = self.label, total, "started");
    }

    fn advance(&self, steps: usize) {
        let total = self.total.load(Ordering::Relaxed);
        let before = self.completed.fetch_add(steps, Ordering::Relaxed);
        let stride = (total / 10).max(1);
        if (before + steps) / stride > before / stride {
            info!(
                label = self.label,
                completed = before + steps,
                total,
                "progress"
            );
        }
    }

    fn finish(&self) {
        info!(label = self.label, completed = self.completed(), "finished");
    }
}
