use std::sync::atomic::{AtomicU64, Ordering};

use almanac_core::Progress;
use tokio::sync::watch;

/// Identifies one triggered run. Later runs carry larger generations and
/// supersede earlier ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RunGeneration(u64);

impl RunGeneration {
    pub(crate) const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw counter value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl core::fmt::Display for RunGeneration {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Run progress shared by every task of the current run.
///
/// Updates carry the generation of the run that produced them; updates from
/// any generation other than the last one passed to [`reset`](Self::reset)
/// are dropped. Both operations happen under the watch channel's lock, so a
/// reset and a concurrent advance never interleave.
#[derive(Debug)]
pub struct ProgressTracker {
    tx: watch::Sender<Progress>,
    generation: AtomicU64,
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressTracker {
    /// Tracker at `(0, 0)` owned by no run.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Progress::default());
        Self {
            tx,
            generation: AtomicU64::new(0),
        }
    }

    /// Hand the tracker to `generation` and restart at `(0, total)`.
    pub fn reset(&self, generation: RunGeneration, total: u32) {
        self.tx.send_modify(|p| {
            self.generation.store(generation.get(), Ordering::SeqCst);
            *p = Progress {
                completed: 0,
                total,
            };
        });
    }

    /// Add `units` completed units, clamped at the total.
    ///
    /// Returns false when the update was ignored, either because `generation`
    /// no longer owns the tracker or because nothing changed.
    pub fn advance(&self, generation: RunGeneration, units: u32) -> bool {
        self.tx.send_if_modified(|p| {
            if self.generation.load(Ordering::SeqCst) != generation.get() {
                return false;
            }
            let next = p.completed.saturating_add(units).min(p.total);
            if next == p.completed {
                return false;
            }
            p.completed = next;
            true
        })
    }

    /// Latest progress.
    #[must_use]
    pub fn current(&self) -> Progress {
        *self.tx.borrow()
    }

    /// Receiver notified on every change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Progress> {
        self.tx.subscribe()
    }
}
