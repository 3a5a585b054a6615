//! Collection statistics.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Internal atomic counters updated by the sweep phase.
pub(crate) struct GcStats {
    cycles: AtomicU64,
    total_reclaimed_objects: AtomicU64,
    total_reclaimed_bytes: AtomicU64,
    last_reclaimed_objects: AtomicU64,
    last_reclaimed_bytes: AtomicU64,
    last_pause_micros: AtomicU64,
}

impl GcStats {
    pub(crate) fn new() -> GcStats {
        GcStats {
            cycles: AtomicU64::new(0),
            total_reclaimed_objects: AtomicU64::new(0),
            total_reclaimed_bytes: AtomicU64::new(0),
            last_reclaimed_objects: AtomicU64::new(0),
            last_reclaimed_bytes: AtomicU64::new(0),
            last_pause_micros: AtomicU64::new(0),
        }
    }

    pub(crate) fn record_cycle(&self, objects: u64, bytes: usize, pause: Duration) {
        self.cycles.fetch_add(1, Ordering::Relaxed);
        self.total_reclaimed_objects.fetch_add(objects, Ordering::Relaxed);
        self.total_reclaimed_bytes
            .fetch_add(bytes as u64, Ordering::Relaxed);
        self.last_reclaimed_objects.store(objects, Ordering::Relaxed);
        self.last_reclaimed_bytes
            .store(bytes as u64, Ordering::Relaxed);
        self.last_pause_micros
            .store(pause.as_micros() as u64, Ordering::Relaxed);
    }

    pub(crate) fn reset(&self) {
        self.cycles.store(0, Ordering::Relaxed);
        self.total_reclaimed_objects.store(0, Ordering::Relaxed);
        self.total_reclaimed_bytes.store(0, Ordering::Relaxed);
        self.last_reclaimed_objects.store(0, Ordering::Relaxed);
        self.last_reclaimed_bytes.store(0, Ordering::Relaxed);
        self.last_pause_micros.store(0, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> GcStatsSnapshot {
        GcStatsSnapshot {
            cycles: self.cycles.load(Ordering::Relaxed),
            total_reclaimed_objects: self.total_reclaimed_objects.load(Ordering::Relaxed),
            total_reclaimed_bytes: self.total_reclaimed_bytes.load(Ordering::Relaxed),
            last_reclaimed_objects: self.last_reclaimed_objects.load(Ordering::Relaxed),
            last_reclaimed_bytes: self.last_reclaimed_bytes.load(Ordering::Relaxed),
            last_pause: Duration::from_micros(self.last_pause_micros.load(Ordering::Relaxed)),
        }
    }
}

/// Point-in-time view of the collector's counters, as returned by
/// [`stats`](crate::stats). A "cycle" here is one sweep pass; the residual
/// sweep performed by `shutdown` counts as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GcStatsSnapshot {
    pub cycles: u64,
    pub total_reclaimed_objects: u64,
    pub total_reclaimed_bytes: u64,
    pub last_reclaimed_objects: u64,
    pub last_reclaimed_bytes: u64,
    pub last_pause: Duration,
}
