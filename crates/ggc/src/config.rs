//! GC configuration parameters.

use gramc_platform::time::{Tick, GC_SYNC_INTERVAL};

/// Tunable parameters of the garbage collector.
///
/// The defaults replicate the constants the runtime sample ships with; tests
/// override `sync_interval` to force the safepoint slow path and `heap_size`
/// to provoke collections.
#[derive(Debug, Clone)]
pub struct GcConfig {
    /// Total heap quota in bytes. Every live object is charged its physical
    /// block size against this quota.
    pub heap_size: usize,

    /// Ticks between safepoint checks in `synchronize()`.
    pub sync_interval: Tick,

    /// Milliseconds a synchronization wait may block before it is reported
    /// as a timeout.
    pub stall_timeout_ms: u64,

    /// Number of timed-out waits tolerated before the process aborts.
    pub stall_retry_limit: u32,
}

impl Default for GcConfig {
    fn default() -> Self {
        GcConfig {
            heap_size: 16 * 1024 * 1024,
            sync_interval: GC_SYNC_INTERVAL,
            stall_timeout_ms: 10_000,
            stall_retry_limit: 6,
        }
    }
}

impl GcConfig {
    /// Default configuration with an explicit heap quota.
    pub fn with_heap_size(heap_size: usize) -> GcConfig {
        GcConfig {
            heap_size,
            ..GcConfig::default()
        }
    }

    /// Check the configuration for values the collector cannot run with.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.heap_size == 0 {
            return Err("heap_size must be greater than zero".to_string());
        }
        if self.stall_timeout_ms == 0 {
            return Err("stall_timeout_ms must be greater than zero".to_string());
        }
        if self.stall_retry_limit == 0 {
            return Err("stall_retry_limit must be greater than zero".to_string());
        }
        Ok(())
    }
}
