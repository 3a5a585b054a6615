//! Allocation observer hook.

/// Observer of raw heap traffic.
///
/// A single observer may be installed at [`startup`](crate::startup) and
/// receives paired notifications: every `memory_allocated` is matched by one
/// `memory_deleted` with the same pointer and size. The observer is purely
/// observational; it must not call back into the GC.
pub trait AllocObserver: Send + Sync {
    fn memory_allocated(&self, ptr: *const u8, size: usize);
    fn memory_deleted(&self, ptr: *const u8, size: usize);
}
