//! Shared harness for GC integration tests.
//!
//! The collector is a process-wide singleton, so every test serializes on a
//! global lock and brackets its body with startup/shutdown plus a managed,
//! enabled test thread.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use ggc::{AllocObserver, GcConfig, GcType, RefVisitor, Reference, Root};

static TEST_LOCK: Mutex<()> = Mutex::new(());

/// Serializes access to the process-wide collector across test threads.
pub fn serialize() -> MutexGuard<'static, ()> {
    TEST_LOCK.lock().unwrap_or_else(|e| e.into_inner())
}

/// Runs `body` on a registered, enabled test thread with the given
/// configuration, then tears the collector down.
pub fn run_with(
    config: GcConfig,
    observer: Option<Box<dyn AllocObserver>>,
    body: impl FnOnce(),
) {
    let _lock = serialize();
    ggc::startup_with(config, observer);
    {
        let _thread = ggc::manage_thread_guard("test-main");
        ggc::enable();
        body();
        ggc::disable();
    }
    ggc::shutdown();
}

/// [`run_with`] with defaults and an explicit heap quota.
pub fn run(heap_size: usize, body: impl FnOnce()) {
    run_with(GcConfig::with_heap_size(heap_size), None, body);
}

/// Managed list node used by most tests: an id plus one reference slot.
pub struct Node {
    pub id: u32,
    pub next: Reference<Node>,
}

impl GcType for Node {
    fn enumerate_refs(&self, visitor: &mut RefVisitor) {
        visitor.visit(&self.next);
    }
}

pub fn new_node(id: u32) -> ggc::Result<Root<Node>> {
    ggc::create(|| Node {
        id,
        next: Reference::new(),
    })
}

/// Physical footprint of one `Node`, measured through the free-heap delta.
pub fn node_physical_size() -> usize {
    let before = ggc::heap_stats().free_heap;
    let root = new_node(0).expect("probe allocation failed");
    let after = ggc::heap_stats().free_heap;
    drop(root);
    ggc::collect();
    before - after
}

/// Allocation counters shared with a [`CountingObserver`] installed at
/// startup, readable after shutdown.
#[derive(Default)]
pub struct Counters {
    pub allocations: AtomicUsize,
    pub allocated_bytes: AtomicUsize,
    pub deletions: AtomicUsize,
    pub deleted_bytes: AtomicUsize,
}

impl Counters {
    pub fn live_allocations(&self) -> isize {
        self.allocations.load(Ordering::SeqCst) as isize
            - self.deletions.load(Ordering::SeqCst) as isize
    }
}

pub struct CountingObserver(pub Arc<Counters>);

impl AllocObserver for CountingObserver {
    fn memory_allocated(&self, _ptr: *const u8, size: usize) {
        self.0.allocations.fetch_add(1, Ordering::SeqCst);
        self.0.allocated_bytes.fetch_add(size, Ordering::SeqCst);
    }

    fn memory_deleted(&self, _ptr: *const u8, size: usize) {
        self.0.deletions.fetch_add(1, Ordering::SeqCst);
        self.0.deleted_bytes.fetch_add(size, Ordering::SeqCst);
    }
}
