//! Global collector state and the collection cycle.
//!
//! A single mutex guards all mutable global state; the condition variable
//! beside it serializes cycle start and end. The free-heap counter is
//! atomic and is the only piece of state touched outside the lock on the
//! allocation fast path.
//!
//! A collection cycle runs entirely on the initiating thread, which must be
//! the only enabled thread: every other mutator is parked at a safepoint (or
//! voluntarily disabled) before the cycle proceeds.

use std::panic::{catch_unwind, resume_unwind, AssertUnwindSafe};
use std::ptr;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use lazy_static::lazy_static;
use parking_lot::{Condvar, Mutex, MutexGuard, RwLock};

use gramc_platform::time::{current_tick, Tick};

use crate::config::GcConfig;
use crate::error::{GcError, Result};
use crate::list;
use crate::list::ListNode;
use crate::object::header::{physical_block_size, GcHeader, ObjectList, REACHABLE_FLAG};
use crate::object::trace::RefVisitor;
use crate::observer::AllocObserver;
use crate::stats::{GcStats, GcStatsSnapshot};
use crate::thread::ThreadState;

/// State protected by the global mutex.
struct GlobalGuarded {
    started_up: bool,
    config: GcConfig,

    /// Registry of mutator threads: a sentinel plus intrusive links in each
    /// thread's state record.
    threads: Box<ThreadState>,
    threads_count: usize,
    enabled_threads: usize,

    /// All managed objects outside a cycle. During a cycle, per-thread
    /// lists are consolidated here, survivors migrate to `reachable`, and
    /// whatever remains is garbage.
    managed_objects: ObjectList,

    /// Scratch list populated during marking; empty between cycles.
    reachable_objects: ObjectList,

    collection_in_progress: bool,
    enumerating_references: bool,
}

// Raw pointers and cells inside are only dereferenced by the thread holding
// the mutex, or by an object's owning thread per the safepoint protocol.
unsafe impl Send for GlobalGuarded {}

struct GlobalState {
    guarded: Mutex<GlobalGuarded>,
    monitor: Condvar,

    /// Remaining heap quota in bytes. May transiently under-approximate
    /// between CAS retries, never over-approximate.
    free_heap: AtomicUsize,

    /// Current value of the reachable-flag bit. Written only during a cycle
    /// (under the lock); read without the lock by enabled threads, which by
    /// the safepoint protocol never overlap a cycle.
    reachable_flag: AtomicUsize,

    /// Safepoint interval, mirrored out of the config for lock-free reads.
    sync_interval: AtomicU64,

    observer: RwLock<Option<Box<dyn AllocObserver>>>,
    stats: GcStats,
}

lazy_static! {
    static ref GLOBAL: GlobalState = GlobalState {
        guarded: Mutex::new(GlobalGuarded {
            started_up: false,
            config: GcConfig::default(),
            threads: new_thread_sentinel(),
            threads_count: 0,
            enabled_threads: 0,
            managed_objects: ObjectList::new(),
            reachable_objects: ObjectList::new(),
            collection_in_progress: false,
            enumerating_references: false,
        }),
        monitor: Condvar::new(),
        free_heap: AtomicUsize::new(0),
        reachable_flag: AtomicUsize::new(0),
        sync_interval: AtomicU64::new(0),
        observer: RwLock::new(None),
        stats: GcStats::new(),
    };
}

fn new_thread_sentinel() -> Box<ThreadState> {
    let sentinel = Box::new(ThreadState::new_mock());
    unsafe { list::init(&*sentinel as *const ThreadState as *mut ThreadState) };
    sentinel
}

fn threads_head(g: &GlobalGuarded) -> *mut ThreadState {
    &*g.threads as *const ThreadState as *mut ThreadState
}

//
// Startup / shutdown
//

pub(crate) fn startup_with(config: GcConfig, observer: Option<Box<dyn AllocObserver>>) {
    if let Err(message) = config.validate() {
        panic!("invalid gc configuration: {message}");
    }

    let mut g = GLOBAL.guarded.lock();
    assert!(!g.started_up, "gc is already started up");

    GLOBAL.free_heap.store(config.heap_size, Ordering::SeqCst);
    GLOBAL.reachable_flag.store(0, Ordering::SeqCst);
    GLOBAL
        .sync_interval
        .store(config.sync_interval, Ordering::SeqCst);
    *GLOBAL.observer.write() = observer;
    GLOBAL.stats.reset();

    g.config = config;
    g.started_up = true;
}

pub(crate) fn shutdown() {
    let mut g = GLOBAL.guarded.lock();
    assert!(g.started_up, "gc is not started up");
    assert_eq!(g.threads_count, 0, "threads are still registered");
    assert!(unsafe { list::is_empty(threads_head(&g)) });
    assert_eq!(g.enabled_threads, 0);
    assert!(!g.collection_in_progress);

    // Delete residual managed objects, for safety.
    unsafe { sweep_managed(&mut g) };

    assert!(g.managed_objects.is_empty());
    assert_eq!(
        GLOBAL.free_heap.load(Ordering::SeqCst),
        g.config.heap_size,
        "heap accounting mismatch at shutdown"
    );

    unsafe { list::clear(g.reachable_objects.head_ptr()) };
    GLOBAL.free_heap.store(0, Ordering::SeqCst);
    GLOBAL.reachable_flag.store(0, Ordering::SeqCst);
    *GLOBAL.observer.write() = None;
    g.started_up = false;
}

//
// Thread registry
//

pub(crate) fn add_managed_thread(state: *mut ThreadState) {
    let mut g = GLOBAL.guarded.lock();
    assert!(g.started_up, "gc is not started up");
    unsafe {
        log::debug!("gc: thread \"{}\" registered", (*state).name);
        list::add(threads_head(&g), state);
    }
    g.threads_count += 1;
}

pub(crate) fn remove_managed_thread(state: *mut ThreadState) {
    let mut g = GLOBAL.guarded.lock();
    unsafe {
        log::debug!("gc: thread \"{}\" unregistered", (*state).name);
        // Objects allocated since the last consolidation survive the thread:
        // they belong to the global managed list from now on.
        list::move_add(
            (*state).managed_objects.head_ptr(),
            g.managed_objects.head_ptr(),
        );
        list::remove(state);
    }
    g.threads_count -= 1;
}

//
// Enable / disable / safepoints
//

fn set_enabled(g: &mut MutexGuard<'_, GlobalGuarded>, state: *mut ThreadState, enabled: bool) {
    unsafe {
        assert!((*state).managed);
        assert_ne!((*state).enabled, enabled);
        (*state).enabled = enabled;
    }
    if enabled {
        g.enabled_threads += 1;
    } else {
        g.enabled_threads -= 1;
        GLOBAL.monitor.notify_all();
    }
}

pub(crate) fn enable(state: *mut ThreadState) {
    unsafe {
        assert!((*state).managed);
        assert!(!(*state).enabled);
        assert!(!(*state).is_creating());
    }

    let mut g = GLOBAL.guarded.lock();

    // No thread may become enabled while a cycle is underway.
    wait_for_collection_end(&mut g);

    unsafe {
        (*state).next_sync_tick = current_tick() + sync_interval();
    }
    set_enabled(&mut g, state, true);
}

pub(crate) fn disable(state: *mut ThreadState) {
    unsafe {
        assert!((*state).managed);
        assert!((*state).enabled);
        assert!(!(*state).is_creating());
    }

    let mut g = GLOBAL.guarded.lock();
    set_enabled(&mut g, state, false);
}

/// Safepoint slow path: parks the thread for the duration of any
/// in-progress cycle.
pub(crate) fn synchronize(state: *mut ThreadState) {
    let mut g = GLOBAL.guarded.lock();
    if g.collection_in_progress {
        suspend_during_collection(&mut g, state);
    }
}

/// Disables the thread until the end of the running cycle. A cycle can only
/// proceed when every thread but the initiator is disabled.
fn suspend_during_collection(g: &mut MutexGuard<'_, GlobalGuarded>, state: *mut ThreadState) {
    unsafe {
        assert!((*state).managed);
        assert!((*state).enabled);
        assert!(!(*state).is_creating());
    }

    set_enabled(g, state, false);
    wait_for_collection_end(g);
    set_enabled(g, state, true);
}

pub(crate) fn sync_interval() -> Tick {
    GLOBAL.sync_interval.load(Ordering::Relaxed)
}

//
// Synchronization waits
//

/// Waits on the monitor until the predicate holds. Waits run in bounded
/// slices; exhausting the retry budget means the system cannot make
/// progress, which is fatal.
fn wait_for(
    g: &mut MutexGuard<'_, GlobalGuarded>,
    pred: impl Fn(&GlobalGuarded) -> bool,
) {
    let timeout = Duration::from_millis(g.config.stall_timeout_ms);
    let retries = g.config.stall_retry_limit;

    for _ in 0..retries {
        let deadline = Instant::now() + timeout;
        loop {
            if pred(g) {
                return;
            }
            if GLOBAL.monitor.wait_until(g, deadline).timed_out() {
                break;
            }
        }
        if pred(g) {
            return;
        }
        log::error!("gc synchronization timeout");
    }

    log::error!("fatal: gc synchronization failed, aborting");
    std::process::abort();
}

fn wait_for_collection_end(g: &mut MutexGuard<'_, GlobalGuarded>) {
    wait_for(g, |g| !g.collection_in_progress);
}

/// Announces a cycle and waits until the caller is the only enabled thread.
fn suspend_enabled_threads(g: &mut MutexGuard<'_, GlobalGuarded>) {
    assert!(!g.collection_in_progress);
    g.collection_in_progress = true;
    wait_for(g, |g| g.enabled_threads == 1);
}

fn resume_suspended_threads(g: &mut MutexGuard<'_, GlobalGuarded>) {
    assert!(g.collection_in_progress);
    g.collection_in_progress = false;
    GLOBAL.monitor.notify_all();
}

//
// Collection
//

/// Explicit collection, from an enabled thread. If another thread's cycle
/// is already running, parks until it finishes instead of starting a second
/// one.
pub(crate) fn collect(state: *mut ThreadState) {
    unsafe {
        assert!((*state).enabled, "collect requires an enabled gc thread");
        assert!(!(*state).is_creating());
    }

    let mut g = GLOBAL.guarded.lock();

    if g.collection_in_progress {
        suspend_during_collection(&mut g, state);
        return;
    }

    suspend_enabled_threads(&mut g);
    let outcome = catch_unwind(AssertUnwindSafe(|| unsafe {
        collect_synchronized(&mut g);
    }));
    resume_suspended_threads(&mut g);
    if let Err(payload) = outcome {
        resume_unwind(payload);
    }
}

/// The cycle itself. Runs with the lock held and exactly one enabled
/// thread.
unsafe fn collect_synchronized(g: &mut MutexGuard<'_, GlobalGuarded>) {
    debug_assert!(!g.enumerating_references);

    let flag = GLOBAL.reachable_flag.load(Ordering::Relaxed);
    let managed_head = g.managed_objects.head_ptr();
    let reachable_head = g.reachable_objects.head_ptr();
    let threads = threads_head(g);

    // Step 1: consolidate per-thread object lists into the global list.
    for thread in list::iter::<ThreadState>(threads) {
        list::move_add((*thread).managed_objects.head_ptr(), managed_head);
    }

    // Step 2: mark every rooted object.
    for thread in list::iter::<ThreadState>(threads) {
        for entry in list::iter((*thread).roots.head_ptr()) {
            mark_object((*entry).object(), flag, reachable_head);
        }
    }

    // Step 3: trace. The reachable list grows at the tail while it is
    // walked; termination holds because an object is moved onto it at most
    // once per cycle.
    g.enumerating_references = true;
    let mut visitor = RefVisitor::collect(flag, reachable_head);
    for object in list::iter::<GcHeader>(reachable_head) {
        ((*object).info().enumerate)(object, &mut visitor);
    }
    g.enumerating_references = false;

    // Step 4: everything left on the managed list is unreachable.
    sweep_managed(g);

    // Step 5: survivors become the next cycle's managed list.
    list::move_replace(reachable_head, managed_head);

    // Step 6: flip the flag, implicitly unmarking every survivor.
    GLOBAL
        .reachable_flag
        .store(flag ^ REACHABLE_FLAG, Ordering::Relaxed);
}

/// Marks the object reachable and queues it for tracing, unless it is
/// already marked this cycle (or the slot is empty).
pub(crate) unsafe fn mark_object(
    object: *mut GcHeader,
    reachable_flag: usize,
    reachable_head: *mut GcHeader,
) {
    if object.is_null() {
        return;
    }
    let header = &*object;
    if header.reachable_bits() == reachable_flag {
        header.toggle_reachable();
        list::remove(object);
        list::add(reachable_head, object);
    }
}

/// Deletes every object on the global managed list and refunds its physical
/// size to the heap quota.
unsafe fn sweep_managed(g: &mut MutexGuard<'_, GlobalGuarded>) {
    let started = Instant::now();
    let head = g.managed_objects.head_ptr();

    let mut deleted_bytes = 0usize;
    let mut deleted_count = 0u64;

    let mut cursor = (*head).links().next();
    while !ptr::eq(cursor, head) {
        let object = cursor;
        cursor = (*object).links().next();

        let info = (*object).info();
        let size = (*object).size();
        list::remove(object);
        (info.drop_value)(object);
        observer_deleted(object as *const u8, size);
        std::alloc::dealloc(object as *mut u8, info.layout);

        deleted_bytes += physical_block_size(size);
        deleted_count += 1;
    }

    GLOBAL.free_heap.fetch_add(deleted_bytes, Ordering::SeqCst);

    let elapsed = started.elapsed();
    GLOBAL.stats.record_cycle(deleted_count, deleted_bytes, elapsed);
    log::info!(
        "gc: collected {} objects, {} bytes, {} ms",
        deleted_count,
        deleted_bytes,
        elapsed.as_millis()
    );
}

//
// Heap accounting
//

/// Charges `size` bytes against the heap quota, collecting if needed.
///
/// Fast path: a CAS decrement of the free counter. On underflow the thread
/// either waits out a running cycle or initiates one, then retries; if the
/// quota is still insufficient after a cycle, the allocation fails.
pub(crate) fn acquire_memory(state: *mut ThreadState, size: usize) -> Result<()> {
    if try_acquire(size) {
        return Ok(());
    }

    let mut g = GLOBAL.guarded.lock();

    if g.collection_in_progress {
        // Another thread is collecting; let it finish, then retry.
        suspend_during_collection(&mut g, state);
        if try_acquire(size) {
            return Ok(());
        }
    }

    suspend_enabled_threads(&mut g);
    let outcome = catch_unwind(AssertUnwindSafe(|| {
        if try_acquire(size) {
            return Ok(());
        }
        unsafe { collect_synchronized(&mut g) };
        if try_acquire(size) {
            Ok(())
        } else {
            Err(GcError::OutOfMemory {
                requested: size,
                available: GLOBAL.free_heap.load(Ordering::SeqCst),
            })
        }
    }));
    resume_suspended_threads(&mut g);
    match outcome {
        Ok(result) => result,
        Err(payload) => resume_unwind(payload),
    }
}

pub(crate) fn release_memory(size: usize) {
    GLOBAL.free_heap.fetch_add(size, Ordering::SeqCst);
}

fn try_acquire(size: usize) -> bool {
    let mut free = GLOBAL.free_heap.load(Ordering::SeqCst);
    loop {
        if free < size {
            return false;
        }
        match GLOBAL.free_heap.compare_exchange(
            free,
            free - size,
            Ordering::SeqCst,
            Ordering::SeqCst,
        ) {
            Ok(_) => return true,
            Err(actual) => free = actual,
        }
    }
}

pub(crate) fn reachable_flag() -> usize {
    GLOBAL.reachable_flag.load(Ordering::Relaxed)
}

//
// Observer
//

pub(crate) fn observer_allocated(ptr: *const u8, size: usize) {
    if let Some(observer) = GLOBAL.observer.read().as_ref() {
        observer.memory_allocated(ptr, size);
    }
}

pub(crate) fn observer_deleted(ptr: *const u8, size: usize) {
    if let Some(observer) = GLOBAL.observer.read().as_ref() {
        observer.memory_deleted(ptr, size);
    }
}

//
// Introspection
//

/// Snapshot of heap-level counters.
///
/// Counts are exact only at quiescent points: other enabled threads may be
/// allocating while the snapshot is taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeapStats {
    pub heap_size: usize,
    pub free_heap: usize,
    pub threads: usize,
    pub enabled_threads: usize,
    pub live_objects: usize,
}

pub(crate) fn heap_stats() -> HeapStats {
    let g = GLOBAL.guarded.lock();
    assert!(g.started_up, "gc is not started up");

    let mut live_objects = g.managed_objects.len();
    unsafe {
        for thread in list::iter::<ThreadState>(threads_head(&g)) {
            live_objects += (*thread).managed_objects.len();
        }
    }

    HeapStats {
        heap_size: g.config.heap_size,
        free_heap: GLOBAL.free_heap.load(Ordering::SeqCst),
        threads: g.threads_count,
        enabled_threads: g.enabled_threads,
        live_objects,
    }
}

pub(crate) fn stats() -> GcStatsSnapshot {
    GLOBAL.stats.snapshot()
}
