//! ggc - Stop-the-World Tracing Garbage Collector
//!
//! ggc provides managed object lifetime for the multi-threaded scripting
//! runtime that ships with the Gram parser generator. Mutator threads
//! allocate concurrently against an atomic heap quota; when the quota runs
//! out (or on an explicit request) the allocating thread becomes the
//! collector, waits for every other mutator to park at a safepoint, and
//! runs a synchronous mark-and-sweep cycle.
//!
//! ## Model
//!
//! - Every managed object carries a one-word header encoding its size, a
//!   *reachable* flag bit and a *mock* (list sentinel) bit, plus intrusive
//!   list links. An object belongs to exactly one list at any time: its
//!   allocating thread's local list, the global managed list, or the
//!   reachable scratch list during a cycle.
//! - [`Root`] handles are stack-scoped strong references forming the traced
//!   root set. [`Reference`] slots are unowning in-object pointers reported
//!   through [`GcType::enumerate_refs`].
//! - The global meaning of the reachable bit flips every cycle, so marking
//!   needs no clearing pass: survivors implicitly read as unmarked again.
//!
//! ## Thread protocol
//!
//! A thread registers with [`manage_thread_guard`], then brackets managed
//! work with [`enable`]/[`disable`] and calls [`synchronize`] on bounded
//! intervals. `allocate`, `enable`, `disable`, `synchronize` and [`collect`]
//! are the only suspension points; a parked thread contributes nothing to
//! the root set except its [`Root`] handles, which the collector walks.
//!
//! ```ignore
//! ggc::startup(1 << 20, None);
//! {
//!     let _thread = ggc::manage_thread_guard("worker");
//!     ggc::enable();
//!     {
//!         let list = ggc::create(|| Node::new())?;
//!         // ... mutate through list.get() / Reference::set ...
//!         ggc::collect();
//!     }
//!     ggc::disable();
//! }
//! ggc::shutdown();
//! ```

pub mod config;
pub mod error;
pub mod observer;
pub mod stats;

mod global;
mod list;
mod object;
mod root;
mod thread;

use std::mem;
use std::ptr;

pub use config::GcConfig;
pub use error::{GcError, Result};
pub use global::HeapStats;
pub use object::{GcType, RefVisitor, MAX_OBJECT_SIZE};
pub use observer::AllocObserver;
pub use root::{Reference, Root};
pub use stats::GcStatsSnapshot;
pub use thread::{manage_thread_guard, ThreadGuard};

/// Initializes the collector with the given heap quota and an optional
/// allocation observer. Must be called before any thread registers.
pub fn startup(heap_size: usize, observer: Option<Box<dyn AllocObserver>>) {
    global::startup_with(GcConfig::with_heap_size(heap_size), observer);
}

/// Initializes the collector with explicit configuration.
pub fn startup_with(config: GcConfig, observer: Option<Box<dyn AllocObserver>>) {
    global::startup_with(config, observer);
}

/// Tears the collector down. Requires that every thread has unregistered;
/// any residual managed objects are deleted.
pub fn shutdown() {
    global::shutdown();
}

/// Enables managed allocation for the current thread. Blocks while a
/// collection cycle is underway.
pub fn enable() {
    global::enable(thread::current());
}

/// Disables the current thread, excluding it from cycle synchronization.
/// The thread's roots remain part of the root set.
pub fn disable() {
    global::disable(thread::current());
}

/// Safepoint check; mutator code calls this on bounded intervals. Parks the
/// thread for the duration of any in-progress collection cycle.
pub fn synchronize() {
    thread::synchronize_current();
}

/// Runs a collection cycle. If another thread is already collecting, parks
/// until that cycle finishes instead of starting a second one.
pub fn collect() {
    global::collect(thread::current());
}

/// Allocates a managed object and returns a root handle to it.
///
/// `init` runs with the allocation already published as the thread's object
/// under construction; [`Reference`] fields may only be created there. If
/// `init` panics, the block is freed, the quota refunded, and the panic
/// propagated.
pub fn create<T, F>(init: F) -> Result<Root<T>>
where
    T: GcType,
    F: FnOnce() -> T,
{
    let state = thread::current();
    let info = object::trace::type_info::<T>();

    let header = unsafe { thread::new_allocate(state, info)? };

    struct FailGuard {
        state: *mut thread::ThreadState,
        header: *mut object::header::GcHeader,
    }
    impl Drop for FailGuard {
        fn drop(&mut self) {
            unsafe { thread::new_fail(self.state, self.header) };
        }
    }

    let guard = FailGuard { state, header };
    unsafe {
        ptr::write(object::header::payload_ptr::<T>(header), init());
    }
    mem::forget(guard);

    unsafe {
        thread::new_finish(state, header);
        Ok(Root::from_header(header))
    }
}

/// Collector statistics accumulated since startup.
pub fn stats() -> GcStatsSnapshot {
    global::stats()
}

/// Heap-level counters. Exact only at quiescent points.
pub fn heap_stats() -> HeapStats {
    global::heap_stats()
}
