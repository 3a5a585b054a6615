//! Per-thread GC state and thread registration.
//!
//! Every mutator thread is registered with the collector through a
//! [`ThreadGuard`] and carries its own state record: its roots list, the
//! list of objects it allocated since the last consolidation, the safepoint
//! deadline and the object currently under construction (if any).
//!
//! The record is owned by its thread. The collector touches it only under
//! the global lock while the owning thread is parked; the registry links are
//! touched by the owning thread and the collector under the lock only.

use std::alloc;
use std::marker::PhantomData;
use std::ptr;

use gramc_platform::time::{current_tick, Tick};

use crate::error::{GcError, Result};
use crate::global;
use crate::list::{Links, ListNode};
use crate::object::header::{physical_block_size, GcHeader, ObjectList, MAX_OBJECT_SIZE};
use crate::object::trace::TypeInfo;
use crate::root::RootList;

pub(crate) struct ThreadState {
    pub(crate) links: Links<ThreadState>,
    pub(crate) name: String,
    pub(crate) managed: bool,
    pub(crate) enabled: bool,
    pub(crate) object_being_created: *mut GcHeader,
    pub(crate) roots: RootList,
    pub(crate) managed_objects: ObjectList,
    pub(crate) next_sync_tick: Tick,
    #[cfg(debug_assertions)]
    refs_registered: u32,
}

impl ListNode for ThreadState {
    fn links(&self) -> &Links<ThreadState> {
        &self.links
    }
}

impl ThreadState {
    fn new(managed: bool, name: &str) -> ThreadState {
        ThreadState {
            links: Links::dangling(),
            name: name.to_string(),
            managed,
            enabled: false,
            object_being_created: ptr::null_mut(),
            roots: RootList::new(),
            managed_objects: ObjectList::new(),
            next_sync_tick: 0,
            #[cfg(debug_assertions)]
            refs_registered: 0,
        }
    }

    /// Sentinel head for the global thread registry.
    pub(crate) fn new_mock() -> ThreadState {
        ThreadState::new(false, "<mock>")
    }

    pub(crate) fn is_creating(&self) -> bool {
        !self.object_being_created.is_null()
    }
}

thread_local! {
    static CURRENT: std::cell::Cell<*mut ThreadState> =
        const { std::cell::Cell::new(ptr::null_mut()) };
}

/// State of the current thread. Panics when the thread was never registered
/// with [`manage_thread_guard`](crate::manage_thread_guard).
pub(crate) fn current() -> *mut ThreadState {
    let state = CURRENT.get();
    assert!(!state.is_null(), "current thread is not managed by the gc");
    state
}

/// Asserts the preconditions of touching live objects: a managed, enabled
/// thread that is not inside `create`.
pub(crate) fn assert_live_access() {
    let state = current();
    unsafe {
        assert!((*state).enabled, "gc is not enabled for this thread");
        assert!(
            !(*state).is_creating(),
            "operation not allowed while an object is under construction"
        );
    }
}

/// Roots-list head of the current thread, for linking a new root handle.
pub(crate) fn roots_head() -> *mut crate::root::RootEntry {
    assert_live_access();
    unsafe { (*current()).roots.head_ptr() }
}

/// Records that a `Reference` slot was created for the object currently
/// under construction. Returns the slot's construction sequence number.
pub(crate) fn register_new_reference() -> u32 {
    let state = current();
    unsafe {
        assert!((*state).enabled, "gc is not enabled for this thread");
        assert!(
            (*state).is_creating(),
            "Reference slots can only be created inside gc create"
        );
    }
    #[cfg(debug_assertions)]
    unsafe {
        let seq = (*state).refs_registered;
        (*state).refs_registered += 1;
        return seq;
    }
    #[cfg(not(debug_assertions))]
    return 0;
}

/// Safepoint check. Cheap unless the sync deadline passed; the slow path
/// parks the thread for the duration of any in-progress collection.
pub(crate) fn synchronize_current() {
    let state = current();
    unsafe {
        assert!((*state).enabled);
        assert!(!(*state).is_creating());

        if current_tick() >= (*state).next_sync_tick {
            global::synchronize(state);
            (*state).next_sync_tick = current_tick() + global::sync_interval();
        }
    }
}

/// Allocates the raw block for a new object and publishes it as the
/// thread's object under construction. The header is written; the payload
/// is not.
pub(crate) unsafe fn new_allocate(
    state: *mut ThreadState,
    info: &'static TypeInfo,
) -> Result<*mut GcHeader> {
    assert!((*state).managed);
    assert!((*state).enabled, "gc is not enabled for this thread");
    assert!(
        !(*state).is_creating(),
        "nested allocation during object construction"
    );

    let size = info.layout.size();
    if size > MAX_OBJECT_SIZE {
        return Err(GcError::ObjectTooLarge {
            size,
            max: MAX_OBJECT_SIZE,
        });
    }

    let physical_size = physical_block_size(size);
    global::acquire_memory(state, physical_size)?;

    let raw = alloc::alloc(info.layout);
    if raw.is_null() {
        global::release_memory(physical_size);
        alloc::handle_alloc_error(info.layout);
    }
    let header = raw as *mut GcHeader;
    ptr::write(header, GcHeader::new(info));
    global::observer_allocated(raw as *const u8, size);

    (*state).object_being_created = header;
    #[cfg(debug_assertions)]
    {
        (*state).refs_registered = 0;
    }
    Ok(header)
}

/// Completes construction: links the object into the thread's local list
/// and stamps its header. In debug builds, replays `enumerate_refs` and
/// verifies it reports exactly the references the constructor created.
pub(crate) unsafe fn new_finish(state: *mut ThreadState, header: *mut GcHeader) {
    assert!((*state).managed);
    assert!(ptr::eq((*state).object_being_created, header));

    crate::list::add((*state).managed_objects.head_ptr(), header);
    (*header).manage((*header).info().layout.size(), global::reachable_flag());

    (*state).object_being_created = ptr::null_mut();

    #[cfg(debug_assertions)]
    {
        let mut visitor = crate::object::trace::RefVisitor::check();
        ((*header).info().enumerate)(header, &mut visitor);
        assert_eq!(
            visitor.checked_count(),
            (*state).refs_registered,
            "enumerate_refs must report every Reference field exactly once"
        );
    }
}

/// Rolls back a failed construction: frees the raw block and refunds the
/// heap quota.
pub(crate) unsafe fn new_fail(state: *mut ThreadState, header: *mut GcHeader) {
    assert!((*state).managed);
    assert!(ptr::eq((*state).object_being_created, header));

    let info = (*header).info();
    let size = info.layout.size();
    global::observer_deleted(header as *const u8, size);
    alloc::dealloc(header as *mut u8, info.layout);
    global::release_memory(physical_block_size(size));

    (*state).object_being_created = ptr::null_mut();
}

/// Scoped registration of the current thread with the collector.
///
/// Registers on construction; on drop, verifies the thread was disabled,
/// hands any remaining locally allocated objects to the global managed list
/// and unregisters.
pub struct ThreadGuard {
    state: *mut ThreadState,
    _marker: PhantomData<*mut ()>,
}

/// Registers the current thread as a mutator, named for diagnostics.
pub fn manage_thread_guard(name: &str) -> ThreadGuard {
    assert!(
        CURRENT.get().is_null(),
        "thread is already managed by the gc"
    );
    let state = Box::into_raw(Box::new(ThreadState::new(true, name)));
    global::add_managed_thread(state);
    CURRENT.set(state);
    ThreadGuard {
        state,
        _marker: PhantomData,
    }
}

impl Drop for ThreadGuard {
    fn drop(&mut self) {
        unsafe {
            assert!(
                !(*self.state).enabled,
                "thread must be disabled before it is unregistered"
            );
            global::remove_managed_thread(self.state);
            CURRENT.set(ptr::null_mut());
            drop(Box::from_raw(self.state));
        }
    }
}
