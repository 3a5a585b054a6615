//! Intrusive circular doubly-linked lists.
//!
//! Every object collection in the collector (per-thread local lists, the
//! global managed list, the reachable scratch list, roots lists, the thread
//! registry) is a circular doubly-linked list threaded through the elements
//! themselves. The list head is a sentinel element carrying only the links.
//!
//! All operations are O(1). `remove` unlinks an element by rewriting its
//! neighbors' links only; the removed element's own links are left stale and
//! must be re-initialized by the next `add`.

use std::cell::Cell;
use std::ptr;

/// Link pair embedded in every list element.
pub(crate) struct Links<T> {
    prev: Cell<*mut T>,
    next: Cell<*mut T>,
}

impl<T> Links<T> {
    /// Links that point nowhere. The element must be initialized with
    /// [`init`] or spliced with [`add`] before the list is walked.
    pub(crate) fn dangling() -> Links<T> {
        Links {
            prev: Cell::new(ptr::null_mut()),
            next: Cell::new(ptr::null_mut()),
        }
    }

    pub(crate) fn next(&self) -> *mut T {
        self.next.get()
    }

    pub(crate) fn prev(&self) -> *mut T {
        self.prev.get()
    }
}

/// Implemented by element types that embed [`Links`].
pub(crate) trait ListNode: Sized {
    fn links(&self) -> &Links<Self>;
}

/// Points the element's links at itself, making it an empty list head.
pub(crate) unsafe fn init<T: ListNode>(e: *mut T) {
    let links = (*e).links();
    links.prev.set(e);
    links.next.set(e);
}

/// Empties the list by pointing the head at itself. Elements still linked
/// through the head are left with stale links.
pub(crate) unsafe fn clear<T: ListNode>(head: *mut T) {
    init(head);
}

/// Splices `e` in front of `head`, i.e. at the tail of the list.
pub(crate) unsafe fn add<T: ListNode>(head: *mut T, e: *mut T) {
    let prev = (*head).links().prev.get();
    (*e).links().next.set(head);
    (*e).links().prev.set(prev);
    (*prev).links().next.set(e);
    (*head).links().prev.set(e);
}

/// Unlinks `e`. Only the neighbors' links are modified.
pub(crate) unsafe fn remove<T: ListNode>(e: *mut T) {
    let prev = (*e).links().prev.get();
    let next = (*e).links().next.get();
    (*prev).links().next.set(next);
    (*next).links().prev.set(prev);
}

pub(crate) unsafe fn is_empty<T: ListNode>(head: *const T) -> bool {
    ptr::eq((*head).links().next.get(), head)
}

/// Transfers the whole chain of `src` onto `dst`, replacing whatever `dst`
/// held. `src` is left empty.
pub(crate) unsafe fn move_replace<T: ListNode>(src: *mut T, dst: *mut T) {
    if is_empty(src) {
        clear(dst);
    } else {
        let first = (*src).links().next.get();
        let last = (*src).links().prev.get();

        (*dst).links().next.set(first);
        (*dst).links().prev.set(last);
        (*first).links().prev.set(dst);
        (*last).links().next.set(dst);

        clear(src);
    }
}

/// Concatenates the chain of `src` onto the tail of `dst`. `src` is left
/// empty.
pub(crate) unsafe fn move_add<T: ListNode>(src: *mut T, dst: *mut T) {
    if is_empty(src) {
        return;
    }

    let src_first = (*src).links().next.get();
    let src_last = (*src).links().prev.get();
    let dst_last = (*dst).links().prev.get();

    (*dst_last).links().next.set(src_first);
    (*src_first).links().prev.set(dst_last);
    (*dst).links().prev.set(src_last);
    (*src_last).links().next.set(dst);

    clear(src);
}

/// Iterates the elements of the list, excluding the head sentinel.
///
/// The successor of the yielded element is read lazily on the next call, so
/// elements appended at the tail while iterating are picked up. The yielded
/// element itself must stay linked; callers that delete while walking read
/// the successor up front instead (see the sweep loop).
pub(crate) unsafe fn iter<T: ListNode>(head: *mut T) -> Iter<T> {
    Iter { head, last: head }
}

pub(crate) struct Iter<T: ListNode> {
    head: *mut T,
    last: *mut T,
}

impl<T: ListNode> Iterator for Iter<T> {
    type Item = *mut T;

    fn next(&mut self) -> Option<*mut T> {
        unsafe {
            let next = (*self.last).links().next.get();
            if ptr::eq(next, self.head) {
                None
            } else {
                self.last = next;
                Some(next)
            }
        }
    }
}
