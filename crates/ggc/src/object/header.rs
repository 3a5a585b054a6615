//! Object header and managed block layout.
//!
//! Every managed object is allocated as a [`GcBox`]: a header followed by
//! the payload value. The header packs the object size and two flag bits
//! into one word:
//!
//! - bit `W-1` — reachable flag, the bit whose global interpretation flips
//!   each collection cycle;
//! - bit `W-2` — mock flag, set only on list sentinel heads;
//! - remaining low bits — payload block size.
//!
//! The header also carries the element's list links (an object is a member
//! of exactly one list at any time) and a pointer to its type descriptor.

use std::cell::Cell;
use std::mem;

use crate::list::{self, Links, ListNode};
use crate::object::trace::TypeInfo;

const SIZE_BITS: usize = usize::BITS as usize;

/// Reachable flag bit.
pub(crate) const REACHABLE_FLAG: usize = 1 << (SIZE_BITS - 1);

/// Mock (list sentinel) flag bit.
pub(crate) const MOCK_FLAG: usize = 1 << (SIZE_BITS - 2);

/// Mask extracting the size from the header word.
pub(crate) const SIZE_MASK: usize = MOCK_FLAG - 1;

/// Largest object size the header can encode.
pub const MAX_OBJECT_SIZE: usize = SIZE_MASK;

/// Machine word size in bytes.
pub(crate) const WORD: usize = mem::size_of::<usize>();

/// Size charged against the heap quota for an object of the given logical
/// size: the logical size plus three bookkeeping words, rounded up to word
/// alignment. The formula matches the accounting of the original allocator
/// so heap numbers stay comparable; it is not a physical layout requirement.
pub(crate) fn physical_block_size(size: usize) -> usize {
    let mask = WORD - 1;
    (size + WORD * 3 + mask) & !mask
}

/// Header preceding every managed payload.
pub(crate) struct GcHeader {
    size_and_flags: Cell<usize>,
    links: Links<GcHeader>,
    info: Option<&'static TypeInfo>,
}

impl ListNode for GcHeader {
    fn links(&self) -> &Links<GcHeader> {
        &self.links
    }
}

impl GcHeader {
    /// Header of a freshly allocated, not yet managed object.
    pub(crate) fn new(info: &'static TypeInfo) -> GcHeader {
        GcHeader {
            size_and_flags: Cell::new(0),
            links: Links::dangling(),
            info: Some(info),
        }
    }

    /// Header of a list sentinel. Mock objects carry only the links; they
    /// have no payload and take part in no rooting or tracing.
    pub(crate) fn new_mock() -> GcHeader {
        GcHeader {
            size_and_flags: Cell::new(MOCK_FLAG),
            links: Links::dangling(),
            info: None,
        }
    }

    /// Marks the object as managed: stores its size together with the
    /// current value of the reachable flag, so the object reads as
    /// unmarked until the next cycle visits it.
    pub(crate) fn manage(&self, size: usize, reachable_flag: usize) {
        debug_assert!(size <= MAX_OBJECT_SIZE);
        debug_assert!(!self.is_mock());
        self.size_and_flags.set(reachable_flag | (size & SIZE_MASK));
    }

    pub(crate) fn size(&self) -> usize {
        self.size_and_flags.get() & SIZE_MASK
    }

    pub(crate) fn is_mock(&self) -> bool {
        self.size_and_flags.get() & MOCK_FLAG != 0
    }

    /// Current value of this object's reachable bit.
    pub(crate) fn reachable_bits(&self) -> usize {
        self.size_and_flags.get() & REACHABLE_FLAG
    }

    pub(crate) fn toggle_reachable(&self) {
        self.size_and_flags
            .set(self.size_and_flags.get() ^ REACHABLE_FLAG);
    }

    pub(crate) fn info(&self) -> &'static TypeInfo {
        self.info.expect("mock objects have no type descriptor")
    }
}

/// Managed block layout: header followed by the payload.
#[repr(C)]
pub(crate) struct GcBox<T> {
    pub(crate) header: GcHeader,
    pub(crate) value: T,
}

/// Payload pointer of a managed block.
pub(crate) unsafe fn payload_ptr<T>(header: *mut GcHeader) -> *mut T {
    let boxed = header as *mut GcBox<T>;
    std::ptr::addr_of_mut!((*boxed).value)
}

/// Recovers the header from a payload reference.
pub(crate) unsafe fn header_from_payload<T>(value: *const T) -> *mut GcHeader {
    let offset = mem::offset_of!(GcBox<T>, value);
    (value as *const u8).sub(offset) as *mut GcHeader
}

/// An owned list head: a boxed mock header whose address is stable for the
/// lifetime of the list.
pub(crate) struct ObjectList {
    head: Box<GcHeader>,
}

impl ObjectList {
    pub(crate) fn new() -> ObjectList {
        let list = ObjectList {
            head: Box::new(GcHeader::new_mock()),
        };
        unsafe { list::init(list.head_ptr()) };
        list
    }

    pub(crate) fn head_ptr(&self) -> *mut GcHeader {
        &*self.head as *const GcHeader as *mut GcHeader
    }

    pub(crate) fn is_empty(&self) -> bool {
        unsafe { list::is_empty(self.head_ptr()) }
    }

    pub(crate) fn len(&self) -> usize {
        unsafe { list::iter(self.head_ptr()).count() }
    }
}
