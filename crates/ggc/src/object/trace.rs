//! Reference enumeration protocol.
//!
//! Every managed type reports its in-object references through
//! [`GcType::enumerate_refs`]. The contract: visit every [`Reference`] field
//! exactly once, in a fixed order. The collector drives the visitor during
//! marking; in debug builds the same enumeration is replayed right after
//! construction to verify it matches the references the constructor actually
//! created, in the same order.
//!
//! Per-type dispatch goes through a [`TypeInfo`] descriptor holding plain
//! function pointers, created once per monomorphized payload type.

use std::alloc::Layout;
use std::marker::PhantomData;
use std::ptr;

use crate::global;
use crate::object::header::{payload_ptr, GcBox, GcHeader};
use crate::root::Reference;

/// Implemented by every type stored in the managed heap.
///
/// Types without reference fields can rely on the default, empty
/// enumeration. Types with [`Reference`] fields must visit each of them:
///
/// ```ignore
/// struct Node {
///     next: Reference<Node>,
/// }
///
/// impl GcType for Node {
///     fn enumerate_refs(&self, visitor: &mut RefVisitor) {
///         visitor.visit(&self.next);
///     }
/// }
/// ```
pub trait GcType: Send + Sized + 'static {
    fn enumerate_refs(&self, _visitor: &mut RefVisitor) {}
}

/// Visitor passed to [`GcType::enumerate_refs`].
pub struct RefVisitor {
    mode: VisitMode,
}

enum VisitMode {
    /// Marking during a collection cycle: each visited reference target is
    /// marked reachable and queued for tracing.
    Collect {
        reachable_flag: usize,
        reachable_head: *mut GcHeader,
    },
    /// Post-construction verification (debug builds): visited references
    /// must appear in construction order.
    #[cfg(debug_assertions)]
    Check { next_seq: u32 },
}

impl RefVisitor {
    pub(crate) fn collect(reachable_flag: usize, reachable_head: *mut GcHeader) -> RefVisitor {
        RefVisitor {
            mode: VisitMode::Collect {
                reachable_flag,
                reachable_head,
            },
        }
    }

    #[cfg(debug_assertions)]
    pub(crate) fn check() -> RefVisitor {
        RefVisitor {
            mode: VisitMode::Check { next_seq: 0 },
        }
    }

    #[cfg(debug_assertions)]
    pub(crate) fn checked_count(&self) -> u32 {
        match self.mode {
            VisitMode::Check { next_seq } => next_seq,
            _ => unreachable!(),
        }
    }

    /// Reports one reference field of the object being enumerated.
    pub fn visit<T: GcType>(&mut self, reference: &Reference<T>) {
        match &mut self.mode {
            VisitMode::Collect {
                reachable_flag,
                reachable_head,
            } => unsafe {
                global::mark_object(reference.raw(), *reachable_flag, *reachable_head);
            },
            #[cfg(debug_assertions)]
            VisitMode::Check { next_seq } => {
                assert_eq!(
                    reference.debug_seq(),
                    *next_seq,
                    "enumerate_refs reports references in a different order than the constructor created them"
                );
                *next_seq += 1;
            }
        }
    }
}

/// Per-type descriptor: block layout plus type-erased entry points for
/// dropping the payload and enumerating its references.
pub(crate) struct TypeInfo {
    pub(crate) layout: Layout,
    pub(crate) drop_value: unsafe fn(*mut GcHeader),
    pub(crate) enumerate: unsafe fn(*mut GcHeader, &mut RefVisitor),
}

unsafe fn drop_value_raw<T: GcType>(header: *mut GcHeader) {
    ptr::drop_in_place(payload_ptr::<T>(header));
}

unsafe fn enumerate_raw<T: GcType>(header: *mut GcHeader, visitor: &mut RefVisitor) {
    (*payload_ptr::<T>(header)).enumerate_refs(visitor);
}

struct InfoFor<T>(PhantomData<T>);

impl<T: GcType> InfoFor<T> {
    const INFO: TypeInfo = TypeInfo {
        layout: Layout::new::<GcBox<T>>(),
        drop_value: drop_value_raw::<T>,
        enumerate: enumerate_raw::<T>,
    };
}

/// The descriptor of a payload type. The same type always yields the same
/// descriptor address.
pub(crate) fn type_info<T: GcType>() -> &'static TypeInfo {
    &InfoFor::<T>::INFO
}

#[cfg(test)]
impl GcType for u64 {}
