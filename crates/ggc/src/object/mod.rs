//! Managed object model: header layout and the reference enumeration
//! protocol.

pub(crate) mod header;
pub(crate) mod trace;

pub use header::MAX_OBJECT_SIZE;
pub use trace::{GcType, RefVisitor};
