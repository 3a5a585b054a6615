//! gramc-platform - Platform Capability Interfaces
//!
//! Thin capability wrappers over the host platform, used by the runtime
//! sample and the garbage collector:
//!
//! - [`time`]: monotonic tick counter, wall-clock milliseconds and
//!   broken-down local time.
//! - [`fs`]: path manipulation, directory listing and whole-file I/O.
//! - [`socket`]: blocking TCP with per-socket timeouts.
//!
//! Every operation reports failures as a [`PlatformError`] carrying the OS
//! error code (when one exists) and a message.

pub mod error;
pub mod fs;
pub mod socket;
pub mod time;

pub use error::{PlatformError, Result};
pub use time::{Tick, GC_SYNC_INTERVAL};
