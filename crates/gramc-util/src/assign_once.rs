//! Write-once cell for pass-computed properties.

use std::cell::OnceCell;
use std::fmt;

/// A slot assigned exactly once, typically by a later compiler pass.
///
/// Reading an unset slot or assigning a set slot is a programming error and
/// panics. This is deliberately not a lazy cell: the value is never
/// recomputed, only installed.
pub struct AssignOnce<T> {
    cell: OnceCell<T>,
}

impl<T> AssignOnce<T> {
    pub const fn new() -> AssignOnce<T> {
        AssignOnce {
            cell: OnceCell::new(),
        }
    }

    /// Installs the value. Panics if a value was already installed.
    pub fn set(&self, value: T) {
        if self.cell.set(value).is_err() {
            panic!("write-once slot assigned twice");
        }
    }

    /// Reads the value. Panics if no value was installed.
    pub fn get(&self) -> &T {
        self.cell.get().expect("write-once slot read before assignment")
    }

    /// Reads the value if one was installed.
    pub fn get_opt(&self) -> Option<&T> {
        self.cell.get()
    }

    pub fn is_set(&self) -> bool {
        self.cell.get().is_some()
    }
}

impl<T: Copy> AssignOnce<T> {
    /// Copies the value out. Panics if no value was installed.
    pub fn value(&self) -> T {
        *self.get()
    }
}

impl<T> Default for AssignOnce<T> {
    fn default() -> Self {
        AssignOnce::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for AssignOnce<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.cell.get() {
            Some(value) => f.debug_tuple("AssignOnce").field(value).finish(),
            None => f.write_str("AssignOnce(<unset>)"),
        }
    }
}
