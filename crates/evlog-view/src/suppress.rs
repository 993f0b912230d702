#![forbid(unsafe_code)]

//! Re-entrancy suppression for view callbacks.
//!
//! While the log pushes state into a view, the view fires its own
//! selection and expand/collapse signals. Those must not be taken for user
//! actions. A [`SuppressionFlag`] is shared between the sync layer and every
//! wrapped callback; the sync layer holds a [`SuppressionGuard`] for the
//! duration of each push and the callbacks drop whatever arrives meanwhile.
//!
//! ```ignore
//! let flag = SuppressionFlag::new();
//! {
//!     let _guard = flag.guard();
//!     assert!(flag.is_set());
//!     view.select(node)?; // signal fires, callback sees the flag, returns
//! }
//! assert!(!flag.is_set());
//! ```
//!
//! # Invariants
//!
//! 1. Guards nest: the flag stays set until the outermost guard drops.
//! 2. The flag is released on every exit path, including `?` and panics.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

/// Shared, nestable "push in progress" flag.
///
/// Cloning shares the same flag.
#[derive(Clone, Default)]
pub struct SuppressionFlag {
    depth: Rc<Cell<u32>>,
}

impl SuppressionFlag {
    /// Create a cleared flag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether any guard is alive.
    #[must_use]
    pub fn is_set(&self) -> bool {
        self.depth.get() > 0
    }

    /// Nesting depth of live guards.
    #[must_use]
    pub fn depth(&self) -> u32 {
        self.depth.get()
    }

    /// Set the flag until the returned guard drops.
    #[must_use = "the flag is cleared as soon as the guard drops"]
    pub fn guard(&self) -> SuppressionGuard {
        self.depth.set(self.depth.get() + 1);
        SuppressionGuard {
            depth: Rc::clone(&self.depth),
        }
    }
}

impl fmt::Debug for SuppressionFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SuppressionFlag")
            .field("depth", &self.depth.get())
            .finish()
    }
}

/// RAII guard returned by [`SuppressionFlag::guard`].
pub struct SuppressionGuard {
    depth: Rc<Cell<u32>>,
}

impl Drop for SuppressionGuard {
    fn drop(&mut self) {
        self.depth.set(self.depth.get().saturating_sub(1));
    }
}

impl fmt::Debug for SuppressionGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SuppressionGuard")
            .field("depth", &self.depth.get())
            .finish()
    }
}
