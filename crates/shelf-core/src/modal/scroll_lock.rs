//! Background scroll lock
//!
//! A single shared flag that the grid consults before scrolling. Engaging
//! and releasing are idempotent; clones observe the same flag.

use std::cell::Cell;
use std::rc::Rc;

/// Shared "background scroll disabled" flag
#[derive(Debug, Clone, Default)]
pub struct ScrollLock {
    engaged: Rc<Cell<bool>>,
}

impl ScrollLock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn engage(&self) {
        self.engaged.set(true);
    }

    pub fn release(&self) {
        self.engaged.set(false);
    }

    pub fn is_engaged(&self) -> bool {
        self.engaged.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idempotent_and_shared() {
        let lock = ScrollLock::new();
        let observer = lock.clone();

        lock.engage();
        lock.engage();
        assert!(observer.is_engaged());

        lock.release();
        lock.release();
        assert!(!observer.is_engaged());
    }
}
