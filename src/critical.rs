//! Critical sections
//!
//! Raw flash operations must not be interleaved with interrupt-driven
//! access to the same bus. `CriticalSection` masks interrupts for its
//! lifetime and unmasks them on drop, so every exit path re-enables them.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Host facility for masking preemption
pub trait InterruptMask {
    /// Disable interrupts
    fn disable(&self);

    /// Re-enable interrupts
    fn enable(&self);
}

/// Mask for hosts with nothing to disable
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopMask;

impl InterruptMask for NoopMask {
    fn disable(&self) {}

    fn enable(&self) {}
}

/// Mask that records how often it was toggled
///
/// Clones share counters.
#[derive(Debug, Default, Clone)]
pub struct CountingMask {
    disables: Arc<AtomicUsize>,
    enables: Arc<AtomicUsize>,
}

impl CountingMask {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `disable` calls
    pub fn disables(&self) -> usize {
        self.disables.load(Ordering::SeqCst)
    }

    /// Number of `enable` calls
    pub fn enables(&self) -> usize {
        self.enables.load(Ordering::SeqCst)
    }

    /// True when every disable has been matched by an enable
    pub fn is_balanced(&self) -> bool {
        self.disables() == self.enables()
    }
}

impl InterruptMask for CountingMask {
    fn disable(&self) {
        self.disables.fetch_add(1, Ordering::SeqCst);
    }

    fn enable(&self) {
        self.enables.fetch_add(1, Ordering::SeqCst);
    }
}

/// RAII guard: interrupts stay masked while it lives
#[must_use = "interrupts are re-enabled as soon as the guard is dropped"]
pub struct CriticalSection<'a, M: InterruptMask + ?Sized> {
    mask: &'a M,
}

impl<'a, M: InterruptMask + ?Sized> CriticalSection<'a, M> {
    /// Mask interrupts until the returned guard is dropped
    pub fn enter(mask: &'a M) -> Self {
        mask.disable();
        Self { mask }
    }
}

impl<M: InterruptMask + ?Sized> Drop for CriticalSection<'_, M> {
    fn drop(&mut self) {
        self.mask.enable();
    }
}
