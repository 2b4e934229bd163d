use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Single-entry reentrancy lock for one `execute` entry point.
///
/// Clones share the same lock state, so router values cloned from one another
/// model the same entry point. The guard releases on drop, covering every exit
/// path.
#[derive(Clone, Debug, Default)]
pub struct ReentrancyLock {
    held: Arc<AtomicBool>,
}

impl ReentrancyLock {
    pub fn new() -> Self {
        ReentrancyLock::default()
    }

    /// Acquire the lock, or `None` if a batch is already executing.
    pub fn enter(&self) -> Option<LockGuard> {
        self.held
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Acquire)
            .ok()
            .map(|_| LockGuard {
                held: Arc::clone(&self.held),
            })
    }

    pub fn is_held(&self) -> bool {
        self.held.load(Ordering::Acquire)
    }
}

pub struct LockGuard {
    held: Arc<AtomicBool>,
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        self.held.store(false, Ordering::Release);
    }
}
