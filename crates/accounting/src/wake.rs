use std::sync::Arc;

use crate::types::Result;

/// Keeps the platform from suspending sensor delivery while held.
pub trait WakeLock: Send + Sync {
    fn acquire(&self) -> Result<()>;
    fn release(&self);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopWakeLock;

impl WakeLock for NoopWakeLock {
    fn acquire(&self) -> Result<()> {
        Ok(())
    }

    fn release(&self) {}
}

/// Held wake lock; released exactly once when dropped.
pub struct WakeGuard {
    lock: Arc<dyn WakeLock>,
}

impl WakeGuard {
    pub fn acquire(lock: Arc<dyn WakeLock>) -> Result<Self> {
        lock.acquire()?;
        Ok(Self { lock })
    }
}

impl Drop for WakeGuard {
    fn drop(&mut self) {
        self.lock.release();
    }
}
