//! Fault injection for in-memory adapters
//!
//! Lets tests simulate an unreachable store or a write failure partway
//! through a multi-step operation.

use parking_lot::Mutex;
use shared_types::StoreError;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::ports::StoreResult;

#[derive(Debug, Default)]
pub struct FaultSwitch {
    unavailable: AtomicBool,
    /// Remaining writes allowed before every write fails.
    write_budget: Mutex<Option<usize>>,
}

impl FaultSwitch {
    /// Fail every read and write until cleared.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Allow `n` more writes, then fail writes until cleared.
    pub fn fail_writes_after(&self, n: usize) {
        *self.write_budget.lock() = Some(n);
    }

    pub fn clear(&self) {
        self.set_unavailable(false);
        *self.write_budget.lock() = None;
    }

    pub(crate) fn check_read(&self) -> StoreResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("store offline".to_string()));
        }
        Ok(())
    }

    pub(crate) fn check_write(&self) -> StoreResult<()> {
        self.check_read()?;
        let mut budget = self.write_budget.lock();
        match budget.as_mut() {
            Some(0) => Err(StoreError::WriteFailed("injected write failure".to_string())),
            Some(remaining) => {
                *remaining -= 1;
                Ok(())
            }
            None => Ok(()),
        }
    }
}
