use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

/// At-most-one-in-flight flag for writes of one document kind.
///
/// A second attempt while a permit is outstanding is refused, not queued.
#[derive(Debug, Clone, Default)]
pub struct SaveGuard {
    in_flight: Arc<AtomicBool>,
}

impl SaveGuard {
    pub fn try_acquire(&self) -> Option<SavePermit> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| SavePermit {
                in_flight: Arc::clone(&self.in_flight),
            })
    }

    pub fn is_saving(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }
}

/// Clears its guard when dropped, whether the save succeeded or not.
#[derive(Debug)]
pub struct SavePermit {
    in_flight: Arc<AtomicBool>,
}

impl Drop for SavePermit {
    fn drop(&mut self) {
        self.in_flight.store(false, Ordering::Release);
    }
}
