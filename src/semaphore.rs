use std::sync::{Condvar, Mutex};
use std::time::{Duration, Instant};

/// A single-permit notification object that a [`Select`](crate::select::Select)
/// parks on while it waits across several channels at once.
///
/// Any channel the selector has registered with can [`release`](Semaphore::release)
/// it; the selector doesn't care *which* channel changed, only that *something*
/// did. Permits saturate at one: a burst of releases while nobody is parked
/// still only wakes the next `acquire` once, which is exactly the "go re-scan
/// everything" signal the selector needs.
#[derive(Debug, Default)]
pub(crate) struct Semaphore {
    permits: Mutex<usize>,
    available: Condvar,
}

impl Semaphore {
    pub(crate) fn new() -> Self {
        Semaphore {
            permits: Mutex::new(0),
            available: Condvar::new(),
        }
    }

    /// Releases one permit, waking at most one parked `acquire`. Saturates at
    /// one pending permit; callers only need an edge, not a count.
    pub(crate) fn release(&self) {
        let mut permits = self.permits.lock().unwrap();
        if *permits == 0 {
            *permits = 1;
            self.available.notify_one();
        }
    }

    /// Blocks until a permit is available, then consumes it.
    pub(crate) fn acquire(&self) {
        let mut permits = self.permits.lock().unwrap();
        while *permits == 0 {
            permits = self.available.wait(permits).unwrap();
        }
        *permits = 0;
    }

    /// Blocks until a permit is available or `deadline` passes. Returns `true`
    /// iff a permit was consumed.
    pub(crate) fn acquire_until(&self, deadline: Instant) -> bool {
        let mut permits = self.permits.lock().unwrap();
        loop {
            if *permits != 0 {
                *permits = 0;
                return true;
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            let (guard, timeout) = self
                .available
                .wait_timeout(permits, deadline - now)
                .unwrap();
            permits = guard;
            if timeout.timed_out() && *permits == 0 {
                return false;
            }
        }
    }

    /// Non-blocking: consumes a permit iff one is already available.
    pub(crate) fn try_acquire(&self) -> bool {
        let mut permits = self.permits.lock().unwrap();
        if *permits != 0 {
            *permits = 0;
            true
        } else {
            false
        }
    }
}

/// Computes a deadline from "now" when `timeout` names a finite wait, or
/// `None` for an infinite wait.
pub(crate) fn deadline_from(timeout: Option<Duration>) -> Option<Instant> {
    timeout.map(|d| Instant::now() + d)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn release_before_acquire_is_not_lost() {
        let sem = Semaphore::new();
        sem.release();
        sem.acquire();
    }

    #[test]
    fn acquire_blocks_until_released() {
        let sem = Arc::new(Semaphore::new());
        let sem2 = sem.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            sem2.release();
        });
        sem.acquire();
        handle.join().unwrap();
    }

    #[test]
    fn acquire_until_times_out() {
        let sem = Semaphore::new();
        let ok = sem.acquire_until(Instant::now() + Duration::from_millis(20));
        assert!(!ok);
    }

    #[test]
    fn try_acquire_is_non_blocking() {
        let sem = Semaphore::new();
        assert!(!sem.try_acquire());
        sem.release();
        assert!(sem.try_acquire());
        assert!(!sem.try_acquire());
    }
}
