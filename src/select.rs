//! Multi-way selection over `recv` and `send` candidates drawn from
//! [`crate::rendezvous`] and [`crate::bounded`] handles, mixed freely.
//!
//! ```
//! use handoff::{sync_channel, Select};
//!
//! let (tx, rx) = sync_channel::<i32>();
//! std::thread::spawn(move || { tx.send(7).ok(); });
//! let got = Select::new()
//!     .recv(&rx, |v| v)
//!     .select()
//!     .unwrap();
//! assert_eq!(got, 7);
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::bounded;
use crate::base::{Inner, RecvReady, SendReady};
use crate::semaphore::{deadline_from, Semaphore};
use crate::rendezvous;

/// Seeds the starting scan index of each independent `select()`/`try_select()`
/// call. Candidates rotate *within* one blocked call already (see `run`), but
/// callers can't reuse a `Select` across loop iterations — it's consumed by
/// value — so without a seed that survives past one `run()`, a candidate that
/// is always first in the list and always ready would win every call. A
/// process-wide counter gives round-robin fairness across that idiomatic
/// "build a fresh `Select` each iteration" calling convention instead.
static SCAN_SEED: AtomicUsize = AtomicUsize::new(0);

/// The result of a completed [`Select`].
pub enum SelectOutcome<R> {
    /// A candidate was ready; this is its handler's return value.
    Done(R),
    /// The recv candidate at this index is closed and drained, reported
    /// rather than silently skipped. A closed send candidate never produces
    /// this outcome: per spec it is permanently non-ready and effectively
    /// removed from consideration instead of ending the select.
    Closed(usize),
}

impl<R> SelectOutcome<R> {
    /// Returns the handler result, panicking if the outcome was a closure
    /// report. Convenient when the caller knows none of its candidates can
    /// close (e.g. channels it owns exclusively and never closes mid-select).
    pub fn unwrap(self) -> R {
        match self {
            SelectOutcome::Done(value) => value,
            SelectOutcome::Closed(index) => {
                panic!("select: candidate {} closed instead of producing a value", index)
            }
        }
    }
}

/// A single candidate operation tracked by [`Select`]. Type-erased over its
/// channel's element type and its handler's closure type so that recv and
/// send candidates over unrelated `T`s can share one list.
trait Candidate<R> {
    /// Attempts to commit this candidate right now, locking only its own
    /// channel. Returns `None` if not ready.
    fn try_commit(&mut self) -> Option<SelectOutcome<R>>;
    /// Registers `sem` as a waiter on this candidate's channel. Returns
    /// `true` if the candidate turned out to be ready while registering
    /// (caller should not park, and should unregister whatever else it
    /// already registered this round). A send candidate that is closed
    /// registers nothing and returns `false`: it will never become ready,
    /// so it is simply left out of the wait instead of forcing a re-scan.
    fn register(&self, sem: &Arc<Semaphore>) -> bool;
    fn unregister(&self, sem: &Arc<Semaphore>);
}

struct RecvCandidate<T, R> {
    receiver_inner: Arc<Inner<T>>,
    handler: Option<Box<dyn FnOnce(T) -> R>>,
    index: usize,
}

impl<T, R> Candidate<R> for RecvCandidate<T, R> {
    fn try_commit(&mut self) -> Option<SelectOutcome<R>> {
        let mut state = self.receiver_inner.lock();
        match Inner::has_messages_status(&state) {
            RecvReady::Ready => {
                let value = state.take_ready_value();
                self.receiver_inner.signal_writers(&state);
                drop(state);
                let handler = self.handler.take().expect("candidate commits at most once");
                Some(SelectOutcome::Done(handler(value)))
            }
            RecvReady::ClosedEmpty => Some(SelectOutcome::Closed(self.index)),
            RecvReady::NotReady => None,
        }
    }

    fn register(&self, sem: &Arc<Semaphore>) -> bool {
        self.receiver_inner.if_empty_add_reader_waiter(sem)
    }

    fn unregister(&self, sem: &Arc<Semaphore>) {
        self.receiver_inner.del_reader_waiter(sem)
    }
}

struct SendCandidate<T, R> {
    sender_inner: Arc<Inner<T>>,
    value: Option<T>,
    handler: Option<Box<dyn FnOnce() -> R>>,
    index: usize,
}

impl<T, R> Candidate<R> for SendCandidate<T, R> {
    fn try_commit(&mut self) -> Option<SelectOutcome<R>> {
        let mut state = self.sender_inner.lock();
        match Inner::has_free_capacity_status(&state) {
            SendReady::Ready => {
                let value = self.value.take().expect("candidate commits at most once");
                state.put_ready_value(value);
                self.sender_inner.signal_readers(&state);
                drop(state);
                let handler = self.handler.take().expect("candidate commits at most once");
                Some(SelectOutcome::Done(handler()))
            }
            // A closed send candidate never commits and never ends the
            // select; it just permanently loses to whatever else is live.
            SendReady::Closed | SendReady::NotReady => None,
        }
    }

    fn register(&self, sem: &Arc<Semaphore>) -> bool {
        self.sender_inner.if_full_add_writer_waiter(sem)
    }

    fn unregister(&self, sem: &Arc<Semaphore>) {
        self.sender_inner.del_writer_waiter(sem)
    }
}

/// Builds a list of candidate `recv`/`send` operations, then waits until
/// exactly one of them is ready and commits to it.
///
/// Candidates are tried in round-robin order, both across repeated retries
/// within one blocked call and across independent `select()` calls (a fresh
/// `Select` is the normal way to loop, since the builder is consumed by
/// value), so that under steady readiness no candidate starves (see the
/// fairness property in the crate-level docs).
pub struct Select<R> {
    candidates: Vec<Box<dyn Candidate<R>>>,
}

impl<R> Default for Select<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> Select<R> {
    pub fn new() -> Self {
        Select { candidates: Vec::new() }
    }

    /// Adds a recv candidate on a rendezvous channel.
    pub fn recv<T: 'static>(
        mut self,
        receiver: &rendezvous::Receiver<T>,
        handler: impl FnOnce(T) -> R + 'static,
    ) -> Self {
        let index = self.candidates.len();
        self.candidates.push(Box::new(RecvCandidate {
            receiver_inner: receiver.inner().clone(),
            handler: Some(Box::new(handler)),
            index,
        }));
        self
    }

    /// Adds a send candidate on a rendezvous channel.
    pub fn send<T: 'static>(
        mut self,
        sender: &rendezvous::Sender<T>,
        value: T,
        handler: impl FnOnce() -> R + 'static,
    ) -> Self {
        let index = self.candidates.len();
        self.candidates.push(Box::new(SendCandidate {
            sender_inner: sender.inner().clone(),
            value: Some(value),
            handler: Some(Box::new(handler)),
            index,
        }));
        self
    }

    /// Adds a recv candidate on a bounded channel.
    pub fn recv_bounded<T: 'static>(
        mut self,
        receiver: &bounded::Receiver<T>,
        handler: impl FnOnce(T) -> R + 'static,
    ) -> Self {
        let index = self.candidates.len();
        self.candidates.push(Box::new(RecvCandidate {
            receiver_inner: receiver.inner().clone(),
            handler: Some(Box::new(handler)),
            index,
        }));
        self
    }

    /// Adds a send candidate on a bounded channel.
    pub fn send_bounded<T: 'static>(
        mut self,
        sender: &bounded::Sender<T>,
        value: T,
        handler: impl FnOnce() -> R + 'static,
    ) -> Self {
        let index = self.candidates.len();
        self.candidates.push(Box::new(SendCandidate {
            sender_inner: sender.inner().clone(),
            value: Some(value),
            handler: Some(Box::new(handler)),
            index,
        }));
        self
    }

    /// Blocks until one candidate commits.
    pub fn select(self) -> SelectOutcome<R> {
        assert!(!self.candidates.is_empty(), "select: at least one candidate is required");
        self.run(None).expect("a select with no deadline always resolves")
    }

    /// Non-blocking: commits immediately if a candidate is ready, else `None`.
    pub fn try_select(self) -> Option<SelectOutcome<R>> {
        if self.candidates.is_empty() {
            return None;
        }
        self.run(Some(Duration::ZERO))
    }

    /// Bounded wait: commits within `timeout`, else `None`.
    pub fn try_select_timeout(self, timeout: Duration) -> Option<SelectOutcome<R>> {
        if self.candidates.is_empty() {
            return None;
        }
        self.run(Some(timeout))
    }

    fn run(mut self, timeout: Option<Duration>) -> Option<SelectOutcome<R>> {
        let deadline = deadline_from(timeout);
        let n = self.candidates.len();
        let sem = Arc::new(Semaphore::new());
        let mut start = SCAN_SEED.fetch_add(1, Ordering::Relaxed) % n;

        loop {
            for offset in 0..n {
                let i = (start + offset) % n;
                if let Some(outcome) = self.candidates[i].try_commit() {
                    log::trace!("select: candidate {} committed", i);
                    return Some(outcome);
                }
            }

            if let Some(dl) = deadline {
                if Instant::now() >= dl {
                    return None;
                }
            }

            let mut registered: Vec<usize> = Vec::with_capacity(n);
            let mut became_ready = false;
            for i in 0..n {
                if self.candidates[i].register(&sem) {
                    became_ready = true;
                    for &j in &registered {
                        self.candidates[j].unregister(&sem);
                    }
                    registered.clear();
                    break;
                }
                registered.push(i);
            }

            if became_ready {
                start = (start + 1) % n;
                continue;
            }

            let woke = match deadline {
                None => {
                    sem.acquire();
                    true
                }
                Some(dl) => sem.acquire_until(dl),
            };

            for &j in &registered {
                self.candidates[j].unregister(&sem);
            }

            if !woke {
                return None;
            }

            start = (start + 1) % n;
        }
    }
}
