//! Shared state and signalling discipline common to both channel kinds.
//!
//! Everything here is `pub(crate)`: the public API lives in
//! [`crate::rendezvous`] and [`crate::bounded`], which both build on top of
//! the [`Inner`] defined in this module. Keeping the shared plumbing in one
//! place is what lets [`crate::select`] treat a sync and a bounded channel
//! identically — it only ever calls the methods below.

use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex, MutexGuard};

use crate::semaphore::Semaphore;

/// Kind-specific payload. A sync channel holds at most one in-flight value; a
/// bounded channel holds a FIFO queue under a fixed capacity.
pub(crate) enum Data<T> {
    Sync { value: Option<T> },
    Bounded { queue: VecDeque<T>, capacity: usize },
}

/// All mutable state for one channel, protected by `Inner::lock`.
pub(crate) struct State<T> {
    pub(crate) closed: bool,
    pub(crate) readers: usize,
    pub(crate) writers: usize,
    pub(crate) read_waiters: Vec<Arc<Semaphore>>,
    pub(crate) write_waiters: Vec<Arc<Semaphore>>,
    pub(crate) data: Data<T>,
}

/// Snapshot of recv-side readiness, as seen by the selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RecvReady {
    Ready,
    NotReady,
    ClosedEmpty,
}

/// Snapshot of send-side readiness, as seen by the selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SendReady {
    Ready,
    NotReady,
    Closed,
}

/// Shared channel state: one mutex, two condition variables, two waiter
/// registries. Both `rendezvous::Sender`/`Receiver` and
/// `bounded::Sender`/`Receiver` are thin wrappers around an `Arc<Inner<T>>`.
pub(crate) struct Inner<T> {
    pub(crate) state: Mutex<State<T>>,
    pub(crate) crd: Condvar,
    pub(crate) cwr: Condvar,
    /// Used only to make `log` records distinguishable; not part of the
    /// synchronization protocol.
    pub(crate) label: &'static str,
}

impl<T> State<T> {
    /// Takes the value that made [`Inner::has_messages_status`] report
    /// `Ready`, regardless of which channel kind is underneath. Used by the
    /// selector, which deliberately does not know or care which kind of
    /// channel a candidate wraps.
    pub(crate) fn take_ready_value(&mut self) -> T {
        match &mut self.data {
            Data::Sync { value } => value.take().expect("caller checked Ready"),
            Data::Bounded { queue, .. } => {
                queue.pop_front().expect("caller checked Ready")
            }
        }
    }

    /// Places a value that made [`Inner::has_free_capacity_status`] report
    /// `Ready`, regardless of channel kind.
    pub(crate) fn put_ready_value(&mut self, value: T) {
        match &mut self.data {
            Data::Sync { value: slot } => *slot = Some(value),
            Data::Bounded { queue, .. } => queue.push_back(value),
        }
    }
}

impl<T> Inner<T> {
    pub(crate) fn new_sync() -> Self {
        Inner {
            state: Mutex::new(State {
                closed: false,
                readers: 0,
                writers: 0,
                read_waiters: Vec::new(),
                write_waiters: Vec::new(),
                data: Data::Sync { value: None },
            }),
            crd: Condvar::new(),
            cwr: Condvar::new(),
            label: "sync",
        }
    }

    pub(crate) fn new_bounded(capacity: usize) -> Self {
        Inner {
            state: Mutex::new(State {
                closed: false,
                readers: 0,
                writers: 0,
                read_waiters: Vec::new(),
                write_waiters: Vec::new(),
                data: Data::Bounded {
                    queue: VecDeque::with_capacity(capacity),
                    capacity,
                },
            }),
            crd: Condvar::new(),
            cwr: Condvar::new(),
            label: "bounded",
        }
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, State<T>> {
        self.state.lock().unwrap()
    }

    /// Signal discipline: a new value became visible. Must be called with
    /// `state` held for the mutation that made it true.
    pub(crate) fn signal_readers(&self, state: &State<T>) {
        self.crd.notify_all();
        for sem in &state.read_waiters {
            sem.release();
        }
    }

    /// Signal discipline: capacity was freed (a value was consumed).
    pub(crate) fn signal_writers(&self, state: &State<T>) {
        self.cwr.notify_all();
        for sem in &state.write_waiters {
            sem.release();
        }
    }

    /// Signal discipline: the channel just transitioned to closed.
    pub(crate) fn signal_closed(&self, state: &State<T>) {
        self.crd.notify_all();
        self.cwr.notify_all();
        for sem in &state.read_waiters {
            sem.release();
        }
        for sem in &state.write_waiters {
            sem.release();
        }
    }

    /// Sets `closed = true` if not already set. Returns `true` iff this call
    /// performed the transition (idempotence guard).
    pub(crate) fn mark_closed(&self, state: &mut State<T>) -> bool {
        if state.closed {
            return false;
        }
        state.closed = true;
        self.signal_closed(state);
        log::debug!("{} channel closed", self.label);
        true
    }

    pub(crate) fn has_messages_status(state: &State<T>) -> RecvReady {
        let has_value = match &state.data {
            Data::Sync { value } => value.is_some(),
            Data::Bounded { queue, .. } => !queue.is_empty(),
        };
        if has_value {
            RecvReady::Ready
        } else if state.closed {
            RecvReady::ClosedEmpty
        } else {
            RecvReady::NotReady
        }
    }

    pub(crate) fn has_free_capacity_status(state: &State<T>) -> SendReady {
        if state.closed {
            return SendReady::Closed;
        }
        let has_capacity = match &state.data {
            Data::Sync { value } => {
                value.is_none() && (state.readers > 0 || !state.read_waiters.is_empty())
            }
            Data::Bounded { queue, capacity } => queue.len() < *capacity,
        };
        if has_capacity {
            SendReady::Ready
        } else {
            SendReady::NotReady
        }
    }

    /// Selector hook: if no message is available, register `sem` as a reader
    /// waiter and return `false`. Otherwise (ready, or closed-and-empty)
    /// return `true` without registering — the selector commits either way.
    pub(crate) fn if_empty_add_reader_waiter(&self, sem: &Arc<Semaphore>) -> bool {
        let mut state = self.lock();
        match Self::has_messages_status(&state) {
            RecvReady::NotReady => {
                state.read_waiters.push(sem.clone());
                false
            }
            RecvReady::Ready | RecvReady::ClosedEmpty => true,
        }
    }

    /// Selector hook: symmetric for send readiness. A closed channel is
    /// permanently non-ready on the send side — it is never registered (it
    /// will never gain capacity to signal) and never reported as having
    /// "become ready" the way `Ready` does; the selector simply keeps
    /// treating it as a candidate that will never commit.
    pub(crate) fn if_full_add_writer_waiter(&self, sem: &Arc<Semaphore>) -> bool {
        let mut state = self.lock();
        match Self::has_free_capacity_status(&state) {
            SendReady::NotReady => {
                state.write_waiters.push(sem.clone());
                false
            }
            SendReady::Ready => true,
            SendReady::Closed => false,
        }
    }

    pub(crate) fn del_reader_waiter(&self, sem: &Arc<Semaphore>) {
        let mut state = self.lock();
        state.read_waiters.retain(|s| !Arc::ptr_eq(s, sem));
    }

    pub(crate) fn del_writer_waiter(&self, sem: &Arc<Semaphore>) {
        let mut state = self.lock();
        state.write_waiters.retain(|s| !Arc::ptr_eq(s, sem));
    }

    pub(crate) fn is_closed(&self) -> bool {
        let state = self.lock();
        state.closed && Self::has_messages_status(&state) == RecvReady::ClosedEmpty
    }
}
