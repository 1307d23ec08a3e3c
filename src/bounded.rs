//! Bounded, FIFO buffered channel. `send` blocks only when the queue is at
//! capacity; `recv` blocks only when the queue is empty.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::base::{Data, Inner, RecvReady, SendReady, State};
use crate::error::{InvalidCapacityError, RecvError, SendError, TrySendError, TrySendErrorKind};

fn queue_len<T>(state: &State<T>) -> usize {
    match &state.data {
        Data::Bounded { queue, .. } => queue.len(),
        Data::Sync { .. } => unreachable!("bounded_channel always holds Data::Bounded"),
    }
}

fn queue_capacity<T>(state: &State<T>) -> usize {
    match &state.data {
        Data::Bounded { capacity, .. } => *capacity,
        Data::Sync { .. } => unreachable!("bounded_channel always holds Data::Bounded"),
    }
}

fn push_value<T>(state: &mut State<T>, value: T) {
    match &mut state.data {
        Data::Bounded { queue, .. } => queue.push_back(value),
        Data::Sync { .. } => unreachable!("bounded_channel always holds Data::Bounded"),
    }
}

fn pop_value<T>(state: &mut State<T>) -> T {
    match &mut state.data {
        Data::Bounded { queue, .. } => queue
            .pop_front()
            .expect("caller checked the queue was non-empty"),
        Data::Sync { .. } => unreachable!("bounded_channel always holds Data::Bounded"),
    }
}

/// The sending half of a bounded channel. Cloneable: any number of threads
/// may share a `Sender`.
pub struct Sender<T> {
    pub(crate) inner: Arc<Inner<T>>,
}

/// The receiving half of a bounded channel. Cloneable: any number of threads
/// may share a `Receiver`.
pub struct Receiver<T> {
    pub(crate) inner: Arc<Inner<T>>,
}

impl<T> Clone for Sender<T> {
    fn clone(&self) -> Self {
        Sender { inner: self.inner.clone() }
    }
}

impl<T> Clone for Receiver<T> {
    fn clone(&self) -> Self {
        Receiver { inner: self.inner.clone() }
    }
}

/// Creates a bounded (FIFO) channel with the given positive capacity.
pub fn bounded_channel<T>(capacity: usize) -> Result<(Sender<T>, Receiver<T>), InvalidCapacityError> {
    if capacity == 0 {
        return Err(InvalidCapacityError::new());
    }
    let inner = Arc::new(Inner::new_bounded(capacity));
    Ok((Sender { inner: inner.clone() }, Receiver { inner }))
}

impl<T> Sender<T> {
    /// Blocks until `value` is enqueued, or the channel closes.
    pub fn send(&self, value: T) -> Result<(), SendError<T>> {
        let mut state = self.inner.lock();
        if state.closed {
            return Err(SendError::new(value));
        }
        state = self
            .inner
            .cwr
            .wait_while(state, |s| !s.closed && queue_len(s) >= queue_capacity(s))
            .unwrap();
        if state.closed {
            return Err(SendError::new(value));
        }
        push_value(&mut state, value);
        self.inner.signal_readers(&state);
        Ok(())
    }

    /// Non-blocking: succeeds only if the queue has free capacity right now.
    pub fn try_send(&self, value: T) -> Result<(), TrySendError<T>> {
        let mut state = self.inner.lock();
        match Inner::has_free_capacity_status(&state) {
            SendReady::Closed => Err(TrySendError::new(TrySendErrorKind::Closed, value)),
            SendReady::NotReady => Err(TrySendError::new(TrySendErrorKind::Full, value)),
            SendReady::Ready => {
                push_value(&mut state, value);
                self.inner.signal_readers(&state);
                Ok(())
            }
        }
    }

    /// Bounded wait variant. `Duration::ZERO` behaves like
    /// [`try_send`](Self::try_send); `None` waits as long as
    /// [`send`](Self::send) but returns a `Closed` error instead of raising.
    pub fn try_send_timeout(
        &self,
        value: T,
        timeout: Option<Duration>,
    ) -> Result<(), TrySendError<T>> {
        match timeout {
            None => self
                .send(value)
                .map_err(|e| TrySendError::new(TrySendErrorKind::Closed, e.into_inner())),
            Some(d) if d.is_zero() => self.try_send(value),
            Some(d) => {
                let deadline = Instant::now() + d;
                let mut state = self.inner.lock();
                loop {
                    match Inner::has_free_capacity_status(&state) {
                        SendReady::Closed => {
                            return Err(TrySendError::new(TrySendErrorKind::Closed, value))
                        }
                        SendReady::Ready => {
                            push_value(&mut state, value);
                            self.inner.signal_readers(&state);
                            return Ok(());
                        }
                        SendReady::NotReady => {
                            let now = Instant::now();
                            if now >= deadline {
                                return Err(TrySendError::new(TrySendErrorKind::Full, value));
                            }
                            let (guard, _) =
                                self.inner.cwr.wait_timeout(state, deadline - now).unwrap();
                            state = guard;
                        }
                    }
                }
            }
        }
    }

    /// Closes the channel. Idempotent: a second call is a no-op.
    pub fn close(&self) {
        close_shared(&self.inner)
    }

    pub fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }
}

impl<T> Receiver<T> {
    /// Blocks until a value is available, or the channel closes with the
    /// queue drained.
    pub fn recv(&self) -> Result<T, RecvError> {
        let mut state = self.inner.lock();
        state.readers += 1;
        state = self
            .inner
            .crd
            .wait_while(state, |s| !s.closed && queue_len(s) == 0)
            .unwrap();
        if state.closed && queue_len(&state) == 0 {
            state.readers -= 1;
            return Err(RecvError::new());
        }
        let value = pop_value(&mut state);
        self.inner.signal_writers(&state);
        state.readers -= 1;
        Ok(value)
    }

    /// Non-blocking: returns a value only if the queue is non-empty right now.
    pub fn try_recv(&self) -> Option<T> {
        let mut state = self.inner.lock();
        match Inner::has_messages_status(&state) {
            RecvReady::Ready => {
                let value = pop_value(&mut state);
                self.inner.signal_writers(&state);
                Some(value)
            }
            RecvReady::NotReady | RecvReady::ClosedEmpty => None,
        }
    }

    /// Bounded wait variant. `Duration::ZERO` behaves like
    /// [`try_recv`](Self::try_recv); `None` waits as long as
    /// [`recv`](Self::recv) but returns `None` on closure instead of raising.
    pub fn try_recv_timeout(&self, timeout: Option<Duration>) -> Option<T> {
        match timeout {
            None => self.recv().ok(),
            Some(d) if d.is_zero() => self.try_recv(),
            Some(d) => {
                let deadline = Instant::now() + d;
                let mut state = self.inner.lock();
                state.readers += 1;
                loop {
                    match Inner::has_messages_status(&state) {
                        RecvReady::Ready => {
                            let value = pop_value(&mut state);
                            self.inner.signal_writers(&state);
                            state.readers -= 1;
                            return Some(value);
                        }
                        RecvReady::ClosedEmpty => {
                            state.readers -= 1;
                            return None;
                        }
                        RecvReady::NotReady => {
                            let now = Instant::now();
                            if now >= deadline {
                                state.readers -= 1;
                                return None;
                            }
                            let (guard, _) =
                                self.inner.crd.wait_timeout(state, deadline - now).unwrap();
                            state = guard;
                        }
                    }
                }
            }
        }
    }

    /// Closes the channel. Idempotent: a second call is a no-op.
    pub fn close(&self) {
        close_shared(&self.inner)
    }

    pub fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }
}

fn close_shared<T>(inner: &Arc<Inner<T>>) {
    let mut state = inner.lock();
    inner.mark_closed(&mut state);
}

impl<T> Sender<T> {
    pub(crate) fn inner(&self) -> &Arc<Inner<T>> {
        &self.inner
    }
}

impl<T> Receiver<T> {
    pub(crate) fn inner(&self) -> &Arc<Inner<T>> {
        &self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fifo_order_is_preserved() {
        let (tx, rx) = bounded_channel::<i32>(4).unwrap();
        for i in 0..4 {
            tx.try_send(i).unwrap();
        }
        for i in 0..4 {
            assert_eq!(rx.try_recv(), Some(i));
        }
    }

    #[test]
    fn zero_capacity_is_rejected() {
        assert!(bounded_channel::<i32>(0).is_err());
    }

    #[test]
    fn try_send_fails_once_full() {
        let (tx, _rx) = bounded_channel::<i32>(2).unwrap();
        tx.try_send(1).unwrap();
        tx.try_send(2).unwrap();
        assert!(tx.try_send(3).unwrap_err().is_full());
    }

    #[test]
    fn draining_after_close_then_fails() {
        let (tx, rx) = bounded_channel::<i32>(8).unwrap();
        tx.try_send(1).unwrap();
        tx.try_send(2).unwrap();
        tx.try_send(3).unwrap();
        tx.close();
        assert_eq!(rx.recv().unwrap(), 1);
        assert_eq!(rx.recv().unwrap(), 2);
        assert_eq!(rx.recv().unwrap(), 3);
        assert!(rx.recv().is_err());
    }

    #[test]
    fn try_send_timeout_times_out_on_full() {
        let (tx, _rx) = bounded_channel::<i32>(1).unwrap();
        tx.try_send(1).unwrap();
        let started = Instant::now();
        let err = tx
            .try_send_timeout(2, Some(Duration::from_millis(50)))
            .unwrap_err();
        assert!(err.is_full());
        assert!(started.elapsed() >= Duration::from_millis(50));
    }

    #[test]
    fn send_after_close_fails() {
        let (tx, _rx) = bounded_channel::<i32>(1).unwrap();
        tx.close();
        assert!(tx.send(1).is_err());
    }
}
