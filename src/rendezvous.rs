//! Zero-buffer rendezvous channel: `send` and `recv` hand a value directly
//! from one thread to another. At most one value is ever in flight.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::base::{Data, Inner, RecvReady, SendReady, State};
use crate::error::{RecvError, SendError, TrySendError, TrySendErrorKind};

fn value_present<T>(state: &State<T>) -> bool {
    match &state.data {
        Data::Sync { value } => value.is_some(),
        Data::Bounded { .. } => unreachable!("sync_channel always holds Data::Sync"),
    }
}

fn put_value<T>(state: &mut State<T>, value: T) {
    match &mut state.data {
        Data::Sync { value: slot } => *slot = Some(value),
        Data::Bounded { .. } => unreachable!("sync_channel always holds Data::Sync"),
    }
}

fn take_value<T>(state: &mut State<T>) -> T {
    match &mut state.data {
        Data::Sync { value } => value.take().expect("caller checked a value was present"),
        Data::Bounded { .. } => unreachable!("sync_channel always holds Data::Sync"),
    }
}

/// The sending half of a rendezvous channel. Cloneable: any number of threads
/// may share a `Sender`.
pub struct Sender<T> {
    pub(crate) inner: Arc<Inner<T>>,
}

/// The receiving half of a rendezvous channel. Cloneable: any number of
/// threads may share a `Receiver`.
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

/// Creates a rendezvous (zero-capacity) channel. A `send` blocks until a
/// `recv` is ready to take the value (or the channel closes).
pub fn sync_channel<T>() -> (Sender<T>, Receiver<T>) {
    let inner = Arc::new(Inner::new_sync());
    (Sender { inner: inner.clone() }, Receiver { inner })
}

impl<T> Sender<T> {
    /// Blocks until `value` is handed to a receiver, or the channel closes.
    pub fn send(&self, value: T) -> Result<(), SendError<T>> {
        let mut state = self.inner.lock();
        if state.closed {
            return Err(SendError::new(value));
        }
        state.writers += 1;
        state = self
            .inner
            .cwr
            .wait_while(state, |s| !s.closed && value_present(s))
            .unwrap();
        if state.closed {
            state.writers -= 1;
            return Err(SendError::new(value));
        }
        put_value(&mut state, value);
        self.inner.signal_readers(&state);

        state = self
            .inner
            .cwr
            .wait_while(state, |s| value_present(s) && !s.closed)
            .unwrap();
        self.inner.signal_writers(&state);
        state.writers -= 1;
        Ok(())
    }

    /// Non-blocking: succeeds only if a receiver is already parked (or
    /// registered via a selector) waiting to take a value right now.
    pub fn try_send(&self, value: T) -> Result<(), TrySendError<T>> {
        let mut state = self.inner.lock();
        match Inner::has_free_capacity_status(&state) {
            SendReady::Closed => Err(TrySendError::new(TrySendErrorKind::Closed, value)),
            SendReady::NotReady => Err(TrySendError::new(TrySendErrorKind::Full, value)),
            SendReady::Ready => {
                put_value(&mut state, value);
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
                            put_value(&mut state, value);
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

    /// Closes the channel. Idempotent: a second call is a no-op. Blocks
    /// briefly if a value is currently in flight, until a receiver takes it.
    pub fn close(&self) {
        close_shared(&self.inner)
    }

    pub fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }
}

impl<T> Receiver<T> {
    /// Blocks until a value is available, or the channel closes with nothing
    /// left to deliver.
    pub fn recv(&self) -> Result<T, RecvError> {
        let mut state = self.inner.lock();
        state.readers += 1;
        if !state.closed && !value_present(&state) {
            self.inner.signal_writers(&state);
        }
        state = self
            .inner
            .crd
            .wait_while(state, |s| !s.closed && !value_present(s))
            .unwrap();
        if state.closed && !value_present(&state) {
            state.readers -= 1;
            return Err(RecvError::new());
        }
        let value = take_value(&mut state);
        self.inner.signal_writers(&state);
        state.readers -= 1;
        Ok(value)
    }

    /// Non-blocking: returns a value only if one is immediately available.
    pub fn try_recv(&self) -> Option<T> {
        let mut state = self.inner.lock();
        match Inner::has_messages_status(&state) {
            RecvReady::Ready => {
                let value = take_value(&mut state);
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
                if !state.closed && !value_present(&state) {
                    self.inner.signal_writers(&state);
                }
                loop {
                    match Inner::has_messages_status(&state) {
                        RecvReady::Ready => {
                            let value = take_value(&mut state);
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

    /// Closes the channel. Idempotent: a second call is a no-op. Blocks
    /// briefly if a value is currently in flight, until it is taken.
    pub fn close(&self) {
        close_shared(&self.inner)
    }

    pub fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }
}

fn close_shared<T>(inner: &Arc<Inner<T>>) {
    let mut state = inner.lock();
    let just_closed = inner.mark_closed(&mut state);
    if just_closed {
        state.writers += 1;
        state = inner.cwr.wait_while(state, |s| value_present(s)).unwrap();
        state.writers -= 1;
    }
}

// `select.rs` needs to reach into the shared `Inner` without going through
// the blocking `send`/`recv` entry points above.
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
    use std::thread;

    #[test]
    fn rendezvous_hands_off_value() {
        let (tx, rx) = sync_channel::<i32>();
        let handle = thread::spawn(move || tx.send(42).unwrap());
        assert_eq!(rx.recv().unwrap(), 42);
        handle.join().unwrap();
    }

    #[test]
    fn send_on_closed_fails() {
        let (tx, rx) = sync_channel::<i32>();
        rx.close();
        assert!(tx.send(1).is_err());
    }

    #[test]
    fn recv_on_closed_empty_fails() {
        let (tx, rx) = sync_channel::<i32>();
        tx.close();
        assert!(rx.recv().is_err());
    }

    #[test]
    fn try_send_fails_without_a_waiting_receiver() {
        let (tx, _rx) = sync_channel::<i32>();
        assert!(tx.try_send(1).unwrap_err().is_full());
    }

    #[test]
    fn try_send_timeout_times_out_on_full() {
        let (tx, _rx) = sync_channel::<i32>();
        let started = Instant::now();
        let err = tx
            .try_send_timeout(1, Some(Duration::from_millis(30)))
            .unwrap_err();
        assert!(err.is_full());
        assert!(started.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn close_drains_in_flight_value_before_returning() {
        let (tx, rx) = sync_channel::<i32>();
        let handle = thread::spawn(move || {
            rx.recv().unwrap()
        });
        // Give the receiver a chance to park before we send + close.
        thread::sleep(Duration::from_millis(20));
        tx.send(7).unwrap();
        tx.close();
        assert_eq!(handle.join().unwrap(), 7);
    }
}
