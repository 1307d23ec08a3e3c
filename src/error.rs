//! Error types surfaced by blocking channel operations.
//!
//! Non-blocking and timed operations (`try_send`, `try_recv`, `select`'s timed
//! entry points) never raise; a closed or empty/full channel there is an
//! ordinary `false`/`None` return, not an `Err`. These types only show up on
//! the unconditionally-blocking entry points, where a closed channel is a
//! contract violation the caller must handle.

use std::error::Error;
use std::fmt;

/// Returned by [`Sender::send`](crate::Sender::send) when the channel is
/// closed. Carries the value that could not be delivered so the caller isn't
/// forced to drop it.
pub struct SendError<T> {
    value: T,
}

impl<T> SendError<T> {
    pub(crate) fn new(value: T) -> Self {
        SendError { value }
    }

    /// Recovers the value that failed to send.
    pub fn into_inner(self) -> T {
        self.value
    }
}

impl<T> fmt::Debug for SendError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SendError").finish_non_exhaustive()
    }
}

impl<T> fmt::Display for SendError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "send failed because the channel is closed")
    }
}

impl<T> Error for SendError<T> {}

/// Why a [`Sender::try_send`](crate::Sender::try_send) (or its timed variant)
/// did not accept the value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrySendErrorKind {
    /// The channel had no free capacity (sync: no waiting receiver; bounded:
    /// queue at capacity) within the time budget given.
    Full,
    /// The channel is closed.
    Closed,
}

/// Returned by [`Sender::try_send`](crate::Sender::try_send) and
/// [`Sender::try_send_timeout`](crate::Sender::try_send_timeout) when the
/// value could not be accepted. Carries the value back, mirroring the
/// teacher's `TrySendError<T>` shape.
pub struct TrySendError<T> {
    kind: TrySendErrorKind,
    value: T,
}

impl<T> TrySendError<T> {
    pub(crate) fn new(kind: TrySendErrorKind, value: T) -> Self {
        TrySendError { kind, value }
    }

    /// Returns true if this error is a result of the channel having no free
    /// capacity within the time budget given.
    pub fn is_full(&self) -> bool {
        self.kind == TrySendErrorKind::Full
    }

    /// Returns true if this error is a result of the channel being closed.
    pub fn is_closed(&self) -> bool {
        self.kind == TrySendErrorKind::Closed
    }

    /// Recovers the value that failed to send.
    pub fn into_inner(self) -> T {
        self.value
    }
}

impl<T> fmt::Debug for TrySendError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrySendError")
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

impl<T> fmt::Display for TrySendError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_full() {
            write!(f, "send failed because the channel has no free capacity")
        } else {
            write!(f, "send failed because the channel is closed")
        }
    }
}

impl<T> Error for TrySendError<T> {}

/// Returned by [`Receiver::recv`](crate::Receiver::recv) when the channel is
/// closed and has no further buffered values.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct RecvError {
    _private: (),
}

impl RecvError {
    pub(crate) fn new() -> Self {
        RecvError { _private: () }
    }
}

impl fmt::Debug for RecvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RecvError").finish()
    }
}

impl fmt::Display for RecvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "recv failed because the channel is closed and empty")
    }
}

impl Error for RecvError {}

/// Returned by the bounded-channel constructor when `capacity == 0`.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct InvalidCapacityError {
    _private: (),
}

impl InvalidCapacityError {
    pub(crate) fn new() -> Self {
        InvalidCapacityError { _private: () }
    }
}

impl fmt::Debug for InvalidCapacityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("InvalidCapacityError").finish()
    }
}

impl fmt::Display for InvalidCapacityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "channel capacity must be at least 1")
    }
}

impl Error for InvalidCapacityError {}
