//! Typed channels for communicating between threads, plus a multi-way
//! [`Select`] primitive that waits on several channels at once and commits to
//! exactly one ready operation.
//!
//! Two channel flavors are provided:
//!
//! - [`sync_channel`] — a zero-buffer rendezvous channel. `send` blocks until
//!   a `recv` is ready to take the value directly from it.
//! - [`bounded_channel`] — a fixed-capacity FIFO channel. `send` blocks only
//!   while the buffer is full; `recv` blocks only while it is empty.
//!
//! Both [`Sender`]/[`Receiver`] handles (and their bounded-channel
//! counterparts) are `Clone`: any number of threads may hold either half, so
//! a channel here is multi-producer, multi-consumer, not single-consumer
//! like `std::sync::mpsc`.
//!
//! # Closing
//!
//! Either half may call `close()`. Closing is monotonic and idempotent: once
//! closed, a channel never reopens, and a second `close()` call is a no-op.
//! After closing, `send` fails immediately; `recv` keeps returning any
//! already-buffered values (FIFO order for a bounded channel) until drained,
//! then fails.
//!
//! # Selecting across channels
//!
//! ```
//! use handoff::{sync_channel, Select};
//! use std::thread;
//!
//! let (tx_a, rx_a) = sync_channel::<i32>();
//! let (tx_b, rx_b) = sync_channel::<i32>();
//!
//! let sender = thread::spawn(move || {
//!     tx_b.send(7).unwrap();
//! });
//!
//! let picked = Select::new()
//!     .recv(&rx_a, |v| format!("a got {v}"))
//!     .recv(&rx_b, |v| format!("b got {v}"))
//!     .select()
//!     .unwrap();
//!
//! assert_eq!(picked, "b got 7");
//! sender.join().unwrap();
//! ```
//!
//! # Non-goals
//!
//! This crate does not implement distributed channels across address spaces,
//! persistence, priority-ordered delivery, or transactional multi-operation
//! commits beyond the single-pick semantics of [`Select`].

mod base;
mod bounded;
mod error;
mod rendezvous;
mod select;
mod semaphore;

pub use bounded::{bounded_channel, Receiver as BoundedReceiver, Sender as BoundedSender};
pub use error::{
    InvalidCapacityError, RecvError, SendError, TrySendError, TrySendErrorKind,
};
pub use rendezvous::{sync_channel, Receiver, Sender};
pub use select::{Select, SelectOutcome};
