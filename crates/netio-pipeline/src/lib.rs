//! Typed message queues and writer hierarchy built on top of `netio-buf`.
//!
//! [`MessageQueue`] is the typed, deque-of-messages counterpart to
//! [`netio_buf::IOBuffer`]. [`MessageWriter`] and [`MessageReaderWriter`] are
//! the narrow traits every concrete sink implements — a buffer queue, a
//! synchronous callback, an owned-thread asynchronous callback, a stream or
//! file sink — and [`MessageBroadcaster`] fans a single send out to a set of
//! them.

mod broadcaster;
mod error;
mod peek;
mod queue;
mod writer;
pub mod writers;

pub use broadcaster::MessageBroadcaster;
pub use error::FileWriterError;
pub use peek::PeekReader;
pub use queue::MessageQueue;
pub use writer::{MessageReaderWriter, MessageWriter};
