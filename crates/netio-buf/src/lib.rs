//! Bounded circular buffers: the single-threaded [`IOBuffer`], the
//! thread-safe [`ThreadsafeBuffer`] built on top of it, and [`Pipe`], a
//! full-duplex channel made of two `ThreadsafeBuffer`s.

mod buffer;
mod pipe;
mod threadsafe;

pub use buffer::IOBuffer;
pub use pipe::{Pipe, PipeEnd};
pub use threadsafe::{ConsumerGuard, ProducerGuard, ReadMode, ThreadsafeBuffer, WriteMode, WriteReport};
