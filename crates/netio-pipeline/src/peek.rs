use std::sync::Arc;

use netio_buf::{ReadMode, ThreadsafeBuffer};

/// Delay-consume (peek) discipline for a single-reader work loop, kept out
/// of `ThreadsafeBuffer` itself (it's a property of one reader's traversal,
/// not of the buffer — see the spine-derived writer hierarchy's separation
/// of reader state from shared buffer state).
///
/// A `delay_consume` read leaves the element at the head of the queue; only
/// the *next* call — peek or not — actually removes it. That means a reader
/// that crashes after peeking but before finishing its work sees the same
/// message again on restart (against a fresh `PeekReader` over the same
/// buffer).
pub struct PeekReader<M> {
    buf: Arc<ThreadsafeBuffer<M>>,
    pending_drop: bool,
}

impl<M> PeekReader<M> {
    pub fn new(buf: Arc<ThreadsafeBuffer<M>>) -> Self {
        Self { buf, pending_drop: false }
    }
}

impl<M: Default + Clone> PeekReader<M> {
    /// Reads the next message. With `delay_consume` the message stays queued
    /// until the following `read` call, which first silently drops it.
    pub fn read(&mut self, mode: ReadMode, delay_consume: bool) -> Option<M> {
        if self.pending_drop {
            self.buf.drop_front();
            self.pending_drop = false;
        }

        if delay_consume {
            let v = self.buf.peek_front(mode, Clone::clone)?;
            self.pending_drop = true;
            Some(v)
        } else {
            self.buf.read(mode)
        }
    }
}

#[cfg(test)]
mod tests {
    use netio_buf::WriteMode;

    use super::*;

    #[test]
    fn peeked_message_is_redelivered_until_next_read() {
        let buf = Arc::new(ThreadsafeBuffer::<i32>::new(4));
        let _p = buf.register_producer();
        let _c = buf.register_consumer();
        buf.write(1, WriteMode::Blocking);
        buf.write(2, WriteMode::Blocking);

        let mut reader = PeekReader::new(buf.clone());
        assert_eq!(reader.read(ReadMode::Immediate, true), Some(1));
        // A fresh reader simulating a crash-restart still sees message 1,
        // because it was never actually removed.
        let mut restarted = PeekReader::new(buf.clone());
        assert_eq!(restarted.read(ReadMode::Immediate, true), Some(1));

        // Advancing the original reader drops the stale head, then peeks 2.
        assert_eq!(reader.read(ReadMode::Immediate, true), Some(2));
    }
}
