use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, Ordering},
};

use netio_buf::{ProducerGuard, ReadMode, ThreadsafeBuffer, WriteMode};

use crate::{
    peek::PeekReader,
    writer::{MessageReaderWriter, MessageWriter},
};

/// Bounded FIFO message queue: the concrete "buffer writer" of the writer
/// hierarchy, and the typed deque-of-messages variant of `IOBuffer` in its
/// own right.
///
/// `send` wakes one consumer (via `ThreadsafeBuffer::write`'s
/// `notify_one`); `close` drops this queue's own producer registration,
/// which broadcasts to every blocked reader if this was the last producer —
/// the same mechanism any other producer's `ProducerGuard` drop would
/// trigger.
pub struct MessageQueue<M> {
    buf: Arc<ThreadsafeBuffer<M>>,
    closed: AtomicBool,
    producer_guard: Mutex<Option<ProducerGuard<M>>>,
    peek: Mutex<PeekReader<M>>,
}

impl<M: Default> MessageQueue<M> {
    pub fn new(limit: usize) -> Self {
        let buf = Arc::new(ThreadsafeBuffer::new(limit));
        let producer_guard = Mutex::new(Some(buf.register_producer()));
        let peek = Mutex::new(PeekReader::new(buf.clone()));
        Self { buf, closed: AtomicBool::new(false), producer_guard, peek }
    }

    /// The backing buffer, for callers (e.g. [`crate::writers::AsyncCallbackWriter`])
    /// that need their own registered producer/consumer handle onto it.
    pub fn buffer(&self) -> &Arc<ThreadsafeBuffer<M>> {
        &self.buf
    }
}

impl<M: Default + Clone + Send + Sync> MessageWriter<M> for MessageQueue<M> {
    fn send(&self, m: M, mode: WriteMode) -> bool {
        if self.is_closed() {
            return false;
        }
        self.buf.write(m, mode).is_accepted()
    }

    fn close(&self, cancel_pending: bool) {
        self.closed.store(true, Ordering::Release);
        if cancel_pending {
            while self.buf.read(ReadMode::Immediate).is_some() {}
        }
        // Dropping our own producer registration wakes any blocked reader if
        // we were the last one standing — this is the "broadcast on close".
        self.producer_guard.lock().unwrap().take();
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

impl<M: Default + Clone + Send + Sync> MessageReaderWriter<M> for MessageQueue<M> {
    fn read(&self, mode: ReadMode, delay_consume: bool) -> Option<M> {
        self.peek.lock().unwrap().read(mode, delay_consume)
    }

    fn len(&self) -> usize {
        self.buf.len()
    }

    fn capacity(&self) -> usize {
        self.buf.capacity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn close_without_cancel_keeps_pending_readable() {
        let q = MessageQueue::<i32>::new(4);
        q.send(1, WriteMode::Blocking);
        q.close(false);
        assert_eq!(q.read(ReadMode::Immediate, false), Some(1));
    }

    #[test]
    fn close_with_cancel_discards_pending() {
        let q = MessageQueue::<i32>::new(4);
        q.send(1, WriteMode::Blocking);
        q.close(true);
        assert_eq!(q.read(ReadMode::Immediate, false), None);
    }

    #[test]
    fn closed_queue_rejects_sends_without_reopening() {
        let q = MessageQueue::<i32>::new(4);
        q.close(false);
        assert!(!q.send(1, WriteMode::Immediate));
        assert!(q.is_closed());
    }
}
