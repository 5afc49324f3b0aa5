use std::sync::Arc;

use crate::threadsafe::{ConsumerGuard, ProducerGuard, ReadMode, ThreadsafeBuffer, WriteMode, WriteReport};

/// One side of a [`Pipe`]. Writes go to this side's sink buffer, reads come
/// from this side's source buffer — the two [`Pipe`] endpoints are wired in
/// opposite roles over the same pair of buffers.
pub struct PipeEnd<T> {
    sink: Arc<ThreadsafeBuffer<T>>,
    source: Arc<ThreadsafeBuffer<T>>,
    _producer: ProducerGuard<T>,
    _consumer: ConsumerGuard<T>,
}

impl<T: Default> PipeEnd<T> {
    pub fn write(&self, value: T, mode: WriteMode) -> WriteReport {
        self.sink.write(value, mode)
    }

    pub fn read(&self, mode: ReadMode) -> Option<T> {
        self.source.read(mode)
    }

    pub fn at_end(&self) -> bool {
        self.source.at_end()
    }
}

/// A full-duplex in-memory channel: two [`ThreadsafeBuffer`]s shared between
/// two endpoints in opposite roles, so endpoint `a` writing is what endpoint
/// `b` reads and vice versa.
///
/// Dropping a `Pipe` drops both endpoints' registration guards, which
/// unregisters them from both buffers — any other `Arc` holder of either
/// buffer then observes both sides as closed.
pub struct Pipe<T> {
    pub a: PipeEnd<T>,
    pub b: PipeEnd<T>,
}

impl<T: Default> Pipe<T> {
    pub fn new(limit: usize) -> Self {
        let buf_ab = Arc::new(ThreadsafeBuffer::new(limit));
        let buf_ba = Arc::new(ThreadsafeBuffer::new(limit));

        let a = PipeEnd {
            sink: buf_ab.clone(),
            source: buf_ba.clone(),
            _producer: buf_ab.register_producer(),
            _consumer: buf_ba.register_consumer(),
        };
        let b = PipeEnd {
            sink: buf_ba.clone(),
            source: buf_ab.clone(),
            _producer: buf_ba.register_producer(),
            _consumer: buf_ab.register_consumer(),
        };

        Self { a, b }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a_writes_b_reads_and_vice_versa() {
        let pipe = Pipe::<i32>::new(8);
        pipe.a.write(1, WriteMode::Blocking);
        assert_eq!(pipe.b.read(ReadMode::Immediate), Some(1));

        pipe.b.write(2, WriteMode::Blocking);
        assert_eq!(pipe.a.read(ReadMode::Immediate), Some(2));
    }

    #[test]
    fn dropping_one_end_marks_the_other_at_end() {
        let pipe = Pipe::<i32>::new(8);
        drop(pipe.a);
        assert!(pipe.b.at_end());
    }
}
