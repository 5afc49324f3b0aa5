use std::sync::{
    Arc, Condvar, Mutex,
    atomic::{AtomicBool, AtomicUsize, Ordering},
};

use tracing::trace;

use crate::buffer::IOBuffer;

/// Write blocking discipline. See [`ThreadsafeBuffer::write`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WriteMode {
    /// Wait until there's room, or until every consumer has unregistered.
    Blocking,
    /// Never block; fail immediately if there's no room.
    Immediate,
    /// Drop the oldest element(s) to make room. Always succeeds.
    Overwrite,
}

/// Read blocking discipline. See [`ThreadsafeBuffer::read`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReadMode {
    /// Wait for an element, or until every producer has unregistered and the
    /// buffer is empty.
    Blocking,
    /// Never block; return `None` immediately if empty.
    Immediate,
}

/// Outcome of a [`ThreadsafeBuffer::write`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WriteReport {
    /// Accepted without dropping anything.
    Written,
    /// Accepted in `Overwrite` mode, after dropping the oldest element(s).
    WrittenWithLoss,
    /// Rejected: no room (`Immediate`), or no consumers left (`Blocking`).
    Rejected,
}

impl WriteReport {
    pub fn is_accepted(self) -> bool {
        !matches!(self, WriteReport::Rejected)
    }
}

/// `Mutex`+`Condvar` wrapper around [`IOBuffer`] supporting multiple
/// producers and consumers, with registration accounting so the last
/// participant leaving one side can wake blocked participants on the other.
///
/// Sockets are explicitly out of this type's scope — this is the
/// single-process, cross-thread primitive; `netio-net` builds its own
/// OS-descriptor synchronization separately.
pub struct ThreadsafeBuffer<T> {
    inner: Mutex<IOBuffer<T>>,
    producer_wait: Condvar,
    consumer_wait: Condvar,
    producer_count: AtomicUsize,
    consumer_count: AtomicUsize,
    producer_ever_registered: AtomicBool,
    consumer_ever_registered: AtomicBool,
}

impl<T> ThreadsafeBuffer<T> {
    pub fn new(limit: usize) -> Self {
        Self {
            inner: Mutex::new(IOBuffer::new(limit)),
            producer_wait: Condvar::new(),
            consumer_wait: Condvar::new(),
            producer_count: AtomicUsize::new(0),
            consumer_count: AtomicUsize::new(0),
            producer_ever_registered: AtomicBool::new(false),
            consumer_ever_registered: AtomicBool::new(false),
        }
    }

    /// A side is "available" if it has active registered participants, or if
    /// no participant on that side has ever registered (permissive default —
    /// a buffer nobody has declared a producer/consumer for doesn't starve
    /// the other side pre-emptively).
    pub fn producers_available(&self) -> bool {
        self.producer_count.load(Ordering::Acquire) > 0
            || !self.producer_ever_registered.load(Ordering::Acquire)
    }

    pub fn consumers_available(&self) -> bool {
        self.consumer_count.load(Ordering::Acquire) > 0
            || !self.consumer_ever_registered.load(Ordering::Acquire)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().size()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().unwrap().empty()
    }

    pub fn capacity(&self) -> usize {
        self.inner.lock().unwrap().max_size()
    }

    /// Empty, and no producer is available to ever fill it again.
    pub fn at_end(&self) -> bool {
        self.inner.lock().unwrap().empty() && !self.producers_available()
    }

    fn register_producer_raw(&self) {
        self.producer_count.fetch_add(1, Ordering::AcqRel);
        self.producer_ever_registered.store(true, Ordering::Release);
    }

    fn unregister_producer_raw(&self) {
        if self.producer_count.fetch_sub(1, Ordering::AcqRel) == 1 {
            trace!("last producer unregistered, waking consumers");
            self.consumer_wait.notify_all();
        }
    }

    fn register_consumer_raw(&self) {
        self.consumer_count.fetch_add(1, Ordering::AcqRel);
        self.consumer_ever_registered.store(true, Ordering::Release);
    }

    fn unregister_consumer_raw(&self) {
        if self.consumer_count.fetch_sub(1, Ordering::AcqRel) == 1 {
            trace!("last consumer unregistered, waking producers");
            self.producer_wait.notify_all();
        }
    }

    /// Registers a producer for the lifetime of the returned guard.
    pub fn register_producer(self: &Arc<Self>) -> ProducerGuard<T> {
        self.register_producer_raw();
        ProducerGuard { buf: self.clone() }
    }

    /// Registers a consumer for the lifetime of the returned guard.
    pub fn register_consumer(self: &Arc<Self>) -> ConsumerGuard<T> {
        self.register_consumer_raw();
        ConsumerGuard { buf: self.clone() }
    }
}

impl<T: Default> ThreadsafeBuffer<T> {
    /// Writes one element under `mode`. See [`WriteMode`].
    pub fn write(&self, value: T, mode: WriteMode) -> WriteReport {
        let mut lost = false;
        let mut value = Some(value);
        let mut guard = self.inner.lock().unwrap();
        loop {
            if guard.free_space() > 0 {
                guard.write(value.take().expect("value consumed exactly once"));
                drop(guard);
                self.consumer_wait.notify_one();
                return if lost { WriteReport::WrittenWithLoss } else { WriteReport::Written };
            }

            match mode {
                WriteMode::Immediate => return WriteReport::Rejected,
                WriteMode::Overwrite => {
                    guard.read();
                    lost = true;
                }
                WriteMode::Blocking => {
                    if !self.consumers_available() {
                        return WriteReport::Rejected;
                    }
                    guard = self.producer_wait.wait(guard).unwrap();
                    if !self.consumers_available() {
                        return WriteReport::Rejected;
                    }
                }
            }
        }
    }

    /// Reads one element under `mode`. `None` means "empty" (`Immediate`) or
    /// "at end" (`Blocking` with no producers left). See [`ReadMode`].
    pub fn read(&self, mode: ReadMode) -> Option<T> {
        let mut guard = self.inner.lock().unwrap();
        loop {
            if !guard.empty() {
                let v = guard.read();
                drop(guard);
                self.producer_wait.notify_one();
                return Some(v);
            }

            match mode {
                ReadMode::Immediate => return None,
                ReadMode::Blocking => {
                    if !self.producers_available() {
                        return None;
                    }
                    guard = self.consumer_wait.wait(guard).unwrap();
                    if guard.empty() && !self.producers_available() {
                        return None;
                    }
                }
            }
        }
    }

    /// Reads the front element without removing it from the buffer,
    /// handing a reference to `f`. Used by the peek/delay-consume reader in
    /// `netio-pipeline`; `ThreadsafeBuffer` itself carries no peek-specific
    /// state (see `netio_pipeline::peek`).
    pub fn peek_front<R>(&self, mode: ReadMode, f: impl FnOnce(&T) -> R) -> Option<R> {
        let mut guard = self.inner.lock().unwrap();
        loop {
            if !guard.empty() {
                // Report zero consumed so `read_with` leaves the element in
                // place; only the reference it exposes is used.
                let mut result = None;
                guard.read_with(1, |a, b| {
                    if let Some(v) = a.first().or_else(|| b.first()) {
                        result = Some(f(v));
                    }
                    0
                });
                return result;
            }

            match mode {
                ReadMode::Immediate => return None,
                ReadMode::Blocking => {
                    if !self.producers_available() {
                        return None;
                    }
                    guard = self.consumer_wait.wait(guard).unwrap();
                    if guard.empty() && !self.producers_available() {
                        return None;
                    }
                }
            }
        }
    }

    /// Removes and discards the front element, if any. Used to drop a stale
    /// peeked head before the next real read.
    pub fn drop_front(&self) {
        let mut guard = self.inner.lock().unwrap();
        if !guard.empty() {
            guard.read();
            drop(guard);
            self.producer_wait.notify_one();
        }
    }
}

/// RAII producer registration. Unregisters exactly once, on drop.
pub struct ProducerGuard<T> {
    buf: Arc<ThreadsafeBuffer<T>>,
}

impl<T> Drop for ProducerGuard<T> {
    fn drop(&mut self) {
        self.buf.unregister_producer_raw();
    }
}

/// RAII consumer registration. Unregisters exactly once, on drop.
pub struct ConsumerGuard<T> {
    buf: Arc<ThreadsafeBuffer<T>>,
}

impl<T> Drop for ConsumerGuard<T> {
    fn drop(&mut self) {
        self.buf.unregister_consumer_raw();
    }
}

#[cfg(test)]
mod tests {
    use std::{thread, time::Duration};

    use super::*;

    #[test]
    fn bounded_overwrite_reports_loss_and_keeps_newest() {
        let buf: Arc<ThreadsafeBuffer<i32>> = Arc::new(ThreadsafeBuffer::new(3));
        let _p = buf.register_producer();
        let _c = buf.register_consumer();
        for v in [1, 2, 3] {
            assert_eq!(buf.write(v, WriteMode::Blocking), WriteReport::Written);
        }
        assert_eq!(buf.write(4, WriteMode::Overwrite), WriteReport::WrittenWithLoss);
        let mut out = vec![];
        while let Some(v) = buf.read(ReadMode::Immediate) {
            out.push(v);
        }
        assert_eq!(out, vec![2, 3, 4]);
    }

    #[test]
    fn immediate_write_fails_when_full() {
        let buf: Arc<ThreadsafeBuffer<i32>> = Arc::new(ThreadsafeBuffer::new(1));
        let _p = buf.register_producer();
        assert_eq!(buf.write(1, WriteMode::Immediate), WriteReport::Written);
        assert_eq!(buf.write(2, WriteMode::Immediate), WriteReport::Rejected);
    }

    #[test]
    fn last_consumer_unregistering_unblocks_producer() {
        let buf: Arc<ThreadsafeBuffer<i32>> = Arc::new(ThreadsafeBuffer::new(1));
        let _p = buf.register_producer();
        let consumer_guard = buf.register_consumer();
        buf.write(1, WriteMode::Blocking); // fills the single slot

        let producer_buf = buf.clone();
        let handle = thread::spawn(move || producer_buf.write(2, WriteMode::Blocking));

        thread::sleep(Duration::from_millis(20));
        drop(consumer_guard);

        let report = handle.join().unwrap();
        assert_eq!(report, WriteReport::Rejected);
    }

    #[test]
    fn last_producer_unregistering_unblocks_consumer() {
        let buf: Arc<ThreadsafeBuffer<i32>> = Arc::new(ThreadsafeBuffer::new(4));
        let producer_guard = buf.register_producer();
        let _c = buf.register_consumer();

        let consumer_buf = buf.clone();
        let handle = thread::spawn(move || consumer_buf.read(ReadMode::Blocking));

        thread::sleep(Duration::from_millis(20));
        drop(producer_guard);

        assert_eq!(handle.join().unwrap(), None);
    }

    #[test]
    fn three_producers_fan_in_preserve_per_producer_fifo() {
        let buf: Arc<ThreadsafeBuffer<(u8, u32)>> = Arc::new(ThreadsafeBuffer::new(10));
        let consumer_guard = buf.register_consumer();

        let handles: Vec<_> = (0..3u8)
            .map(|id| {
                let buf = buf.clone();
                let guard = buf.register_producer();
                thread::spawn(move || {
                    let _guard = guard;
                    for i in 0..1000u32 {
                        buf.write((id, i), WriteMode::Blocking);
                    }
                })
            })
            .collect();

        let mut seen = [Vec::new(), Vec::new(), Vec::new()];
        let mut total = 0;
        loop {
            match buf.read(ReadMode::Blocking) {
                Some((id, i)) => {
                    seen[id as usize].push(i);
                    total += 1;
                }
                None => break,
            }
        }
        drop(consumer_guard);
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(total, 3000);
        for stream in seen {
            assert!(stream.windows(2).all(|w| w[0] < w[1]));
        }
    }
}
