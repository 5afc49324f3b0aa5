use std::{
    sync::atomic::{AtomicBool, Ordering},
    thread::JoinHandle,
};

use netio_buf::{ReadMode, WriteMode};
use tracing::debug;

use crate::{queue::MessageQueue, writer::MessageWriter};

/// "Buffer + worker thread + function", per the source's REDESIGN note: the
/// async callback writer is nothing more than an owned [`MessageQueue`] and a
/// dedicated thread that drains it in `delay_consume` mode until the queue
/// closes, invoking a user function for every message.
pub struct AsyncCallbackWriter<M: 'static> {
    queue: std::sync::Arc<MessageQueue<M>>,
    worker: Option<JoinHandle<()>>,
    closed: AtomicBool,
}

impl<M> AsyncCallbackWriter<M>
where
    M: Default + Clone + Send + Sync + 'static,
{
    /// Spawns the worker thread immediately. `f` runs on the worker thread
    /// for every message until the writer is closed and drained.
    pub fn new<F>(limit: usize, mut f: F) -> Self
    where
        F: FnMut(M) + Send + 'static,
    {
        let queue = std::sync::Arc::new(MessageQueue::new(limit));
        let worker_queue = queue.clone();
        let worker = std::thread::Builder::new()
            .name("netio-async-writer".into())
            .spawn(move || {
                loop {
                    match worker_queue.read(ReadMode::Blocking, true) {
                        Some(m) => f(m),
                        None => {
                            debug!("async callback writer: source drained, worker exiting");
                            break;
                        }
                    }
                }
            })
            .expect("failed to spawn netio-async-writer thread");

        Self { queue, worker: Some(worker), closed: AtomicBool::new(false) }
    }
}

impl<M> MessageWriter<M> for AsyncCallbackWriter<M>
where
    M: Default + Clone + Send + Sync + 'static,
{
    fn send(&self, m: M, mode: WriteMode) -> bool {
        if self.is_closed() {
            return false;
        }
        self.queue.send(m, mode)
    }

    fn close(&self, cancel_pending: bool) {
        self.closed.store(true, Ordering::Release);
        self.queue.close(cancel_pending);
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

impl<M> Drop for AsyncCallbackWriter<M> {
    fn drop(&mut self) {
        self.closed.store(true, Ordering::Release);
        self.queue.close(false);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{Arc, Mutex},
        time::Duration,
    };

    use super::*;

    #[test]
    fn worker_thread_invokes_callback_for_every_message() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen2 = seen.clone();
        let writer = AsyncCallbackWriter::new(8, move |m: i32| seen2.lock().unwrap().push(m));

        for v in [1, 2, 3] {
            assert!(writer.send(v, WriteMode::Blocking));
        }
        writer.close(false);
        drop(writer);

        assert_eq!(*seen.lock().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn closed_writer_rejects_new_sends() {
        let writer = AsyncCallbackWriter::new(4, |_: i32| {});
        writer.close(false);
        assert!(!writer.send(1, WriteMode::Immediate));
        std::thread::sleep(Duration::from_millis(5));
    }
}
