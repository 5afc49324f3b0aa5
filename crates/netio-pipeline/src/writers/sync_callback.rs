use std::sync::{
    Mutex,
    atomic::{AtomicBool, Ordering},
};

use netio_buf::WriteMode;

use crate::writer::MessageWriter;

/// Invokes a user function under the writer's own lock on every `send`.
/// Always accepts (there's no queue to overflow) unless closed.
pub struct SyncCallbackWriter<M, F> {
    f: Mutex<F>,
    closed: AtomicBool,
    _marker: std::marker::PhantomData<fn(M)>,
}

impl<M, F> SyncCallbackWriter<M, F>
where
    F: FnMut(&M) + Send,
{
    pub fn new(f: F) -> Self {
        Self { f: Mutex::new(f), closed: AtomicBool::new(false), _marker: std::marker::PhantomData }
    }
}

impl<M, F> MessageWriter<M> for SyncCallbackWriter<M, F>
where
    M: Send,
    F: FnMut(&M) + Send,
{
    fn send(&self, m: M, _mode: WriteMode) -> bool {
        if self.closed.load(Ordering::Acquire) {
            return false;
        }
        (self.f.lock().unwrap())(&m);
        true
    }

    fn close(&self, _cancel_pending: bool) {
        self.closed.store(true, Ordering::Release);
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex as StdMutex};

    use super::*;

    #[test]
    fn send_invokes_callback_synchronously() {
        let seen = Arc::new(StdMutex::new(Vec::new()));
        let seen2 = seen.clone();
        let writer = SyncCallbackWriter::new(move |m: &i32| seen2.lock().unwrap().push(*m));
        assert!(writer.send(1, WriteMode::Immediate));
        assert!(writer.send(2, WriteMode::Immediate));
        assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
    }

    #[test]
    fn closed_writer_rejects_sends() {
        let writer = SyncCallbackWriter::new(|_: &i32| {});
        writer.close(false);
        assert!(!writer.send(1, WriteMode::Immediate));
    }
}
