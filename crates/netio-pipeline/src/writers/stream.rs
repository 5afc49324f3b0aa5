use std::{
    io::Write,
    sync::{
        Mutex,
        atomic::{AtomicBool, Ordering},
    },
};

use netio_buf::WriteMode;
use tracing::warn;

use crate::{writer::MessageWriter, writers::AsyncCallbackWriter};

/// `send` serialises the message into the stream via `ostream << m`'s
/// idiomatic equivalent: a user-supplied formatting function, invoked under
/// the writer's own lock. Optionally flushes after every write.
pub struct SyncStreamWriter<M, W> {
    inner: Mutex<W>,
    write: Box<dyn Fn(&mut W, &M) -> std::io::Result<()> + Send + Sync>,
    flush_on_send: bool,
    closed: AtomicBool,
}

impl<M, W: Write + Send> SyncStreamWriter<M, W> {
    pub fn new<F>(stream: W, write: F, flush_on_send: bool) -> Self
    where
        F: Fn(&mut W, &M) -> std::io::Result<()> + Send + Sync + 'static,
    {
        Self {
            inner: Mutex::new(stream),
            write: Box::new(write),
            flush_on_send,
            closed: AtomicBool::new(false),
        }
    }
}

impl<M, W> MessageWriter<M> for SyncStreamWriter<M, W>
where
    M: Send,
    W: Write + Send,
{
    fn send(&self, m: M, _mode: WriteMode) -> bool {
        if self.is_closed() {
            return false;
        }
        let mut guard = self.inner.lock().unwrap();
        if let Err(err) = (self.write)(&mut guard, &m) {
            warn!(?err, "stream writer: write failed");
            return false;
        }
        if self.flush_on_send && let Err(err) = guard.flush() {
            warn!(?err, "stream writer: flush failed");
            return false;
        }
        true
    }

    fn close(&self, _cancel_pending: bool) {
        self.closed.store(true, Ordering::Release);
        if let Ok(mut guard) = self.inner.lock() {
            let _ = guard.flush();
        }
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

/// Asynchronous stream writer: a `MessageQueue` plus a dedicated thread that
/// drains it and performs the same `ostream << m` write as
/// [`SyncStreamWriter`], off the caller's thread.
pub struct StreamWriter<M: 'static> {
    inner: AsyncCallbackWriter<M>,
}

impl<M> StreamWriter<M>
where
    M: Default + Clone + Send + Sync + 'static,
{
    pub fn new<W, F>(limit: usize, mut stream: W, write: F, flush_on_send: bool) -> Self
    where
        W: Write + Send + 'static,
        F: Fn(&mut W, &M) -> std::io::Result<()> + Send + 'static,
    {
        let inner = AsyncCallbackWriter::new(limit, move |m: M| {
            if let Err(err) = write(&mut stream, &m) {
                warn!(?err, "async stream writer: write failed");
                return;
            }
            if flush_on_send && let Err(err) = stream.flush() {
                warn!(?err, "async stream writer: flush failed");
            }
        });
        Self { inner }
    }
}

impl<M> MessageWriter<M> for StreamWriter<M>
where
    M: Default + Clone + Send + Sync + 'static,
{
    fn send(&self, m: M, mode: WriteMode) -> bool {
        self.inner.send(m, mode)
    }

    fn close(&self, cancel_pending: bool) {
        self.inner.close(cancel_pending);
    }

    fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sync_stream_writer_writes_line_per_message() {
        let buf: Vec<u8> = Vec::new();
        let writer = SyncStreamWriter::new(
            buf,
            |w: &mut Vec<u8>, m: &i32| writeln!(w, "{m}"),
            false,
        );
        assert!(writer.send(1, WriteMode::Immediate));
        assert!(writer.send(2, WriteMode::Immediate));
        writer.close(false);
        assert!(writer.is_closed());
    }

    #[test]
    fn closed_sync_stream_writer_rejects_sends() {
        let writer = SyncStreamWriter::new(Vec::<u8>::new(), |w, m: &i32| writeln!(w, "{m}"), false);
        writer.close(false);
        assert!(!writer.send(1, WriteMode::Immediate));
    }
}
