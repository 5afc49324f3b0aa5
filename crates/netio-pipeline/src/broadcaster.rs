use std::sync::{Arc, RwLock};

use netio_buf::WriteMode;

use crate::writer::MessageWriter;

/// Fan-out over a set of [`MessageWriter`]s driven from one send site.
///
/// `send` delivers a copy of the message to every writer (the message type
/// must therefore be `Clone`); `send_to_one` walks the set and moves the
/// message into the first writer that accepts it, per REDESIGN FLAGS item 4
/// — moving a value in a loop across writers that might each partially
/// consume it is unsound, so only the accepted path ever takes ownership.
pub struct MessageBroadcaster<M> {
    writers: RwLock<Vec<Arc<dyn MessageWriter<M>>>>,
}

impl<M> Default for MessageBroadcaster<M> {
    fn default() -> Self {
        Self { writers: RwLock::new(Vec::new()) }
    }
}

impl<M> MessageBroadcaster<M> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, writer: Arc<dyn MessageWriter<M>>) {
        self.writers.write().unwrap().push(writer);
    }

    /// Removes every writer for which `Arc::ptr_eq(writer, target)` holds.
    pub fn remove(&self, target: &Arc<dyn MessageWriter<M>>) {
        self.writers.write().unwrap().retain(|w| !Arc::ptr_eq(w, target));
    }

    pub fn len(&self) -> usize {
        self.writers.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cascades `close` to every current writer.
    pub fn close(&self, cancel_pending: bool) {
        for w in self.writers.read().unwrap().iter() {
            w.close(cancel_pending);
        }
    }
}

impl<M: Clone> MessageBroadcaster<M> {
    /// Sends a clone of `m` to every writer, under `mode`. Returns how many
    /// writers accepted it.
    pub fn send(&self, m: &M, mode: WriteMode) -> usize {
        let writers = self.writers.read().unwrap();
        writers.iter().filter(|w| w.send(m.clone(), mode)).count()
    }

    /// Moves `m` into the first writer that accepts it. If none accept, the
    /// message is force-queued into the last writer anyway (mirroring the
    /// source's "force-queue-anyway" fallback) under `WriteMode::Overwrite`,
    /// so the call never silently drops the message while any writer exists.
    pub fn send_to_one(&self, m: M, mode: WriteMode) -> bool {
        let writers = self.writers.read().unwrap();
        let mut pending = Some(m);
        for w in writers.iter() {
            let value = pending.take().expect("message consumed exactly once per loop");
            if w.send(value.clone(), mode) {
                return true;
            }
            pending = Some(value);
        }
        if let (Some(value), Some(last)) = (pending, writers.last()) {
            return last.send(value, WriteMode::Overwrite);
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::writers::SyncCallbackWriter;

    #[test]
    fn adding_and_removing_a_writer_changes_what_it_observes() {
        let broadcaster: MessageBroadcaster<i32> = MessageBroadcaster::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen2 = seen.clone();
        let writer: Arc<dyn MessageWriter<i32>> =
            Arc::new(SyncCallbackWriter::new(move |m: &i32| seen2.lock().unwrap().push(*m)));

        broadcaster.add(writer.clone());
        broadcaster.send(&1, WriteMode::Immediate);
        assert_eq!(*seen.lock().unwrap(), vec![1]);

        broadcaster.remove(&writer);
        broadcaster.send(&2, WriteMode::Immediate);
        assert_eq!(*seen.lock().unwrap(), vec![1]);
    }

    #[test]
    fn close_cascades_to_every_writer() {
        let broadcaster: MessageBroadcaster<i32> = MessageBroadcaster::new();
        let writer: Arc<dyn MessageWriter<i32>> = Arc::new(SyncCallbackWriter::new(|_: &i32| {}));
        broadcaster.add(writer.clone());
        broadcaster.close(false);
        assert!(writer.is_closed());
    }
}
