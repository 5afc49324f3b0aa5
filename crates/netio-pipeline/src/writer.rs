use netio_buf::{ReadMode, WriteMode};

/// Narrow capability every message sink implements, per the source's
/// REDESIGN note: a small protocol plus composable strategies rather than
/// an inheritance chain.
pub trait MessageWriter<M>: Send + Sync {
    /// Sends one message under `mode`. Returns whether it was accepted.
    ///
    /// A closed writer rejects every send (`false`) rather than implicitly
    /// reopening — see `DESIGN.md` for why this diverges from the source.
    fn send(&self, m: M, mode: WriteMode) -> bool;

    /// Closes the writer. `cancel_pending` discards anything still queued
    /// instead of letting it drain to its destination.
    fn close(&self, cancel_pending: bool);

    fn is_closed(&self) -> bool;
}

/// Extends [`MessageWriter`] with a read side and depth/capacity
/// introspection, for writers that are also queues.
pub trait MessageReaderWriter<M>: MessageWriter<M> {
    /// Reads the next message. `delay_consume` requests peek semantics (see
    /// [`crate::peek::PeekReader`]).
    fn read(&self, mode: ReadMode, delay_consume: bool) -> Option<M>;

    fn len(&self) -> usize;

    fn capacity(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
