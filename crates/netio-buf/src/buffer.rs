use std::collections::VecDeque;

use netio_utils::safe_assert;

/// Storage is dropped and a fresh reservation made once an empty buffer's
/// capacity exceeds this many elements and no explicit `limit` is set.
const SHRINK_FLOOR: usize = 1_000_000;

/// A bounded, move-aware, single-threaded circular buffer.
///
/// Backed by a [`VecDeque`], which already stores its elements as a ring
/// buffer internally and exposes the live range as one or two contiguous
/// spans via [`VecDeque::as_mut_slices`] — exactly the "aligned prefix plus
/// wrapped suffix" shape this type's read API hands to callers, without
/// `IOBuffer` having to reimplement wraparound bookkeeping by hand.
///
/// `limit == 0` means "unbounded" (only bounded by address space).
pub struct IOBuffer<T> {
    data: VecDeque<T>,
    limit: usize,
}

impl<T> Default for IOBuffer<T> {
    fn default() -> Self {
        Self::new(0)
    }
}

impl<T> IOBuffer<T> {
    pub fn new(limit: usize) -> Self {
        Self { data: VecDeque::new(), limit }
    }

    /// `limit` as actually enforced: `usize::MAX` when unbounded.
    fn effective_limit(&self) -> usize {
        if self.limit == 0 { usize::MAX } else { self.limit }
    }

    pub fn max_size(&self) -> usize {
        self.limit
    }

    /// Lowers or raises the configured limit. May be set below the current
    /// element count; `free_space` then reports zero until enough elements
    /// are read out, rather than forcibly dropping anything.
    pub fn set_max_size(&mut self, limit: usize) {
        self.limit = limit;
    }

    pub fn free_space(&self) -> usize {
        self.effective_limit().saturating_sub(self.data.len())
    }

    pub fn capacity(&self) -> usize {
        self.data.capacity()
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Discards everything and applies the shrink policy.
    pub fn clear(&mut self) {
        self.data.clear();
        self.maybe_shrink();
    }

    /// Deallocates storage and reserves fresh capacity once the buffer is
    /// empty and its current capacity exceeds `limit` (or the 1M-element
    /// floor when unbounded). Bounds long-term memory use after a burst.
    fn maybe_shrink(&mut self) {
        if !self.data.is_empty() {
            return;
        }
        let floor = if self.limit == 0 { SHRINK_FLOOR } else { self.limit };
        if self.data.capacity() > floor {
            self.data = VecDeque::with_capacity(self.limit);
        }
    }

    /// Appends one element. Fails (returns `false`, and `v` is dropped only
    /// on success — callers get it back via `Err` otherwise isn't needed
    /// here since `T` isn't moved until capacity is confirmed) if there is
    /// no room.
    pub fn write(&mut self, v: T) -> bool {
        if self.free_space() == 0 {
            return false;
        }
        self.data.push_back(v);
        safe_assert!(self.limit == 0 || self.data.len() <= self.limit);
        true
    }

    /// Appends a cloned copy of every element in `items`. All-or-nothing:
    /// if there isn't room for the whole slice, nothing is written.
    pub fn write_slice(&mut self, items: &[T]) -> bool
    where
        T: Clone,
    {
        if items.is_empty() {
            return true;
        }
        if self.free_space() < items.len() {
            return false;
        }
        self.data.extend(items.iter().cloned());
        true
    }

    /// Moves every element of `items` into the buffer. All-or-nothing: on
    /// failure `items` is handed back untouched.
    pub fn write_from(&mut self, items: Vec<T>) -> Result<(), Vec<T>> {
        if items.is_empty() {
            return Ok(());
        }
        if self.free_space() < items.len() {
            return Err(items);
        }
        self.data.extend(items);
        Ok(())
    }
}

impl<T: Default> IOBuffer<T> {
    /// Removes and returns the oldest element, or a value-initialized `T`
    /// if the buffer is empty — not an error.
    pub fn read(&mut self) -> T {
        self.data.pop_front().unwrap_or_default()
    }

    /// Invokes `p` with up to `min(max, size())` live elements as two
    /// contiguous spans (the second may be empty), in order. `p` returns how
    /// many elements — counted from the front of the first span onward — it
    /// actually consumed; that many are then removed. `p` may move values
    /// out of the slices it's given (e.g. via [`std::mem::take`]) since
    /// whatever is left behind is dropped once consumed.
    pub fn read_with<F>(&mut self, max: usize, p: F) -> usize
    where
        F: FnOnce(&mut [T], &mut [T]) -> usize,
    {
        let n = max.min(self.data.len());
        if n == 0 {
            return 0;
        }
        let (a, b) = self.data.as_mut_slices();
        let a_take = a.len().min(n);
        let b_take = n - a_take;
        let consumed = p(&mut a[..a_take], &mut b[..b_take]).min(n);
        self.data.drain(..consumed);
        self.maybe_shrink();
        consumed
    }

    pub fn read_all_with<F>(&mut self, p: F) -> usize
    where
        F: FnOnce(&mut [T], &mut [T]) -> usize,
    {
        self.read_with(usize::MAX, p)
    }

    /// Moves up to `max` elements, in order, into `out`. Returns how many.
    pub fn read_into<C: Extend<T>>(&mut self, max: usize, out: &mut C) -> usize {
        let n = max.min(self.data.len());
        out.extend(self.data.drain(..n));
        self.maybe_shrink();
        n
    }

    pub fn read_all_into<C: Extend<T>>(&mut self, out: &mut C) -> usize {
        self.read_into(usize::MAX, out)
    }

    pub fn read_collect<C: Default + Extend<T>>(&mut self, max: usize) -> C {
        let mut out = C::default();
        self.read_into(max, &mut out);
        out
    }

    pub fn read_all_collect<C: Default + Extend<T>>(&mut self) -> C {
        self.read_collect(usize::MAX)
    }

    /// Zero-copy-ish drain: hands every live element to `out`, in order, and
    /// leaves this buffer empty. `out` is cleared first. Unlike a raw
    /// pointer swap this always goes through one `VecDeque::drain` pass (no
    /// reallocation), which is the closest a safe `VecDeque`-backed buffer
    /// gets to the original's "swap storage with the caller" trick.
    pub fn read_all_swap(&mut self, out: &mut Vec<T>) {
        out.clear();
        out.extend(self.data.drain(..));
        self.maybe_shrink();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_then_read_round_trips() {
        let mut buf = IOBuffer::<i32>::new(0);
        assert!(buf.write_slice(&[1, 2, 3]));
        let out: Vec<i32> = buf.read_all_collect();
        assert_eq!(out, vec![1, 2, 3]);
    }

    #[test]
    fn size_plus_free_space_equals_max_size() {
        let mut buf = IOBuffer::<i32>::new(4);
        buf.write(1);
        buf.write(2);
        assert_eq!(buf.size() + buf.free_space(), buf.max_size());
    }

    #[test]
    fn write_over_limit_is_rejected_and_unchanged() {
        let mut buf = IOBuffer::<i32>::new(2);
        assert!(buf.write_slice(&[1, 2]));
        let before = buf.size();
        assert!(!buf.write_slice(&[3, 4, 5]));
        assert_eq!(buf.size(), before);
    }

    #[test]
    fn zero_length_write_always_succeeds() {
        let mut buf = IOBuffer::<i32>::new(1);
        buf.write(1);
        assert!(buf.write_slice(&[]));
    }

    #[test]
    fn predicate_may_stop_early() {
        let mut buf = IOBuffer::<i32>::new(0);
        buf.write_slice(&[1, 2, 3, 4]);
        let consumed = buf.read_with(4, |a, _b| {
            // Only take the first element.
            if a.is_empty() { 0 } else { 1 }
        });
        assert_eq!(consumed, 1);
        assert_eq!(buf.size(), 3);
    }

    #[test]
    fn clear_shrinks_storage() {
        let mut buf = IOBuffer::<i32>::new(8);
        buf.write_slice(&[1; 8]);
        buf.clear();
        assert_eq!(buf.size(), 0);
        assert!(buf.capacity() <= 8);
    }

    #[test]
    fn read_all_swap_drains_in_order() {
        let mut buf = IOBuffer::<i32>::new(0);
        buf.write_slice(&[1, 2, 3]);
        let mut out = Vec::new();
        buf.read_all_swap(&mut out);
        assert_eq!(out, vec![1, 2, 3]);
        assert_eq!(buf.size(), 0);
    }

    #[test]
    fn read_on_empty_buffer_yields_default() {
        let mut buf = IOBuffer::<i32>::new(0);
        assert_eq!(buf.read(), 0);
    }

    #[test]
    fn lowering_limit_below_count_starves_free_space() {
        let mut buf = IOBuffer::<i32>::new(8);
        buf.write_slice(&[1, 2, 3, 4]);
        buf.set_max_size(2);
        assert_eq!(buf.free_space(), 0);
        assert!(!buf.write(5));
    }
}
