//! Coalescing: merging a newly-freed block with its physical neighbors.
//!
//! The four cases are distinguished solely by the allocated bit of the
//! physical predecessor and successor, read through boundary-tag
//! navigation. The prologue and epilogue are always allocated, so the
//! first and last real blocks never look past the heap's ends.

use crate::extend::Extend;
use crate::header::HeaderRef;
use crate::heap::Heap;
use crate::tuning::SMALL_BLOCK_THRESHOLD;

impl<E: Extend> Heap<E> {
  /// Inserts a freed block into the free list: small blocks near the
  /// head (where small-request fit search starts), large blocks near
  /// the tail (where large-request fit search starts).
  fn insert_free(
    &mut self,
    b: HeaderRef,
  ) {
    if b.size() < SMALL_BLOCK_THRESHOLD {
      self.fl_prepend(b);
    } else {
      self.fl_append(b);
    }
  }

  /// Coalesces `b` — a block about to become free — with its physical
  /// neighbors and inserts the surviving block into the free list.
  /// Returns the surviving block's header.
  pub(crate) fn coalesce(
    &mut self,
    b: HeaderRef,
  ) -> HeaderRef {
    let prev = unsafe { b.prev() };
    let next = unsafe { b.next() };
    let prev_free = !prev.allocated();
    let next_free = !next.allocated();

    match (prev_free, next_free) {
      (false, false) => {
        b.write(b.size(), false);
        self.insert_free(b);
        b
      }
      (false, true) => {
        self.fl_remove(next);
        let merged = b.size() + next.size();
        b.write(merged, false);
        self.insert_free(b);
        b
      }
      (true, false) => {
        let merged = prev.size() + b.size();
        prev.write(merged, false);
        prev
      }
      (true, true) => {
        self.fl_remove(next);
        let merged = prev.size() + b.size() + next.size();
        prev.write(merged, false);
        prev
      }
    }
  }
}
