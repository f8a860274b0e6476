//! The explicit doubly-linked free list.
//!
//! Free-list links are stored as 4-byte offsets from the heap's base
//! address rather than raw pointers, keeping each link field 4 bytes wide
//! regardless of host pointer width (on a 64-bit target, a raw pointer
//! would not fit in 4 bytes — see the design notes for why an offset is
//! the natural adaptation here). `NULL_OFFSET` stands in for the null
//! sentinel.
//!
//! `prepend`, `append`, and `remove` are all O(1) and never touch a
//! block's header, footer, or allocated bit — they only rewire list
//! pointers.

use crate::extend::Extend;
use crate::header::HeaderRef;
use crate::heap::Heap;
use crate::tuning::NULL_OFFSET;

impl<E: Extend> Heap<E> {
  fn to_offset(
    &self,
    b: HeaderRef,
  ) -> u32 {
    (b.addr() as usize - self.heap_start_addr()) as u32
  }

  fn from_offset(
    &self,
    offset: u32,
  ) -> Option<HeaderRef> {
    if offset == NULL_OFFSET {
      None
    } else {
      Some(unsafe { HeaderRef::new(self.heap_start_ptr().add(offset as usize)) })
    }
  }

  pub(crate) fn get_prev_free(
    &self,
    b: HeaderRef,
  ) -> Option<HeaderRef> {
    self.from_offset(unsafe { b.link_word(0) })
  }

  pub(crate) fn get_next_free(
    &self,
    b: HeaderRef,
  ) -> Option<HeaderRef> {
    self.from_offset(unsafe { b.link_word(1) })
  }

  fn set_prev_free(
    &self,
    b: HeaderRef,
    v: Option<HeaderRef>,
  ) {
    let word = v.map(|h| self.to_offset(h)).unwrap_or(NULL_OFFSET);
    unsafe { b.set_link_word(0, word) };
  }

  fn set_next_free(
    &self,
    b: HeaderRef,
    v: Option<HeaderRef>,
  ) {
    let word = v.map(|h| self.to_offset(h)).unwrap_or(NULL_OFFSET);
    unsafe { b.set_link_word(1, word) };
  }

  /// Inserts a freed block at the head of the free list.
  pub(crate) fn fl_prepend(
    &mut self,
    b: HeaderRef,
  ) {
    self.set_prev_free(b, None);
    match self.free_head {
      None => {
        self.set_next_free(b, None);
        self.free_head = Some(b);
        self.free_tail = Some(b);
      }
      Some(head) => {
        self.set_next_free(b, Some(head));
        self.set_prev_free(head, Some(b));
        self.free_head = Some(b);
      }
    }
  }

  /// Inserts a freed block at the tail of the free list.
  pub(crate) fn fl_append(
    &mut self,
    b: HeaderRef,
  ) {
    self.set_next_free(b, None);
    match self.free_tail {
      None => {
        self.set_prev_free(b, None);
        self.free_head = Some(b);
        self.free_tail = Some(b);
      }
      Some(tail) => {
        self.set_prev_free(b, Some(tail));
        self.set_next_free(tail, Some(b));
        self.free_tail = Some(b);
      }
    }
  }

  /// Removes `b` from the free list. `b` must currently be on the list.
  /// Clears `b`'s own link fields on the way out so a stale block can't
  /// be mistaken for still being free-listed.
  pub(crate) fn fl_remove(
    &mut self,
    b: HeaderRef,
  ) {
    let prev = self.get_prev_free(b);
    let next = self.get_next_free(b);

    match (prev, next) {
      (None, None) => {
        self.free_head = None;
        self.free_tail = None;
      }
      (None, Some(n)) => {
        self.set_prev_free(n, None);
        self.free_head = Some(n);
      }
      (Some(p), None) => {
        self.set_next_free(p, None);
        self.free_tail = Some(p);
      }
      (Some(p), Some(n)) => {
        self.set_next_free(p, Some(n));
        self.set_prev_free(n, Some(p));
      }
    }

    self.set_prev_free(b, None);
    self.set_next_free(b, None);
  }
}
