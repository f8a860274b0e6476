//! Fit search: choosing a free block to satisfy a request.
//!
//! Search direction is size-class-directed, pairing with the
//! bimodal free-list insertion policy in `coalesce`: small freed blocks
//! cluster at the head, large ones at the tail, so each search starts
//! where candidates of its own class are densest. A one-step look at the
//! next block on the walk is a cheap refinement over plain first-fit.

use crate::extend::Extend;
use crate::header::HeaderRef;
use crate::heap::Heap;
use crate::tuning::LARGE_REQUEST_THRESHOLD;

impl<E: Extend> Heap<E> {
  /// Returns a free block of size at least `requested`, or `None` if no
  /// free block is large enough.
  pub(crate) fn find_fit(
    &self,
    requested: usize,
  ) -> Option<HeaderRef> {
    if requested > LARGE_REQUEST_THRESHOLD {
      self.find_fit_from_tail(requested)
    } else {
      self.find_fit_from_head(requested)
    }
  }

  fn find_fit_from_tail(
    &self,
    requested: usize,
  ) -> Option<HeaderRef> {
    let mut current = self.free_tail;
    while let Some(b) = current {
      if b.size() >= requested {
        if let Some(prev) = self.get_prev_free(b) {
          if prev.size() >= requested && prev.size() < b.size() {
            return Some(prev);
          }
        }
        return Some(b);
      }
      current = self.get_prev_free(b);
    }
    None
  }

  fn find_fit_from_head(
    &self,
    requested: usize,
  ) -> Option<HeaderRef> {
    let mut current = self.free_head;
    while let Some(b) = current {
      if b.size() >= requested {
        if let Some(next) = self.get_next_free(b) {
          if next.size() >= requested && next.size() < b.size() {
            return Some(next);
          }
        }
        return Some(b);
      }
      current = self.get_next_free(b);
    }
    None
  }
}
