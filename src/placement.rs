//! Placement: converting a selected free block into an allocated block,
//! splitting off a free remainder when the block is larger than needed.
//!
//! The split is asymmetric by design: very small requests are
//! carved from the low address of the free block, larger requests from
//! the high address, so that short-lived small allocations cluster
//! together and large allocations leave the low end of the donor block
//! intact for reuse.

use crate::extend::Extend;
use crate::header::HeaderRef;
use crate::heap::Heap;
use crate::tuning::{DSIZE, SMALL_ALLOC_THRESHOLD};

impl<E: Extend> Heap<E> {
  /// Removes `b` from the free list and returns a block of exactly
  /// `requested` bytes, allocated, splitting off and coalescing a free
  /// remainder if one large enough to be a valid block remains.
  pub(crate) fn place(
    &mut self,
    b: HeaderRef,
    requested: usize,
  ) -> HeaderRef {
    let block_size = b.size();
    self.fl_remove(b);

    if block_size - requested <= DSIZE {
      // Remainder too small to host a valid free block; hand over
      // the whole thing.
      b.write(block_size, true);
      return b;
    }

    if requested <= SMALL_ALLOC_THRESHOLD {
      b.write(requested, true);
      let remainder = unsafe { b.next() };
      remainder.write(block_size - requested, false);
      self.coalesce(remainder);
      b
    } else {
      b.write(block_size - requested, false);
      let allocated = unsafe { b.next() };
      allocated.write(requested, true);
      self.coalesce(b);
      allocated
    }
  }
}

#[cfg(test)]
mod tests {
  use crate::extend::VecExtend;
  use crate::heap::Heap;

  #[test]
  fn a_request_on_either_side_of_the_split_threshold_both_succeed() {
    // required_block_size(16) == 24 <= SMALL_ALLOC_THRESHOLD (25): low-address split.
    // required_block_size(17) == 32 >  SMALL_ALLOC_THRESHOLD (25): high-address split.
    let mut h = Heap::with_extend(VecExtend::with_capacity(4096)).unwrap();
    let small = h.malloc(16);
    let large = h.malloc(17);
    assert!(!small.is_null());
    assert!(!large.is_null());
    assert_ne!(small, large);
    h.check_invariants();
    h.free(small);
    h.free(large);
    h.check_invariants();
  }
}
