//! The six concrete walkthroughs: init+free, split-on-placement,
//! three-way coalescing, realloc-grows-in-place,
//! realloc-grows-by-relocation, and heap-extension-on-exhaustion.
//!
//! All run against [`VecExtend`] so they don't depend on process-wide
//! `sbrk` state and can run in parallel with each other.

use tagalloc::{Heap, VecExtend};

fn heap(capacity: usize) -> Heap<VecExtend> {
  Heap::with_extend(VecExtend::with_capacity(capacity)).expect("heap init")
}

#[test]
fn init_then_single_malloc_free_restores_one_free_block() {
  let mut h = heap(4096);
  h.check_invariants();

  let p = h.malloc(24);
  assert!(!p.is_null());
  h.check_invariants();

  h.free(p);
  h.check_invariants();

  let stats = h.stats();
  assert_eq!(stats.free_blocks, 1);
  assert_eq!(stats.live_bytes, 0);
  assert_eq!(stats.heap_bytes, 200, "initial slab should be fully restored");
}

#[test]
fn split_on_placement_carves_small_request_from_the_low_address() {
  let mut h = heap(4096);

  // required_block_size(16) == 24 <= SMALL_ALLOC_THRESHOLD (25), so the
  // allocation is carved from the low address of the initial 200-byte
  // free block, leaving a 176-byte free remainder.
  let p = h.malloc(16);
  assert!(!p.is_null());
  h.check_invariants();

  let stats = h.stats();
  assert_eq!(stats.heap_bytes, 200);
  assert_eq!(stats.live_bytes, 24);
  assert_eq!(stats.free_blocks, 1);

  unsafe {
    p.write_bytes(0x11, 16);
    for i in 0..16 {
      assert_eq!(*p.add(i), 0x11);
    }
  }
}

#[test]
fn three_adjacent_blocks_coalesce_into_one_on_freeing_the_middle_last() {
  let mut h = heap(4096);

  let a = h.malloc(32);
  let b = h.malloc(32);
  let c = h.malloc(32);
  assert!(!a.is_null() && !b.is_null() && !c.is_null());
  h.check_invariants();

  h.free(a);
  h.check_invariants();
  h.free(c);
  h.check_invariants();
  h.free(b);
  h.check_invariants();

  let stats = h.stats();
  assert_eq!(stats.free_blocks, 1, "a, b, c must merge into a single free block");
  assert_eq!(stats.live_bytes, 0);
  assert_eq!(stats.heap_bytes, 200);
}

#[test]
fn realloc_grows_in_place_by_absorbing_a_free_right_neighbor() {
  let mut h = heap(4096);

  // Requests this large (required_block_size(32) == 40 >
  // SMALL_ALLOC_THRESHOLD) are split from the *high* address of the
  // donor block, so the first block malloc'd ends up physically
  // adjacent to the epilogue and the second ends up adjacent to the
  // first. Freeing `a` frees `b`'s right neighbor, not the other way
  // around.
  let a = h.malloc(32);
  let b = h.malloc(32);
  assert!(!a.is_null() && !b.is_null());
  h.free(a);
  h.check_invariants();

  let q = h.realloc(b, 56);
  h.check_invariants();

  assert_eq!(q, b, "growing into a free right neighbor must not move the block");
}

#[test]
fn realloc_relocates_when_it_cannot_grow_in_place() {
  let mut h = heap(4096);

  let a = h.malloc(32);
  assert!(!a.is_null());
  unsafe {
    for i in 0..32u8 {
      *a.add(i as usize) = i;
    }
  }
  let b = h.malloc(32);
  assert!(!b.is_null());

  let q = h.realloc(a, 200);
  h.check_invariants();

  assert_ne!(q, a, "b is allocated, so a cannot grow in place");
  assert!(!q.is_null());
  unsafe {
    for i in 0..32u8 {
      assert_eq!(*q.add(i as usize), i, "payload must be preserved across relocation");
    }
  }
}

#[test]
fn heap_grows_to_satisfy_many_allocations_and_fully_coalesces_on_free() {
  let mut h = heap(200_000);

  let mut ptrs = Vec::with_capacity(1000);
  for _ in 0..1000 {
    let p = h.malloc(32);
    assert!(!p.is_null(), "allocation failed before backing capacity was exhausted");
    assert_eq!(p as usize % 8, 0, "payload must be 8-byte aligned");
    ptrs.push(p);
  }
  h.check_invariants();

  let mut unique = ptrs.clone();
  unique.sort_unstable();
  unique.dedup();
  assert_eq!(unique.len(), ptrs.len(), "all 1000 pointers must be distinct");

  for p in ptrs {
    h.free(p);
  }
  h.check_invariants();

  let stats = h.stats();
  assert_eq!(
    stats.free_blocks, 1,
    "freeing every allocation must coalesce the whole heap into one free block"
  );
  assert_eq!(stats.live_bytes, 0);
}
