//! Compile-time tuning constants.
//!
//! These are the "magic numbers" of the allocator: thresholds that trade
//! fragmentation against search speed. They were chosen empirically (see
//! the design notes in the crate root) and their relative ordering matters
//! more than their exact values — `SMALL_ALLOC_THRESHOLD < REALLOC_SPLIT_THRESHOLD
//! < LARGE_REQUEST_THRESHOLD < SMALL_BLOCK_THRESHOLD` should hold after any
//! retuning.

/// Size of a header/footer word and of a free-list link field.
pub const WSIZE: usize = 4;

/// Combined size of a block's header and footer.
pub const DSIZE: usize = 8;

/// Smallest block capable of holding both boundary tags and, once free,
/// both free-list link fields.
pub const MIN_BLOCK_SIZE: usize = 16;

/// Bytes requested from the heap extender the first time a heap is
/// initialized, seeding the free list with one block.
pub const INITIAL_HEAP_EXTENSION: usize = 200;

/// Placement: requests at or below this many bytes are carved from
/// the *low* address of a split free block, leaving the remainder at the
/// high address; larger requests are carved from the high address. Keeps
/// short-lived small allocations clustered together.
pub const SMALL_ALLOC_THRESHOLD: usize = 25;

/// Realloc: the shrink and grow-in-place paths only split off a
/// free remainder once it exceeds this many bytes. Below it, the slack is
/// left allocated rather than split, to avoid thrashing the free list on
/// repeated small resizes.
pub const REALLOC_SPLIT_THRESHOLD: usize = 250;

/// Fit search: requests above this many bytes search the free list
/// from the tail, where large freed blocks cluster; requests at or below
/// it search from the head, where small freed blocks cluster.
pub const LARGE_REQUEST_THRESHOLD: usize = 270;

/// Coalescing: a newly-freed block smaller than this is prepended
/// to the free list (kept near the head, where small-request search
/// starts); a block at or above it is appended (kept near the tail).
pub const SMALL_BLOCK_THRESHOLD: usize = 1000;

/// Sentinel stored in a free-list link field to mean "no neighbor".
pub const NULL_OFFSET: u32 = u32::MAX;

const _ORDERING_HOLDS: () = {
  assert!(SMALL_ALLOC_THRESHOLD < REALLOC_SPLIT_THRESHOLD);
  assert!(REALLOC_SPLIT_THRESHOLD < LARGE_REQUEST_THRESHOLD);
  assert!(LARGE_REQUEST_THRESHOLD < SMALL_BLOCK_THRESHOLD);
};
