//! # tagalloc - An Explicit Free-List Memory Allocator
//!
//! This crate provides a single-threaded dynamic memory allocator over a
//! single, contiguously growing heap. It implements the four classical
//! allocation operations — init, malloc, free, realloc — on top of an
//! explicit doubly-linked free list with boundary-tag block headers.
//!
//! ## Overview
//!
//! ```text
//!   Block layout (every block, allocated or free):
//!
//!   ┌────────┬─────────────────────────────────┬────────┐
//!   │ header │             payload              │ footer │
//!   │ 4 bytes│          size - 8 bytes          │ 4 bytes│
//!   └────────┴─────────────────────────────────┴────────┘
//!
//!   header/footer word: [ size : 29 bits ][ unused : 2 ][ allocated : 1 ]
//!
//!   A free block overlays two 4-byte link fields across the first 8
//!   bytes of its payload:
//!
//!   ┌────────┬───────────┬───────────┬─────────────────┬────────┐
//!   │ header │ prev-free │ next-free │  (unused slack)  │ footer │
//!   └────────┴───────────┴───────────┴─────────────────┴────────┘
//! ```
//!
//! ## Heap layout
//!
//! ```text
//!   ┌──────┬───────────┬──────────────────────────────┬───────────┐
//!   │ pad  │ prologue  │   real blocks, back-to-back   │ epilogue  │
//!   │4 byte│ 8 bytes   │                                │ 4 bytes   │
//!   └──────┴───────────┴──────────────────────────────┴───────────┘
//!                                                       size 0, allocated
//! ```
//!
//! Prologue and epilogue are always marked allocated, so boundary-tag
//! navigation never has to special-case the ends of the heap: the
//! prologue short-circuits backward coalescing at the first real block,
//! the epilogue short-circuits forward coalescing at the last.
//!
//! ## Crate structure
//!
//! ```text
//!   tagalloc
//!   ├── align       - alignment rounding
//!   ├── header      - block header/footer encoding and navigation
//!   ├── free_list   - explicit doubly-linked free list (prepend/append/remove)
//!   ├── coalesce    - merging a freed block with its physical neighbors
//!   ├── placement   - splitting an oversized free block for an allocation
//!   ├── fit         - size-class-directed free-list search
//!   ├── heap        - public API: init, malloc, free, realloc
//!   ├── extend      - the heap-extension capability (sbrk, or an in-memory arena)
//!   ├── error       - AllocError
//!   └── global      - a #[global_allocator]-installable wrapper
//! ```
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use tagalloc::{Heap, SbrkExtend};
//!
//! let mut heap = Heap::with_extend(SbrkExtend).expect("heap init failed");
//! let p = heap.malloc(64);
//! assert!(!p.is_null());
//! heap.free(p);
//! ```
//!
//! ## Safety
//!
//! This allocator is single-threaded: it holds process-wide mutable state
//! (heap bounds, free-list head and tail) with no internal
//! synchronization. A shared `Heap` requires an external mutex. It does
//! not return memory to the operating system, does not red-zone or
//! poison freed memory, and supports alignment no stricter than 8 bytes.

mod align;
mod coalesce;
mod error;
mod extend;
mod fit;
mod free_list;
pub mod global;
mod header;
mod heap;
mod placement;
mod tuning;

pub use error::AllocError;
pub use extend::{Extend, SbrkExtend, VecExtend};
pub use global::GlobalHeap;
pub use header::HeaderRef;
pub use heap::{Heap, HeapStats};
pub use tuning::{
  DSIZE, INITIAL_HEAP_EXTENSION, LARGE_REQUEST_THRESHOLD, MIN_BLOCK_SIZE,
  REALLOC_SPLIT_THRESHOLD, SMALL_ALLOC_THRESHOLD, SMALL_BLOCK_THRESHOLD, WSIZE,
};
