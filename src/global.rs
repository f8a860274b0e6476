//! A `#[global_allocator]`-installable wrapper around [`Heap`].
//!
//! This allocator is single-threaded by design (see the design notes):
//! it holds no internal synchronization, only a reentrancy guard. Using
//! `GlobalHeap` as the process allocator in a multi-threaded binary is
//! unsound without an external mutex serializing every call — that
//! mutex is the caller's responsibility, not this crate's.

use std::alloc::{GlobalAlloc, Layout};
use std::cell::{Cell, RefCell};

use crate::extend::SbrkExtend;
use crate::heap::Heap;
use crate::tuning::DSIZE;

/// Lazily initializes a [`Heap<SbrkExtend>`] on first use and exposes it
/// through `GlobalAlloc`.
pub struct GlobalHeap {
  inner: RefCell<Option<Heap<SbrkExtend>>>,
  entered: Cell<bool>,
}

// Not actually thread-safe — see the module doc. Required so a `static
// GlobalHeap` can be named in a `#[global_allocator]` item.
unsafe impl Sync for GlobalHeap {}

impl GlobalHeap {
  pub const fn new() -> Self {
    Self {
      inner: RefCell::new(None),
      entered: Cell::new(false),
    }
  }

  fn with_heap<R>(
    &self,
    f: impl FnOnce(&mut Heap<SbrkExtend>) -> R,
  ) -> Option<R> {
    if self.entered.replace(true) {
      debug_assert!(false, "reentrant call into GlobalHeap");
      return None;
    }
    let result = (|| {
      let mut guard = self.inner.borrow_mut();
      if guard.is_none() {
        *guard = Heap::with_extend(SbrkExtend).ok();
      }
      guard.as_mut().map(f)
    })();
    self.entered.set(false);
    result
  }
}

impl Default for GlobalHeap {
  fn default() -> Self {
    Self::new()
  }
}

unsafe impl GlobalAlloc for GlobalHeap {
  unsafe fn alloc(
    &self,
    layout: Layout,
  ) -> *mut u8 {
    if layout.align() > DSIZE {
      return std::ptr::null_mut();
    }
    self.with_heap(|heap| heap.malloc(layout.size()))
      .unwrap_or(std::ptr::null_mut())
  }

  unsafe fn dealloc(
    &self,
    ptr: *mut u8,
    _layout: Layout,
  ) {
    self.with_heap(|heap| heap.free(ptr));
  }

  unsafe fn realloc(
    &self,
    ptr: *mut u8,
    layout: Layout,
    new_size: usize,
  ) -> *mut u8 {
    if layout.align() > DSIZE {
      return std::ptr::null_mut();
    }
    self.with_heap(|heap| heap.realloc(ptr, new_size))
      .unwrap_or(std::ptr::null_mut())
  }
}
