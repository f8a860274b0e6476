//! The heap-extension capability this allocator is built over.
//!
//! `Extend` models the external collaborator that, on request, grows a
//! single contiguous region and hands back the address of the first new
//! byte. This crate
//! ships two implementations: [`SbrkExtend`], which does it for real via
//! `sbrk(2)` the same way the allocator this crate grew out of did; and
//! [`VecExtend`], a fixed-capacity arena used by tests and the trace
//! driver so the test suite doesn't depend on process-wide `sbrk` state.

use crate::error::AllocError;

/// # Safety
///
/// Implementors must return a fresh, exactly `bytes`-long byte range on
/// each successful call, and that range must immediately follow the
/// range returned by the previous successful call — the allocator relies
/// on extension producing one monotonically growing, contiguous region.
pub unsafe trait Extend {
  fn extend(
    &mut self,
    bytes: usize,
  ) -> Result<*mut u8, AllocError>;
}

/// Grows the heap via the POSIX `sbrk` system call.
pub struct SbrkExtend;

unsafe impl Extend for SbrkExtend {
  fn extend(
    &mut self,
    bytes: usize,
  ) -> Result<*mut u8, AllocError> {
    let addr = unsafe { libc::sbrk(bytes as libc::intptr_t) };
    if addr == usize::MAX as *mut libc::c_void {
      return Err(AllocError::Exhausted);
    }
    Ok(addr as *mut u8)
  }
}

/// Grows a fixed-capacity, heap-allocated arena instead of the process
/// break. The arena is allocated once at construction and never moves or
/// reallocates, so addresses handed out by `extend` stay valid for the
/// arena's lifetime — unlike a plain growable `Vec<u8>`, which would
/// invalidate every previously returned pointer on reallocation.
pub struct VecExtend {
  arena: Box<[u8]>,
  used: usize,
}

impl VecExtend {
  pub fn with_capacity(capacity: usize) -> Self {
    Self {
      arena: vec![0u8; capacity].into_boxed_slice(),
      used: 0,
    }
  }
}

unsafe impl Extend for VecExtend {
  fn extend(
    &mut self,
    bytes: usize,
  ) -> Result<*mut u8, AllocError> {
    if self.used + bytes > self.arena.len() {
      return Err(AllocError::Exhausted);
    }
    let ptr = unsafe { self.arena.as_mut_ptr().add(self.used) };
    self.used += bytes;
    Ok(ptr)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn vec_extend_hands_out_contiguous_growing_ranges() {
    let mut e = VecExtend::with_capacity(64);
    let a = e.extend(16).unwrap();
    let b = e.extend(16).unwrap();
    assert_eq!(unsafe { a.add(16) }, b);
  }

  #[test]
  fn vec_extend_fails_past_capacity() {
    let mut e = VecExtend::with_capacity(32);
    assert!(e.extend(16).is_ok());
    assert!(e.extend(16).is_ok());
    assert_eq!(e.extend(1), Err(AllocError::Exhausted));
  }
}
