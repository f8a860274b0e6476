use std::fmt;

/// Errors this allocator can surface. Caller misuse (double-free, passing
/// a foreign pointer, use-after-free) is undefined behavior per the
/// allocator contract and is not represented here — see `Heap`'s
/// debug-only validation for the subset it optionally catches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocError {
  /// The heap-extension capability refused to grow the heap further.
  Exhausted,
}

impl fmt::Display for AllocError {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    match self {
      AllocError::Exhausted => {
        write!(f, "heap extension failed: backing store exhausted")
      }
    }
  }
}

impl std::error::Error for AllocError {}
