//! Replays a textual allocation trace against a [`tagalloc::Heap`] and
//! reports utilization.
//!
//! Trace format, one event per line:
//!
//! ```text
//! a <id> <size>   allocate <size> bytes, remember the result as <id>
//! f <id>          free the block remembered as <id>
//! r <id> <size>   realloc the block remembered as <id> to <size> bytes
//! ```
//!
//! Blank lines and lines starting with `#` are ignored. Run with
//! `RUST_LOG=trace` to see heap-extension and allocation decisions as
//! they happen.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::process::ExitCode;

use tagalloc::{Heap, SbrkExtend};

fn main() -> ExitCode {
  env_logger::init();

  let path = match env::args().nth(1) {
    Some(p) => p,
    None => {
      eprintln!("usage: tagalloc-trace <trace-file>");
      return ExitCode::FAILURE;
    }
  };

  let contents = match fs::read_to_string(&path) {
    Ok(c) => c,
    Err(e) => {
      eprintln!("failed to read {path}: {e}");
      return ExitCode::FAILURE;
    }
  };

  let mut heap = match Heap::with_extend(SbrkExtend) {
    Ok(h) => h,
    Err(e) => {
      eprintln!("heap init failed: {e}");
      return ExitCode::FAILURE;
    }
  };

  let mut live: HashMap<String, *mut u8> = HashMap::new();
  let mut requested_bytes: usize = 0;
  let mut events = 0usize;

  for (lineno, line) in contents.lines().enumerate() {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
      continue;
    }
    let fields: Vec<&str> = line.split_whitespace().collect();
    events += 1;

    match fields.as_slice() {
      ["a", id, size] => {
        let size: usize = match size.parse() {
          Ok(n) => n,
          Err(_) => {
            eprintln!("line {}: bad size {size:?}", lineno + 1);
            return ExitCode::FAILURE;
          }
        };
        let p = heap.malloc(size);
        if p.is_null() {
          eprintln!("line {}: malloc({size}) returned null", lineno + 1);
          return ExitCode::FAILURE;
        }
        unsafe { p.write_bytes(0xAA, size) };
        requested_bytes += size;
        live.insert((*id).to_string(), p);
      }
      ["f", id] => {
        let Some(p) = live.remove(*id) else {
          eprintln!("line {}: free of unknown id {id:?}", lineno + 1);
          return ExitCode::FAILURE;
        };
        heap.free(p);
      }
      ["r", id, size] => {
        let size: usize = match size.parse() {
          Ok(n) => n,
          Err(_) => {
            eprintln!("line {}: bad size {size:?}", lineno + 1);
            return ExitCode::FAILURE;
          }
        };
        let Some(&old) = live.get(*id) else {
          eprintln!("line {}: realloc of unknown id {id:?}", lineno + 1);
          return ExitCode::FAILURE;
        };
        let new_p = heap.realloc(old, size);
        if new_p.is_null() {
          eprintln!("line {}: realloc({id}, {size}) returned null", lineno + 1);
          return ExitCode::FAILURE;
        }
        live.insert((*id).to_string(), new_p);
      }
      _ => {
        eprintln!("line {}: unrecognized trace event {line:?}", lineno + 1);
        return ExitCode::FAILURE;
      }
    }

    #[cfg(debug_assertions)]
    heap.check_invariants();
  }

  let stats = heap.stats();
  println!("events replayed:   {events}");
  println!("bytes requested:   {requested_bytes}");
  println!("heap size:         {} bytes", stats.heap_bytes);
  println!("live bytes:        {} bytes", stats.live_bytes);
  println!("free blocks:       {}", stats.free_blocks);
  println!("live allocations:  {}", live.len());

  ExitCode::SUCCESS
}
