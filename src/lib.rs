//!Interruptible streaming compression on top of zlib.
//!
//!The crate moves bytes between a reader and a writer through a stateful
//!codec engine, one fixed-size chunk at a time, and polls a lock-free
//!cancellation flag before each read so a long-running operation can be
//!interrupted at chunk granularity without corrupting already-written
//!output or leaking engine state.
//!
//!## Usage
//!
//!```rust
//!let data = &b"hello world"[..];
//!
//!let mut compressed = Vec::new();
//!zpump::compress(data, &mut compressed).expect("to compress");
//!
//!let mut restored = Vec::new();
//!zpump::decompress(compressed.as_slice(), &mut restored).expect("to decompress");
//!assert_eq!(restored, data);
//!```
//!
//!## Cancellation
//!
//!High level functions poll the process-wide flag.
//!Wire your interrupt notification to it, then run the pump as usual:
//!
//!```rust,no_run
//!zpump::cancel::process().trigger();
//!```
//!
//!The triggering side performs a single atomic store, so it is safe to
//!call from a signal handler.

#![warn(missing_docs)]

pub mod cancel;
pub mod engine;
mod error;
pub mod pump;

pub use cancel::CancelFlag;
pub use error::Error;
pub use pump::{compress, compress_with, decompress, decompress_with, run, Mode, PumpOptions, CHUNK_SIZE};
