//!Codec engine interface.
//!
//!The pump consumes compression as a capability: an opaque state created
//!per operation, stepped one chunk at a time and released on drop.
//!Ownership enforces single-owner access, so a state cannot be shared
//!between operations or used after release.

pub(crate) mod alloc;
pub mod zlib;

pub use zlib::{Container, Deflate, Inflate, ZlibOptions, ZlibStrategy};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
///Flush directive for a compression step.
pub enum Flush {
    ///More input will follow.
    None,
    ///This feed is the last one; emit all pending output and the trailer.
    ///
    ///After issuing `Finish`, no new input may be fed.
    Finish,
}

#[derive(Debug, Copy, Clone)]
///Outcome of a single engine step.
pub struct Step {
    ///Number of bytes left unconsumed in `input`.
    pub input_remain: usize,
    ///Number of bytes left unused in `output`.
    pub output_remain: usize,
    ///Whether the engine recognized the logical end of its stream.
    ///
    ///Distinct from merely running out of input bytes: the engine saw a
    ///complete well-formed unit, final block and trailer included.
    pub stream_end: bool,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
///Engine failure during a step.
pub enum StepError {
    ///Internal stream state is inconsistent.
    #[error("codec stream state is inconsistent")]
    Stream,
    ///Input bytes are not valid compressed data.
    #[error("input is not valid compressed data")]
    Data,
    ///Engine could not allocate memory to continue.
    #[error("codec engine is out of memory")]
    Memory,
    ///Failure with raw engine code not covered by other variants.
    #[error("codec engine failed with code {0}")]
    Other(i32),
}

///Compression half of the codec capability.
pub trait Compressor {
    ///Consumes bytes from `input`, writing compressed bytes into `output`.
    ///
    ///The engine tracks its own cursor: call again with the unconsumed
    ///tail of `input` while `output` keeps coming back completely filled.
    fn step(&mut self, input: &[u8], output: &mut [u8], flush: Flush) -> Result<Step, StepError>;
}

///Decompression half of the codec capability.
pub trait Decompressor {
    ///Consumes bytes from `input`, writing decompressed bytes into `output`.
    ///
    ///[Step::stream_end] reports that a complete compressed stream has
    ///been consumed; the pump must not interpret input exhaustion as
    ///success.
    fn step(&mut self, input: &[u8], output: &mut [u8]) -> Result<Step, StepError>;
}
