//!Pump error taxonomy.

use crate::engine::StepError;

use std::io;

///Failure of a single pump operation.
///
///Every failure is terminal for the current operation and the codec state
///is released exactly once on every path.
///There are no retries inside the pump; the caller may retry the whole
///operation.
///
///Cancellation is a distinct outcome rather than a failure of data
///integrity, so callers can report "interrupted" separately from
///"failed".
#[derive(Debug, thiserror::Error)]
pub enum Error {
    ///Codec engine could not allocate or initialize its internal state.
    #[error("unable to initialize codec engine")]
    EngineInit,
    ///Input source reported a hard read error, which is not end of input.
    #[error("unable to read input: {0}")]
    InputRead(#[source] io::Error),
    ///Output sink reported a write error.
    #[error("unable to write output: {0}")]
    OutputWrite(#[source] io::Error),
    ///Codec engine reported a failure while processing a chunk.
    #[error("codec engine failed: {0}")]
    EngineStep(#[source] StepError),
    ///Cancellation flag was observed before an input read.
    #[error("operation was cancelled")]
    Cancelled,
    ///Input was exhausted before the engine recognized a complete stream.
    ///
    ///Returned by decompression only: running out of input bytes is not
    ///the same as consuming a well-formed stream to its logical end.
    #[error("compressed stream is truncated")]
    TruncatedStream,
}
