//!Stream pump moving bytes between reader and writer through the engine.
//!
//!The pump owns two chunk buffers for the duration of one operation and
//!re-uses them across iterations.
//!Outer loop: poll cancellation, read one input chunk, pick flush mode.
//!Inner loop: step the engine over the chunk and write whatever it
//!produced, until the engine stops filling the output chunk completely.
//!The two exit conditions are deliberately kept separate: running out of
//!input and running out of pending output are different events.

use crate::cancel::{self, CancelFlag};
use crate::engine::{Compressor, Decompressor, Deflate, Flush, Inflate, ZlibOptions};
use crate::error::Error;

use std::io::{self, Read, Write};

use tracing::debug;

///Default chunk capacity of pump buffers.
pub const CHUNK_SIZE: usize = 16 * 1024;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
///Operation selector for [run].
pub enum Mode {
    ///Compress input into output.
    Compress,
    ///Decompress input into output.
    Decompress,
}

///Pump configuration.
pub struct PumpOptions {
    pub(crate) codec: ZlibOptions,
    pub(crate) chunk_size: usize,
}

impl PumpOptions {
    #[inline(always)]
    ///Creates new default options.
    pub const fn new() -> Self {
        Self {
            codec: ZlibOptions::new(),
            chunk_size: CHUNK_SIZE,
        }
    }

    #[inline]
    ///Sets codec options.
    ///
    ///The compress direction uses them in full; the decompress direction
    ///only takes the container to know which framing to expect.
    pub const fn codec(mut self, codec: ZlibOptions) -> Self {
        self.codec = codec;
        self
    }

    #[inline]
    ///Sets chunk capacity of both pump buffers.
    ///
    ///Capacity affects I/O granularity only, never the produced byte
    ///stream.
    pub const fn chunk_size(mut self, chunk_size: usize) -> Self {
        assert!(chunk_size > 0);
        self.chunk_size = chunk_size;
        self
    }
}

impl Default for PumpOptions {
    #[inline(always)]
    fn default() -> Self {
        Self::new()
    }
}

//Reads until `buf` is full or the source is exhausted, so a short count
//can only mean end of input. The pump termination logic relies on it.
fn fill_chunk<R: Read>(input: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match input.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(len) => filled += len,
            Err(error) if error.kind() == io::ErrorKind::Interrupted => continue,
            Err(error) => return Err(error),
        }
    }
    Ok(filled)
}

///Drives `engine` until input is exhausted and the final flush is fully
///written, checking `cancel` before each input read.
///
///Engine state is released on every exit path, success or not.
///An empty input still performs one terminal feed, so compressing zero
///bytes produces a valid minimal stream.
pub fn compress_stream<C, R, W>(mut engine: C, mut input: R, mut output: W, chunk_size: usize, cancel: &CancelFlag) -> Result<(), Error>
where
    C: Compressor,
    R: Read,
    W: Write,
{
    let mut in_buf = vec![0u8; chunk_size];
    let mut out_buf = vec![0u8; chunk_size];
    let mut total_in = 0u64;
    let mut total_out = 0u64;

    loop {
        if cancel.is_triggered() {
            debug!(total_in, "compression cancelled");
            return Err(Error::Cancelled);
        }

        let len = fill_chunk(&mut input, &mut in_buf).map_err(Error::InputRead)?;
        total_in += len as u64;

        //A short read is end of input; the terminal feed carries Finish
        //even when it is zero bytes long.
        let flush = match len < in_buf.len() {
            true => Flush::Finish,
            false => Flush::None,
        };

        let mut chunk = &in_buf[..len];
        loop {
            let step = engine.step(chunk, &mut out_buf, flush).map_err(Error::EngineStep)?;

            let produced = out_buf.len() - step.output_remain;
            if produced > 0 {
                output.write_all(&out_buf[..produced]).map_err(Error::OutputWrite)?;
                total_out += produced as u64;
            }

            chunk = &chunk[chunk.len() - step.input_remain..];

            match flush {
                //Terminal feed drains until the engine confirms the
                //stream is complete, not merely until output stops
                //filling up.
                Flush::Finish => {
                    if step.stream_end {
                        break;
                    }
                },
                Flush::None => {
                    if step.output_remain > 0 {
                        break;
                    }
                },
            }
        }

        if flush == Flush::Finish {
            break;
        }
    }

    debug!(total_in, total_out, "compression finished");
    Ok(())
}

///Drives `engine` until it reports the logical end of its stream,
///checking `cancel` before each input read.
///
///Input exhaustion before the engine reports stream end is
///[Error::TruncatedStream], never silent success.
///Trailing input bytes past the stream end are left untouched.
pub fn decompress_stream<D, R, W>(mut engine: D, mut input: R, mut output: W, chunk_size: usize, cancel: &CancelFlag) -> Result<(), Error>
where
    D: Decompressor,
    R: Read,
    W: Write,
{
    let mut in_buf = vec![0u8; chunk_size];
    let mut out_buf = vec![0u8; chunk_size];
    let mut total_in = 0u64;
    let mut total_out = 0u64;

    loop {
        if cancel.is_triggered() {
            debug!(total_in, "decompression cancelled");
            return Err(Error::Cancelled);
        }

        let len = fill_chunk(&mut input, &mut in_buf).map_err(Error::InputRead)?;
        if len == 0 {
            return Err(Error::TruncatedStream);
        }
        total_in += len as u64;

        let mut chunk = &in_buf[..len];
        loop {
            let step = engine.step(chunk, &mut out_buf).map_err(Error::EngineStep)?;

            let produced = out_buf.len() - step.output_remain;
            if produced > 0 {
                output.write_all(&out_buf[..produced]).map_err(Error::OutputWrite)?;
                total_out += produced as u64;
            }

            chunk = &chunk[chunk.len() - step.input_remain..];

            if step.stream_end {
                debug!(total_in, total_out, "decompression finished");
                return Ok(());
            }

            if step.output_remain > 0 {
                break;
            }
        }
    }
}

#[inline]
///Compresses `input` into `output` with default options, polling the
///process-wide cancellation flag.
pub fn compress<R: Read, W: Write>(input: R, output: W) -> Result<(), Error> {
    compress_with(input, output, &PumpOptions::new())
}

///Compresses `input` into `output` with explicit options, polling the
///process-wide cancellation flag.
pub fn compress_with<R: Read, W: Write>(input: R, output: W, opts: &PumpOptions) -> Result<(), Error> {
    let engine = Deflate::new(&opts.codec).ok_or(Error::EngineInit)?;
    compress_stream(engine, input, output, opts.chunk_size, cancel::process())
}

#[inline]
///Decompresses `input` into `output`, detecting zlib or gzip framing and
///polling the process-wide cancellation flag.
pub fn decompress<R: Read, W: Write>(input: R, output: W) -> Result<(), Error> {
    let engine = Inflate::auto().ok_or(Error::EngineInit)?;
    decompress_stream(engine, input, output, CHUNK_SIZE, cancel::process())
}

///Decompresses `input` into `output` with explicit options, expecting
///exactly the container the options name.
pub fn decompress_with<R: Read, W: Write>(input: R, output: W, opts: &PumpOptions) -> Result<(), Error> {
    let engine = Inflate::new(opts.codec.container).ok_or(Error::EngineInit)?;
    decompress_stream(engine, input, output, opts.chunk_size, cancel::process())
}

#[inline]
///Runs the operation selected by `mode` with default options.
pub fn run<R: Read, W: Write>(mode: Mode, input: R, output: W) -> Result<(), Error> {
    match mode {
        Mode::Compress => compress(input, output),
        Mode::Decompress => decompress(input, output),
    }
}
