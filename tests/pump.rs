use std::io::{self, Read, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use proptest::prelude::*;

use zpump::engine::{Compressor, Container, Deflate, Flush, Inflate, Step, StepError, ZlibOptions};
use zpump::pump::{compress_stream, decompress_stream};
use zpump::{CancelFlag, Error, Mode, PumpOptions};

fn sample(len: usize) -> Vec<u8> {
    (0..len).map(|idx| (idx * 31 % 251) as u8).collect()
}

fn compress_to_vec(data: &[u8]) -> Vec<u8> {
    let mut compressed = Vec::new();
    zpump::compress(data, &mut compressed).expect("to compress");
    compressed
}

///Reader producing a deterministic pattern of known total length without
///holding it in memory.
struct PatternReader {
    position: u64,
    remaining: u64,
}

impl PatternReader {
    fn new(total: u64) -> Self {
        Self {
            position: 0,
            remaining: total,
        }
    }
}

fn pattern_byte(position: u64) -> u8 {
    ((position % 509) * 7 % 251) as u8
}

impl Read for PatternReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let len = buf.len().min(self.remaining as usize);
        for slot in buf[..len].iter_mut() {
            *slot = pattern_byte(self.position);
            self.position += 1;
        }
        self.remaining -= len as u64;
        Ok(len)
    }
}

///Writer that only keeps a digest and a byte count.
struct DigestWriter {
    hasher: crc32fast::Hasher,
    written: u64,
}

impl DigestWriter {
    fn new() -> Self {
        Self {
            hasher: crc32fast::Hasher::new(),
            written: 0,
        }
    }
}

impl Write for DigestWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.hasher.update(buf);
        self.written += buf.len() as u64;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

struct CountingWriter {
    writes: usize,
}

impl Write for CountingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.writes += 1;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

struct FailingWriter {
    writes: usize,
    fail_on: usize,
}

impl Write for FailingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.writes += 1;
        if self.writes >= self.fail_on {
            Err(io::Error::new(io::ErrorKind::Other, "sink refused write"))
        } else {
            Ok(buf.len())
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

struct FailingReader;

impl Read for FailingReader {
    fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::Other, "source refused read"))
    }
}

///Engine double that counts its own release and keeps the pump writing
///by pretending every step fills the whole output chunk.
struct ChattyEngine {
    releases: Arc<AtomicUsize>,
}

impl Compressor for ChattyEngine {
    fn step(&mut self, _: &[u8], output: &mut [u8], flush: Flush) -> Result<Step, StepError> {
        for byte in output.iter_mut() {
            *byte = 0xAB;
        }
        Ok(Step {
            input_remain: 0,
            output_remain: 0,
            stream_end: flush == Flush::Finish,
        })
    }
}

impl Drop for ChattyEngine {
    fn drop(&mut self) {
        self.releases.fetch_add(1, Ordering::Relaxed);
    }
}

#[test]
fn should_round_trip() {
    for len in [0usize, 1, 5, 1024, 16 * 1024, 16 * 1024 + 1, 100_000].iter() {
        let data = sample(*len);
        let compressed = compress_to_vec(&data);
        assert!(compressed.len() > 0);

        let mut restored = Vec::new();
        zpump::decompress(compressed.as_slice(), &mut restored).expect("to decompress");
        assert_eq!(restored, data);
    }
}

#[test]
fn should_produce_valid_stream_for_empty_input() {
    let compressed = compress_to_vec(&[]);
    //Header and trailer alone: empty input must not produce empty output.
    assert!(compressed.len() > 0);

    let mut restored = Vec::new();
    zpump::decompress(compressed.as_slice(), &mut restored).expect("to decompress");
    assert_eq!(restored.len(), 0);
}

#[test]
fn should_round_trip_across_chunk_sizes() {
    let data = sample(70_000);

    for (compress_chunk, decompress_chunk) in [(512usize, 16 * 1024usize), (16 * 1024, 512), (7, 4096), (4096, 7)].iter() {
        let mut compressed = Vec::new();
        let opts = PumpOptions::new().chunk_size(*compress_chunk);
        zpump::compress_with(data.as_slice(), &mut compressed, &opts).expect("to compress");

        let mut restored = Vec::new();
        let opts = PumpOptions::new().chunk_size(*decompress_chunk);
        zpump::decompress_with(compressed.as_slice(), &mut restored, &opts).expect("to decompress");
        assert_eq!(restored, data);
    }
}

#[test]
fn should_round_trip_gzip_container() {
    let data = sample(30_000);

    let mut compressed = Vec::new();
    let opts = PumpOptions::new().codec(ZlibOptions::new().container(Container::Gzip));
    zpump::compress_with(data.as_slice(), &mut compressed, &opts).expect("to compress");

    let mut restored = Vec::new();
    zpump::decompress_with(compressed.as_slice(), &mut restored, &opts).expect("to decompress");
    assert_eq!(restored, data);

    //Auto detection handles gzip framing too.
    let mut restored = Vec::new();
    zpump::decompress(compressed.as_slice(), &mut restored).expect("to decompress");
    assert_eq!(restored, data);
}

#[test]
fn should_dispatch_by_mode() {
    let data = sample(2048);

    let mut compressed = Vec::new();
    zpump::run(Mode::Compress, data.as_slice(), &mut compressed).expect("to compress");

    let mut restored = Vec::new();
    zpump::run(Mode::Decompress, compressed.as_slice(), &mut restored).expect("to decompress");
    assert_eq!(restored, data);
}

#[test]
fn should_detect_truncated_stream() {
    let data = sample(60_000);
    let compressed = compress_to_vec(&data);

    for cut in [1usize, compressed.len() / 2].iter() {
        let truncated = &compressed[..compressed.len() - cut];
        assert!(truncated.len() > 0);

        let mut restored = Vec::new();
        let result = zpump::decompress(truncated, &mut restored);
        assert!(matches!(result, Err(Error::TruncatedStream)));
    }
}

#[test]
fn should_treat_empty_input_as_truncated() {
    let mut restored = Vec::new();
    let result = zpump::decompress(&[][..], &mut restored);
    assert!(matches!(result, Err(Error::TruncatedStream)));
}

#[test]
fn should_cancel_before_first_read() {
    let cancel = CancelFlag::new();
    cancel.trigger();

    let engine = Deflate::new(&ZlibOptions::new()).expect("to create deflate state");
    let mut output = CountingWriter { writes: 0 };
    let result = compress_stream(engine, FailingReader, &mut output, 1024, &cancel);
    assert!(matches!(result, Err(Error::Cancelled)));
    assert_eq!(output.writes, 0);

    let engine = Inflate::auto().expect("to create inflate state");
    let mut output = CountingWriter { writes: 0 };
    let result = decompress_stream(engine, FailingReader, &mut output, 1024, &cancel);
    assert!(matches!(result, Err(Error::Cancelled)));
    assert_eq!(output.writes, 0);

    cancel.reset();
    assert!(!cancel.is_triggered());
}

#[test]
fn should_cancel_between_chunks() {
    ///Reader that triggers the flag once a chunk has been served.
    struct TriggeringReader<'a> {
        data: &'a [u8],
        cancel: &'a CancelFlag,
    }

    impl<'a> Read for TriggeringReader<'a> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.cancel.trigger();
            let len = buf.len().min(self.data.len());
            buf[..len].copy_from_slice(&self.data[..len]);
            self.data = &self.data[len..];
            Ok(len)
        }
    }

    let cancel = CancelFlag::new();
    let data = sample(256 * 1024);
    let input = TriggeringReader {
        data: &data,
        cancel: &cancel,
    };

    let engine = Deflate::new(&ZlibOptions::new()).expect("to create deflate state");
    let result = compress_stream(engine, input, Vec::new(), 1024, &cancel);
    assert!(matches!(result, Err(Error::Cancelled)));
}

#[test]
fn should_release_engine_on_write_failure() {
    let releases = Arc::new(AtomicUsize::new(0));
    let engine = ChattyEngine {
        releases: releases.clone(),
    };

    let data = sample(1024);
    let output = FailingWriter {
        writes: 0,
        fail_on: 3,
    };
    let result = compress_stream(engine, data.as_slice(), output, 256, &CancelFlag::new());
    assert!(matches!(result, Err(Error::OutputWrite(_))));
    assert_eq!(releases.load(Ordering::Relaxed), 1);
}

#[test]
fn should_report_read_failure() {
    let engine = Deflate::new(&ZlibOptions::new()).expect("to create deflate state");
    let result = compress_stream(engine, FailingReader, Vec::new(), 1024, &CancelFlag::new());
    assert!(matches!(result, Err(Error::InputRead(_))));
}

#[test]
fn should_report_malformed_input() {
    let mut restored = Vec::new();
    let result = zpump::decompress(&b"this is not a compressed stream at all"[..], &mut restored);
    assert!(matches!(result, Err(Error::EngineStep(StepError::Data))));
}

#[test]
fn should_stream_large_input_with_bounded_buffers() {
    const TOTAL: u64 = 32 * 1024 * 1024;

    let mut expected = DigestWriter::new();
    io::copy(&mut PatternReader::new(TOTAL), &mut expected).expect("to digest pattern");
    assert_eq!(expected.written, TOTAL);

    let mut compressed = Vec::new();
    zpump::compress(PatternReader::new(TOTAL), &mut compressed).expect("to compress");
    //The pattern is periodic, the stream must come out much smaller.
    assert!((compressed.len() as u64) < TOTAL / 8);

    let mut restored = DigestWriter::new();
    zpump::decompress(compressed.as_slice(), &mut restored).expect("to decompress");
    assert_eq!(restored.written, TOTAL);
    assert_eq!(restored.hasher.finalize(), expected.hasher.finalize());
}

proptest! {
    #[test]
    fn round_trips_arbitrary_payloads(data in proptest::collection::vec(any::<u8>(), 0..4096)) {
        let compressed = compress_to_vec(&data);

        let mut restored = Vec::new();
        zpump::decompress(compressed.as_slice(), &mut restored).expect("to decompress");
        prop_assert_eq!(restored, data);
    }
}
