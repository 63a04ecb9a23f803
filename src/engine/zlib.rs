//!`zlib` engine bound through `libz-sys`.

use libz_sys as sys;

use core::ffi::c_int;
use core::{mem, ptr};

use super::alloc;
use super::{Compressor, Decompressor, Flush, Step, StepError};

const MAX_MEM_LEVEL: u8 = 8;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
///Stream framing around raw deflate data.
pub enum Container {
    ///Raw deflate stream without header or trailer.
    Raw,
    ///zlib header with adler32 trailer.
    ///
    ///Default.
    Zlib,
    ///gzip header with crc32 trailer.
    Gzip,
}

impl Container {
    #[inline(always)]
    const fn window_bits(self) -> c_int {
        match self {
            Container::Raw => -15,
            Container::Zlib => 15,
            Container::Gzip => 15 + 16,
        }
    }
}

impl Default for Container {
    #[inline(always)]
    fn default() -> Self {
        Container::Zlib
    }
}

#[derive(Debug, Copy, Clone)]
///Compression strategy.
pub enum ZlibStrategy {
    ///Default strategy.
    Default,
    ///Filtered strategy for data produced from filter.
    Filtered,
    ///Forces using Huffman encoding only, ignoring string matching.
    HuffmanOnly,
    ///Strategy optimized for PNG image.
    Rle,
    ///Prevents using dynamic Huffman codes.
    Fixed,
}

impl Default for ZlibStrategy {
    #[inline(always)]
    fn default() -> Self {
        ZlibStrategy::Default
    }
}

///Compression configuration.
pub struct ZlibOptions {
    pub(crate) container: Container,
    pub(crate) strategy: ZlibStrategy,
    pub(crate) level: i8,
    pub(crate) mem_level: u8,
}

impl ZlibOptions {
    #[inline(always)]
    ///Creates new default options.
    pub const fn new() -> Self {
        Self {
            container: Container::Zlib,
            strategy: ZlibStrategy::Default,
            level: -1,
            mem_level: MAX_MEM_LEVEL,
        }
    }

    #[inline]
    ///Sets stream container.
    pub const fn container(mut self, container: Container) -> Self {
        self.container = container;
        self
    }

    #[inline]
    ///Sets compression strategy.
    pub const fn strategy(mut self, strategy: ZlibStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    #[inline]
    ///Sets compression level in range from 1 to 9.
    ///
    ///Defaults to `-1`, letting the engine pick its own default.
    pub const fn level(mut self, level: i8) -> Self {
        assert!(level >= -1 && level <= 9);
        self.level = level;
        self
    }

    #[inline]
    ///Sets memory level in range from 1 to 8.
    ///
    ///Defaults to maximum (8).
    pub const fn mem_level(mut self, mem_level: u8) -> Self {
        assert!(mem_level >= 1 && mem_level <= MAX_MEM_LEVEL);
        self.mem_level = mem_level;
        self
    }
}

impl Default for ZlibOptions {
    #[inline(always)]
    fn default() -> Self {
        Self::new()
    }
}

fn raw_stream() -> sys::z_stream {
    sys::z_stream {
        next_in: ptr::null_mut(),
        avail_in: 0,
        total_in: 0,
        next_out: ptr::null_mut(),
        avail_out: 0,
        total_out: 0,
        msg: ptr::null_mut(),
        state: ptr::null_mut(),
        zalloc: alloc::zalloc,
        zfree: alloc::zfree,
        opaque: ptr::null_mut(),
        data_type: 0,
        adler: 0,
        reserved: 0,
    }
}

//Z_BUF_ERROR only reports lack of progress with the buffers as given,
//so the pump sees it as an ordinary not-full output.
fn map_step(stream: &sys::z_stream, result: c_int) -> Result<Step, StepError> {
    let step = Step {
        input_remain: stream.avail_in as usize,
        output_remain: stream.avail_out as usize,
        stream_end: result == sys::Z_STREAM_END,
    };

    match result {
        sys::Z_OK | sys::Z_STREAM_END | sys::Z_BUF_ERROR => Ok(step),
        sys::Z_STREAM_ERROR => Err(StepError::Stream),
        //Preset dictionaries are not supported, so Z_NEED_DICT means the
        //stream cannot be decoded.
        sys::Z_DATA_ERROR | sys::Z_NEED_DICT => Err(StepError::Data),
        sys::Z_MEM_ERROR => Err(StepError::Memory),
        other => Err(StepError::Other(other)),
    }
}

///Compression state of the zlib engine.
///
///Exclusively owned by one operation; resources are released on drop.
pub struct Deflate {
    stream: Box<sys::z_stream>,
}

impl Deflate {
    ///Creates new compression state.
    ///
    ///Returns `None` if the engine cannot allocate or initialize its
    ///internal state.
    pub fn new(opts: &ZlibOptions) -> Option<Self> {
        let mut stream = Box::new(raw_stream());

        let strategy = match opts.strategy {
            ZlibStrategy::Default => sys::Z_DEFAULT_STRATEGY,
            ZlibStrategy::Filtered => sys::Z_FILTERED,
            ZlibStrategy::HuffmanOnly => sys::Z_HUFFMAN_ONLY,
            ZlibStrategy::Rle => sys::Z_RLE,
            ZlibStrategy::Fixed => sys::Z_FIXED,
        };

        let result = unsafe {
            sys::deflateInit2_(
                &mut *stream,
                opts.level as c_int,
                sys::Z_DEFLATED,
                opts.container.window_bits(),
                opts.mem_level as c_int,
                strategy,
                sys::zlibVersion(),
                mem::size_of::<sys::z_stream>() as c_int,
            )
        };

        if result == sys::Z_OK {
            Some(Self { stream })
        } else {
            None
        }
    }
}

impl Compressor for Deflate {
    fn step(&mut self, input: &[u8], output: &mut [u8], flush: Flush) -> Result<Step, StepError> {
        let flush = match flush {
            Flush::None => sys::Z_NO_FLUSH,
            Flush::Finish => sys::Z_FINISH,
        };

        self.stream.avail_in = input.len() as _;
        self.stream.next_in = input.as_ptr() as *mut _;
        self.stream.avail_out = output.len() as _;
        self.stream.next_out = output.as_mut_ptr();

        let result = unsafe { sys::deflate(&mut *self.stream, flush) };

        map_step(&self.stream, result)
    }
}

unsafe impl Send for Deflate {}

impl Drop for Deflate {
    #[inline]
    fn drop(&mut self) {
        unsafe {
            sys::deflateEnd(&mut *self.stream);
        }
    }
}

///Decompression state of the zlib engine.
///
///Exclusively owned by one operation; resources are released on drop.
pub struct Inflate {
    stream: Box<sys::z_stream>,
}

impl Inflate {
    ///Creates new decompression state expecting `container` framing.
    ///
    ///Returns `None` if the engine cannot allocate or initialize its
    ///internal state.
    pub fn new(container: Container) -> Option<Self> {
        Self::with_window_bits(container.window_bits())
    }

    ///Creates new decompression state detecting zlib or gzip framing
    ///from the header.
    pub fn auto() -> Option<Self> {
        Self::with_window_bits(15 + 32)
    }

    fn with_window_bits(window_bits: c_int) -> Option<Self> {
        let mut stream = Box::new(raw_stream());

        let result = unsafe {
            sys::inflateInit2_(
                &mut *stream,
                window_bits,
                sys::zlibVersion(),
                mem::size_of::<sys::z_stream>() as c_int,
            )
        };

        if result == sys::Z_OK {
            Some(Self { stream })
        } else {
            None
        }
    }
}

impl Decompressor for Inflate {
    fn step(&mut self, input: &[u8], output: &mut [u8]) -> Result<Step, StepError> {
        self.stream.avail_in = input.len() as _;
        self.stream.next_in = input.as_ptr() as *mut _;
        self.stream.avail_out = output.len() as _;
        self.stream.next_out = output.as_mut_ptr();

        let result = unsafe { sys::inflate(&mut *self.stream, sys::Z_NO_FLUSH) };

        map_step(&self.stream, result)
    }
}

unsafe impl Send for Inflate {}

impl Drop for Inflate {
    #[inline]
    fn drop(&mut self) {
        unsafe {
            sys::inflateEnd(&mut *self.stream);
        }
    }
}
