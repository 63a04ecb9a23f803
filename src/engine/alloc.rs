//!Allocation callbacks for the engine, routed through Rust's allocator.

use core::ffi::{c_uint, c_void};
use core::{mem, ptr};
use std::alloc::Layout;

//Linux & win 32 bit are 8
#[cfg(not(any(target_os = "macos", all(windows, target_pointer_width = "64"))))]
const MIN_ALIGN: usize = 8;
//Mac and win 64 bit are 16
#[cfg(any(target_os = "macos", all(windows, target_pointer_width = "64")))]
const MIN_ALIGN: usize = 16;

//Each allocation is prefixed with its size so release can rebuild the
//layout from the pointer alone.
const SIZE_OFFSET: usize = mem::size_of::<usize>();

#[cold]
#[inline(never)]
fn failed_alloc() -> *mut c_void {
    ptr::null_mut()
}

pub(crate) unsafe extern "C" fn zalloc(_: *mut c_void, items: c_uint, size: c_uint) -> *mut c_void {
    let size = match (items as usize).checked_mul(size as usize) {
        Some(0) | None => return failed_alloc(),
        Some(size) => size,
    };

    let layout = match Layout::from_size_align(size + SIZE_OFFSET, MIN_ALIGN) {
        Ok(layout) => layout,
        Err(_) => return failed_alloc(),
    };

    let mem = std::alloc::alloc(layout);
    if mem.is_null() {
        return failed_alloc();
    }

    ptr::write(mem as *mut usize, size);
    mem.add(SIZE_OFFSET) as _
}

pub(crate) unsafe extern "C" fn zfree(_: *mut c_void, mem: *mut c_void) {
    if !mem.is_null() {
        let mem = (mem as *mut u8).offset(-(SIZE_OFFSET as isize));
        let size = ptr::read(mem as *const usize);
        let layout = Layout::from_size_align_unchecked(size + SIZE_OFFSET, MIN_ALIGN);
        std::alloc::dealloc(mem, layout);
    }
}
