//! ABI layer for the klib `<stdlib.h>` additions: `itoa` and `uitoa`.
//!
//! Both return a pointer one past the written NUL, where a caller building a
//! longer string continues writing.

use std::ffi::{c_char, c_int, c_uint};
use std::slice;

use klib_core::stdlib::{self as core_stdlib, itoa_digits, uitoa_digits};

/// klib `itoa`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn itoa(value: c_int, buf: *mut c_char, radix: c_int) -> *mut c_char {
    if buf.is_null() {
        return buf;
    }
    let radix = radix as u32;
    let needed = itoa_digits(value, radix).as_bytes().len() + 1;
    // SAFETY: caller guarantees room for the rendered digits plus NUL.
    let out = unsafe { slice::from_raw_parts_mut(buf.cast::<u8>(), needed) };
    let end = core_stdlib::itoa(value, out, radix);
    unsafe { buf.add(end) }
}

/// klib `uitoa`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn uitoa(value: c_uint, buf: *mut c_char, radix: c_int) -> *mut c_char {
    if buf.is_null() {
        return buf;
    }
    let radix = radix as u32;
    let needed = uitoa_digits(value, radix).as_bytes().len() + 1;
    let out = unsafe { slice::from_raw_parts_mut(buf.cast::<u8>(), needed) };
    let end = core_stdlib::uitoa(value, out, radix);
    unsafe { buf.add(end) }
}
