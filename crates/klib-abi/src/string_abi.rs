//! ABI layer for `<string.h>` functions.
//!
//! The string exports size slices from the C contract (string length, `n`)
//! and delegate to `klib_core::string`. `memset`, `memmove` and `memcpy` are
//! the targets the compiler lowers those slice operations to, so they run on
//! the byte loops in `util` instead. Null pointers return a safe default
//! instead of faulting.

use std::ffi::{c_char, c_int, c_void};
use std::slice;

use klib_core::string as core_string;

use crate::util::{
    c_str_with_nul, copy_backward, copy_forward, fill, regions_overlap, scan_c_string,
};

// ---------------------------------------------------------------------------
// Strings
// ---------------------------------------------------------------------------

/// klib `strlen`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn strlen(s: *const c_char) -> usize {
    if s.is_null() {
        return 0;
    }
    let (len, _) = unsafe { scan_c_string(s, None) };
    len
}

/// klib `strcpy`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn strcpy(dst: *mut c_char, src: *const c_char) -> *mut c_char {
    if dst.is_null() || src.is_null() {
        return dst;
    }
    // SAFETY: caller guarantees dst holds strlen(src) + 1 bytes.
    let src_bytes = unsafe { c_str_with_nul(src) };
    let dst_bytes = unsafe { slice::from_raw_parts_mut(dst.cast::<u8>(), src_bytes.len()) };
    core_string::strcpy(dst_bytes, src_bytes);
    dst
}

/// klib `strncpy`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn strncpy(dst: *mut c_char, src: *const c_char, n: usize) -> *mut c_char {
    if dst.is_null() || src.is_null() || n == 0 {
        return dst;
    }
    // Only the first n bytes of src can be read.
    let (src_len, _) = unsafe { scan_c_string(src, Some(n)) };
    let src_bytes = unsafe { slice::from_raw_parts(src.cast::<u8>(), src_len) };
    let dst_bytes = unsafe { slice::from_raw_parts_mut(dst.cast::<u8>(), n) };
    core_string::strncpy(dst_bytes, src_bytes, n);
    dst
}

/// klib `strcat`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn strcat(dst: *mut c_char, src: *const c_char) -> *mut c_char {
    if dst.is_null() || src.is_null() {
        return dst;
    }
    let (dst_len, _) = unsafe { scan_c_string(dst, None) };
    let src_bytes = unsafe { c_str_with_nul(src) };
    // SAFETY: caller guarantees room for the concatenation plus NUL.
    let dst_bytes =
        unsafe { slice::from_raw_parts_mut(dst.cast::<u8>(), dst_len + src_bytes.len()) };
    core_string::strcat(dst_bytes, src_bytes);
    dst
}

/// klib `strcmp`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn strcmp(s1: *const c_char, s2: *const c_char) -> c_int {
    if s1.is_null() || s2.is_null() {
        return 0;
    }
    let a = unsafe { c_str_with_nul(s1) };
    let b = unsafe { c_str_with_nul(s2) };
    core_string::strcmp(a, b)
}

/// klib `strncmp` (compares at most `n - 1` characters).
#[unsafe(no_mangle)]
pub unsafe extern "C" fn strncmp(s1: *const c_char, s2: *const c_char, n: usize) -> c_int {
    if s1.is_null() || s2.is_null() || n == 0 {
        return 0;
    }
    let (a_len, _) = unsafe { scan_c_string(s1, Some(n)) };
    let (b_len, _) = unsafe { scan_c_string(s2, Some(n)) };
    let a = unsafe { slice::from_raw_parts(s1.cast::<u8>(), a_len) };
    let b = unsafe { slice::from_raw_parts(s2.cast::<u8>(), b_len) };
    core_string::strncmp(a, b, n)
}

// ---------------------------------------------------------------------------
// Memory
// ---------------------------------------------------------------------------

/// klib `memset`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn memset(dst: *mut c_void, c: c_int, n: usize) -> *mut c_void {
    if dst.is_null() || n == 0 {
        return dst;
    }
    unsafe { fill(dst.cast::<u8>(), c as u8, n) };
    dst
}

/// klib `memmove`: forward when `dst < src`, backward when `dst > src`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn memmove(dst: *mut c_void, src: *const c_void, n: usize) -> *mut c_void {
    if dst.is_null() || src.is_null() || n == 0 {
        return dst;
    }
    let (d, s) = (dst.cast::<u8>(), src.cast::<u8>());
    if (d as usize) < (s as usize) {
        unsafe { copy_forward(d, s, n) };
    } else if (d as usize) > (s as usize) {
        unsafe { copy_backward(d, s, n) };
    }
    dst
}

/// klib `memcpy`. Overlapping regions are moved instead of corrupted.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn memcpy(dst: *mut c_void, src: *const c_void, n: usize) -> *mut c_void {
    if dst.is_null() || src.is_null() || n == 0 {
        return dst;
    }
    if regions_overlap(dst as usize, src as usize, n) {
        return unsafe { memmove(dst, src, n) };
    }
    unsafe { copy_forward(dst.cast::<u8>(), src.cast::<u8>(), n) };
    dst
}

/// klib `memcmp` (compares `n - 1` bytes).
#[unsafe(no_mangle)]
pub unsafe extern "C" fn memcmp(s1: *const c_void, s2: *const c_void, n: usize) -> c_int {
    if s1.is_null() || s2.is_null() || n == 0 {
        return 0;
    }
    let a = unsafe { slice::from_raw_parts(s1.cast::<u8>(), n) };
    let b = unsafe { slice::from_raw_parts(s2.cast::<u8>(), n) };
    core_string::memcmp(a, b, n)
}
