//! Shared internal utilities for ABI adapters.

use std::ffi::c_char;

/// Scan a C string with an optional hard bound.
///
/// Returns `(len, terminated)` where:
/// - `len` is the byte length before the first NUL or before the bound.
/// - `terminated` indicates whether a NUL byte was observed.
///
/// # Safety
///
/// `ptr` must be valid to read up to the discovered length (and bound when given).
pub unsafe fn scan_c_string(ptr: *const c_char, bound: Option<usize>) -> (usize, bool) {
    match bound {
        Some(limit) => {
            for i in 0..limit {
                if unsafe { *ptr.add(i) } == 0 {
                    return (i, true);
                }
            }
            (limit, false)
        }
        None => {
            let mut i = 0usize;
            while unsafe { *ptr.add(i) } != 0 {
                i += 1;
            }
            (i, true)
        }
    }
}

/// Borrow a NUL-terminated C string, terminator included.
///
/// # Safety
///
/// `ptr` must point to a NUL-terminated string that outlives `'a`.
pub unsafe fn c_str_with_nul<'a>(ptr: *const c_char) -> &'a [u8] {
    let (len, _) = unsafe { scan_c_string(ptr, None) };
    unsafe { std::slice::from_raw_parts(ptr.cast::<u8>(), len + 1) }
}

// The compiler lowers slice copies and fills to calls to `memcpy`, `memmove`
// and `memset`, which this crate exports. The helpers below back those
// exports, so they stay plain byte loops (the crate is `no_builtins`).

/// Copies `n` bytes front to back.
///
/// # Safety
///
/// `src` must be readable and `dst` writable for `n` bytes. Overlap is only
/// allowed when `dst` precedes `src`.
pub unsafe fn copy_forward(dst: *mut u8, src: *const u8, n: usize) {
    for i in 0..n {
        unsafe { *dst.add(i) = *src.add(i) };
    }
}

/// Copies `n` bytes back to front.
///
/// # Safety
///
/// As [`copy_forward`], with overlap only allowed when `src` precedes `dst`.
pub unsafe fn copy_backward(dst: *mut u8, src: *const u8, n: usize) {
    for i in (0..n).rev() {
        unsafe { *dst.add(i) = *src.add(i) };
    }
}

/// Writes `byte` to `n` bytes at `dst`.
///
/// # Safety
///
/// `dst` must be writable for `n` bytes.
pub unsafe fn fill(dst: *mut u8, byte: u8, n: usize) {
    for i in 0..n {
        unsafe { *dst.add(i) = byte };
    }
}

/// Whether `[a, a+n)` and `[b, b+n)` share any byte.
pub fn regions_overlap(a: usize, b: usize, n: usize) -> bool {
    n != 0 && a.abs_diff(b) < n
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_stops_at_nul_or_bound() {
        let s = b"abc\0def\0";
        let p = s.as_ptr().cast::<c_char>();
        assert_eq!(unsafe { scan_c_string(p, None) }, (3, true));
        assert_eq!(unsafe { scan_c_string(p, Some(2)) }, (2, false));
        assert_eq!(unsafe { scan_c_string(p, Some(8)) }, (3, true));
    }

    #[test]
    fn c_str_with_nul_includes_terminator() {
        let s = b"hi\0zz";
        let bytes = unsafe { c_str_with_nul(s.as_ptr().cast()) };
        assert_eq!(bytes, b"hi\0");
    }

    #[test]
    fn overlapping_copies_in_both_directions() {
        let mut buf = *b"abcdef";
        let p = buf.as_mut_ptr();
        unsafe { copy_forward(p, p.add(1), 5) };
        assert_eq!(&buf, b"bcdeff");

        let mut buf = *b"abcdef";
        let p = buf.as_mut_ptr();
        unsafe { copy_backward(p.add(2), p, 4) };
        assert_eq!(&buf, b"ababcd");
    }

    #[test]
    fn fill_writes_n_bytes() {
        let mut buf = [0u8; 5];
        unsafe { fill(buf.as_mut_ptr(), b'x', 3) };
        assert_eq!(&buf, b"xxx\0\0");
    }

    #[test]
    fn overlap_detection() {
        assert!(regions_overlap(100, 103, 4));
        assert!(!regions_overlap(100, 104, 4));
        assert!(!regions_overlap(100, 100, 0));
    }
}
