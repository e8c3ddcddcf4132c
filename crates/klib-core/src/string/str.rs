//! String operations: strlen, strcpy, strncpy, strcat, strcmp, strncmp.
//!
//! These are safe Rust implementations operating on byte slices that represent
//! NUL-terminated C strings. In this safe Rust model, strings are `&[u8]` slices
//! where a NUL byte (`0x00`) marks the logical end of the string.
//!
//! The copying routines return the destination so calls chain the way the C
//! versions do: `strcat(strcat(strcpy(buf, b"ab\0"), b"cd\0"), b"ef\0")`.

use super::CompareBound;

/// Returns the length of a NUL-terminated byte string (not counting the NUL).
///
/// Equivalent to C `strlen`. Scans `s` for the first `0x00` byte and returns
/// its index. If no NUL is found, returns the full slice length.
pub fn strlen(s: &[u8]) -> usize {
    s.iter().position(|&b| b == 0).unwrap_or(s.len())
}

/// Copies a NUL-terminated string from `src` into `dest`, terminator included.
///
/// Equivalent to C `strcpy`. Returns `dest`.
///
/// # Panics
///
/// Panics if `dest` is too small to hold the source string plus NUL.
pub fn strcpy<'d>(dest: &'d mut [u8], src: &[u8]) -> &'d mut [u8] {
    let src_len = strlen(src);
    assert!(
        dest.len() > src_len,
        "strcpy: destination buffer too small ({} bytes for {} byte string + NUL)",
        dest.len(),
        src_len
    );
    dest[..src_len].copy_from_slice(&src[..src_len]);
    dest[src_len] = 0;
    dest
}

/// Copies at most `n` bytes from `src` into `dest`.
///
/// Equivalent to C `strncpy`. If `src` is shorter than `n`, the remainder of
/// the first `n` bytes of `dest` is filled with NUL bytes. If `src` is `n` or
/// longer, `dest` will NOT be NUL-terminated. Returns `dest`.
///
/// # Panics
///
/// Panics if `dest` is shorter than `n`.
pub fn strncpy<'d>(dest: &'d mut [u8], src: &[u8], n: usize) -> &'d mut [u8] {
    assert!(
        dest.len() >= n,
        "strncpy: destination buffer too small ({} bytes for n = {})",
        dest.len(),
        n
    );
    let copy_len = strlen(src).min(n);

    dest[..copy_len].copy_from_slice(&src[..copy_len]);

    // Pad remainder with NUL bytes.
    for byte in &mut dest[copy_len..n] {
        *byte = 0;
    }

    dest
}

/// Appends `src` to the end of the NUL-terminated string in `dest`.
///
/// Equivalent to C `strcat`. Finds the NUL in `dest`, then copies `src`
/// (up to and including its NUL) after it. Returns `dest`.
///
/// # Panics
///
/// Panics if `dest` is too small for the combined string plus NUL.
pub fn strcat<'d>(dest: &'d mut [u8], src: &[u8]) -> &'d mut [u8] {
    let dest_len = strlen(dest);
    let src_len = strlen(src);
    let total = dest_len + src_len;
    assert!(
        dest.len() > total,
        "strcat: destination buffer too small ({} bytes for {} byte result + NUL)",
        dest.len(),
        total,
    );
    dest[dest_len..total].copy_from_slice(&src[..src_len]);
    dest[total] = 0;
    dest
}

/// Compares two NUL-terminated byte strings lexicographically.
///
/// Equivalent to C `strcmp`. Compares byte-by-byte until a difference is found
/// or both strings reach a NUL terminator. The terminator takes part in the
/// comparison as the value 0, so a proper prefix sorts first.
///
/// Returns the difference of the first diverging bytes: negative if `s1 < s2`,
/// zero if equal, positive if `s1 > s2`.
pub fn strcmp(s1: &[u8], s2: &[u8]) -> i32 {
    let mut i = 0;
    loop {
        let a = byte_at(s1, i);
        let b = byte_at(s2, i);

        if a != b {
            return i32::from(a) - i32::from(b);
        }
        if a == 0 {
            return 0;
        }
        i += 1;
    }
}

/// Compares at most `n - 1` bytes of two NUL-terminated byte strings.
///
/// Equivalent to klib `strncmp`, which stops one position short of ISO C.
/// `strncmp(b"abX\0", b"abY\0", 3)` is therefore 0. Use [`strncmp_with`] and
/// [`CompareBound::Standard`] for the ISO bound.
pub fn strncmp(s1: &[u8], s2: &[u8], n: usize) -> i32 {
    strncmp_with(s1, s2, n, CompareBound::Inherited)
}

/// Like [`strcmp`], but inspects at most `bound.limit(n)` positions.
pub fn strncmp_with(s1: &[u8], s2: &[u8], n: usize, bound: CompareBound) -> i32 {
    for i in 0..bound.limit(n) {
        let a = byte_at(s1, i);
        let b = byte_at(s2, i);

        if a != b {
            return i32::from(a) - i32::from(b);
        }
        if a == 0 {
            return 0;
        }
    }
    0
}

#[inline]
fn byte_at(s: &[u8], i: usize) -> u8 {
    s.get(i).copied().unwrap_or(0)
}
