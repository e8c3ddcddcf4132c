//! Memory operations: memset, memmove, memcpy, memcmp.
//!
//! These are safe Rust implementations operating on byte slices.
//! They correspond to the `<string.h>` memory functions in klib.

use super::CompareBound;

/// Fills the first `n` bytes of `dest` with the low byte of `value`.
///
/// Equivalent to C `memset(dest, c, n)`. Returns `dest`.
///
/// # Panics
///
/// Panics if `dest` is shorter than `n`.
pub fn memset(dest: &mut [u8], value: i32, n: usize) -> &mut [u8] {
    assert!(
        dest.len() >= n,
        "memset: destination buffer too small ({} bytes for n = {})",
        dest.len(),
        n
    );
    let byte = value as u8;
    for slot in &mut dest[..n] {
        *slot = byte;
    }
    dest
}

/// Moves `n` bytes inside `buf` from offset `src` to offset `dst`.
///
/// Equivalent to C `memmove` with both regions expressed as offsets into one
/// buffer, which is the only way two overlapping regions can exist in safe
/// Rust. Iterates forward when `dst < src` and backward when `dst > src`, so
/// each source byte is read before it is overwritten. Equal offsets are a
/// no-op. Returns the destination region `buf[dst..]`.
///
/// # Panics
///
/// Panics if either region extends past the end of `buf`.
pub fn memmove(buf: &mut [u8], dst: usize, src: usize, n: usize) -> &mut [u8] {
    let len = buf.len();
    assert!(
        dst <= len && n <= len - dst && src <= len && n <= len - src,
        "memmove: region out of bounds (dst = {}, src = {}, n = {}, buffer = {} bytes)",
        dst,
        src,
        n,
        len
    );

    if dst < src {
        for i in 0..n {
            buf[dst + i] = buf[src + i];
        }
    } else if dst > src {
        for i in (0..n).rev() {
            buf[dst + i] = buf[src + i];
        }
    }

    &mut buf[dst..]
}

/// Copies `n` bytes from `src` to `dest`.
///
/// Equivalent to C `memcpy`. The borrow checker guarantees the regions do not
/// overlap; use [`memmove`] for moves within one buffer. Returns `dest`.
///
/// # Panics
///
/// Panics if either slice is shorter than `n`.
pub fn memcpy<'d>(dest: &'d mut [u8], src: &[u8], n: usize) -> &'d mut [u8] {
    assert!(
        dest.len() >= n && src.len() >= n,
        "memcpy: buffer too small ({} byte destination, {} byte source, n = {})",
        dest.len(),
        src.len(),
        n
    );
    dest[..n].copy_from_slice(&src[..n]);
    dest
}

/// Compares the leading bytes of `a` and `b`.
///
/// Equivalent to klib `memcmp`, which inspects `n - 1` positions like
/// [`strncmp`](super::strncmp). Returns the difference of the first diverging
/// bytes, or 0 when none diverge.
pub fn memcmp(a: &[u8], b: &[u8], n: usize) -> i32 {
    memcmp_with(a, b, n, CompareBound::Inherited)
}

/// Like [`memcmp`], but inspects `bound.limit(n)` positions.
///
/// # Panics
///
/// Panics if either slice is shorter than the number of positions compared.
pub fn memcmp_with(a: &[u8], b: &[u8], n: usize, bound: CompareBound) -> i32 {
    let count = bound.limit(n);
    assert!(
        a.len() >= count && b.len() >= count,
        "memcmp: buffer too small ({} and {} bytes for {} compared)",
        a.len(),
        b.len(),
        count
    );
    a[..count]
        .iter()
        .zip(&b[..count])
        .find(|(x, y)| x != y)
        .map_or(0, |(&x, &y)| i32::from(x) - i32::from(y))
}
