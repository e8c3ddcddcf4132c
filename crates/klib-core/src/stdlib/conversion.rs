//! Numeric conversion functions (itoa, uitoa).

/// Widest rendering of a 32-bit value: 32 binary digits plus a sign.
pub const MAX_DIGITS: usize = 33;

const DIGIT_TABLE: &[u8; 16] = b"0123456789abcdef";

// ---------------------------------------------------------------------------
// Digit rendering
// ---------------------------------------------------------------------------

/// Digits of one integer, rendered into fixed scratch space.
///
/// Digits are produced least-significant first from the end of the scratch
/// buffer backwards, so [`Digits::as_bytes`] reads most-significant first
/// without a separate reversal pass.
#[derive(Clone, Copy)]
pub struct Digits {
    buf: [u8; MAX_DIGITS],
    start: usize,
}

impl Digits {
    /// Renders an unsigned value in `radix`.
    ///
    /// # Panics
    ///
    /// Panics if `radix` is outside `2..=16`.
    pub fn unsigned(value: u32, radix: u32) -> Self {
        let mut digits = Self {
            buf: [0; MAX_DIGITS],
            start: MAX_DIGITS,
        };
        digits.push_magnitude(value, radix);
        digits
    }

    /// Renders a signed value in `radix`, with a leading `-` for negatives.
    ///
    /// `i32::MIN` is handled by taking the magnitude as unsigned.
    ///
    /// # Panics
    ///
    /// Panics if `radix` is outside `2..=16`.
    pub fn signed(value: i32, radix: u32) -> Self {
        let mut digits = Self::unsigned(value.unsigned_abs(), radix);
        if value < 0 {
            digits.start -= 1;
            digits.buf[digits.start] = b'-';
        }
        digits
    }

    fn push_magnitude(&mut self, mut value: u32, radix: u32) {
        assert!(
            (2..=16).contains(&radix),
            "radix {} out of range (2..=16)",
            radix
        );
        loop {
            self.start -= 1;
            self.buf[self.start] = DIGIT_TABLE[(value % radix) as usize];
            value /= radix;
            if value == 0 {
                break;
            }
        }
    }

    /// The rendered text, most-significant digit first.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[self.start..]
    }
}

fn checked_radix(name: &str, radix: u32) -> u32 {
    assert!(
        (2..=16).contains(&radix),
        "{}: radix {} out of range (2..=16)",
        name,
        radix
    );
    radix
}

/// The digits [`itoa`] writes for `value`, without the NUL.
///
/// # Panics
///
/// Panics if `radix` is outside `2..=16`.
pub fn itoa_digits(value: i32, radix: u32) -> Digits {
    Digits::signed(value, checked_radix("itoa", radix))
}

/// The digits [`uitoa`] writes for `value`, without the NUL.
///
/// # Panics
///
/// Panics if `radix` is outside `2..=16`.
pub fn uitoa_digits(value: u32, radix: u32) -> Digits {
    Digits::unsigned(value, checked_radix("uitoa", radix))
}

// ---------------------------------------------------------------------------
// C-shaped entry points
// ---------------------------------------------------------------------------

/// Writes `value` in `radix` plus a NUL terminator to the start of `buf`.
///
/// Returns the index one past the terminator, which is where a caller
/// continuing to build a string would write next.
///
/// # Panics
///
/// Panics if `radix` is outside `2..=16` or `buf` cannot hold the digits
/// plus NUL.
pub fn itoa(value: i32, buf: &mut [u8], radix: u32) -> usize {
    emit("itoa", &itoa_digits(value, radix), buf)
}

/// Unsigned counterpart of [`itoa`]. `0` renders as `"0"`.
///
/// # Panics
///
/// Panics if `radix` is outside `2..=16` or `buf` cannot hold the digits
/// plus NUL.
pub fn uitoa(value: u32, buf: &mut [u8], radix: u32) -> usize {
    emit("uitoa", &uitoa_digits(value, radix), buf)
}

fn emit(name: &str, digits: &Digits, buf: &mut [u8]) -> usize {
    let len = digits.as_bytes().len();
    assert!(
        buf.len() > len,
        "{}: destination buffer too small ({} bytes for {} digits + NUL)",
        name,
        buf.len(),
        len
    );
    buf[..len].copy_from_slice(digits.as_bytes());
    buf[len] = 0;
    len + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render_i(value: i32, radix: u32) -> ([u8; 40], usize) {
        let mut buf = [0xFFu8; 40];
        let end = itoa(value, &mut buf, radix);
        (buf, end)
    }

    #[test]
    fn test_itoa_zero() {
        let (buf, end) = render_i(0, 10);
        assert_eq!(&buf[..end], b"0\0");
        assert_eq!(end, 2);
    }

    #[test]
    fn test_itoa_negative() {
        let (buf, end) = render_i(-123, 10);
        assert_eq!(&buf[..end], b"-123\0");
    }

    #[test]
    fn test_itoa_min_value() {
        let (buf, end) = render_i(i32::MIN, 10);
        assert_eq!(&buf[..end], b"-2147483648\0");
        let (buf, end) = render_i(i32::MIN, 2);
        assert_eq!(end, 34);
        assert_eq!(buf[0], b'-');
        assert_eq!(buf[1], b'1');
    }

    #[test]
    fn test_itoa_lowercase_hex() {
        let (buf, end) = render_i(-255, 16);
        assert_eq!(&buf[..end], b"-ff\0");
    }

    #[test]
    fn test_uitoa_hex() {
        let mut buf = [0u8; 8];
        let end = uitoa(255, &mut buf, 16);
        assert_eq!(&buf[..end], b"ff\0");
    }

    #[test]
    fn test_uitoa_zero_is_not_empty() {
        let mut buf = [0u8; 4];
        let end = uitoa(0, &mut buf, 16);
        assert_eq!(&buf[..end], b"0\0");
    }

    #[test]
    fn test_uitoa_max_binary() {
        let mut buf = [0u8; 33];
        let end = uitoa(u32::MAX, &mut buf, 2);
        assert_eq!(end, 33);
        assert!(buf[..32].iter().all(|&b| b == b'1'));
    }

    #[test]
    fn test_uitoa_octal() {
        let mut buf = [0u8; 8];
        let end = uitoa(8, &mut buf, 8);
        assert_eq!(&buf[..end], b"10\0");
    }

    #[test]
    fn test_itoa_chained_writes() {
        let mut buf = [0u8; 16];
        let first = itoa(12, &mut buf, 10);
        let second = itoa(-3, &mut buf[first..], 10);
        assert_eq!(&buf[..first + second], b"12\0-3\0");
    }

    #[test]
    #[should_panic(expected = "itoa: radix 1 out of range")]
    fn test_radix_too_small() {
        let mut buf = [0u8; 8];
        itoa(5, &mut buf, 1);
    }

    #[test]
    #[should_panic(expected = "uitoa: radix 17 out of range")]
    fn test_radix_too_large() {
        let mut buf = [0u8; 8];
        uitoa(5, &mut buf, 17);
    }

    #[test]
    #[should_panic(expected = "uitoa: destination buffer too small")]
    fn test_uitoa_buffer_too_small() {
        let mut buf = [0u8; 3];
        uitoa(999, &mut buf, 10);
    }

    #[test]
    fn test_digits_as_bytes() {
        assert_eq!(Digits::signed(-42, 10).as_bytes(), b"-42");
        assert_eq!(Digits::unsigned(0xdead, 16).as_bytes(), b"dead");
        assert_eq!(Digits::unsigned(0, 10).as_bytes(), b"0");
        assert_eq!(uitoa_digits(255, 2).as_bytes(), b"11111111");
        assert_eq!(itoa_digits(i32::MIN, 16).as_bytes(), b"-80000000");
    }

    #[test]
    #[should_panic(expected = "uitoa: radix 0 out of range")]
    fn test_uitoa_digits_names_routine() {
        let _ = uitoa_digits(7, 0);
    }
}
