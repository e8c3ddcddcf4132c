//! printf formatting engine.
//!
//! Interprets klib's reduced format language: literal bytes plus the
//! one-character conversions `%d`, `%x`, `%c` and `%s`. There is no width,
//! precision, flag or length-modifier syntax.
//!
//! Edge-case behaviour (`%%`, unknown specifiers, output overflow, the
//! `snprintf` family) is a [`FormatPolicy`] value derived from the runtime
//! [`SafetyLevel`]. Strict mode keeps klib's historical behaviour; hardened
//! mode repairs and counts each deviation in the global healing policy.
//!
//! Design invariant: one pass over the format string, no allocation, each
//! conversion consumes exactly one argument.

use klib_membrane::{HealingAction, SafetyLevel, global_healing_policy, safety_level};

use super::console::Console;
use crate::error::FormatError;
use crate::stdlib::Digits;
use crate::string::strlen;

/// Scratch capacity `printf` formats into before handing the line to the
/// console, NUL included.
pub const PRINTF_BUFFER_SIZE: usize = 1024;

// ---------------------------------------------------------------------------
// Format scanning
// ---------------------------------------------------------------------------

/// A recognised conversion character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conversion {
    /// `%d`: signed decimal.
    Signed,
    /// `%x`: unsigned lowercase hex, no prefix.
    Hex,
    /// `%c`: one byte.
    Char,
    /// `%s`: NUL-terminated string.
    Str,
}

impl Conversion {
    #[must_use]
    pub const fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            b'd' => Some(Self::Signed),
            b'x' => Some(Self::Hex),
            b'c' => Some(Self::Char),
            b's' => Some(Self::Str),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_byte(self) -> u8 {
        match self {
            Self::Signed => b'd',
            Self::Hex => b'x',
            Self::Char => b'c',
            Self::Str => b's',
        }
    }

    #[must_use]
    pub const fn as_char(self) -> char {
        self.as_byte() as char
    }
}

/// One piece of a format string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatSegment<'a> {
    /// A run of bytes containing no `%`.
    Literal(&'a [u8]),
    /// A recognised conversion starting at byte `offset`.
    Conversion {
        offset: usize,
        conversion: Conversion,
    },
    /// `%%` at byte `offset`.
    Percent { offset: usize },
    /// `%` followed by an unrecognised byte, or by the end of the string
    /// (`byte == None`).
    Unknown { offset: usize, byte: Option<u8> },
}

/// Single-pass iterator over the segments of a format string.
///
/// The string ends at its first NUL byte or at the end of the slice.
#[derive(Debug, Clone)]
pub struct FormatScanner<'a> {
    fmt: &'a [u8],
    pos: usize,
}

impl<'a> FormatScanner<'a> {
    #[must_use]
    pub fn new(fmt: &'a [u8]) -> Self {
        Self {
            fmt: &fmt[..strlen(fmt)],
            pos: 0,
        }
    }

    /// Number of arguments the format string consumes.
    #[must_use]
    pub fn conversion_count(fmt: &[u8]) -> usize {
        FormatScanner::new(fmt)
            .filter(|seg| matches!(seg, FormatSegment::Conversion { .. }))
            .count()
    }
}

impl<'a> Iterator for FormatScanner<'a> {
    type Item = FormatSegment<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let rest = &self.fmt[self.pos..];
        let first = *rest.first()?;

        if first != b'%' {
            let len = rest.iter().position(|&b| b == b'%').unwrap_or(rest.len());
            self.pos += len;
            return Some(FormatSegment::Literal(&rest[..len]));
        }

        let offset = self.pos;
        let segment = match rest.get(1).copied() {
            // Trailing '%': consume it and stop.
            None => {
                self.pos += 1;
                return Some(FormatSegment::Unknown { offset, byte: None });
            }
            Some(b'%') => FormatSegment::Percent { offset },
            Some(byte) => match Conversion::from_byte(byte) {
                Some(conversion) => FormatSegment::Conversion { offset, conversion },
                None => FormatSegment::Unknown {
                    offset,
                    byte: Some(byte),
                },
            },
        };
        self.pos += 2;
        Some(segment)
    }
}

// ---------------------------------------------------------------------------
// Arguments
// ---------------------------------------------------------------------------

/// One formatter argument, the safe counterpart of a `va_list` slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatArg<'a> {
    Int(i32),
    Uint(u32),
    /// A C string; bytes after the first NUL are ignored.
    Str(&'a [u8]),
}

impl From<i32> for FormatArg<'_> {
    fn from(value: i32) -> Self {
        Self::Int(value)
    }
}

impl From<u32> for FormatArg<'_> {
    fn from(value: u32) -> Self {
        Self::Uint(value)
    }
}

impl From<u8> for FormatArg<'_> {
    fn from(value: u8) -> Self {
        Self::Int(i32::from(value))
    }
}

impl From<char> for FormatArg<'_> {
    fn from(value: char) -> Self {
        Self::Uint(u32::from(value))
    }
}

impl<'a> From<&'a [u8]> for FormatArg<'a> {
    fn from(value: &'a [u8]) -> Self {
        Self::Str(value)
    }
}

impl<'a, const N: usize> From<&'a [u8; N]> for FormatArg<'a> {
    fn from(value: &'a [u8; N]) -> Self {
        Self::Str(value)
    }
}

impl<'a> From<&'a str> for FormatArg<'a> {
    fn from(value: &'a str) -> Self {
        Self::Str(value.as_bytes())
    }
}

/// Rendered text of one conversion.
enum Rendered<'a> {
    Digits(Digits),
    Byte(u8),
    Bytes(&'a [u8]),
}

fn render_arg<'a>(
    conversion: Conversion,
    arg: FormatArg<'a>,
    index: usize,
) -> Result<Rendered<'a>, FormatError> {
    let rendered = match (conversion, arg) {
        (Conversion::Signed, FormatArg::Int(v)) => Rendered::Digits(Digits::signed(v, 10)),
        (Conversion::Signed, FormatArg::Uint(v)) => {
            Rendered::Digits(Digits::signed(v as i32, 10))
        }
        (Conversion::Hex, FormatArg::Uint(v)) => Rendered::Digits(Digits::unsigned(v, 16)),
        (Conversion::Hex, FormatArg::Int(v)) => Rendered::Digits(Digits::unsigned(v as u32, 16)),
        (Conversion::Char, FormatArg::Int(v)) => Rendered::Byte(v as u8),
        (Conversion::Char, FormatArg::Uint(v)) => Rendered::Byte(v as u8),
        (Conversion::Str, FormatArg::Str(s)) => Rendered::Bytes(&s[..strlen(s)]),
        _ => {
            return Err(FormatError::ArgumentMismatch {
                index,
                conversion: conversion.as_char(),
            });
        }
    };
    Ok(rendered)
}

// ---------------------------------------------------------------------------
// Policy
// ---------------------------------------------------------------------------

/// What to do with `%` followed by an unrecognised byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnknownSpecifier {
    /// Consume both bytes, emit nothing.
    Drop,
    /// Emit both bytes literally.
    Echo,
    /// Fail with [`FormatError::MalformedSpecifier`].
    Reject,
}

/// What to do when the output does not fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverflowAction {
    Fail,
    /// Keep what fits and NUL-terminate.
    Truncate,
}

/// Edge-case behaviour of the formatter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatPolicy {
    /// Render `%%` as `%` (otherwise it is an unknown specifier).
    pub percent_escape: bool,
    pub unknown: UnknownSpecifier,
    pub overflow: OverflowAction,
    /// Whether `snprintf`/`vsnprintf` format at all.
    pub bounded_formatting: bool,
}

impl FormatPolicy {
    pub const STRICT: Self = Self {
        percent_escape: false,
        unknown: UnknownSpecifier::Drop,
        overflow: OverflowAction::Fail,
        bounded_formatting: false,
    };

    pub const HARDENED: Self = Self {
        percent_escape: true,
        unknown: UnknownSpecifier::Echo,
        overflow: OverflowAction::Truncate,
        bounded_formatting: true,
    };

    #[must_use]
    pub const fn for_level(level: SafetyLevel) -> Self {
        match level {
            SafetyLevel::Hardened => Self::HARDENED,
            SafetyLevel::Strict => Self::STRICT,
        }
    }

    /// Policy for the process-wide safety level.
    #[must_use]
    pub fn current() -> Self {
        Self::for_level(safety_level())
    }
}

impl Default for FormatPolicy {
    fn default() -> Self {
        Self::STRICT
    }
}

// ---------------------------------------------------------------------------
// Output buffer
// ---------------------------------------------------------------------------

/// Bounded writer that always reserves one byte for the terminator.
struct OutBuf<'o> {
    out: &'o mut [u8],
    len: usize,
    /// Length the output would have with unlimited room.
    total: usize,
    overflow: OverflowAction,
    /// Measuring pass: heals are not recorded.
    quiet: bool,
}

impl<'o> OutBuf<'o> {
    fn new(out: &'o mut [u8], overflow: OverflowAction) -> Self {
        Self {
            out,
            len: 0,
            total: 0,
            overflow,
            quiet: false,
        }
    }

    fn room(&self) -> usize {
        self.out.len().saturating_sub(1) - self.len
    }

    fn push(&mut self, bytes: &[u8]) -> Result<(), FormatError> {
        self.total += bytes.len();
        let take = bytes.len().min(self.room());
        if take < bytes.len() && self.overflow == OverflowAction::Fail {
            return Err(FormatError::BufferOverflow {
                capacity: self.out.len(),
            });
        }
        self.out[self.len..self.len + take].copy_from_slice(&bytes[..take]);
        self.len += take;
        Ok(())
    }

    fn push_rendered(&mut self, rendered: &Rendered<'_>) -> Result<(), FormatError> {
        match rendered {
            Rendered::Digits(digits) => self.push(digits.as_bytes()),
            Rendered::Byte(byte) => self.push(&[*byte]),
            Rendered::Bytes(bytes) => self.push(bytes),
        }
    }

    /// Writes the NUL after the bytes written so far. Returns false when the
    /// buffer has no room for it at all.
    fn terminate(&mut self) -> bool {
        match self.out.get_mut(self.len) {
            Some(slot) => {
                *slot = 0;
                true
            }
            None => false,
        }
    }
}

/// Outcome of one formatting pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Written {
    /// Bytes stored, excluding the NUL.
    len: usize,
    /// Bytes the complete output has, excluding the NUL.
    total: usize,
}

fn unknown_specifier(
    sink: &mut OutBuf<'_>,
    policy: FormatPolicy,
    offset: usize,
    byte: Option<u8>,
) -> Result<(), FormatError> {
    match policy.unknown {
        UnknownSpecifier::Drop => Ok(()),
        UnknownSpecifier::Reject => Err(FormatError::MalformedSpecifier { offset }),
        UnknownSpecifier::Echo => {
            if !sink.quiet {
                global_healing_policy().record(&HealingAction::EchoSpecifier { byte });
            }
            sink.push(b"%")?;
            match byte {
                Some(b) => sink.push(&[b]),
                None => Ok(()),
            }
        }
    }
}

fn render(
    sink: &mut OutBuf<'_>,
    fmt: &[u8],
    args: &[FormatArg<'_>],
    policy: FormatPolicy,
) -> Result<(), FormatError> {
    let mut next_arg = 0;

    for segment in FormatScanner::new(fmt) {
        match segment {
            FormatSegment::Literal(bytes) => sink.push(bytes)?,
            FormatSegment::Conversion { conversion, .. } => {
                let arg = args
                    .get(next_arg)
                    .copied()
                    .ok_or(FormatError::MissingArgument {
                        index: next_arg,
                        conversion: conversion.as_char(),
                    })?;
                let rendered = render_arg(conversion, arg, next_arg)?;
                sink.push_rendered(&rendered)?;
                next_arg += 1;
            }
            FormatSegment::Percent { offset } => {
                if policy.percent_escape {
                    sink.push(b"%")?;
                } else {
                    unknown_specifier(sink, policy, offset, Some(b'%'))?;
                }
            }
            FormatSegment::Unknown { offset, byte } => {
                unknown_specifier(sink, policy, offset, byte)?;
            }
        }
    }
    Ok(())
}

fn format_into(
    out: &mut [u8],
    fmt: &[u8],
    args: &[FormatArg<'_>],
    policy: FormatPolicy,
    overflow: OverflowAction,
) -> Result<Written, FormatError> {
    let mut sink = OutBuf::new(out, overflow);
    let result = render(&mut sink, fmt, args, policy);
    let terminated = sink.terminate();
    result?;
    if !terminated && overflow == OverflowAction::Fail {
        return Err(FormatError::BufferOverflow { capacity: 0 });
    }
    Ok(Written {
        len: sink.len,
        total: sink.total,
    })
}

// ---------------------------------------------------------------------------
// sprintf family
// ---------------------------------------------------------------------------

/// Formats `fmt` with `args` into `out` and NUL-terminates it, using the
/// process-wide policy.
///
/// Returns the number of bytes written, excluding the terminator.
pub fn vsprintf(out: &mut [u8], fmt: &[u8], args: &[FormatArg<'_>]) -> Result<usize, FormatError> {
    vsprintf_with(out, fmt, args, FormatPolicy::current())
}

/// [`vsprintf`] under an explicit policy.
///
/// With [`OverflowAction::Truncate`] the result is cut to fit, terminated,
/// and recorded as a heal; the return value is then the truncated length.
pub fn vsprintf_with(
    out: &mut [u8],
    fmt: &[u8],
    args: &[FormatArg<'_>],
    policy: FormatPolicy,
) -> Result<usize, FormatError> {
    let capacity = out.len();
    let written = format_into(out, fmt, args, policy, policy.overflow)?;
    if capacity == 0 || written.total > written.len {
        let heal = global_healing_policy().heal_string_bounds(written.total, Some(capacity));
        global_healing_policy().record(&heal);
    }
    Ok(written.len)
}

/// Length `fmt` renders to under `policy`, excluding the NUL. Nothing is
/// written and no heal is recorded.
pub fn measure(
    fmt: &[u8],
    args: &[FormatArg<'_>],
    policy: FormatPolicy,
) -> Result<usize, FormatError> {
    let mut empty = [0u8; 0];
    let mut sink = OutBuf::new(&mut empty, OverflowAction::Truncate);
    sink.quiet = true;
    render(&mut sink, fmt, args, policy)?;
    Ok(sink.total)
}

/// Same as [`vsprintf`]; the argument list is already a slice.
pub fn sprintf(out: &mut [u8], fmt: &[u8], args: &[FormatArg<'_>]) -> Result<usize, FormatError> {
    vsprintf(out, fmt, args)
}

/// Bounded formatting into the first `n` bytes of `out`.
///
/// Returns [`FormatError::NotImplemented`] unless `policy` enables bounded
/// formatting. Otherwise at most `n - 1` bytes are written followed by a NUL
/// (nothing at all when `n == 0`), and the return value is the length the
/// complete output would have had.
///
/// # Panics
///
/// Panics if `n` exceeds `out.len()`.
pub fn try_vsnprintf_with(
    out: &mut [u8],
    n: usize,
    fmt: &[u8],
    args: &[FormatArg<'_>],
    policy: FormatPolicy,
) -> Result<usize, FormatError> {
    bounded("vsnprintf", out, n, fmt, args, policy)
}

fn bounded(
    name: &'static str,
    out: &mut [u8],
    n: usize,
    fmt: &[u8],
    args: &[FormatArg<'_>],
    policy: FormatPolicy,
) -> Result<usize, FormatError> {
    if !policy.bounded_formatting {
        return Err(FormatError::NotImplemented(name));
    }
    assert!(
        n <= out.len(),
        "{}: n = {} exceeds buffer of {} bytes",
        name,
        n,
        out.len()
    );
    global_healing_policy().record(&HealingAction::UpgradeToSafeVariant);
    let written = format_into(&mut out[..n], fmt, args, policy, OverflowAction::Truncate)?;
    Ok(written.total)
}

fn bounded_or_halt(
    name: &'static str,
    out: &mut [u8],
    n: usize,
    fmt: &[u8],
    args: &[FormatArg<'_>],
    policy: FormatPolicy,
) -> Result<usize, FormatError> {
    match bounded(name, out, n, fmt, args, policy) {
        Err(FormatError::NotImplemented(what)) => panic!("Not implemented: {}", what),
        other => other,
    }
}

/// `vsnprintf` under the process-wide policy.
///
/// # Panics
///
/// In strict mode this halts with "Not implemented", as klib always has.
pub fn vsnprintf(
    out: &mut [u8],
    n: usize,
    fmt: &[u8],
    args: &[FormatArg<'_>],
) -> Result<usize, FormatError> {
    vsnprintf_with(out, n, fmt, args, FormatPolicy::current())
}

/// [`vsnprintf`] under an explicit policy.
///
/// # Panics
///
/// Halts with "Not implemented" unless `policy` enables bounded formatting.
pub fn vsnprintf_with(
    out: &mut [u8],
    n: usize,
    fmt: &[u8],
    args: &[FormatArg<'_>],
    policy: FormatPolicy,
) -> Result<usize, FormatError> {
    bounded_or_halt("vsnprintf", out, n, fmt, args, policy)
}

/// `snprintf` under the process-wide policy.
///
/// # Panics
///
/// In strict mode this halts with "Not implemented", as klib always has.
pub fn snprintf(
    out: &mut [u8],
    n: usize,
    fmt: &[u8],
    args: &[FormatArg<'_>],
) -> Result<usize, FormatError> {
    snprintf_with(out, n, fmt, args, FormatPolicy::current())
}

/// [`snprintf`] under an explicit policy.
///
/// # Panics
///
/// Halts with "Not implemented" unless `policy` enables bounded formatting.
pub fn snprintf_with(
    out: &mut [u8],
    n: usize,
    fmt: &[u8],
    args: &[FormatArg<'_>],
    policy: FormatPolicy,
) -> Result<usize, FormatError> {
    bounded_or_halt("snprintf", out, n, fmt, args, policy)
}

// ---------------------------------------------------------------------------
// printf
// ---------------------------------------------------------------------------

/// Formats into a [`PRINTF_BUFFER_SIZE`] scratch buffer and hands the result
/// to `console`. Returns the number of bytes emitted.
pub fn printf<C: Console + ?Sized>(
    console: &mut C,
    fmt: &[u8],
    args: &[FormatArg<'_>],
) -> Result<usize, FormatError> {
    printf_with(console, fmt, args, FormatPolicy::current())
}

/// [`printf`] under an explicit policy. Nothing reaches the console when
/// formatting fails.
pub fn printf_with<C: Console + ?Sized>(
    console: &mut C,
    fmt: &[u8],
    args: &[FormatArg<'_>],
    policy: FormatPolicy,
) -> Result<usize, FormatError> {
    let mut buf = [0u8; PRINTF_BUFFER_SIZE];
    let len = vsprintf_with(&mut buf, fmt, args, policy)?;
    console.putstr(&buf[..len]);
    Ok(len)
}

/// Typed `sprintf`: `kformat!(buf, b"x=%d\0", 42)`.
#[macro_export]
macro_rules! kformat {
    ($out:expr, $fmt:expr $(, $arg:expr)* $(,)?) => {
        $crate::stdio::sprintf($out, $fmt, &[$($crate::stdio::FormatArg::from($arg)),*])
    };
}

/// Typed `printf`: `kprintf!(&mut console, b"%s\n", "hi")`.
#[macro_export]
macro_rules! kprintf {
    ($console:expr, $fmt:expr $(, $arg:expr)* $(,)?) => {
        $crate::stdio::printf($console, $fmt, &[$($crate::stdio::FormatArg::from($arg)),*])
    };
}
