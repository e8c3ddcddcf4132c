//! Formatted output.
//!
//! A single-pass `printf` engine supporting `%d`, `%x`, `%c` and `%s`, and the
//! [`Console`] seam through which `printf` reaches the host's character
//! output.

pub mod console;
pub mod printf;

pub use console::{Console, PutchConsole};
pub use printf::{
    Conversion, FormatArg, FormatPolicy, FormatScanner, FormatSegment, OverflowAction,
    PRINTF_BUFFER_SIZE, UnknownSpecifier, measure, printf, printf_with, snprintf, snprintf_with,
    sprintf, try_vsnprintf_with, vsnprintf, vsnprintf_with, vsprintf, vsprintf_with,
};
