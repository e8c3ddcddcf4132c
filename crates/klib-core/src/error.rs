//! Error types for the formatter.

use thiserror::Error;

/// Why a `printf`-family call could not produce its output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FormatError {
    /// The output (plus NUL) does not fit in the destination.
    #[error("output exceeds buffer capacity of {capacity} bytes")]
    BufferOverflow { capacity: usize },
    /// A conversion had no argument left to consume.
    #[error("missing argument {index} for %{conversion}")]
    MissingArgument { index: usize, conversion: char },
    /// The argument at `index` cannot be rendered by this conversion.
    #[error("argument {index} does not match %{conversion}")]
    ArgumentMismatch { index: usize, conversion: char },
    /// Unrecognised specifier at byte `offset` of the format string.
    #[error("malformed conversion specifier at offset {offset}")]
    MalformedSpecifier { offset: usize },
    #[error("not implemented: {0}")]
    NotImplemented(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = FormatError::MissingArgument {
            index: 2,
            conversion: 'd',
        };
        assert_eq!(err.to_string(), "missing argument 2 for %d");
        assert_eq!(
            FormatError::NotImplemented("snprintf").to_string(),
            "not implemented: snprintf"
        );
    }
}
