//! Host line-output seam.

/// Destination for a finished `printf` line.
///
/// Closures taking `&[u8]` are consoles, which is how tests and the harness
/// capture output.
pub trait Console {
    fn putstr(&mut self, line: &[u8]);
}

impl<F: FnMut(&[u8])> Console for F {
    fn putstr(&mut self, line: &[u8]) {
        self(line);
    }
}

/// Console over a single-character output primitive such as the
/// abstract machine's `putch`. Each line is emitted one byte at a time.
pub struct PutchConsole<F: FnMut(u8)> {
    putch: F,
}

impl<F: FnMut(u8)> PutchConsole<F> {
    pub const fn new(putch: F) -> Self {
        Self { putch }
    }
}

impl<F: FnMut(u8)> Console for PutchConsole<F> {
    fn putstr(&mut self, line: &[u8]) {
        for &byte in line {
            (self.putch)(byte);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_console_receives_line() {
        let mut seen = Vec::new();
        let mut console = |line: &[u8]| seen.extend_from_slice(line);
        console.putstr(b"hello");
        console.putstr(b"!");
        assert_eq!(seen, b"hello!");
    }

    #[test]
    fn test_putch_console_emits_each_byte() {
        let mut bytes = Vec::new();
        {
            let mut console = PutchConsole::new(|b| bytes.push(b));
            console.putstr(b"ab\n");
        }
        assert_eq!(bytes, b"ab\n");
    }
}
