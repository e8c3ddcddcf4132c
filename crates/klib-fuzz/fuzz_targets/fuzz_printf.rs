#![no_main]
use libfuzzer_sys::fuzz_target;

use klib_core::stdio::{self, FormatArg, FormatPolicy, FormatScanner};
use klib_membrane::SafetyLevel;

fuzz_target!(|data: &[u8]| {
    // Layout: [out_len][format bytes ... 0][argument bytes ...]
    let Some((&out_len, rest)) = data.split_first() else {
        return;
    };
    let fmt_end = rest.iter().position(|&b| b == 0).unwrap_or(rest.len());
    let fmt = &rest[..fmt_end];
    let tail = rest.get(fmt_end + 1..).unwrap_or(&[]);

    // One argument per conversion, typed from the tail bytes; a tag of 3
    // feeds a string where a number is expected.
    let mut args = Vec::new();
    for (i, chunk) in tail.chunks(5).take(FormatScanner::conversion_count(fmt)).enumerate() {
        let tag = chunk[0] % 4;
        let mut word = [0u8; 4];
        word[..chunk.len() - 1].copy_from_slice(&chunk[1..]);
        let value = u32::from_le_bytes(word);
        args.push(match tag {
            0 => FormatArg::Int(value as i32),
            1 => FormatArg::Uint(value),
            2 => FormatArg::Str(&tail[i..]),
            _ => FormatArg::Str(b"(s)\0"),
        });
    }

    let mut out = vec![0u8; usize::from(out_len)];
    for level in [SafetyLevel::Strict, SafetyLevel::Hardened] {
        let policy = FormatPolicy::for_level(level);

        // Errors are fine; panics and out-of-bounds writes are not.
        let measured = stdio::measure(fmt, &args, policy);
        if let Ok(len) = stdio::vsprintf_with(&mut out, fmt, &args, policy)
            && !out.is_empty()
        {
            assert!(len < out.len());
            assert_eq!(out[len], 0);
            if let Ok(total) = measured {
                assert!(len <= total);
            }
        }
    }

    let n = out.len();
    if let Ok(total) =
        stdio::vsnprintf_with(&mut out, n, fmt, &args, FormatPolicy::HARDENED)
        && n > 0
    {
        let stored = total.min(n - 1);
        assert_eq!(out[stored], 0);
    }
});
