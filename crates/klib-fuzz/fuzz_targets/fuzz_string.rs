#![no_main]
use libfuzzer_sys::fuzz_target;

use klib_core::string::{self, CompareBound};
use klib_core::stdlib;

fuzz_target!(|data: &[u8]| {
    if data.len() < 4 {
        return;
    }
    let (head, body) = data.split_at(4);
    let mid = body.len() / 2;
    let (a, b) = body.split_at(mid);

    // Comparisons never read past either slice and agree on sign.
    let ab = string::strcmp(a, b);
    let ba = string::strcmp(b, a);
    assert_eq!(ab.signum(), -ba.signum());
    let n = usize::from(head[0]);
    let _ = string::strncmp(a, b, n);
    let _ = string::strncmp_with(a, b, n, CompareBound::Standard);
    let common = a.len().min(b.len());
    assert_eq!(
        string::memcmp_with(a, b, common, CompareBound::Standard).signum(),
        -string::memcmp_with(b, a, common, CompareBound::Standard).signum()
    );

    // strcpy then strcmp is equal.
    let mut dst = vec![0xFFu8; string::strlen(body) + 1];
    string::strcpy(&mut dst, body);
    assert_eq!(string::strcmp(&dst, body), 0);

    // memmove matches a copy through a scratch buffer.
    if !body.is_empty() {
        let len = body.len();
        let src = usize::from(head[1]) % len;
        let dst = usize::from(head[2]) % len;
        let count = usize::from(head[3]) % (len - src.max(dst) + 1);
        let mut moved = body.to_vec();
        string::memmove(&mut moved, dst, src, count);
        let mut expected = body.to_vec();
        let scratch = body[src..src + count].to_vec();
        expected[dst..dst + count].copy_from_slice(&scratch);
        assert_eq!(moved, expected);
    }

    // itoa agrees with Rust's own formatting in base 10.
    let value = i32::from_le_bytes([head[0], head[1], head[2], head[3]]);
    let mut buf = [0u8; 40];
    let end = stdlib::itoa(value, &mut buf, 10);
    assert_eq!(&buf[..end - 1], value.to_string().as_bytes());
    let radix = u32::from(head[0] % 15) + 2;
    let end = stdlib::uitoa(value as u32, &mut buf, radix);
    assert_eq!(buf[end - 1], 0);
});
