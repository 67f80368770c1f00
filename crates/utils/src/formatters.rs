// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use core::fmt;

/// Formatter for large binaries such as ciphertexts and proofs. Long values are shortened to
/// their length plus a head and tail so log lines stay readable.
pub fn hexf(data: &[u8], f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "{}", abbreviate(&to_hex(data), 100, 50))
}

/// Short prefix form used when a 32 byte identifier appears in a log line
pub fn short_hex(data: &[u8]) -> String {
    let hex = to_hex(data);
    if hex.len() <= 12 {
        return format!("0x{hex}");
    }
    format!("0x{}..{}", &hex[..8], &hex[hex.len() - 4..])
}

fn to_hex(data: &[u8]) -> String {
    data.iter().map(|b| format!("{:02x}", b)).collect()
}

fn abbreviate(s: &str, threshold: usize, limit: usize) -> String {
    if s.len() <= threshold {
        return format!("0x{}", s);
    }
    let head = limit / 2;
    let tail = limit - head;
    format!(
        "<bytes({}):0x{}..{}>",
        s.len() / 2,
        &s[..head],
        &s[s.len() - tail..]
    )
}
