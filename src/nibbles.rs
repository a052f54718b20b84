//! Nibble keys: validation, byte expansion and prefix matching.

use crate::error::{Error, Result};

/// Branch fan-out; every key element must be below this.
pub const FANOUT: usize = 16;

/// Checks that every element of `key` is a nibble.
pub fn validate(key: &[u8]) -> Result<()> {
    match key.iter().position(|&n| usize::from(n) >= FANOUT) {
        Some(position) => Err(Error::InvalidNibble {
            position,
            nibble: key[position],
        }),
        None => Ok(()),
    }
}

/// Expands each byte into its high nibble followed by its low nibble.
///
/// ```rust
/// use nibble_radix::nibbles;
///
/// assert_eq!(nibbles::from_bytes(b"do"), vec![6, 4, 6, 15]);
/// ```
pub fn from_bytes(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(bytes.len() * 2);
    for &b in bytes {
        out.push(b >> 4);
        out.push(b & 0x0F);
    }
    out
}

/// Length of the longest common leading run of `a` and `b`.
#[inline]
pub fn shared_prefix_len(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}
