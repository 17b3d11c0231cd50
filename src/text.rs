//! Ordinal, case-insensitive text helpers.
//!
//! Routing never uses locale-sensitive comparison. Every literal, key and
//! segment comparison in the crate goes through these helpers so that the
//! hash used by the jump tables agrees with the equality used everywhere else:
//! two strings that compare equal here always hash equal.

use std::hash::Hasher;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Case-insensitive ordinal equality.
///
/// ASCII inputs take a byte-wise fast path. Anything else compares the
/// simple uppercase mapping of each character.
#[inline]
#[must_use]
pub fn eq_ignore_case(a: &str, b: &str) -> bool {
    if a.is_ascii() && b.is_ascii() {
        return a.len() == b.len() && a.eq_ignore_ascii_case(b);
    }
    a.chars()
        .flat_map(char::to_uppercase)
        .eq(b.chars().flat_map(char::to_uppercase))
}

/// Case-insensitive hash consistent with [`eq_ignore_case`].
#[inline]
#[must_use]
pub fn hash_ignore_case(s: &str) -> u64 {
    let mut hasher = FoldHasher::default();
    if s.is_ascii() {
        for b in s.bytes() {
            hasher.write_u32(u32::from(b.to_ascii_uppercase()));
        }
    } else {
        for c in s.chars().flat_map(char::to_uppercase) {
            hasher.write_u32(c as u32);
        }
    }
    hasher.finish()
}

/// Right-most byte offset of `needle` within `haystack`, case-insensitively.
///
/// Only offsets on char boundaries are considered and the candidate window
/// has the same byte length as `needle`.
#[must_use]
pub fn rfind_ignore_case(haystack: &str, needle: &str) -> Option<usize> {
    if needle.len() > haystack.len() {
        return None;
    }
    let mut start = haystack.len() - needle.len();
    loop {
        if haystack.is_char_boundary(start) && haystack.is_char_boundary(start + needle.len()) {
            let window = &haystack[start..start + needle.len()];
            if eq_ignore_case(window, needle) {
                return Some(start);
            }
        }
        if start == 0 {
            return None;
        }
        start -= 1;
    }
}

/// Case-insensitive `ends_with`.
#[must_use]
pub fn ends_with_ignore_case(haystack: &str, suffix: &str) -> bool {
    if suffix.len() > haystack.len() {
        return false;
    }
    let start = haystack.len() - suffix.len();
    haystack.is_char_boundary(start) && eq_ignore_case(&haystack[start..], suffix)
}

/// FNV-1a over 32-bit code units.
#[derive(Clone, Copy)]
struct FoldHasher(u64);

impl Default for FoldHasher {
    fn default() -> Self {
        Self(FNV_OFFSET)
    }
}

impl Hasher for FoldHasher {
    fn finish(&self) -> u64 {
        self.0
    }

    fn write(&mut self, bytes: &[u8]) {
        for b in bytes {
            self.0 ^= u64::from(*b);
            self.0 = self.0.wrapping_mul(FNV_PRIME);
        }
    }
}
