//! Determinism utilities: stable, numeric-aware ordering of labels.
//!
//! This module is **I/O-free**. It provides a natural sort key where digit
//! runs compare by numeric value ("9" < "10") and text runs compare
//! case-insensitively. Ties fall back to the raw bytes so that the order is
//! total: two distinct labels never compare `Equal`.

use alloc::string::String;
use alloc::vec::Vec;
use core::cmp::Ordering;

/* -------------------------------------------------------------------------- */
/*                                Natural keys                                */
/* -------------------------------------------------------------------------- */

/// One run of a label.
#[derive(Clone, Debug, Eq, PartialEq)]
enum Chunk {
    /// ASCII digit run with leading zeros stripped ("" for all zeros).
    Num(String),
    /// Non-digit run, lowercased.
    Text(String),
}

impl Ord for Chunk {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Chunk::Num(a), Chunk::Num(b)) => a.len().cmp(&b.len()).then_with(|| a.cmp(b)),
            (Chunk::Text(a), Chunk::Text(b)) => a.cmp(b),
            // Digits sort before letters, as in collation.
            (Chunk::Num(_), Chunk::Text(_)) => Ordering::Less,
            (Chunk::Text(_), Chunk::Num(_)) => Ordering::Greater,
        }
    }
}

impl PartialOrd for Chunk {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Precomputed natural sort key; compare with `Ord`.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
pub struct NaturalKey {
    chunks: Vec<Chunk>,
    raw: String,
}

impl NaturalKey {
    pub fn new(label: &str) -> Self {
        let mut chunks = Vec::new();
        let mut buf = String::new();
        let mut in_digits: Option<bool> = None;

        for ch in label.chars() {
            let is_digit = ch.is_ascii_digit();
            if in_digits.is_some() && in_digits != Some(is_digit) {
                chunks.push(finish_chunk(core::mem::take(&mut buf), in_digits == Some(true)));
            }
            in_digits = Some(is_digit);
            buf.push(ch);
        }
        if let Some(d) = in_digits {
            chunks.push(finish_chunk(buf, d));
        }

        Self { chunks, raw: String::from(label) }
    }
}

fn finish_chunk(run: String, digits: bool) -> Chunk {
    if digits {
        Chunk::Num(String::from(run.trim_start_matches('0')))
    } else {
        Chunk::Text(run.to_lowercase())
    }
}

/// Total, numeric-aware comparison of two labels.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    NaturalKey::new(a).cmp(&NaturalKey::new(b))
}

/// Sort labels **in place** by natural order.
pub fn sort_natural(xs: &mut [String]) {
    xs.sort_by_cached_key(|s| NaturalKey::new(s));
}
