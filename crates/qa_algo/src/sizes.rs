//! Size-Order Normalizer.
//!
//! Sizes found in the reference list sort by reference position; the rest
//! follow in natural order. A trailing fit marker such as `(A)` / `(B)` is
//! ignored for the lookup, and the returned labels are the originals.

use std::collections::HashMap;
use std::sync::OnceLock;

use qa_core::determinism::NaturalKey;
use regex::Regex;

fn fit_suffix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\s*\(\s*[ab]\s*\)\s*$").expect("constant fit-suffix pattern"))
}

/// Label without its fit marker, trimmed: `"L (A)"` → `"L"`.
pub fn strip_fit_suffix(label: &str) -> &str {
    let base = match fit_suffix().find(label) {
        Some(m) => &label[..m.start()],
        None => label,
    };
    base.trim()
}

fn lookup_key(label: &str) -> String {
    label.trim().to_lowercase()
}

/// Sort key: matched sizes first by reference index, then everything by
/// natural key (which ends in the raw label, so the order is total).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum SizeKey {
    Matched(usize, NaturalKey),
    Unmatched(NaturalKey),
}

/// Order `sizes` by `reference`; unmatched labels follow naturally ordered.
///
/// Duplicate reference entries keep their first position.
pub fn sort_sizes<S, R>(sizes: &[S], reference: &[R]) -> Vec<String>
where
    S: AsRef<str>,
    R: AsRef<str>,
{
    let mut positions: HashMap<String, usize> = HashMap::with_capacity(reference.len());
    for (idx, r) in reference.iter().enumerate() {
        positions.entry(lookup_key(r.as_ref())).or_insert(idx);
    }

    let mut keyed: Vec<(SizeKey, String)> = sizes
        .iter()
        .map(|s| {
            let label = s.as_ref();
            let natural = NaturalKey::new(label);
            let key = match positions.get(&lookup_key(strip_fit_suffix(label))) {
                Some(&idx) => SizeKey::Matched(idx, natural),
                None => SizeKey::Unmatched(natural),
            };
            (key, label.to_string())
        })
        .collect();
    keyed.sort_by(|a, b| a.0.cmp(&b.0));
    keyed.into_iter().map(|(_, label)| label).collect()
}
