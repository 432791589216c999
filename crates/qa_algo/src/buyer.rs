//! Buyer determination from an order number via a prefix table.

use qa_core::BuyerRule;

/// Buyer whose prefix matches the start of `order_no`.
///
/// Matching is case-insensitive on the trimmed order number. The longest
/// prefix wins; among equal-length prefixes the earlier rule wins. Empty
/// prefixes never match.
pub fn determine_buyer<'a>(order_no: &str, rules: &'a [BuyerRule]) -> Option<&'a str> {
    let order = order_no.trim().to_lowercase();
    let mut best: Option<(usize, &'a str)> = None;
    for rule in rules {
        let prefix = rule.prefix.trim().to_lowercase();
        if prefix.is_empty() || !order.starts_with(&prefix) {
            continue;
        }
        if best.map_or(true, |(len, _)| prefix.len() > len) {
            best = Some((prefix.len(), rule.buyer.as_str()));
        }
    }
    best.map(|(_, buyer)| buyer)
}
