//! Advice merging.

use crate::types::Advice;

/// Appends the synthetic success entry when no finding was produced.
pub fn ensure_non_empty(mut advices: Vec<Advice>) -> Vec<Advice> {
    if advices.is_empty() {
        advices.push(Advice::ok());
    }
    advices
}

/// Concatenates advice lists in invocation order.
///
/// Synthetic success entries are dropped; if nothing else remains the result is a
/// single success entry for the whole unit.
pub fn merge<I>(lists: I) -> Vec<Advice>
where
    I: IntoIterator<Item = Vec<Advice>>,
{
    let merged = lists
        .into_iter()
        .flatten()
        .filter(|advice| !advice.is_ok())
        .collect();
    ensure_non_empty(merged)
}
