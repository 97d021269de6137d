//! Projection of summaries onto an externally supplied key order.

use listing_core::SizeSummary;

/// Reorder summaries by a list of key prefixes.
///
/// For each ordering key in turn, every not yet placed summary whose size key
/// starts with it is appended in its original order. Summaries matched by no
/// key are dropped, so an empty ordering yields an empty result.
pub fn order_by_keys<S: AsRef<str>>(summaries: Vec<SizeSummary>, ordering: &[S]) -> Vec<SizeSummary> {
    let mut pool: Vec<Option<SizeSummary>> = summaries.into_iter().map(Some).collect();
    let mut ordered = Vec::with_capacity(pool.len());

    for key in ordering {
        let key = key.as_ref();
        for slot in pool.iter_mut() {
            let matches = slot
                .as_ref()
                .is_some_and(|summary| summary.size_key.starts_with(key));
            if matches {
                ordered.extend(slot.take());
            }
        }
    }

    ordered
}

/// Ordering key from a header label on the page ("84㎡" → "84").
pub fn ordering_key_from_label(label: &str) -> String {
    label.replace('㎡', "").trim().to_string()
}
