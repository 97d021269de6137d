//! Splitting of listing snippet text into raw listings.
//!
//! The page shows each listing's spec as comma-separated fields, e.g.
//! `"108/84m², 저/18층, 남동향"`: size, floor, then free descriptors.

use listing_core::RawListing;

/// Build a raw listing from the text pieces of one page item.
///
/// Returns `None` when the spec text is blank.
pub fn split_snippet(
    spec_text: &str,
    trade_type_text: &str,
    price_text: &str,
    remarks_text: &str,
) -> Option<RawListing> {
    let spec_text = spec_text.trim();
    if spec_text.is_empty() {
        return None;
    }

    let fields: Vec<&str> = spec_text.split(", ").collect();
    let size_key = fields.first().copied().unwrap_or_default();
    let floor_text = fields.get(1).copied().unwrap_or_default();

    Some(RawListing {
        size_key: size_key.to_string(),
        floor_text: floor_text.to_string(),
        trade_type_text: trade_type_text.trim().to_string(),
        price_text: price_text.trim().to_string(),
        remarks_text: remarks_text.to_string(),
        identity_key: fields.join(","),
    })
}
