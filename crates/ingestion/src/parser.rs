//! Field parsers for listing text.
//!
//! Prices are written in 억/만원 shorthand ("5억 3,000" is 5억 + 3,000만원) and
//! normalized to 만원. Floors look like "12/24층" or "저/18층".

use lazy_static::lazy_static;
use listing_core::{
    Error, Floor, FloorLevel, Price, Result, TradeType, ENCUMBRANCE_MARKERS,
};
use regex::Regex;

/// 만원 per 억.
pub const MAN_PER_EOK: Price = 10_000;

/// Largest accepted price. Keeps `price * 100` within `Price`.
pub const MAX_PRICE: Price = Price::MAX / 100;

lazy_static! {
    static ref SIZE_TOKEN: Regex = Regex::new(r"\d+").expect("size token pattern");
    static ref EXCLUSIVE_AREA: Regex = Regex::new(r"(\d+)m").expect("exclusive area pattern");
}

/// Parse a price into 만원.
///
/// `"5억3,000"` → 53000, `"3억"` → 30000, `"8,500"` → 8500. The 억 part may
/// be a plain decimal ("1.5억"); signs, exponents and prices above
/// [`MAX_PRICE`] are rejected.
pub fn parse_price(text: &str) -> Result<Price> {
    let cleaned: String = text
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ',')
        .collect();

    let price = match cleaned.split_once('억') {
        Some((eok, rest)) => {
            if eok.is_empty() || !eok.chars().all(|c| c.is_ascii_digit() || c == '.') {
                return Err(Error::parse("price", text));
            }
            let eok: f64 = eok.parse().map_err(|_| Error::parse("price", text))?;
            let man = eok * MAN_PER_EOK as f64;
            if !man.is_finite() || man > MAX_PRICE as f64 {
                return Err(Error::parse("price", text));
            }
            let rest = leading_integer(rest).unwrap_or(0);
            (man as Price).checked_add(rest)
        }
        None => leading_integer(&cleaned),
    };

    price
        .filter(|price| *price <= MAX_PRICE)
        .ok_or_else(|| Error::parse("price", text))
}

/// Leading run of ASCII digits as an integer.
fn leading_integer(text: &str) -> Option<Price> {
    let end = text
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map_or(text.len(), |(i, _)| i);
    if end == 0 {
        return None;
    }
    text[..end].parse().ok()
}

/// Parse floor text such as "12/24층".
///
/// Never fails: a missing or non-numeric building height becomes `None` and an
/// unrecognized unit token is kept as [`FloorLevel::Band`].
pub fn parse_floor(text: &str) -> Floor {
    let stripped = text.replacen('층', "", 1);
    let mut parts = stripped.split('/');

    let unit = FloorLevel::from_token(parts.next().unwrap_or(""));
    let total = parts.next().and_then(|t| t.trim().parse().ok());

    Floor { unit, total }
}

/// Resolve the trade type label.
pub fn parse_trade_type(text: &str) -> Result<TradeType> {
    TradeType::from_label(text).ok_or_else(|| Error::parse("trade type", text))
}

/// First number in a size key ("108/84m²" → 108).
pub fn size_token(size_key: &str) -> Option<f64> {
    SIZE_TOKEN
        .find(size_key)
        .and_then(|m| m.as_str().parse().ok())
}

/// Exclusive area from a size key: the first number followed by `m`
/// ("108/84m²" → 84). Zero when absent.
pub fn exclusive_area(size_key: &str) -> u32 {
    EXCLUSIVE_AREA
        .captures(size_key)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}

/// Do the remarks mention an assumed loan or deposit?
pub fn has_encumbrance(remarks: &str) -> bool {
    ENCUMBRANCE_MARKERS.iter().any(|m| remarks.contains(m))
}
