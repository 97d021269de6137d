//! Core data types for the listing digest.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Price in 만원 (10,000 won) steps.
pub type Price = i64;

/// Remarks fragments meaning the buyer takes over an existing loan or deposit.
pub const ENCUMBRANCE_MARKERS: [&str; 3] = ["안고", "끼고", "승계"];

/// Floor token the listing site uses for unspecified low floors.
pub const LOW_FLOOR_MARKER: &str = "저";

/// Listing category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeType {
    /// 매매.
    Sale,
    /// 전세.
    Lease,
}

impl TradeType {
    /// Label used on the listing page.
    pub fn label(self) -> &'static str {
        match self {
            TradeType::Sale => "매매",
            TradeType::Lease => "전세",
        }
    }

    /// Resolve a page label. Only the two literal tags are accepted.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim() {
            "매매" => Some(TradeType::Sale),
            "전세" => Some(TradeType::Lease),
            _ => None,
        }
    }
}

impl fmt::Display for TradeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Unit floor as shown in the floor text (the part before `/`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FloorLevel {
    /// The "저" sentinel.
    Low,
    /// A numbered floor.
    Level(u32),
    /// Any other token ("중", "고", "B1", or empty), kept verbatim.
    Band(String),
}

impl FloorLevel {
    /// Classify a raw floor token.
    pub fn from_token(token: &str) -> Self {
        let token = token.trim();
        if token == LOW_FLOOR_MARKER {
            return FloorLevel::Low;
        }
        if !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(level) = token.parse() {
                return FloorLevel::Level(level);
            }
        }
        FloorLevel::Band(token.to_string())
    }

    /// Text form of the token.
    pub fn token(&self) -> String {
        match self {
            FloorLevel::Low => LOW_FLOOR_MARKER.to_string(),
            FloorLevel::Level(level) => level.to_string(),
            FloorLevel::Band(band) => band.clone(),
        }
    }

    /// Numeric value, if the token is a number.
    pub fn as_number(&self) -> Option<u32> {
        match self {
            FloorLevel::Level(level) => Some(*level),
            _ => None,
        }
    }

    /// Is this the low-floor sentinel?
    pub fn is_low(&self) -> bool {
        matches!(self, FloorLevel::Low)
    }
}

impl fmt::Display for FloorLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.token())
    }
}

impl From<String> for FloorLevel {
    fn from(token: String) -> Self {
        FloorLevel::from_token(&token)
    }
}

impl From<FloorLevel> for String {
    fn from(level: FloorLevel) -> Self {
        level.token()
    }
}

/// Parsed floor text: unit level and building height.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Floor {
    /// Floor of the unit.
    pub unit: FloorLevel,
    /// Total floors in the building, when given.
    pub total: Option<u32>,
}

impl Floor {
    /// Is the unit on the top floor of its building?
    pub fn is_top(&self) -> bool {
        matches!((self.unit.as_number(), self.total), (Some(unit), Some(total)) if unit == total)
    }
}

/// One listing snippet as scraped from the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawListing {
    /// Size/layout key (e.g. "108/84m²").
    pub size_key: String,
    /// Raw floor text (e.g. "12/24층").
    pub floor_text: String,
    /// Trade type label ("매매" or "전세").
    pub trade_type_text: String,
    /// Price text in 억/만원 shorthand (e.g. "5억 3,000").
    pub price_text: String,
    /// Free-text remarks.
    #[serde(default)]
    pub remarks_text: String,
    /// Best-effort uniqueness key built from the descriptive fields.
    #[serde(default)]
    pub identity_key: String,
}

/// Normalized listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedListing {
    pub size_key: String,
    pub identity_key: String,
    pub trade_type: TradeType,
    /// Price in 만원.
    pub price: Price,
    pub floor: Floor,
    pub remarks: String,
    /// Remarks mention an assumed loan or deposit.
    pub has_encumbrance_marker: bool,
}

/// Three-tier deal signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalColor {
    Green,
    Orange,
    Red,
}

impl SignalColor {
    /// CSS color name.
    pub fn as_str(self) -> &'static str {
        match self {
            SignalColor::Green => "green",
            SignalColor::Orange => "orange",
            SignalColor::Red => "red",
        }
    }
}

/// Signal attached to the best sale price of a size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub color: SignalColor,
    /// Discount versus the next cheaper-but-higher entry, in percent (one decimal).
    pub rate: f64,
    /// Price difference to that entry.
    pub gap: Price,
}

impl Signal {
    /// Hover text, e.g. "3.5% / 5000".
    pub fn tooltip(&self) -> String {
        format!("{:.1}% / {}", self.rate, self.gap)
    }
}

/// Representative price of one side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BestPrice {
    pub price: Price,
    pub floor: FloorLevel,
}

/// Aggregated figures for one size key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizeSummary {
    pub size_key: String,
    /// Cheapest eligible sale.
    pub sale: Option<BestPrice>,
    /// Representative lease.
    pub lease: Option<BestPrice>,
    pub sale_count: u32,
    pub lease_count: u32,
    /// Sale minus lease, when both exist.
    pub gap: Option<Price>,
    /// Lease as a truncated percentage of sale, when both exist.
    pub lease_rate: Option<i64>,
    /// Only computed in address-grouped mode.
    pub signal: Option<Signal>,
}

impl SizeSummary {
    /// Create an empty summary for a size key.
    pub fn empty(size_key: impl Into<String>) -> Self {
        Self {
            size_key: size_key.into(),
            sale: None,
            lease: None,
            sale_count: 0,
            lease_count: 0,
            gap: None,
            lease_rate: None,
            signal: None,
        }
    }

    /// Sale price, 0 when absent.
    pub fn sale_price(&self) -> Price {
        self.sale.as_ref().map_or(0, |s| s.price)
    }

    /// Sale floor token, "-" when absent.
    pub fn sale_floor(&self) -> String {
        self.sale.as_ref().map_or_else(|| "-".to_string(), |s| s.floor.token())
    }

    /// Lease price, 0 when absent.
    pub fn lease_price(&self) -> Price {
        self.lease.as_ref().map_or(0, |l| l.price)
    }

    /// Lease floor token, "-" when absent.
    pub fn lease_floor(&self) -> String {
        self.lease.as_ref().map_or_else(|| "-".to_string(), |l| l.floor.token())
    }

    /// Gap, 0 when absent.
    pub fn gap_or_zero(&self) -> Price {
        self.gap.unwrap_or(0)
    }

    /// Lease rate as shown on the page ("70%"), "-" when absent.
    pub fn lease_rate_label(&self) -> String {
        self.lease_rate
            .map_or_else(|| "-".to_string(), |rate| format!("{rate}%"))
    }

    /// Does either side carry a price?
    pub fn has_prices(&self) -> bool {
        self.sale_price() != 0 || self.lease_price() != 0
    }
}
