//! Raw listing normalization.
//!
//! Applies the pre-grouping gates and field parsers to raw listings. A record
//! that fails any step is skipped and counted; the batch always continues.

use crate::eligibility::passes_size_gate;
use crate::parser::{has_encumbrance, parse_floor, parse_price, parse_trade_type};
use listing_core::{FilterConfig, ParsedListing, RawListing, TradeType};
use serde::Serialize;
use std::fmt;
use tracing::debug;

/// Why a raw listing was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Blank size key.
    MissingSize,
    /// Size above the configured threshold.
    Oversize,
    /// Trade type other than sale or lease.
    TradeType,
    /// Price text could not be parsed.
    Price,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            SkipReason::MissingSize => "missing size",
            SkipReason::Oversize => "oversize",
            SkipReason::TradeType => "unsupported trade type",
            SkipReason::Price => "unparseable price",
        };
        f.write_str(reason)
    }
}

/// Statistics about one normalization run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NormalizationStats {
    /// Raw listings seen.
    pub total: u64,
    /// Listings that passed every step.
    pub accepted: u64,
    /// Accepted sale listings.
    pub sales: u64,
    /// Accepted lease listings.
    pub leases: u64,
    /// Skipped for a blank size key.
    pub missing_size: u64,
    /// Skipped by the size gate.
    pub oversize: u64,
    /// Skipped for an unsupported trade type.
    pub bad_trade_type: u64,
    /// Skipped for an unparseable price.
    pub bad_price: u64,
}

impl NormalizationStats {
    /// Total skipped listings.
    pub fn skipped(&self) -> u64 {
        self.missing_size + self.oversize + self.bad_trade_type + self.bad_price
    }

    /// Fraction of listings accepted.
    pub fn accepted_frac(&self) -> f64 {
        if self.total > 0 {
            self.accepted as f64 / self.total as f64
        } else {
            0.0
        }
    }

    fn record_skip(&mut self, reason: SkipReason) {
        match reason {
            SkipReason::MissingSize => self.missing_size += 1,
            SkipReason::Oversize => self.oversize += 1,
            SkipReason::TradeType => self.bad_trade_type += 1,
            SkipReason::Price => self.bad_price += 1,
        }
    }

    /// Reset statistics.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Turns raw listings into parsed listings.
pub struct ListingNormalizer {
    config: FilterConfig,
    stats: NormalizationStats,
}

impl ListingNormalizer {
    /// Create a new normalizer.
    pub fn new(config: FilterConfig) -> Self {
        Self {
            config,
            stats: NormalizationStats::default(),
        }
    }

    /// Normalize one raw listing, or report why it is skipped.
    pub fn try_normalize(&self, raw: &RawListing) -> Result<ParsedListing, SkipReason> {
        let size_key = raw.size_key.trim();
        if size_key.is_empty() {
            return Err(SkipReason::MissingSize);
        }
        if !passes_size_gate(size_key, &self.config) {
            return Err(SkipReason::Oversize);
        }

        let trade_type = parse_trade_type(&raw.trade_type_text).map_err(|_| SkipReason::TradeType)?;
        let price = parse_price(&raw.price_text).map_err(|_| SkipReason::Price)?;

        let identity_key = if raw.identity_key.is_empty() {
            format!("{},{}", size_key, raw.floor_text)
        } else {
            raw.identity_key.clone()
        };

        Ok(ParsedListing {
            size_key: size_key.to_string(),
            identity_key,
            trade_type,
            price,
            floor: parse_floor(&raw.floor_text),
            remarks: raw.remarks_text.clone(),
            has_encumbrance_marker: has_encumbrance(&raw.remarks_text),
        })
    }

    /// Normalize one raw listing, updating statistics.
    pub fn normalize(&mut self, raw: &RawListing) -> Option<ParsedListing> {
        self.stats.total += 1;

        match self.try_normalize(raw) {
            Ok(listing) => {
                self.stats.accepted += 1;
                match listing.trade_type {
                    TradeType::Sale => self.stats.sales += 1,
                    TradeType::Lease => self.stats.leases += 1,
                }
                Some(listing)
            }
            Err(reason) => {
                debug!(
                    size = %raw.size_key,
                    trade = %raw.trade_type_text,
                    price = %raw.price_text,
                    %reason,
                    "Skipping listing"
                );
                self.stats.record_skip(reason);
                None
            }
        }
    }

    /// Normalize a batch, keeping arrival order.
    pub fn normalize_batch(&mut self, raws: &[RawListing]) -> Vec<ParsedListing> {
        raws.iter().filter_map(|raw| self.normalize(raw)).collect()
    }

    /// Get normalization statistics.
    pub fn stats(&self) -> &NormalizationStats {
        &self.stats
    }

    /// Reset statistics.
    pub fn reset_stats(&mut self) {
        self.stats.reset();
    }
}
