//! Ranking of accumulated groups and the sale signal.
//!
//! Sale groups are gated, sorted cheapest-first and the cheapest becomes the
//! best sale. The signal compares it with the next strictly dearer sale group.

use crate::group::{GroupAccumulator, SizeGroups};
use listing_core::{
    AggregationConfig, BestPrice, FilterConfig, Price, Signal, SignalColor, SignalConfig,
};
use listing_ingestion::check_sale_member;
use tracing::debug;

/// Discount of `best` against `next` in percent, rounded to one decimal.
pub fn signal_rate(best: Price, next: Price) -> f64 {
    let rate = 100.0 - (best as f64 / next as f64 * 100.0);
    (rate * 10.0).round() / 10.0
}

/// Lease as a percentage of sale, truncated. `None` for a zero sale price.
pub fn lease_rate(sale: Price, lease: Price) -> Option<i64> {
    if sale == 0 {
        return None;
    }
    i64::try_from(i128::from(lease) * 100 / i128::from(sale)).ok()
}

/// Classifies rates into the three signal tiers.
pub struct SignalClassifier {
    config: SignalConfig,
}

impl SignalClassifier {
    /// Create a new classifier.
    pub fn new(config: SignalConfig) -> Self {
        Self { config }
    }

    /// Tier for a rate. The orange bound is inclusive.
    pub fn color(&self, rate: f64) -> SignalColor {
        if rate < self.config.low_threshold() {
            SignalColor::Green
        } else if rate <= self.config.middle_threshold() {
            SignalColor::Orange
        } else {
            SignalColor::Red
        }
    }

    /// Signal for a best price against the next dearer one.
    pub fn classify(&self, best: Price, next: Price) -> Signal {
        let rate = signal_rate(best, next);
        Signal {
            color: self.color(rate),
            rate,
            gap: next - best,
        }
    }
}

/// Ranked groups of one size.
#[derive(Debug, Clone)]
pub struct RankedSize<'a> {
    /// Gated sale groups, cheapest first.
    pub sale: Vec<&'a GroupAccumulator>,
    /// Lease groups, dearest first.
    pub lease: Vec<&'a GroupAccumulator>,
    pub sale_count: u32,
    pub lease_count: u32,
}

impl<'a> RankedSize<'a> {
    /// Cheapest eligible sale.
    pub fn best_sale(&self) -> Option<BestPrice> {
        self.sale.first().map(|acc| acc.best())
    }

    /// Representative lease: dearest by default, cheapest in lowest-lease mode.
    pub fn best_lease(&self, lowest_lease_mode: bool) -> Option<BestPrice> {
        let pick = if lowest_lease_mode {
            self.lease.last()
        } else {
            self.lease.first()
        };
        pick.map(|acc| acc.best())
    }

    /// Cheapest sale group strictly dearer than the best one.
    pub fn next_sale(&self) -> Option<&'a GroupAccumulator> {
        let best = self.sale.first()?.representative_price;
        self.sale
            .iter()
            .copied()
            .find(|acc| acc.representative_price > best)
    }
}

/// Side count: summed observations in address-grouped mode, buckets otherwise.
fn side_count<'a>(groups: impl Iterator<Item = &'a GroupAccumulator>, group_by_address: bool) -> u32 {
    if group_by_address {
        groups.map(|acc| acc.observation_count).sum()
    } else {
        groups.count() as u32
    }
}

/// Gate and sort the groups of one size.
///
/// Counts cover every bucket that passed the pre-grouping gates, before the
/// sale member gates run.
pub fn rank_size<'a>(
    size_key: &str,
    groups: &'a SizeGroups,
    filter: &FilterConfig,
    aggregation: &AggregationConfig,
) -> RankedSize<'a> {
    let sale_count = side_count(groups.sale.values(), aggregation.group_by_address);
    let lease_count = side_count(groups.lease.values(), aggregation.group_by_address);

    let mut sale: Vec<&GroupAccumulator> = groups
        .sale
        .iter()
        .filter(|(identity, acc)| {
            match check_sale_member(&acc.representative_floor, acc.encumbered, filter) {
                Ok(()) => true,
                Err(reason) => {
                    debug!(size = %size_key, %identity, %reason, "Dropping sale group");
                    false
                }
            }
        })
        .map(|(_, acc)| acc)
        .collect();
    sale.sort_by_key(|acc| acc.representative_price);

    let mut lease: Vec<&GroupAccumulator> = groups.lease.values().collect();
    lease.sort_by(|a, b| b.representative_price.cmp(&a.representative_price));

    RankedSize {
        sale,
        lease,
        sale_count,
        lease_count,
    }
}
