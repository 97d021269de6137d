//! Group accumulation.
//!
//! Listings are bucketed by size, then trade type, then grouping identity. Each
//! bucket folds its observations into one representative price.

use indexmap::IndexMap;
use listing_core::{AggregationConfig, BestPrice, Floor, ParsedListing, Price, TradeType};
use tracing::trace;

/// Identity of one accumulation bucket.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroupKey {
    pub size_key: String,
    pub trade_type: TradeType,
    /// Identity key, suffixed with the price in address-grouped mode.
    pub identity: String,
}

impl GroupKey {
    /// Key for a listing under the given grouping mode.
    pub fn for_listing(listing: &ParsedListing, group_by_address: bool) -> Self {
        let identity = if group_by_address {
            format!("{}_{}", listing.identity_key, listing.price)
        } else {
            listing.identity_key.clone()
        };
        Self {
            size_key: listing.size_key.clone(),
            trade_type: listing.trade_type,
            identity,
        }
    }
}

/// Folded state of one bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupAccumulator {
    pub representative_price: Price,
    pub representative_floor: Floor,
    /// Remarks of every folded member, concatenated.
    pub concatenated_remarks: String,
    pub observation_count: u32,
    /// Any folded member carried an encumbrance marker.
    pub encumbered: bool,
}

impl GroupAccumulator {
    /// Seed a bucket from its first observation.
    pub fn seed(listing: &ParsedListing) -> Self {
        Self {
            representative_price: listing.price,
            representative_floor: listing.floor.clone(),
            concatenated_remarks: listing.remarks.clone(),
            observation_count: 1,
            encumbered: listing.has_encumbrance_marker,
        }
    }

    /// Representative price and unit floor.
    pub fn best(&self) -> BestPrice {
        BestPrice {
            price: self.representative_price,
            floor: self.representative_floor.unit.clone(),
        }
    }
}

/// Should `candidate` replace `current` as the representative price?
///
/// Strict comparisons: on a tie the earlier observation stays.
fn replaces(trade_type: TradeType, current: Price, candidate: Price, lowest_lease: bool) -> bool {
    match trade_type {
        TradeType::Sale => candidate < current,
        TradeType::Lease if lowest_lease => candidate < current,
        TradeType::Lease => candidate > current,
    }
}

/// Fold one observation into an accumulator.
///
/// Sale keeps the lower price, lease the higher one (or the lower one in
/// lowest-lease mode). Price and floor always move together.
pub fn combine(
    trade_type: TradeType,
    acc: &GroupAccumulator,
    observation: &ParsedListing,
    config: &AggregationConfig,
) -> GroupAccumulator {
    let take_new = replaces(
        trade_type,
        acc.representative_price,
        observation.price,
        config.lowest_lease_mode,
    );

    let (representative_price, representative_floor) = if take_new {
        (observation.price, observation.floor.clone())
    } else {
        (acc.representative_price, acc.representative_floor.clone())
    };

    GroupAccumulator {
        representative_price,
        representative_floor,
        concatenated_remarks: format!("{}{}", acc.concatenated_remarks, observation.remarks),
        observation_count: acc.observation_count + 1,
        encumbered: acc.encumbered || observation.has_encumbrance_marker,
    }
}

/// Sale and lease buckets of one size, in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct SizeGroups {
    pub sale: IndexMap<String, GroupAccumulator>,
    pub lease: IndexMap<String, GroupAccumulator>,
}

impl SizeGroups {
    /// Buckets of one side.
    pub fn side(&self, trade_type: TradeType) -> &IndexMap<String, GroupAccumulator> {
        match trade_type {
            TradeType::Sale => &self.sale,
            TradeType::Lease => &self.lease,
        }
    }

    fn side_mut(&mut self, trade_type: TradeType) -> &mut IndexMap<String, GroupAccumulator> {
        match trade_type {
            TradeType::Sale => &mut self.sale,
            TradeType::Lease => &mut self.lease,
        }
    }
}

/// All buckets of one aggregation pass.
pub struct GroupTable {
    config: AggregationConfig,
    sizes: IndexMap<String, SizeGroups>,
}

impl GroupTable {
    /// Create an empty table.
    pub fn new(config: AggregationConfig) -> Self {
        Self {
            config,
            sizes: IndexMap::new(),
        }
    }

    /// Add one listing.
    pub fn add(&mut self, listing: &ParsedListing) {
        let key = GroupKey::for_listing(listing, self.config.group_by_address);
        let side = self
            .sizes
            .entry(key.size_key)
            .or_default()
            .side_mut(key.trade_type);

        match side.get_mut(&key.identity) {
            Some(acc) => {
                *acc = combine(key.trade_type, acc, listing, &self.config);
                trace!(
                    identity = %key.identity,
                    price = acc.representative_price,
                    count = acc.observation_count,
                    "Folded observation"
                );
            }
            None => {
                side.insert(key.identity, GroupAccumulator::seed(listing));
            }
        }
    }

    /// Add many listings in order.
    pub fn add_all<'a>(&mut self, listings: impl IntoIterator<Item = &'a ParsedListing>) {
        for listing in listings {
            self.add(listing);
        }
    }

    /// Look up one bucket.
    pub fn get(&self, key: &GroupKey) -> Option<&GroupAccumulator> {
        self.sizes
            .get(&key.size_key)
            .and_then(|groups| groups.side(key.trade_type).get(&key.identity))
    }

    /// Sizes in first-seen order.
    pub fn sizes(&self) -> impl Iterator<Item = (&String, &SizeGroups)> {
        self.sizes.iter()
    }

    /// Number of distinct sizes.
    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    /// Is the table empty?
    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }
}
