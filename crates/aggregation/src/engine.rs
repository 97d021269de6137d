//! Aggregation engine.
//!
//! Runs normalization, grouping and ranking in one pass and assembles the
//! per-size summaries. Every call builds its own tables, so one engine can be
//! shared between threads.

use crate::{
    group::GroupTable,
    ordering::order_by_keys,
    ranking::{lease_rate, rank_size, SignalClassifier},
};
use listing_core::{Config, ParsedListing, RawListing, SizeSummary};
use listing_ingestion::{ListingNormalizer, NormalizationStats};
use serde::Serialize;
use tracing::debug;

/// Result of one aggregation pass.
#[derive(Debug, Clone, Serialize)]
pub struct AggregationOutput {
    /// One row per size key, in first-seen order.
    pub summaries: Vec<SizeSummary>,
    /// What happened to the raw listings.
    pub stats: NormalizationStats,
}

/// Aggregation engine.
pub struct AggregationEngine {
    config: Config,
    classifier: SignalClassifier,
}

impl AggregationEngine {
    /// Create a new engine from configuration.
    pub fn new(config: Config) -> Self {
        let classifier = SignalClassifier::new(config.signal.clone());
        Self { config, classifier }
    }

    /// Configuration in use.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Aggregate raw listings.
    pub fn run(&self, raws: &[RawListing]) -> AggregationOutput {
        let mut normalizer = ListingNormalizer::new(self.config.filter.clone());
        let listings = normalizer.normalize_batch(raws);
        let summaries = self.summarize_parsed(&listings);
        let stats = normalizer.stats().clone();

        debug!(
            total = stats.total,
            accepted = stats.accepted,
            skipped = stats.skipped(),
            sizes = summaries.len(),
            "Aggregation pass complete"
        );

        AggregationOutput { summaries, stats }
    }

    /// Aggregate raw listings, summaries only.
    pub fn summarize(&self, raws: &[RawListing]) -> Vec<SizeSummary> {
        self.run(raws).summaries
    }

    /// Aggregate raw listings and project onto an external key order.
    pub fn summarize_ordered<S: AsRef<str>>(
        &self,
        raws: &[RawListing],
        ordering: &[S],
    ) -> Vec<SizeSummary> {
        order_by_keys(self.summarize(raws), ordering)
    }

    /// Aggregate already-parsed listings.
    pub fn summarize_parsed(&self, listings: &[ParsedListing]) -> Vec<SizeSummary> {
        let mut table = GroupTable::new(self.config.aggregation.clone());
        table.add_all(listings);

        table
            .sizes()
            .map(|(size_key, groups)| {
                let ranked = rank_size(size_key, groups, &self.config.filter, &self.config.aggregation);
                let mut summary = SizeSummary::empty(size_key.as_str());

                summary.sale = ranked.best_sale();
                summary.lease = ranked.best_lease(self.config.aggregation.lowest_lease_mode);
                summary.sale_count = ranked.sale_count;
                summary.lease_count = ranked.lease_count;

                if self.config.aggregation.group_by_address {
                    if let (Some(best), Some(next)) = (&summary.sale, ranked.next_sale()) {
                        summary.signal =
                            Some(self.classifier.classify(best.price, next.representative_price));
                    }
                }

                if let (Some(sale), Some(lease)) = (&summary.sale, &summary.lease) {
                    summary.gap = Some(sale.price - lease.price);
                    summary.lease_rate = lease_rate(sale.price, lease.price);
                }

                summary
            })
            .collect()
    }
}

/// One-shot aggregation with the given configuration.
pub fn aggregate(raws: &[RawListing], config: &Config) -> Vec<SizeSummary> {
    AggregationEngine::new(config.clone()).summarize(raws)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use listing_core::{FloorLevel, SignalColor};

    fn make_raw(size: &str, floor: &str, trade: &str, price: &str) -> RawListing {
        make_raw_with(size, floor, trade, price, "", &format!("{size},{floor}"))
    }

    fn make_raw_with(
        size: &str,
        floor: &str,
        trade: &str,
        price: &str,
        remarks: &str,
        identity: &str,
    ) -> RawListing {
        RawListing {
            size_key: size.to_string(),
            floor_text: floor.to_string(),
            trade_type_text: trade.to_string(),
            price_text: price.to_string(),
            remarks_text: remarks.to_string(),
            identity_key: identity.to_string(),
        }
    }

    fn grouped_config() -> Config {
        let mut config = Config::default();
        config.aggregation.group_by_address = true;
        config
    }

    #[test]
    fn test_empty_input() {
        let engine = AggregationEngine::new(Config::default());
        let output = engine.run(&[]);
        assert!(output.summaries.is_empty());
        assert_eq!(output.stats.total, 0);
    }

    #[test]
    fn test_gap_and_rate() {
        let raws = vec![
            make_raw("84A", "10/20층", "매매", "10억"),
            make_raw("84A", "12/20층", "전세", "7억"),
        ];
        let summaries = aggregate(&raws, &Config::default());

        assert_eq!(summaries.len(), 1);
        let summary = &summaries[0];
        assert_eq!(summary.sale_price(), 100000);
        assert_eq!(summary.lease_price(), 70000);
        assert_eq!(summary.gap, Some(30000));
        assert_eq!(summary.lease_rate_label(), "70%");
        assert!(summary.signal.is_none());
    }

    #[test]
    fn test_rate_truncates() {
        let raws = vec![
            make_raw("84A", "10/20층", "매매", "10억"),
            make_raw("84A", "12/20층", "전세", "6억 6,667"),
        ];
        let summaries = aggregate(&raws, &Config::default());
        assert_eq!(summaries[0].lease_rate_label(), "66%");
    }

    #[test]
    fn test_best_sale_is_minimum_in_any_order() {
        let mut raws = vec![
            make_raw("84A", "10/20층", "매매", "6억"),
            make_raw("84A", "11/20층", "매매", "5억 8,000"),
            make_raw("84A", "12/20층", "매매", "6억 2,000"),
        ];
        let forward = aggregate(&raws, &Config::default());
        raws.reverse();
        let backward = aggregate(&raws, &Config::default());

        assert_eq!(forward[0].sale_price(), 58000);
        assert_eq!(backward[0].sale_price(), 58000);
        assert_eq!(forward[0].sale.as_ref().unwrap().floor, FloorLevel::Level(11));
    }

    #[test]
    fn test_lease_direction() {
        let raws = vec![
            make_raw("84A", "10/20층", "전세", "3억"),
            make_raw("84A", "11/20층", "전세", "3억 5,000"),
            make_raw("84A", "2/20층", "전세", "2억 8,000"),
        ];
        let highest = aggregate(&raws, &Config::default());
        assert_eq!(highest[0].lease_price(), 35000);
        assert_eq!(highest[0].lease_count, 3);

        let mut config = Config::default();
        config.aggregation.lowest_lease_mode = true;
        let lowest = aggregate(&raws, &config);
        assert_eq!(lowest[0].lease_price(), 28000);
        assert_eq!(lowest[0].lease_floor(), "2");
    }

    #[test]
    fn test_second_floor_never_best_sale() {
        let raws = vec![
            make_raw("84A", "2/15층", "매매", "4억"),
            make_raw("84A", "9/15층", "매매", "5억"),
        ];
        for include_encumbered in [false, true] {
            let mut config = Config::default();
            config.filter.include_encumbered = include_encumbered;
            let summaries = aggregate(&raws, &config);
            assert_eq!(summaries[0].sale_price(), 50000);
            assert_eq!(summaries[0].sale_count, 2);
        }
    }

    #[test]
    fn test_encumbered_sale_excluded_unless_enabled() {
        let raws = vec![
            make_raw_with("84A", "9/15층", "매매", "4억", "전세안고", "84A,9/15층"),
            make_raw("84A", "10/15층", "매매", "5억"),
        ];
        assert_eq!(aggregate(&raws, &Config::default())[0].sale_price(), 50000);

        let mut config = Config::default();
        config.filter.include_encumbered = true;
        assert_eq!(aggregate(&raws, &config)[0].sale_price(), 40000);
    }

    #[test]
    fn test_encumbered_lease_kept() {
        let raws = vec![make_raw_with("84A", "9/15층", "전세", "3억", "대출승계", "84A,9/15층")];
        assert_eq!(aggregate(&raws, &Config::default())[0].lease_price(), 30000);
    }

    #[test]
    fn test_size_without_eligible_sale_still_listed() {
        let raws = vec![make_raw("59A", "1/15층", "매매", "3억")];
        let summaries = aggregate(&raws, &Config::default());
        assert_eq!(summaries.len(), 1);
        assert!(summaries[0].sale.is_none());
        assert_eq!(summaries[0].sale_count, 1);
        assert!(summaries[0].gap.is_none());
    }

    #[test]
    fn test_signal_in_grouped_mode() {
        let raws = vec![
            make_raw("84A", "10/20층", "매매", "9억"),
            make_raw("84A", "11/20층", "매매", "10억"),
            make_raw("84A", "12/20층", "매매", "11억"),
        ];

        let summaries = aggregate(&raws, &grouped_config());
        let signal = summaries[0].signal.as_ref().unwrap();
        assert_eq!(signal.color, SignalColor::Orange);
        assert_abs_diff_eq!(signal.rate, 10.0, epsilon = 1e-9);
        assert_eq!(signal.gap, 10000);

        // No signal without address grouping.
        assert!(aggregate(&raws, &Config::default())[0].signal.is_none());
    }

    #[test]
    fn test_no_signal_without_dearer_entry() {
        let raws = vec![make_raw("84A", "10/20층", "매매", "9억")];
        assert!(aggregate(&raws, &grouped_config())[0].signal.is_none());
    }

    #[test]
    fn test_grouped_counts_observations() {
        let raws = vec![
            make_raw("84A", "10/20층", "매매", "9억"),
            make_raw("84A", "10/20층", "매매", "9억"),
            make_raw("84A", "10/20층", "매매", "9억 5,000"),
            make_raw("84A", "11/20층", "전세", "5억"),
        ];

        let grouped = aggregate(&raws, &grouped_config());
        assert_eq!(grouped[0].sale_count, 3);
        assert_eq!(grouped[0].lease_count, 1);

        // Ungrouped: the three sale snippets share one identity.
        let ungrouped = aggregate(&raws, &Config::default());
        assert_eq!(ungrouped[0].sale_count, 1);
        assert_eq!(ungrouped[0].sale_price(), 90000);
    }

    #[test]
    fn test_sizes_in_first_seen_order() {
        let raws = vec![
            make_raw("84A", "10/20층", "매매", "9억"),
            make_raw("59A", "10/20층", "매매", "7억"),
            make_raw("84A", "11/20층", "전세", "5억"),
        ];
        let keys: Vec<String> = aggregate(&raws, &Config::default())
            .into_iter()
            .map(|s| s.size_key)
            .collect();
        assert_eq!(keys, vec!["84A", "59A"]);
    }

    #[test]
    fn test_bad_records_are_skipped() {
        let raws = vec![
            make_raw("84A", "10/20층", "매매", "가격협의"),
            make_raw("84A", "11/20층", "월세", "1000/80"),
            make_raw("84A", "12/20층", "매매", "9억"),
        ];
        let output = AggregationEngine::new(Config::default()).run(&raws);
        assert_eq!(output.summaries[0].sale_price(), 90000);
        assert_eq!(output.stats.skipped(), 2);
    }

    #[test]
    fn test_oversized_prices_are_skipped() {
        let raws = vec![
            make_raw("84A", "10/20층", "매매", "9223372036854775807"),
            make_raw("84A", "11/20층", "전세", "922337203685477580"),
            make_raw("84A", "12/20층", "매매", "99999999999999999999억1"),
            make_raw("84A", "13/20층", "매매", "9억"),
            make_raw("84A", "14/20층", "전세", "6억"),
        ];
        let output = AggregationEngine::new(Config::default()).run(&raws);
        assert_eq!(output.stats.bad_price, 3);
        let summary = &output.summaries[0];
        assert_eq!(summary.sale_price(), 90000);
        assert_eq!(summary.lease_price(), 60000);
        assert_eq!(summary.lease_rate_label(), "66%");
    }

    #[test]
    fn test_prices_at_cap() {
        let cap = listing_ingestion::parser::MAX_PRICE.to_string();
        let raws = vec![
            make_raw("84A", "10/20층", "매매", &cap),
            make_raw("84A", "11/20층", "전세", &cap),
        ];
        let summaries = aggregate(&raws, &Config::default());
        assert_eq!(summaries[0].gap, Some(0));
        assert_eq!(summaries[0].lease_rate_label(), "100%");
    }

    #[test]
    fn test_summarize_ordered() {
        let raws = vec![
            make_raw("84A", "10/20층", "매매", "9억"),
            make_raw("59A", "10/20층", "매매", "7억"),
        ];
        let engine = AggregationEngine::new(Config::default());
        let ordered = engine.summarize_ordered(&raws, &["59", "84"]);
        assert_eq!(ordered[0].size_key, "59A");
        assert_eq!(ordered[1].size_key, "84A");

        let none: Vec<String> = Vec::new();
        assert!(engine.summarize_ordered(&raws, &none).is_empty());
    }
}
