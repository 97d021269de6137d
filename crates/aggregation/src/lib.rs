//! Grouping, reduction and ranking of parsed listings.
//!
//! This crate handles:
//! - Group accumulation per size, trade type and identity
//! - Sale/lease reduction to one representative price per group
//! - Ranking of groups and the three-tier sale signal
//! - Per-size summaries and their external ordering

pub mod engine;
pub mod group;
pub mod ordering;
pub mod ranking;

pub use engine::{aggregate, AggregationEngine, AggregationOutput};
pub use group::{combine, GroupAccumulator, GroupKey, GroupTable, SizeGroups};
pub use ordering::{order_by_keys, ordering_key_from_label};
pub use ranking::{lease_rate, rank_size, signal_rate, RankedSize, SignalClassifier};
