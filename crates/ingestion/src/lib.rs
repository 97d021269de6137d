//! Listing ingestion and normalization.
//!
//! This crate handles:
//! - Splitting page snippets into raw listings
//! - Parsing price, floor and trade type text
//! - Pre-grouping eligibility (size and trade type)
//! - Sale-side member gates (encumbrance and floor)

pub mod eligibility;
pub mod normalizer;
pub mod parser;
pub mod snippet;

pub use eligibility::{check_sale_member, passes_size_gate, SaleRejection};
pub use normalizer::{ListingNormalizer, NormalizationStats, SkipReason};
pub use snippet::split_snippet;
