//! Rendering and export of per-size summaries.
//!
//! This crate provides:
//! - Human-readable price formatting and summary lines
//! - Export records and the multi-complex export bundle
//! - Helpers for values scraped from the complex page

pub mod display;
pub mod export;
pub mod page;

pub use display::{detail_block, format_price, price_per_pyeong, side_label, summary_line, SignalLegend};
pub use export::{
    export_file_name, export_listings, ComplexMetadata, ComplexSnapshot, ExportBundle,
    ExportDocument, ExportListing, ExportMetadata, UpsertOutcome, DEFAULT_COLLECTOR,
};
pub use page::{complex_no_from_path, total_households};
