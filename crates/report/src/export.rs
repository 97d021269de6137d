//! Export records.
//!
//! A [`ComplexSnapshot`] captures the summaries of one apartment complex at
//! collection time. Snapshots are collected in an [`ExportBundle`] keyed by
//! complex number and written out as one [`ExportDocument`].

use chrono::{DateTime, Utc};
use listing_core::{Error, Price, Result, SizeSummary};
use listing_ingestion::parser::exclusive_area;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Collector tag written into metadata.
pub const DEFAULT_COLLECTOR: &str = "listing_cli";

/// One size row of an export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportListing {
    pub area_type: String,
    /// Exclusive area in m², 0 when the size key does not carry one.
    pub exclusive_area: u32,
    pub sale_price: Price,
    pub sale_floor: String,
    pub sale_count: u32,
    pub lease_price: Price,
    pub lease_floor: String,
    pub lease_count: u32,
    pub gap: Price,
    /// Lease rate label ("70%") or "-".
    pub lease_rate: String,
}

impl ExportListing {
    /// Build an export row. `None` when neither side has a price.
    pub fn from_summary(summary: &SizeSummary) -> Option<Self> {
        if !summary.has_prices() {
            return None;
        }
        Some(Self {
            area_type: summary.size_key.clone(),
            exclusive_area: exclusive_area(&summary.size_key),
            sale_price: summary.sale_price(),
            sale_floor: summary.sale_floor(),
            sale_count: summary.sale_count,
            lease_price: summary.lease_price(),
            lease_floor: summary.lease_floor(),
            lease_count: summary.lease_count,
            gap: summary.gap_or_zero(),
            lease_rate: summary.lease_rate_label(),
        })
    }
}

/// Export rows for every summary with at least one price.
pub fn export_listings(summaries: &[SizeSummary]) -> Vec<ExportListing> {
    summaries.iter().filter_map(ExportListing::from_summary).collect()
}

/// Complex-level metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplexMetadata {
    pub complex_no: String,
    pub complex_name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub total_households: u32,
    pub collected_at: DateTime<Utc>,
    pub collector: String,
}

impl ComplexMetadata {
    /// Metadata with an empty address and unknown household count.
    pub fn new(
        complex_no: impl Into<String>,
        complex_name: impl Into<String>,
        collected_at: DateTime<Utc>,
    ) -> Self {
        Self {
            complex_no: complex_no.into(),
            complex_name: complex_name.into(),
            address: String::new(),
            total_households: 0,
            collected_at,
            collector: DEFAULT_COLLECTOR.to_string(),
        }
    }
}

/// Summaries of one complex.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplexSnapshot {
    pub metadata: ComplexMetadata,
    pub listings: Vec<ExportListing>,
}

impl ComplexSnapshot {
    /// Snapshot from summaries. Rows without prices are left out.
    pub fn new(metadata: ComplexMetadata, summaries: &[SizeSummary]) -> Self {
        Self {
            metadata,
            listings: export_listings(summaries),
        }
    }
}

/// Result of [`ExportBundle::upsert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// A snapshot with the same complex number was replaced in place.
    Replaced,
    /// The snapshot was appended.
    Inserted,
}

/// Export-wide metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportMetadata {
    pub export_date: DateTime<Utc>,
    pub total_complexes: usize,
    /// Complex names joined with ", ".
    pub complex_names: String,
}

/// Document written by an export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportDocument {
    pub metadata: ExportMetadata,
    pub complexes: Vec<ComplexSnapshot>,
}

/// Saved snapshots, at most one per complex number.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExportBundle {
    complexes: Vec<ComplexSnapshot>,
}

impl ExportBundle {
    /// Create an empty bundle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a bundle saved with [`ExportBundle::to_json`].
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize the bundle.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Insert a snapshot or replace the one with the same complex number.
    pub fn upsert(&mut self, snapshot: ComplexSnapshot) -> UpsertOutcome {
        let complex_no = snapshot.metadata.complex_no.clone();
        let existing = self
            .complexes
            .iter()
            .position(|c| c.metadata.complex_no == complex_no);

        let outcome = match existing {
            Some(index) => {
                self.complexes[index] = snapshot;
                UpsertOutcome::Replaced
            }
            None => {
                self.complexes.push(snapshot);
                UpsertOutcome::Inserted
            }
        };

        debug!(%complex_no, ?outcome, saved = self.complexes.len(), "Upserted complex snapshot");
        outcome
    }

    /// Drop every saved snapshot.
    pub fn remove_all(&mut self) {
        info!(removed = self.complexes.len(), "Cleared saved complexes");
        self.complexes.clear();
    }

    /// Number of saved complexes.
    pub fn len(&self) -> usize {
        self.complexes.len()
    }

    /// Is the bundle empty?
    pub fn is_empty(&self) -> bool {
        self.complexes.is_empty()
    }

    /// Saved snapshots in insertion order.
    pub fn complexes(&self) -> &[ComplexSnapshot] {
        &self.complexes
    }

    /// Assemble the export document. Fails when nothing has been saved.
    pub fn to_document(&self, now: DateTime<Utc>) -> Result<ExportDocument> {
        if self.complexes.is_empty() {
            return Err(Error::Other("no saved complexes to export".to_string()));
        }

        let names: Vec<&str> = self
            .complexes
            .iter()
            .map(|c| c.metadata.complex_name.as_str())
            .collect();

        Ok(ExportDocument {
            metadata: ExportMetadata {
                export_date: now,
                total_complexes: self.complexes.len(),
                complex_names: names.join(", "),
            },
            complexes: self.complexes.clone(),
        })
    }
}

/// File name for an export written at `now`.
pub fn export_file_name(now: DateTime<Utc>) -> String {
    format!("all_complexes_{}.json", now.timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use listing_core::{BestPrice, FloorLevel};
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 9, 0, 0).unwrap()
    }

    fn make_summary(size: &str, sale: Price, lease: Price) -> SizeSummary {
        let mut summary = SizeSummary::empty(size);
        if sale != 0 {
            summary.sale = Some(BestPrice {
                price: sale,
                floor: FloorLevel::Level(12),
            });
            summary.sale_count = 3;
        }
        if lease != 0 {
            summary.lease = Some(BestPrice {
                price: lease,
                floor: FloorLevel::Low,
            });
            summary.lease_count = 2;
        }
        if sale != 0 && lease != 0 {
            summary.gap = Some(sale - lease);
            summary.lease_rate = Some(lease * 100 / sale);
        }
        summary
    }

    fn make_snapshot(no: &str, name: &str) -> ComplexSnapshot {
        ComplexSnapshot::new(
            ComplexMetadata::new(no, name, now()),
            &[make_summary("108/84m²", 100000, 70000)],
        )
    }

    #[test]
    fn test_export_listing_shape() {
        let row = ExportListing::from_summary(&make_summary("108/84m²", 100000, 70000)).unwrap();
        assert_eq!(
            serde_json::to_value(&row).unwrap(),
            json!({
                "area_type": "108/84m²",
                "exclusive_area": 84,
                "sale_price": 100000,
                "sale_floor": "12",
                "sale_count": 3,
                "lease_price": 70000,
                "lease_floor": "저",
                "lease_count": 2,
                "gap": 30000,
                "lease_rate": "70%"
            })
        );
    }

    #[test]
    fn test_export_skips_rows_without_prices() {
        let rows = export_listings(&[
            make_summary("84A", 0, 0),
            make_summary("59A", 0, 40000),
        ]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].area_type, "59A");
        assert_eq!(rows[0].sale_floor, "-");
        assert_eq!(rows[0].gap, 0);
        assert_eq!(rows[0].lease_rate, "-");
        assert_eq!(rows[0].exclusive_area, 0);
    }

    #[test]
    fn test_upsert_replaces_by_complex_no() {
        let mut bundle = ExportBundle::new();
        assert_eq!(bundle.upsert(make_snapshot("111", "A단지")), UpsertOutcome::Inserted);
        assert_eq!(bundle.upsert(make_snapshot("222", "B단지")), UpsertOutcome::Inserted);
        assert_eq!(bundle.upsert(make_snapshot("111", "A단지 재수집")), UpsertOutcome::Replaced);

        assert_eq!(bundle.len(), 2);
        assert_eq!(bundle.complexes()[0].metadata.complex_name, "A단지 재수집");

        bundle.remove_all();
        assert!(bundle.is_empty());
    }

    #[test]
    fn test_document_shape() {
        let mut bundle = ExportBundle::new();
        bundle.upsert(make_snapshot("111", "A단지"));
        bundle.upsert(make_snapshot("222", "B단지"));

        let doc = serde_json::to_value(bundle.to_document(now()).unwrap()).unwrap();
        assert_eq!(doc["metadata"]["total_complexes"], json!(2));
        assert_eq!(doc["metadata"]["complex_names"], json!("A단지, B단지"));
        assert_eq!(doc["metadata"]["export_date"], serde_json::to_value(now()).unwrap());
        assert_eq!(doc["complexes"][1]["metadata"]["complex_no"], json!("222"));
        assert_eq!(doc["complexes"][0]["metadata"]["collector"], json!(DEFAULT_COLLECTOR));
        assert_eq!(doc["complexes"][0]["listings"][0]["gap"], json!(30000));
    }

    #[test]
    fn test_empty_bundle_has_no_document() {
        assert!(ExportBundle::new().to_document(now()).is_err());
    }

    #[test]
    fn test_bundle_json_is_a_plain_array() {
        let mut bundle = ExportBundle::new();
        bundle.upsert(make_snapshot("111", "A단지"));

        let json = bundle.to_json().unwrap();
        assert!(json.starts_with('['));
        assert_eq!(ExportBundle::from_json(&json).unwrap(), bundle);
    }

    #[test]
    fn test_export_file_name() {
        assert_eq!(export_file_name(now()), "all_complexes_1792141200000.json");
    }
}
