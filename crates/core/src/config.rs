//! Configuration structures for the listing digest.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Main configuration for one aggregation pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Inclusion rules.
    pub filter: FilterConfig,
    /// Grouping and reduction options.
    pub aggregation: AggregationConfig,
    /// Signal thresholds.
    pub signal: SignalConfig,
}

impl Config {
    /// Parse a configuration from JSON. Missing sections take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Check values the aggregation formulas assume.
    pub fn validate(&self) -> Result<()> {
        if !(1..=3).contains(&self.signal.multiplier) {
            return Err(Error::config(format!(
                "signal multiplier must be 1, 2 or 3 (got {})",
                self.signal.multiplier
            )));
        }
        if self.filter.pyeong_m2 <= 0.0 {
            return Err(Error::config("pyeong_m2 must be positive"));
        }
        if self.signal.low_pct > self.signal.middle_pct {
            return Err(Error::config("signal low_pct must not exceed middle_pct"));
        }
        Ok(())
    }

    /// Overlay the toggles saved by the page script.
    pub fn apply_stored_filter(&mut self, stored: &StoredFilter) -> Result<()> {
        self.filter.include_large_units = stored.area_check;
        self.filter.include_encumbered = stored.seango_check;
        self.aggregation.lowest_lease_mode = stored.low_jeonse_check;
        self.signal.multiplier = stored.multiplier()?;
        Ok(())
    }
}

/// Eligibility filter configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Keep units above the size threshold.
    pub include_large_units: bool,
    /// Keep sale listings that assume an existing loan or deposit.
    pub include_encumbered: bool,
    /// Size threshold in pyeong.
    pub max_pyeong: f64,
    /// Square meters per pyeong.
    pub pyeong_m2: f64,
}

impl FilterConfig {
    /// Size threshold in the size key's m² scale.
    pub fn max_size_m2(&self) -> f64 {
        self.max_pyeong * self.pyeong_m2
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            include_large_units: false,
            include_encumbered: false,
            max_pyeong: 35.0,
            pyeong_m2: 3.3,
        }
    }
}

/// Grouping and reduction configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregationConfig {
    /// Represent the lease side by its cheapest entry instead of the dearest.
    pub lowest_lease_mode: bool,
    /// Treat each distinct price at an address as its own observation.
    /// Also enables the sale signal and summed counts.
    pub group_by_address: bool,
}

/// Signal classification configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalConfig {
    /// Threshold multiplier (1, 2 or 3).
    pub multiplier: u32,
    /// Rates below `low_pct * multiplier` are green.
    pub low_pct: f64,
    /// Rates up to and including `middle_pct * multiplier` are orange.
    pub middle_pct: f64,
}

impl SignalConfig {
    /// Green/orange boundary.
    pub fn low_threshold(&self) -> f64 {
        self.low_pct * self.multiplier as f64
    }

    /// Orange/red boundary.
    pub fn middle_threshold(&self) -> f64 {
        self.middle_pct * self.multiplier as f64
    }
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            multiplier: 1,
            low_pct: 5.0,
            middle_pct: 10.0,
        }
    }
}

/// Toggle object persisted by the page script under `wolbu_price_filter`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoredFilter {
    pub area_check: bool,
    pub low_jeonse_check: bool,
    pub seango_check: bool,
    /// Radio value; the page stores it as a number or a numeric string.
    pub shiho_radio: Option<serde_json::Value>,
}

impl StoredFilter {
    /// Parse the stored JSON object.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Signal multiplier, 1 when unset.
    pub fn multiplier(&self) -> Result<u32> {
        use serde_json::Value;

        match &self.shiho_radio {
            None | Some(Value::Null) => Ok(1),
            Some(Value::Number(n)) => n
                .as_u64()
                .and_then(|n| u32::try_from(n).ok())
                .ok_or_else(|| Error::config(format!("invalid signal multiplier {n}"))),
            Some(Value::String(s)) if s.trim().is_empty() => Ok(1),
            Some(Value::String(s)) => s
                .trim()
                .parse()
                .map_err(|_| Error::config(format!("invalid signal multiplier {s:?}"))),
            Some(other) => Err(Error::config(format!("invalid signal multiplier {other}"))),
        }
    }
}
