//! Eligibility gates.
//!
//! The size gate runs on every record before grouping. The member gates run on
//! accumulated sale groups only; lease groups are never gated here.

use crate::parser::size_token;
use listing_core::{FilterConfig, Floor, FloorLevel};
use std::fmt;

/// Floor tokens treated as ground-level floors, matched as a substring.
const GROUND_FLOOR_TOKENS: &str = "1|2|3";

/// Minimum building height for the low-floor rule.
const TALL_BUILDING_FLOORS: u32 = 5;

/// Highest unit floor still counted as low in a tall building.
const LOW_FLOOR_MAX: u32 = 3;

/// Pass the size gate?
///
/// A key without any number passes.
pub fn passes_size_gate(size_key: &str, config: &FilterConfig) -> bool {
    if config.include_large_units {
        return true;
    }
    match size_token(size_key) {
        Some(size) => size <= config.max_size_m2(),
        None => true,
    }
}

/// Why a sale group member was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaleRejection {
    /// Remarks carry an encumbrance marker.
    Encumbered,
    /// Floor is the "저" sentinel.
    LowFloorMarker,
    /// Floor 1-3 (or an empty token) or the top floor.
    GroundOrTopFloor,
    /// Floor 3 or below in a building of 5+ floors.
    LowFloorInTallBuilding,
}

impl fmt::Display for SaleRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            SaleRejection::Encumbered => "encumbered",
            SaleRejection::LowFloorMarker => "low floor marker",
            SaleRejection::GroundOrTopFloor => "ground or top floor",
            SaleRejection::LowFloorInTallBuilding => "low floor in tall building",
        };
        f.write_str(reason)
    }
}

/// Check one accumulated sale group member.
pub fn check_sale_member(
    floor: &Floor,
    encumbered: bool,
    config: &FilterConfig,
) -> Result<(), SaleRejection> {
    if !config.include_encumbered && encumbered {
        return Err(SaleRejection::Encumbered);
    }
    check_sale_floor(floor)
}

/// Floor gate.
///
/// The unit token is matched as a substring of `1|2|3`, so an empty token is
/// rejected too.
fn check_sale_floor(floor: &Floor) -> Result<(), SaleRejection> {
    if floor.unit == FloorLevel::Low {
        return Err(SaleRejection::LowFloorMarker);
    }

    if GROUND_FLOOR_TOKENS.contains(floor.unit.token().as_str()) || floor.is_top() {
        return Err(SaleRejection::GroundOrTopFloor);
    }

    if let (Some(unit), Some(total)) = (floor.unit.as_number(), floor.total) {
        if total >= TALL_BUILDING_FLOORS && unit <= LOW_FLOOR_MAX {
            return Err(SaleRejection::LowFloorInTallBuilding);
        }
    }

    Ok(())
}
