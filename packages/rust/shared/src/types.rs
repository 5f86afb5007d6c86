//! Core domain types for proximity enrichment.
//!
//! All of these are request-scoped values: created and dropped within one
//! pipeline run. The marketplace exchanges addresses and results as camelCase
//! JSON, so those types rename their fields accordingly.

use serde::{Deserialize, Serialize};

/// Distance-matrix element status for a usable result.
pub const STATUS_OK: &str = "OK";

/// Placeholder status for destinations whose batch call failed.
pub const STATUS_FAILED: &str = "FAILED";

// ---------------------------------------------------------------------------
// Addresses
// ---------------------------------------------------------------------------

/// An Irish postal address as stored on a property listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredAddress {
    pub address_line1: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_line2: Option<String>,
    pub town_city: String,
    pub county: String,
    pub eircode: String,
}

/// The slice of a property listing the pipeline reads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    #[serde(default)]
    pub house_address: Option<StructuredAddress>,
}

// ---------------------------------------------------------------------------
// Coordinate
// ---------------------------------------------------------------------------

/// A WGS84 point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Formats as `lat,lng`, the form every Maps endpoint accepts.
impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.lat, self.lng)
    }
}

// ---------------------------------------------------------------------------
// Discovery and distance
// ---------------------------------------------------------------------------

/// A place returned by nearby search, not yet filtered or ranked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstitutionCandidate {
    pub name: String,
    pub location: Coordinate,
    #[serde(default)]
    pub types: Vec<String>,
    #[serde(default)]
    pub user_ratings_total: Option<u32>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub vicinity: Option<String>,
}

impl InstitutionCandidate {
    /// Whether the place carries the given Places type tag.
    pub fn has_type(&self, place_type: &str) -> bool {
        self.types.iter().any(|t| t == place_type)
    }
}

/// One origin→destination result, positionally aligned to a candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistanceElement {
    pub status: String,
    #[serde(default)]
    pub distance_meters: Option<u64>,
}

impl DistanceElement {
    /// Placeholder for a destination whose batch call failed.
    pub fn failed() -> Self {
        Self {
            status: STATUS_FAILED.into(),
            distance_meters: None,
        }
    }

    /// Usable distance, if the element is OK and carries one.
    pub fn meters(&self) -> Option<u64> {
        if self.status == STATUS_OK {
            self.distance_meters
        } else {
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Address block attached to a ranked institution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstitutionAddress {
    pub address_line1: String,
    pub town_city: String,
    pub county: String,
    pub eircode: String,
}

/// A nearby institution as returned to the listing caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedInstitution {
    pub name: String,
    pub address: InstitutionAddress,
    /// Driving distance in meters (0 when unknown).
    pub distance: u64,
    /// Estimated driving time in whole minutes.
    pub avg_time_by_car: u32,
    pub rating: Option<f64>,
    pub total_reviews: Option<u32>,
}
