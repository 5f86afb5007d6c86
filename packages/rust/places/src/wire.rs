//! JSON shapes of the Geocoding, Places Nearby Search and Distance Matrix
//! web services, trimmed to the fields unifind reads.

use serde::Deserialize;

use unifind_shared::{Coordinate, DistanceElement, InstitutionCandidate, Result, UnifindError};

/// Status for a successful request with results.
const STATUS_OK: &str = "OK";

/// Status for a successful request that matched nothing.
const STATUS_ZERO_RESULTS: &str = "ZERO_RESULTS";

/// Map a top-level response status to `Ok(())` or an [`UnifindError::Api`].
pub(crate) fn check_status(status: &str, error_message: Option<String>) -> Result<()> {
    match status {
        STATUS_OK | STATUS_ZERO_RESULTS => Ok(()),
        other => Err(UnifindError::api(other, error_message)),
    }
}

// ---------------------------------------------------------------------------
// Geocoding
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct GeocodeResponse {
    pub status: String,
    #[serde(default)]
    pub results: Vec<GeocodeResult>,
    #[serde(default)]
    pub error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GeocodeResult {
    pub geometry: Geometry,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Geometry {
    pub location: Coordinate,
}

// ---------------------------------------------------------------------------
// Nearby search
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct NearbySearchResponse {
    pub status: String,
    #[serde(default)]
    pub results: Vec<PlaceResult>,
    #[serde(default)]
    pub next_page_token: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PlaceResult {
    pub name: String,
    pub geometry: Geometry,
    #[serde(default)]
    pub types: Vec<String>,
    #[serde(default)]
    pub user_ratings_total: Option<u32>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub vicinity: Option<String>,
}

impl From<PlaceResult> for InstitutionCandidate {
    fn from(place: PlaceResult) -> Self {
        Self {
            name: place.name,
            location: place.geometry.location,
            types: place.types,
            user_ratings_total: place.user_ratings_total,
            rating: place.rating,
            vicinity: place.vicinity,
        }
    }
}

// ---------------------------------------------------------------------------
// Distance matrix
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct DistanceMatrixResponse {
    pub status: String,
    #[serde(default)]
    pub rows: Vec<MatrixRow>,
    #[serde(default)]
    pub error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MatrixRow {
    #[serde(default)]
    pub elements: Vec<MatrixElement>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MatrixElement {
    pub status: String,
    #[serde(default)]
    pub distance: Option<MatrixValue>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MatrixValue {
    pub value: u64,
}

impl From<MatrixElement> for DistanceElement {
    fn from(element: MatrixElement) -> Self {
        Self {
            status: element.status,
            distance_meters: element.distance.map(|d| d.value),
        }
    }
}
