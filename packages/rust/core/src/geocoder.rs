//! Address string → coordinate, degrading every failure to "not found".

use std::time::Duration;

use tracing::{debug, instrument, warn};

use unifind_places::PlacesApi;
use unifind_shared::Coordinate;

use crate::with_timeout;

/// Outcome of a geocode lookup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GeocodeOutcome {
    /// First (best) match.
    Found(Coordinate),
    /// No match, or the lookup failed.
    NotFound,
}

/// Resolve `query` to its best-match coordinate. Never errors.
#[instrument(skip_all)]
pub async fn geocode<A: PlacesApi>(api: &A, query: &str, timeout: Duration) -> GeocodeOutcome {
    match with_timeout(timeout, "geocode", api.geocode(query)).await {
        Ok(results) => match results.into_iter().next() {
            Some(location) => {
                debug!(%location, "address geocoded");
                GeocodeOutcome::Found(location)
            }
            None => {
                debug!("geocoder returned no results");
                GeocodeOutcome::NotFound
            }
        },
        Err(e) => {
            warn!(error = %e, "geocoding failed, treating as not found");
            GeocodeOutcome::NotFound
        }
    }
}
