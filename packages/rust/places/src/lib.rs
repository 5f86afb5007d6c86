//! Outbound Maps API access for unifind.
//!
//! The pipeline talks to the outside world only through [`PlacesApi`], so
//! tests can swap in an in-memory fake. [`GoogleMapsClient`] is the production
//! implementation over `reqwest`.

mod client;
mod wire;

use std::future::Future;

use unifind_shared::{Coordinate, DistanceElement, InstitutionCandidate, Result};

pub use client::{ClientOptions, GoogleMapsClient};

// ---------------------------------------------------------------------------
// Nearby search requests
// ---------------------------------------------------------------------------

/// How a nearby search narrows its results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaceFilter {
    /// `type=<place type>`.
    Type(String),
    /// `keyword=<terms>`; terms are sent verbatim.
    Keyword(String),
}

/// One nearby-search call: either a fresh search or a continuation.
#[derive(Debug, Clone, PartialEq)]
pub enum NearbyQuery {
    /// First page of a search around `location`.
    Search {
        location: Coordinate,
        radius_m: u32,
        filter: PlaceFilter,
    },
    /// Follow-up page identified by a token from the previous response.
    NextPage { page_token: String },
}

/// One page of nearby-search results.
#[derive(Debug, Clone, Default)]
pub struct NearbyPage {
    pub candidates: Vec<InstitutionCandidate>,
    pub next_page_token: Option<String>,
}

// ---------------------------------------------------------------------------
// Capability trait
// ---------------------------------------------------------------------------

/// The three Maps operations the proximity pipeline needs.
pub trait PlacesApi: Send + Sync {
    /// Resolve an address to zero or more coordinates, best match first.
    fn geocode(&self, address: &str) -> impl Future<Output = Result<Vec<Coordinate>>> + Send;

    /// Fetch one page of nearby places.
    fn nearby_search(&self, query: &NearbyQuery) -> impl Future<Output = Result<NearbyPage>> + Send;

    /// Distances from `origin` to each destination, in destination order.
    fn distance_matrix(
        &self,
        origin: Coordinate,
        destinations: &[Coordinate],
    ) -> impl Future<Output = Result<Vec<DistanceElement>>> + Send;
}
