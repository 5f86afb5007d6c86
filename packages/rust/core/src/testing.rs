//! In-memory [`PlacesApi`] for stage and pipeline tests.

use std::collections::HashMap;
use std::sync::Mutex;

use tokio::time::Instant;

use unifind_places::{NearbyPage, NearbyQuery, PlaceFilter, PlacesApi};
use unifind_shared::{
    Coordinate, DistanceElement, InstitutionCandidate, Result, STATUS_OK, UnifindError,
};

/// Distance reported for destinations absent from `FakePlaces::distances`.
pub(crate) const DEFAULT_DISTANCE_M: u64 = 1_000;

/// A recorded outbound call.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    Geocode(String),
    Nearby { query: NearbyQuery, at: Instant },
    DistanceMatrix { destinations: usize },
}

/// Scripted responses. Nearby pages are chained with tokens `type:<n>` and
/// `keyword:<n>`.
#[derive(Default)]
pub(crate) struct FakePlaces {
    pub geocode_results: Vec<Coordinate>,
    pub fail_geocode: bool,
    pub type_pages: Vec<Vec<InstitutionCandidate>>,
    pub keyword_pages: Vec<Vec<InstitutionCandidate>>,
    /// `("type" | "keyword", page index)` that answers with an error.
    pub fail_nearby_page: Option<(&'static str, usize)>,
    /// Zero-based distance-matrix call numbers that fail.
    pub failing_batches: Vec<usize>,
    /// Meters keyed by destination `lat,lng`.
    pub distances: HashMap<String, u64>,
    /// Every call pends forever.
    pub hang: bool,
    /// Calls in the order they arrived.
    pub log: Mutex<Vec<Call>>,
}

impl FakePlaces {
    pub(crate) fn calls(&self) -> Vec<Call> {
        self.log.lock().unwrap().clone()
    }

    pub(crate) fn nearby_calls(&self) -> Vec<(NearbyQuery, Instant)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Nearby { query, at } => Some((query, at)),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn batch_sizes(&self) -> Vec<usize> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::DistanceMatrix { destinations } => Some(destinations),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.log.lock().unwrap().push(call);
    }

    async fn maybe_hang(&self) {
        if self.hang {
            std::future::pending::<()>().await;
        }
    }

    fn page(&self, kind: &'static str, index: usize) -> Result<NearbyPage> {
        if self.fail_nearby_page == Some((kind, index)) {
            return Err(UnifindError::Network(format!("nearby {kind} page {index}: HTTP 503")));
        }
        let pages = if kind == "type" {
            &self.type_pages
        } else {
            &self.keyword_pages
        };
        let candidates = pages.get(index).cloned().unwrap_or_default();
        let next_page_token = (index + 1 < pages.len()).then(|| format!("{kind}:{}", index + 1));
        Ok(NearbyPage {
            candidates,
            next_page_token,
        })
    }
}

impl PlacesApi for FakePlaces {
    async fn geocode(&self, address: &str) -> Result<Vec<Coordinate>> {
        self.record(Call::Geocode(address.to_string()));
        self.maybe_hang().await;
        if self.fail_geocode {
            return Err(UnifindError::Network("geocode/json: connection reset".into()));
        }
        Ok(self.geocode_results.clone())
    }

    async fn nearby_search(&self, query: &NearbyQuery) -> Result<NearbyPage> {
        self.record(Call::Nearby {
            query: query.clone(),
            at: Instant::now(),
        });
        self.maybe_hang().await;
        match query {
            NearbyQuery::Search { filter, .. } => match filter {
                PlaceFilter::Type(_) => self.page("type", 0),
                PlaceFilter::Keyword(_) => self.page("keyword", 0),
            },
            NearbyQuery::NextPage { page_token } => {
                let (kind, index) = page_token
                    .split_once(':')
                    .and_then(|(kind, n)| Some((kind, n.parse::<usize>().ok()?)))
                    .ok_or_else(|| UnifindError::Api {
                        status: "INVALID_REQUEST".into(),
                        message: format!("unknown page token {page_token}"),
                    })?;
                self.page(if kind == "type" { "type" } else { "keyword" }, index)
            }
        }
    }

    async fn distance_matrix(
        &self,
        _origin: Coordinate,
        destinations: &[Coordinate],
    ) -> Result<Vec<DistanceElement>> {
        let call_index = self.batch_sizes().len();
        self.record(Call::DistanceMatrix {
            destinations: destinations.len(),
        });
        self.maybe_hang().await;
        if self.failing_batches.contains(&call_index) {
            return Err(UnifindError::Network(format!(
                "distancematrix/json: batch {call_index} refused"
            )));
        }
        Ok(destinations
            .iter()
            .map(|d| DistanceElement {
                status: STATUS_OK.into(),
                distance_meters: Some(
                    self.distances
                        .get(&d.to_string())
                        .copied()
                        .unwrap_or(DEFAULT_DISTANCE_M),
                ),
            })
            .collect())
    }
}

/// A university-typed candidate at `(lat, -6.26)`.
pub(crate) fn candidate(name: &str, lat: f64, reviews: u32, rating: f64) -> InstitutionCandidate {
    InstitutionCandidate {
        name: name.into(),
        location: Coordinate::new(lat, -6.26),
        types: vec!["university".into(), "point_of_interest".into()],
        user_ratings_total: Some(reviews),
        rating: Some(rating),
        vicinity: Some(format!("{name} Campus")),
    }
}
