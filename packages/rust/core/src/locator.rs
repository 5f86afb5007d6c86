//! Institution discovery around a coordinate.
//!
//! Two strategies run in order: a place-type search, then (only if that found
//! nothing) a keyword search. Each follows next-page tokens through a
//! [`PageCursor`], which owns the fetch cap and the mandatory wait before
//! every follow-up page.

use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use unifind_places::{NearbyQuery, PlaceFilter, PlacesApi};
use unifind_shared::{Coordinate, InstitutionCandidate, ProximityConfig, Result};

use crate::with_timeout;

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

/// Discovery strategy, in the order they are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SearchStrategy {
    #[serde(rename = "type")]
    ByType,
    #[serde(rename = "keyword")]
    ByKeyword,
}

impl SearchStrategy {
    /// All strategies, primary first.
    pub const ORDER: [SearchStrategy; 2] = [SearchStrategy::ByType, SearchStrategy::ByKeyword];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ByType => "type",
            Self::ByKeyword => "keyword",
        }
    }

    /// The nearby-search filter this strategy sends.
    pub fn filter(&self, config: &ProximityConfig) -> PlaceFilter {
        match self {
            Self::ByType => PlaceFilter::Type(config.place_type.clone()),
            Self::ByKeyword => PlaceFilter::Keyword(config.keywords.join("|")),
        }
    }
}

// ---------------------------------------------------------------------------
// PageCursor
// ---------------------------------------------------------------------------

/// Lazily walks the pages of one nearby search.
///
/// Yields at most `max_pages` pages. Before every page after the first it
/// sleeps `delay`, since next-page tokens are not valid immediately.
/// The cursor ends after an empty token or a failed fetch.
pub struct PageCursor<'a, A> {
    api: &'a A,
    next: Option<NearbyQuery>,
    fetched: u32,
    max_pages: u32,
    delay: Duration,
    timeout: Duration,
}

impl<'a, A: PlacesApi> PageCursor<'a, A> {
    pub fn new(api: &'a A, first: NearbyQuery, config: &ProximityConfig) -> Self {
        Self {
            api,
            next: Some(first),
            fetched: 0,
            max_pages: config.max_pages,
            delay: config.page_delay,
            timeout: config.call_timeout,
        }
    }

    /// Pages fetched so far.
    pub fn fetched(&self) -> u32 {
        self.fetched
    }

    /// Fetch the next page, or `None` once the search is exhausted.
    pub async fn next_page(&mut self) -> Option<Result<Vec<InstitutionCandidate>>> {
        if self.fetched >= self.max_pages {
            return None;
        }
        let query = self.next.take()?;

        if self.fetched > 0 {
            tokio::time::sleep(self.delay).await;
        }
        self.fetched += 1;

        match with_timeout(self.timeout, "nearby search", self.api.nearby_search(&query)).await {
            Ok(page) => {
                self.next = page
                    .next_page_token
                    .map(|page_token| NearbyQuery::NextPage { page_token });
                Some(Ok(page.candidates))
            }
            Err(e) => Some(Err(e)),
        }
    }
}

// ---------------------------------------------------------------------------
// Discovery
// ---------------------------------------------------------------------------

/// Candidates found, and which strategy found them.
#[derive(Debug, Clone, Default)]
pub struct Discovery {
    pub strategy: Option<SearchStrategy>,
    pub candidates: Vec<InstitutionCandidate>,
}

/// Find institutions near `origin`, falling back to the keyword search when
/// the type search finds nothing. The fallback replaces, never merges.
#[instrument(skip_all, fields(origin = %origin, radius_m = config.radius_m))]
pub async fn locate_institutions<A: PlacesApi>(
    api: &A,
    origin: Coordinate,
    config: &ProximityConfig,
) -> Discovery {
    for strategy in SearchStrategy::ORDER {
        let candidates = run_strategy(api, origin, strategy, config).await;
        if !candidates.is_empty() {
            info!(
                strategy = strategy.as_str(),
                candidates = candidates.len(),
                "institutions discovered"
            );
            return Discovery {
                strategy: Some(strategy),
                candidates,
            };
        }
        debug!(strategy = strategy.as_str(), "strategy found no institutions");
    }

    info!("no institutions found by any strategy");
    Discovery::default()
}

/// Run one strategy to exhaustion, accumulating every page.
///
/// A failed page keeps what earlier pages returned.
async fn run_strategy<A: PlacesApi>(
    api: &A,
    origin: Coordinate,
    strategy: SearchStrategy,
    config: &ProximityConfig,
) -> Vec<InstitutionCandidate> {
    let first = NearbyQuery::Search {
        location: origin,
        radius_m: config.radius_m,
        filter: strategy.filter(config),
    };
    let mut cursor = PageCursor::new(api, first, config);
    let mut found = Vec::new();

    while let Some(page) = cursor.next_page().await {
        match page {
            Ok(candidates) => {
                debug!(
                    strategy = strategy.as_str(),
                    page = cursor.fetched(),
                    results = candidates.len(),
                    "nearby page fetched"
                );
                found.extend(candidates);
            }
            Err(e) => {
                warn!(
                    strategy = strategy.as_str(),
                    page = cursor.fetched(),
                    error = %e,
                    "nearby search failed, keeping earlier pages"
                );
                break;
            }
        }
    }

    found
}
