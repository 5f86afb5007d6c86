//! End-to-end enrichment: address → geocode → discover → measure → rank.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, instrument, warn};

use unifind_places::PlacesApi;
use unifind_shared::{Coordinate, Property, ProximityConfig, RankedInstitution, Result};

use crate::address::{format_address, missing_fields};
use crate::distance::measure_distances;
use crate::geocoder::{GeocodeOutcome, geocode};
use crate::locator::{SearchStrategy, locate_institutions};
use crate::ranker::{attach_distances, rank_and_select};

/// What one enrichment run found, and how far it got.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichmentReport {
    /// When the run started.
    pub generated_at: DateTime<Utc>,
    /// Geocode query sent, if the property had an address.
    pub query: Option<String>,
    /// Geocoded property location.
    pub origin: Option<Coordinate>,
    /// Strategy that produced candidates.
    pub strategy: Option<SearchStrategy>,
    pub candidates_found: usize,
    pub failed_batches: usize,
    /// Review-count step that let candidates through.
    pub review_threshold: Option<u32>,
    pub institutions: Vec<RankedInstitution>,
}

impl EnrichmentReport {
    fn started() -> Self {
        Self {
            generated_at: Utc::now(),
            query: None,
            origin: None,
            strategy: None,
            candidates_found: 0,
            failed_batches: 0,
            review_threshold: None,
            institutions: Vec::new(),
        }
    }
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new stage.
    fn phase(&self, name: &str);
    /// Called once the run has finished, however early.
    fn done(&self, report: &EnrichmentReport);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn done(&self, _report: &EnrichmentReport) {}
}

/// Finds the universities nearest a property listing.
///
/// Holds no state between runs; every call is independent.
pub struct ProximityPipeline<A> {
    api: A,
    config: ProximityConfig,
}

impl<A: PlacesApi> ProximityPipeline<A> {
    /// Create a pipeline, rejecting configuration it cannot run with.
    pub fn new(api: A, config: ProximityConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { api, config })
    }

    pub fn config(&self) -> &ProximityConfig {
        &self.config
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// The up-to-`limit` best institutions near the property, best first.
    ///
    /// `None` uses the configured default limit. Never fails: anything that
    /// goes wrong along the way yields a shorter or empty list.
    pub async fn nearest_universities(
        &self,
        property: &Property,
        limit: Option<usize>,
    ) -> Vec<RankedInstitution> {
        self.enrich(property, limit, &SilentProgress).await.institutions
    }

    /// Like [`nearest_universities`](Self::nearest_universities), returning
    /// the full run report.
    #[instrument(skip_all, fields(limit = ?limit))]
    pub async fn enrich(
        &self,
        property: &Property,
        limit: Option<usize>,
        progress: &dyn ProgressReporter,
    ) -> EnrichmentReport {
        let report = self.run(property, limit, progress).await;
        progress.done(&report);
        report
    }

    async fn run(
        &self,
        property: &Property,
        limit: Option<usize>,
        progress: &dyn ProgressReporter,
    ) -> EnrichmentReport {
        let mut report = EnrichmentReport::started();

        let Some(address) = property.house_address.as_ref() else {
            info!("property has no address, nothing to enrich");
            return report;
        };
        let missing = missing_fields(address);
        if !missing.is_empty() {
            warn!(?missing, "address is incomplete, geocoding anyway");
        }

        // --- Phase 1: Format + geocode ---
        progress.phase("Geocoding address");
        let query = format_address(address);
        let outcome = geocode(&self.api, &query, self.config.call_timeout).await;
        report.query = Some(query);

        let origin = match outcome {
            GeocodeOutcome::Found(origin) => origin,
            GeocodeOutcome::NotFound => {
                info!("address could not be geocoded");
                return report;
            }
        };
        report.origin = Some(origin);

        // --- Phase 2: Discover ---
        progress.phase("Searching for institutions");
        let discovery = locate_institutions(&self.api, origin, &self.config).await;
        report.strategy = discovery.strategy;
        report.candidates_found = discovery.candidates.len();
        if discovery.candidates.is_empty() {
            return report;
        }

        // --- Phase 3: Measure ---
        progress.phase("Measuring distances");
        let destinations: Vec<Coordinate> =
            discovery.candidates.iter().map(|c| c.location).collect();
        let distances = measure_distances(
            &self.api,
            origin,
            &destinations,
            self.config.batch_size,
            self.config.call_timeout,
        )
        .await;
        report.failed_batches = distances.failed_batches;

        // --- Phase 4: Rank ---
        progress.phase("Ranking institutions");
        let scored = attach_distances(discovery.candidates, &distances.elements);
        let selection = rank_and_select(
            scored,
            &self.config.review_thresholds,
            limit.unwrap_or(self.config.limit),
            self.config.minutes_per_km,
            address,
        );
        report.review_threshold = selection.review_threshold;
        report.institutions = selection.institutions;

        info!(
            origin = %origin,
            candidates = report.candidates_found,
            selected = report.institutions.len(),
            "enrichment complete"
        );
        report
    }
}
