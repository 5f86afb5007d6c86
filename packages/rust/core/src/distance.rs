//! Batched origin→destinations distance lookup.
//!
//! The distance matrix service caps destinations per call, so destinations are
//! sent in consecutive batches. Output is always one element per destination,
//! in destination order: a failed batch contributes `FAILED` placeholders.

use std::time::Duration;

use tracing::{debug, info, instrument, warn};

use unifind_places::PlacesApi;
use unifind_shared::{Coordinate, DistanceElement};

use crate::with_timeout;

/// Distance elements aligned 1:1 with the destinations.
#[derive(Debug, Clone, Default)]
pub struct DistanceReport {
    pub elements: Vec<DistanceElement>,
    /// Batches whose call failed or timed out.
    pub failed_batches: usize,
}

/// Consecutive destination batches of at most `batch_size` (minimum 1).
pub fn batches(destinations: &[Coordinate], batch_size: usize) -> std::slice::Chunks<'_, Coordinate> {
    destinations.chunks(batch_size.max(1))
}

/// Look up the distance from `origin` to every destination, one call per batch.
#[instrument(skip_all, fields(origin = %origin, destinations = destinations.len(), batch_size = batch_size))]
pub async fn measure_distances<A: PlacesApi>(
    api: &A,
    origin: Coordinate,
    destinations: &[Coordinate],
    batch_size: usize,
    timeout: Duration,
) -> DistanceReport {
    let mut report = DistanceReport {
        elements: Vec::with_capacity(destinations.len()),
        failed_batches: 0,
    };

    for (index, batch) in batches(destinations, batch_size).enumerate() {
        match with_timeout(timeout, "distance matrix", api.distance_matrix(origin, batch)).await {
            Ok(mut elements) => {
                if elements.len() != batch.len() {
                    warn!(
                        batch = index,
                        expected = batch.len(),
                        received = elements.len(),
                        "distance batch size mismatch, realigning"
                    );
                    elements.resize(batch.len(), DistanceElement::failed());
                }
                debug!(batch = index, size = batch.len(), "distance batch measured");
                report.elements.extend(elements);
            }
            Err(e) => {
                warn!(
                    batch = index,
                    size = batch.len(),
                    error = %e,
                    "distance batch failed, inserting placeholders"
                );
                report.failed_batches += 1;
                report
                    .elements
                    .extend(std::iter::repeat_n(DistanceElement::failed(), batch.len()));
            }
        }
    }

    info!(
        elements = report.elements.len(),
        failed_batches = report.failed_batches,
        "distances measured"
    );
    report
}
