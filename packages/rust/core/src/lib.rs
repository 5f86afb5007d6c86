//! Proximity enrichment pipeline for unifind.
//!
//! This crate ties together address formatting, geocoding, institution
//! discovery, batched distance lookup and ranking into one workflow
//! ([`ProximityPipeline::nearest_universities`]).

pub mod address;
pub mod distance;
pub mod geocoder;
pub mod locator;
pub mod pipeline;
pub mod ranker;

#[cfg(test)]
mod testing;

use std::future::Future;
use std::time::Duration;

use unifind_shared::{Result, UnifindError};

pub use pipeline::{EnrichmentReport, ProgressReporter, ProximityPipeline, SilentProgress};

/// Run one outbound call, failing it as a network error after `limit`.
pub(crate) async fn with_timeout<T>(
    limit: Duration,
    call: &str,
    fut: impl Future<Output = Result<T>>,
) -> Result<T> {
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(UnifindError::Network(format!(
            "{call}: timed out after {}s",
            limit.as_secs_f64()
        ))),
    }
}
