//! Shared types, error model, and configuration for unifind.
//!
//! This crate is the foundation depended on by all other unifind crates.
//! It provides:
//! - [`UnifindError`]: the unified error type
//! - Domain types ([`StructuredAddress`], [`Coordinate`], [`InstitutionCandidate`],
//!   [`DistanceElement`], [`RankedInstitution`])
//! - Configuration ([`AppConfig`], [`ProximityConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DistanceConfig, GoogleConfig, ProximityConfig, RankingConfig, SearchConfig,
    config_dir, config_file_path, init_config, load_config, load_config_from, resolve_api_key,
};
pub use error::{Result, UnifindError};
pub use types::{
    Coordinate, DistanceElement, InstitutionAddress, InstitutionCandidate, Property,
    RankedInstitution, STATUS_FAILED, STATUS_OK, StructuredAddress,
};
