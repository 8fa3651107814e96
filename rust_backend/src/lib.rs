//! # PEPPER Rust Backend
//!
//! Catalog mirroring and nightly target prioritisation for transient follow-up.
//!
//! This crate keeps a local mirror of the public transient catalog current by
//! merging upstream delta files, and ranks recent catalog entries by how
//! desirable they are to observe from a ground-based telescope on a given night.
//! Two survey variants share the engine: *Fast* favours fresh, bright objects and
//! *Slow* favours targets with long visibility windows.
//!
//! ## Features
//!
//! - **Catalog I/O**: Read and atomically rewrite the mirrored catalog file
//! - **Merging**: Apply ordered delta batches with upsert semantics
//! - **Catch-up planning**: Decide which daily delta files bring the mirror current
//! - **Visibility**: Dark-time window, time above the altitude floor, lunar separation
//!   and galactic latitude per target
//! - **Scoring**: Threshold filtering and weighted rank-based priority scores
//! - **Follow-up**: Select the best targets of a list and format their coordinates
//!
//! ## Architecture
//!
//! - [`core`]: Domain records and the error taxonomy
//! - [`config`]: TOML-loadable engine configuration
//! - [`time`]: Julian date and sidereal time helpers
//! - [`parsing`]: Catalog file format and timestamp parsing
//! - [`merge`]: Catalog merger and delta catch-up planning
//! - [`ephemeris`]: Ephemeris service seam and the built-in analytic model
//! - [`services`]: Visibility, scoring, priority lists and follow-up selection
//! - [`io`]: Persisted outputs (priority lists, solar-times record)
//!
//! ## Performance
//!
//! Per-target visibility work is independent and runs on the rayon thread pool;
//! ranking is a single sort per scored variable.

pub mod config;
pub mod core;
pub mod ephemeris;
pub mod io;
pub mod merge;
pub mod parsing;
pub mod services;
pub mod time;

pub use config::EngineConfig;
pub use core::domain::{CatalogEntry, CatalogStore, PriorityList, ScoredEntry, Site, SurveyVariant};
pub use core::error::{EngineError, EngineResult};
pub use ephemeris::{analytic::LowPrecisionEphemeris, Ephemeris};
pub use merge::merger::CatalogMerger;
pub use services::priority_list::PriorityListBuilder;
pub use services::scoring::Scorer;
pub use services::visibility::VisibilityCalculator;
