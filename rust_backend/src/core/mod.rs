//! Core domain models for catalog mirroring and target ranking.
//!
//! This module defines the fundamental records used throughout the engine:
//! catalog entries and snapshots, observing sites, survey variants and the
//! enriched and scored entries produced by a ranking run.

pub mod domain;
pub mod error;

pub use domain::*;
pub use error::{EngineError, EngineResult};
