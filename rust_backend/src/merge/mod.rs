//! Keeping the catalog mirror current.
//!
//! - [`merger`]: apply delta batches to a snapshot with upsert semantics
//! - [`update_plan`]: decide which daily delta files bring a snapshot current

pub mod merger;
pub mod update_plan;

#[cfg(test)]
mod merger_tests;

pub use merger::{CatalogMerger, MergeOutcome};
pub use update_plan::{delta_file_name, plan_update, UpdatePlan, UpdateStep};
