//! Ranking services.
//!
//! The services turn a catalog snapshot into ranked target lists:
//!
//! - [`visibility`]: dark-time window and per-target visibility
//! - [`scoring`]: threshold filtering and rank-based priority scores
//! - [`cross_reference`]: alias lookup links
//! - [`priority_list`]: orchestration of a full ranking run
//! - [`followup`]: selection of follow-up targets from a persisted list

pub mod cross_reference;
pub mod followup;
pub mod priority_list;
pub mod scoring;
pub mod visibility;

pub use followup::{format_dec_dms, format_ra_hms, select_followup_targets};
pub use priority_list::PriorityListBuilder;
pub use scoring::Scorer;
pub use visibility::{hour_angle_at_altitude, observable_hours, VisibilityCalculator};
