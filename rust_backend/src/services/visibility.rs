//! Night and per-target visibility computation.
//!
//! For a given night this module resolves the dark-time window and, for each
//! target, how long it stays above the altitude floor during dark time, its
//! mean separation from the Moon and its galactic latitude.
//!
//! ## Performance considerations
//! - Night-level quantities are computed once and shared by every target
//! - Targets are independent and evaluated on the rayon thread pool
//! - Results keep input order, so parallelism never changes a ranking
//!
//! ## Edge cases
//! - Transit below the floor, or a floor crossing that does not exist: zero
//!   observable time and a zero lunar separation sentinel
//! - Zero-length dark window (no astronomical darkness): every target gets 0 h
//! - Unparsable or out-of-range coordinates fail only that target

use chrono::{DateTime, Duration, NaiveDate, Utc};
use log::debug;
use qtty::{Degrees, Hours};
use rayon::prelude::*;

use crate::config::EngineConfig;
use crate::core::domain::{CatalogEntry, NightConditions, Site, TargetVisibility};
use crate::core::error::{EngineError, EngineResult};
use crate::ephemeris::{night_window_start, Ephemeris, Equatorial};

/// Night-level results plus one result per requested target, in input order.
#[derive(Debug)]
pub struct VisibilityReport {
    pub night: NightConditions,
    pub targets: Vec<EngineResult<TargetVisibility>>,
}

/// Visibility stage bound to one site and one ephemeris service.
pub struct VisibilityCalculator<'a, E: Ephemeris + ?Sized> {
    ephemeris: &'a E,
    site: Site,
    altitude_floor: Degrees,
}

impl<'a, E: Ephemeris + ?Sized> VisibilityCalculator<'a, E> {
    pub fn new(ephemeris: &'a E, site: Site, altitude_floor: Degrees) -> Self {
        Self {
            ephemeris,
            site,
            altitude_floor,
        }
    }

    pub fn from_config(ephemeris: &'a E, config: &EngineConfig) -> Self {
        Self::new(ephemeris, config.site(), Degrees::new(config.altitude_floor_deg))
    }

    /// Dark-time window and Moon illumination for `night_date`.
    ///
    /// Illumination is sampled at local midnight, the middle of the 24 h
    /// window that opens at local noon.
    pub fn night_conditions(&self, night_date: NaiveDate) -> EngineResult<NightConditions> {
        let window_start = night_window_start(&self.site, night_date);
        let boundaries = self.ephemeris.night_boundaries(&self.site, window_start)?;
        let moon_illumination = self
            .ephemeris
            .moon_illumination(window_start + Duration::hours(12));

        let night = NightConditions {
            night_date,
            boundaries,
            moon_illumination,
        };
        debug!(
            "Night of {}: dark {} to {} ({} min), Moon {:.0}% illuminated",
            night_date,
            boundaries.dark_start.format("%H:%M:%S"),
            boundaries.dark_end.format("%H:%M:%S"),
            night.dark_duration().num_minutes(),
            moon_illumination * 100.0
        );
        Ok(night)
    }

    /// Visibility of bare coordinates on `night_date`.
    pub fn compute(&self, targets: &[Equatorial], night_date: NaiveDate) -> EngineResult<VisibilityReport> {
        let night = self.night_conditions(night_date)?;
        let targets = targets
            .par_iter()
            .enumerate()
            .map(|(index, target)| {
                let label = format!("#{}", index);
                validate_target(&label, target)?;
                self.target_visibility(&night, &label, target)
            })
            .collect();
        Ok(VisibilityReport { night, targets })
    }

    /// Visibility of catalog entries, one result per entry in input order.
    ///
    /// Failures are returned in place; they never abort the batch.
    pub fn compute_entries(
        &self,
        night: &NightConditions,
        entries: &[CatalogEntry],
    ) -> Vec<EngineResult<TargetVisibility>> {
        entries
            .par_iter()
            .map(|entry| {
                let (ra, dec) = entry.coordinates()?;
                self.target_visibility(night, &entry.id, &Equatorial::new(ra, dec))
            })
            .collect()
    }

    /// Visibility of a single target during the given night.
    pub fn target_visibility(
        &self,
        night: &NightConditions,
        id: &str,
        target: &Equatorial,
    ) -> EngineResult<TargetVisibility> {
        let window_start = night_window_start(&self.site, night.night_date);
        let galactic_latitude = self.ephemeris.galactic(target).b;

        let transit = self
            .ephemeris
            .transit(&self.site, target, window_start)
            .map_err(|e| EngineError::visibility(id, e.to_string()))?;

        if transit.altitude.value() < self.altitude_floor.value() {
            return Ok(TargetVisibility::unobservable(transit.altitude, galactic_latitude));
        }

        let Some(hour_angle) =
            hour_angle_at_altitude(self.altitude_floor, self.site.latitude, target.dec)
        else {
            return Ok(TargetVisibility::unobservable(transit.altitude, galactic_latitude));
        };

        let half_window = Duration::milliseconds((hour_angle.value() * 3_600_000.0).round() as i64);
        let rise = transit.time - half_window;
        let set = transit.time + half_window;
        let observable_time = observable_hours(
            rise,
            set,
            night.boundaries.dark_start,
            night.boundaries.dark_end,
        );

        let lunar_separation = if observable_time.value() > 0.0 {
            let epochs = night.dark_epochs();
            let total: f64 = epochs
                .iter()
                .map(|epoch| self.ephemeris.moon_separation(target, *epoch).value())
                .sum();
            Degrees::new(total / epochs.len() as f64)
        } else {
            Degrees::new(0.0)
        };

        Ok(TargetVisibility {
            transit_altitude: transit.altitude,
            observable_time,
            lunar_separation,
            galactic_latitude,
        })
    }
}

fn validate_target(id: &str, target: &Equatorial) -> EngineResult<()> {
    let (ra, dec) = (target.ra.value(), target.dec.value());
    if !(0.0..360.0).contains(&ra) || !(-90.0..=90.0).contains(&dec) {
        return Err(EngineError::visibility(
            id,
            format!("coordinates ({}, {}) out of range", ra, dec),
        ));
    }
    Ok(())
}

/// Hour angle at which a target crosses `altitude`.
///
/// Returns `None` when the crossing does not exist from this latitude
/// (`|cos HA| > 1`) or is undefined (target or site at a pole).
pub fn hour_angle_at_altitude(altitude: Degrees, latitude: Degrees, dec: Degrees) -> Option<Hours> {
    let denominator = latitude.cos() * dec.cos();
    if denominator.abs() < 1e-12 {
        return None;
    }

    let cos_ha = (altitude.sin() - latitude.sin() * dec.sin()) / denominator;
    if !cos_ha.is_finite() || cos_ha.abs() > 1.0 {
        return None;
    }

    Some(Hours::new(cos_ha.acos().to_degrees() / 15.0))
}

/// Hours of `[rise, set]` that fall inside `[dark_start, dark_end]`.
pub fn observable_hours(
    rise: DateTime<Utc>,
    set: DateTime<Utc>,
    dark_start: DateTime<Utc>,
    dark_end: DateTime<Utc>,
) -> Hours {
    let start = rise.max(dark_start);
    let end = set.min(dark_end);
    let seconds = (end - start).num_milliseconds() as f64 / 1000.0;
    Hours::new(seconds.max(0.0) / 3600.0)
}
