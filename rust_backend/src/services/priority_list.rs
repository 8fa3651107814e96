//! Priority list orchestration.
//!
//! A run slices the catalog by the variant's recency windows, computes
//! visibility for the survivors, scores them and attaches cross-reference
//! links. Entries that cannot be evaluated are reported in
//! [`PriorityList::rejected`] and never abort the run.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use log::{info, warn};

use crate::config::{EngineConfig, RecencySettings};
use crate::core::domain::{
    CatalogEntry, CatalogStore, EnrichedEntry, NightConditions, PriorityList, RejectedTarget,
    SurveyVariant, TargetVisibility,
};
use crate::core::error::EngineResult;
use crate::ephemeris::Ephemeris;
use crate::services::cross_reference::cross_reference_url;
use crate::services::scoring::Scorer;
use crate::services::visibility::VisibilityCalculator;

pub struct PriorityListBuilder<'a, E: Ephemeris + ?Sized> {
    config: &'a EngineConfig,
    ephemeris: &'a E,
}

impl<'a, E: Ephemeris + ?Sized> PriorityListBuilder<'a, E> {
    pub fn new(config: &'a EngineConfig, ephemeris: &'a E) -> Self {
        Self { config, ephemeris }
    }

    /// Rank `catalog` for the night starting on `night_date`.
    ///
    /// Fails only if the night itself cannot be resolved (for example the
    /// Sun never sets at the configured site).
    pub fn build(
        &self,
        catalog: &CatalogStore,
        night_date: NaiveDate,
        variant: SurveyVariant,
    ) -> EngineResult<PriorityList> {
        let calculator = VisibilityCalculator::from_config(self.ephemeris, self.config);
        let night = calculator.night_conditions(night_date)?;
        Ok(self.rank(catalog, night, variant, &calculator))
    }

    /// Build the Fast and Slow lists for one night, sharing night conditions.
    pub fn build_both(
        &self,
        catalog: &CatalogStore,
        night_date: NaiveDate,
    ) -> EngineResult<(PriorityList, PriorityList)> {
        let calculator = VisibilityCalculator::from_config(self.ephemeris, self.config);
        let night = calculator.night_conditions(night_date)?;
        let fast = self.rank(catalog, night.clone(), SurveyVariant::Fast, &calculator);
        let slow = self.rank(catalog, night, SurveyVariant::Slow, &calculator);
        Ok((fast, slow))
    }

    fn rank(
        &self,
        catalog: &CatalogStore,
        night: NightConditions,
        variant: SurveyVariant,
        calculator: &VisibilityCalculator<'_, E>,
    ) -> PriorityList {
        let reference = variant.reference_time(catalog.release_timestamp, night.night_date);
        let mut rejected = Vec::new();

        let recent = recency_slice(catalog, reference, self.config.recency(variant), &mut rejected);
        let recent_count = recent.len();
        let visibility = calculator.compute_entries(&night, &recent);

        let mut enriched = Vec::with_capacity(recent_count);
        for (entry, result) in recent.into_iter().zip(visibility) {
            let id = entry.id.clone();
            match result.and_then(|vis| enrich(entry, vis)) {
                Ok(e) => enriched.push(e),
                Err(err) => {
                    warn!("Skipping target: {}", err);
                    rejected.push(RejectedTarget::from_error(&id, &err));
                }
            }
        }
        let evaluated = enriched.len();

        let scorer = Scorer::from_config(self.config);
        let mut entries = scorer.score(enriched, self.config.weights(variant), night.moon_illumination);
        for scored in &mut entries {
            scored.cross_reference_url =
                cross_reference_url(&scored.entry.internal_names, &self.config.cross_reference);
        }

        info!(
            "{} list for {}: {} recent, {} evaluated, {} ranked, {} rejected",
            variant,
            night.night_date,
            recent_count,
            evaluated,
            entries.len(),
            rejected.len()
        );

        PriorityList {
            variant,
            generated_at: night.night_date.and_time(NaiveTime::MIN),
            catalog_release: catalog.release_timestamp,
            night,
            entries,
            rejected,
        }
    }
}

/// Entries modified and discovered strictly within the windows before
/// `reference`, in catalog order.
///
/// Rows whose timestamps cannot be parsed are skipped and reported in
/// `rejected`.
pub fn recency_slice(
    catalog: &CatalogStore,
    reference: NaiveDateTime,
    recency: RecencySettings,
    rejected: &mut Vec<RejectedTarget>,
) -> Vec<CatalogEntry> {
    let modified_cutoff = reference - Duration::days(recency.modified_days);
    let discovered_cutoff = reference - Duration::days(recency.discovered_days);

    let mut recent = Vec::new();
    for entry in &catalog.rows {
        let modified = match entry.modified_at() {
            Ok(t) => t,
            Err(err) => {
                warn!("Skipping row in recency slice: {}", err);
                rejected.push(RejectedTarget::from_error(&entry.id, &err));
                continue;
            }
        };
        if modified <= modified_cutoff {
            continue;
        }

        let discovered = match entry.discovered_at() {
            Ok(t) => t,
            Err(err) => {
                warn!("Skipping row in recency slice: {}", err);
                rejected.push(RejectedTarget::from_error(&entry.id, &err));
                continue;
            }
        };
        if discovered > discovered_cutoff {
            recent.push(entry.clone());
        }
    }
    recent
}

fn enrich(entry: CatalogEntry, visibility: TargetVisibility) -> EngineResult<EnrichedEntry> {
    let discovered_at = entry.discovered_at()?;
    let discovery_magnitude = entry.magnitude()?;
    Ok(EnrichedEntry {
        entry,
        discovered_at,
        discovery_magnitude,
        visibility,
    })
}
