//! Threshold filtering and rank-based priority scores.
//!
//! Every surviving entry is ranked independently on four variables
//! (observable time, lunar separation, discovery magnitude, discovery time).
//! Ranks are turned into sub-scores so that a lower sub-score is always
//! better, combined with the variant's weights and normalized to `[0, 5]`.
//! The best entry of a run scores exactly `0`.

use log::debug;

use crate::config::{EngineConfig, LunarSeparationSettings, ScoreWeights};
use crate::core::domain::{EnrichedEntry, ScoredEntry};

/// Upper end of the normalized score range.
pub const MAX_PRIORITY_SCORE: f64 = 5.0;

/// Domain thresholds an entry must pass before it is ranked.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringThresholds {
    /// Strict lower bound on observable hours.
    pub min_observable_hours: f64,
    pub lunar_separation: LunarSeparationSettings,
    /// Open interval of accepted discovery magnitudes.
    pub magnitude_bounds: (f64, f64),
    /// Strict lower bound on `|b|`.
    pub galactic_latitude_floor_deg: f64,
}

impl Default for ScoringThresholds {
    fn default() -> Self {
        Self::from(&EngineConfig::default())
    }
}

impl From<&EngineConfig> for ScoringThresholds {
    fn from(config: &EngineConfig) -> Self {
        Self {
            min_observable_hours: config.min_observable_hours,
            lunar_separation: config.lunar_separation.clone(),
            magnitude_bounds: config.magnitude_bounds,
            galactic_latitude_floor_deg: config.galactic_latitude_floor_deg,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Scorer {
    thresholds: ScoringThresholds,
}

impl Scorer {
    pub fn new(thresholds: ScoringThresholds) -> Self {
        Self { thresholds }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(ScoringThresholds::from(config))
    }

    /// Whether an entry passes every threshold for the given Moon phase.
    pub fn passes_thresholds(&self, entry: &EnrichedEntry, moon_illumination: f64) -> bool {
        let t = &self.thresholds;
        let vis = &entry.visibility;
        let (bright, faint) = t.magnitude_bounds;
        let magnitude = entry.discovery_magnitude;

        vis.observable_time.value() > t.min_observable_hours
            && vis.lunar_separation.value() >= t.lunar_separation.threshold_for(moon_illumination)
            && magnitude > bright
            && magnitude < faint
            && vis.galactic_latitude.value().abs() > t.galactic_latitude_floor_deg
    }

    /// Drop entries failing any threshold, keeping input order.
    pub fn filter(&self, entries: Vec<EnrichedEntry>, moon_illumination: f64) -> Vec<EnrichedEntry> {
        entries
            .into_iter()
            .filter(|entry| self.passes_thresholds(entry, moon_illumination))
            .collect()
    }

    /// Filter, rank and sort entries, best first.
    ///
    /// An empty result is a valid outcome. When every surviving entry has the
    /// same raw score all of them score `0`.
    pub fn score(
        &self,
        entries: Vec<EnrichedEntry>,
        weights: ScoreWeights,
        moon_illumination: f64,
    ) -> Vec<ScoredEntry> {
        let total = entries.len();
        let survivors = self.filter(entries, moon_illumination);
        debug!(
            "{} of {} entries pass thresholds (Moon {:.2} illuminated)",
            survivors.len(),
            total,
            moon_illumination
        );
        if survivors.is_empty() {
            return Vec::new();
        }

        let raw = raw_scores(&survivors, weights);
        let normalized = normalize_scores(&raw);

        let mut scored: Vec<ScoredEntry> = survivors
            .into_iter()
            .zip(normalized)
            .map(|(entry, score)| ScoredEntry::from_enriched(entry, score))
            .collect();
        scored.sort_by(|a, b| a.priority_score.total_cmp(&b.priority_score));
        scored
    }
}

/// Competition ranks: each value's rank is the number of values strictly
/// below it, so ties share the lowest rank.
pub fn competition_ranks(values: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ranks = vec![0; values.len()];
    for (position, &index) in order.iter().enumerate() {
        ranks[index] = match position {
            0 => 0,
            _ => {
                let previous = order[position - 1];
                if values[previous] == values[index] {
                    ranks[previous]
                } else {
                    position
                }
            }
        };
    }
    ranks
}

/// Weighted sum of sub-scores per entry. Lower is better.
///
/// Observable time, lunar separation and discovery time score `N - rank`
/// (larger values are better); discovery magnitude scores `rank` (brighter is
/// better).
pub fn raw_scores(entries: &[EnrichedEntry], weights: ScoreWeights) -> Vec<f64> {
    let n = entries.len();
    let observable: Vec<f64> = entries
        .iter()
        .map(|e| e.visibility.observable_time.value())
        .collect();
    let lunar: Vec<f64> = entries
        .iter()
        .map(|e| e.visibility.lunar_separation.value())
        .collect();
    let magnitude: Vec<f64> = entries.iter().map(|e| e.discovery_magnitude).collect();
    let discovered: Vec<f64> = entries
        .iter()
        .map(|e| e.discovered_at.and_utc().timestamp_millis() as f64)
        .collect();

    let observable_ranks = competition_ranks(&observable);
    let lunar_ranks = competition_ranks(&lunar);
    let magnitude_ranks = competition_ranks(&magnitude);
    let discovered_ranks = competition_ranks(&discovered);

    (0..n)
        .map(|i| {
            let inverted = |rank: usize| (n - rank) as f64;
            inverted(observable_ranks[i]) * weights.observable_time
                + inverted(lunar_ranks[i]) * weights.lunar_separation
                + magnitude_ranks[i] as f64 * weights.discovery_magnitude
                + inverted(discovered_ranks[i]) * weights.discovery_time
        })
        .collect()
}

/// Min-max scale raw scores onto `[0, 5]`; all zeros when they are all equal.
pub fn normalize_scores(raw: &[f64]) -> Vec<f64> {
    let min = raw.iter().copied().fold(f64::INFINITY, f64::min);
    let max = raw.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let span = max - min;

    if !span.is_finite() || span <= 0.0 {
        return vec![0.0; raw.len()];
    }
    raw.iter()
        .map(|r| (r - min) / span * MAX_PRIORITY_SCORE)
        .collect()
}
