//! Engine configuration file support.
//!
//! Every option has a default matching the operational setup at the Liverpool
//! Telescope, so an empty TOML document is a valid configuration:
//!
//! ```toml
//! altitude_floor_deg = 35.0
//! magnitude_bounds = [16.0, 18.5]
//! weights_fast = [2.0, 3.0, 8.0, 10.0]
//!
//! [site]
//! latitude_deg = 28.6468866
//! longitude_deg = -17.7742491
//! elevation_m = 2326.0
//!
//! [recency_slow]
//! modified_days = 14
//! discovered_days = 84
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::domain::{Site, SurveyVariant};
use crate::core::error::{EngineError, EngineResult};

/// Complete engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub site: SiteSettings,
    #[serde(default = "default_altitude_floor")]
    pub altitude_floor_deg: f64,
    #[serde(default = "default_min_observable_hours")]
    pub min_observable_hours: f64,
    #[serde(default = "default_magnitude_bounds")]
    pub magnitude_bounds: (f64, f64),
    #[serde(default = "default_galactic_floor")]
    pub galactic_latitude_floor_deg: f64,
    #[serde(default)]
    pub lunar_separation: LunarSeparationSettings,
    #[serde(default = "default_weights_fast")]
    pub weights_fast: ScoreWeights,
    #[serde(default = "default_weights_slow")]
    pub weights_slow: ScoreWeights,
    #[serde(default = "default_recency_fast")]
    pub recency_fast: RecencySettings,
    #[serde(default = "default_recency_slow")]
    pub recency_slow: RecencySettings,
    #[serde(default)]
    pub cross_reference: CrossReferenceSettings,
    #[serde(default)]
    pub followup: FollowupSettings,
}

/// Telescope location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteSettings {
    #[serde(default = "default_latitude")]
    pub latitude_deg: f64,
    #[serde(default = "default_longitude")]
    pub longitude_deg: f64,
    #[serde(default = "default_elevation")]
    pub elevation_m: f64,
}

/// Minimum lunar separation as a step function of Moon illumination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LunarSeparationSettings {
    #[serde(default = "default_dark_below")]
    pub dark_below: f64,
    #[serde(default = "default_grey_below")]
    pub grey_below: f64,
    #[serde(default = "default_dark_min_deg")]
    pub dark_min_deg: f64,
    #[serde(default = "default_grey_min_deg")]
    pub grey_min_deg: f64,
    #[serde(default = "default_bright_min_deg")]
    pub bright_min_deg: f64,
}

/// Weights applied to the observable time, lunar separation, discovery
/// magnitude and discovery time sub-scores.
///
/// Written in TOML as a four element array.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct ScoreWeights {
    pub observable_time: f64,
    pub lunar_separation: f64,
    pub discovery_magnitude: f64,
    pub discovery_time: f64,
}

/// Recency windows, in days before the variant's reference time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecencySettings {
    pub modified_days: i64,
    pub discovered_days: i64,
}

/// Alias lookup used to attach a cross-reference URL to each ranked entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossReferenceSettings {
    #[serde(default = "default_alias_prefix")]
    pub alias_prefix: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FollowupSettings {
    #[serde(default = "default_max_priority_score")]
    pub max_priority_score: f64,
}

fn default_latitude() -> f64 {
    28.6468866
}

fn default_longitude() -> f64 {
    -17.7742491
}

fn default_elevation() -> f64 {
    2326.0
}

fn default_altitude_floor() -> f64 {
    35.0
}

fn default_min_observable_hours() -> f64 {
    0.25
}

fn default_magnitude_bounds() -> (f64, f64) {
    (16.0, 18.5)
}

fn default_galactic_floor() -> f64 {
    10.0
}

fn default_dark_below() -> f64 {
    0.25
}

fn default_grey_below() -> f64 {
    0.65
}

fn default_dark_min_deg() -> f64 {
    10.0
}

fn default_grey_min_deg() -> f64 {
    20.0
}

fn default_bright_min_deg() -> f64 {
    40.0
}

fn default_weights_fast() -> ScoreWeights {
    ScoreWeights::from([2.0, 3.0, 8.0, 10.0])
}

fn default_weights_slow() -> ScoreWeights {
    ScoreWeights::from([10.0, 7.0, 8.0, 3.0])
}

fn default_recency_fast() -> RecencySettings {
    RecencySettings {
        modified_days: 2,
        discovered_days: 56,
    }
}

fn default_recency_slow() -> RecencySettings {
    RecencySettings {
        modified_days: 14,
        discovered_days: 84,
    }
}

fn default_alias_prefix() -> String {
    "ZTF".to_string()
}

fn default_base_url() -> String {
    "https://fink-portal.org/".to_string()
}

fn default_max_priority_score() -> f64 {
    0.5
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            latitude_deg: default_latitude(),
            longitude_deg: default_longitude(),
            elevation_m: default_elevation(),
        }
    }
}

impl Default for LunarSeparationSettings {
    fn default() -> Self {
        Self {
            dark_below: default_dark_below(),
            grey_below: default_grey_below(),
            dark_min_deg: default_dark_min_deg(),
            grey_min_deg: default_grey_min_deg(),
            bright_min_deg: default_bright_min_deg(),
        }
    }
}

impl LunarSeparationSettings {
    /// Minimum separation in degrees for the given illuminated fraction.
    pub fn threshold_for(&self, illumination: f64) -> f64 {
        if illumination < self.dark_below {
            self.dark_min_deg
        } else if illumination < self.grey_below {
            self.grey_min_deg
        } else {
            self.bright_min_deg
        }
    }
}

impl From<[f64; 4]> for ScoreWeights {
    fn from(w: [f64; 4]) -> Self {
        Self {
            observable_time: w[0],
            lunar_separation: w[1],
            discovery_magnitude: w[2],
            discovery_time: w[3],
        }
    }
}

impl From<ScoreWeights> for [f64; 4] {
    fn from(w: ScoreWeights) -> Self {
        [
            w.observable_time,
            w.lunar_separation,
            w.discovery_magnitude,
            w.discovery_time,
        ]
    }
}

impl Default for CrossReferenceSettings {
    fn default() -> Self {
        Self {
            alias_prefix: default_alias_prefix(),
            base_url: default_base_url(),
        }
    }
}

impl Default for FollowupSettings {
    fn default() -> Self {
        Self {
            max_priority_score: default_max_priority_score(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            site: SiteSettings::default(),
            altitude_floor_deg: default_altitude_floor(),
            min_observable_hours: default_min_observable_hours(),
            magnitude_bounds: default_magnitude_bounds(),
            galactic_latitude_floor_deg: default_galactic_floor(),
            lunar_separation: LunarSeparationSettings::default(),
            weights_fast: default_weights_fast(),
            weights_slow: default_weights_slow(),
            recency_fast: default_recency_fast(),
            recency_slow: default_recency_slow(),
            cross_reference: CrossReferenceSettings::default(),
            followup: FollowupSettings::default(),
        }
    }
}

impl EngineConfig {
    /// Load and validate configuration from a TOML file.
    ///
    /// # Returns
    /// * `Ok(EngineConfig)` if the file parses and passes [`EngineConfig::validate`]
    /// * `Err(EngineError::Configuration)` otherwise
    pub fn from_file<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            EngineError::Configuration(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml_str(content: &str) -> EngineResult<Self> {
        let config: EngineConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn site(&self) -> Site {
        Site::new(
            self.site.latitude_deg,
            self.site.longitude_deg,
            self.site.elevation_m,
        )
    }

    pub fn weights(&self, variant: SurveyVariant) -> ScoreWeights {
        match variant {
            SurveyVariant::Fast => self.weights_fast,
            SurveyVariant::Slow => self.weights_slow,
        }
    }

    pub fn recency(&self, variant: SurveyVariant) -> RecencySettings {
        match variant {
            SurveyVariant::Fast => self.recency_fast,
            SurveyVariant::Slow => self.recency_slow,
        }
    }

    /// Check every option against its valid range.
    pub fn validate(&self) -> EngineResult<()> {
        let site = &self.site;
        if !(-90.0..=90.0).contains(&site.latitude_deg) {
            return Err(invalid(format!(
                "site.latitude_deg must be in [-90, 90], got {}",
                site.latitude_deg
            )));
        }
        if !(-180.0..360.0).contains(&site.longitude_deg) {
            return Err(invalid(format!(
                "site.longitude_deg must be in [-180, 360), got {}",
                site.longitude_deg
            )));
        }
        if !site.elevation_m.is_finite() {
            return Err(invalid("site.elevation_m must be finite".to_string()));
        }

        if !(self.altitude_floor_deg > 0.0 && self.altitude_floor_deg < 90.0) {
            return Err(invalid(format!(
                "altitude_floor_deg must be in (0, 90), got {}",
                self.altitude_floor_deg
            )));
        }
        if !(self.min_observable_hours >= 0.0 && self.min_observable_hours < 24.0) {
            return Err(invalid(format!(
                "min_observable_hours must be in [0, 24), got {}",
                self.min_observable_hours
            )));
        }

        let (bright, faint) = self.magnitude_bounds;
        if !(bright.is_finite() && faint.is_finite() && bright < faint) {
            return Err(invalid(format!(
                "magnitude_bounds must be ordered (bright, faint), got ({}, {})",
                bright, faint
            )));
        }
        if !(0.0..90.0).contains(&self.galactic_latitude_floor_deg) {
            return Err(invalid(format!(
                "galactic_latitude_floor_deg must be in [0, 90), got {}",
                self.galactic_latitude_floor_deg
            )));
        }

        let lunar = &self.lunar_separation;
        if !(0.0 <= lunar.dark_below && lunar.dark_below <= lunar.grey_below && lunar.grey_below <= 1.0)
        {
            return Err(invalid(
                "lunar_separation illumination steps must satisfy 0 <= dark_below <= grey_below <= 1"
                    .to_string(),
            ));
        }
        if !(lunar.dark_min_deg >= 0.0
            && lunar.dark_min_deg <= lunar.grey_min_deg
            && lunar.grey_min_deg <= lunar.bright_min_deg
            && lunar.bright_min_deg <= 180.0)
        {
            return Err(invalid(
                "lunar_separation minima must be non-decreasing within [0, 180]".to_string(),
            ));
        }

        for (label, weights) in [("weights_fast", self.weights_fast), ("weights_slow", self.weights_slow)] {
            let values: [f64; 4] = weights.into();
            if values.iter().any(|w| !w.is_finite() || *w < 0.0) {
                return Err(invalid(format!(
                    "{} must be finite and non-negative, got {:?}",
                    label, values
                )));
            }
        }

        for (label, recency) in [("recency_fast", self.recency_fast), ("recency_slow", self.recency_slow)] {
            if recency.modified_days <= 0 || recency.discovered_days <= 0 {
                return Err(invalid(format!(
                    "{} windows must be positive, got {:?}",
                    label, recency
                )));
            }
        }

        if self.cross_reference.alias_prefix.trim().is_empty() {
            return Err(invalid("cross_reference.alias_prefix must not be empty".to_string()));
        }
        if !(0.0..=5.0).contains(&self.followup.max_priority_score) {
            return Err(invalid(format!(
                "followup.max_priority_score must be in [0, 5], got {}",
                self.followup.max_priority_score
            )));
        }

        Ok(())
    }
}

fn invalid(message: String) -> EngineError {
    EngineError::Configuration(message)
}
