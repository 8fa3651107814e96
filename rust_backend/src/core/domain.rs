//! Domain models for the mirrored catalog and ranked target lists.
//!
//! Catalog rows keep the upstream text of every column so that a merged
//! snapshot can be written back byte-for-byte equivalent to what was read.
//! Typed values (coordinates, timestamps, magnitudes) are parsed on demand and
//! failures surface as row-level [`EngineError`]s.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use qtty::{Degrees, Hours, Meters};
use serde::{Deserialize, Serialize};

use crate::core::error::{EngineError, EngineResult};
use crate::ephemeris::NightBoundaries;
use crate::parsing::catalog_parser::columns;
use crate::parsing::timestamps::parse_catalog_timestamp;

/// One row of the mirrored catalog.
///
/// `id` is the primary key. The named fields are the columns the engine
/// interprets; everything else upstream publishes lives in `extra`, keyed by
/// header name.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CatalogEntry {
    pub id: String,
    pub name_prefix: String,
    pub name: String,
    pub ra: String,
    pub dec: String,
    pub discovery_time: String,
    pub last_modified_time: String,
    pub discovery_magnitude: String,
    pub internal_names: String,
    pub extra: BTreeMap<String, String>,
}

impl CatalogEntry {
    /// Public display name, e.g. `SN` + `2023abc`.
    pub fn display_name(&self) -> String {
        format!("{}{}", self.name_prefix, self.name)
    }

    /// Text of the column with the given header name (empty if unknown).
    pub fn field(&self, header: &str) -> &str {
        match header {
            columns::ID => &self.id,
            columns::NAME_PREFIX => &self.name_prefix,
            columns::NAME => &self.name,
            columns::RA => &self.ra,
            columns::DEC => &self.dec,
            columns::DISCOVERY_TIME => &self.discovery_time,
            columns::LAST_MODIFIED => &self.last_modified_time,
            columns::DISCOVERY_MAG => &self.discovery_magnitude,
            columns::INTERNAL_NAMES => &self.internal_names,
            other => self.extra.get(other).map(String::as_str).unwrap_or(""),
        }
    }

    /// Set the column with the given header name.
    pub fn set_field(&mut self, header: &str, value: String) {
        match header {
            columns::ID => self.id = value,
            columns::NAME_PREFIX => self.name_prefix = value,
            columns::NAME => self.name = value,
            columns::RA => self.ra = value,
            columns::DEC => self.dec = value,
            columns::DISCOVERY_TIME => self.discovery_time = value,
            columns::LAST_MODIFIED => self.last_modified_time = value,
            columns::DISCOVERY_MAG => self.discovery_magnitude = value,
            columns::INTERNAL_NAMES => self.internal_names = value,
            other => {
                self.extra.insert(other.to_string(), value);
            }
        }
    }

    pub fn discovered_at(&self) -> EngineResult<NaiveDateTime> {
        parse_catalog_timestamp(&self.discovery_time).ok_or_else(|| EngineError::TimestampParse {
            id: self.id.clone(),
            value: self.discovery_time.clone(),
        })
    }

    pub fn modified_at(&self) -> EngineResult<NaiveDateTime> {
        parse_catalog_timestamp(&self.last_modified_time).ok_or_else(|| {
            EngineError::TimestampParse {
                id: self.id.clone(),
                value: self.last_modified_time.clone(),
            }
        })
    }

    /// Discovery magnitude as a float.
    pub fn magnitude(&self) -> EngineResult<f64> {
        self.discovery_magnitude
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|m| m.is_finite())
            .ok_or_else(|| {
                EngineError::visibility(
                    self.id.clone(),
                    format!("unparsable discovery magnitude {:?}", self.discovery_magnitude),
                )
            })
    }

    /// Right ascension and declination in decimal degrees.
    pub fn coordinates(&self) -> EngineResult<(Degrees, Degrees)> {
        let parse = |label: &str, raw: &str| {
            raw.trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| {
                    EngineError::visibility(self.id.clone(), format!("unparsable {} {:?}", label, raw))
                })
        };
        let ra = parse("ra", &self.ra)?;
        let dec = parse("declination", &self.dec)?;

        if !(0.0..360.0).contains(&ra) {
            return Err(EngineError::visibility(
                self.id.clone(),
                format!("ra {} outside [0, 360)", ra),
            ));
        }
        if !(-90.0..=90.0).contains(&dec) {
            return Err(EngineError::visibility(
                self.id.clone(),
                format!("declination {} outside [-90, 90]", dec),
            ));
        }

        Ok((Degrees::new(ra), Degrees::new(dec)))
    }
}

/// A snapshot of the mirrored catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogStore {
    /// When upstream asserts the snapshot was authoritative.
    pub release_timestamp: NaiveDateTime,
    pub headers: Vec<String>,
    /// Newest inserted or updated entries nearest the top.
    pub rows: Vec<CatalogEntry>,
}

impl CatalogStore {
    pub fn new(release_timestamp: NaiveDateTime, headers: Vec<String>, rows: Vec<CatalogEntry>) -> Self {
        Self {
            release_timestamp,
            headers,
            rows,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&CatalogEntry> {
        self.rows.iter().find(|row| row.id == id)
    }

    /// Hex SHA-256 of the snapshot as it is written to disk.
    pub fn checksum(&self) -> EngineResult<String> {
        use sha2::{Digest, Sha256};

        let bytes = crate::parsing::catalog_parser::serialize_catalog(self)?;
        Ok(hex::encode(Sha256::digest(&bytes)))
    }
}

/// Geographic location of the telescope.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Site {
    pub latitude: Degrees,
    /// East-positive longitude.
    pub longitude: Degrees,
    pub elevation: Meters,
}

impl Site {
    pub fn new(latitude_deg: f64, longitude_deg: f64, elevation_m: f64) -> Self {
        Self {
            latitude: Degrees::new(latitude_deg),
            longitude: Degrees::new(longitude_deg),
            elevation: Meters::new(elevation_m),
        }
    }

    /// Liverpool Telescope, Roque de los Muchachos.
    pub fn liverpool_telescope() -> Self {
        Self::new(28.6468866, -17.7742491, 2326.0)
    }
}

/// Survey policy a priority list is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SurveyVariant {
    /// Recent and bright objects, sliced from the catalog release.
    Fast,
    /// Long visibility windows, sliced from the start of the night date.
    Slow,
}

impl SurveyVariant {
    /// Single-letter code used in output file names.
    pub fn code(&self) -> char {
        match self {
            SurveyVariant::Fast => 'F',
            SurveyVariant::Slow => 'S',
        }
    }

    /// Instant the recency windows are measured back from.
    pub fn reference_time(&self, release: NaiveDateTime, night_date: NaiveDate) -> NaiveDateTime {
        match self {
            SurveyVariant::Fast => release,
            SurveyVariant::Slow => night_date.and_time(NaiveTime::MIN),
        }
    }
}

impl fmt::Display for SurveyVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SurveyVariant::Fast => write!(f, "Fast"),
            SurveyVariant::Slow => write!(f, "Slow"),
        }
    }
}

/// Record of the night's solar events handed to scheduling collaborators.
///
/// All times are UTC and truncated to whole seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolarTimes {
    pub night_start_date: NaiveDate,
    pub sunset: NaiveTime,
    pub dark_start: NaiveTime,
    pub dark_end: NaiveTime,
    pub sunrise: NaiveTime,
    pub night_end_date: NaiveDate,
}

/// Night-level results of the visibility stage.
#[derive(Debug, Clone, PartialEq)]
pub struct NightConditions {
    pub night_date: NaiveDate,
    pub boundaries: NightBoundaries,
    /// Fraction of the lunar disc illuminated at local midnight, in `[0, 1]`.
    pub moon_illumination: f64,
}

impl NightConditions {
    pub fn dark_duration(&self) -> Duration {
        self.boundaries.dark_end - self.boundaries.dark_start
    }

    /// Dark start, middle and end: the epochs lunar separation is sampled at.
    pub fn dark_epochs(&self) -> [chrono::DateTime<chrono::Utc>; 3] {
        let start = self.boundaries.dark_start;
        let middle = start + self.dark_duration() / 2;
        [start, middle, self.boundaries.dark_end]
    }

    pub fn solar_times(&self) -> SolarTimes {
        let b = &self.boundaries;
        SolarTimes {
            night_start_date: self.night_date,
            sunset: whole_seconds(b.sunset.time()),
            dark_start: whole_seconds(b.dark_start.time()),
            dark_end: whole_seconds(b.dark_end.time()),
            sunrise: whole_seconds(b.sunrise.time()),
            night_end_date: b.sunrise.date_naive(),
        }
    }
}

fn whole_seconds(time: NaiveTime) -> NaiveTime {
    use chrono::Timelike;
    time.with_nanosecond(0).unwrap_or(time)
}

/// Per-target results of the visibility stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetVisibility {
    pub transit_altitude: Degrees,
    /// Hours above the altitude floor during dark time.
    pub observable_time: Hours,
    /// Mean separation from the Moon over dark time, `0` when not observable.
    pub lunar_separation: Degrees,
    pub galactic_latitude: Degrees,
}

impl TargetVisibility {
    /// Result for a target that never clears the altitude floor in dark time.
    pub fn unobservable(transit_altitude: Degrees, galactic_latitude: Degrees) -> Self {
        Self {
            transit_altitude,
            observable_time: Hours::new(0.0),
            lunar_separation: Degrees::new(0.0),
            galactic_latitude,
        }
    }
}

/// A catalog entry that survived the recency slice, with its parsed values
/// and visibility attached.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedEntry {
    pub entry: CatalogEntry,
    pub discovered_at: NaiveDateTime,
    pub discovery_magnitude: f64,
    pub visibility: TargetVisibility,
}

/// A ranked target. Lower `priority_score` is higher priority.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredEntry {
    #[serde(skip)]
    pub entry: CatalogEntry,
    pub discovered_at: NaiveDateTime,
    pub discovery_magnitude: f64,
    pub observable_time: Hours,
    pub lunar_separation: Degrees,
    pub galactic_latitude: Degrees,
    /// In `[0, 5]`, `0` is the best target of the run.
    pub priority_score: f64,
    pub cross_reference_url: String,
}

impl ScoredEntry {
    pub fn from_enriched(enriched: EnrichedEntry, priority_score: f64) -> Self {
        Self {
            discovered_at: enriched.discovered_at,
            discovery_magnitude: enriched.discovery_magnitude,
            observable_time: enriched.visibility.observable_time,
            lunar_separation: enriched.visibility.lunar_separation,
            galactic_latitude: enriched.visibility.galactic_latitude,
            entry: enriched.entry,
            priority_score,
            cross_reference_url: String::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.entry.id
    }
}

/// An entry dropped from a ranking run, with the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedTarget {
    pub id: String,
    pub reason: String,
}

impl RejectedTarget {
    pub fn from_error(id: &str, err: &EngineError) -> Self {
        Self {
            id: id.to_string(),
            reason: err.to_string(),
        }
    }
}

/// Output of a ranking run, best target first.
///
/// An empty `entries` list is a valid result ("no targets tonight").
#[derive(Debug, Clone)]
pub struct PriorityList {
    pub variant: SurveyVariant,
    pub generated_at: NaiveDateTime,
    pub catalog_release: NaiveDateTime,
    pub night: NightConditions,
    pub entries: Vec<ScoredEntry>,
    pub rejected: Vec<RejectedTarget>,
}

impl PriorityList {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Leading context line of the persisted list.
    pub fn context_line(&self) -> String {
        format!(
            "List calculated for {} using TNS database from {}",
            self.generated_at.format(crate::parsing::timestamps::RELEASE_TIMESTAMP_FORMAT),
            self.catalog_release.format(crate::parsing::timestamps::RELEASE_TIMESTAMP_FORMAT)
        )
    }
}
