//! Persisted outputs.
//!
//! Every file is written to a temporary sibling first and renamed into place,
//! so readers never observe a partially written file.

use std::fs;
use std::io::Write;
use std::path::Path;

use chrono::NaiveDate;
use csv::WriterBuilder;
use log::info;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::core::domain::{PriorityList, ScoredEntry, SolarTimes, SurveyVariant};
use crate::core::error::{EngineError, EngineResult};

/// One line of a persisted priority list.
///
/// Catalog columns keep their upstream text; derived columns are numeric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriorityListRow {
    pub objid: String,
    pub name_prefix: String,
    pub name: String,
    pub ra: String,
    pub declination: String,
    pub discoverydate: String,
    pub lastmodified: String,
    pub discoverymag: String,
    pub observable_time: f64,
    #[serde(rename = "lunar_sep")]
    pub lunar_separation: f64,
    pub galactic_latitude: f64,
    pub priority_score: f64,
    #[serde(rename = "fink_url")]
    pub cross_reference_url: String,
}

/// Column headers of a persisted priority list, in file order.
pub const PRIORITY_LIST_HEADERS: [&str; 13] = [
    "objid",
    "name_prefix",
    "name",
    "ra",
    "declination",
    "discoverydate",
    "lastmodified",
    "discoverymag",
    "observable_time",
    "lunar_sep",
    "galactic_latitude",
    "priority_score",
    "fink_url",
];

impl PriorityListRow {
    pub fn display_name(&self) -> String {
        format!("{}{}", self.name_prefix, self.name)
    }
}

impl From<&ScoredEntry> for PriorityListRow {
    fn from(scored: &ScoredEntry) -> Self {
        let entry = &scored.entry;
        Self {
            objid: entry.id.clone(),
            name_prefix: entry.name_prefix.clone(),
            name: entry.name.clone(),
            ra: entry.ra.clone(),
            declination: entry.dec.clone(),
            discoverydate: entry.discovery_time.clone(),
            lastmodified: entry.last_modified_time.clone(),
            discoverymag: entry.discovery_magnitude.clone(),
            observable_time: scored.observable_time.value(),
            lunar_separation: scored.lunar_separation.value(),
            galactic_latitude: scored.galactic_latitude.value(),
            priority_score: scored.priority_score,
            cross_reference_url: scored.cross_reference_url.clone(),
        }
    }
}

/// File name of the list for a variant and night, e.g. `TransientList_F_20230504.csv`.
pub fn priority_list_file_name(variant: SurveyVariant, night_date: NaiveDate) -> String {
    format!(
        "TransientList_{}_{}.csv",
        variant.code(),
        night_date.format("%Y%m%d")
    )
}

/// Write `bytes` to `path` through a temporary file in the same directory.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> EngineResult<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut temp = NamedTempFile::new_in(dir)?;
    temp.write_all(bytes)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| EngineError::Persist {
        path: path.display().to_string(),
        reason: e.error.to_string(),
    })?;
    Ok(())
}

/// Serialize a priority list to its CSV layout.
pub fn serialize_priority_list(list: &PriorityList) -> EngineResult<Vec<u8>> {
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_writer(Vec::new());

    writer.write_record([list.context_line()])?;
    writer.write_record(PRIORITY_LIST_HEADERS)?;
    for entry in &list.entries {
        writer.serialize(PriorityListRow::from(entry))?;
    }

    writer
        .into_inner()
        .map_err(|e| EngineError::Io(e.into_error()))
}

/// Persist a priority list atomically.
///
/// An empty list still produces a file with the context and header lines.
pub fn write_priority_list(path: &Path, list: &PriorityList) -> EngineResult<()> {
    let bytes = serialize_priority_list(list)?;
    write_atomic(path, &bytes)?;
    info!(
        "Wrote {} {} priority list entries to {}",
        list.len(),
        list.variant,
        path.display()
    );
    Ok(())
}

/// Persist the night's solar-times record as JSON.
pub fn write_solar_times(path: &Path, solar_times: &SolarTimes) -> EngineResult<()> {
    let json = serde_json::to_vec_pretty(solar_times)?;
    write_atomic(path, &json)
}
