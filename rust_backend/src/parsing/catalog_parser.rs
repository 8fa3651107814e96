//! Catalog and delta file format.
//!
//! ```text
//! "2023-05-04 00:00:00"
//! "objid","name_prefix","name","ra","declination",...
//! "123456","SN","2023abc","150.25","-12.5",...
//! ```
//!
//! Line 1 carries the release timestamp, line 2 the column headers and every
//! following line one catalog row. Delta files share the shape.

use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use log::{debug, warn};

use crate::core::domain::{CatalogEntry, CatalogStore};
use crate::core::error::{EngineError, EngineResult};
use crate::io::writers::write_atomic;
use crate::parsing::timestamps::{format_release_timestamp, parse_catalog_timestamp};

/// Header names of the columns the engine interprets.
pub mod columns {
    pub const ID: &str = "objid";
    pub const NAME_PREFIX: &str = "name_prefix";
    pub const NAME: &str = "name";
    pub const RA: &str = "ra";
    pub const DEC: &str = "declination";
    pub const DISCOVERY_TIME: &str = "discoverydate";
    pub const LAST_MODIFIED: &str = "lastmodified";
    pub const DISCOVERY_MAG: &str = "discoverymag";
    pub const INTERNAL_NAMES: &str = "internal_names";

    pub const REQUIRED: [&str; 9] = [
        ID,
        NAME_PREFIX,
        NAME,
        RA,
        DEC,
        DISCOVERY_TIME,
        LAST_MODIFIED,
        DISCOVERY_MAG,
        INTERNAL_NAMES,
    ];
}

/// A parsed catalog or delta file together with the rows that were dropped.
#[derive(Debug)]
pub struct CatalogLoad {
    pub store: CatalogStore,
    /// One [`EngineError::MalformedRow`] per rejected line.
    pub rejected: Vec<EngineError>,
}

/// Read the mirrored catalog snapshot.
///
/// An unreadable file is fatal. Malformed rows are logged and collected in
/// [`CatalogLoad::rejected`].
pub fn read_catalog<P: AsRef<Path>>(path: P) -> EngineResult<CatalogLoad> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let load = parse_catalog(file)?;
    debug!(
        "Read {} catalog rows from {} ({} rejected)",
        load.store.len(),
        path.display(),
        load.rejected.len()
    );
    Ok(load)
}

/// Read a daily delta file.
pub fn read_delta<P: AsRef<Path>>(path: P) -> EngineResult<CatalogLoad> {
    read_catalog(path)
}

/// Parse catalog text from any reader.
pub fn parse_catalog<R: Read>(reader: R) -> EngineResult<CatalogLoad> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);
    let mut records = csv_reader.records();

    let release_record = records
        .next()
        .ok_or_else(|| EngineError::malformed(1, "missing release timestamp line"))??;
    let raw_release = release_record.get(0).unwrap_or("");
    let release_timestamp = parse_catalog_timestamp(raw_release).ok_or_else(|| {
        EngineError::malformed(1, format!("unparsable release timestamp {:?}", raw_release))
    })?;

    let header_record = records
        .next()
        .ok_or_else(|| EngineError::malformed(2, "missing header line"))??;
    let headers: Vec<String> = header_record.iter().map(|h| h.trim().to_string()).collect();
    let missing: Vec<&str> = columns::REQUIRED
        .iter()
        .copied()
        .filter(|required| !headers.iter().any(|h| h == required))
        .collect();
    if !missing.is_empty() {
        return Err(EngineError::malformed(
            2,
            format!("missing required columns: {}", missing.join(", ")),
        ));
    }

    let mut rows = Vec::new();
    let mut rejected = Vec::new();
    let mut seen = HashSet::new();

    for result in records {
        let record = match result {
            Ok(record) => record,
            Err(err) => {
                let err = EngineError::from_record(err);
                if !err.is_row_level() {
                    return Err(err);
                }
                warn!("Skipping catalog row: {}", err);
                rejected.push(err);
                continue;
            }
        };
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        match entry_from_record(&record, &headers, line) {
            Ok(entry) => {
                if seen.insert(entry.id.clone()) {
                    rows.push(entry);
                } else {
                    let err = EngineError::malformed(line, format!("duplicate objid {}", entry.id));
                    warn!("Skipping catalog row: {}", err);
                    rejected.push(err);
                }
            }
            Err(err) => {
                warn!("Skipping catalog row: {}", err);
                rejected.push(err);
            }
        }
    }

    Ok(CatalogLoad {
        store: CatalogStore::new(release_timestamp, headers, rows),
        rejected,
    })
}

fn entry_from_record(record: &StringRecord, headers: &[String], line: u64) -> EngineResult<CatalogEntry> {
    if record.len() != headers.len() {
        return Err(EngineError::malformed(
            line,
            format!("expected {} fields, found {}", headers.len(), record.len()),
        ));
    }

    let mut entry = CatalogEntry::default();
    for (header, value) in headers.iter().zip(record.iter()) {
        entry.set_field(header, value.to_string());
    }

    entry.id = entry.id.trim().to_string();
    if entry.id.is_empty() {
        return Err(EngineError::malformed(line, "row has no objid"));
    }
    Ok(entry)
}

/// Serialize a snapshot to the catalog file format.
pub fn serialize_catalog(store: &CatalogStore) -> EngineResult<Vec<u8>> {
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_writer(Vec::new());

    writer.write_record([format_release_timestamp(&store.release_timestamp)])?;
    writer.write_record(&store.headers)?;
    for row in &store.rows {
        writer.write_record(store.headers.iter().map(|h| row.field(h)))?;
    }

    writer
        .into_inner()
        .map_err(|e| EngineError::Io(e.into_error()))
}

/// Persist a snapshot atomically.
pub fn write_catalog<P: AsRef<Path>>(path: P, store: &CatalogStore) -> EngineResult<()> {
    let bytes = serialize_catalog(store)?;
    write_atomic(path.as_ref(), &bytes)
}
