use std::fs::File;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use log::warn;

use crate::core::error::{EngineError, EngineResult};
use crate::io::writers::{PriorityListRow, PRIORITY_LIST_HEADERS};

/// A priority list read back from disk.
#[derive(Debug)]
pub struct LoadedPriorityList {
    /// The leading context line.
    pub context: String,
    /// Rows in file order, best target first.
    pub rows: Vec<PriorityListRow>,
    /// One [`EngineError::MalformedRow`] per row that could not be read.
    pub rejected: Vec<EngineError>,
}

impl LoadedPriorityList {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Load a priority list written by [`crate::io::writers::write_priority_list`].
///
/// A missing context or header line fails the file; unreadable rows are
/// logged and collected in [`LoadedPriorityList::rejected`].
pub fn read_priority_list<P: AsRef<Path>>(path: P) -> EngineResult<LoadedPriorityList> {
    let file = File::open(path.as_ref())?;
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(file);
    let mut records = reader.records();

    let context = records
        .next()
        .ok_or_else(|| EngineError::malformed(1, "missing context line"))??
        .iter()
        .collect::<Vec<_>>()
        .join(",");

    let headers: StringRecord = records
        .next()
        .ok_or_else(|| EngineError::malformed(2, "missing header line"))??;
    if let Some(missing) = PRIORITY_LIST_HEADERS
        .iter()
        .find(|required| !headers.iter().any(|h| h == **required))
    {
        return Err(EngineError::malformed(2, format!("missing column {}", missing)));
    }

    let mut rows = Vec::new();
    let mut rejected = Vec::new();
    for result in records {
        let row = result.and_then(|record| record.deserialize::<PriorityListRow>(Some(&headers)));
        match row {
            Ok(row) => rows.push(row),
            Err(err) => {
                let err = EngineError::from_record(err);
                if !err.is_row_level() {
                    return Err(err);
                }
                warn!("Skipping priority list row: {}", err);
                rejected.push(err);
            }
        }
    }

    Ok(LoadedPriorityList {
        context,
        rows,
        rejected,
    })
}
