//! Catalog merge with upsert semantics.
//!
//! A delta batch is applied from its last row to its first. Rows with an id
//! already in the snapshot replace it in place; unseen ids are inserted at
//! the top. Within one batch the earliest row for an id is applied last and
//! therefore wins, and new discoveries end up at the top in batch order.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use chrono::NaiveDateTime;
use log::{info, warn};

use crate::core::domain::{CatalogEntry, CatalogStore};
use crate::core::error::{EngineError, EngineResult};
use crate::merge::update_plan::UpdateStep;
use crate::parsing::catalog_parser::{read_catalog, read_delta, write_catalog};

/// Result of one merge with its bookkeeping.
#[derive(Debug)]
pub struct MergeOutcome {
    pub store: CatalogStore,
    /// New ids added at the top.
    pub inserted: usize,
    /// Existing ids whose row content was replaced.
    pub updated: usize,
    pub rejected: Vec<EngineError>,
}

/// Where an id currently lives while a batch is applied.
#[derive(Debug, Clone, Copy)]
enum Slot {
    Existing(usize),
    Inserted(usize),
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CatalogMerger;

impl CatalogMerger {
    pub fn new() -> Self {
        Self
    }

    /// Apply `delta` to `current`, stamping the result with `new_timestamp`.
    ///
    /// Rows without an id are dropped; see [`CatalogMerger::merge_with_summary`]
    /// to inspect them.
    pub fn merge(
        &self,
        current: CatalogStore,
        delta: &[CatalogEntry],
        new_timestamp: NaiveDateTime,
    ) -> CatalogStore {
        self.merge_with_summary(current, delta, new_timestamp).store
    }

    pub fn merge_with_summary(
        &self,
        current: CatalogStore,
        delta: &[CatalogEntry],
        new_timestamp: NaiveDateTime,
    ) -> MergeOutcome {
        let CatalogStore {
            headers, mut rows, ..
        } = current;

        let mut slots: HashMap<String, Slot> = rows
            .iter()
            .enumerate()
            .map(|(idx, row)| (row.id.clone(), Slot::Existing(idx)))
            .collect();
        let mut prepended: Vec<CatalogEntry> = Vec::new();
        let mut touched: HashSet<usize> = HashSet::new();
        let mut rejected = Vec::new();

        for (position, row) in delta.iter().enumerate().rev() {
            let id = row.id.trim();
            if id.is_empty() {
                let err = EngineError::malformed(
                    position as u64 + 1,
                    "delta row has no objid",
                );
                warn!("Rejecting delta row: {}", err);
                rejected.push(err);
                continue;
            }

            let mut replacement = row.clone();
            replacement.id = id.to_string();

            match slots.get(id).copied() {
                Some(Slot::Existing(idx)) => {
                    rows[idx] = replacement;
                    touched.insert(idx);
                }
                Some(Slot::Inserted(idx)) => {
                    prepended[idx] = replacement;
                }
                None => {
                    slots.insert(replacement.id.clone(), Slot::Inserted(prepended.len()));
                    prepended.push(replacement);
                }
            }
        }

        let inserted = prepended.len();
        let updated = touched.len();
        // Each insertion went on top of the previous one.
        prepended.reverse();
        prepended.extend(rows);

        info!(
            "Merged {} delta rows: {} inserted, {} updated, {} rejected",
            delta.len(),
            inserted,
            updated,
            rejected.len()
        );

        MergeOutcome {
            store: CatalogStore::new(new_timestamp, headers, prepended),
            inserted,
            updated,
            rejected,
        }
    }

    /// Replay delta files onto the snapshot at `store_path`.
    ///
    /// The snapshot is persisted after every step, so a failure (a missing
    /// delta file, for instance) leaves the last good state on disk.
    pub fn apply_steps(
        &self,
        store_path: &Path,
        delta_dir: &Path,
        steps: &[UpdateStep],
    ) -> EngineResult<CatalogStore> {
        let mut store = read_catalog(store_path)?.store;

        for step in steps {
            let delta_path = delta_dir.join(&step.file_name);
            let delta = read_delta(&delta_path)?;

            let outcome = self.merge_with_summary(store, &delta.store.rows, step.stamp);
            store = outcome.store;
            write_catalog(store_path, &store)?;

            info!(
                "Applied {} to catalog, now {} rows released {} (sha256 {})",
                step.file_name,
                store.len(),
                store.release_timestamp,
                store.checksum()?
            );
        }

        Ok(store)
    }
}
