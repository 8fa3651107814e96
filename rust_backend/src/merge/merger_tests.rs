#[cfg(test)]
mod tests {
    use crate::core::domain::{CatalogEntry, CatalogStore};
    use crate::core::error::EngineError;
    use crate::merge::merger::CatalogMerger;
    use chrono::{NaiveDate, NaiveDateTime};
    use proptest::prelude::*;

    fn stamp(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2023, 5, day)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn row(id: &str, mag: &str) -> CatalogEntry {
        CatalogEntry {
            id: id.to_string(),
            name_prefix: "SN".to_string(),
            name: format!("2023{}", id),
            discovery_magnitude: mag.to_string(),
            ..CatalogEntry::default()
        }
    }

    fn store(ids: &[&str]) -> CatalogStore {
        CatalogStore::new(
            stamp(4),
            vec!["objid".to_string(), "discoverymag".to_string()],
            ids.iter().map(|id| row(id, "18.0")).collect(),
        )
    }

    fn ids(store: &CatalogStore) -> Vec<&str> {
        store.rows.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn test_empty_delta_only_restamps() {
        let before = store(&["3", "2", "1"]);
        let after = CatalogMerger.merge(before.clone(), &[], stamp(5));

        assert_eq!(after.rows, before.rows);
        assert_eq!(after.headers, before.headers);
        assert_eq!(after.release_timestamp, stamp(5));
    }

    #[test]
    fn test_update_keeps_position() {
        let after = CatalogMerger.merge(store(&["3", "2", "1"]), &[row("2", "16.5")], stamp(5));

        assert_eq!(ids(&after), vec!["3", "2", "1"]);
        assert_eq!(after.rows[1].discovery_magnitude, "16.5");
    }

    #[test]
    fn test_new_ids_go_on_top_in_batch_order() {
        let delta = vec![row("10", "17.0"), row("11", "17.1"), row("2", "16.0")];
        let outcome = CatalogMerger.merge_with_summary(store(&["3", "2", "1"]), &delta, stamp(5));

        assert_eq!(ids(&outcome.store), vec!["10", "11", "3", "2", "1"]);
        assert_eq!(outcome.inserted, 2);
        assert_eq!(outcome.updated, 1);
        assert!(outcome.rejected.is_empty());
    }

    #[test]
    fn test_earlier_row_wins_within_batch() {
        // Existing id touched twice
        let delta = vec![row("2", "first"), row("2", "second")];
        let after = CatalogMerger.merge(store(&["3", "2", "1"]), &delta, stamp(5));
        assert_eq!(after.get("2").unwrap().discovery_magnitude, "first");
        assert_eq!(after.len(), 3);

        // New id touched twice
        let delta = vec![row("9", "first"), row("9", "second")];
        let outcome = CatalogMerger.merge_with_summary(store(&["1"]), &delta, stamp(5));
        assert_eq!(ids(&outcome.store), vec!["9", "1"]);
        assert_eq!(outcome.store.rows[0].discovery_magnitude, "first");
        assert_eq!(outcome.inserted, 1);
    }

    #[test]
    fn test_rows_without_id_are_rejected() {
        let delta = vec![row("", "17.0"), row("  ", "17.0"), row("5", "17.0")];
        let outcome = CatalogMerger.merge_with_summary(store(&["1"]), &delta, stamp(5));

        assert_eq!(ids(&outcome.store), vec!["5", "1"]);
        assert_eq!(outcome.rejected.len(), 2);
        assert!(outcome
            .rejected
            .iter()
            .all(|e| matches!(e, EngineError::MalformedRow { .. })));
    }

    #[test]
    fn test_ids_are_trimmed_before_lookup() {
        let after = CatalogMerger.merge(store(&["7"]), &[row(" 7 ", "15.0")], stamp(5));
        assert_eq!(ids(&after), vec!["7"]);
        assert_eq!(after.rows[0].discovery_magnitude, "15.0");
    }

    proptest! {
        #[test]
        fn prop_merge_keeps_ids_unique_and_covers_both_sides(
            existing in prop::collection::btree_set(0u16..200, 0..30),
            delta_ids in prop::collection::vec(0u16..200, 0..30),
        ) {
            let existing: Vec<String> = existing.iter().map(|i| i.to_string()).collect();
            let refs: Vec<&str> = existing.iter().map(String::as_str).collect();
            let delta: Vec<CatalogEntry> = delta_ids
                .iter()
                .enumerate()
                .map(|(pos, id)| row(&id.to_string(), &pos.to_string()))
                .collect();

            let after = CatalogMerger.merge(store(&refs), &delta, stamp(5));

            let mut seen = std::collections::HashSet::new();
            for r in &after.rows {
                prop_assert!(seen.insert(r.id.clone()), "duplicate id {}", r.id);
            }
            for id in existing.iter().chain(delta.iter().map(|d| &d.id)) {
                prop_assert!(seen.contains(id));
            }

            // The earliest delta row for each id carries the final content
            for (pos, d) in delta.iter().enumerate() {
                if delta[..pos].iter().all(|earlier| earlier.id != d.id) {
                    prop_assert_eq!(&after.get(&d.id).unwrap().discovery_magnitude, &pos.to_string());
                }
            }

            // Existing rows keep their relative order at the bottom
            let tail: Vec<&str> = after.rows[after.len() - existing.len()..]
                .iter()
                .map(|r| r.id.as_str())
                .collect();
            prop_assert_eq!(tail, refs);
        }
    }
}
