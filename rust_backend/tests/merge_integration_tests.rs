//! Catalog catch-up against snapshot and delta files on disk.

mod support;

use anyhow::Result;
use chrono::NaiveDate;
use tempfile::tempdir;

use pepper_rust::core::error::EngineError;
use pepper_rust::merge::{delta_file_name, plan_update, UpdatePlan};
use pepper_rust::parsing::read_catalog;
use pepper_rust::CatalogMerger;

use support::{catalog_text, row, start_of, write_file};

const STORE_NAME: &str = "tns_public_objects.csv";

fn object(id: &str, name: &str, magnitude: &str) -> String {
    row(
        id,
        name,
        "150.0",
        "10.0",
        "2023-04-28 10:00:00.000",
        magnitude,
        "",
        "2023-05-01 10:00:00",
    )
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 5, d).unwrap()
}

fn base_snapshot() -> String {
    catalog_text(
        "2023-05-02 00:00:00",
        &[object("1", "2023aaa", "17.0"), object("2", "2023bbb", "17.5")],
    )
}

fn ids(store: &pepper_rust::CatalogStore) -> Vec<&str> {
    store.rows.iter().map(|r| r.id.as_str()).collect()
}

#[test]
fn test_catch_up_replays_deltas_in_order() -> Result<()> {
    let dir = tempdir()?;
    let store_path = write_file(dir.path(), STORE_NAME, &base_snapshot());
    write_file(
        dir.path(),
        &delta_file_name(day(2)),
        &catalog_text(
            "2023-05-03 00:00:00",
            &[object("10", "2023ccc", "18.0"), object("1", "2023aaa", "16.1")],
        ),
    );
    write_file(
        dir.path(),
        &delta_file_name(day(3)),
        &catalog_text("2023-05-04 00:00:00", &[object("11", "2023ddd", "18.1")]),
    );

    let release = read_catalog(&store_path)?.store.release_timestamp;
    let steps = match plan_update(release, day(4)) {
        UpdatePlan::ApplyDeltas(steps) => steps,
        other => panic!("expected deltas, got {:?}", other),
    };
    assert_eq!(steps.len(), 2);

    let merged = CatalogMerger::new().apply_steps(&store_path, dir.path(), &steps)?;
    assert_eq!(ids(&merged), vec!["11", "10", "1", "2"]);
    assert_eq!(merged.release_timestamp, start_of(day(4)));
    assert_eq!(merged.get("1").map(|e| e.discovery_magnitude.as_str()), Some("16.1"));

    let on_disk = read_catalog(&store_path)?.store;
    assert_eq!(ids(&on_disk), ids(&merged));
    assert_eq!(on_disk.checksum()?, merged.checksum()?);
    assert!(matches!(plan_update(on_disk.release_timestamp, day(4)), UpdatePlan::UpToDate));
    Ok(())
}

#[test]
fn test_missing_delta_keeps_last_good_snapshot() -> Result<()> {
    let dir = tempdir()?;
    let store_path = write_file(dir.path(), STORE_NAME, &base_snapshot());
    write_file(
        dir.path(),
        &delta_file_name(day(2)),
        &catalog_text("2023-05-03 00:00:00", &[object("10", "2023ccc", "18.0")]),
    );

    let release = read_catalog(&store_path)?.store.release_timestamp;
    let UpdatePlan::ApplyDeltas(steps) = plan_update(release, day(4)) else {
        panic!("expected deltas");
    };

    let result = CatalogMerger::new().apply_steps(&store_path, dir.path(), &steps);
    assert!(matches!(result, Err(EngineError::Io(_))));

    let on_disk = read_catalog(&store_path)?.store;
    assert_eq!(ids(&on_disk), vec!["10", "1", "2"]);
    assert_eq!(on_disk.release_timestamp, start_of(day(3)));
    Ok(())
}

#[test]
fn test_malformed_delta_rows_are_skipped() -> Result<()> {
    let dir = tempdir()?;
    let store_path = write_file(dir.path(), STORE_NAME, &base_snapshot());
    let mut delta = catalog_text("2023-05-03 00:00:00", &[object("10", "2023ccc", "18.0")]);
    delta.push_str("\"12\",\"SN\",\"short row\"\n");
    write_file(dir.path(), &delta_file_name(day(2)), &delta);

    let release = read_catalog(&store_path)?.store.release_timestamp;
    let UpdatePlan::ApplyDeltas(steps) = plan_update(release, day(3)) else {
        panic!("expected deltas");
    };
    let merged = CatalogMerger::new().apply_steps(&store_path, dir.path(), &steps)?;

    assert_eq!(ids(&merged), vec!["10", "1", "2"]);
    Ok(())
}

#[test]
fn test_far_behind_snapshot_needs_full_refresh() -> Result<()> {
    let dir = tempdir()?;
    let store_path = write_file(dir.path(), STORE_NAME, &base_snapshot());
    let release = read_catalog(&store_path)?.store.release_timestamp;

    let today = NaiveDate::from_ymd_opt(2023, 6, 30).unwrap();
    assert_eq!(plan_update(release, today), UpdatePlan::FullRefresh { days_behind: 59 });
    Ok(())
}
