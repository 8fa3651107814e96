#[cfg(test)]
mod tests {
    use crate::core::error::EngineError;
    use crate::parsing::catalog_parser::{
        parse_catalog, read_catalog, serialize_catalog, write_catalog,
    };
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HEADER: &str = "\"objid\",\"name_prefix\",\"name\",\"ra\",\"declination\",\"redshift\",\"typeid\",\"type\",\"reporting_groupid\",\"reporting_group\",\"source_groupid\",\"source_group\",\"discoverydate\",\"discoverymag\",\"discmagfilter\",\"filter\",\"reporters\",\"time_received\",\"internal_names\",\"creationdate\",\"lastmodified\"";

    fn row(id: &str, name: &str, internal_names: &str) -> String {
        format!(
            "\"{id}\",\"SN\",\"{name}\",\"150.25\",\"-12.5\",\"\",\"\",\"\",\"48\",\"ZTF\",\"48\",\"ZTF\",\"2023-05-01 03:04:05.678\",\"17.2\",\"110\",\"g\",\"A. Reporter\",\"2023-05-01 08:00:00\",\"{internal_names}\",\"2023-05-01 08:00:00\",\"2023-05-03 10:00:00\""
        )
    }

    /// Helper to create a temp catalog file
    fn create_temp_catalog(content: &str) -> NamedTempFile {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "{}", content).unwrap();
        temp_file
    }

    fn sample_catalog() -> String {
        format!(
            "\"2023-05-04 00:00:00\"\n{}\n{}\n{}\n",
            HEADER,
            row("101", "2023abc", "ZTF23aaaaaaa, ATLAS23xyz"),
            row("102", "2023abd", "")
        )
    }

    #[test]
    fn test_read_catalog_basic() {
        let file = create_temp_catalog(&sample_catalog());
        let load = read_catalog(file.path()).unwrap();

        assert!(load.rejected.is_empty());
        let store = load.store;
        assert_eq!(
            store.release_timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            "2023-05-04 00:00:00"
        );
        assert_eq!(store.headers.len(), 21);
        assert_eq!(store.len(), 2);

        let first = &store.rows[0];
        assert_eq!(first.id, "101");
        assert_eq!(first.display_name(), "SN2023abc");
        assert_eq!(first.internal_names, "ZTF23aaaaaaa, ATLAS23xyz");
        assert_eq!(first.field("reporting_group"), "ZTF");
        assert_eq!(first.last_modified_time, "2023-05-03 10:00:00");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = read_catalog("/nonexistent/tns_public_objects.csv").unwrap_err();
        assert!(matches!(err, EngineError::Io(_)));
    }

    #[test]
    fn test_bad_release_line_is_fatal() {
        let content = format!("\"last tuesday\"\n{}\n", HEADER);
        let err = parse_catalog(content.as_bytes()).unwrap_err();
        assert!(matches!(err, EngineError::MalformedRow { line: 1, .. }));
    }

    #[test]
    fn test_missing_required_column_is_fatal() {
        let content = "\"2023-05-04 00:00:00\"\n\"objid\",\"name\"\n\"1\",\"x\"\n";
        let err = parse_catalog(content.as_bytes()).unwrap_err();
        match err {
            EngineError::MalformedRow { line, reason } => {
                assert_eq!(line, 2);
                assert!(reason.contains("declination"));
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_malformed_rows_are_rejected_not_fatal() {
        let content = format!(
            "\"2023-05-04 00:00:00\"\n{}\n{}\n\"103\",\"SN\",\"short\"\n{}\n{}\n",
            HEADER,
            row("101", "2023abc", ""),
            row("", "2023zzz", ""),
            row("101", "2023dup", "")
        );
        let load = parse_catalog(content.as_bytes()).unwrap();

        assert_eq!(load.store.len(), 1);
        assert_eq!(load.rejected.len(), 3);
        assert!(load
            .rejected
            .iter()
            .all(|e| matches!(e, EngineError::MalformedRow { .. })));
        assert_eq!(load.store.rows[0].name, "2023abc");
    }

    #[test]
    fn test_write_then_read_preserves_rows_and_unknown_columns() {
        let original = parse_catalog(sample_catalog().as_bytes()).unwrap().store;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tns_public_objects.csv");
        write_catalog(&path, &original).unwrap();

        let reread = read_catalog(&path).unwrap().store;
        assert_eq!(reread, original);
        assert_eq!(reread.rows[0].field("discmagfilter"), "110");
    }

    #[test]
    fn test_serialized_layout() {
        let store = parse_catalog(sample_catalog().as_bytes()).unwrap().store;
        let bytes = serialize_catalog(&store).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let mut lines = text.lines();

        assert_eq!(lines.next(), Some("2023-05-04 00:00:00"));
        assert!(lines.next().unwrap().starts_with("objid,name_prefix,name,ra,declination"));
        // Aliases containing commas stay quoted
        assert!(lines.next().unwrap().contains("\"ZTF23aaaaaaa, ATLAS23xyz\""));
    }

    #[test]
    fn test_checksum_tracks_content() {
        let mut store = parse_catalog(sample_catalog().as_bytes()).unwrap().store;
        let before = store.checksum().unwrap();
        assert_eq!(before.len(), 64);
        assert_eq!(before, store.checksum().unwrap());

        store.rows[1].discovery_magnitude = "18.0".into();
        assert_ne!(before, store.checksum().unwrap());
    }

    #[test]
    fn test_undecodable_row_is_rejected_not_fatal() {
        let mut bytes = format!(
            "\"2023-05-04 00:00:00\"\n{}\n{}\n",
            HEADER,
            row("101", "2023abc", "")
        )
        .into_bytes();
        let bad = row("102", "@@", "");
        let (head, tail) = bad.split_once("@@").unwrap();
        bytes.extend_from_slice(head.as_bytes());
        bytes.extend_from_slice(&[0xff, 0xfe]);
        bytes.extend_from_slice(tail.as_bytes());
        bytes.push(b'\n');
        bytes.extend_from_slice(format!("{}\n", row("103", "2023abe", "")).as_bytes());

        let load = parse_catalog(&bytes[..]).unwrap();

        let ids: Vec<&str> = load.store.rows.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["101", "103"]);
        assert_eq!(load.rejected.len(), 1);
        assert!(matches!(
            load.rejected[0],
            EngineError::MalformedRow { line: 4, .. }
        ));
    }
}
