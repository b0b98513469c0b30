//! Integration tests for the list reader
//!
//! Covers header handling, reads with processors, reads by column name and
//! recovery after a rejected row.

use assert_matches::assert_matches;
use csvpipe::processor::{Chain, LMinMax, NotNull, Optional, ParseInt, Unique};
use csvpipe::{CellValue, ColumnMapping, CsvError, CsvListReader, CsvResult, Dialect};
use pretty_assertions::assert_eq;
use std::io::Cursor;

const PEOPLE: &str = "id,name,age\n1,Alice,30\n2,Bob,\n3,\"Carol\nSmith\",41\n";

fn reader(input: &str) -> CsvListReader<Cursor<&str>> {
    CsvListReader::new(Cursor::new(input), Dialect::excel())
}

#[test]
fn test_read_by_column_name() {
    let mut r = reader(PEOPLE);
    let header = r.header(true).unwrap().unwrap();
    assert_eq!(header, vec!["id", "name", "age"]);

    let mut mapping = ColumnMapping::new()
        .column("id")
        .column_with("age", Chain::new().then(Optional).then(ParseInt));

    assert_eq!(
        r.read_mapped(&mut mapping).unwrap(),
        Some(vec![CellValue::from("1"), CellValue::Int(30)])
    );
    assert_eq!(
        r.read_mapped(&mut mapping).unwrap(),
        Some(vec![CellValue::from("2"), CellValue::Null])
    );
    assert_eq!(
        r.read_mapped(&mut mapping).unwrap(),
        Some(vec![CellValue::from("3"), CellValue::Int(41)])
    );
    assert_eq!(r.read_mapped(&mut mapping).unwrap(), None);
}

#[test]
fn test_mapping_order_is_output_order() {
    let mut r = reader(PEOPLE);
    r.header(true).unwrap();
    let mut mapping = ColumnMapping::new().column("name").column("id");
    assert_eq!(
        r.read_mapped(&mut mapping).unwrap(),
        Some(vec![CellValue::from("Alice"), CellValue::from("1")])
    );
}

#[test]
fn test_unknown_column_fails_before_reading() {
    let mut r = reader(PEOPLE);
    r.header(true).unwrap();
    let mut mapping = ColumnMapping::new().column("email");
    assert_matches!(
        r.read_mapped(&mut mapping),
        Err(CsvError::Configuration { .. })
    );
    // The row was not consumed
    assert_eq!(r.row_number(), 1);
    assert_eq!(r.read().unwrap(), Some(vec!["1".to_string(), "Alice".into(), "30".into()]));
}

#[test]
fn test_read_by_name_needs_header() {
    let mut r = reader(PEOPLE);
    let mut mapping = ColumnMapping::new().column("id");
    assert_matches!(
        r.read_mapped(&mut mapping),
        Err(CsvError::Configuration { .. })
    );
}

#[test]
fn test_chain_count_mismatch() {
    let mut r = reader(PEOPLE);
    r.header(true).unwrap();
    let mut chains = vec![None, Some(Chain::new().then(NotNull))];
    assert_matches!(r.read_with(&mut chains), Err(CsvError::Configuration { .. }));
}

#[test]
fn test_context_tracks_multi_line_rows() {
    let mut r = reader(PEOPLE);
    r.header(true).unwrap();
    r.read().unwrap();
    r.read().unwrap();
    let last = r.read().unwrap().unwrap();
    assert_eq!(last[1], "Carol\nSmith");
    assert_eq!(r.line_number(), 5);
    assert_eq!(r.row_number(), 4);
    assert_eq!(r.context().row_source, last);
    assert_eq!(r.untokenized_row(), "3,\"Carol\nSmith\",41");
}

#[test]
fn test_reading_continues_after_constraint_failure() {
    let input = "id,age\n1,20\n1,200\n2,abc\n3,40\n";
    let mut r = reader(input);
    r.header(true).unwrap();
    let mut chains = vec![
        Some(Chain::new().then(ParseInt).then(Unique::new())),
        Some(Chain::new().then(LMinMax::new(0, 150).unwrap())),
    ];

    let mut accepted = Vec::new();
    let mut rejected = Vec::new();
    loop {
        match r.read_with(&mut chains) {
            Ok(Some(values)) => accepted.push(values),
            Ok(None) => break,
            Err(e) => {
                assert!(e.is_recoverable());
                let context = e.context().unwrap();
                rejected.push((context.line_number, context.column_number));
            }
        }
    }

    assert_eq!(
        accepted,
        vec![
            vec![CellValue::Int(1), CellValue::Int(20)],
            vec![CellValue::Int(3), CellValue::Int(40)],
        ]
    );
    // Row 3 fails Unique in column 1, row 4 fails the range parse in column 2
    assert_eq!(rejected, vec![(3, 1), (4, 2)]);
}

#[test]
fn test_execute_processors_after_read() {
    let mut r = reader("a,b\n1\n2,3\n");
    let first = r.read().unwrap().unwrap();
    assert_eq!(r.length(), first.len());

    r.read().unwrap();
    assert_eq!(r.length(), 1);
    let values = r
        .execute_processors(&mut [Some(Chain::new().then(ParseInt))])
        .unwrap();
    assert_eq!(values, vec![CellValue::Int(1)]);

    r.read().unwrap();
    let values = r
        .execute_processors(&mut [None, Some(Chain::new().then(ParseInt))])
        .unwrap();
    assert_eq!(values, vec![CellValue::from("2"), CellValue::Int(3)]);
}

#[test]
fn test_parse_error_stops_the_record() {
    let mut r = reader("a,b\n\"x\"y,z\nc,d\n");
    r.read().unwrap();
    let err = r.read().unwrap_err();
    assert_matches!(err, CsvError::Parse(_));
    assert!(!err.is_recoverable());
}

#[test]
fn test_no_processing_after_failed_read() {
    let mut r = reader("a,b\nx,\"y\"z,w\n");
    r.read().unwrap();
    assert_matches!(r.read(), Err(CsvError::Parse(_)));

    assert_eq!(r.length(), 0);
    assert_matches!(
        r.execute_processors(&mut [None]),
        Err(CsvError::Configuration { .. })
    );
    assert_matches!(
        r.execute_processors(&mut [None, None]),
        Err(CsvError::Configuration { .. })
    );
}

#[test]
fn test_no_processing_after_end_of_data() {
    let mut r = reader("a,b\n");
    r.read().unwrap();
    assert_eq!(r.read().unwrap(), None);
    assert_matches!(
        r.execute_processors(&mut [None, None]),
        Err(CsvError::Configuration { .. })
    );
}

#[test]
fn test_from_path() -> CsvResult<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("people.csv");
    std::fs::write(&path, PEOPLE)?;

    let mut r = CsvListReader::from_path(&path, Dialect::excel())?;
    r.header(true)?;
    let rows: Vec<Vec<String>> = r.rows().collect::<CsvResult<_>>()?;
    assert_eq!(rows.len(), 3);
    assert_eq!(r.header_row().map(<[String]>::len), Some(3));
    Ok(())
}
