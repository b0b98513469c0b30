//! Writing records and reading them back with the same dialect returns the
//! same records.

use csvpipe::parser::parse_str;
use csvpipe::processor::{Chain, FmtDate, FmtNumber, Optional, ParseDate, ParseDouble};
use csvpipe::{CellValue, CommentMatcher, CsvListReader, CsvListWriter, Dialect, QuoteMode};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::io::Cursor;

fn write_all(rows: &[Vec<String>], dialect: &Dialect) -> String {
    let mut writer = CsvListWriter::new(Vec::new(), dialect.clone());
    for row in rows {
        writer.write(row).unwrap();
    }
    String::from_utf8(writer.into_inner().unwrap()).unwrap()
}

fn field() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z0-9 ]{0,8}",
        "[a-z,;\"' ]{0,8}",
        "[a-z]{0,3}(\n|\r\n|\r)[a-z#]{0,3}",
        "#[a-z]{0,4}",
    ]
}

fn rows() -> impl Strategy<Value = Vec<Vec<String>>> {
    (1usize..5).prop_flat_map(|width| prop::collection::vec(prop::collection::vec(field(), width), 1..8))
}

fn dialects() -> Vec<Dialect> {
    let comments = Dialect::excel()
        .to_builder()
        .with_comment_matcher(CommentMatcher::starts_with("#").unwrap())
        .build()
        .unwrap();
    let spaces = Dialect::standard()
        .to_builder()
        .with_surrounding_spaces_need_quotes(true)
        .build()
        .unwrap();
    let kept_empty = Dialect::excel()
        .to_builder()
        .with_ignore_empty_lines(false)
        .with_quote_mode(QuoteMode::columns([2]))
        .build()
        .unwrap();
    let custom = Dialect::builder('\'', '|', "\n").build().unwrap();
    let carriage_return = Dialect::builder('"', ',', "\r").build().unwrap();
    vec![
        Dialect::standard(),
        Dialect::excel_north_europe(),
        Dialect::tab(),
        comments,
        spaces,
        kept_empty,
        custom,
        carriage_return,
    ]
}

proptest! {
    #[test]
    fn prop_written_rows_read_back(records in rows()) {
        for dialect in dialects() {
            let text = write_all(&records, &dialect);
            let read = parse_str(&text, &dialect).unwrap();
            prop_assert_eq!(&read, &records);
        }
    }

    #[test]
    fn prop_line_count_matches_writer(records in rows()) {
        let dialect = Dialect::excel();
        let mut writer = CsvListWriter::new(Vec::new(), dialect.clone());
        for row in &records {
            writer.write(row).unwrap();
        }
        let written_lines = writer.line_number();
        let text = String::from_utf8(writer.into_inner().unwrap()).unwrap();

        let mut reader = CsvListReader::new(Cursor::new(text), dialect);
        while reader.read().unwrap().is_some() {}
        prop_assert_eq!(reader.line_number(), written_lines);
        prop_assert_eq!(reader.row_number(), records.len());
    }
}

#[test]
fn test_single_empty_field_survives_ignored_empty_lines() {
    let rows = vec![vec![String::new()], vec!["a".to_string()]];
    let text = write_all(&rows, &Dialect::excel());
    assert_eq!(text, "\"\"\na\n");
    assert_eq!(parse_str(&text, &Dialect::excel()).unwrap(), rows);
}

#[test]
fn test_carriage_return_records() {
    let dialect = Dialect::builder('"', ',', "\r").build().unwrap();
    let rows = vec![
        vec!["a".to_string(), "b".to_string()],
        vec!["c\rd".to_string(), "e\nf".to_string()],
    ];
    let text = write_all(&rows, &dialect);
    assert_eq!(text, "a,b\r\"c\rd\",\"e\nf\"\r");
    assert_eq!(parse_str(&text, &dialect).unwrap(), rows);
}

#[test]
fn test_processed_values_round_trip() {
    let dialect = Dialect::excel_north_europe();
    let mut writer = CsvListWriter::new(Vec::new(), dialect.clone());
    let date = chrono::NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
    let mut write_chains = vec![
        None,
        Some(Chain::new().then(FmtNumber::new(2))),
        Some(Chain::new().then(FmtDate::new("%d.%m.%Y").unwrap())),
    ];
    writer
        .write_with(
            &[CellValue::from("a;b"), CellValue::Float(2.5), CellValue::Date(date)],
            &mut write_chains,
        )
        .unwrap();
    let text = String::from_utf8(writer.into_inner().unwrap()).unwrap();
    assert_eq!(text, "\"a;b\";2.50;01.07.2024\n");

    let mut reader = CsvListReader::new(Cursor::new(text), dialect);
    let mut read_chains = vec![
        None,
        Some(Chain::new().then(Optional).then(ParseDouble)),
        Some(Chain::new().then(ParseDate::new("%d.%m.%Y").unwrap())),
    ];
    assert_eq!(
        reader.read_with(&mut read_chains).unwrap(),
        Some(vec![CellValue::from("a;b"), CellValue::Float(2.5), CellValue::Date(date)])
    );
}
