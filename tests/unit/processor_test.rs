use assert_matches::assert_matches;
use chrono::NaiveDate;
use csvpipe::processor::{
    execute_chains, CellValue, Chain, ConvertNullTo, DMinMax, Equals, FmtBool, FmtDate, FmtNumber,
    HashMapper, IsIncludedIn, LMinMax, NotNull, Optional, ParseBool, ParseDate, ParseDouble,
    ParseInt, StrRegEx, Token, Trim, Unique,
};
use csvpipe::{CsvContext, CsvError, CsvResult};
use pretty_assertions::assert_eq;

fn raw(fields: &[&str]) -> Vec<String> {
    fields.iter().map(|f| f.to_string()).collect()
}

fn run(chains: &mut [Option<Chain>], fields: &[&str], row_number: usize) -> CsvResult<Vec<CellValue>> {
    let mut context = CsvContext::new(row_number, row_number, 0).with_row_source(raw(fields));
    execute_chains(&raw(fields), chains, &mut context)
}

#[test]
fn test_row_of_typed_values() {
    let mut chains = vec![
        Some(Chain::new().then(NotNull).then(ParseInt)),
        None,
        Some(Chain::new().then(Optional).then(ParseDouble).then(DMinMax::new(0.0, 10.0).unwrap())),
        Some(Chain::new().then(ParseBool::new())),
        Some(Chain::new().then(ParseDate::new("%Y-%m-%d").unwrap())),
    ];

    let row = run(&mut chains, &["7", "Alice", "2.5", "yes", "2024-02-29"], 1).unwrap();
    assert_eq!(
        row,
        vec![
            CellValue::Int(7),
            CellValue::from("Alice"),
            CellValue::Float(2.5),
            CellValue::Bool(true),
            CellValue::Date(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()),
        ]
    );

    let row = run(&mut chains, &["8", "", "", "N", "2024-03-01"], 2).unwrap();
    assert_eq!(row[1], CellValue::from(""));
    assert_eq!(row[2], CellValue::Null);
    assert_eq!(row[3], CellValue::Bool(false));
}

#[test]
fn test_constraint_failure_names_its_column() {
    let mut chains = vec![None, Some(Chain::new().then(ParseInt).then(LMinMax::new(0, 150).unwrap()))];
    let err = run(&mut chains, &["bob", "200"], 4).unwrap_err();
    match err {
        CsvError::Constraint(violation) => {
            assert_eq!(violation.value, CellValue::Int(200));
            assert_eq!(violation.context.row_number, 4);
            assert_eq!(violation.context.column_number, 2);
            assert_eq!(violation.context.row_source, raw(&["bob", "200"]));
        }
        other => panic!("expected a constraint violation, got {:?}", other),
    }
}

#[test]
fn test_chain_count_mismatch_runs_nothing() {
    let mut chains = vec![
        Some(Chain::new().then(|_: CellValue, _: &CsvContext| -> CsvResult<CellValue> {
            panic!("processor must not run on a mismatched row")
        })),
        None,
    ];
    assert_matches!(
        run(&mut chains, &["only one"], 1),
        Err(CsvError::Configuration { .. })
    );
    assert_matches!(
        run(&mut chains, &["a", "b", "c"], 1),
        Err(CsvError::Configuration { .. })
    );
}

#[test]
fn test_first_failure_abandons_row() {
    let mut chains = vec![
        Some(Chain::new().then(NotNull)),
        Some(Chain::new().then(|_: CellValue, _: &CsvContext| -> CsvResult<CellValue> {
            panic!("columns after a failure must not be processed")
        })),
    ];
    let err = run(&mut chains, &["", "x"], 1).unwrap_err();
    assert_eq!(err.context().unwrap().column_number, 1);
}

#[test]
fn test_foreign_closure_error_is_wrapped() {
    let mut chains = vec![
        None,
        Some(Chain::new().then(|_: CellValue, _: &CsvContext| -> CsvResult<CellValue> {
            Err(anyhow::anyhow!("lookup service unavailable").into())
        })),
    ];
    let err = run(&mut chains, &["1", "x"], 2).unwrap_err();
    assert_matches!(err, CsvError::Other(_));
    assert!(err.context().is_none());
    assert!(!err.is_recoverable());

    let message = err.user_message();
    assert!(message.starts_with("Unexpected error:"));
    assert!(message.contains("lookup service unavailable"));
}

#[test]
fn test_optional_short_circuits_parsers() {
    let mut chains = vec![Some(Chain::new().then(Optional).then(ParseInt).then(LMinMax::new(1, 5).unwrap()))];
    assert_eq!(run(&mut chains, &[""], 1).unwrap(), vec![CellValue::Null]);
    assert_eq!(run(&mut chains, &["3"], 2).unwrap(), vec![CellValue::Int(3)]);
}

#[test]
fn test_convert_null_to_default() {
    let mut chains = vec![Some(Chain::new().then(ConvertNullTo::new(0i64)).then(ParseInt))];
    assert_eq!(run(&mut chains, &[""], 1).unwrap(), vec![CellValue::Int(0)]);
    assert_eq!(run(&mut chains, &["12"], 2).unwrap(), vec![CellValue::Int(12)]);
}

#[test]
fn test_parse_failure_is_constraint_and_wrong_type_is_processing() {
    let mut chains = vec![Some(Chain::new().then(ParseInt))];
    assert_matches!(run(&mut chains, &["12a"], 1), Err(CsvError::Constraint(_)));

    let mut chains = vec![Some(Chain::new().then(ParseInt).then(Trim))];
    let err = run(&mut chains, &["12"], 1).unwrap_err();
    assert_matches!(err, CsvError::Processing { context: Some(ref ctx), .. } if ctx.column_number == 1);
    assert!(err.is_recoverable());
}

#[test]
fn test_unique_keeps_state_across_rows() {
    let mut chains = vec![Some(Chain::new().then(NotNull).then(Unique::new()))];
    run(&mut chains, &["a@example.com"], 1).unwrap();
    run(&mut chains, &["b@example.com"], 2).unwrap();
    let err = run(&mut chains, &["a@example.com"], 3).unwrap_err();
    assert!(err.to_string().contains("first seen on row 1"));

    // A fresh chain starts with an empty memory
    let mut fresh = vec![Some(Chain::new().then(Unique::new()))];
    assert!(run(&mut fresh, &["a@example.com"], 1).is_ok());
}

#[test]
fn test_equals_across_rows() {
    let mut chains = vec![Some(Chain::new().then(Equals::new()))];
    run(&mut chains, &["EUR"], 1).unwrap();
    run(&mut chains, &["EUR"], 2).unwrap();
    assert_matches!(run(&mut chains, &["USD"], 3), Err(CsvError::Constraint(_)));
}

#[test]
fn test_lookup_processors() {
    let mut chains = vec![
        Some(Chain::new().then(IsIncludedIn::new(["red", "green"]).unwrap())),
        Some(Chain::new().then(HashMapper::new([("M", "male"), ("F", "female")]).unwrap().with_default("unknown"))),
        Some(Chain::new().then(StrRegEx::new("[A-Z]{3}").unwrap())),
    ];
    assert_eq!(
        run(&mut chains, &["red", "F", "ABC"], 1).unwrap(),
        vec![CellValue::from("red"), CellValue::from("female"), CellValue::from("ABC")]
    );
    assert_eq!(run(&mut chains, &["green", "X", "XYZ"], 2).unwrap()[1], CellValue::from("unknown"));
    assert_matches!(run(&mut chains, &["blue", "M", "ABC"], 3), Err(CsvError::Constraint(_)));
    assert_matches!(run(&mut chains, &["red", "M", "ABCD"], 4), Err(CsvError::Constraint(_)));
}

#[test]
fn test_token_ends_chain_on_match() {
    let mut chains = vec![Some(Chain::new().then(Token::new("N/A", CellValue::Null)).then(ParseInt))];
    assert_eq!(run(&mut chains, &["N/A"], 1).unwrap(), vec![CellValue::Null]);
    assert_eq!(run(&mut chains, &["4"], 2).unwrap(), vec![CellValue::Int(4)]);
}

#[test]
fn test_format_processors() {
    let mut chains = vec![
        Some(Chain::new().then(ParseBool::new()).then(FmtBool::new("Y", "N"))),
        Some(Chain::new().then(ParseDouble).then(FmtNumber::new(2))),
        Some(Chain::new().then(ParseDate::new("%d/%m/%Y").unwrap()).then(FmtDate::new("%Y-%m-%d").unwrap())),
    ];
    assert_eq!(
        run(&mut chains, &["true", "3.14159", "05/01/2024"], 1).unwrap(),
        vec![CellValue::from("Y"), CellValue::from("3.14"), CellValue::from("2024-01-05")]
    );
}

#[test]
fn test_invalid_processor_arguments_are_configuration_errors() {
    assert_matches!(LMinMax::new(5, 1), Err(CsvError::Configuration { .. }));
    assert_matches!(ParseDate::new("%Q"), Err(CsvError::Configuration { .. }));
    assert_matches!(StrRegEx::new("("), Err(CsvError::Configuration { .. }));
    assert_matches!(
        IsIncludedIn::new(Vec::<&str>::new()),
        Err(CsvError::Configuration { .. })
    );
}
