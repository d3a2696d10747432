use super::*;

fn parser() -> FieldParser {
    FieldParser::new().expect("numeric pattern should compile")
}

#[test]
fn parse_infers_numbers_booleans_and_missing() {
    let parser = parser();
    assert_eq!(parser.parse("4"), FieldValue::Numeric(4.0));
    assert_eq!(parser.parse("-2.5"), FieldValue::Numeric(-2.5));
    assert_eq!(parser.parse(".5"), FieldValue::Numeric(0.5));
    assert_eq!(parser.parse("1e2"), FieldValue::Numeric(100.0));
    assert_eq!(parser.parse(" 3 "), FieldValue::Numeric(3.0));
    assert_eq!(parser.parse("TRUE"), FieldValue::Boolean(true));
    assert_eq!(parser.parse("false"), FieldValue::Boolean(false));
    assert_eq!(parser.parse(""), FieldValue::Missing);
}

#[test]
fn tiny_numbers_become_exponent_keys() {
    let parser = parser();
    assert_eq!(parser.parse("1e-7").to_text().as_deref(), Some("1e-7"));
    assert_eq!(parser.parse("0.0000001").to_text().as_deref(), Some("1e-7"));
}

#[test]
fn parse_keeps_non_numeric_text_verbatim() {
    let parser = parser();
    assert_eq!(parser.parse("N/A"), FieldValue::Text("N/A".to_string()));
    assert_eq!(parser.parse("1,5"), FieldValue::Text("1,5".to_string()));
    assert_eq!(parser.parse("True"), FieldValue::Text("True".to_string()));
    assert_eq!(
        parser.parse("12345678901234567890"),
        FieldValue::Text("12345678901234567890".to_string())
    );
}

#[test]
fn read_rows_maps_schema_columns_by_header_name() {
    let csv = "\
perform,target,extra,female,class,eval_workshop,eval_instructor
1,0,ignored,0,2,4,5
0,1,ignored,1,,N/A,3.5
";

    let (rows, missing) = read_rows(csv.as_bytes()).expect("csv should parse");
    assert!(missing.is_empty());
    assert_eq!(rows.len(), 2);

    assert_eq!(rows[0].female, FieldValue::Numeric(0.0));
    assert_eq!(rows[0].class, FieldValue::Numeric(2.0));
    assert_eq!(rows[0].eval_workshop, FieldValue::Numeric(4.0));
    assert_eq!(rows[0].eval_instructor, FieldValue::Numeric(5.0));
    assert_eq!(rows[0].target, FieldValue::Numeric(0.0));
    assert_eq!(rows[0].perform, FieldValue::Numeric(1.0));

    assert_eq!(rows[1].class, FieldValue::Missing);
    assert_eq!(rows[1].eval_workshop, FieldValue::Text("N/A".to_string()));
    assert_eq!(rows[1].eval_instructor, FieldValue::Numeric(3.5));
}

#[test]
fn read_rows_skips_blank_lines_and_pads_short_rows() {
    let csv = "female,class,eval_workshop,eval_instructor,target,perform\n\n1,3,5\n\n";

    let (rows, _) = read_rows(csv.as_bytes()).expect("csv should parse");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].class, FieldValue::Numeric(3.0));
    assert_eq!(rows[0].eval_instructor, FieldValue::Missing);
    assert_eq!(rows[0].perform, FieldValue::Missing);
}

#[test]
fn read_rows_reports_absent_schema_columns() {
    let csv = "female,eval_workshop\n0,4\n";

    let (rows, missing) = read_rows(csv.as_bytes()).expect("csv should parse");
    assert_eq!(rows.len(), 1);
    assert_eq!(
        missing,
        vec!["class", "eval_instructor", "target", "perform"]
    );
    assert_eq!(rows[0].target, FieldValue::Missing);
}

#[test]
fn load_dataset_surfaces_io_errors_with_path() {
    let error = load_dataset(Path::new("/nonexistent/website_data.csv"))
        .expect_err("missing file should fail");
    assert!(matches!(error, DataSourceError::Io { .. }));
    assert!(error.to_string().contains("/nonexistent/website_data.csv"));
}

#[test]
fn read_rows_decodes_invalid_utf8_lossily() {
    let mut csv = b"female,class,eval_workshop,eval_instructor,target,perform\n".to_vec();
    csv.extend_from_slice(b"0,1,4,5,gr\xffoup,1\n");

    let (rows, _) = read_rows(csv.as_slice()).expect("invalid utf-8 should not fail the load");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].target, FieldValue::Text("gr\u{FFFD}oup".to_string()));
    assert_eq!(rows[0].eval_workshop, FieldValue::Numeric(4.0));
}
