use chrono::NaiveDate;
use sheetside_pdf::delimited::{
    detect_delimiter, from_paragraphs, infer_cell, parse_records, read_delimited, read_file,
};
use sheetside_pdf::{Cell, CellKind, CellValue};

#[test]
fn delimiter_is_detected_from_the_first_line() {
    assert_eq!(detect_delimiter("a,b,c\n1,2,3"), ',');
    assert_eq!(detect_delimiter("a;b;c\n1,5;2,5;3"), ';');
    assert_eq!(detect_delimiter("a\tb\tc"), '\t');
    assert_eq!(detect_delimiter("single"), ',');
}

#[test]
fn quoted_fields_keep_delimiters_quotes_and_newlines() {
    let text = "\u{FEFF}name,note\r\n\"Smith, J\",\"said \"\"hi\"\"\"\r\nLee,\"two\nlines\"\r\n";
    let records = parse_records(text, ',');
    assert_eq!(
        records,
        vec![
            vec!["name", "note"],
            vec!["Smith, J", "said \"hi\""],
            vec!["Lee", "two\nlines"],
        ]
    );
}

#[test]
fn trailing_empty_field_is_kept() {
    assert_eq!(parse_records("a,b,\n", ','), vec![vec!["a", "b", ""]]);
    assert_eq!(parse_records("a,\"\"", ','), vec![vec!["a", ""]]);
}

#[test]
fn cells_are_typed_by_content() {
    assert_eq!(infer_cell(""), Cell::null());
    assert_eq!(infer_cell("  "), Cell::null());
    assert_eq!(infer_cell("42"), Cell::number(42.0));
    assert_eq!(infer_cell("-3.5"), Cell::number(-3.5));
    assert_eq!(infer_cell("TRUE"), Cell::boolean(true));
    assert_eq!(infer_cell("false"), Cell::boolean(false));
    assert_eq!(infer_cell("007").kind, CellKind::String);
    assert_eq!(infer_cell("12 apples"), Cell::text("12 apples"));

    let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
    assert_eq!(infer_cell("2024-03-01"), Cell::date(date.and_hms_opt(0, 0, 0).unwrap()));
    assert_eq!(
        infer_cell("2024-03-01 09:30"),
        Cell::date(date.and_hms_opt(9, 30, 0).unwrap())
    );
}

#[test]
fn display_text_formats_typed_values() {
    assert_eq!(infer_cell("42.0").display_text(), "42");
    assert_eq!(infer_cell("0.25").display_text(), "0.25");
    assert_eq!(infer_cell("true").display_text(), "TRUE");
    assert_eq!(infer_cell("2024-03-01").display_text(), "2024-03-01");
    assert_eq!(infer_cell("2024-03-01T09:30:00").display_text(), "2024-03-01 09:30");
    assert_eq!(Cell::number(f64::NAN).display_text(), "#NUM!");
    assert_eq!(Cell::formula(CellValue::Number(3.0)).display_text(), "3");
}

#[test]
fn numeric_cells_are_marked_for_right_alignment() {
    assert!(Cell::number(1.0).is_numeric());
    assert!(Cell::formula(CellValue::Number(2.0)).is_numeric());
    assert!(!Cell::boolean(true).is_numeric());
    assert!(!Cell::text("1").is_numeric());
}

#[test]
fn delimited_text_becomes_a_table() {
    let table = read_delimited("Sales", "Region;Total\nNorth;10\nSouth;", ';');
    assert_eq!(table.name, "Sales");
    assert_eq!(table.rows.len(), 3);
    assert_eq!(table.column_count(), 2);
    assert_eq!(table.rows[1].cells[1], Cell::number(10.0));
    assert!(table.rows[2].cells[1].is_empty());
}

#[test]
fn paragraphs_become_single_column_rows() {
    let table = from_paragraphs("Notes", "first line\n\n   \nsecond line  \n");
    assert_eq!(table.rows.len(), 2);
    assert_eq!(table.column_count(), 1);
    assert_eq!(table.rows[1].cells[0], Cell::text("second line"));
}

#[test]
fn files_are_read_by_extension() {
    let dir = tempfile::tempdir().unwrap();

    let csv = dir.path().join("orders.csv");
    std::fs::write(&csv, "id,qty\n1,5\n2,7\n").unwrap();
    let table = read_file(&csv, None).unwrap();
    assert_eq!(table.name, "orders");
    assert_eq!(table.rows.len(), 3);
    assert_eq!(table.column_count(), 2);

    let tsv = dir.path().join("people.tsv");
    std::fs::write(&tsv, "name\tage\nAda\t36\n").unwrap();
    let table = read_file(&tsv, None).unwrap();
    assert_eq!(table.rows[1].cells[0], Cell::text("Ada"));

    let txt = dir.path().join("memo.txt");
    std::fs::write(&txt, "a,b\nc,d\n").unwrap();
    let table = read_file(&txt, None).unwrap();
    assert_eq!(table.column_count(), 1);
    let table = read_file(&txt, Some(',')).unwrap();
    assert_eq!(table.column_count(), 2);

    assert!(read_file(&dir.path().join("absent.csv"), None).is_err());
}
