use sheetside_pdf::script::{SAMPLE_CHARS, classify, sample_text};
use sheetside_pdf::{Cell, ColumnHint, Row, RowHint, Script, ScriptProfile, Table};

fn table(name: &str, cells: &[&str]) -> Table {
    Table::new(name, vec![cells.iter().map(|s| Cell::text(*s)).collect::<Row>()])
}

#[test]
fn empty_and_whitespace_input_is_neutral_latin() {
    assert_eq!(classify(""), ScriptProfile::NEUTRAL);
    assert_eq!(classify("   \n\t "), ScriptProfile::NEUTRAL);
    assert_eq!(classify("12345 -- 67.89"), ScriptProfile::NEUTRAL);
    assert_eq!(ScriptProfile::NEUTRAL.script, Script::Latin);
    assert_eq!(ScriptProfile::NEUTRAL.confidence, 0.5);
}

#[test]
fn dominant_script_wins_with_share_as_confidence() {
    let p = classify("Привет мир");
    assert_eq!(p.script, Script::Cyrillic);
    assert_eq!(p.confidence, 1.0);

    // 6 Cyrillic letters against 2 Latin ones.
    let p = classify("Москва OK");
    assert_eq!(p.script, Script::Cyrillic);
    assert!((p.confidence - 0.75).abs() < 1e-6);
}

#[test]
fn each_script_is_recognised() {
    assert_eq!(classify("Quarterly report").script, Script::Latin);
    assert_eq!(classify("中文字符").script, Script::Cjk);
    assert_eq!(classify("ひらがな").script, Script::Cjk);
    assert_eq!(classify("한국어").script, Script::Cjk);
    assert_eq!(classify("مرحبا بالعالم").script, Script::Arabic);
    assert_eq!(classify("नमस्ते दुनिया").script, Script::Devanagari);
}

#[test]
fn ties_go_to_the_earlier_script() {
    let p = classify("ab вг");
    assert_eq!(p.script, Script::Latin);
    assert!((p.confidence - 0.5).abs() < 1e-6);
}

#[test]
fn classification_is_deterministic() {
    let text = "Отчёт 2024 — Sales / 销售";
    assert_eq!(classify(text), classify(text));
}

#[test]
fn sample_is_bounded_and_skips_empty_cells() {
    let long = "x".repeat(SAMPLE_CHARS * 3);
    let tables = vec![table("a", &["", "  ", &long]), table("b", &["Привет"])];
    let sample = sample_text(&tables);
    assert_eq!(sample.chars().count(), SAMPLE_CHARS);
    assert!(sample.chars().all(|c| c == 'x'));

    let tables = vec![table("a", &["", "abc"]), table("b", &["где"])];
    assert_eq!(sample_text(&tables), "abc где ");
}

#[test]
fn hidden_rows_and_columns_are_not_sampled() {
    let mut t = Table::new(
        "t",
        vec![
            vec![Cell::text("Name"), Cell::text("Заметка")].into_iter().collect::<Row>(),
            vec![Cell::text("Скрыто"), Cell::text("Скрыто")].into_iter().collect(),
            vec![Cell::text("Apple"), Cell::text("Служебное")].into_iter().collect(),
        ],
    );
    t.column_hints = vec![ColumnHint::default(), ColumnHint { width_pt: None, hidden: true }];
    t.row_hints = vec![RowHint::default(), RowHint { height_pt: None, hidden: true }];

    assert_eq!(sample_text([&t]), "Name Apple ");
    assert_eq!(classify(&sample_text([&t])).script, Script::Latin);
}

#[test]
fn scripts_parse_from_names() {
    assert_eq!("cyrillic".parse::<Script>(), Ok(Script::Cyrillic));
    assert_eq!("CJK".parse::<Script>(), Ok(Script::Cjk));
    assert!("klingon".parse::<Script>().is_err());
}
