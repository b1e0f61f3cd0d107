use proptest::prelude::*;
use sheetside_pdf::columns::{
    ColumnSample, ColumnWidthPlanner, MAX_ESTIMATE_CHARS, MIN_COLUMN_WIDTH, column_letter,
    surviving_columns,
};
use sheetside_pdf::compose::partition_strips;
use sheetside_pdf::fonts::{FontArena, StandardFont, TextMeasure};
use sheetside_pdf::wrap::{ELLIPSIS, wrap};
use sheetside_pdf::{Cell, ColumnHint, Row, Table};

/// Every character is half an em wide.
struct HalfEm;

impl TextMeasure for HalfEm {
    fn advance_1000(&self, _c: char) -> f32 {
        500.0
    }
}

fn sample(index: usize, header: &str, chars: usize) -> ColumnSample {
    ColumnSample {
        original_index: index,
        header: header.to_string(),
        max_content_chars: chars,
        width_hint_pt: None,
    }
}

fn text_row(cells: &[&str]) -> Row {
    cells
        .iter()
        .map(|s| if s.is_empty() { Cell::null() } else { Cell::text(*s) })
        .collect()
}

#[test]
fn empty_columns_are_dropped_and_renumbered() {
    let table = Table::new(
        "t",
        vec![text_row(&["Name", "", "Qty"]), text_row(&["Apple", "", "3"])],
    );
    assert_eq!(surviving_columns(&table), vec![0, 2]);

    let plan = ColumnWidthPlanner::new(5.0).plan(&table, 500.0);
    assert_eq!(plan.len(), 2);
    assert_eq!((plan[0].index, plan[0].original_index), (0, 0));
    assert_eq!((plan[1].index, plan[1].original_index), (1, 2));
    assert_eq!(plan[1].header, "Qty");
}

#[test]
fn hidden_columns_do_not_survive() {
    let mut table = Table::new("t", vec![text_row(&["a", "b", "c"])]);
    table.column_hints = vec![ColumnHint::default(), ColumnHint { width_pt: None, hidden: true }];
    assert_eq!(surviving_columns(&table), vec![0, 2]);
}

#[test]
fn surplus_is_shared_evenly() {
    let planner = ColumnWidthPlanner::new(5.0);
    let plan = planner.plan_columns(&[sample(0, "Name", 10), sample(1, "Qty", 2)], 300.0);
    // Estimates 50 and 40 (floor); 210pt surplus split in two.
    assert!((plan[0].width_pt - 155.0).abs() < 1e-3);
    assert!((plan[1].width_pt - 145.0).abs() < 1e-3);
}

#[test]
fn wide_content_is_scaled_down_to_fit() {
    let planner = ColumnWidthPlanner::new(6.0);
    let samples: Vec<_> = (0..6).map(|i| sample(i, "h", 30)).collect();
    let plan = planner.plan_columns(&samples, 500.0);
    let sum: f32 = plan.iter().map(|c| c.width_pt).sum();
    assert!(sum <= 500.0 + 1e-3);
    assert!(plan.iter().all(|c| c.width_pt >= MIN_COLUMN_WIDTH - 1e-3));
}

#[test]
fn long_cells_count_for_a_capped_number_of_characters() {
    let planner = ColumnWidthPlanner::new(5.0);
    let capped = planner.estimate(&sample(0, "h", 10_000));
    assert!((capped - MAX_ESTIMATE_CHARS as f32 * 5.0).abs() < 1e-3);
}

#[test]
fn width_hint_replaces_the_estimate() {
    let planner = ColumnWidthPlanner::new(5.0);
    let mut s = sample(0, "h", 30);
    s.width_hint_pt = Some(90.0);
    assert!((planner.estimate(&s) - 90.0).abs() < 1e-3);
    s.width_hint_pt = Some(5.0);
    assert!((planner.estimate(&s) - MIN_COLUMN_WIDTH).abs() < 1e-3);
}

#[test]
fn floor_gives_way_only_when_columns_cannot_fit() {
    let planner = ColumnWidthPlanner::new(5.0);
    let samples: Vec<_> = (0..10).map(|i| sample(i, "h", 20)).collect();
    let plan = planner.plan_columns(&samples, 200.0);
    let sum: f32 = plan.iter().map(|c| c.width_pt).sum();
    assert!(sum <= 200.0 + 1e-3);
    assert!(plan.iter().all(|c| (c.width_pt - 20.0).abs() < 1e-3));
}

#[test]
fn column_letters_follow_spreadsheet_naming() {
    assert_eq!(column_letter(0), "A");
    assert_eq!(column_letter(25), "Z");
    assert_eq!(column_letter(26), "AA");
    assert_eq!(column_letter(27), "AB");
    assert_eq!(column_letter(701), "ZZ");
    assert_eq!(column_letter(702), "AAA");
}

#[test]
fn strips_repeat_the_anchor_column() {
    let strips = partition_strips(20, 8);
    assert_eq!(strips.len(), 3);
    assert_eq!(strips[0], (0..8).collect::<Vec<_>>());
    assert_eq!(strips[1], vec![0, 8, 9, 10, 11, 12, 13, 14]);
    assert_eq!(strips[2], vec![0, 15, 16, 17, 18, 19]);
    assert_eq!(partition_strips(8, 8), vec![(0..8).collect::<Vec<_>>()]);
    assert!(partition_strips(0, 8).is_empty());
}

#[test]
fn words_wrap_greedily() {
    // 5pt per character at 10pt.
    let w = wrap("alpha beta gamma", 55.0, &HalfEm, 10.0, 5);
    assert_eq!(w.lines, vec!["alpha beta", "gamma"]);
    assert!(!w.overflow);

    let w = wrap("alpha beta gamma", 1000.0, &HalfEm, 10.0, 1);
    assert_eq!(w.lines, vec!["alpha beta gamma"]);
}

#[test]
fn explicit_newlines_start_new_lines() {
    let w = wrap("first\nsecond", 1000.0, &HalfEm, 10.0, 3);
    assert_eq!(w.lines, vec!["first", "second"]);
}

#[test]
fn lines_past_the_cap_are_dropped_and_flagged() {
    let w = wrap("one two three four five six", 20.0, &HalfEm, 10.0, 2);
    assert_eq!(w.lines, vec!["one", "two"]);
    assert!(w.overflow);
}

#[test]
fn empty_text_gives_one_empty_line() {
    let w = wrap("", 50.0, &HalfEm, 10.0, 2);
    assert_eq!(w.lines, vec![String::new()]);
    assert!(!w.overflow);
}

#[test]
fn single_long_word_is_truncated_with_ellipsis() {
    let mut arena = FontArena::new();
    let handle = arena.embed_standard(StandardFont::Helvetica).unwrap();
    let font = arena.get(handle).unwrap();

    let word = "Supercalifragilisticexpialidocious";
    let w = wrap(word, 40.0, font, 10.0, 2);
    assert_eq!(w.lines.len(), 1);
    assert!(w.overflow);
    let line = &w.lines[0];
    assert!(line.ends_with(ELLIPSIS));
    assert!(line.len() > ELLIPSIS.len());
    assert!(word.starts_with(line.trim_end_matches(ELLIPSIS)));
    assert!(font.text_width(line, 10.0) <= 40.0);
}

#[test]
fn ellipsis_is_cut_to_columns_narrower_than_it() {
    // Each character is 5pt at 10pt, so the full ellipsis needs 15pt.
    let w = wrap("overflowing", 11.0, &HalfEm, 10.0, 1);
    assert_eq!(w.lines, vec![".."]);
    assert!(w.overflow);

    let w = wrap("overflowing", 4.0, &HalfEm, 10.0, 1);
    assert_eq!(w.lines, vec![""]);
    assert!(w.overflow);
}

#[test]
fn planner_headers_come_from_the_first_row_with_visible_content() {
    let mut table = Table::new(
        "t",
        vec![
            text_row(&["", "", "internal"]),
            text_row(&["Name", "Qty", ""]),
            text_row(&["Apple", "3", ""]),
        ],
    );
    table.column_hints = vec![
        ColumnHint::default(),
        ColumnHint::default(),
        ColumnHint { width_pt: None, hidden: true },
    ];
    let plan = ColumnWidthPlanner::new(5.0).plan(&table, 500.0);
    let headers: Vec<&str> = plan.iter().map(|c| c.header.as_str()).collect();
    assert_eq!(headers, vec!["Name", "Qty"]);
}

fn samples_strategy() -> impl Strategy<Value = Vec<ColumnSample>> {
    prop::collection::vec(("[A-Za-z ]{0,30}", 0usize..120), 1..40).prop_map(|cols| {
        cols.into_iter()
            .enumerate()
            .map(|(i, (header, chars))| sample(i, &header, chars))
            .collect()
    })
}

proptest! {
    #[test]
    fn planned_widths_never_exceed_usable_width(
        samples in samples_strategy(),
        usable in 50.0f32..1200.0,
        glyph in 2.0f32..9.0,
    ) {
        let plan = ColumnWidthPlanner::new(glyph).plan_columns(&samples, usable);
        prop_assert_eq!(plan.len(), samples.len());
        let sum: f32 = plan.iter().map(|c| c.width_pt).sum();
        prop_assert!(sum <= usable + 0.01, "sum {} > usable {}", sum, usable);
        let floor = MIN_COLUMN_WIDTH.min(usable / samples.len() as f32);
        for col in &plan {
            prop_assert!(col.width_pt >= floor - 0.01);
        }
    }

    #[test]
    fn wrapped_lines_respect_cap_and_width(
        text in "[a-z]{1,30}( [a-z]{1,30}){0,20}",
        available in 0.0f32..300.0,
        max_lines in 1usize..6,
    ) {
        let w = wrap(&text, available, &HalfEm, 10.0, max_lines);
        prop_assert!(!w.lines.is_empty());
        prop_assert!(w.lines.len() <= max_lines);
        for line in &w.lines {
            prop_assert!(HalfEm.text_width(line, 10.0) <= available + 5.0);
        }
    }
}
