use std::borrow::Cow;

use chrono::{NaiveDateTime, Timelike};

use crate::error::{Error, Warning};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CellKind {
    String,
    Number,
    Date,
    Boolean,
    Formula,
}

#[derive(Clone, Debug, PartialEq)]
pub enum CellValue {
    Null,
    Text(String),
    Number(f64),
    Date(NaiveDateTime),
}

/// One cell as produced by the upstream parser. Never mutated afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct Cell {
    pub value: CellValue,
    pub kind: CellKind,
}

impl Cell {
    pub fn null() -> Self {
        Cell { value: CellValue::Null, kind: CellKind::String }
    }

    pub fn text(s: impl Into<String>) -> Self {
        Cell { value: CellValue::Text(s.into()), kind: CellKind::String }
    }

    pub fn number(n: f64) -> Self {
        Cell { value: CellValue::Number(n), kind: CellKind::Number }
    }

    pub fn date(d: NaiveDateTime) -> Self {
        Cell { value: CellValue::Date(d), kind: CellKind::Date }
    }

    pub fn boolean(b: bool) -> Self {
        Cell {
            value: CellValue::Number(if b { 1.0 } else { 0.0 }),
            kind: CellKind::Boolean,
        }
    }

    /// A formula cell carrying its last computed value.
    pub fn formula(cached: CellValue) -> Self {
        Cell { value: cached, kind: CellKind::Formula }
    }

    pub fn is_empty(&self) -> bool {
        match &self.value {
            CellValue::Null => true,
            CellValue::Text(s) => s.trim().is_empty(),
            CellValue::Number(_) | CellValue::Date(_) => false,
        }
    }

    /// Number cells are drawn right-aligned.
    pub fn is_numeric(&self) -> bool {
        matches!(self.value, CellValue::Number(_))
            && matches!(self.kind, CellKind::Number | CellKind::Formula)
    }

    pub fn display_text(&self) -> Cow<'_, str> {
        match (&self.value, self.kind) {
            (CellValue::Null, _) => Cow::Borrowed(""),
            (CellValue::Number(n), CellKind::Boolean) => {
                Cow::Borrowed(if *n != 0.0 { "TRUE" } else { "FALSE" })
            }
            (CellValue::Text(s), CellKind::Boolean) => Cow::Owned(s.trim().to_uppercase()),
            (CellValue::Text(s), _) => Cow::Borrowed(s.as_str()),
            (CellValue::Number(n), _) => Cow::Owned(format_number(*n)),
            (CellValue::Date(d), _) => Cow::Owned(format_date(d)),
        }
    }
}

fn format_number(n: f64) -> String {
    if !n.is_finite() {
        return "#NUM!".to_string();
    }
    if n.fract() == 0.0 && n.abs() < 1e15 {
        return format!("{}", n as i64);
    }
    format!("{n}")
}

fn format_date(d: &NaiveDateTime) -> String {
    if d.hour() == 0 && d.minute() == 0 && d.second() == 0 {
        d.format("%Y-%m-%d").to_string()
    } else {
        d.format("%Y-%m-%d %H:%M").to_string()
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Row {
    pub cells: Vec<Cell>,
}

impl Row {
    pub fn new(cells: Vec<Cell>) -> Self {
        Row { cells }
    }

    pub fn cell(&self, col: usize) -> Option<&Cell> {
        self.cells.get(col)
    }
}

impl FromIterator<Cell> for Row {
    fn from_iter<I: IntoIterator<Item = Cell>>(iter: I) -> Self {
        Row { cells: iter.into_iter().collect() }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ColumnHint {
    pub width_pt: Option<f32>,
    pub hidden: bool,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RowHint {
    pub height_pt: Option<f32>,
    pub hidden: bool,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    pub name: String,
    pub rows: Vec<Row>,
    pub column_hints: Vec<ColumnHint>,
    pub row_hints: Vec<RowHint>,
}

impl Table {
    pub fn new(name: impl Into<String>, rows: Vec<Row>) -> Self {
        Table {
            name: name.into(),
            rows,
            column_hints: Vec::new(),
            row_hints: Vec::new(),
        }
    }

    /// Widest row, in cells.
    pub fn column_count(&self) -> usize {
        self.rows.iter().map(|r| r.cells.len()).max().unwrap_or(0)
    }

    pub fn column_hidden(&self, col: usize) -> bool {
        self.column_hints.get(col).is_some_and(|h| h.hidden)
    }

    pub fn row_hidden(&self, row: usize) -> bool {
        self.row_hints.get(row).is_some_and(|h| h.hidden)
    }
}

/// One finished, independently openable document.
#[derive(Clone, Debug)]
pub struct OutputDocument {
    pub name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug)]
pub struct ConversionResult {
    pub success: bool,
    pub outputs: Vec<OutputDocument>,
    pub warnings: Vec<Warning>,
    pub error: Option<Error>,
}

impl ConversionResult {
    pub(crate) fn failed(error: Error, warnings: Vec<Warning>) -> Self {
        ConversionResult {
            success: false,
            outputs: Vec::new(),
            warnings,
            error: Some(error),
        }
    }
}
