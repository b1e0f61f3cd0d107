use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};

use crate::error::Error;
use crate::model::{Cell, Row, Table};

/// Pick the likeliest field separator from the first line: tab, semicolon or comma.
pub fn detect_delimiter(text: &str) -> char {
    let first = text.lines().next().unwrap_or("");
    [('\t', 0usize), (';', 1), (',', 2)]
        .into_iter()
        .map(|(d, rank)| (d, first.matches(d).count(), rank))
        .filter(|(_, count, _)| *count > 0)
        .max_by_key(|(_, count, rank)| (*count, std::cmp::Reverse(*rank)))
        .map(|(d, _, _)| d)
        .unwrap_or(',')
}

/// Split delimited text into records. Quoted fields may contain the delimiter,
/// doubled quotes and line breaks.
pub fn parse_records(text: &str, delimiter: char) -> Vec<Vec<String>> {
    let text = text.strip_prefix('\u{FEFF}').unwrap_or(text);
    let mut records = Vec::new();
    let mut record: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut field_started = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                c => field.push(c),
            }
            continue;
        }
        match c {
            '"' if !field_started => {
                in_quotes = true;
                field_started = true;
            }
            c if c == delimiter => {
                record.push(std::mem::take(&mut field));
                field_started = false;
            }
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' | '\r' => {
                record.push(std::mem::take(&mut field));
                records.push(std::mem::take(&mut record));
                field_started = false;
            }
            c => {
                field.push(c);
                field_started = true;
            }
        }
    }
    if field_started || !field.is_empty() || !record.is_empty() {
        record.push(field);
        records.push(record);
    }
    records
}

fn looks_numeric(s: &str) -> bool {
    let digits = s.trim_start_matches(['+', '-']);
    let leading_zero_id = digits.len() > 1 && digits.starts_with('0') && !digits.starts_with("0.");
    !leading_zero_id
        && digits.chars().any(|c| c.is_ascii_digit())
        && s.chars().all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'))
}

fn parse_date(s: &str) -> Option<NaiveDateTime> {
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Cell for one raw field: numbers, `TRUE`/`FALSE` and ISO dates are typed,
/// everything else stays text.
pub fn infer_cell(field: &str) -> Cell {
    let trimmed = field.trim();
    if trimmed.is_empty() {
        return Cell::null();
    }
    if trimmed.eq_ignore_ascii_case("true") {
        return Cell::boolean(true);
    }
    if trimmed.eq_ignore_ascii_case("false") {
        return Cell::boolean(false);
    }
    if looks_numeric(trimmed)
        && let Ok(n) = trimmed.parse::<f64>()
    {
        return Cell::number(n);
    }
    if let Some(d) = parse_date(trimmed) {
        return Cell::date(d);
    }
    Cell::text(field)
}

pub fn read_delimited(name: &str, text: &str, delimiter: char) -> Table {
    let rows = parse_records(text, delimiter)
        .into_iter()
        .map(|record| record.iter().map(|f| infer_cell(f)).collect::<Row>())
        .collect();
    Table::new(name, rows)
}

/// One row per non-blank line, in a single text column.
pub fn from_paragraphs(name: &str, text: &str) -> Table {
    let rows = text
        .lines()
        .map(str::trim_end)
        .filter(|l| !l.trim().is_empty())
        .map(|l| Row::new(vec![Cell::text(l)]))
        .collect();
    Table::new(name, rows)
}

/// Read a `.csv`, `.tsv` or plain text file into a table named after the file.
pub fn read_file(path: &Path, delimiter: Option<char>) -> Result<Table, Error> {
    let text = std::fs::read_to_string(path)?;
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "table".to_string());
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    let table = match (ext.as_deref(), delimiter) {
        (_, Some(d)) => read_delimited(&name, &text, d),
        (Some("tsv" | "tab"), None) => read_delimited(&name, &text, '\t'),
        (Some("csv"), None) => read_delimited(&name, &text, detect_delimiter(&text)),
        _ => from_paragraphs(&name, &text),
    };
    log::debug!(
        "Read {}: {} rows, {} columns",
        path.display(),
        table.rows.len(),
        table.column_count()
    );
    Ok(table)
}
