use crate::model::{Row, Table};

/// Readability floor for a column, in points.
pub const MIN_COLUMN_WIDTH: f32 = 40.0;
/// Longest cell length, in characters, that counts toward a column estimate.
pub const MAX_ESTIMATE_CHARS: usize = 40;

/// What the planner needs to know about one column.
#[derive(Clone, Debug, PartialEq)]
pub struct ColumnSample {
    pub original_index: usize,
    pub header: String,
    pub max_content_chars: usize,
    /// Caller-provided width, replacing the content estimate.
    pub width_hint_pt: Option<f32>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PlannedColumn {
    /// Position after empty and hidden columns were removed.
    pub index: usize,
    pub original_index: usize,
    pub header: String,
    pub width_pt: f32,
}

pub type ColumnPlan = Vec<PlannedColumn>;

/// Original indices of columns that are visible and hold at least one value.
pub fn surviving_columns(table: &Table) -> Vec<usize> {
    (0..table.column_count())
        .filter(|&col| !table.column_hidden(col))
        .filter(|&col| {
            table
                .rows
                .iter()
                .enumerate()
                .filter(|(ri, _)| !table.row_hidden(*ri))
                .any(|(_, row)| row.cell(col).is_some_and(|c| !c.is_empty()))
        })
        .collect()
}

/// Indices of visible rows holding a value in at least one of `columns`. The
/// first of them is the header row when the table has one.
pub fn content_rows(table: &Table, columns: &[usize]) -> Vec<usize> {
    table
        .rows
        .iter()
        .enumerate()
        .filter(|(ri, row)| {
            !table.row_hidden(*ri)
                && columns.iter().any(|&c| row.cell(c).is_some_and(|cell| !cell.is_empty()))
        })
        .map(|(ri, _)| ri)
        .collect()
}

/// Spreadsheet-style column name: 0 -> "A", 25 -> "Z", 26 -> "AA".
pub fn column_letter(index: usize) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

pub struct ColumnWidthPlanner {
    pub average_glyph_width_pt: f32,
    pub min_width_pt: f32,
    /// Horizontal cell padding added to every content estimate.
    pub padding_pt: f32,
}

impl ColumnWidthPlanner {
    pub fn new(average_glyph_width_pt: f32) -> Self {
        ColumnWidthPlanner {
            average_glyph_width_pt,
            min_width_pt: MIN_COLUMN_WIDTH,
            padding_pt: 0.0,
        }
    }

    pub fn with_padding(mut self, padding_pt: f32) -> Self {
        self.padding_pt = padding_pt;
        self
    }

    pub fn estimate(&self, sample: &ColumnSample) -> f32 {
        let raw = sample.width_hint_pt.unwrap_or_else(|| {
            let chars = sample
                .header
                .chars()
                .count()
                .max(sample.max_content_chars)
                .min(MAX_ESTIMATE_CHARS);
            chars as f32 * self.average_glyph_width_pt + self.padding_pt
        });
        raw.max(self.min_width_pt)
    }

    /// Plan every surviving column of `table`. The first content row supplies
    /// the headers; the rest is content.
    pub fn plan(&self, table: &Table, usable_width_pt: f32) -> ColumnPlan {
        let columns = surviving_columns(table);
        let visible: Vec<&Row> = content_rows(table, &columns)
            .into_iter()
            .map(|ri| &table.rows[ri])
            .collect();
        let samples: Vec<ColumnSample> = columns
            .into_iter()
            .map(|col| {
                let header = visible
                    .first()
                    .and_then(|r| r.cell(col))
                    .map(|c| c.display_text().into_owned())
                    .unwrap_or_default();
                let max_content_chars = visible
                    .iter()
                    .skip(1)
                    .filter_map(|r| r.cell(col))
                    .map(|c| longest_line_chars(&c.display_text()))
                    .max()
                    .unwrap_or(0);
                ColumnSample {
                    original_index: col,
                    header,
                    max_content_chars,
                    width_hint_pt: table.column_hints.get(col).and_then(|h| h.width_pt),
                }
            })
            .collect();
        self.plan_columns(&samples, usable_width_pt)
    }

    /// Fit `samples` to `usable_width_pt`: shrink proportionally when too wide,
    /// share the surplus evenly when too narrow. The sum never exceeds the
    /// usable width; the floor gives way only when `n * floor` alone would.
    pub fn plan_columns(&self, samples: &[ColumnSample], usable_width_pt: f32) -> ColumnPlan {
        if samples.is_empty() {
            return Vec::new();
        }
        let n = samples.len() as f32;
        let mut widths: Vec<f32> = samples.iter().map(|s| self.estimate(s)).collect();
        let total: f32 = widths.iter().sum();

        if total > usable_width_pt {
            let floor = self.min_width_pt.min(usable_width_pt / n);
            let scale = usable_width_pt / total;
            for w in &mut widths {
                *w = (*w * scale).max(floor);
            }
            // The floor may push the sum back over; take the excess from the
            // share of each column above the floor.
            let sum: f32 = widths.iter().sum();
            let excess = sum - usable_width_pt;
            if excess > 0.0 {
                let above: f32 = widths.iter().map(|w| w - floor).sum();
                if above > 0.0 {
                    let ratio = (excess / above).min(1.0);
                    for w in &mut widths {
                        *w -= (*w - floor) * ratio;
                    }
                }
            }
        } else if total < usable_width_pt {
            let surplus = (usable_width_pt - total) / n;
            for w in &mut widths {
                *w += surplus;
            }
        }

        samples
            .iter()
            .zip(widths)
            .enumerate()
            .map(|(index, (sample, width_pt))| PlannedColumn {
                index,
                original_index: sample.original_index,
                header: sample.header.clone(),
                width_pt,
            })
            .collect()
    }
}

pub(crate) fn longest_line_chars(text: &str) -> usize {
    text.lines().map(|l| l.trim().chars().count()).max().unwrap_or(0)
}
