use std::collections::{BTreeSet, HashSet};

use crate::columns::{
    ColumnSample, ColumnWidthPlanner, PlannedColumn, column_letter, content_rows,
    longest_line_chars, surviving_columns,
};
use crate::error::{Error, Warning};
use crate::fonts::{
    EmbeddedFont, FontArena, FontHandle, TextEncoder, TextMeasure, UnencodableChar,
};
use crate::model::Table;
use crate::options::{LayoutOptions, PageGeometry, WideTableStrategy};
use crate::resolver::ResolvedFont;
use crate::script::Script;
use crate::translit::{self, PLACEHOLDER};
use crate::wrap::{self, ELLIPSIS, Wrapped};

const CELL_PAD_X: f32 = 3.0;
const CELL_PAD_Y: f32 = 2.0;
const TITLE_SCALE: f32 = 1.2;
const TITLE_GAP: f32 = 4.0;
const HEADER_FILL_GRAY: f32 = 0.88;
const HEADER_RULE_WIDTH: f32 = 0.75;
const ROW_RULE_WIDTH: f32 = 0.25;
const ROW_RULE_GRAY: f32 = 0.7;
/// The `Scale` strategy never shrinks below half the configured size, nor below 4pt.
const MIN_SCALE: f32 = 0.5;
const MIN_SCALED_FONT: f32 = 4.0;
const FOOTER_SCALE: f32 = 0.8;

/// Where the next row goes. One per page; replaced, never carried over.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageCursor {
    pub y: f32,
    pub page: usize,
    pub rows_on_page: usize,
}

impl PageCursor {
    fn at_top(geometry: &PageGeometry, page: usize) -> Self {
        PageCursor { y: geometry.top_y(), page, rows_on_page: 0 }
    }

    fn fits(&self, height: f32, bottom: f32) -> bool {
        self.y - height >= bottom
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StripState {
    Idle,
    HeaderDrawn { next_row: usize },
    BodyRow(usize),
    PageBreak { pending_row: usize },
    Done,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TextRun {
    pub x: f32,
    /// Baseline.
    pub y: f32,
    pub size: f32,
    pub font: FontHandle,
    pub text: String,
    /// Already encoded for `font`.
    pub bytes: Vec<u8>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    Text(TextRun),
    Fill { x: f32, y: f32, width: f32, height: f32, gray: f32 },
    Rule { x1: f32, y1: f32, x2: f32, y2: f32, width: f32, gray: f32 },
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ComposedPage {
    pub ops: Vec<DrawOp>,
}

impl ComposedPage {
    pub fn text_runs(&self) -> impl Iterator<Item = &TextRun> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text(run) => Some(run),
            _ => None,
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ComposedDocument {
    pub width: f32,
    pub height: f32,
    pub pages: Vec<ComposedPage>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StripLayout {
    pub columns: Vec<PlannedColumn>,
    pub body_rows: usize,
    pub first_page: usize,
    pub last_page: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TableLayout {
    pub name: String,
    pub font_size_pt: f32,
    pub strips: Vec<StripLayout>,
}

pub struct Composition {
    pub document: ComposedDocument,
    pub tables: Vec<TableLayout>,
    pub warnings: Vec<Warning>,
}

/// Split `column_count` column positions into strips of at most `threshold`.
/// Every strip after the first leads with column 0.
pub fn partition_strips(column_count: usize, threshold: usize) -> Vec<Vec<usize>> {
    if column_count == 0 {
        return Vec::new();
    }
    let threshold = threshold.max(2);
    if column_count <= threshold {
        return vec![(0..column_count).collect()];
    }
    let mut strips = vec![(0..threshold).collect::<Vec<_>>()];
    let mut next = threshold;
    while next < column_count {
        let end = (next + threshold - 1).min(column_count);
        let mut strip = Vec::with_capacity(end - next + 1);
        strip.push(0);
        strip.extend(next..end);
        strips.push(strip);
        next = end;
    }
    strips
}

struct PreparedCell {
    text: String,
    numeric: bool,
}

struct PreparedRow {
    cells: Vec<PreparedCell>,
    min_height: Option<f32>,
}

/// A table reduced to its surviving columns and rows, text ready for the font.
struct PreparedTable {
    name: String,
    /// `name`, ready for the font.
    title: String,
    columns: Vec<usize>,
    headers: Vec<String>,
    width_hints: Vec<Option<f32>>,
    rows: Vec<PreparedRow>,
    /// Scripts the font had no glyphs for, transliterated instead.
    uncovered: BTreeSet<Script>,
}

impl PreparedTable {
    fn samples(&self, positions: &[usize]) -> Vec<ColumnSample> {
        positions
            .iter()
            .map(|&pos| ColumnSample {
                original_index: self.columns[pos],
                header: self.headers[pos].clone(),
                max_content_chars: self
                    .rows
                    .iter()
                    .map(|r| longest_line_chars(&r.cells[pos].text))
                    .max()
                    .unwrap_or(0),
                width_hint_pt: self.width_hints[pos],
            })
            .collect()
    }
}

struct RowLayout {
    height: f32,
    cells: Vec<Wrapped>,
}

/// Text the font can draw: lines it cannot encode go through the transliterator,
/// or every line does when the font was chosen as a transliterating fallback.
/// Scripts other than Latin that the font left uncovered go into `uncovered`.
fn prepare_text(
    font: &EmbeddedFont,
    transliterate_all: bool,
    text: &str,
    uncovered: &mut BTreeSet<Script>,
) -> String {
    let mut lines = Vec::new();
    for line in text.split('\n') {
        let line = line.trim_end_matches('\r');
        if transliterate_all {
            lines.push(translit::transliterate(line).into_owned());
        } else if font.can_encode(line) {
            lines.push(line.to_string());
        } else {
            uncovered.extend(
                line.chars()
                    .filter(|&c| !font.can_encode_char(c))
                    .filter_map(Script::of)
                    .filter(|&script| script != Script::Latin),
            );
            lines.push(translit::transliterate(line).into_owned());
        }
    }
    lines.join("\n")
}

/// What [`encode_or_substitute`] settled on for one piece of text.
#[derive(Clone, Debug, PartialEq)]
pub enum Encoded {
    Direct(Vec<u8>),
    /// The font had no glyph for `missing`; `text` is the transliteration drawn instead.
    Transliterated { text: String, bytes: Vec<u8>, missing: char },
    /// Neither the text nor its transliteration could be encoded. `bytes` is
    /// `None` when the font cannot draw [`PLACEHOLDER`] either.
    Placeholder { bytes: Option<Vec<u8>> },
}

/// Encode `text`; on failure transliterate and retry once, then fall back to
/// [`PLACEHOLDER`].
pub fn encode_or_substitute(font: &mut dyn TextEncoder, text: &str) -> Encoded {
    let missing = match font.encode(text) {
        Ok(bytes) => return Encoded::Direct(bytes),
        Err(UnencodableChar(c)) => c,
    };
    let retried = translit::transliterate(text);
    if let Ok(bytes) = font.encode(&retried) {
        return Encoded::Transliterated { text: retried.into_owned(), bytes, missing };
    }
    Encoded::Placeholder { bytes: font.encode(&PLACEHOLDER.to_string()).ok() }
}

/// Lays tables out on pages for one document, drawing with one resolved font.
pub struct Compositor<'a> {
    arena: &'a mut FontArena,
    font: ResolvedFont,
    options: &'a LayoutOptions,
    geometry: PageGeometry,
    pages: Vec<ComposedPage>,
    tables: Vec<TableLayout>,
    warnings: Vec<Warning>,
}

impl<'a> Compositor<'a> {
    /// Fails with [`Error::ForeignFontHandle`] when `font` was resolved for another arena.
    pub fn new(
        arena: &'a mut FontArena,
        font: ResolvedFont,
        options: &'a LayoutOptions,
    ) -> Result<Self, Error> {
        arena.get(font.handle)?;
        Ok(Compositor {
            geometry: options.geometry(),
            arena,
            font,
            options,
            pages: Vec::new(),
            tables: Vec::new(),
            warnings: Vec::new(),
        })
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Lay out `table` starting on a fresh page. Returns false when the table had
    /// nothing to show and was skipped with a warning.
    pub fn compose_table(&mut self, table: &Table) -> Result<bool, Error> {
        let Some(prepared) = self.prepare(table)? else {
            log::warn!("Table \"{}\" has no non-empty rows or columns, skipping", table.name);
            self.warnings.push(Warning::NoSelectableContent { table: table.name.clone() });
            return Ok(false);
        };

        for &script in &prepared.uncovered {
            log::warn!(
                "Table \"{}\": {} has no {script} glyphs, transliterating",
                prepared.name,
                self.font.display_name
            );
            self.warnings.push(Warning::UncoveredScript {
                table: prepared.name.clone(),
                script,
                font: self.font.display_name.clone(),
            });
        }

        let size = self.table_font_size(&prepared)?;
        let n = prepared.columns.len();
        let cap = self.max_columns_per_strip(size)?;
        let groups = match self.options.wide_table_strategy {
            WideTableStrategy::Strip => partition_strips(n, self.options.strip_threshold().min(cap)),
            WideTableStrategy::Scale | WideTableStrategy::Overflow if n > cap => {
                log::warn!(
                    "Table \"{}\": {n} columns cannot share one page width, splitting into strips of {cap}",
                    prepared.name
                );
                partition_strips(n, cap)
            }
            WideTableStrategy::Scale | WideTableStrategy::Overflow => vec![(0..n).collect()],
        };

        let mut overflowed: HashSet<(Option<usize>, usize)> = HashSet::new();
        let mut strips = Vec::with_capacity(groups.len());
        for (k, group) in groups.iter().enumerate() {
            let strip = self.compose_strip(&prepared, group, k, groups.len(), size, &mut overflowed)?;
            strips.push(strip);
        }

        if !overflowed.is_empty() {
            log::warn!(
                "Table \"{}\": {} cell(s) truncated to fit",
                prepared.name,
                overflowed.len()
            );
            self.warnings.push(Warning::LayoutOverflow {
                table: prepared.name.clone(),
                cells: overflowed.len(),
            });
        }
        log::info!(
            "Table \"{}\": {} columns, {} rows, {} strip(s), {:.1}pt text",
            prepared.name,
            prepared.columns.len(),
            prepared.rows.len(),
            strips.len(),
            size
        );
        self.tables.push(TableLayout { name: prepared.name, font_size_pt: size, strips });
        Ok(true)
    }

    /// Add page-number footers and hand back everything composed so far.
    pub fn finish(mut self) -> Result<Composition, Error> {
        if self.options.page_numbers {
            self.draw_page_numbers()?;
        }
        Ok(Composition {
            document: ComposedDocument {
                width: self.geometry.width,
                height: self.geometry.height,
                pages: self.pages,
            },
            tables: self.tables,
            warnings: self.warnings,
        })
    }

    fn prepare(&self, table: &Table) -> Result<Option<PreparedTable>, Error> {
        let columns = surviving_columns(table);
        if columns.is_empty() {
            return Ok(None);
        }
        let mut row_indices = content_rows(table, &columns);
        if row_indices.is_empty() {
            return Ok(None);
        }
        let font = self.arena.get(self.font.handle)?;
        let transliterate_all = self.font.requires_transliteration;
        let mut uncovered = BTreeSet::new();

        let headers: Vec<String> = if self.options.first_row_is_header {
            let header_row = &table.rows[row_indices.remove(0)];
            let mut headers = Vec::with_capacity(columns.len());
            for &c in &columns {
                let text = match header_row.cell(c) {
                    Some(cell) => {
                        prepare_text(font, transliterate_all, &cell.display_text(), &mut uncovered)
                    }
                    None => String::new(),
                };
                headers.push(text);
            }
            headers
        } else {
            columns.iter().map(|&c| column_letter(c)).collect()
        };

        let mut rows = Vec::with_capacity(row_indices.len());
        for ri in row_indices {
            let row = &table.rows[ri];
            let mut cells = Vec::with_capacity(columns.len());
            for &c in &columns {
                cells.push(match row.cell(c) {
                    Some(cell) => PreparedCell {
                        text: prepare_text(
                            font,
                            transliterate_all,
                            &cell.display_text(),
                            &mut uncovered,
                        ),
                        numeric: cell.is_numeric(),
                    },
                    None => PreparedCell { text: String::new(), numeric: false },
                });
            }
            rows.push(PreparedRow {
                cells,
                min_height: table.row_hints.get(ri).and_then(|h| h.height_pt),
            });
        }
        let title = prepare_text(font, transliterate_all, &table.name, &mut uncovered);

        Ok(Some(PreparedTable {
            name: table.name.clone(),
            title,
            width_hints: columns
                .iter()
                .map(|&c| table.column_hints.get(c).and_then(|h| h.width_pt))
                .collect(),
            columns,
            headers,
            rows,
            uncovered,
        }))
    }

    /// Columns that fit side by side while each still holds its padding and an ellipsis.
    fn max_columns_per_strip(&self, size: f32) -> Result<usize, Error> {
        let font = self.arena.get(self.font.handle)?;
        let narrowest = 2.0 * CELL_PAD_X + font.text_width(ELLIPSIS, size);
        Ok(((self.geometry.usable_width() / narrowest).floor() as usize).max(1))
    }

    fn planner(&self, size: f32) -> Result<ColumnWidthPlanner, Error> {
        let font = self.arena.get(self.font.handle)?;
        let average = font.average_advance_1000() * size / 1000.0;
        Ok(ColumnWidthPlanner::new(average).with_padding(2.0 * CELL_PAD_X))
    }

    fn table_font_size(&self, table: &PreparedTable) -> Result<f32, Error> {
        let base = self.options.font_size_pt;
        if self.options.wide_table_strategy != WideTableStrategy::Scale {
            return Ok(base);
        }
        let planner = self.planner(base)?;
        let all: Vec<usize> = (0..table.columns.len()).collect();
        let estimated: f32 = table.samples(&all).iter().map(|s| planner.estimate(s)).sum();
        let usable = self.geometry.usable_width();
        if estimated <= usable {
            return Ok(base);
        }
        let scaled = (base * usable / estimated).max(base * MIN_SCALE).max(MIN_SCALED_FONT);
        log::debug!("Table \"{}\": scaling text {base}pt -> {scaled:.2}pt", table.name);
        Ok(scaled.min(base))
    }

    fn compose_strip(
        &mut self,
        table: &PreparedTable,
        group: &[usize],
        index: usize,
        count: usize,
        size: f32,
        overflowed: &mut HashSet<(Option<usize>, usize)>,
    ) -> Result<StripLayout, Error> {
        let columns = self
            .planner(size)?
            .plan_columns(&table.samples(group), self.geometry.usable_width());
        let header_texts: Vec<&str> = group.iter().map(|&pos| table.headers[pos].as_str()).collect();
        let header = self.layout_cells(&header_texts, &columns, size, None)?;
        for (col, cell) in columns.iter().zip(&header.cells) {
            if cell.overflow {
                overflowed.insert((None, col.original_index));
            }
        }
        let title = match count {
            1 => table.title.clone(),
            _ => format!("{} (part {} of {})", table.title, index + 1, count),
        };

        let first_page = self.pages.len();
        let mut cursor = self.new_page();
        let mut body_rows = 0usize;
        let mut state = StripState::Idle;

        loop {
            state = match state {
                StripState::Idle => {
                    if self.options.include_table_title {
                        self.draw_title(&mut cursor, &title, size)?;
                    }
                    self.draw_header(&mut cursor, &columns, &header, size, &table.name)?;
                    StripState::HeaderDrawn { next_row: 0 }
                }
                StripState::HeaderDrawn { next_row } => {
                    if next_row < table.rows.len() {
                        StripState::BodyRow(next_row)
                    } else {
                        StripState::Done
                    }
                }
                StripState::BodyRow(n) => {
                    let row = &table.rows[n];
                    let texts: Vec<&str> =
                        group.iter().map(|&pos| row.cells[pos].text.as_str()).collect();
                    let layout = self.layout_cells(&texts, &columns, size, row.min_height)?;

                    if cursor.rows_on_page > 0
                        && !cursor.fits(layout.height, self.geometry.bottom_y())
                    {
                        StripState::PageBreak { pending_row: n }
                    } else {
                        for (col, cell) in columns.iter().zip(&layout.cells) {
                            if cell.overflow {
                                overflowed.insert((Some(n), col.original_index));
                            }
                        }
                        let numeric: Vec<bool> =
                            group.iter().map(|&pos| row.cells[pos].numeric).collect();
                        self.draw_row(&mut cursor, &columns, &layout, &numeric, size, &table.name)?;
                        body_rows += 1;
                        if n + 1 < table.rows.len() {
                            StripState::BodyRow(n + 1)
                        } else {
                            StripState::Done
                        }
                    }
                }
                StripState::PageBreak { pending_row } => {
                    log::debug!(
                        "Table \"{}\" strip {}: page break before row {pending_row} at y={:.2}",
                        table.name,
                        index + 1,
                        cursor.y
                    );
                    cursor = self.new_page();
                    self.draw_header(&mut cursor, &columns, &header, size, &table.name)?;
                    StripState::HeaderDrawn { next_row: pending_row }
                }
                StripState::Done => break,
            };
        }

        let last_page = self.pages.len().saturating_sub(1);
        log::debug!(
            "Table \"{}\" strip {}/{count}: {} columns, {body_rows} rows, pages {}..={}",
            table.name,
            index + 1,
            columns.len(),
            first_page + 1,
            last_page + 1
        );
        Ok(StripLayout { columns, body_rows, first_page, last_page })
    }

    fn new_page(&mut self) -> PageCursor {
        self.pages.push(ComposedPage::default());
        PageCursor::at_top(&self.geometry, self.pages.len() - 1)
    }

    fn push_op(&mut self, op: DrawOp) {
        if let Some(page) = self.pages.last_mut() {
            page.ops.push(op);
        }
    }

    fn layout_cells(
        &self,
        texts: &[&str],
        columns: &[PlannedColumn],
        size: f32,
        min_height: Option<f32>,
    ) -> Result<RowLayout, Error> {
        let font = self.arena.get(self.font.handle)?;
        let max_lines = self.options.max_lines_per_cell;
        let cells: Vec<Wrapped> = texts
            .iter()
            .zip(columns)
            .map(|(text, col)| {
                let available = (col.width_pt - 2.0 * CELL_PAD_X).max(0.0);
                wrap::wrap(text, available, font, size, max_lines)
            })
            .collect();
        let lines = cells.iter().map(|c| c.lines.len()).max().unwrap_or(1);
        let height = lines as f32 * font.line_height(size) + 2.0 * CELL_PAD_Y;
        Ok(RowLayout { height: height.max(min_height.unwrap_or(0.0)), cells })
    }

    fn draw_title(&mut self, cursor: &mut PageCursor, title: &str, size: f32) -> Result<(), Error> {
        let title_size = size * TITLE_SCALE;
        let (line, ascent, line_h) = {
            let font = self.arena.get(self.font.handle)?;
            let wrapped = wrap::wrap(title, self.geometry.usable_width(), font, title_size, 1);
            let line = wrapped.lines.into_iter().next().unwrap_or_default();
            (line, font.ascent(title_size), font.line_height(title_size))
        };
        if line.trim().is_empty() {
            return Ok(());
        }
        let x = self.geometry.margins.left;
        self.draw_text(x, cursor.y - ascent, title_size, &line, title)?;
        cursor.y -= line_h + TITLE_GAP;
        Ok(())
    }

    fn draw_header(
        &mut self,
        cursor: &mut PageCursor,
        columns: &[PlannedColumn],
        header: &RowLayout,
        size: f32,
        table: &str,
    ) -> Result<(), Error> {
        let left = self.geometry.margins.left;
        let width: f32 = columns.iter().map(|c| c.width_pt).sum();
        let bottom = cursor.y - header.height;
        self.push_op(DrawOp::Fill {
            x: left,
            y: bottom,
            width,
            height: header.height,
            gray: HEADER_FILL_GRAY,
        });
        let numeric = vec![false; columns.len()];
        self.draw_cells(cursor.y, columns, header, &numeric, size, table)?;
        self.push_op(DrawOp::Rule {
            x1: left,
            y1: bottom,
            x2: left + width,
            y2: bottom,
            width: HEADER_RULE_WIDTH,
            gray: 0.0,
        });
        cursor.y = bottom;
        Ok(())
    }

    fn draw_row(
        &mut self,
        cursor: &mut PageCursor,
        columns: &[PlannedColumn],
        layout: &RowLayout,
        numeric: &[bool],
        size: f32,
        table: &str,
    ) -> Result<(), Error> {
        let left = self.geometry.margins.left;
        let width: f32 = columns.iter().map(|c| c.width_pt).sum();
        let bottom = cursor.y - layout.height;
        self.draw_cells(cursor.y, columns, layout, numeric, size, table)?;
        self.push_op(DrawOp::Rule {
            x1: left,
            y1: bottom,
            x2: left + width,
            y2: bottom,
            width: ROW_RULE_WIDTH,
            gray: ROW_RULE_GRAY,
        });
        cursor.y = bottom;
        cursor.rows_on_page += 1;
        Ok(())
    }

    fn draw_cells(
        &mut self,
        row_top: f32,
        columns: &[PlannedColumn],
        layout: &RowLayout,
        numeric: &[bool],
        size: f32,
        table: &str,
    ) -> Result<(), Error> {
        let (ascent, line_h) = {
            let font = self.arena.get(self.font.handle)?;
            (font.ascent(size), font.line_height(size))
        };
        let mut x = self.geometry.margins.left;
        for ((col, cell), &right_align) in columns.iter().zip(&layout.cells).zip(numeric) {
            let mut baseline = row_top - CELL_PAD_Y - ascent;
            for line in &cell.lines {
                if !line.is_empty() {
                    let tx = if right_align {
                        let w = self.arena.get(self.font.handle)?.text_width(line, size);
                        (x + col.width_pt - CELL_PAD_X - w).max(x + CELL_PAD_X)
                    } else {
                        x + CELL_PAD_X
                    };
                    self.draw_text(tx, baseline, size, line, table)?;
                }
                baseline -= line_h;
            }
            x += col.width_pt;
        }
        Ok(())
    }

    fn draw_text(&mut self, x: f32, y: f32, size: f32, text: &str, table: &str) -> Result<(), Error> {
        if let Some((text, bytes)) = self.encode_text(text, table)? {
            let font = self.font.handle;
            self.push_op(DrawOp::Text(TextRun { x, y, size, font, text, bytes }));
        }
        Ok(())
    }

    fn encode_text(&mut self, text: &str, table: &str) -> Result<Option<(String, Vec<u8>)>, Error> {
        let font = self.arena.get_mut(self.font.handle)?;
        match encode_or_substitute(&mut *font, text) {
            Encoded::Direct(bytes) => Ok(Some((text.to_string(), bytes))),
            Encoded::Transliterated { text: retried, bytes, missing } => {
                log::warn!(
                    "{} has no glyph for U+{:04X}; drew \"{retried}\" instead",
                    font.display_name(),
                    missing as u32
                );
                Ok(Some((retried, bytes)))
            }
            Encoded::Placeholder { bytes } => {
                log::warn!("Could not draw \"{text}\" in table \"{table}\"; substituted placeholder");
                self.warnings.push(Warning::CellEncoding {
                    table: table.to_string(),
                    text: text.to_string(),
                });
                Ok(bytes.map(|bytes| (PLACEHOLDER.to_string(), bytes)))
            }
        }
    }

    fn draw_page_numbers(&mut self) -> Result<(), Error> {
        let size = (self.options.font_size_pt * FOOTER_SCALE).max(MIN_SCALED_FONT);
        let total = self.pages.len();
        let y = (self.geometry.margins.bottom * 0.5 - size * 0.35).max(1.0);
        for i in 0..total {
            let label = format!("Page {} of {}", i + 1, total);
            let font = self.arena.get_mut(self.font.handle)?;
            let bytes = match font.encode(&label) {
                Ok(bytes) => bytes,
                Err(UnencodableChar(c)) => {
                    log::warn!("Page numbers skipped: {} cannot draw {c:?}", font.display_name());
                    return Ok(());
                }
            };
            let x = (self.geometry.width - font.text_width(&label, size)) / 2.0;
            self.pages[i].ops.push(DrawOp::Text(TextRun {
                x,
                y,
                size,
                font: self.font.handle,
                text: label,
                bytes,
            }));
        }
        Ok(())
    }
}
