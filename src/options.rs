use chrono::NaiveDateTime;

use crate::columns::MIN_COLUMN_WIDTH;
use crate::error::Error;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PageSize {
    A3,
    A4,
    A5,
    Letter,
    Legal,
    Tabloid,
    Custom { width_pt: f32, height_pt: f32 },
}

impl PageSize {
    /// Portrait (width, height) in points.
    pub fn dimensions(self) -> (f32, f32) {
        match self {
            PageSize::A3 => (841.89, 1190.55),
            PageSize::A4 => (595.28, 841.89),
            PageSize::A5 => (419.53, 595.28),
            PageSize::Letter => (612.0, 792.0),
            PageSize::Legal => (612.0, 1008.0),
            PageSize::Tabloid => (792.0, 1224.0),
            PageSize::Custom { width_pt, height_pt } => (width_pt, height_pt),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Orientation {
    Portrait,
    Landscape,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Margins {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Margins {
    pub fn uniform(pt: f32) -> Self {
        Margins { top: pt, right: pt, bottom: pt, left: pt }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WideTableStrategy {
    /// Keep every column on one page and shrink the font to fit.
    Scale,
    /// Split columns into strips, each anchored by the first column.
    Strip,
    /// Keep every column on one page at the configured font size.
    Overflow,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputGrouping {
    SingleDocument,
    OnePerTable,
}

/// Column counts above which a table is split into strips.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StripThresholds {
    pub portrait: usize,
    pub landscape: usize,
}

impl Default for StripThresholds {
    fn default() -> Self {
        StripThresholds { portrait: 8, landscape: 12 }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CreationDate {
    Now,
    At(NaiveDateTime),
    Omit,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DocumentMetadata {
    /// Falls back to the first table's name.
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub creation_date: CreationDate,
}

impl Default for DocumentMetadata {
    fn default() -> Self {
        DocumentMetadata {
            title: None,
            author: None,
            subject: None,
            creation_date: CreationDate::Now,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LayoutOptions {
    pub page_size: PageSize,
    pub orientation: Orientation,
    pub font_size_pt: f32,
    pub margins: Margins,
    pub include_table_title: bool,
    pub wide_table_strategy: WideTableStrategy,
    pub output_grouping: OutputGrouping,
    pub first_row_is_header: bool,
    pub max_lines_per_cell: usize,
    pub strip_thresholds: StripThresholds,
    pub page_numbers: bool,
    pub metadata: DocumentMetadata,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        LayoutOptions {
            page_size: PageSize::A4,
            orientation: Orientation::Portrait,
            font_size_pt: 10.0,
            margins: Margins::uniform(36.0),
            include_table_title: true,
            wide_table_strategy: WideTableStrategy::Strip,
            output_grouping: OutputGrouping::SingleDocument,
            first_row_is_header: true,
            max_lines_per_cell: 2,
            strip_thresholds: StripThresholds::default(),
            page_numbers: true,
            metadata: DocumentMetadata::default(),
        }
    }
}

const MIN_FONT_SIZE: f32 = 4.0;
const MAX_FONT_SIZE: f32 = 72.0;
const MIN_TEXT_LINES_PER_PAGE: f32 = 4.0;

impl LayoutOptions {
    pub fn geometry(&self) -> PageGeometry {
        let (w, h) = self.page_size.dimensions();
        let (width, height) = match self.orientation {
            Orientation::Portrait => (w, h),
            Orientation::Landscape => (h, w),
        };
        PageGeometry { width, height, margins: self.margins }
    }

    pub fn strip_threshold(&self) -> usize {
        match self.orientation {
            Orientation::Portrait => self.strip_thresholds.portrait,
            Orientation::Landscape => self.strip_thresholds.landscape,
        }
    }

    pub fn validate(&self) -> Result<(), Error> {
        let invalid = |msg: String| Err(Error::InvalidOptions(msg));

        let (w, h) = self.page_size.dimensions();
        if !(w.is_finite() && h.is_finite()) || w <= 0.0 || h <= 0.0 {
            return invalid(format!("page size {w}x{h}pt is not a positive size"));
        }
        if !self.font_size_pt.is_finite()
            || !(MIN_FONT_SIZE..=MAX_FONT_SIZE).contains(&self.font_size_pt)
        {
            return invalid(format!(
                "font size {}pt is outside {MIN_FONT_SIZE}..={MAX_FONT_SIZE}pt",
                self.font_size_pt
            ));
        }
        let m = &self.margins;
        for (side, v) in [("top", m.top), ("right", m.right), ("bottom", m.bottom), ("left", m.left)] {
            if !v.is_finite() || v < 0.0 {
                return invalid(format!("{side} margin {v}pt must be a non-negative number"));
            }
        }
        let geo = self.geometry();
        if geo.usable_width() < MIN_COLUMN_WIDTH {
            return invalid(format!(
                "left and right margins leave {:.1}pt of usable width",
                geo.usable_width()
            ));
        }
        let min_height = self.font_size_pt * 1.2 * MIN_TEXT_LINES_PER_PAGE;
        if geo.usable_height() < min_height {
            return invalid(format!(
                "top and bottom margins leave {:.1}pt of usable height, need {min_height:.1}pt",
                geo.usable_height()
            ));
        }
        if self.max_lines_per_cell == 0 {
            return invalid("max_lines_per_cell must be at least 1".into());
        }
        if self.strip_thresholds.portrait < 2 || self.strip_thresholds.landscape < 2 {
            return invalid("strip thresholds must allow the anchor column plus one more".into());
        }
        Ok(())
    }
}

/// Page dimensions after orientation has been applied.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
    pub margins: Margins,
}

impl PageGeometry {
    pub fn usable_width(&self) -> f32 {
        self.width - self.margins.left - self.margins.right
    }

    pub fn usable_height(&self) -> f32 {
        self.height - self.margins.top - self.margins.bottom
    }

    pub fn top_y(&self) -> f32 {
        self.height - self.margins.top
    }

    pub fn bottom_y(&self) -> f32 {
        self.margins.bottom
    }
}
