use std::fmt;

use crate::fonts::{DocumentId, FontHandle};
use crate::script::Script;

/// Hard failures. Anything that can be recovered locally is a [`Warning`] instead.
#[derive(Debug)]
pub enum Error {
    InvalidOptions(String),
    FontResolutionExhausted { script: Script },
    ForeignFontHandle { handle: FontHandle, arena: DocumentId },
    FontSlotsExhausted(DocumentId),
    Cancelled,
    Pdf(String),
    Io(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidOptions(reason) => write!(f, "invalid layout options: {reason}"),
            Error::FontResolutionExhausted { script } => {
                write!(f, "no usable font for {script} text, built-in fonts included")
            }
            Error::ForeignFontHandle { handle, arena } => write!(
                f,
                "font handle {handle} belongs to {}, not to {arena}",
                handle.document()
            ),
            Error::FontSlotsExhausted(doc) => write!(f, "too many fonts embedded in {doc}"),
            Error::Cancelled => write!(f, "conversion cancelled"),
            Error::Pdf(e) => write!(f, "PDF error: {e}"),
            Error::Io(e) => write!(f, "IO error: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

/// Why a single font candidate was skipped. Logged, never surfaced to the caller.
#[derive(Debug)]
pub enum FontSourceError {
    Fetch(String),
    PayloadTooSmall { len: usize },
    Unembeddable(String),
    MissingCoverage { script: Script },
}

impl fmt::Display for FontSourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FontSourceError::Fetch(reason) => write!(f, "fetch failed: {reason}"),
            FontSourceError::PayloadTooSmall { len } => {
                write!(f, "payload of {len} bytes is too small to be a font")
            }
            FontSourceError::Unembeddable(reason) => write!(f, "cannot embed: {reason}"),
            FontSourceError::MissingCoverage { script } => {
                write!(f, "font has no glyphs for {script}")
            }
        }
    }
}

impl std::error::Error for FontSourceError {}

impl From<std::io::Error> for FontSourceError {
    fn from(e: std::io::Error) -> Self {
        FontSourceError::Fetch(e.to_string())
    }
}

/// Conditions recovered during a conversion and reported alongside the output.
#[derive(Clone, Debug, PartialEq)]
pub enum Warning {
    NoSelectableContent { table: String },
    Transliterated { script: Script, font: String },
    /// Text in a table needed a script the document font does not cover.
    UncoveredScript { table: String, script: Script, font: String },
    CellEncoding { table: String, text: String },
    LayoutOverflow { table: String, cells: usize },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::NoSelectableContent { table } => {
                write!(f, "table \"{table}\" has no non-empty rows or columns and was skipped")
            }
            Warning::Transliterated { script, font } => write!(
                f,
                "no embeddable font for {script} text; rendered with {font} using transliteration"
            ),
            Warning::UncoveredScript { table, script, font } => write!(
                f,
                "table \"{table}\": {script} text is not covered by {font} and was transliterated"
            ),
            Warning::CellEncoding { table, text } => write!(
                f,
                "table \"{table}\": text \"{text}\" could not be drawn and was replaced by a placeholder"
            ),
            Warning::LayoutOverflow { table, cells } => write!(
                f,
                "table \"{table}\": {cells} cell(s) exceeded the line limit or column width and were truncated"
            ),
        }
    }
}
