mod assemble;
pub mod columns;
pub mod compose;
pub mod delimited;
mod error;
pub mod fonts;
mod model;
mod options;
mod pdf;
pub mod progress;
pub mod resolver;
pub mod script;
pub mod translit;
pub mod wrap;

pub use assemble::{Converter, convert, output_path, sanitize_file_stem};
pub use error::{Error, FontSourceError, Warning};
pub use model::{
    Cell, CellKind, CellValue, ColumnHint, ConversionResult, OutputDocument, Row, RowHint, Table,
};
pub use options::{
    CreationDate, DocumentMetadata, LayoutOptions, Margins, Orientation, OutputGrouping,
    PageGeometry, PageSize, StripThresholds, WideTableStrategy,
};
pub use pdf::render as render_pdf;
pub use progress::{CancellationToken, Progress, Stage};
pub use resolver::{FontResolver, FontSources, ResolvedFont};
pub use script::{Script, ScriptProfile};
