use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};

use sheetside_pdf::fonts::FileFontSource;
use sheetside_pdf::{
    Converter, FontSources, LayoutOptions, Margins, Orientation, OutputGrouping, PageSize, Script,
    WideTableStrategy, output_path,
};

#[derive(Clone, Copy, ValueEnum)]
enum PageSizeArg {
    A3,
    A4,
    A5,
    Letter,
    Legal,
    Tabloid,
}

#[derive(Clone, Copy, ValueEnum)]
enum StrategyArg {
    Scale,
    Strip,
    Overflow,
}

#[derive(Parser)]
#[command(name = "sheetside-pdf", about = "Convert CSV, TSV and text tables to PDF")]
struct Args {
    /// Input files (.csv, .tsv, or plain text: one row per line)
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
    /// Output PDF file for a single document, or a directory (defaults to the first input's directory)
    #[arg(short, long)]
    output: Option<PathBuf>,
    #[arg(long, value_enum, default_value = "a4")]
    page_size: PageSizeArg,
    #[arg(long)]
    landscape: bool,
    /// Body text size in points
    #[arg(long, default_value_t = 10.0)]
    font_size: f32,
    /// Page margin on every side, in points
    #[arg(long, default_value_t = 36.0)]
    margin: f32,
    /// How tables wider than the page are handled
    #[arg(long, value_enum, default_value = "strip")]
    strategy: StrategyArg,
    /// Write one PDF per input table
    #[arg(long)]
    split: bool,
    /// Do not print table titles
    #[arg(long)]
    no_title: bool,
    /// Treat the first row as data and label columns A, B, C...
    #[arg(long)]
    no_header: bool,
    /// Lines shown per cell before the rest is cut
    #[arg(long, default_value_t = 2)]
    max_lines: usize,
    /// Document title
    #[arg(long)]
    title: Option<String>,
    /// Field separator for delimited input (detected when omitted)
    #[arg(long)]
    delimiter: Option<char>,
    /// Extra font for a script, tried before system fonts: SCRIPT=PATH
    #[arg(long = "font", value_parser = parse_font_arg)]
    fonts: Vec<(Script, PathBuf)>,
}

fn parse_font_arg(s: &str) -> Result<(Script, PathBuf), String> {
    let (script, path) = s
        .split_once('=')
        .ok_or_else(|| format!("expected SCRIPT=PATH, got \"{s}\""))?;
    Ok((script.parse()?, PathBuf::from(path)))
}

fn layout_options(args: &Args) -> LayoutOptions {
    let mut options = LayoutOptions {
        page_size: match args.page_size {
            PageSizeArg::A3 => PageSize::A3,
            PageSizeArg::A4 => PageSize::A4,
            PageSizeArg::A5 => PageSize::A5,
            PageSizeArg::Letter => PageSize::Letter,
            PageSizeArg::Legal => PageSize::Legal,
            PageSizeArg::Tabloid => PageSize::Tabloid,
        },
        orientation: if args.landscape { Orientation::Landscape } else { Orientation::Portrait },
        font_size_pt: args.font_size,
        margins: Margins::uniform(args.margin),
        include_table_title: !args.no_title,
        wide_table_strategy: match args.strategy {
            StrategyArg::Scale => WideTableStrategy::Scale,
            StrategyArg::Strip => WideTableStrategy::Strip,
            StrategyArg::Overflow => WideTableStrategy::Overflow,
        },
        output_grouping: if args.split {
            OutputGrouping::OnePerTable
        } else {
            OutputGrouping::SingleDocument
        },
        first_row_is_header: !args.no_header,
        max_lines_per_cell: args.max_lines,
        ..LayoutOptions::default()
    };
    options.metadata.title = args.title.clone();
    options
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let mut tables = Vec::with_capacity(args.inputs.len());
    for input in &args.inputs {
        if !input.exists() {
            eprintln!("Error: file not found: {}", input.display());
            std::process::exit(1);
        }
        if !input.is_file() {
            eprintln!("Error: not a file: {}", input.display());
            std::process::exit(1);
        }
        match sheetside_pdf::delimited::read_file(input, args.delimiter) {
            Ok(table) => tables.push(table),
            Err(e) => {
                eprintln!("Error: {}: {e}", input.display());
                std::process::exit(1);
            }
        }
    }

    let mut sources = FontSources::system_defaults();
    for (script, path) in args.fonts.iter().rev() {
        sources.prepend(*script, FileFontSource::new(path));
    }

    let options = layout_options(&args);
    let result = Converter::new(sources).convert(&tables, &options, |p| {
        log::debug!("{} {}%: {}", p.stage, p.percent, p.message);
    });

    for warning in &result.warnings {
        eprintln!("Warning: {warning}");
    }
    if let Some(e) = &result.error {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    let count = result.outputs.len();
    let input_dir = args.inputs[0].parent().unwrap_or(Path::new("."));
    if count > 1 && args.output.as_ref().is_some_and(|o| o.extension().is_some_and(|e| e == "pdf")) {
        log::warn!("{count} documents created; writing them next to the requested output file");
    }
    for doc in &result.outputs {
        let path = output_path(args.output.as_deref(), input_dir, &doc.name, count);
        if let Err(e) = std::fs::write(&path, &doc.bytes) {
            eprintln!("Error: {}: {e}", path.display());
            std::process::exit(1);
        }
        println!("{}", path.display());
    }
}
