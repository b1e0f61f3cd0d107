use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::columns::surviving_columns;
use crate::compose::Compositor;
use crate::error::{Error, Warning};
use crate::fonts::FontArena;
use crate::model::{ConversionResult, OutputDocument, Table};
use crate::options::{LayoutOptions, OutputGrouping};
use crate::pdf;
use crate::progress::{CancellationToken, Progress, ProgressReporter, Stage};
use crate::resolver::{FontResolver, FontSources, ResolvedFont};
use crate::script::{self, ScriptProfile};

/// Tables that end up in one output document.
struct DocumentGroup<'t> {
    /// Document title, also the output file stem.
    name: String,
    tables: Vec<&'t Table>,
}

/// A group with its own arena and the font resolved into it.
struct LoadedGroup<'t> {
    group: DocumentGroup<'t>,
    arena: FontArena,
    font: ResolvedFont,
}

/// Converts tables to PDF documents. Keeps its font resolver (and its cache)
/// across calls; documents are rendered one after another.
pub struct Converter {
    resolver: FontResolver,
    cancel: CancellationToken,
}

impl Converter {
    pub fn new(sources: FontSources) -> Self {
        Self::with_resolver(FontResolver::new(sources))
    }

    pub fn with_resolver(resolver: FontResolver) -> Self {
        Converter { resolver, cancel: CancellationToken::new() }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn font_resolver(&self) -> &FontResolver {
        &self.resolver
    }

    pub fn convert(
        &mut self,
        tables: &[Table],
        options: &LayoutOptions,
        on_progress: impl FnMut(&Progress),
    ) -> ConversionResult {
        let mut on_progress = on_progress;
        let mut progress = ProgressReporter::new(&mut on_progress);
        let mut warnings = Vec::new();

        match self.run(tables, options, &mut progress, &mut warnings) {
            Ok(outputs) => {
                progress.report(
                    Stage::Complete,
                    100,
                    format!("Created {} document(s)", outputs.len()),
                );
                ConversionResult { success: true, outputs, warnings, error: None }
            }
            Err(e) => {
                log::warn!("Conversion failed: {e}");
                ConversionResult::failed(e, warnings)
            }
        }
    }

    fn run(
        &mut self,
        tables: &[Table],
        options: &LayoutOptions,
        progress: &mut ProgressReporter<'_>,
        warnings: &mut Vec<Warning>,
    ) -> Result<Vec<OutputDocument>, Error> {
        let t0 = std::time::Instant::now();
        progress.report(Stage::Parsing, 0, format!("Received {} table(s)", tables.len()));
        options.validate()?;

        let selectable: Vec<&Table> = tables
            .iter()
            .filter(|t| {
                let keep = !surviving_columns(t).is_empty();
                if !keep {
                    log::warn!("Table \"{}\" has no non-empty rows or columns, skipping", t.name);
                    warnings.push(Warning::NoSelectableContent { table: t.name.clone() });
                }
                keep
            })
            .collect();
        let groups = group_tables(&selectable, options);
        progress.report(Stage::Parsing, 100, format!("{} document(s) to create", groups.len()));

        let profiles: Vec<ScriptProfile> = groups
            .iter()
            .enumerate()
            .map(|(i, group)| {
                let profile = script::classify(&script::sample_text(group.tables.iter().copied()));
                log::info!(
                    "Document \"{}\": {} text (confidence {:.2})",
                    group.name,
                    profile.script,
                    profile.confidence
                );
                progress.report(
                    Stage::Analyzing,
                    percent(i + 1, groups.len()),
                    format!("Detected {} text in \"{}\"", profile.script, group.name),
                );
                profile
            })
            .collect();

        let t_analyze = t0.elapsed();

        let mut loaded = Vec::with_capacity(groups.len());
        let group_count = groups.len();
        for (i, (group, profile)) in groups.into_iter().zip(profiles).enumerate() {
            self.cancel.check()?;
            let mut arena = FontArena::new();
            let font = self.resolver.resolve(&mut arena, profile.script, &self.cancel)?;
            if font.requires_transliteration {
                warnings.push(Warning::Transliterated {
                    script: profile.script,
                    font: font.display_name.clone(),
                });
            }
            progress.report(
                Stage::LoadingFonts,
                percent(i + 1, group_count),
                format!("Loaded {} for \"{}\"", font.display_name, group.name),
            );
            loaded.push(LoadedGroup { group, arena, font });
        }

        let t_fonts = t0.elapsed();

        let total_tables: usize = loaded.iter().map(|g| g.group.tables.len()).sum();
        let mut tables_done = 0usize;
        let mut used_names = HashSet::new();
        let mut outputs = Vec::new();

        for LoadedGroup { group, mut arena, font } in loaded {
            let mut compositor = Compositor::new(&mut arena, font, options)?;
            for table in &group.tables {
                self.cancel.check()?;
                compositor.compose_table(table)?;
                tables_done += 1;
                progress.report(
                    Stage::Generating,
                    percent(tables_done, total_tables + 1),
                    format!("Laid out \"{}\"", table.name),
                );
            }
            let composition = compositor.finish()?;
            warnings.extend(composition.warnings);
            if composition.document.pages.is_empty() {
                self.resolver.release(arena.document_id());
                continue;
            }

            let bytes =
                pdf::render(&composition.document, &arena, &options.metadata, &group.name)?;
            self.resolver.release(arena.document_id());

            let name = unique_name(&sanitize_file_stem(&group.name), &mut used_names);
            log::info!(
                "Wrote {name}: {} page(s), {} bytes",
                composition.document.pages.len(),
                bytes.len()
            );
            progress.report(
                Stage::Generating,
                percent(tables_done, total_tables + 1),
                format!("Serialised {name}"),
            );
            outputs.push(OutputDocument { name, bytes });
        }

        let t_generate = t0.elapsed();
        log::info!(
            "Conversion phases: analyze={:.1}ms, fonts={:.1}ms, generate={:.1}ms",
            t_analyze.as_secs_f64() * 1000.0,
            (t_fonts - t_analyze).as_secs_f64() * 1000.0,
            (t_generate - t_fonts).as_secs_f64() * 1000.0,
        );
        Ok(outputs)
    }
}

/// Convert with the platform's system fonts as external sources.
pub fn convert(
    tables: &[Table],
    options: &LayoutOptions,
    on_progress: impl FnMut(&Progress),
) -> ConversionResult {
    Converter::new(FontSources::system_defaults()).convert(tables, options, on_progress)
}

fn group_tables<'t>(tables: &[&'t Table], options: &LayoutOptions) -> Vec<DocumentGroup<'t>> {
    match options.output_grouping {
        OutputGrouping::SingleDocument if tables.is_empty() => Vec::new(),
        OutputGrouping::SingleDocument => {
            let name = options
                .metadata
                .title
                .clone()
                .unwrap_or_else(|| tables[0].name.clone());
            vec![DocumentGroup { name, tables: tables.to_vec() }]
        }
        OutputGrouping::OnePerTable => tables
            .iter()
            .map(|&t| DocumentGroup { name: t.name.clone(), tables: vec![t] })
            .collect(),
    }
}

fn percent(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    ((done.min(total) * 100) / total) as u8
}

/// A file name stem safe on common file systems.
pub fn sanitize_file_stem(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let trimmed = cleaned.trim().trim_matches('.').trim();
    if trimmed.is_empty() {
        "document".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Where a document named `name` is written. `requested` is a file path only
/// when it ends in `.pdf` and there is a single document; with several
/// documents such a path stands for its parent directory.
pub fn output_path(
    requested: Option<&Path>,
    input_dir: &Path,
    name: &str,
    document_count: usize,
) -> PathBuf {
    match requested {
        Some(out) if out.extension().is_some_and(|e| e.eq_ignore_ascii_case("pdf")) => {
            if document_count == 1 {
                out.to_path_buf()
            } else {
                out.parent().unwrap_or(Path::new("")).join(name)
            }
        }
        Some(dir) => dir.join(name),
        None => input_dir.join(name),
    }
}

fn unique_name(stem: &str, used: &mut HashSet<String>) -> String {
    let mut candidate = format!("{stem}.pdf");
    let mut n = 2;
    while !used.insert(candidate.to_lowercase()) {
        candidate = format!("{stem}-{n}.pdf");
        n += 1;
    }
    candidate
}
