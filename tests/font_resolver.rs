use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use sheetside_pdf::fonts::{FileFontSource, FontArena, FontSource, MemoryFontSource};
use sheetside_pdf::resolver::{MIN_FONT_BYTES, PAYLOAD_CAPACITY};
use sheetside_pdf::{
    CancellationToken, Cell, Converter, CreationDate, Error, FontResolver, FontSourceError,
    FontSources, LayoutOptions, ResolvedFont, Row, Script, Table, Warning,
};

const DEJAVU: &str = "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf";

/// Counts fetches and always fails.
struct Unreachable {
    name: String,
    calls: Arc<AtomicUsize>,
}

impl Unreachable {
    fn new(name: &str) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (Unreachable { name: name.to_string(), calls: Arc::clone(&calls) }, calls)
    }
}

impl FontSource for Unreachable {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(&self) -> Result<Vec<u8>, FontSourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(FontSourceError::Fetch("connection refused".into()))
    }
}

/// Serves a file and counts fetches.
struct CountingFile {
    path: String,
    calls: Arc<AtomicUsize>,
}

impl FontSource for CountingFile {
    fn name(&self) -> &str {
        &self.path
    }

    fn fetch(&self) -> Result<Vec<u8>, FontSourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(std::fs::read(&self.path)?)
    }
}

/// Serves fixed bytes and counts fetches.
struct Served {
    name: String,
    bytes: Vec<u8>,
    calls: Arc<AtomicUsize>,
}

impl Served {
    fn new(name: &str, bytes: Vec<u8>) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (Served { name: name.to_string(), bytes, calls: Arc::clone(&calls) }, calls)
    }
}

impl FontSource for Served {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(&self) -> Result<Vec<u8>, FontSourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.bytes.clone())
    }
}

fn resolve(
    resolver: &mut FontResolver,
    arena: &mut FontArena,
    script: Script,
) -> Result<ResolvedFont, Error> {
    resolver.resolve(arena, script, &CancellationToken::new())
}

fn dejavu_available() -> bool {
    if Path::new(DEJAVU).exists() {
        return true;
    }
    eprintln!("Skipping: {DEJAVU} not installed");
    false
}

#[test]
fn latin_uses_builtin_helvetica_without_fetching() {
    let (source, calls) = Unreachable::new("latin-remote");
    let mut resolver = FontResolver::new(FontSources::empty().with(Script::Latin, source));
    let mut arena = FontArena::new();

    let font = resolve(&mut resolver, &mut arena, Script::Latin).unwrap();
    assert_eq!(font.display_name, "Helvetica");
    assert!(font.supports_script);
    assert!(!font.requires_transliteration);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn failing_sources_fall_back_to_transliterating_times() {
    let (unreachable, calls) = Unreachable::new("remote-cyrillic");
    let sources = FontSources::empty()
        .with(Script::Cyrillic, unreachable)
        .with(Script::Cyrillic, MemoryFontSource::new("tiny", vec![0u8; 16]))
        .with(Script::Cyrillic, MemoryFontSource::new("garbage", vec![0xAB; 4096]));
    let mut resolver = FontResolver::new(sources);
    let mut arena = FontArena::new();

    let font = resolve(&mut resolver, &mut arena, Script::Cyrillic).unwrap();
    assert_eq!(font.display_name, "Times-Roman");
    assert!(!font.supports_script);
    assert!(font.requires_transliteration);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(arena.len(), 1);
}

#[test]
fn candidates_are_tried_in_order() {
    let sources = FontSources::empty()
        .with(Script::Arabic, MemoryFontSource::new("first", Vec::new()))
        .with(Script::Arabic, MemoryFontSource::new("second", Vec::new()));
    let resolver = FontResolver::new(sources);

    let chain: Vec<String> = resolver.candidates(Script::Arabic).iter().map(|c| c.to_string()).collect();
    assert_eq!(
        chain,
        vec!["#0 first", "#1 second", "built-in Times-Roman", "built-in Courier"]
    );

    let latin: Vec<String> = resolver.candidates(Script::Latin).iter().map(|c| c.to_string()).collect();
    assert_eq!(latin, vec!["built-in Helvetica", "built-in Courier"]);
}

#[test]
fn prepended_source_goes_first() {
    let mut sources = FontSources::empty().with(Script::Cjk, MemoryFontSource::new("later", Vec::new()));
    sources.prepend(Script::Cjk, MemoryFontSource::new("preferred", Vec::new()));
    let names: Vec<&str> = sources.for_script(Script::Cjk).iter().map(|s| s.name()).collect();
    assert_eq!(names, vec!["preferred", "later"]);
}

#[test]
fn repeated_resolution_hits_the_cache() {
    let mut resolver = FontResolver::new(FontSources::empty());
    let mut arena = FontArena::new();

    let first = resolve(&mut resolver, &mut arena, Script::Cyrillic).unwrap();
    let second = resolve(&mut resolver, &mut arena, Script::Cyrillic).unwrap();
    assert_eq!(first, second);
    assert_eq!(arena.len(), 1);
    assert_eq!(resolver.cached_len(), 1);
}

#[test]
fn each_document_gets_its_own_handle() {
    let mut resolver = FontResolver::new(FontSources::empty());
    let mut a = FontArena::new();
    let mut b = FontArena::new();

    let fa = resolve(&mut resolver, &mut a, Script::Latin).unwrap();
    let fb = resolve(&mut resolver, &mut b, Script::Latin).unwrap();
    assert_ne!(fa.handle, fb.handle);
    assert_eq!(fa.handle.document(), a.document_id());
    assert_eq!(fb.handle.document(), b.document_id());
    assert!(b.get(fb.handle).is_ok());
    assert!(matches!(b.get(fa.handle), Err(Error::ForeignFontHandle { .. })));
    assert_eq!(resolver.cached_len(), 2);

    resolver.release(a.document_id());
    assert_eq!(resolver.cached_len(), 1);
    resolver.release(b.document_id());
    assert_eq!(resolver.cached_len(), 0);
}

#[test]
fn cache_evicts_least_recently_used_on_release() {
    let mut resolver = FontResolver::new(FontSources::empty()).with_cache_capacity(2);
    let mut arenas: Vec<FontArena> = (0..3).map(|_| FontArena::new()).collect();
    for arena in &mut arenas {
        resolve(&mut resolver, arena, Script::Latin).unwrap();
    }
    // Nothing is evicted while documents are still being built.
    assert_eq!(resolver.cached_len(), 3);

    let finished = FontArena::new();
    resolver.release(finished.document_id());
    assert_eq!(resolver.cached_len(), 2);

    // The first arena was evicted: resolving again embeds a second font.
    resolve(&mut resolver, &mut arenas[0], Script::Latin).unwrap();
    assert_eq!(arenas[0].len(), 2);
    // The last one is still cached.
    resolve(&mut resolver, &mut arenas[2], Script::Latin).unwrap();
    assert_eq!(arenas[2].len(), 1);
}

#[test]
fn sources_sharing_a_name_are_fetched_separately() {
    let (first, first_calls) = Served::new("fonts/cyrillic.ttf", vec![0xAB; 4096]);
    let (second, second_calls) = Served::new("fonts/cyrillic.ttf", vec![0xCD; 4096]);
    let sources = FontSources::empty().with(Script::Cyrillic, first).with(Script::Cyrillic, second);
    let mut resolver = FontResolver::new(sources);
    let mut arena = FontArena::new();

    let font = resolve(&mut resolver, &mut arena, Script::Cyrillic).unwrap();
    assert!(font.requires_transliteration);
    assert_eq!(first_calls.load(Ordering::SeqCst), 1);
    assert_eq!(second_calls.load(Ordering::SeqCst), 1);
    assert_eq!(resolver.payloads_len(), 2);
}

#[test]
fn memoised_payloads_are_bounded() {
    let mut sources = FontSources::empty();
    for i in 0..PAYLOAD_CAPACITY + 2 {
        sources.push(Script::Arabic, MemoryFontSource::new(format!("arabic-{i}"), vec![0xAB; 4096]));
    }
    let mut resolver = FontResolver::new(sources);
    let mut arena = FontArena::new();

    resolve(&mut resolver, &mut arena, Script::Arabic).unwrap();
    assert_eq!(resolver.payloads_len(), PAYLOAD_CAPACITY);
}

#[test]
fn cancelled_resolution_stops() {
    let mut resolver = FontResolver::new(FontSources::empty());
    let mut arena = FontArena::new();
    let token = CancellationToken::new();
    token.cancel();
    assert!(matches!(
        resolver.resolve(&mut arena, Script::Cyrillic, &token),
        Err(Error::Cancelled)
    ));
    assert!(arena.is_empty());
    assert_eq!(resolver.cached_len(), 0);
}

#[test]
fn file_sources_that_are_missing_or_too_small_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let small = dir.path().join("small.ttf");
    std::fs::write(&small, vec![0u8; MIN_FONT_BYTES - 1]).unwrap();
    let missing = dir.path().join("missing.ttf");

    let sources = FontSources::empty()
        .with(Script::Devanagari, FileFontSource::new(&missing))
        .with(Script::Devanagari, FileFontSource::new(&small));
    let mut resolver = FontResolver::new(sources);
    let mut arena = FontArena::new();

    let font = resolve(&mut resolver, &mut arena, Script::Devanagari).unwrap();
    assert_eq!(font.display_name, "Times-Roman");
    assert!(font.requires_transliteration);
}

#[test]
fn truetype_source_is_embedded_when_it_covers_the_script() {
    if !dejavu_available() {
        return;
    }
    let calls = Arc::new(AtomicUsize::new(0));
    let source = CountingFile { path: DEJAVU.to_string(), calls: Arc::clone(&calls) };
    let mut resolver = FontResolver::new(FontSources::empty().with(Script::Cyrillic, source));

    let mut a = FontArena::new();
    let font = resolve(&mut resolver, &mut a, Script::Cyrillic).unwrap();
    assert!(font.supports_script);
    assert!(!font.requires_transliteration);
    assert!(!a.get(font.handle).unwrap().is_standard());

    // A second document reuses the fetched bytes but embeds its own copy.
    let mut b = FontArena::new();
    let other = resolve(&mut resolver, &mut b, Script::Cyrillic).unwrap();
    assert_ne!(font.handle, other.handle);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn embedded_truetype_font_reaches_the_pdf() {
    if !dejavu_available() {
        return;
    }
    let sources = FontSources::empty().with(Script::Cyrillic, FileFontSource::new(DEJAVU));
    let table = Table::new(
        "Города",
        vec![
            vec![Cell::text("Город"), Cell::text("Население")].into_iter().collect::<Row>(),
            vec![Cell::text("Москва"), Cell::number(13_000_000.0)].into_iter().collect(),
        ],
    );
    let mut options = LayoutOptions::default();
    options.metadata.creation_date = CreationDate::Omit;

    let result = Converter::new(sources).convert(&[table], &options, |_| {});
    assert!(result.success, "{:?}", result.error);
    assert!(!result.warnings.iter().any(|w| matches!(w, Warning::Transliterated { .. })));
    let bytes = &result.outputs[0].bytes;
    assert!(bytes.starts_with(b"%PDF-"));
    assert!(bytes.windows(10).any(|w| w == b"Identity-H"));
    assert!(bytes.windows(9).any(|w| w == b"FontFile2"));
}
