use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::Arc;

use crate::error::{Error, FontSourceError};
use crate::fonts::{
    DocumentId, FontArena, FontHandle, FontSource, StandardFont, SystemFontSource, TrueTypeProgram,
};
use crate::progress::CancellationToken;
use crate::script::Script;

/// Anything shorter cannot be a usable TrueType font.
pub const MIN_FONT_BYTES: usize = 1024;
pub const DEFAULT_CACHE_CAPACITY: usize = 32;
/// Fetched font files kept for reuse by later documents.
pub const PAYLOAD_CAPACITY: usize = 4;

/// Ordered external font providers per script.
#[derive(Clone, Default)]
pub struct FontSources {
    by_script: HashMap<Script, Vec<Arc<dyn FontSource>>>,
}

impl FontSources {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Installed system families known to cover each script, most specific first.
    pub fn system_defaults() -> Self {
        let mut sources = Self::empty();
        for script in Script::ALL {
            let families: &[&str] = match script {
                Script::Latin => &[],
                Script::Cyrillic => &["Noto Sans", "DejaVu Sans", "Liberation Sans", "Arial"],
                Script::Cjk => &[
                    "Droid Sans Fallback",
                    "Arial Unicode MS",
                    "Noto Sans CJK SC",
                    "SimSun",
                ],
                Script::Arabic => &["Noto Sans Arabic", "Noto Naskh Arabic", "DejaVu Sans", "Arial"],
                Script::Devanagari => &[
                    "Noto Sans Devanagari",
                    "Lohit Devanagari",
                    "Nirmala UI",
                    "Mangal",
                ],
            };
            for family in families {
                sources.push(script, SystemFontSource::new(*family));
            }
        }
        sources
    }

    /// Append a lowest-priority source for `script`.
    pub fn push(&mut self, script: Script, source: impl FontSource + 'static) -> &mut Self {
        self.by_script.entry(script).or_default().push(Arc::new(source));
        self
    }

    /// Insert a highest-priority source for `script`.
    pub fn prepend(&mut self, script: Script, source: impl FontSource + 'static) -> &mut Self {
        self.by_script.entry(script).or_default().insert(0, Arc::new(source));
        self
    }

    pub fn with(mut self, script: Script, source: impl FontSource + 'static) -> Self {
        self.push(script, source);
        self
    }

    pub fn for_script(&self, script: Script) -> &[Arc<dyn FontSource>] {
        self.by_script.get(&script).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// One step of the fallback chain.
#[derive(Clone)]
pub enum FontCandidate {
    External { rank: usize, source: Arc<dyn FontSource> },
    Standard { font: StandardFont, transliterate: bool },
}

impl fmt::Display for FontCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FontCandidate::External { rank, source } => {
                write!(f, "#{rank} {}", source.name())
            }
            FontCandidate::Standard { font, .. } => write!(f, "built-in {}", font.base_font()),
        }
    }
}

impl fmt::Debug for FontCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedFont {
    pub handle: FontHandle,
    pub display_name: String,
    pub supports_script: bool,
    pub requires_transliteration: bool,
}

/// Resolves one font per (document, script), walking [`FontCandidate`]s in order.
///
/// Results are cached by document identity, never by script alone: a handle is
/// only meaningful to the [`FontArena`] that issued it. The cache is trimmed to
/// its capacity in [`FontResolver::release`], never while a document is built.
pub struct FontResolver {
    sources: Arc<FontSources>,
    cache: VecDeque<((DocumentId, Script), ResolvedFont)>,
    capacity: usize,
    /// Keyed by source identity; two sources may share a name.
    payloads: VecDeque<(usize, Arc<Vec<u8>>)>,
}

impl FontResolver {
    pub fn new(sources: FontSources) -> Self {
        Self::shared(Arc::new(sources))
    }

    pub fn shared(sources: Arc<FontSources>) -> Self {
        FontResolver {
            sources,
            cache: VecDeque::new(),
            capacity: DEFAULT_CACHE_CAPACITY,
            payloads: VecDeque::new(),
        }
    }

    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        self
    }

    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }

    /// The fallback chain for `script`, in the order it is attempted.
    pub fn candidates(&self, script: Script) -> Vec<FontCandidate> {
        match script {
            Script::Latin => vec![
                FontCandidate::Standard { font: StandardFont::Helvetica, transliterate: false },
                FontCandidate::Standard { font: StandardFont::Courier, transliterate: false },
            ],
            Script::Cyrillic | Script::Cjk | Script::Arabic | Script::Devanagari => {
                let mut chain: Vec<FontCandidate> = self
                    .sources
                    .for_script(script)
                    .iter()
                    .enumerate()
                    .map(|(rank, source)| FontCandidate::External {
                        rank,
                        source: Arc::clone(source),
                    })
                    .collect();
                chain.push(FontCandidate::Standard {
                    font: StandardFont::TimesRoman,
                    transliterate: true,
                });
                chain.push(FontCandidate::Standard {
                    font: StandardFont::Courier,
                    transliterate: true,
                });
                chain
            }
        }
    }

    pub fn resolve(
        &mut self,
        arena: &mut FontArena,
        script: Script,
        cancel: &CancellationToken,
    ) -> Result<ResolvedFont, Error> {
        let key = (arena.document_id(), script);
        if let Some(hit) = self.cache_get(key) {
            log::debug!("Font cache hit for {script} in {}", key.0);
            return Ok(hit);
        }

        let chain = self.candidates(script);
        let found = chain.iter().find_map(|candidate| {
            if cancel.is_cancelled() {
                return Some(Err(Error::Cancelled));
            }
            match self.attempt(arena, script, candidate) {
                Ok(font) => Some(Ok(font)),
                Err(e) => {
                    log::warn!("Font candidate {candidate} for {script} text unavailable: {e}");
                    None
                }
            }
        });
        let font = found.unwrap_or(Err(Error::FontResolutionExhausted { script }))?;

        log::info!(
            "Resolved {script} font for {}: {} (transliterate={})",
            key.0,
            font.display_name,
            font.requires_transliteration
        );
        self.cache_insert(key, font.clone());
        Ok(font)
    }

    pub fn payloads_len(&self) -> usize {
        self.payloads.len()
    }

    /// Drop every cached entry for `document`, then evict the least recently
    /// used entries past capacity. Call once its output is serialised.
    pub fn release(&mut self, document: DocumentId) {
        self.cache.retain(|((doc, _), _)| *doc != document);
        while self.cache.len() > self.capacity {
            if let Some(((doc, script), _)) = self.cache.pop_front() {
                log::debug!("Evicted cached {script} font for {doc}");
            }
        }
    }

    fn attempt(
        &mut self,
        arena: &mut FontArena,
        script: Script,
        candidate: &FontCandidate,
    ) -> Result<ResolvedFont, FontSourceError> {
        match candidate {
            FontCandidate::External { source, .. } => {
                let bytes = self.fetch(source)?;
                if bytes.len() < MIN_FONT_BYTES {
                    return Err(FontSourceError::PayloadTooSmall { len: bytes.len() });
                }
                let (program, family) =
                    TrueTypeProgram::parse(source.name(), bytes.as_ref().clone(), script)?;
                let handle = arena
                    .embed_truetype(program, family.clone())
                    .map_err(|e| FontSourceError::Unembeddable(e.to_string()))?;
                Ok(ResolvedFont {
                    handle,
                    display_name: family,
                    supports_script: true,
                    requires_transliteration: false,
                })
            }
            FontCandidate::Standard { font, transliterate } => {
                let handle = arena
                    .embed_standard(*font)
                    .map_err(|e| FontSourceError::Unembeddable(e.to_string()))?;
                Ok(ResolvedFont {
                    handle,
                    display_name: font.base_font().to_string(),
                    supports_script: script == Script::Latin,
                    requires_transliteration: *transliterate,
                })
            }
        }
    }

    /// Font bytes are shareable across documents, so the last few successful
    /// payloads are memoised.
    fn fetch(&mut self, source: &Arc<dyn FontSource>) -> Result<Arc<Vec<u8>>, FontSourceError> {
        let key = Arc::as_ptr(source).cast::<()>() as usize;
        if let Some((_, bytes)) = self.payloads.iter().find(|(k, _)| *k == key) {
            return Ok(Arc::clone(bytes));
        }
        let bytes = Arc::new(source.fetch()?);
        if self.payloads.len() >= PAYLOAD_CAPACITY {
            self.payloads.pop_front();
        }
        self.payloads.push_back((key, Arc::clone(&bytes)));
        Ok(bytes)
    }

    fn cache_get(&mut self, key: (DocumentId, Script)) -> Option<ResolvedFont> {
        let pos = self.cache.iter().position(|(k, _)| *k == key)?;
        let entry = self.cache.remove(pos)?;
        let font = entry.1.clone();
        self.cache.push_back(entry);
        Some(font)
    }

    fn cache_insert(&mut self, key: (DocumentId, Script), font: ResolvedFont) {
        self.cache.push_back((key, font));
    }
}
