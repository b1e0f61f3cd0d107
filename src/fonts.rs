use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::PathBuf;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};

use pdf_writer::Rect;
use ttf_parser::Face;

use crate::error::{Error, FontSourceError};
use crate::script::Script;

/// Fonts a single document may embed before the arena refuses more.
const MAX_FONTS_PER_DOCUMENT: usize = 16;

static NEXT_DOCUMENT_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of one output document. Never reused within a process.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId(u64);

impl DocumentId {
    fn next() -> Self {
        DocumentId(NEXT_DOCUMENT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "document #{}", self.0)
    }
}

/// Reference to a font owned by one [`FontArena`]. Only that arena will honour it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FontHandle {
    document: DocumentId,
    slot: usize,
}

impl FontHandle {
    pub fn document(&self) -> DocumentId {
        self.document
    }
}

impl fmt::Display for FontHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "F{}", self.slot + 1)
    }
}

// ---------------------------------------------------------------------------
// Font sources

/// An opaque provider of font bytes. Local or remote is the implementor's business.
pub trait FontSource: Send + Sync {
    /// Stable name, used for logging.
    fn name(&self) -> &str;
    fn fetch(&self) -> Result<Vec<u8>, FontSourceError>;
}

pub struct MemoryFontSource {
    name: String,
    bytes: Vec<u8>,
}

impl MemoryFontSource {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        MemoryFontSource { name: name.into(), bytes }
    }
}

impl FontSource for MemoryFontSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(&self) -> Result<Vec<u8>, FontSourceError> {
        Ok(self.bytes.clone())
    }
}

pub struct FileFontSource {
    name: String,
    path: PathBuf,
}

impl FileFontSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        FileFontSource { name: format!("file:{}", path.display()), path }
    }
}

impl FontSource for FileFontSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(&self) -> Result<Vec<u8>, FontSourceError> {
        Ok(std::fs::read(&self.path)?)
    }
}

/// A font family looked up in the system font directories.
pub struct SystemFontSource {
    name: String,
    family: String,
}

impl SystemFontSource {
    pub fn new(family: impl Into<String>) -> Self {
        let family = family.into();
        SystemFontSource { name: format!("system:{family}"), family }
    }
}

impl FontSource for SystemFontSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(&self) -> Result<Vec<u8>, FontSourceError> {
        let path = find_font_file(&self.family, false, false).ok_or_else(|| {
            FontSourceError::Fetch(format!("family \"{}\" is not installed", self.family))
        })?;
        Ok(std::fs::read(path)?)
    }
}

/// lowercase family name, bold, italic -> file path
type FontLookup = HashMap<(String, bool, bool), PathBuf>;

static FONT_INDEX: OnceLock<FontLookup> = OnceLock::new();

fn font_family_name(face: &Face) -> Option<String> {
    for name in face.names() {
        if name.name_id == ttf_parser::name_id::FAMILY
            && name.is_unicode()
            && let Some(s) = name.to_string()
        {
            return Some(s);
        }
    }
    None
}

fn font_directories() -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = Vec::new();

    // 1. User-configured directories via SHEETSIDE_FONTS env var
    if let Ok(val) = std::env::var("SHEETSIDE_FONTS") {
        let sep = if cfg!(windows) { ';' } else { ':' };
        for part in val.split(sep) {
            let trimmed = part.trim();
            if !trimmed.is_empty() {
                dirs.push(PathBuf::from(trimmed));
            }
        }
    }

    // 2. Platform-specific system font directories
    #[cfg(target_os = "macos")]
    {
        dirs.extend([
            "/Library/Fonts".into(),
            "/System/Library/Fonts".into(),
            "/System/Library/Fonts/Supplemental".into(),
        ]);
        if let Ok(home) = std::env::var("HOME") {
            dirs.push(PathBuf::from(home).join("Library/Fonts"));
        }
    }

    #[cfg(target_os = "linux")]
    {
        dirs.extend([
            "/usr/share/fonts".into(),
            "/usr/local/share/fonts".into(),
        ]);
        if let Ok(home) = std::env::var("HOME") {
            dirs.push(PathBuf::from(home).join(".local/share/fonts"));
        }
    }

    #[cfg(target_os = "windows")]
    {
        if let Ok(windir) = std::env::var("WINDIR") {
            dirs.push(PathBuf::from(windir).join("Fonts"));
        } else {
            dirs.push("C:\\Windows\\Fonts".into());
        }
    }

    dirs
}

fn scan_font_dirs() -> FontLookup {
    let mut index = FontLookup::new();

    // Recursive walk using a stack. Collections are skipped: they cannot be
    // embedded as a single FontFile2 program.
    let mut stack: Vec<PathBuf> = font_directories();
    while let Some(dir) = stack.pop() {
        let Ok(entries) = std::fs::read_dir(&dir) else {
            continue;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                stack.push(path);
                continue;
            }
            if !matches!(
                path.extension().and_then(|e| e.to_str()),
                Some("ttf" | "TTF" | "otf" | "OTF")
            ) {
                continue;
            }
            let Ok(data) = std::fs::read(&path) else {
                continue;
            };
            let Ok(face) = Face::parse(&data, 0) else {
                continue;
            };
            if let Some(family) = font_family_name(&face) {
                index
                    .entry((family.to_lowercase(), face.is_bold(), face.is_italic()))
                    .or_insert(path.clone());
            }
        }
    }
    log::debug!("System font index: {} faces", index.len());
    index
}

fn get_font_index() -> &'static FontLookup {
    FONT_INDEX.get_or_init(scan_font_dirs)
}

/// Look up a font file by family name and style.
/// Falls back to the regular variant if the requested bold/italic is not available.
fn find_font_file(font_name: &str, bold: bool, italic: bool) -> Option<PathBuf> {
    let index = get_font_index();
    let key = font_name.to_lowercase();
    index
        .get(&(key.clone(), bold, italic))
        .or_else(|| {
            if bold || italic {
                index.get(&(key, false, false))
            } else {
                None
            }
        })
        .cloned()
}

// ---------------------------------------------------------------------------
// Encoding and metrics

/// Convert a UTF-8 string to WinAnsi (Windows-1252) bytes for PDF Str encoding.
/// Fails on the first character WinAnsi cannot represent.
pub(crate) fn encode_winansi(s: &str) -> Result<Vec<u8>, char> {
    s.chars()
        .map(|c| winansi_byte(c).ok_or(c))
        .collect()
}

fn winansi_byte(c: char) -> Option<u8> {
    match c as u32 {
        0x0020..=0x007E => Some(c as u8),
        0x00A0..=0x00FF => Some(c as u8), // Latin-1 supplement maps directly
        0x20AC => Some(0x80),
        0x201A => Some(0x82),
        0x0192 => Some(0x83),
        0x201E => Some(0x84),
        0x2026 => Some(0x85),
        0x2020 => Some(0x86),
        0x2021 => Some(0x87),
        0x02C6 => Some(0x88),
        0x2030 => Some(0x89),
        0x0160 => Some(0x8A),
        0x2039 => Some(0x8B),
        0x0152 => Some(0x8C),
        0x017D => Some(0x8E),
        0x2018 => Some(0x91),
        0x2019 => Some(0x92),
        0x201C => Some(0x93),
        0x201D => Some(0x94),
        0x2022 => Some(0x95), // bullet
        0x2013 => Some(0x96),
        0x2014 => Some(0x97),
        0x02DC => Some(0x98),
        0x2122 => Some(0x99),
        0x0161 => Some(0x9A),
        0x203A => Some(0x9B),
        0x0153 => Some(0x9C),
        0x017E => Some(0x9E),
        0x0178 => Some(0x9F),
        _ => None,
    }
}

/// Horizontal advances in 1/1000 em.
pub trait TextMeasure {
    fn advance_1000(&self, c: char) -> f32;

    fn text_width(&self, text: &str, font_size: f32) -> f32 {
        text.chars().map(|c| self.advance_1000(c)).sum::<f32>() * font_size / 1000.0
    }

    /// Mean advance over common letters and digits; used for column estimates.
    fn average_advance_1000(&self) -> f32 {
        const SAMPLE: &str = "etaoinshrdlucmETAOIN0123456789";
        SAMPLE.chars().map(|c| self.advance_1000(c)).sum::<f32>() / SAMPLE.len() as f32
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StandardFont {
    Helvetica,
    TimesRoman,
    Courier,
}

impl StandardFont {
    pub fn base_font(self) -> &'static str {
        match self {
            StandardFont::Helvetica => "Helvetica",
            StandardFont::TimesRoman => "Times-Roman",
            StandardFont::Courier => "Courier",
        }
    }

    fn widths(self) -> Vec<f32> {
        match self {
            StandardFont::Helvetica => helvetica_widths(),
            StandardFont::TimesRoman => times_widths(),
            StandardFont::Courier => vec![600.0; 224],
        }
    }
}

/// Approximate Helvetica widths at 1000 units/em for WinAnsi chars 32..=255.
fn helvetica_widths() -> Vec<f32> {
    (32u8..=255u8)
        .map(|b| match b {
            32 => 278.0,                          // space
            33..=47 => 333.0,                     // punctuation
            48..=57 => 556.0,                     // digits
            58..=64 => 333.0,                     // more punctuation
            73 | 74 => 278.0,                     // I J (narrow uppercase)
            77 => 833.0,                          // M (wide)
            65..=90 => 667.0,                     // uppercase A-Z (average)
            91..=96 => 333.0,                     // brackets etc.
            102 | 105 | 106 | 108 | 116 => 278.0, // narrow lowercase: f i j l t
            109 | 119 => 833.0,                   // m w (wide)
            97..=122 => 556.0,                    // lowercase a-z (average)
            _ => 556.0,
        })
        .collect()
}

/// Approximate Times-Roman widths, same layout as [`helvetica_widths`].
fn times_widths() -> Vec<f32> {
    (32u8..=255u8)
        .map(|b| match b {
            32 => 250.0,
            33..=47 => 333.0,
            48..=57 => 500.0,
            58..=64 => 333.0,
            73 => 333.0,
            74 => 389.0,
            77 => 889.0,
            87 => 944.0,
            65..=90 => 667.0,
            91..=96 => 333.0,
            105 | 106 | 108 => 278.0,
            102 | 116 => 333.0,
            109 => 778.0,
            119 => 722.0,
            97..=122 => 444.0,
            _ => 500.0,
        })
        .collect()
}

#[derive(Debug, PartialEq)]
pub struct UnencodableChar(pub char);

/// Byte encoding for a text-showing operator.
pub trait TextEncoder {
    fn encode(&mut self, text: &str) -> Result<Vec<u8>, UnencodableChar>;
}

pub(crate) struct TrueTypeProgram {
    pub(crate) data: Vec<u8>,
    pub(crate) ps_name: String,
    pub(crate) units_per_em: f32,
    pub(crate) ascent: f32,
    pub(crate) descent: f32,
    pub(crate) cap_height: f32,
    pub(crate) bbox: Rect,
    glyphs: RefCell<HashMap<char, Option<(u16, f32)>>>,
    /// gid -> char, for the widths array and the ToUnicode map.
    pub(crate) used: BTreeMap<u16, char>,
}

impl TrueTypeProgram {
    /// Parse and vet a TrueType font for embedding text of `script`.
    pub(crate) fn parse(
        source_name: &str,
        data: Vec<u8>,
        script: Script,
    ) -> Result<(Self, String), FontSourceError> {
        if ttf_parser::fonts_in_collection(&data).is_some() {
            return Err(FontSourceError::Unembeddable("font collections are not supported".into()));
        }
        let face = Face::parse(&data, 0)
            .map_err(|e| FontSourceError::Unembeddable(format!("{source_name}: {e}")))?;
        if face.tables().glyf.is_none() {
            return Err(FontSourceError::Unembeddable(format!(
                "{source_name}: only TrueType outlines can be embedded"
            )));
        }
        if !script.probe_chars().iter().all(|&c| face.glyph_index(c).is_some()) {
            return Err(FontSourceError::MissingCoverage { script });
        }

        let units = face.units_per_em() as f32;
        let to_1000 = |v: f32| v / units * 1000.0;
        let bb = face.global_bounding_box();
        let bbox = Rect::new(
            to_1000(bb.x_min as f32),
            to_1000(bb.y_min as f32),
            to_1000(bb.x_max as f32),
            to_1000(bb.y_max as f32),
        );
        let ascent = to_1000(face.ascender() as f32);
        let descent = to_1000(face.descender() as f32);
        let cap_height = face
            .capital_height()
            .map(|h| to_1000(h as f32))
            .unwrap_or(700.0);
        let family = font_family_name(&face).unwrap_or_else(|| source_name.to_string());
        let ps_name = face
            .names()
            .into_iter()
            .find(|n| n.name_id == ttf_parser::name_id::POST_SCRIPT_NAME)
            .and_then(|n| n.to_string())
            .unwrap_or_else(|| family.replace(' ', ""));

        let program = TrueTypeProgram {
            data,
            ps_name,
            units_per_em: units,
            ascent,
            descent,
            cap_height,
            bbox,
            glyphs: RefCell::new(HashMap::new()),
            used: BTreeMap::new(),
        };
        Ok((program, family))
    }

    fn line_metrics(&self) -> Option<(f32, f32)> {
        let face = Face::parse(&self.data, 0).ok()?;
        let units = self.units_per_em;
        let line_gap = face.line_gap() as f32;
        let line_h_ratio = (face.ascender() as f32 - face.descender() as f32 + line_gap) / units;
        let ascender_ratio = face.ascender() as f32 / units;
        Some((line_h_ratio, ascender_ratio))
    }

    pub(crate) fn glyph(&self, c: char) -> Option<(u16, f32)> {
        if let Some(hit) = self.glyphs.borrow().get(&c) {
            return *hit;
        }
        let found = Face::parse(&self.data, 0).ok().and_then(|face| {
            let gid = face.glyph_index(c).filter(|g| g.0 != 0)?;
            let adv = face.glyph_hor_advance(gid).unwrap_or(0) as f32;
            Some((gid.0, adv / self.units_per_em * 1000.0))
        });
        self.glyphs.borrow_mut().insert(c, found);
        found
    }
}

pub(crate) enum FontProgram {
    Standard { font: StandardFont, widths: Vec<f32> },
    TrueType(Box<TrueTypeProgram>),
}

/// A font embedded in exactly one document.
pub struct EmbeddedFont {
    pub(crate) pdf_name: String,
    display_name: String,
    pub(crate) program: FontProgram,
    line_h_ratio: f32,
    ascender_ratio: f32,
}

impl EmbeddedFont {
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn is_standard(&self) -> bool {
        matches!(self.program, FontProgram::Standard { .. })
    }

    pub fn line_height(&self, font_size: f32) -> f32 {
        font_size * self.line_h_ratio
    }

    pub fn ascent(&self, font_size: f32) -> f32 {
        font_size * self.ascender_ratio
    }

    pub fn can_encode(&self, text: &str) -> bool {
        text.chars().all(|c| self.can_encode_char(c))
    }

    pub fn can_encode_char(&self, c: char) -> bool {
        match &self.program {
            FontProgram::Standard { .. } => winansi_byte(c).is_some(),
            FontProgram::TrueType(tt) => tt.glyph(c).is_some(),
        }
    }

    /// Bytes for a PDF text-showing operator. Glyphs used are recorded for the
    /// font's widths and ToUnicode tables.
    pub fn encode(&mut self, text: &str) -> Result<Vec<u8>, UnencodableChar> {
        match &mut self.program {
            FontProgram::Standard { .. } => encode_winansi(text).map_err(UnencodableChar),
            FontProgram::TrueType(tt) => {
                let mut out = Vec::with_capacity(text.len() * 2);
                let mut glyphs = Vec::with_capacity(text.len());
                for c in text.chars() {
                    let (gid, _) = tt.glyph(c).ok_or(UnencodableChar(c))?;
                    out.extend_from_slice(&gid.to_be_bytes());
                    glyphs.push((gid, c));
                }
                for (gid, c) in glyphs {
                    tt.used.entry(gid).or_insert(c);
                }
                Ok(out)
            }
        }
    }
}

impl TextEncoder for EmbeddedFont {
    fn encode(&mut self, text: &str) -> Result<Vec<u8>, UnencodableChar> {
        EmbeddedFont::encode(self, text)
    }
}

impl TextMeasure for EmbeddedFont {
    fn advance_1000(&self, c: char) -> f32 {
        match &self.program {
            FontProgram::Standard { widths, .. } => winansi_byte(c)
                .map(|b| widths[(b - 32) as usize])
                .unwrap_or(556.0),
            FontProgram::TrueType(tt) => tt.glyph(c).map(|(_, w)| w).unwrap_or(500.0),
        }
    }
}

/// Owner of every font object used by one output document.
pub struct FontArena {
    document: DocumentId,
    fonts: Vec<EmbeddedFont>,
}

impl Default for FontArena {
    fn default() -> Self {
        Self::new()
    }
}

impl FontArena {
    /// A fresh arena for a new document, with its own identity.
    pub fn new() -> Self {
        FontArena { document: DocumentId::next(), fonts: Vec::new() }
    }

    pub fn document_id(&self) -> DocumentId {
        self.document
    }

    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }

    pub fn fonts(&self) -> impl Iterator<Item = &EmbeddedFont> {
        self.fonts.iter()
    }

    fn push(&mut self, build: impl FnOnce(String) -> EmbeddedFont) -> Result<FontHandle, Error> {
        if self.fonts.len() >= MAX_FONTS_PER_DOCUMENT {
            return Err(Error::FontSlotsExhausted(self.document));
        }
        let slot = self.fonts.len();
        self.fonts.push(build(format!("F{}", slot + 1)));
        Ok(FontHandle { document: self.document, slot })
    }

    pub fn embed_standard(&mut self, font: StandardFont) -> Result<FontHandle, Error> {
        self.push(|pdf_name| EmbeddedFont {
            pdf_name,
            display_name: font.base_font().to_string(),
            program: FontProgram::Standard { font, widths: font.widths() },
            line_h_ratio: 1.2,
            ascender_ratio: 0.75,
        })
    }

    pub(crate) fn embed_truetype(
        &mut self,
        program: TrueTypeProgram,
        display_name: String,
    ) -> Result<FontHandle, Error> {
        let (line_h_ratio, ascender_ratio) = program.line_metrics().unwrap_or((1.2, 0.75));
        self.push(|pdf_name| EmbeddedFont {
            pdf_name,
            display_name,
            program: FontProgram::TrueType(Box::new(program)),
            line_h_ratio,
            ascender_ratio,
        })
    }

    fn check(&self, handle: FontHandle) -> Result<usize, Error> {
        if handle.document != self.document || handle.slot >= self.fonts.len() {
            return Err(Error::ForeignFontHandle { handle, arena: self.document });
        }
        Ok(handle.slot)
    }

    pub fn get(&self, handle: FontHandle) -> Result<&EmbeddedFont, Error> {
        let slot = self.check(handle)?;
        Ok(&self.fonts[slot])
    }

    pub fn get_mut(&mut self, handle: FontHandle) -> Result<&mut EmbeddedFont, Error> {
        let slot = self.check(handle)?;
        Ok(&mut self.fonts[slot])
    }
}
