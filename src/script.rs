use std::fmt;

use crate::columns::{content_rows, surviving_columns};
use crate::model::Table;

/// Characters inspected per document, regardless of its size.
pub const SAMPLE_CHARS: usize = 1000;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Script {
    Latin,
    Cyrillic,
    Cjk,
    Arabic,
    Devanagari,
}

impl Script {
    pub const ALL: [Script; 5] = [
        Script::Latin,
        Script::Cyrillic,
        Script::Cjk,
        Script::Arabic,
        Script::Devanagari,
    ];

    /// Bucket for one codepoint, or `None` for digits, punctuation and unknown scripts.
    pub fn of(c: char) -> Option<Script> {
        match c as u32 {
            0x0041..=0x005A | 0x0061..=0x007A => Some(Script::Latin),
            0x00C0..=0x00D6 | 0x00D8..=0x00F6 | 0x00F8..=0x024F => Some(Script::Latin),
            0x1E00..=0x1EFF => Some(Script::Latin),
            0x0400..=0x052F | 0x1C80..=0x1C8F | 0x2DE0..=0x2DFF | 0xA640..=0xA69F => {
                Some(Script::Cyrillic)
            }
            0x0600..=0x06FF | 0x0750..=0x077F | 0x08A0..=0x08FF => Some(Script::Arabic),
            0xFB50..=0xFDFF | 0xFE70..=0xFEFF => Some(Script::Arabic),
            0x0900..=0x097F | 0xA8E0..=0xA8FF => Some(Script::Devanagari),
            0x3040..=0x30FF | 0x3100..=0x312F | 0x31F0..=0x31FF => Some(Script::Cjk),
            0x3400..=0x4DBF | 0x4E00..=0x9FFF | 0xF900..=0xFAFF => Some(Script::Cjk),
            0xAC00..=0xD7AF | 0x1100..=0x11FF | 0x3130..=0x318F => Some(Script::Cjk),
            0x20000..=0x2FA1F => Some(Script::Cjk),
            _ => None,
        }
    }

    /// Characters a font must map to count as supporting this script.
    pub fn probe_chars(self) -> &'static [char] {
        match self {
            Script::Latin => &['A', 'a', '0'],
            Script::Cyrillic => &['\u{0410}', '\u{0416}', '\u{044F}'],
            Script::Cjk => &['\u{4E2D}', '\u{6587}', '\u{5B57}'],
            Script::Arabic => &['\u{0627}', '\u{0628}', '\u{0639}'],
            Script::Devanagari => &['\u{0915}', '\u{0916}', '\u{0917}'],
        }
    }
}

impl fmt::Display for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Script::Latin => "Latin",
            Script::Cyrillic => "Cyrillic",
            Script::Cjk => "CJK",
            Script::Arabic => "Arabic",
            Script::Devanagari => "Devanagari",
        };
        f.write_str(name)
    }
}

impl std::str::FromStr for Script {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Script::ALL
            .into_iter()
            .find(|script| script.to_string().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown script \"{s}\" (expected latin, cyrillic, cjk, arabic or devanagari)"))
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScriptProfile {
    pub script: Script,
    pub confidence: f32,
}

impl ScriptProfile {
    pub const NEUTRAL: ScriptProfile = ScriptProfile { script: Script::Latin, confidence: 0.5 };
}

/// Dominant script of `text`. Ties go to the script listed first in [`Script::ALL`].
pub fn classify(text: &str) -> ScriptProfile {
    let mut counts = [0usize; Script::ALL.len()];
    for c in text.chars().take(SAMPLE_CHARS) {
        if let Some(script) = Script::of(c) {
            counts[script as usize] += 1;
        }
    }
    let total: usize = counts.iter().sum();
    if total == 0 {
        return ScriptProfile::NEUTRAL;
    }

    let mut best = 0;
    for (i, &n) in counts.iter().enumerate() {
        if n > counts[best] {
            best = i;
        }
    }
    ScriptProfile {
        script: Script::ALL[best],
        confidence: (counts[best] as f32 / total as f32).clamp(0.0, 1.0),
    }
}

/// Up to [`SAMPLE_CHARS`] characters of cell text, in table/row/column order.
/// Only the rows and columns that will be drawn are sampled.
pub fn sample_text<'a>(tables: impl IntoIterator<Item = &'a Table>) -> String {
    let mut sample = String::new();
    let mut taken = 0usize;
    'outer: for table in tables {
        let columns = surviving_columns(table);
        for ri in content_rows(table, &columns) {
            let row = &table.rows[ri];
            for cell in columns.iter().filter_map(|&c| row.cell(c)) {
                if cell.is_empty() {
                    continue;
                }
                for c in cell.display_text().chars().chain(std::iter::once(' ')) {
                    if taken == SAMPLE_CHARS {
                        break 'outer;
                    }
                    sample.push(c);
                    taken += 1;
                }
            }
        }
    }
    sample
}
