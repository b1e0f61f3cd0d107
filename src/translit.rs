//! Lossy but deterministic reduction of arbitrary text to the codepoints every
//! built-in font can draw: printable ASCII plus the Latin-1 supplement.

use std::borrow::Cow;

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Highest codepoint guaranteed to survive transliteration.
pub const COVERAGE_CEILING: u32 = 0xFF;
pub const PLACEHOLDER: char = '?';

pub fn in_coverage(c: char) -> bool {
    matches!(c as u32, 0x20..=0x7E | 0xA0..=0xFF)
}

/// Transliterate `text` into the coverage range.
///
/// Symbols are sanitized first; the per-script tables only run when the
/// sanitized text still has out-of-coverage characters. Anything left over
/// becomes [`PLACEHOLDER`], with runs of generated placeholders collapsed.
/// Idempotent: the output is always entirely in coverage, which is returned
/// unchanged.
pub fn transliterate(text: &str) -> Cow<'_, str> {
    if text.chars().all(in_coverage) {
        return Cow::Borrowed(text);
    }
    let sanitized = sanitize_symbols(text);
    if sanitized.chars().all(in_coverage) {
        return Cow::Owned(sanitized);
    }
    Cow::Owned(transliterate_scripts(&sanitized))
}

fn sanitize_symbols(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if in_coverage(c) {
            out.push(c);
        } else if let Some(rep) = symbol(c) {
            out.push_str(rep);
        } else {
            out.push(c);
        }
    }
    out
}

fn symbol(c: char) -> Option<&'static str> {
    let rep = match c {
        '\t' | '\n' | '\r' => " ",
        '\u{0000}'..='\u{001F}' | '\u{007F}'..='\u{009F}' => "",
        '\u{200B}'..='\u{200D}' | '\u{2060}' | '\u{FEFF}' | '\u{FE0E}' | '\u{FE0F}' => "",
        '\u{2002}'..='\u{200A}' | '\u{202F}' | '\u{205F}' | '\u{3000}' => " ",
        '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{201B}' | '\u{2032}' => "'",
        '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{201F}' | '\u{2033}' => "\"",
        '\u{300C}' | '\u{300D}' | '\u{300E}' | '\u{300F}' => "\"",
        '\u{2039}' => "<",
        '\u{203A}' => ">",
        '\u{2010}'..='\u{2013}' | '\u{2212}' => "-",
        '\u{2014}' | '\u{2015}' => "--",
        '\u{2026}' => "...",
        '\u{2022}' | '\u{2023}' | '\u{25CF}' | '\u{25E6}' | '\u{2043}' => "*",
        '\u{2605}' | '\u{2606}' => "*",
        '\u{3001}' => ",",
        '\u{3002}' => ".",
        '\u{2264}' => "<=",
        '\u{2265}' => ">=",
        '\u{2260}' => "!=",
        '\u{2248}' => "~",
        '\u{221E}' => "inf",
        '\u{221A}' => "sqrt",
        '\u{2211}' => "sum",
        '\u{2030}' => "0/00",
        '\u{2192}' => "->",
        '\u{2190}' => "<-",
        '\u{2194}' => "<->",
        '\u{21D2}' => "=>",
        '\u{20AC}' => "EUR",
        '\u{20BD}' => "RUB",
        '\u{20B9}' => "INR",
        '\u{20A9}' => "KRW",
        '\u{20BA}' => "TRY",
        '\u{2122}' => "(TM)",
        '\u{2116}' => "No.",
        '\u{2713}' | '\u{2714}' | '\u{2611}' | '\u{2705}' => "v",
        '\u{2717}' | '\u{2718}' | '\u{2612}' | '\u{274C}' => "x",
        '\u{2610}' => "[ ]",
        '\u{26A0}' => "(!)",
        '\u{2139}' => "(i)",
        '\u{2764}' => "<3",
        '\u{260E}' | '\u{1F4DE}' => "[tel]",
        '\u{2709}' | '\u{1F4E7}' => "[mail]",
        '\u{1F4C5}' | '\u{1F4C6}' => "[date]",
        '\u{1F44D}' => "(y)",
        '\u{1F44E}' => "(n)",
        '\u{1F600}'..='\u{1F60A}' | '\u{1F642}' | '\u{263A}' => ":)",
        '\u{1F61E}' | '\u{1F622}' | '\u{1F641}' | '\u{2639}' => ":(",
        _ => return None,
    };
    Some(rep)
}

fn transliterate_scripts(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last_was_placeholder = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_coverage(c) {
            out.push(c);
            last_was_placeholder = false;
            continue;
        }

        if let Some(base) = devanagari_consonant(c) {
            out.push_str(base);
            if !chars.peek().is_some_and(|&n| suppresses_inherent_vowel(n)) {
                out.push('a');
            }
            last_was_placeholder = false;
            continue;
        }

        match transliterate_char(c) {
            Some(rep) => {
                out.push_str(&rep);
                if !rep.is_empty() {
                    last_was_placeholder = false;
                }
            }
            None => {
                if !last_was_placeholder {
                    out.push(PLACEHOLDER);
                }
                last_was_placeholder = true;
            }
        }
    }
    out
}

fn transliterate_char(c: char) -> Option<Cow<'static, str>> {
    if let Some(rep) = table_lookup(c) {
        return Some(rep);
    }

    // Compatibility decomposition handles accents, ligatures, fullwidth forms
    // and Arabic presentation forms.
    let mut rep = String::new();
    for d in std::iter::once(c).nfkd() {
        if d == c {
            return None;
        }
        if in_coverage(d) {
            rep.push(d);
        } else if is_combining_mark(d) {
            continue;
        } else if let Some(t) = table_lookup(d) {
            rep.push_str(&t);
        }
    }
    if rep.is_empty() { None } else { Some(Cow::Owned(rep)) }
}

fn table_lookup(c: char) -> Option<Cow<'static, str>> {
    if let Some(s) = cyrillic(c) {
        return Some(Cow::Borrowed(s));
    }
    if c.is_uppercase()
        && let Some(lower) = c.to_lowercase().next()
        && let Some(s) = cyrillic(lower).or_else(|| greek(lower))
    {
        return Some(Cow::Owned(capitalize(s)));
    }
    greek(c)
        .or_else(|| latin_extended(c))
        .or_else(|| arabic(c))
        .or_else(|| devanagari(c))
        .map(Cow::Borrowed)
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn cyrillic(c: char) -> Option<&'static str> {
    let rep = match c {
        'а' => "a",
        'б' => "b",
        'в' => "v",
        'г' => "g",
        'д' => "d",
        'е' => "e",
        'ё' => "yo",
        'ж' => "zh",
        'з' => "z",
        'и' => "i",
        'й' => "y",
        'к' => "k",
        'л' => "l",
        'м' => "m",
        'н' => "n",
        'о' => "o",
        'п' => "p",
        'р' => "r",
        'с' => "s",
        'т' => "t",
        'у' => "u",
        'ф' => "f",
        'х' => "kh",
        'ц' => "ts",
        'ч' => "ch",
        'ш' => "sh",
        'щ' => "shch",
        'ъ' => "",
        'ы' => "y",
        'ь' => "'",
        'э' => "e",
        'ю' => "yu",
        'я' => "ya",
        'і' => "i",
        'ї' => "yi",
        'є' => "ye",
        'ґ' => "g",
        'ў' => "u",
        'ђ' => "dj",
        'ј' => "j",
        'љ' => "lj",
        'њ' => "nj",
        'ћ' => "c",
        'џ' => "dz",
        'ѓ' => "gj",
        'ќ' => "kj",
        'ѕ' => "dz",
        _ => return None,
    };
    Some(rep)
}

fn greek(c: char) -> Option<&'static str> {
    let rep = match c {
        'α' => "a",
        'β' => "v",
        'γ' => "g",
        'δ' => "d",
        'ε' => "e",
        'ζ' => "z",
        'η' => "i",
        'θ' => "th",
        'ι' => "i",
        'κ' => "k",
        'λ' => "l",
        'μ' => "m",
        'ν' => "n",
        'ξ' => "x",
        'ο' => "o",
        'π' => "p",
        'ρ' => "r",
        'σ' | 'ς' => "s",
        'τ' => "t",
        'υ' => "y",
        'φ' => "f",
        'χ' => "ch",
        'ψ' => "ps",
        'ω' => "o",
        _ => return None,
    };
    Some(rep)
}

/// Latin letters outside Latin-1 that have no canonical decomposition.
fn latin_extended(c: char) -> Option<&'static str> {
    let rep = match c {
        'Đ' => "D",
        'đ' => "d",
        'Ħ' => "H",
        'ħ' => "h",
        'ı' => "i",
        'Ł' => "L",
        'ł' => "l",
        'Ŀ' => "L",
        'ŀ' => "l",
        'Œ' => "OE",
        'œ' => "oe",
        'Ŋ' => "N",
        'ŋ' => "n",
        'ſ' => "s",
        'Ŧ' => "T",
        'ŧ' => "t",
        'ƒ' => "f",
        'Ə' => "E",
        'ə' => "e",
        _ => return None,
    };
    Some(rep)
}

fn arabic(c: char) -> Option<&'static str> {
    let rep = match c {
        '\u{0621}' => "'",
        '\u{0622}' | '\u{0623}' | '\u{0625}' | '\u{0627}' => "a",
        '\u{0624}' => "'",
        '\u{0626}' => "'",
        '\u{0628}' => "b",
        '\u{0629}' => "h",
        '\u{062A}' => "t",
        '\u{062B}' => "th",
        '\u{062C}' => "j",
        '\u{062D}' => "h",
        '\u{062E}' => "kh",
        '\u{062F}' => "d",
        '\u{0630}' => "dh",
        '\u{0631}' => "r",
        '\u{0632}' => "z",
        '\u{0633}' => "s",
        '\u{0634}' => "sh",
        '\u{0635}' => "s",
        '\u{0636}' => "d",
        '\u{0637}' => "t",
        '\u{0638}' => "z",
        '\u{0639}' => "'",
        '\u{063A}' => "gh",
        '\u{0640}' => "",
        '\u{0641}' => "f",
        '\u{0642}' => "q",
        '\u{0643}' | '\u{06A9}' => "k",
        '\u{0644}' => "l",
        '\u{0645}' => "m",
        '\u{0646}' => "n",
        '\u{0647}' => "h",
        '\u{0648}' => "w",
        '\u{0649}' => "a",
        '\u{064A}' | '\u{06CC}' => "y",
        '\u{064B}'..='\u{0652}' => "",
        '\u{067E}' => "p",
        '\u{0686}' => "ch",
        '\u{0698}' => "zh",
        '\u{06AF}' => "g",
        '\u{060C}' => ",",
        '\u{061B}' => ";",
        '\u{061F}' => "?",
        '\u{066A}' => "%",
        '\u{0660}' | '\u{06F0}' => "0",
        '\u{0661}' | '\u{06F1}' => "1",
        '\u{0662}' | '\u{06F2}' => "2",
        '\u{0663}' | '\u{06F3}' => "3",
        '\u{0664}' | '\u{06F4}' => "4",
        '\u{0665}' | '\u{06F5}' => "5",
        '\u{0666}' | '\u{06F6}' => "6",
        '\u{0667}' | '\u{06F7}' => "7",
        '\u{0668}' | '\u{06F8}' => "8",
        '\u{0669}' | '\u{06F9}' => "9",
        _ => return None,
    };
    Some(rep)
}

/// Consonants carry an inherent "a" unless a vowel sign or virama follows.
fn devanagari_consonant(c: char) -> Option<&'static str> {
    let rep = match c {
        'क' => "k",
        'ख' => "kh",
        'ग' => "g",
        'घ' => "gh",
        'ङ' => "ng",
        'च' => "ch",
        'छ' => "chh",
        'ज' => "j",
        'झ' => "jh",
        'ञ' => "ny",
        'ट' | 'त' => "t",
        'ठ' | 'थ' => "th",
        'ड' | 'द' => "d",
        'ढ' | 'ध' => "dh",
        'ण' | 'न' => "n",
        'प' => "p",
        'फ' => "ph",
        'ब' => "b",
        'भ' => "bh",
        'म' => "m",
        'य' => "y",
        'र' => "r",
        'ल' => "l",
        'व' => "v",
        'श' | 'ष' => "sh",
        'स' => "s",
        'ह' => "h",
        _ => return None,
    };
    Some(rep)
}

fn suppresses_inherent_vowel(c: char) -> bool {
    matches!(c as u32, 0x093C | 0x093E..=0x094D)
}

fn devanagari(c: char) -> Option<&'static str> {
    let rep = match c {
        'अ' => "a",
        'आ' => "aa",
        'इ' => "i",
        'ई' => "ii",
        'उ' => "u",
        'ऊ' => "uu",
        'ऋ' => "ri",
        'ए' => "e",
        'ऐ' => "ai",
        'ओ' => "o",
        'औ' => "au",
        'ा' => "aa",
        'ि' => "i",
        'ी' => "ii",
        'ु' => "u",
        'ू' => "uu",
        'ृ' => "ri",
        'े' => "e",
        'ै' => "ai",
        'ो' => "o",
        'ौ' => "au",
        '्' | '़' => "",
        'ँ' | 'ं' => "n",
        'ः' => "h",
        '।' | '॥' => ".",
        'ॐ' => "om",
        '०' => "0",
        '१' => "1",
        '२' => "2",
        '३' => "3",
        '४' => "4",
        '५' => "5",
        '६' => "6",
        '७' => "7",
        '८' => "8",
        '९' => "9",
        _ => return None,
    };
    Some(rep)
}
