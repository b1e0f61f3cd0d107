use std::borrow::Cow;

use proptest::prelude::*;
use sheetside_pdf::translit::{COVERAGE_CEILING, PLACEHOLDER, in_coverage, transliterate};

#[test]
fn text_in_coverage_is_borrowed_unchanged() {
    let text = "Café au lait, 12.50 £";
    assert!(matches!(transliterate(text), Cow::Borrowed(t) if t == text));
}

#[test]
fn symbols_become_ascii() {
    assert_eq!(transliterate("a — b"), "a -- b");
    assert_eq!(transliterate("“quoted” ‘text’"), "\"quoted\" 'text'");
    assert_eq!(transliterate("done ✓"), "done v");
    assert_eq!(transliterate("x ≤ 5 → ok…"), "x <= 5 -> ok...");
    assert_eq!(transliterate("price 5 €"), "price 5 EUR");
    assert_eq!(transliterate("zero\u{200B}width"), "zerowidth");
}

#[test]
fn cyrillic_becomes_latin_digraphs() {
    assert_eq!(transliterate("Щука"), "Shchuka");
    assert_eq!(transliterate("Жизнь"), "Zhizn'");
    assert_eq!(transliterate("привет"), "privet");
}

#[test]
fn unknown_codepoints_collapse_to_one_placeholder() {
    let out = transliterate("a\u{E000}\u{E001}\u{E002}b");
    assert_eq!(out, format!("a{PLACEHOLDER}b"));
}

#[test]
fn literal_question_marks_are_kept() {
    assert_eq!(transliterate("Что??"), "Chto??");
}

#[test]
fn accents_outside_latin1_are_stripped() {
    // ó and á are Latin-1 and survive.
    assert_eq!(transliterate("Łódź"), "Lódz");
    assert_eq!(transliterate("Dvořák"), "Dvorák");
}

proptest! {
    #[test]
    fn output_stays_within_coverage(text in "\\PC{0,64}") {
        let out = transliterate(&text);
        prop_assert!(out.chars().all(|c| (c as u32) <= COVERAGE_CEILING && in_coverage(c)));
    }

    #[test]
    fn transliteration_is_idempotent(text in "\\PC{0,64}") {
        let once = transliterate(&text).into_owned();
        let twice = transliterate(&once).into_owned();
        prop_assert_eq!(once, twice);
    }
}
