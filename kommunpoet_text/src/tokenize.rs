// Tokenization of the training corpus for the chain model.
//
// Unlike `sentences.rs` (which splits naively, for extractive poems), this
// module tries to find real sentence boundaries so the chain learns where
// sentences begin and end. A boundary follows a word ending in ".", "?" or
// "!" (optionally followed by closing quotes or brackets) and whitespace,
// provided the next character is not lowercase or a dash and the word is
// not a known Swedish abbreviation.
//
// Sentences containing quotes, parentheses or brackets are not used for
// training: the chain cannot balance them.

use std::sync::LazyLock;

use regex::Regex;

/// Lowercase abbreviations (without their final period) that do not end a
/// sentence.
const ABBREVIATIONS: [&str; 30] = [
    "bl.a", "t.ex", "ca", "s.k", "m.m", "d.v.s", "dvs", "o.s.v", "osv", "etc", "kl", "nr", "st",
    "jfr", "resp", "f.d", "f.ö", "fr.o.m", "t.o.m", "f.kr", "e.kr", "kr", "m.fl", "o.d", "p.g.a",
    "pga", "s", "sek", "v", "vs",
];

static POTENTIAL_END: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([\w.'’&\])]+[.?!])([‘’“”'")\]]*)(\s+)"#).expect("sentence end pattern is valid")
});

static APOSTROPHE_AT_WORD_EDGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s'|'\s").expect("apostrophe pattern is valid"));

/// Split running text into sentences at likely boundaries.
///
/// Returned sentences are trimmed; empty ones are dropped.
pub fn split_into_sentences(text: &str) -> Vec<String> {
    let mut ends = Vec::new();
    for caps in POTENTIAL_END.captures_iter(text) {
        let (Some(word), Some(closing), Some(space)) = (caps.get(1), caps.get(2), caps.get(3))
        else {
            continue;
        };
        let next = text[space.end()..].chars().next();
        if next.is_some_and(|c| c.is_lowercase() || matches!(c, '-' | '–' | '—')) {
            continue;
        }
        if is_sentence_ender(word.as_str()) {
            ends.push(closing.end());
        }
    }

    let mut sentences = Vec::new();
    let mut start = 0;
    for end in ends.into_iter().chain(std::iter::once(text.len())) {
        let sentence = text[start..end].trim();
        if !sentence.is_empty() {
            sentences.push(sentence.to_string());
        }
        start = end;
    }
    sentences
}

/// Whether a word ending in terminal punctuation closes its sentence.
fn is_sentence_ender(word: &str) -> bool {
    if word.ends_with(['?', '!']) {
        return true;
    }
    // Acronyms such as "SCB." end sentences.
    if word.chars().filter(char::is_ascii_uppercase).count() > 1 {
        return true;
    }
    word.ends_with('.') && !is_abbreviation(word)
}

fn is_abbreviation(dotted_word: &str) -> bool {
    let clipped = dotted_word.strip_suffix('.').unwrap_or(dotted_word);
    let clipped = clipped.to_lowercase();
    ABBREVIATIONS.contains(&clipped.as_str())
}

/// Whether a sentence is usable as training input for the chain.
///
/// Rejects empty sentences and any containing double quotes, parentheses,
/// brackets, or apostrophes at the edge of a word.
pub fn is_valid_training_sentence(sentence: &str) -> bool {
    if sentence.trim().is_empty() {
        return false;
    }
    let normalized: String = sentence
        .chars()
        .map(|c| match c {
            '’' | '‘' => '\'',
            '“' | '”' | '„' => '"',
            other => other,
        })
        .collect();
    if normalized.starts_with('\'') || normalized.ends_with('\'') {
        return false;
    }
    if normalized.contains(['"', '(', ')', '[', ']']) {
        return false;
    }
    !APOSTROPHE_AT_WORD_EDGE.is_match(&normalized)
}

/// Split a sentence into whitespace-separated words.
pub fn words(sentence: &str) -> Vec<String> {
    sentence.split_whitespace().map(str::to_string).collect()
}

/// Turn running text into the word runs the chain is trained on.
pub fn training_corpus(text: &str) -> Vec<Vec<String>> {
    split_into_sentences(text)
        .iter()
        .filter(|sentence| is_valid_training_sentence(sentence))
        .map(|sentence| words(sentence))
        .collect()
}
