// Line splitter: turns one Swedish sentence into short display rows.
//
// The rows are what a poem is made of. Splitting runs in a fixed order on
// the lowercased sentence:
// 1. Idioms ("i och med", ...) are glued together with a no-break marker.
// 2. Parenthesized spans become rows of their own; the text around them is
//    kept as separate rows.
// 3. Rows split at ", ", ": " and "; ".
// 4. Rows split again right before a breakword, but only when the current
//    row already holds more than three words and at least three words
//    (breakword included) remain.
// 5. The marker turns back into a space, edge punctuation is trimmed, space
//    runs collapse, and empty rows disappear.
//
// Used by `kommunpoet_engine` for both extractive and chaos poems.

use std::sync::LazyLock;

use regex::Regex;

/// Connective words that make good line starts.
pub const BREAKWORDS: [&str; 22] = [
    "en", "ett", "och", "på", "i", "till", "som", "av", "efter", "från", "för", "genom", "hos",
    "om", "vid", "med", "under", "har", "eller", "att", "samt", "men",
];

/// Multi-word expressions that must never be split across rows.
pub const IDIOMS: [&str; 3] = ["i och med", "från och med", "till och med"];

/// Stands in for the spaces inside an idiom while rows are being split.
/// Uppercase, so it cannot occur in the lowercased input.
const NOBREAK: &str = "<NOBREAK>";

/// Characters trimmed from both ends of every finished row.
const TRIM_CHARS: [char; 6] = [' ', '.', ';', ':', '!', '?'];

/// Minimum words already on a row before a breakword may start a new one
/// (exclusive).
const MIN_WORDS_BEFORE_BREAK: usize = 3;

/// Minimum words left in the row, breakword included, for a break.
const MIN_WORDS_AFTER_BREAK: usize = 3;

static PARENTHESIZED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(.*?\)").expect("parenthesis pattern is valid"));

static CLAUSE_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[;:,] ").expect("clause pattern is valid"));

static SPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r" {2,}").expect("space-run pattern is valid"));

/// Split a sentence into display rows.
///
/// Pure and deterministic. A sentence with no parentheses, clause
/// punctuation or usable breakwords comes back as a single row.
pub fn split_sentence_into_rows(sentence: &str) -> Vec<String> {
    let mut sentence = sentence.to_lowercase();
    for idiom in IDIOMS {
        sentence = sentence.replace(idiom, &idiom.replace(' ', NOBREAK));
    }

    let rows = split_parentheses(&sentence);

    let rows: Vec<&str> = rows
        .iter()
        .flat_map(|row| CLAUSE_BOUNDARY.split(row))
        .collect();

    let mut broken = Vec::new();
    for row in rows {
        broken.extend(break_at_breakwords(row));
    }

    broken
        .into_iter()
        .map(|row| {
            let row = row.replace(NOBREAK, " ");
            SPACE_RUN
                .replace_all(row.trim_matches(TRIM_CHARS), " ")
                .into_owned()
        })
        .filter(|row| !row.is_empty())
        .collect()
}

/// Pull every parenthesized span out into its own row.
///
/// Text before each span becomes a row, the span's contents (without the
/// parentheses) become the next row, and scanning continues on the rest.
fn split_parentheses(sentence: &str) -> Vec<String> {
    let mut rows = Vec::new();
    let mut rest = sentence;
    while let Some(m) = PARENTHESIZED.find(rest) {
        rows.push(rest[..m.start()].trim().to_string());
        rows.push(m.as_str().trim_matches(['(', ')']).to_string());
        rest = rest[m.end()..].trim();
    }
    if !rest.is_empty() {
        rows.push(rest.to_string());
    }
    rows
}

/// Start a new row before each breakword that leaves enough words on both
/// sides.
fn break_at_breakwords(row: &str) -> Vec<String> {
    let words: Vec<&str> = row.split(' ').collect();
    let mut rows = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for (idx, &word) in words.iter().enumerate() {
        if BREAKWORDS.contains(&word)
            && current.len() > MIN_WORDS_BEFORE_BREAK
            && words.len() - idx >= MIN_WORDS_AFTER_BREAK
        {
            rows.push(current.join(" "));
            current.clear();
        }
        current.push(word);
    }
    rows.push(current.join(" "));
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_sentence_is_one_trimmed_row() {
        assert_eq!(
            split_sentence_into_rows("Kyrkan byggdes tidigt."),
            vec!["kyrkan byggdes tidigt"]
        );
    }

    #[test]
    fn lowercases_input() {
        assert_eq!(split_sentence_into_rows("Huddinge Kommun"), vec!["huddinge kommun"]);
    }

    #[test]
    fn leading_idiom_is_not_broken() {
        let rows = split_sentence_into_rows("I och med detta så ökade befolkningen kraftigt");
        assert_eq!(rows, vec!["i och med detta så ökade befolkningen kraftigt"]);
    }

    #[test]
    fn idiom_in_breakable_position_stays_together() {
        // Without protection "till" would start a new row here.
        let rows =
            split_sentence_into_rows("kommunen har vuxit kraftigt till och med år 2000 enligt scb");
        assert_eq!(rows.len(), 1);
        assert!(rows[0].contains("till och med"));
    }

    #[test]
    fn no_break_with_exactly_three_words_before() {
        let rows = split_sentence_into_rows("tre ord här och sedan många fler ord");
        assert_eq!(rows, vec!["tre ord här och sedan många fler ord"]);
    }

    #[test]
    fn breaks_with_four_words_before() {
        let rows = split_sentence_into_rows("kommunen ligger nära sjön och har många öar");
        assert_eq!(rows, vec!["kommunen ligger nära sjön", "och har många öar"]);
    }

    #[test]
    fn no_break_when_fewer_than_three_words_remain() {
        let rows = split_sentence_into_rows("kommunen ligger nära sjön och ån");
        assert_eq!(rows, vec!["kommunen ligger nära sjön och ån"]);
    }

    #[test]
    fn parenthetical_becomes_own_row() {
        let rows = split_sentence_into_rows("kommunen (grundad 1862) ligger i söder");
        assert_eq!(rows, vec!["kommunen", "grundad 1862", "ligger i söder"]);
        assert!(rows.iter().all(|r| !r.contains('(') && !r.contains(')')));
    }

    #[test]
    fn multiple_parentheticals() {
        let rows = split_sentence_into_rows("a (b) c (d) e");
        assert_eq!(rows, vec!["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn sentence_entirely_in_parens_is_one_row() {
        assert_eq!(split_sentence_into_rows("(se även nedan)"), vec!["se även nedan"]);
    }

    #[test]
    fn splits_at_clause_punctuation() {
        let rows = split_sentence_into_rows("skog, sjöar; berg: dalar");
        assert_eq!(rows, vec!["skog", "sjöar", "berg", "dalar"]);
    }

    #[test]
    fn comma_without_space_does_not_split() {
        assert_eq!(split_sentence_into_rows("3,5 procent"), vec!["3,5 procent"]);
    }

    #[test]
    fn collapses_space_runs_and_drops_empty_rows() {
        let rows = split_sentence_into_rows("..., norr  om  staden");
        assert_eq!(rows, vec!["norr om staden"]);
    }

    #[test]
    fn empty_sentence_yields_nothing() {
        assert!(split_sentence_into_rows("").is_empty());
        assert!(split_sentence_into_rows(" . ").is_empty());
    }
}
