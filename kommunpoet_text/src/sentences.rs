// Sentence extraction for extractive poems.
//
// Splits a paragraph at ".", "?" or "!" followed by a space. This is a
// deliberately naive boundary rule (abbreviations split too); the line
// splitter trims whatever punctuation is left over. Sentences that open
// with the "blasonering" heading (heraldic descriptions of the coat of
// arms) are dropped.

use std::sync::LazyLock;

use regex::Regex;

/// Sentences whose lowercase form starts with this are boilerplate.
pub const BANNED_PREFIX: &str = "blasonering";

static SENTENCE_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.?!] ").expect("sentence pattern is valid"));

/// Split one subsection (paragraph text) into sentences, in order.
pub fn extract_sentences(subsection: &str) -> Vec<String> {
    SENTENCE_BOUNDARY
        .split(subsection)
        .filter(|sentence| !is_boilerplate(sentence))
        .map(str::to_string)
        .collect()
}

/// Whether a sentence is the heraldry heading.
pub fn is_boilerplate(sentence: &str) -> bool {
    sentence.to_lowercase().starts_with(BANNED_PREFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_terminal_punctuation_followed_by_space() {
        let sentences = extract_sentences("Ett. Två? Tre! Fyra.");
        assert_eq!(sentences, vec!["Ett", "Två", "Tre", "Fyra."]);
    }

    #[test]
    fn punctuation_without_space_does_not_split() {
        assert_eq!(extract_sentences("Värdet är 3.5 procent"), vec!["Värdet är 3.5 procent"]);
    }

    #[test]
    fn drops_blasonering_sentences_case_insensitively() {
        let sentences = extract_sentences(
            "Blasonering: I blått fält en gående älg. Kommunen bildades 1971. blasonering igen",
        );
        assert_eq!(sentences, vec!["Kommunen bildades 1971"]);
    }

    #[test]
    fn keeps_sentences_mentioning_blasonering_later() {
        let sentences = extract_sentences("Vapnets blasonering är gammal.");
        assert_eq!(sentences, vec!["Vapnets blasonering är gammal."]);
    }

    #[test]
    fn empty_input_yields_one_empty_sentence() {
        // Empty rows are dropped later by the line splitter.
        assert_eq!(extract_sentences(""), vec![""]);
    }
}
