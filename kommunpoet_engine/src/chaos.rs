// Chaos poems: sentences generated from a record's word chain.
//
// `SeededText` drives a `TextModel` with a `ReseedingRng`. With a seed, the
// seed evolves (and the stream restarts) at fixed hook points:
// - once at the start of every `make_sentence` call,
// - before every chain transition (inside `Chain::move_from`),
// - before every overlap check of a candidate sentence.
// Two requests with the same starting seed therefore produce identical
// sentence sequences.
//
// A candidate is rejected if it copies too long a run of words verbatim
// from the training text: any window of `min(max_overlap_total,
// round(max_overlap_ratio * words)) + 1` consecutive words found in the
// joined training sentences disqualifies it. Empty candidates always fail.
//
// `render_chaos` keeps requesting sentences, strips citation/heading
// markers, skips duplicates, and appends each sentence's rows plus a stanza
// break until the poem is long enough or `max_chaos_rounds` is spent.

use std::sync::LazyLock;

use kommunpoet_prng::ReseedingRng;
use kommunpoet_text::split_sentence_into_rows;
use regex::Regex;
use tracing::debug;

use crate::config::PoetConfig;
use crate::entropy_rng;
use crate::markov::TextModel;
use crate::poem::Poem;

/// Citation and heading markers removed from generated sentences.
static BOILERPLATE_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(källa|källor|blasonering): ").expect("boilerplate pattern is valid")
});

/// A text model paired with the generator that steers it.
pub struct SeededText<'a> {
    model: &'a TextModel,
    rng: ReseedingRng,
    max_overlap_ratio: f64,
    max_overlap_total: usize,
}

impl<'a> SeededText<'a> {
    /// Seeded if a non-zero `seed` is given, entropy-driven otherwise.
    ///
    /// Zero is a fixed point of `evolve_seed`: every hook would restart the
    /// same stream and every walk would repeat. It counts as no seed.
    pub fn new(model: &'a TextModel, seed: Option<u64>, config: &PoetConfig) -> Self {
        let rng = match seed.filter(|&seed| seed != 0) {
            Some(seed) => ReseedingRng::seeded(seed),
            None => ReseedingRng::unseeded(entropy_rng()),
        };
        Self {
            model,
            rng,
            max_overlap_ratio: config.max_overlap_ratio,
            max_overlap_total: config.max_overlap_total,
        }
    }

    /// Current seed, if seeded.
    pub fn seed(&self) -> Option<u64> {
        self.rng.seed()
    }

    /// Walk the chain up to `tries` times and return the first candidate
    /// that passes the overlap check.
    pub fn make_sentence(&mut self, tries: usize) -> Option<String> {
        self.rng.advance();
        for _ in 0..tries {
            let words = self.model.chain().walk(&mut self.rng);
            self.rng.advance();
            if self.passes_overlap_check(&words) {
                return Some(words.join(" "));
            }
        }
        None
    }

    /// Whether `words` avoids copying the training text verbatim.
    fn passes_overlap_check(&self, words: &[String]) -> bool {
        let Some(source) = self.model.rejoined_text() else {
            return true;
        };
        let ratio = (self.max_overlap_ratio * words.len() as f64).round_ties_even() as usize;
        let overlap_max = self.max_overlap_total.min(ratio);
        let window = overlap_max + 1;
        let gram_count = words.len().saturating_sub(overlap_max).max(1);

        (0..gram_count).all(|start| {
            let end = (start + window).min(words.len());
            !source.contains(&words[start..end].join(" "))
        })
    }
}

/// Remove "källa: ", "källor: " and "blasonering: " markers.
pub fn strip_boilerplate(sentence: &str) -> String {
    BOILERPLATE_MARKER.replace_all(sentence, "").into_owned()
}

/// Assemble a chaos poem from generated sentences.
pub fn render_chaos(model: &TextModel, seed: Option<u64>, config: &PoetConfig) -> Poem {
    let mut text = SeededText::new(model, seed, config);
    let mut used: Vec<String> = Vec::new();
    let mut poem = Poem::new();

    for round in 0..config.max_chaos_rounds {
        if poem.line_count() >= config.min_lines {
            break;
        }
        let Some(sentence) = text.make_sentence(config.sentence_tries) else {
            debug!(round, "no acceptable sentence within attempt budget");
            continue;
        };
        let sentence = strip_boilerplate(&sentence);
        if sentence.is_empty() || used.contains(&sentence) {
            continue;
        }
        poem.extend(split_sentence_into_rows(&sentence));
        poem.push_break();
        used.push(sentence);
    }

    if poem.line_count() < config.min_lines {
        debug!(
            lines = poem.line_count(),
            sentences = used.len(),
            "chaos poem stopped short"
        );
    }
    poem
}
